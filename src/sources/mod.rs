//! Concrete site adapters.
//!
//! Each adapter implements [`Source`](crate::source::Source) for one
//! site. The engine only sees the trait, so adding a site means adding a
//! module here and nothing else.

mod biquge;

pub use biquge::BiquguSource;
