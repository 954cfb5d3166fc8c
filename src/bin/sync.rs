//! CLI entry point: load the novels config, run a sync, print the
//! summary, and emit automation output.
//!
//! Usage: `novelsync [config-path]` (default `novels.json`). When the
//! `GITHUB_OUTPUT` environment variable names a file, key=value summary
//! lines are appended to it for downstream workflow steps. The process
//! exits non-zero if zero books synced successfully.

use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Arc;

use novelsync::prelude::*;
use novelsync::sources::BiquguSource;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "novels.json".to_string());

    let config = match NovelConfig::load(&config_path).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load config {config_path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    if config.novels.is_empty() {
        eprintln!("no novels defined in {config_path}");
        return ExitCode::FAILURE;
    }

    tracing::info!(
        books = config.novels.len(),
        source = "xbiqugu.la",
        "starting novel sync"
    );

    let source = Arc::new(BiquguSource::new().with_config(&config.settings));
    let engine = SyncEngine::new(source, config.settings.clone());
    let summary = engine.run(&config.novels).await;

    println!("{}/{} books synced", summary.succeeded(), summary.total());
    for report in &summary.reports {
        if report.success {
            let size_mb = report.file_size.unwrap_or(0) as f64 / 1024.0 / 1024.0;
            println!(
                "  ok {} - {} ({:.1}MB, {} new / {} total, {} failed)",
                report.name,
                report.author,
                size_mb,
                report.new_chapters,
                report.total_chapters,
                report.fail_count
            );
        } else {
            println!(
                "  FAILED {} - {} ({})",
                report.name,
                report.author,
                report.reason.as_deref().unwrap_or("unknown")
            );
        }
    }

    if let Ok(output_path) = std::env::var("GITHUB_OUTPUT")
        && !output_path.is_empty()
    {
        let appended = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&output_path)
            .and_then(|mut file| summary.write_automation_output(&mut file));
        if let Err(e) = appended {
            tracing::warn!(path = %output_path, error = %e, "failed to write automation output");
        }
    }

    if summary.any_success() {
        ExitCode::SUCCESS
    } else {
        eprintln!("no books synced successfully");
        ExitCode::FAILURE
    }
}
