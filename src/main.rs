//! # onedrive-dl CLI
//!
//! Fetches the file behind the built-in OneDrive share link into the current
//! directory. There are no flags; set `RUST_LOG=debug` for request details.

use std::sync::Arc;

use anyhow::Context;
use log::{error, info};
use onedrive_dl::{DownloadOptions, FetchConfig, FetchOutcome};

mod cli;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Initialize logging to stderr
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    let entry_url = FetchConfig::default().entry_url;
    info!("onedrive-dl v{} fetching {}", env!("ONEDRIVE_DL_VERSION"), entry_url);

    let progress_manager = Arc::new(cli::ProgressManager::new(0, "downloading file..."));
    let options = DownloadOptions {
        progress: Some(Arc::new({
            let manager = Arc::clone(&progress_manager);
            move |done: u64, total: u64| manager.update(done, total)
        })),
        ..Default::default()
    };

    let outcome = onedrive_dl::fetch(options).await;

    match outcome {
        Ok(FetchOutcome::Saved(report)) => {
            progress_manager.finish();
            info!(
                "Wrote {} of {} declared bytes in {} chunks",
                report.bytes_written, report.total_size, report.chunks
            );
        }
        Ok(FetchOutcome::Rejected { .. }) => progress_manager.clear(),
        Err(e) => {
            progress_manager.clear();
            return Err(e).with_context(|| format!("fetching {entry_url}"));
        }
    }

    Ok(())
}
