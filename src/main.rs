//! `checkpoint-inspect`: prints a checkpoint file as JSON.
//!
//! Usage: `checkpoint-inspect [PATH]`. Without a path, the file named by
//! `CHECKPOINT_FILE` (or the default) is read.

use std::path::PathBuf;
use std::process::ExitCode;

use source_checkpoint::CheckpointConfig;
use source_checkpoint::persistence::try_load_snapshot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "source_checkpoint=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| CheckpointConfig::from_env().path);

    let snapshot = match try_load_snapshot(&path) {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => {
            tracing::warn!(path = %path.display(), "No checkpoint file found");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to load checkpoint");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode checkpoint as JSON");
            ExitCode::FAILURE
        }
    }
}
