//! tracing setup. The TUI owns the terminal, so events go to a log file.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "lanwatch=info";

pub fn default_log_path() -> PathBuf {
    crate::profiles::config_dir().join("lanwatch.log")
}

/// Install the global subscriber. Filter comes from `LANWATCH_LOG`, then
/// `RUST_LOG`, then [`DEFAULT_FILTER`].
pub fn init(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = std::env::var("LANWATCH_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("logging already initialized: {e}"))
}
