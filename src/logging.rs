use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_DIR: &str = "visa-atlas";
const LOG_FILE: &str = "visa-atlas.log";

/// Where log lines go
#[derive(Clone, Debug, PartialEq)]
pub enum LogTarget {
    /// Interactive mode: stderr would draw over the alternate screen
    File(PathBuf),
    Stderr,
}

/// `<cache dir>/visa-atlas/visa-atlas.log`, or the working directory when the
/// platform has no cache dir.
pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join(LOG_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(LOG_FILE)
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn open_log(path: &Path) -> anyhow::Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
    }
    File::create(path).with_context(|| format!("creating log file {}", path.display()))
}

/// Installs the global subscriber. Keep the returned guard alive until exit
/// so buffered file output is flushed.
pub fn init(level: &str, target: LogTarget) -> anyhow::Result<Option<WorkerGuard>> {
    match target {
        LogTarget::File(path) => {
            let (writer, guard) = tracing_appender::non_blocking(open_log(&path)?);
            tracing_subscriber::fmt()
                .with_env_filter(filter(level))
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer)
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))
                .context("installing log subscriber")?;
            Ok(Some(guard))
        }
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter(level))
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))
                .context("installing log subscriber")?;
            Ok(None)
        }
    }
}
