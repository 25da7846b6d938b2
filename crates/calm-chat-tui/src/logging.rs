use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "calm_chat_tui=info,calm_chat_core=info";

/// `<cache dir>/calm-chat/calm-chat.log`, or the working directory when the
/// platform has no cache dir
pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("calm-chat"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("calm-chat.log")
}

/// Route `tracing` output to `path`. The terminal is owned by the UI, so
/// nothing is written to stderr. Keep the guard alive until exit so buffered
/// lines are flushed.
pub fn init(path: &Path) -> Result<WorkerGuard> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(file);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(guard)
}

/// Like `init`, but a log file that can't be opened only costs the log: the
/// reason is printed before the UI takes over the terminal.
pub fn init_or_warn(path: &Path) -> Option<WorkerGuard> {
    match init(path) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("calm-chat: continuing without a log file ({err:#})");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_path_names_the_file() {
        let path = default_log_path();
        assert_eq!(
            path.file_name().and_then(|name| name.to_str()),
            Some("calm-chat.log")
        );
    }

    #[test]
    fn test_unwritable_log_path_is_not_fatal() {
        // A regular file can't be used as a directory
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let path = blocker.path().join("nested").join("calm-chat.log");

        assert!(init(&path).is_err());
        assert!(init_or_warn(&path).is_none());
    }
}
