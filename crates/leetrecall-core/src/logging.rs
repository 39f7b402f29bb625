//! Tracing setup for the file-backed runtime.
//!
//! Stdout logging is always on, filtered by the configured level. An
//! optional daily-rolling file layer is switched on through the environment
//! (`LEETRECALL_FILE_LOGS`, directory in `LEETRECALL_LOG_DIR`).

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "leetrecall.log";
const DEFAULT_LOG_DIR: &str = "./logs";

/// Keeps the background file writer alive. Dropping it flushes and stops
/// the writer, so hold it for the life of the process.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

pub fn file_logging_enabled() -> bool {
    std::env::var("LEETRECALL_FILE_LOGS")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

fn log_dir() -> String {
    std::env::var("LEETRECALL_LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string())
}

fn file_writer(dir: &str) -> Option<(NonBlocking, WorkerGuard)> {
    if let Err(err) = std::fs::create_dir_all(dir) {
        eprintln!("failed to create log directory {dir}: {err}");
        return None;
    }
    Some(tracing_appender::non_blocking(rolling::daily(
        dir,
        LOG_FILE_PREFIX,
    )))
}

/// Installs the global subscriber. A second call is a no-op; the first
/// installation wins. Returns the file-writer guard when file logging is
/// active.
pub fn init_tracing(log_level: &str) -> Option<FileLogGuard> {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(true);
    let base = tracing_subscriber::registry().with(filter).with(stdout_layer);

    let file = file_logging_enabled().then(|| file_writer(&log_dir())).flatten();
    match file {
        Some((writer, guard)) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            base.with(file_layer).try_init().ok();
            Some(FileLogGuard { _guard: guard })
        }
        None => {
            base.try_init().ok();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the env-var handshake cannot race a parallel sibling.
    #[test]
    fn file_layer_follows_the_env_switch() {
        std::env::set_var("LEETRECALL_FILE_LOGS", "no");
        assert!(!file_logging_enabled());

        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("LEETRECALL_FILE_LOGS", "1");
        std::env::set_var("LEETRECALL_LOG_DIR", dir.path());
        assert!(file_logging_enabled());
        let guard = init_tracing("debug");
        assert!(guard.is_some());
        tracing::info!("session opened");
        // Dropping the guard flushes the background writer.
        drop(guard);

        let found = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .any(|e| {
                e.file_name()
                    .to_string_lossy()
                    .starts_with(LOG_FILE_PREFIX)
            });
        assert!(found, "expected a rolled log file in the configured dir");

        std::env::remove_var("LEETRECALL_FILE_LOGS");
        std::env::remove_var("LEETRECALL_LOG_DIR");
    }
}
