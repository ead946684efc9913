// File-based logging: tracing output goes to stderr and a timestamped log file.
//
// Creates a new log file on every launch:
//   ~/.local/share/tabscribe/logs/tabscribe-2026-03-01_14-30-00.log
//
// Keeps last 5 log files, deletes older ones.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_PREFIX: &str = "tabscribe-";
const KEEP_LOGS: usize = 5;

static GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize logging. Call once at startup, before any tracing macros fire.
///
/// Falls back to stderr-only logging if the log directory cannot be prepared.
pub fn init(logs_dir: Option<&Path>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_target(true).with_writer(io::stderr);

    let file_layer = logs_dir.and_then(|dir| match prepare_log_file(dir) {
        Ok((dir, file_name)) => {
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = GUARD.set(guard);
            Some(fmt::layer().with_ansi(false).with_writer(writer))
        }
        Err(e) => {
            eprintln!("Warning: Failed to initialize file logging: {}", e);
            None
        }
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
}

fn prepare_log_file(logs_dir: &Path) -> Result<(PathBuf, String), io::Error> {
    fs::create_dir_all(logs_dir)?;

    // Leave room for the file about to be created
    rotate_logs(logs_dir, KEEP_LOGS - 1)?;

    let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
    Ok((logs_dir.to_path_buf(), format!("{}{}.log", LOG_PREFIX, timestamp)))
}

/// Delete old log files, keeping the most recent `keep` files.
fn rotate_logs(logs_dir: &Path, keep: usize) -> Result<(), io::Error> {
    let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();

    for entry in fs::read_dir(logs_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("log")
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(LOG_PREFIX))
                .unwrap_or(false)
        {
            if let Ok(metadata) = entry.metadata() {
                let modified = metadata.modified().unwrap_or(std::time::UNIX_EPOCH);
                log_files.push((path, modified));
            }
        }
    }

    // Sort newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, _) in log_files.iter().skip(keep) {
        let _ = fs::remove_file(path);
    }

    Ok(())
}

/// Get the logs directory path.
pub fn logs_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("tabscribe").join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn touch(dir: &Path, name: &str, age_secs: u64) -> PathBuf {
        let path = dir.join(name);
        let file = fs::File::create(&path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .unwrap();
        path
    }

    #[test]
    fn test_rotate_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        let oldest = touch(dir.path(), "tabscribe-1.log", 500);
        let older = touch(dir.path(), "tabscribe-2.log", 400);
        let newer = touch(dir.path(), "tabscribe-3.log", 100);
        let newest = touch(dir.path(), "tabscribe-4.log", 10);

        rotate_logs(dir.path(), 2).unwrap();

        assert!(!oldest.exists());
        assert!(!older.exists());
        assert!(newer.exists());
        assert!(newest.exists());
    }

    #[test]
    fn test_rotate_ignores_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let foreign = touch(dir.path(), "other-1.log", 900);
        let notes = touch(dir.path(), "tabscribe-notes.txt", 900);
        touch(dir.path(), "tabscribe-1.log", 10);

        rotate_logs(dir.path(), 0).unwrap();

        assert!(foreign.exists());
        assert!(notes.exists());
    }
}
