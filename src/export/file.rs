// Markdown file sink - dated files in the downloads directory

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Which listing a file holds; decides the file name prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Tabs,
    Links,
}

impl ListingKind {
    fn prefix(self) -> &'static str {
        match self {
            ListingKind::Tabs => "saved-tabs",
            ListingKind::Links => "saved-links",
        }
    }
}

/// `saved-tabs-YYYY-MM-DD.md` / `saved-links-YYYY-MM-DD.md` (UTC date)
pub fn export_file_name(kind: ListingKind, now: DateTime<Utc>) -> String {
    format!("{}-{}.md", kind.prefix(), now.format("%Y-%m-%d"))
}

/// Downloads folder, falling back to the home directory
pub fn default_download_dir() -> Result<PathBuf, AppError> {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| AppError::FileIO("Could not determine downloads directory".to_string()))
}

/// Write `content` into `dir`, replacing a file of the same name. Returns the path.
pub fn write_markdown(dir: &Path, kind: ListingKind, content: &str, now: DateTime<Utc>) -> Result<PathBuf, AppError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::FileIO(format!("Failed to create {}: {}", dir.display(), e)))?;

    let path = dir.join(export_file_name(kind, now));
    std::fs::write(&path, content)
        .map_err(|e| AppError::FileIO(format!("Failed to write {}: {}", path.display(), e)))?;

    tracing::info!("Export: Wrote {} bytes to {}", content.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 23, 59, 0).unwrap()
    }

    #[test]
    fn test_file_names() {
        assert_eq!(export_file_name(ListingKind::Tabs, now()), "saved-tabs-2026-03-01.md");
        assert_eq!(export_file_name(ListingKind::Links, now()), "saved-links-2026-03-01.md");
    }

    #[test]
    fn test_write_markdown() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("downloads");

        let path = write_markdown(&target, ListingKind::Links, "# Saved Links\n", now()).unwrap();

        assert_eq!(path, target.join("saved-links-2026-03-01.md"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Saved Links\n");

        // Same day overwrites
        write_markdown(&target, ListingKind::Links, "second", now()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }
}
