use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::Database;

const BACKUP_PREFIX: &str = "db-backup-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupFile {
    pub name: String,
    pub path: PathBuf,
}

/// `db-backup-2024-05-01T08-00-00-000Z.json` for 2024-05-01T08:00:00.000Z.
pub fn backup_file_name(at: DateTime<Utc>) -> String {
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{BACKUP_PREFIX}{stamp}.json")
}

fn is_backup_name(name: &str) -> bool {
    name.starts_with(BACKUP_PREFIX) && name.ends_with(".json")
}

/// Copy the store file next to itself. `Ok(None)` if there is no file.
pub fn create_backup(db_path: &Path) -> Result<Option<PathBuf>> {
    if !db_path.exists() {
        return Ok(None);
    }
    let dir = db_path.parent().unwrap_or_else(|| Path::new("."));
    let dest = dir.join(backup_file_name(Utc::now()));
    fs::copy(db_path, &dest)
        .with_context(|| format!("failed to copy {} to {}", db_path.display(), dest.display()))?;

    tracing::info!(path = %dest.display(), "created store backup");
    Ok(Some(dest))
}

/// Backups in `dir`, sorted by name (oldest first). Empty if `dir` is absent.
pub fn list_backups(dir: &Path) -> Result<Vec<BackupFile>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut backups = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_backup_name(&name) {
            backups.push(BackupFile {
                name,
                path: entry.path(),
            });
        }
    }
    backups.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(backups)
}

impl Database {
    /// Back up the store file. `Ok(None)` for an in-memory store or a
    /// missing file.
    pub fn backup(&self) -> Result<Option<PathBuf>> {
        let Some(path) = self.path() else {
            return Ok(None);
        };
        // Hold the lock so no write lands mid-copy.
        self.read(|_| create_backup(path))?
    }

    pub fn backups(&self) -> Result<Vec<BackupFile>> {
        match self.path().and_then(Path::parent) {
            Some(dir) => list_backups(dir),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DB_FILE_NAME;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn backup_name_replaces_separators() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 15).unwrap();
        assert_eq!(backup_file_name(at), "db-backup-2024-05-01T08-30-15-000Z.json");
    }

    #[test]
    fn backup_copies_store_and_is_listed() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path().join(DB_FILE_NAME)).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let dest = db.backup().unwrap().unwrap();
        assert_eq!(
            fs::read_to_string(&dest).unwrap(),
            fs::read_to_string(dir.path().join(DB_FILE_NAME)).unwrap()
        );

        let listed = db.backups().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].path, dest);
        assert!(is_backup_name(&listed[0].name));
    }

    #[test]
    fn memory_store_has_nothing_to_back_up() {
        let db = Database::open_memory();
        assert!(db.backup().unwrap().is_none());
        assert!(db.backups().unwrap().is_empty());
    }

    #[test]
    fn missing_directory_lists_empty() {
        let dir = TempDir::new().unwrap();
        assert!(list_backups(&dir.path().join("nope")).unwrap().is_empty());
    }
}
