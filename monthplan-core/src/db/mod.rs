//! JSON flat-file record store.
//!
//! The whole [`Document`] is held in memory behind a mutex and rewritten to
//! disk after every mutation. Writes go to a temp file that is then renamed
//! over the store, and a failed write rolls the in-memory state back.

mod backup;
mod document;
mod plans;
mod users;

pub use backup::*;
pub use document::Document;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

pub const DB_FILE_NAME: &str = "db.json";

#[derive(Clone)]
pub struct Database {
    path: Option<Arc<PathBuf>>,
    doc: Arc<Mutex<Document>>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("path", &self.path).finish()
    }
}

impl Database {
    /// Open (or create) the store file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let doc = match load(&path)? {
            Some(doc) => doc,
            None => {
                let doc = Document::default();
                write_atomic(&path, &doc)?;
                tracing::info!(path = %path.display(), "initialized empty record store");
                doc
            }
        };

        Ok(Self {
            path: Some(Arc::new(path)),
            doc: Arc::new(Mutex::new(doc)),
        })
    }

    /// Open the store in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    /// A store that lives only as long as the process.
    pub fn open_memory() -> Self {
        Self {
            path: None,
            doc: Arc::new(Mutex::new(Document::default())),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().map(PathBuf::as_path)
    }

    /// Copy of the current document.
    pub fn snapshot(&self) -> Result<Document> {
        self.read(Document::clone)
    }

    pub(crate) fn read<T>(&self, f: impl FnOnce(&Document) -> T) -> Result<T> {
        let doc = self.lock()?;
        Ok(f(&*doc))
    }

    /// Run a mutation under the lock. When `f` returns `Some`, the document
    /// is persisted; if that fails the in-memory change is undone.
    pub(crate) fn write<T>(&self, f: impl FnOnce(&mut Document) -> Option<T>) -> Result<Option<T>> {
        let mut doc = self.lock()?;
        let before = doc.clone();
        let Some(out) = f(&mut *doc) else {
            return Ok(None);
        };

        if let Some(path) = self.path.as_deref() {
            if let Err(e) = write_atomic(path, &doc) {
                *doc = before;
                return Err(e);
            }
        }
        Ok(Some(out))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Document>> {
        self.doc
            .lock()
            .map_err(|_| anyhow!("record store lock poisoned"))
    }
}

pub fn default_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "monthplan")
        .context("could not determine a data directory for monthplan")?;
    Ok(dirs.data_dir().join(DB_FILE_NAME))
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// `Ok(None)` when the file does not exist. A file that does not decode
/// (bad UTF-8 or bad JSON) is treated as empty.
fn load(path: &Path) -> Result<Option<Document>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    match Document::from_slice(&bytes) {
        Ok(doc) => Ok(Some(doc)),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "record store is corrupt, starting from an empty store"
            );
            Ok(Some(Document::default()))
        }
    }
}

fn write_atomic(path: &Path, doc: &Document) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    let json = doc.to_json()?;
    let temp_path = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("failed to create {}", temp_path.display()))?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}
