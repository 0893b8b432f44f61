use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::schema::MemoryDocument;

/// Persistence seam for the memory document.
///
/// The production backend is a flat JSON file; keeping `load`/`save`
/// behind a trait lets a locking or transactional backend swap in later
/// without touching callers.
pub trait MemoryStore: Send + Sync {
    fn load(&self) -> Result<MemoryDocument>;
    fn save(&self, document: &MemoryDocument) -> Result<()>;
}

/// Whole-file JSON store.
///
/// `save` overwrites in place with no atomic rename — a crash mid-write
/// can corrupt the file.  Concurrent requests racing on read-modify-write
/// can lose updates.  Both are accepted gaps for this store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MemoryStore for FileStore {
    /// Read and parse the backing file, initializing it with the empty
    /// default document when absent.  A file that exists but holds invalid
    /// JSON is an error, not silently reset.
    fn load(&self) -> Result<MemoryDocument> {
        if !self.path.exists() {
            let document = MemoryDocument::default();
            self.save(&document)?;
            info!(path = %self.path.display(), "initialized empty memory document");
            return Ok(document);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("reading memory file {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing memory file {}", self.path.display()))
    }

    fn save(&self, document: &MemoryDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let rendered = serde_json::to_string_pretty(document)?;
        fs::write(&self.path, rendered)
            .with_context(|| format!("writing memory file {}", self.path.display()))
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Category;
    use tempfile::TempDir;

    #[test]
    fn load_missing_file_creates_empty_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory.json");
        let store = FileStore::new(&path);

        let doc = store.load().unwrap();
        assert_eq!(doc, MemoryDocument::default());

        // The default document must have been persisted, not just returned.
        assert!(path.exists());
        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            on_disk,
            serde_json::json!({
                "profile": {},
                "goals": [],
                "weaknesses": [],
                "patterns": [],
                "notes": []
            })
        );
    }

    #[test]
    fn load_invalid_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory.json");
        fs::write(&path, "{ this is not json").unwrap();

        let store = FileStore::new(&path);
        assert!(store.load().is_err());
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("memory.json"));

        let mut doc = MemoryDocument::default();
        doc.remember(Category::Goals, "finish the borrow checker chapter");
        doc.remember(Category::Weaknesses, "skips writing tests");
        store.save(&doc).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state/deep/memory.json");
        let store = FileStore::new(&path);
        store.save(&MemoryDocument::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn save_is_pretty_printed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory.json");
        let store = FileStore::new(&path);

        let mut doc = MemoryDocument::default();
        doc.remember(Category::Notes, "studies after midnight");
        store.save(&doc).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains('\n'), "expected multi-line pretty output");
    }
}
