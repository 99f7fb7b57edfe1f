//! Entry persistence.
//!
//! An entry is a title plus markdown content. Titles are unique ignoring
//! case, but the casing used at creation is kept for display and for naming
//! the stored file. Stores do not enforce that uniqueness themselves:
//! callers resolve a title with [`EntryStore::resolve_title`] before creating.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// File extension used for entries on disk
pub const ENTRY_EXTENSION: &str = "md";

/// Longest file name most filesystems accept, in bytes
const MAX_FILE_NAME_BYTES: usize = 255;

/// Longest title, in UTF-8 bytes, that still fits in a file name with its extension
pub const MAX_TITLE_BYTES: usize = MAX_FILE_NAME_BYTES - ENTRY_EXTENSION.len() - 1;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No entry titled '{0}'")]
    NotFound(String),

    #[error("'{0}' cannot be used as an entry title")]
    InvalidTitle(String),

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A stored title and its raw markdown content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub title: String,
    pub content: String,
}

/// Durable mapping from title to content.
///
/// Individual operations are atomic per entry. Nothing coordinates
/// concurrent writers, so two saves to the same title race and the last
/// one wins.
pub trait EntryStore: Send + Sync {
    /// All stored titles, in a stable order for unchanged storage.
    fn list_entries(&self) -> Result<Vec<String>, StoreError>;

    /// Content stored under exactly `title`.
    fn get_entry(&self, title: &str) -> Result<String, StoreError>;

    /// Create or fully replace the entry stored under `title`.
    fn save_entry(&self, title: &str, content: &str) -> Result<(), StoreError>;

    /// Map a user-supplied title to the stored title equal to it ignoring case.
    ///
    /// This is a linear scan over every title, which is fine for a personal
    /// wiki and the ceiling for anything larger.
    fn resolve_title(&self, query: &str) -> Result<Option<String>, StoreError> {
        let wanted = query.to_lowercase();
        Ok(self
            .list_entries()?
            .into_iter()
            .find(|title| title.to_lowercase() == wanted))
    }
}

/// Check that a title can name a single file inside the entries directory
pub fn is_storable_title(title: &str) -> bool {
    !title.is_empty()
        && title.len() <= MAX_TITLE_BYTES
        && !title.starts_with('.')
        && !title.chars().any(|c| c == '/' || c == '\\' || c.is_control())
}

/// Entries stored as `<title>.md` files in one directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, title: &str) -> Result<PathBuf, StoreError> {
        if !is_storable_title(title) {
            return Err(StoreError::InvalidTitle(title.to_string()));
        }
        Ok(self.root.join(format!("{title}.{ENTRY_EXTENSION}")))
    }

    fn io_error(&self, path: &Path, source: io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl EntryStore for FileStore {
    fn list_entries(&self) -> Result<Vec<String>, StoreError> {
        if !self.root.exists() {
            tracing::debug!("Entries directory {:?} does not exist yet", self.root);
            return Ok(Vec::new());
        }
        if !self.root.is_dir() {
            return Err(self.io_error(
                &self.root,
                io::Error::new(io::ErrorKind::Other, "entries path is not a directory"),
            ));
        }

        let mut titles = Vec::new();
        for item in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let item = item.map_err(|err| {
                let path = err.path().unwrap_or(self.root.as_path()).to_path_buf();
                StoreError::Io {
                    path,
                    source: err.into(),
                }
            })?;
            if !item.file_type().is_file() {
                continue;
            }

            let path = item.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(title) if is_storable_title(title) => titles.push(title.to_string()),
                _ => tracing::warn!("Skipping unreadable entry name {:?}", path),
            }
        }

        Ok(titles)
    }

    fn get_entry(&self, title: &str) -> Result<String, StoreError> {
        let path = self.entry_path(title)?;
        fs::read_to_string(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(title.to_string()),
            _ => self.io_error(&path, err),
        })
    }

    fn save_entry(&self, title: &str, content: &str) -> Result<(), StoreError> {
        let path = self.entry_path(title)?;
        fs::create_dir_all(&self.root).map_err(|err| self.io_error(&self.root, err))?;

        // Write next to the target and rename over it so readers never see a
        // half-written entry.
        let mut staged =
            tempfile::NamedTempFile::new_in(&self.root).map_err(|err| self.io_error(&path, err))?;
        staged
            .write_all(content.as_bytes())
            .map_err(|err| self.io_error(&path, err))?;
        staged
            .persist(&path)
            .map_err(|err| self.io_error(&path, err.error))?;

        tracing::debug!("Saved entry {:?} to {:?}", title, path);
        Ok(())
    }
}

/// Entries held in memory, ordered by title
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, T, C>(entries: I) -> Self
    where
        I: IntoIterator<Item = (T, C)>,
        T: Into<String>,
        C: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(title, content)| (title.into(), content.into()))
            .collect();
        Self {
            entries: RwLock::new(map),
        }
    }
}

impl EntryStore for MemoryStore {
    fn list_entries(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.read().keys().cloned().collect())
    }

    fn get_entry(&self, title: &str) -> Result<String, StoreError> {
        self.entries
            .read()
            .get(title)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(title.to_string()))
    }

    fn save_entry(&self, title: &str, content: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .insert(title.to_string(), content.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.save_entry("Python", "A language.").unwrap();
        assert_eq!(store.get_entry("Python").unwrap(), "A language.");
        assert!(dir.path().join("Python.md").is_file());
    }

    #[test]
    fn test_file_store_lists_sorted_md_files_only() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.save_entry("Git", "vcs").unwrap();
        store.save_entry("CSS", "styles").unwrap();
        store.save_entry("Django", "web").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("drafts.md")).unwrap();

        let first = store.list_entries().unwrap();
        assert_eq!(first, vec!["CSS", "Django", "Git"]);
        assert_eq!(store.list_entries().unwrap(), first);
    }

    #[test]
    fn test_file_store_missing_directory_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("not-yet"));

        assert!(store.list_entries().unwrap().is_empty());
        assert_eq!(store.resolve_title("anything").unwrap(), None);
    }

    #[test]
    fn test_save_creates_directory_and_replaces_content() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("entries"));

        store.save_entry("HTML", "first").unwrap();
        store.save_entry("HTML", "second").unwrap();

        assert_eq!(store.get_entry("HTML").unwrap(), "second");
        assert_eq!(store.list_entries().unwrap(), vec!["HTML"]);
    }

    #[test]
    fn test_get_missing_entry_is_not_found() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(matches!(
            store.get_entry("Ghost"),
            Err(StoreError::NotFound(title)) if title == "Ghost"
        ));
    }

    #[test]
    fn test_unsafe_titles_are_rejected() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("entries"));

        for title in ["../escape", "a/b", "a\\b", ".hidden", ""] {
            assert!(matches!(
                store.save_entry(title, "x"),
                Err(StoreError::InvalidTitle(_))
            ));
        }
        assert!(!dir.path().join("escape.md").exists());
    }

    #[test]
    fn test_title_length_is_measured_in_bytes() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let longest = "é".repeat(MAX_TITLE_BYTES / 2);
        store.save_entry(&longest, "fits").unwrap();
        assert_eq!(store.get_entry(&longest).unwrap(), "fits");

        let too_long = "é".repeat(200);
        assert!(too_long.chars().count() <= 200);
        assert!(matches!(
            store.save_entry(&too_long, "x"),
            Err(StoreError::InvalidTitle(_))
        ));
    }

    #[test]
    fn test_entries_path_that_is_a_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("entries");
        fs::write(&file, "not a directory").unwrap();
        let store = FileStore::new(&file);

        assert!(matches!(store.list_entries(), Err(StoreError::Io { .. })));
        assert!(matches!(
            store.resolve_title("Cat"),
            Err(StoreError::Io { .. })
        ));
    }

    #[test]
    fn test_resolve_title_ignores_case() {
        let store = MemoryStore::with_entries([("Cat", "Cats are animals."), ("HTML", "markup")]);

        assert_eq!(store.resolve_title("cat").unwrap(), Some("Cat".into()));
        assert_eq!(store.resolve_title("CAT").unwrap(), Some("Cat".into()));
        assert_eq!(store.resolve_title("html").unwrap(), Some("HTML".into()));
        assert_eq!(store.resolve_title("dog").unwrap(), None);
        assert_eq!(store.resolve_title("ca").unwrap(), None);
    }

    #[test]
    fn test_resolve_title_handles_non_ascii_case() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.save_entry("Ärger", "trouble").unwrap();

        assert_eq!(store.resolve_title("ärger").unwrap(), Some("Ärger".into()));
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        store.save_entry("Snakes", "Reptiles.").unwrap();

        assert_eq!(store.get_entry("Snakes").unwrap(), "Reptiles.");
        assert!(matches!(
            store.get_entry("snakes"),
            Err(StoreError::NotFound(_))
        ));
    }
}
