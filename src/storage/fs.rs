//! Filesystem-backed object store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{FolderListing, ObjectStore, StorageError};

/// Stores objects as plain files under a root directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a key onto a path under the root. Keys that try to climb out
    /// of the root (`..`, absolute paths, empty segments) are rejected.
    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        let trimmed = key.trim_start_matches('/').trim_end_matches('/');

        let mut path = self.root.clone();
        for segment in trimmed.split('/') {
            if segment.is_empty() && !trimmed.is_empty() {
                return Err(StorageError::InvalidKey(key.to_owned()));
            }
            if segment == ".." || segment == "." || segment.contains('\\') {
                return Err(StorageError::InvalidKey(key.to_owned()));
            }
            if !segment.is_empty() {
                path.push(segment);
            }
        }
        Ok(path)
    }
}

fn map_io(err: std::io::Error, key: &str) -> StorageError {
    if err.kind() == std::io::ErrorKind::NotFound {
        StorageError::NotFound(key.to_owned())
    } else {
        StorageError::Io(err)
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn list_folder(&self, folder: &str) -> Result<FolderListing, StorageError> {
        let dir = self.resolve(folder)?;
        let prefix = normalize_folder(folder);

        let mut listing = FolderListing::default();
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| map_io(e, folder))?;

        while let Some(entry) = entries.next_entry().await.map_err(StorageError::Io)? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let file_type = entry.file_type().await.map_err(StorageError::Io)?;
            if file_type.is_dir() {
                listing.folders.push(format!("{prefix}{name}/"));
            } else {
                listing.files.push(format!("{prefix}{name}"));
            }
        }

        listing.folders.sort();
        listing.files.sort();
        Ok(listing)
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(key)?;
        tokio::fs::read(&path).await.map_err(|e| map_io(e, key))
    }

    async fn write(&self, key: &str, content: Vec<u8>) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            if parent != Path::new("") {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(StorageError::Io)?;
            }
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(StorageError::Io)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| map_io(e, key))
    }
}

/// `"/"` and `""` both mean the root; everything else keeps exactly one
/// trailing slash.
fn normalize_folder(folder: &str) -> String {
    let trimmed = folder.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn write_read_delete_round_trip() {
        let (_dir, store) = store();

        store.write("notes/todo.md", b"buy milk".to_vec()).await.unwrap();
        assert_eq!(store.read("notes/todo.md").await.unwrap(), b"buy milk");

        store.delete("notes/todo.md").await.unwrap();
        assert!(matches!(
            store.read("notes/todo.md").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn listing_separates_folders_and_files() {
        let (_dir, store) = store();
        store.write("a/nested/deep.txt", b"x".to_vec()).await.unwrap();
        store.write("a/one.txt", b"x".to_vec()).await.unwrap();
        store.write("a/two.txt", b"x".to_vec()).await.unwrap();

        let listing = store.list_folder("a/").await.unwrap();
        assert_eq!(listing.folders, vec!["a/nested/".to_owned()]);
        assert_eq!(
            listing.files,
            vec!["a/one.txt".to_owned(), "a/two.txt".to_owned()]
        );
    }

    #[tokio::test]
    async fn root_listing_uses_bare_keys() {
        let (_dir, store) = store();
        store.write("top.txt", b"x".to_vec()).await.unwrap();
        store.write("sub/inner.txt", b"x".to_vec()).await.unwrap();

        let listing = store.list_folder("/").await.unwrap();
        assert_eq!(listing.folders, vec!["sub/".to_owned()]);
        assert_eq!(listing.files, vec!["top.txt".to_owned()]);
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let (_dir, store) = store();
        assert!(matches!(
            store.read("../etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            store.read("a/../../b").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            store.write("a//b", Vec::new()).await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn missing_folder_is_not_found() {
        let (_dir, store) = store();
        assert!(matches!(
            store.list_folder("nope/").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
