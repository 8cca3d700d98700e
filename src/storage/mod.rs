//! Object storage behind the notes tree and the file vault.
//!
//! Keys are `/`-separated, bucket style: a "folder" is just a key prefix
//! ending in `/`. The gateway only ever talks to the [`ObjectStore`]
//! trait; the shipped backend keeps objects on the local filesystem.

pub mod fs;

pub use fs::FsStore;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no such object: {0}")]
    NotFound(String),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Immediate children of a folder. Folder entries carry a trailing
/// slash, file entries do not; both are full keys from the root.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FolderListing {
    pub folders: Vec<String>,
    pub files: Vec<String>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List the immediate children of `folder` (`""` or `"a/b/"`).
    async fn list_folder(&self, folder: &str) -> Result<FolderListing, StorageError>;

    async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    async fn write(&self, key: &str, content: Vec<u8>) -> Result<(), StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
