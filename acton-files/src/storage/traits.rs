//! Storage backend trait definitions

use super::types::{StorageResult, StoreOptions, UploadedFile};
use async_trait::async_trait;

/// Abstraction over a named storage disk
///
/// Paths handed to a backend are always relative to the disk root and use
/// `/` as separator (for example `products/42/image.png`). Directories are
/// implicit: storing a file creates whatever parents it needs.
///
/// # Implementation Requirements
///
/// Implementations must:
/// - Treat a missing directory as empty in [`files`](Self::files)
/// - Report "nothing to delete" as `Ok(false)` rather than an error
/// - Overwrite an existing file when storing under the same name, leaving
///   it untouched if the store fails
///
/// # Examples
///
/// ```rust,no_run
/// use acton_files::storage::{LocalDisk, StorageBackend, StoreOptions, UploadedFile};
///
/// # async fn example() -> anyhow::Result<()> {
/// let disk = LocalDisk::new("/var/www/storage/app", "http://localhost:3000/storage/app")?;
///
/// let file = UploadedFile::new("photo.png", "image/png", vec![/* ... */]);
/// let path = disk.store("products/42", "image.png", &file, &StoreOptions::default()).await?;
/// assert_eq!(path, "products/42/image.png");
///
/// let url = disk.url(&path).await?;
/// println!("Served from {url}");
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Checks whether a file exists at `path`
    async fn exists(&self, path: &str) -> StorageResult<bool>;

    /// Lists the names of the files directly inside `directory`
    ///
    /// Sub-directories are not included. A directory that does not exist
    /// yields an empty list.
    async fn files(&self, directory: &str) -> StorageResult<Vec<String>>;

    /// Stores `file` as `directory/name` and returns the stored path
    async fn store(
        &self,
        directory: &str,
        name: &str,
        file: &UploadedFile,
        options: &StoreOptions,
    ) -> StorageResult<String>;

    /// Deletes the file at `path`
    ///
    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, path: &str) -> StorageResult<bool>;

    /// Deletes `path` and everything below it
    ///
    /// Returns `false` when the directory did not exist.
    async fn delete_directory(&self, path: &str) -> StorageResult<bool>;

    /// Returns the public URL of the file at `path`
    async fn url(&self, path: &str) -> StorageResult<String>;
}
