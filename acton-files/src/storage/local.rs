//! Local filesystem storage implementation

use super::traits::StorageBackend;
use super::types::{StorageError, StorageResult, StoreOptions, UploadedFile};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Local filesystem storage backend
///
/// Stores files below a root directory using the relative path it is given,
/// so the on-disk layout mirrors the logical layout of the records:
///
/// ```text
/// /var/www/storage/app/
/// ├── products/
/// │   ├── 42/
/// │   │   ├── image.png
/// │   │   └── gallery/
/// │   │       ├── 0f1e2d3c4b5a69788796a5b4c3d2e1f0.jpg
/// │   │       └── 8c7b6a5948372615f4e3d2c1b0a99887.png
/// │   └── banner.jpg          (global file)
/// ```
///
/// # Examples
///
/// ```rust,no_run
/// use acton_files::storage::{LocalDisk, StorageBackend};
///
/// # async fn example() -> anyhow::Result<()> {
/// let disk = LocalDisk::new("/var/www/storage/app", "http://localhost:3000/storage/app")?;
/// let names = disk.files("products/42").await?;
/// println!("{} files stored for product 42", names.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalDisk {
    /// Base directory for file storage
    root: PathBuf,

    /// Public URL the root directory is served under
    url: String,
}

impl LocalDisk {
    /// Creates a new local disk
    ///
    /// The root does not have to exist yet; it is created on first write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPath` if the root exists but is not a
    /// directory.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use acton_files::storage::LocalDisk;
    ///
    /// let disk = LocalDisk::new("/var/www/storage/app", "/storage/app")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(root: impl Into<PathBuf>, url: impl Into<String>) -> StorageResult<Self> {
        let root = root.into();

        // Synchronous check is OK for initialization
        if root.exists() && !root.is_dir() {
            return Err(StorageError::InvalidPath(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        Ok(Self {
            root,
            url: url.into(),
        })
    }

    /// Root directory of this disk
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a disk-relative path onto the filesystem
    ///
    /// Only plain path segments are accepted, so nothing can resolve outside
    /// the root.
    fn resolve(&self, path: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(path.trim_matches('/'));

        if relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)))
        {
            return Err(StorageError::InvalidPath(path.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl StorageBackend for LocalDisk {
    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let full = self.resolve(path)?;
        Ok(fs::try_exists(&full).await?)
    }

    async fn files(&self, directory: &str) -> StorageResult<Vec<String>> {
        let dir = self.resolve(directory)?;

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }

        Ok(names)
    }

    async fn store(
        &self,
        directory: &str,
        name: &str,
        file: &UploadedFile,
        _options: &StoreOptions,
    ) -> StorageResult<String> {
        let path = join(directory, name);
        let full = self.resolve(&path)?;

        let parent = full
            .parent()
            .ok_or_else(|| StorageError::InvalidPath(path.clone()))?;
        fs::create_dir_all(parent).await?;

        // Written aside and renamed over the target, so an existing file is
        // either fully replaced or left untouched. The leading dot hides it
        // from attachment listings.
        let temp = parent.join(format!(".{name}.{}.tmp", Uuid::new_v4().simple()));
        if let Err(e) = write_file(&temp, &file.data).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp, &full).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        Ok(path)
    }

    async fn delete(&self, path: &str) -> StorageResult<bool> {
        let full = self.resolve(path)?;

        match fs::remove_file(&full).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_directory(&self, path: &str) -> StorageResult<bool> {
        let full = self.resolve(path)?;

        // Refuse to wipe the whole disk
        if full == self.root {
            return Err(StorageError::InvalidPath(path.to_string()));
        }

        match fs::remove_dir_all(&full).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn url(&self, path: &str) -> StorageResult<String> {
        let relative = self.resolve(path).map(|_| path.trim_matches('/'))?;
        Ok(format!("{}/{relative}", self.url.trim_end_matches('/')))
    }
}

async fn write_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut f = fs::File::create(path).await?;
    f.write_all(data).await?;
    f.sync_all().await
}

/// Joins a directory and a file name with a single `/`
fn join(directory: &str, name: &str) -> String {
    let directory = directory.trim_matches('/');
    if directory.is_empty() {
        name.to_string()
    } else {
        format!("{directory}/{name}")
    }
}
