//! Resolving, listing, storing and removing the files of a record

use super::context::{segment, AttachmentContext};
use super::uploads::{decode_base64_file, Uploads};
use crate::config::FilesConfig;
use crate::error::AttachmentResult;
use crate::storage::{Disks, StorageBackend, StoreOptions, UploadedFile};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Extension used when neither content, MIME type nor client name tell one
pub const DEFAULT_EXTENSION: &str = "bin";

/// Which form of path [`FileAttachmentResolver::file_path`] returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathKind {
    /// Path relative to the disk, usable with the storage backend
    #[default]
    Storage,
    /// Absolute filesystem path below the disk root
    Full,
}

/// How a record is being removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalKind {
    /// Reversible removal (soft delete); files are kept
    Soft,
    /// Irrecoverable removal; files are deleted
    Permanent,
}

/// Files of records on named disks
///
/// Every operation takes the [`AttachmentContext`] of the record it works
/// on. Files are addressed by a logical name without extension: a record
/// has at most one `image.*`, and `file("image")` finds it whatever
/// extension it was stored with.
///
/// # Lookup order
///
/// Candidates are read from the disk and sorted by file name. When several
/// extensions exist for one logical name (left behind by an older release
/// or written directly to the disk) the lexicographically smallest file
/// name wins, so `image.jpg` is preferred over `image.png`.
///
/// # Replacing files
///
/// The new file is stored before the old ones are deleted. A failure while
/// storing leaves the previous file in place. Every old file is then tried;
/// one that cannot be deleted is logged and left behind, and the call still
/// succeeds with the stored path.
///
/// # Examples
///
/// ```rust,no_run
/// use acton_files::attachments::{AttachmentContext, FileAttachmentResolver, Uploads};
/// use acton_files::config::FilesConfig;
/// use acton_files::storage::{StoreOptions, UploadedFile};
///
/// # async fn example() -> anyhow::Result<()> {
/// let resolver = FileAttachmentResolver::from_config(FilesConfig::load()?)?;
/// let product = AttachmentContext::for_record("products", 42);
///
/// let uploads = Uploads::new()
///     .with_file("image", UploadedFile::new("photo.png", "image/png", vec![/* ... */]));
/// let stored = resolver
///     .put_file(&product, &uploads, "image", None, &StoreOptions::default())
///     .await?;
/// assert_eq!(stored.as_deref(), Some("products/42/image.png"));
///
/// let url = resolver.file(&product, "image", None).await?;
/// assert!(url.ends_with("products/42/image.png"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileAttachmentResolver {
    disks: Disks,
    config: Arc<FilesConfig>,
}

impl FileAttachmentResolver {
    /// Creates a resolver over explicit disks
    #[must_use]
    pub fn new(disks: Disks, config: FilesConfig) -> Self {
        Self {
            disks,
            config: Arc::new(config),
        }
    }

    /// Creates a resolver with the local disks described by `config`
    pub fn from_config(config: FilesConfig) -> AttachmentResult<Self> {
        let disks = Disks::from_config(&config)?;
        Ok(Self::new(disks, config))
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &FilesConfig {
        &self.config
    }

    /// Registered disks
    #[must_use]
    pub const fn disks(&self) -> &Disks {
        &self.disks
    }

    /// Disk the context's files live on
    fn disk_name<'a>(&'a self, context: &'a AttachmentContext) -> &'a str {
        context.disk().unwrap_or(&self.config.default_disk)
    }

    /// Public URL of a record's file, or a fallback when there is none
    ///
    /// `fallback` wins over the fallback configured for the table. A missing
    /// file is never an error; a missing fallback configuration is.
    pub async fn file(
        &self,
        context: &AttachmentContext,
        name: &str,
        fallback: Option<&str>,
    ) -> AttachmentResult<String> {
        let name = segment(name)?;
        let backend = self.disks.disk(self.disk_name(context))?;
        let directory = context.storage_path()?;

        if let Some(file) = find(backend.as_ref(), &directory, name).await?.first() {
            return Ok(backend.url(&format!("{directory}{file}")).await?);
        }

        match fallback {
            Some(url) => Ok(url.to_string()),
            None => Ok(self.config.fallback(context.table())?.to_string()),
        }
    }

    /// Path of a record's file, if it exists
    ///
    /// The file found by name must also be reported as existing by the
    /// backend; if the two disagree the file is treated as missing.
    pub async fn file_path(
        &self,
        context: &AttachmentContext,
        name: &str,
        kind: PathKind,
    ) -> AttachmentResult<Option<String>> {
        let name = segment(name)?;
        let disk = self.disk_name(context);
        let backend = self.disks.disk(disk)?;
        let directory = context.storage_path()?;

        let Some(file) = find(backend.as_ref(), &directory, name).await?.into_iter().next() else {
            return Ok(None);
        };

        let storage_path = format!("{directory}{file}");
        if !backend.exists(&storage_path).await? {
            tracing::debug!(path = %storage_path, disk, "Listed file is gone from the disk");
            return Ok(None);
        }

        match kind {
            PathKind::Storage => Ok(Some(storage_path)),
            PathKind::Full => {
                let root = self.config.disk_root(disk)?;
                let full = context.full_path(root)?.join(file);
                Ok(Some(full.to_string_lossy().into_owned()))
            }
        }
    }

    /// Every file in a sub-folder of the record, mapped to its public URL
    ///
    /// Keys are backend-relative paths suitable for deletion. Hidden files
    /// and files without an extension are skipped.
    pub async fn files(
        &self,
        context: &AttachmentContext,
        folder: &str,
    ) -> AttachmentResult<BTreeMap<String, String>> {
        let folder = segment(folder)?;
        let backend = self.disks.disk(self.disk_name(context))?;
        let directory = format!("{}{folder}", context.storage_path()?);

        let mut urls = BTreeMap::new();
        for file in listing(backend.as_ref(), &directory).await? {
            let path = format!("{directory}/{file}");
            let url = backend.url(&path).await?;
            urls.insert(path, url);
        }

        Ok(urls)
    }

    /// Stores the upload under `key` as the record's file `name`
    ///
    /// `name` defaults to `key`. Returns `None` without touching the disk
    /// when nothing was uploaded under `key`.
    pub async fn put_file(
        &self,
        context: &AttachmentContext,
        uploads: &Uploads,
        key: &str,
        name: Option<&str>,
        options: &StoreOptions,
    ) -> AttachmentResult<Option<String>> {
        let Some(file) = uploads.file(key) else {
            tracing::debug!(table = %context.table(), key, "No file uploaded, nothing to store");
            return Ok(None);
        };

        self.put_uploaded_file(context, file, name.unwrap_or(key), options)
            .await
            .map(Some)
    }

    /// Stores `file` as the record's file `name`, replacing any previous one
    ///
    /// The detected extension of the upload is appended to `name`. Previous
    /// files of the same name are looked up and deleted on the record's
    /// disk, while `options.disk` may send the new file elsewhere.
    pub async fn put_uploaded_file(
        &self,
        context: &AttachmentContext,
        file: &UploadedFile,
        name: &str,
        options: &StoreOptions,
    ) -> AttachmentResult<String> {
        let name = segment(name)?;
        let extension = file
            .extension()
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
        self.replace(context, name, &format!("{name}.{extension}"), file, options)
            .await
    }

    /// Stores a base64 field under `key` as the record's file `name`
    ///
    /// Only applies when `key` carries a value but no uploaded file; returns
    /// `None` otherwise. The extension is sniffed from the decoded bytes and
    /// falls back to [`DEFAULT_BASE64_EXTENSION`](super::DEFAULT_BASE64_EXTENSION).
    pub async fn put_base64_file(
        &self,
        context: &AttachmentContext,
        uploads: &Uploads,
        key: &str,
        name: Option<&str>,
        options: &StoreOptions,
    ) -> AttachmentResult<Option<String>> {
        if uploads.has_file(key) {
            return Ok(None);
        }
        let Some(payload) = uploads.input(key) else {
            tracing::debug!(table = %context.table(), key, "No base64 value sent, nothing to store");
            return Ok(None);
        };

        let name = segment(name.unwrap_or(key))?;
        let file = decode_base64_file(name, payload)?;
        self.put_uploaded_file(context, &file, name, options)
            .await
            .map(Some)
    }

    /// Stores every upload under `key` in the record's sub-folder
    ///
    /// `folder` defaults to `key`. Each file gets a generated unique name. With
    /// `delete_existing`, the files that were in the folder before the call
    /// are deleted once all uploads are stored; files written by this call
    /// are never deleted. An old file that cannot be deleted is logged and
    /// kept. A failing upload aborts the call: earlier uploads stay stored
    /// and the old files are kept.
    pub async fn put_files(
        &self,
        context: &AttachmentContext,
        uploads: &Uploads,
        key: &str,
        folder: Option<&str>,
        delete_existing: bool,
        options: &StoreOptions,
    ) -> AttachmentResult<Vec<String>> {
        let files: Vec<&UploadedFile> = uploads.files(key).iter().collect();
        self.put_batch(context, &files, folder.unwrap_or(key), delete_existing, options)
            .await
    }

    /// Stores every base64 value and every upload under `key` in a sub-folder
    ///
    /// Behaves like [`put_files`](Self::put_files); decoded payloads are
    /// stored first, uploaded files after them. All payloads are decoded
    /// before anything is written.
    pub async fn put_base64_files(
        &self,
        context: &AttachmentContext,
        uploads: &Uploads,
        key: &str,
        folder: Option<&str>,
        delete_existing: bool,
        options: &StoreOptions,
    ) -> AttachmentResult<Vec<String>> {
        let folder = folder.unwrap_or(key);
        let decoded = uploads
            .inputs(key)
            .iter()
            .map(|payload| decode_base64_file(folder, payload))
            .collect::<AttachmentResult<Vec<_>>>()?;

        let files: Vec<&UploadedFile> = decoded.iter().chain(uploads.files(key)).collect();
        self.put_batch(context, &files, folder, delete_existing, options)
            .await
    }

    /// Deletes every file of a record that is removed for good
    ///
    /// Soft removal keeps the files. The record directory is deleted on the
    /// disk named by the context. Returns whether anything was deleted.
    pub async fn delete_on_record_removal(
        &self,
        context: &AttachmentContext,
        kind: RemovalKind,
    ) -> AttachmentResult<bool> {
        if kind == RemovalKind::Soft {
            tracing::debug!(table = %context.table(), key = ?context.key(), "Soft removal, keeping files");
            return Ok(false);
        }

        let disk = self.disk_name(context);
        let backend = self.disks.disk(disk)?;
        let directory = context.record_directory()?;

        let removed = backend.delete_directory(&directory).await?;
        tracing::info!(path = %directory, disk, removed, "Deleted files of removed record");
        Ok(removed)
    }

    /// Stores `file` as `file_name` and deletes the other `name.*` files
    async fn replace(
        &self,
        context: &AttachmentContext,
        name: &str,
        file_name: &str,
        file: &UploadedFile,
        options: &StoreOptions,
    ) -> AttachmentResult<String> {
        let disk = self.disk_name(context);
        let backend = self.disks.disk(disk)?;
        let directory = context.storage_path()?;
        let previous = find(backend.as_ref(), &directory, name).await?;

        let (target_disk, target, options) = self.target(disk, options)?;
        let stored = target
            .store(directory.trim_end_matches('/'), file_name, file, &options)
            .await?;
        tracing::info!(path = %stored, disk = %target_disk, "Stored file");

        for old in previous {
            // Stored over in place
            if old == file_name && target_disk == disk {
                continue;
            }
            delete(backend.as_ref(), disk, &format!("{directory}{old}")).await;
        }

        Ok(stored)
    }

    /// Stores files under unique names in a sub-folder of the record
    async fn put_batch(
        &self,
        context: &AttachmentContext,
        files: &[&UploadedFile],
        folder: &str,
        delete_existing: bool,
        options: &StoreOptions,
    ) -> AttachmentResult<Vec<String>> {
        if files.is_empty() {
            tracing::debug!(table = %context.table(), folder, "No files uploaded, nothing to store");
            return Ok(Vec::new());
        }

        let folder = segment(folder)?;
        let disk = self.disk_name(context);
        let backend = self.disks.disk(disk)?;
        let directory = format!("{}{folder}", context.storage_path()?);

        // Taken before the first write so new files are never purged
        let previous = if delete_existing {
            listing(backend.as_ref(), &directory).await?
        } else {
            Vec::new()
        };

        let (target_disk, target, options) = self.target(disk, options)?;
        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            let extension = file
                .extension()
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
            let file_name = format!("{}.{extension}", Uuid::new_v4().simple());
            stored.push(target.store(&directory, &file_name, file, &options).await?);
        }
        tracing::info!(path = %directory, disk = %target_disk, count = stored.len(), "Stored files");

        for old in previous {
            delete(backend.as_ref(), disk, &format!("{directory}/{old}")).await;
        }

        Ok(stored)
    }

    /// Disk that receives new files, with the options it is given
    fn target(
        &self,
        disk: &str,
        options: &StoreOptions,
    ) -> AttachmentResult<(String, Arc<dyn StorageBackend>, StoreOptions)> {
        let target_disk = options.disk.clone().unwrap_or_else(|| disk.to_string());
        let target = self.disks.disk(&target_disk)?;
        let options = StoreOptions {
            disk: Some(target_disk.clone()),
        };
        Ok((target_disk, target, options))
    }
}

/// Files in `directory` named `name.<ext>`, sorted by file name
async fn find(
    backend: &dyn StorageBackend,
    directory: &str,
    name: &str,
) -> AttachmentResult<Vec<String>> {
    let prefix = format!("{name}.");
    let mut found: Vec<String> = backend
        .files(directory)
        .await?
        .into_iter()
        .filter(|file| file.starts_with(&prefix))
        .collect();
    found.sort();
    Ok(found)
}

/// Visible files with an extension in `directory`, sorted by file name
async fn listing(backend: &dyn StorageBackend, directory: &str) -> AttachmentResult<Vec<String>> {
    let mut found: Vec<String> = backend
        .files(directory)
        .await?
        .into_iter()
        .filter(|file| !file.starts_with('.') && file.contains('.'))
        .collect();
    found.sort();
    Ok(found)
}

/// Deletes a replaced file; a failure is logged and the file left behind
async fn delete(backend: &dyn StorageBackend, disk: &str, path: &str) {
    match backend.delete(path).await {
        Ok(true) => tracing::debug!(path, disk, "Deleted replaced file"),
        Ok(false) => tracing::debug!(path, disk, "Replaced file already gone"),
        Err(e) => tracing::warn!(path, disk, error = %e, "Failed to delete replaced file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiskSettings;
    use crate::error::AttachmentError;
    use crate::storage::{MockStorageBackend, StorageError};
    use mockall::predicate::eq;

    fn resolver_with(backend: MockStorageBackend) -> FileAttachmentResolver {
        let config = FilesConfig::default()
            .with_disk("local", DiskSettings::local("/data"))
            .with_fallback("products", "/img/no-product.png");
        let disks = Disks::new().with_disk("local", Arc::new(backend));
        FileAttachmentResolver::new(disks, config)
    }

    fn product() -> AttachmentContext {
        AttachmentContext::for_record("products", 42)
    }

    fn png() -> UploadedFile {
        UploadedFile::new("photo.png", "image/png", b"png bytes".to_vec())
    }

    #[tokio::test]
    async fn test_file_prefers_smallest_name() {
        let mut backend = MockStorageBackend::new();
        backend
            .expect_files()
            .with(eq("products/42/"))
            .returning(|_| {
                Ok(vec![
                    "image.png".to_string(),
                    "image.jpg".to_string(),
                    "imagery.gif".to_string(),
                ])
            });
        backend
            .expect_url()
            .with(eq("products/42/image.jpg"))
            .returning(|path| Ok(format!("https://cdn.test/{path}")));

        let url = resolver_with(backend).file(&product(), "image", None).await.unwrap();
        assert_eq!(url, "https://cdn.test/products/42/image.jpg");
    }

    #[tokio::test]
    async fn test_file_fallbacks() {
        let mut backend = MockStorageBackend::new();
        backend.expect_files().returning(|_| Ok(vec!["imagery.gif".to_string()]));
        let resolver = resolver_with(backend);

        let configured = resolver.file(&product(), "image", None).await.unwrap();
        assert_eq!(configured, "/img/no-product.png");

        let explicit = resolver
            .file(&product(), "image", Some("/img/custom.png"))
            .await
            .unwrap();
        assert_eq!(explicit, "/img/custom.png");

        let unconfigured = resolver
            .file(&AttachmentContext::for_record("users", 1), "avatar", None)
            .await;
        assert!(matches!(unconfigured, Err(AttachmentError::MissingFallback(t)) if t == "users"));
    }

    #[tokio::test]
    async fn test_file_path_requires_backend_agreement() {
        let mut backend = MockStorageBackend::new();
        backend.expect_files().returning(|_| Ok(vec!["image.png".to_string()]));
        backend
            .expect_exists()
            .with(eq("products/42/image.png"))
            .times(1)
            .returning(|_| Ok(false));

        let path = resolver_with(backend)
            .file_path(&product(), "image", PathKind::Storage)
            .await
            .unwrap();
        assert!(path.is_none());
    }

    #[tokio::test]
    async fn test_file_path_kinds() {
        let mut backend = MockStorageBackend::new();
        backend.expect_files().returning(|_| Ok(vec!["image.png".to_string()]));
        backend.expect_exists().returning(|_| Ok(true));
        let resolver = resolver_with(backend);

        let storage = resolver
            .file_path(&product(), "image", PathKind::Storage)
            .await
            .unwrap();
        assert_eq!(storage.as_deref(), Some("products/42/image.png"));

        let full = resolver
            .file_path(&product(), "image", PathKind::Full)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            std::path::PathBuf::from(full),
            std::path::Path::new("/data").join("products").join("42").join("image.png")
        );
    }

    #[tokio::test]
    async fn test_backend_failures_propagate() {
        let mut backend = MockStorageBackend::new();
        backend
            .expect_files()
            .returning(|_| Err(StorageError::Other("disk offline".to_string())));

        let result = resolver_with(backend).file(&product(), "image", Some("/x.png")).await;
        assert!(matches!(
            result,
            Err(AttachmentError::Storage(StorageError::Other(msg))) if msg == "disk offline"
        ));
    }

    #[tokio::test]
    async fn test_put_file_without_upload_is_noop() {
        // No expectations: any backend call would panic
        let backend = MockStorageBackend::new();

        let stored = resolver_with(backend)
            .put_file(&product(), &Uploads::new(), "image", None, &StoreOptions::default())
            .await
            .unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn test_replace_stores_before_deleting() {
        let mut seq = mockall::Sequence::new();
        let mut backend = MockStorageBackend::new();
        backend
            .expect_files()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec!["image.jpg".to_string(), "image.png".to_string()]));
        backend
            .expect_store()
            .withf(|dir, name, _, options| {
                dir == "products/42" && name == "image.png" && options.disk.as_deref() == Some("local")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|dir, name, _, _| Ok(format!("{dir}/{name}")));
        // image.png was overwritten in place, only image.jpg is removed
        backend
            .expect_delete()
            .with(eq("products/42/image.jpg"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));

        let uploads = Uploads::new().with_file("image", png());
        let stored = resolver_with(backend)
            .put_file(&product(), &uploads, "image", None, &StoreOptions::default())
            .await
            .unwrap();
        assert_eq!(stored.as_deref(), Some("products/42/image.png"));
    }

    #[tokio::test]
    async fn test_failed_store_keeps_old_file() {
        let mut backend = MockStorageBackend::new();
        backend.expect_files().returning(|_| Ok(vec!["image.jpg".to_string()]));
        backend
            .expect_store()
            .returning(|_, _, _, _| Err(StorageError::Other("quota".to_string())));
        backend.expect_delete().times(0);

        let uploads = Uploads::new().with_file("image", png());
        let result = resolver_with(backend)
            .put_file(&product(), &uploads, "image", None, &StoreOptions::default())
            .await;
        assert!(matches!(result, Err(AttachmentError::Storage(_))));
    }

    #[tokio::test]
    async fn test_disk_override_deletes_from_record_disk() {
        let mut local = MockStorageBackend::new();
        local.expect_files().returning(|_| Ok(vec!["image.png".to_string()]));
        local
            .expect_delete()
            .with(eq("products/42/image.png"))
            .times(1)
            .returning(|_| Ok(true));
        local.expect_store().times(0);

        let mut archive = MockStorageBackend::new();
        archive
            .expect_store()
            .withf(|_, _, _, options| options.disk.as_deref() == Some("archive"))
            .times(1)
            .returning(|dir, name, _, _| Ok(format!("{dir}/{name}")));

        let disks = Disks::new()
            .with_disk("local", Arc::new(local))
            .with_disk("archive", Arc::new(archive));
        let resolver = FileAttachmentResolver::new(disks, FilesConfig::default());

        let stored = resolver
            .put_uploaded_file(&product(), &png(), "image", &StoreOptions::on_disk("archive"))
            .await
            .unwrap();
        assert_eq!(stored, "products/42/image.png");
    }

    #[tokio::test]
    async fn test_put_files_purges_snapshot_only() {
        let mut backend = MockStorageBackend::new();
        backend
            .expect_files()
            .with(eq("products/42/gallery"))
            .times(1)
            .returning(|_| Ok(vec!["a.jpg".to_string(), "b.jpg".to_string()]));
        backend
            .expect_store()
            .times(2)
            .returning(|dir, name, _, _| Ok(format!("{dir}/{name}")));
        backend
            .expect_delete()
            .withf(|path: &str| path == "products/42/gallery/a.jpg" || path == "products/42/gallery/b.jpg")
            .times(2)
            .returning(|_| Ok(true));

        let uploads = Uploads::new().with_files("gallery", vec![png(), png()]);
        let stored = resolver_with(backend)
            .put_files(&product(), &uploads, "gallery", None, true, &StoreOptions::default())
            .await
            .unwrap();

        assert_eq!(stored.len(), 2);
        assert_ne!(stored[0], stored[1]);
        assert!(stored.iter().all(|p| p.starts_with("products/42/gallery/") && p.ends_with(".png")));
    }

    #[tokio::test]
    async fn test_put_files_purge_continues_past_failed_delete() {
        let mut backend = MockStorageBackend::new();
        backend
            .expect_files()
            .returning(|_| Ok(vec!["a.jpg".to_string(), "b.jpg".to_string()]));
        backend
            .expect_store()
            .times(2)
            .returning(|dir, name, _, _| Ok(format!("{dir}/{name}")));
        backend
            .expect_delete()
            .with(eq("products/42/gallery/a.jpg"))
            .times(1)
            .returning(|_| Err(StorageError::Other("permission denied".to_string())));
        backend
            .expect_delete()
            .with(eq("products/42/gallery/b.jpg"))
            .times(1)
            .returning(|_| Ok(true));

        let uploads = Uploads::new().with_files("gallery", vec![png(), png()]);
        let stored = resolver_with(backend)
            .put_files(&product(), &uploads, "gallery", None, true, &StoreOptions::default())
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn test_replace_keeps_stored_path_when_delete_fails() {
        let mut backend = MockStorageBackend::new();
        backend
            .expect_files()
            .returning(|_| Ok(vec!["image.gif".to_string(), "image.jpg".to_string()]));
        backend
            .expect_store()
            .times(1)
            .returning(|dir, name, _, _| Ok(format!("{dir}/{name}")));
        backend
            .expect_delete()
            .with(eq("products/42/image.gif"))
            .times(1)
            .returning(|_| Err(StorageError::Other("busy".to_string())));
        backend
            .expect_delete()
            .with(eq("products/42/image.jpg"))
            .times(1)
            .returning(|_| Ok(true));

        let stored = resolver_with(backend)
            .put_uploaded_file(&product(), &png(), "image", &StoreOptions::default())
            .await
            .unwrap();
        assert_eq!(stored, "products/42/image.png");
    }

    #[tokio::test]
    async fn test_put_files_partial_failure_keeps_earlier_files() {
        let mut backend = MockStorageBackend::new();
        backend.expect_files().returning(|_| Ok(vec!["old.jpg".to_string()]));
        let mut calls = 0;
        backend.expect_store().times(2).returning(move |dir, name, _, _| {
            calls += 1;
            if calls == 1 {
                Ok(format!("{dir}/{name}"))
            } else {
                Err(StorageError::Other("disk full".to_string()))
            }
        });
        backend.expect_delete().times(0);

        let uploads = Uploads::new().with_files("gallery", vec![png(), png(), png()]);
        let result = resolver_with(backend)
            .put_files(&product(), &uploads, "gallery", None, true, &StoreOptions::default())
            .await;
        assert!(matches!(result, Err(AttachmentError::Storage(_))));
    }

    #[tokio::test]
    async fn test_soft_removal_keeps_files() {
        let mut backend = MockStorageBackend::new();
        backend.expect_delete_directory().times(0);

        let removed = resolver_with(backend)
            .delete_on_record_removal(&product(), RemovalKind::Soft)
            .await
            .unwrap();
        assert!(!removed);
    }

    #[tokio::test]
    async fn test_permanent_removal_uses_context_disk() {
        let mut local = MockStorageBackend::new();
        local.expect_delete_directory().times(0);
        let mut public = MockStorageBackend::new();
        public
            .expect_delete_directory()
            .with(eq("products/42/"))
            .times(1)
            .returning(|_| Ok(true));

        let disks = Disks::new()
            .with_disk("local", Arc::new(local))
            .with_disk("public", Arc::new(public));
        let resolver = FileAttachmentResolver::new(disks, FilesConfig::default());

        let removed = resolver
            .delete_on_record_removal(&product().with_disk("public"), RemovalKind::Permanent)
            .await
            .unwrap();
        assert!(removed);
    }

    #[tokio::test]
    async fn test_invalid_names_are_rejected() {
        let resolver = resolver_with(MockStorageBackend::new());

        for name in ["../secret", "a/b", ""] {
            let result = resolver.file(&product(), name, None).await;
            assert!(matches!(result, Err(AttachmentError::InvalidName(_))), "{name:?}");
        }
    }
}
