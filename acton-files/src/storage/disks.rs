//! Registry of named storage disks

use super::local::LocalDisk;
use super::traits::StorageBackend;
use crate::config::FilesConfig;
use crate::error::{AttachmentError, AttachmentResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Driver name of the built-in local filesystem backend
pub const LOCAL_DRIVER: &str = "local";

/// Storage backends addressed by disk name
///
/// Local disks are built straight from configuration. Backends for any other
/// driver (S3, FTP, ...) are registered by the application.
///
/// # Examples
///
/// ```rust,no_run
/// use acton_files::config::FilesConfig;
/// use acton_files::storage::{Disks, LocalDisk};
/// use std::sync::Arc;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = FilesConfig::load()?;
/// let disks = Disks::from_config(&config)?
///     .with_disk("archive", Arc::new(LocalDisk::new("/mnt/archive", "/archive")?));
///
/// let local = disks.disk("local")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct Disks {
    backends: HashMap<String, Arc<dyn StorageBackend>>,
}

impl Disks {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a local backend for every configured `local` disk
    ///
    /// Disks with another driver are skipped and must be registered with
    /// [`register`](Self::register).
    pub fn from_config(config: &FilesConfig) -> AttachmentResult<Self> {
        let mut disks = Self::new();

        for (name, settings) in &config.disks {
            if settings.driver != LOCAL_DRIVER {
                tracing::warn!(
                    disk = %name,
                    driver = %settings.driver,
                    "No built-in backend for disk driver; register one explicitly"
                );
                continue;
            }

            let root = config.disk_root(name)?;
            let url = config.root_link(name)?;
            disks.register(name.clone(), Arc::new(LocalDisk::new(root, url)?));
            tracing::debug!(disk = %name, root = %root.display(), "Registered local disk");
        }

        Ok(disks)
    }

    /// Registers a backend under a disk name, replacing any previous one
    pub fn register(&mut self, name: impl Into<String>, backend: Arc<dyn StorageBackend>) {
        self.backends.insert(name.into(), backend);
    }

    /// Builder form of [`register`](Self::register)
    #[must_use]
    pub fn with_disk(mut self, name: impl Into<String>, backend: Arc<dyn StorageBackend>) -> Self {
        self.register(name, backend);
        self
    }

    /// Backend registered under `name`
    pub fn disk(&self, name: &str) -> AttachmentResult<Arc<dyn StorageBackend>> {
        self.backends
            .get(name)
            .cloned()
            .ok_or_else(|| AttachmentError::UnknownDisk(name.to_string()))
    }

    /// Whether a backend is registered under `name`
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.backends.contains_key(name)
    }
}

impl fmt::Debug for Disks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.backends.keys().collect();
        names.sort();
        f.debug_struct("Disks").field("names", &names).finish()
    }
}
