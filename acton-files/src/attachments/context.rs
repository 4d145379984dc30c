//! Record identity used to derive attachment paths

use crate::error::{AttachmentError, AttachmentResult};
use std::path::{Path, PathBuf};

/// Identity of the record whose files are being handled
///
/// A context is cheap to build and is rebuilt for every operation. It never
/// owns a backend; it only names the disk the files live on.
///
/// # Examples
///
/// ```rust
/// use acton_files::attachments::AttachmentContext;
///
/// let product = AttachmentContext::for_record("products", 42);
/// assert_eq!(product.storage_path().unwrap(), "products/42/");
///
/// let shared = AttachmentContext::global("products");
/// assert_eq!(shared.storage_path().unwrap(), "products/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentContext {
    table: String,
    key: Option<String>,
    global: bool,
    disk: Option<String>,
}

impl AttachmentContext {
    /// Context scoped to one record
    #[must_use]
    pub fn for_record(table: impl Into<String>, key: impl ToString) -> Self {
        Self {
            table: table.into(),
            key: Some(key.to_string()),
            global: false,
            disk: None,
        }
    }

    /// Context shared by every record of a table
    #[must_use]
    pub fn global(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            key: None,
            global: true,
            disk: None,
        }
    }

    /// Switches between the shared and the per-record namespace
    ///
    /// The key is kept, so a global context built from a record can still
    /// address that record's directory on removal.
    #[must_use]
    pub const fn with_global(mut self, global: bool) -> Self {
        self.global = global;
        self
    }

    /// Selects the disk the files live on
    #[must_use]
    pub fn with_disk(mut self, disk: impl Into<String>) -> Self {
        self.disk = Some(disk.into());
        self
    }

    /// Table (namespace) name
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Record key, absent for contexts built with [`global`](Self::global)
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Whether files are shared by all records of the table
    #[must_use]
    pub const fn is_global(&self) -> bool {
        self.global
    }

    /// Selected disk, `None` means the configured default
    #[must_use]
    pub fn disk(&self) -> Option<&str> {
        self.disk.as_deref()
    }

    /// Backend-relative directory of the files: `table/` or `table/key/`
    pub fn storage_path(&self) -> AttachmentResult<String> {
        let table = segment(&self.table)?;
        if self.global {
            return Ok(format!("{table}/"));
        }
        Ok(format!("{table}/{}/", self.record_segment()?))
    }

    /// Directory owned by the record, regardless of the global flag
    pub fn record_directory(&self) -> AttachmentResult<String> {
        Ok(format!("{}/{}/", segment(&self.table)?, self.record_segment()?))
    }

    /// Absolute directory of the files below a disk root
    pub fn full_path(&self, root: &Path) -> AttachmentResult<PathBuf> {
        let mut path = root.join(segment(&self.table)?);
        if !self.global {
            path.push(self.record_segment()?);
        }
        Ok(path)
    }

    fn record_segment(&self) -> AttachmentResult<&str> {
        let key = self
            .key
            .as_deref()
            .ok_or_else(|| AttachmentError::MissingRecordKey(self.table.clone()))?;
        segment(key)
    }
}

/// Checks that a name can be used as a single path segment
pub(crate) fn segment(name: &str) -> AttachmentResult<&str> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);

    if invalid {
        return Err(AttachmentError::InvalidName(name.to_string()));
    }
    Ok(name)
}

/// A record type that owns files
///
/// Implementing this trait is all a record needs to take part in the
/// attachment operations; the record hands out a context and the
/// [`FileAttachmentResolver`](super::FileAttachmentResolver) does the rest.
///
/// # Examples
///
/// ```rust
/// use acton_files::attachments::HasFiles;
///
/// struct Product {
///     id: i64,
/// }
///
/// impl HasFiles for Product {
///     fn table_name(&self) -> &str {
///         "products"
///     }
///
///     fn record_key(&self) -> Option<String> {
///         Some(self.id.to_string())
///     }
/// }
///
/// let context = Product { id: 42 }.attachments();
/// assert_eq!(context.storage_path().unwrap(), "products/42/");
/// ```
pub trait HasFiles {
    /// Table the record belongs to
    fn table_name(&self) -> &str;

    /// Primary key of the record, `None` before it is persisted
    fn record_key(&self) -> Option<String>;

    /// Whether the files of this record type are shared by all records
    fn files_are_global(&self) -> bool {
        false
    }

    /// Disk the files live on, `None` for the configured default
    fn files_disk(&self) -> Option<&str> {
        None
    }

    /// Context describing this record's files
    fn attachments(&self) -> AttachmentContext {
        let context = AttachmentContext {
            table: self.table_name().to_string(),
            key: self.record_key(),
            global: self.files_are_global(),
            disk: None,
        };

        match self.files_disk() {
            Some(disk) => context.with_disk(disk),
            None => context,
        }
    }
}
