//! acton-files: record-scoped file attachments for Acton applications
//!
//! Gives any database record a set of files on a named storage disk. Paths
//! are derived from the record's table and key, so a product's image lives
//! at `products/42/image.png` and is found again by its logical name
//! `image`, whatever extension it was uploaded with.
//!
//! # Design Principles
//!
//! 1. **Composition Over Inheritance**: records implement [`attachments::HasFiles`]
//!    and hand a context to a shared resolver
//! 2. **Backend Agnostic**: disks are [`storage::StorageBackend`] trait objects
//! 3. **No Hidden State**: the disk travels with every call, nothing is global
//! 4. **Explicit Failures**: missing configuration is an error, a missing file is not
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use acton_files::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     acton_files::observability::init()?;
//!
//!     let resolver = FileAttachmentResolver::from_config(FilesConfig::load()?)?;
//!     let product = AttachmentContext::for_record("products", 42);
//!
//!     let uploads = Uploads::new()
//!         .with_file("image", UploadedFile::new("photo.png", "image/png", vec![/* ... */]));
//!     resolver
//!         .put_file(&product, &uploads, "image", None, &StoreOptions::default())
//!         .await?;
//!
//!     println!("{}", resolver.file(&product, "image", None).await?);
//!     Ok(())
//! }
//! ```

// Lint configuration is handled at the workspace level in Cargo.toml
// Additional crate-specific allows:
#![allow(clippy::missing_errors_doc)]

pub mod attachments;
pub mod config;
pub mod error;
pub mod observability;
pub mod storage;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! # Examples
    //!
    //! ```rust
    //! use acton_files::prelude::*;
    //! ```

    // Attachments
    pub use crate::attachments::{
        AttachmentContext, FileAttachmentResolver, HasFiles, PathKind, RemovalKind, Uploads,
    };

    // Configuration
    pub use crate::config::{DiskSettings, FilesConfig};

    // Storage
    pub use crate::storage::{
        Disks, LocalDisk, StorageBackend, StorageError, StoreOptions, UploadedFile,
    };

    // Error types
    pub use crate::error::{AttachmentError, AttachmentResult};
}
