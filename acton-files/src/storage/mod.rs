//! File storage abstraction and implementations
//!
//! Attachments are written to named "disks". Each disk is a
//! [`StorageBackend`]:
//! - Local filesystem storage ([`LocalDisk`], built in)
//! - Anything else (S3, FTP, ...) implemented by the application and
//!   registered in [`Disks`]
//!
//! # Architecture
//!
//! The `StorageBackend` trait works on disk-relative paths such as
//! `products/42/image.png`, so attachment code never needs to know where a
//! disk keeps its bytes. This allows applications to:
//! - Switch a disk from local storage to object storage without touching
//!   record code
//! - Test against a temporary directory and deploy against S3
//! - Keep several disks side by side and pick one per record
//!
//! # Examples
//!
//! ```rust,no_run
//! use acton_files::storage::{LocalDisk, StorageBackend, StoreOptions, UploadedFile};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let disk = LocalDisk::new("/var/www/storage/app", "http://localhost:3000/storage/app")?;
//!
//! let upload = UploadedFile::new("avatar.png", "image/png", vec![/* ... */]);
//! let path = disk.store("users/7", "avatar.png", &upload, &StoreOptions::default()).await?;
//!
//! assert!(disk.exists(&path).await?);
//! disk.delete(&path).await?;
//! # Ok(())
//! # }
//! ```

mod disks;
mod local;
mod traits;
mod types;

pub use disks::{Disks, LOCAL_DRIVER};
pub use local::LocalDisk;
pub use traits::StorageBackend;
#[cfg(test)]
pub use traits::MockStorageBackend;
pub use types::{StorageError, StorageResult, StoreOptions, UploadedFile};
