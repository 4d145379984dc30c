//! Files that belong to database records
//!
//! A record's files live on a named disk below a directory derived from the
//! record itself:
//!
//! ```text
//! <table>/<key>/<name>.<ext>              per-record file
//! <table>/<key>/<folder>/<unique>.<ext>   per-record folder
//! <table>/<name>.<ext>                    file shared by the table (global)
//! ```
//!
//! Records take part by implementing [`HasFiles`] (or by building an
//! [`AttachmentContext`] by hand) and handing the context to a
//! [`FileAttachmentResolver`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use acton_files::attachments::{FileAttachmentResolver, HasFiles, RemovalKind, Uploads};
//! use acton_files::config::FilesConfig;
//! use acton_files::storage::StoreOptions;
//!
//! struct Product {
//!     id: i64,
//! }
//!
//! impl HasFiles for Product {
//!     fn table_name(&self) -> &str {
//!         "products"
//!     }
//!
//!     fn record_key(&self) -> Option<String> {
//!         Some(self.id.to_string())
//!     }
//! }
//!
//! # async fn example(uploads: Uploads) -> anyhow::Result<()> {
//! let resolver = FileAttachmentResolver::from_config(FilesConfig::load()?)?;
//! let product = Product { id: 42 };
//!
//! // Replace the product image and add gallery pictures
//! resolver
//!     .put_file(&product.attachments(), &uploads, "image", None, &StoreOptions::default())
//!     .await?;
//! resolver
//!     .put_files(&product.attachments(), &uploads, "gallery", None, false, &StoreOptions::default())
//!     .await?;
//!
//! let image = resolver.file(&product.attachments(), "image", None).await?;
//! let gallery = resolver.files(&product.attachments(), "gallery").await?;
//!
//! // Called by the delete handler once the row is gone for good
//! resolver
//!     .delete_on_record_removal(&product.attachments(), RemovalKind::Permanent)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod resolver;
mod uploads;

pub use context::{AttachmentContext, HasFiles};
pub use resolver::{FileAttachmentResolver, PathKind, RemovalKind, DEFAULT_EXTENSION};
pub use uploads::{decode_base64_file, Uploads, DEFAULT_BASE64_EXTENSION};
