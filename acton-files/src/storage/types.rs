//! Core types for file storage

use mime::Mime;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during file storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// File not found in storage
    #[error("File not found: {0}")]
    NotFound(String),

    /// I/O error during storage operation
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid file path or identifier
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Generic storage error
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A file that has been uploaded but not yet stored
///
/// This is the in-memory form of one file taken from the inbound request
/// before it is written to a disk.
///
/// # Examples
///
/// ```rust
/// use acton_files::storage::UploadedFile;
///
/// let file = UploadedFile {
///     filename: "document.pdf".to_string(),
///     content_type: "application/pdf".to_string(),
///     data: vec![0x25, 0x50, 0x44, 0x46], // PDF magic bytes
/// };
///
/// assert_eq!(file.size(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original filename from the upload
    pub filename: String,

    /// MIME content type as sent by the client (e.g., "image/png")
    pub content_type: String,

    /// File data as bytes
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Creates a new uploaded file
    ///
    /// # Examples
    ///
    /// ```rust
    /// use acton_files::storage::UploadedFile;
    ///
    /// let file = UploadedFile::new(
    ///     "photo.jpg",
    ///     "image/jpeg",
    ///     vec![0xFF, 0xD8, 0xFF], // JPEG magic bytes
    /// );
    /// ```
    #[must_use]
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Returns the size of the file in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Detects the extension the file should be stored with
    ///
    /// The file content wins over anything the client claims: magic bytes
    /// are sniffed first, then the declared MIME type is consulted, and the
    /// client filename is only used when neither is conclusive.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use acton_files::storage::UploadedFile;
    ///
    /// // PNG signature, misleading client name
    /// let png = UploadedFile::new(
    ///     "avatar.jpg",
    ///     "application/octet-stream",
    ///     vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A],
    /// );
    /// assert_eq!(png.extension().as_deref(), Some("png"));
    ///
    /// let text = UploadedFile::new("notes", "text/plain", b"hello".to_vec());
    /// assert_eq!(text.extension().as_deref(), Some("txt"));
    ///
    /// let unknown = UploadedFile::new("README", "application/x-unknown", vec![]);
    /// assert_eq!(unknown.extension(), None);
    /// ```
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        if let Some(kind) = infer::get(&self.data) {
            return Some(kind.extension().to_string());
        }

        if let Some(ext) = extension_for_mime(&self.content_type) {
            return Some(ext.to_string());
        }

        self.client_extension().map(str::to_ascii_lowercase)
    }

    /// Returns the extension of the client-supplied filename, if any
    #[must_use]
    pub fn client_extension(&self) -> Option<&str> {
        Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
    }
}

impl fmt::Display for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UploadedFile(filename={}, content_type={}, size={})",
            self.filename,
            self.content_type,
            self.size()
        )
    }
}

/// Maps a declared MIME type onto the extension it is stored under
///
/// Types with several registered extensions use the usual spelling;
/// everything else takes the first extension `mime_guess` knows for it.
/// `application/octet-stream` maps to nothing.
fn extension_for_mime(content_type: &str) -> Option<&'static str> {
    let parsed: Mime = content_type.parse().ok()?;
    // Says nothing about the content
    if parsed.essence_str() == mime::APPLICATION_OCTET_STREAM.essence_str() {
        return None;
    }

    let preferred = [
        (mime::IMAGE_JPEG, "jpg"),
        (mime::IMAGE_SVG, "svg"),
        (mime::TEXT_PLAIN, "txt"),
        (mime::TEXT_HTML, "html"),
        (mime::TEXT_XML, "xml"),
    ];

    if let Some((_, ext)) = preferred
        .iter()
        .find(|(candidate, _)| candidate.essence_str() == parsed.essence_str())
    {
        return Some(*ext);
    }

    mime_guess::get_mime_extensions_str(parsed.essence_str())
        .and_then(|extensions| extensions.first().copied())
}

/// Options forwarded to a storage backend when a file is stored
///
/// # Examples
///
/// ```rust
/// use acton_files::storage::StoreOptions;
///
/// let options = StoreOptions::on_disk("s3");
/// assert_eq!(options.disk.as_deref(), Some("s3"));
/// assert!(StoreOptions::default().disk.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Disk that receives the file, overriding the disk of the record
    pub disk: Option<String>,
}

impl StoreOptions {
    /// Options that store on the named disk
    #[must_use]
    pub fn on_disk(name: impl Into<String>) -> Self {
        Self {
            disk: Some(name.into()),
        }
    }
}
