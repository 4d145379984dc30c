//! Named uploads taken from an inbound request

use crate::error::AttachmentResult;
use crate::storage::UploadedFile;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;

/// Extension given to base64 payloads whose content is not recognised
pub const DEFAULT_BASE64_EXTENSION: &str = "jpg";

/// Files and base64 fields of a request, grouped by form field name
///
/// The request layer fills this in; attachment operations only read from it.
///
/// # Examples
///
/// ```rust
/// use acton_files::attachments::Uploads;
/// use acton_files::storage::UploadedFile;
///
/// let uploads = Uploads::new()
///     .with_file("image", UploadedFile::new("photo.png", "image/png", vec![1, 2, 3]))
///     .with_input("signature", "iVBORw0KGgo=");
///
/// assert!(uploads.has_file("image"));
/// assert!(!uploads.has_file("signature"));
/// assert_eq!(uploads.input("signature"), Some("iVBORw0KGgo="));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Uploads {
    files: HashMap<String, Vec<UploadedFile>>,
    inputs: HashMap<String, Vec<String>>,
}

impl Uploads {
    /// Creates an empty set of uploads
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file under a field name
    #[must_use]
    pub fn with_file(mut self, key: impl Into<String>, file: UploadedFile) -> Self {
        self.files.entry(key.into()).or_default().push(file);
        self
    }

    /// Adds several files under one field name
    #[must_use]
    pub fn with_files(
        mut self,
        key: impl Into<String>,
        files: impl IntoIterator<Item = UploadedFile>,
    ) -> Self {
        self.files.entry(key.into()).or_default().extend(files);
        self
    }

    /// Adds a base64 value under a field name
    #[must_use]
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inputs.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Adds several base64 values under one field name
    #[must_use]
    pub fn with_inputs<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.inputs
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Whether at least one file was uploaded under `key`
    #[must_use]
    pub fn has_file(&self, key: &str) -> bool {
        !self.files(key).is_empty()
    }

    /// First file uploaded under `key`
    #[must_use]
    pub fn file(&self, key: &str) -> Option<&UploadedFile> {
        self.files(key).first()
    }

    /// Every file uploaded under `key`
    #[must_use]
    pub fn files(&self, key: &str) -> &[UploadedFile] {
        self.files.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// First base64 value sent under `key`
    #[must_use]
    pub fn input(&self, key: &str) -> Option<&str> {
        self.inputs(key).first().map(String::as_str)
    }

    /// Every base64 value sent under `key`
    #[must_use]
    pub fn inputs(&self, key: &str) -> &[String] {
        self.inputs.get(key).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Decodes a base64 payload into a file named `name`
///
/// Plain base64 and `data:` URIs are accepted; the MIME type of a data URI
/// is kept as the content type. The file name carries
/// [`DEFAULT_BASE64_EXTENSION`], which only decides the stored extension
/// when the content itself is not recognised.
///
/// # Examples
///
/// ```rust
/// use acton_files::attachments::decode_base64_file;
///
/// let file = decode_base64_file("signature", "data:image/png;base64,iVBORw0KGgo=").unwrap();
/// assert_eq!(file.content_type, "image/png");
/// assert_eq!(file.extension().as_deref(), Some("png"));
///
/// let opaque = decode_base64_file("blob", "AAEC").unwrap();
/// assert_eq!(opaque.data, vec![0, 1, 2]);
/// assert_eq!(opaque.extension().as_deref(), Some("jpg"));
/// ```
pub fn decode_base64_file(name: &str, payload: &str) -> AttachmentResult<UploadedFile> {
    let (content_type, encoded) = split_data_uri(payload.trim());

    let cleaned: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let data = STANDARD.decode(cleaned)?;

    Ok(UploadedFile::new(
        format!("{name}.{DEFAULT_BASE64_EXTENSION}"),
        content_type.unwrap_or(mime::APPLICATION_OCTET_STREAM.essence_str()),
        data,
    ))
}

/// Splits `data:<mime>;base64,<payload>` into its MIME type and payload
fn split_data_uri(payload: &str) -> (Option<&str>, &str) {
    let Some(rest) = payload.strip_prefix("data:") else {
        return (None, payload);
    };

    match rest.split_once(',') {
        Some((header, encoded)) => {
            let media_type = header.trim_end_matches(";base64");
            (Some(media_type).filter(|m| !m.is_empty()), encoded)
        }
        None => (None, payload),
    }
}
