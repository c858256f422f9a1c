//! Local file intake: read a file from disk into an uploadable [`PdfFile`].
//!
//! The content type is derived the way a browser file picker derives it,
//! from the extension. A file with no extension is sniffed for the `%PDF`
//! magic bytes instead. Whether the result is acceptable is decided later by
//! the session, so a `.txt` file loads fine here and is refused on submit.

use crate::error::InsightsError;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// MIME type the backend accepts.
pub const PDF_MIME: &str = "application/pdf";

const OCTET_STREAM: &str = "application/octet-stream";

/// A file ready to be sent to the upload endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct PdfFile {
    /// File name without directories, sent as the multipart file name.
    pub name: String,
    /// MIME type sent with the multipart part.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for PdfFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

impl PdfFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Build a file from in-memory bytes, deriving the content type from `name`.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let content_type = content_type_for(&name, &bytes).to_string();
        Self {
            name,
            content_type,
            bytes,
        }
    }

    /// Read `path` from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, InsightsError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => InsightsError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => InsightsError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => InsightsError::FileRead {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "uploaded_pdf".to_string());

        let file = Self::from_bytes(name, bytes);
        debug!(
            "Loaded {} ({} bytes, {})",
            path.display(),
            file.bytes.len(),
            file.content_type
        );
        Ok(file)
    }

    /// True when the backend would accept this file.
    pub fn is_pdf(&self) -> bool {
        self.content_type == PDF_MIME
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Map a file name (and, without an extension, its first bytes) to a MIME type.
pub fn content_type_for(name: &str, bytes: &[u8]) -> &'static str {
    if Path::new(name).extension().is_none() {
        return if bytes.starts_with(b"%PDF") {
            PDF_MIME
        } else {
            OCTET_STREAM
        };
    }
    mime_guess::from_path(name).first_raw().unwrap_or(OCTET_STREAM)
}
