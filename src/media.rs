//! Selected-file handling: reading the drawing, checking it is an image,
//! and deriving its preview reference.

use base64::{engine::general_purpose, Engine as _};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Not an image file: {0}")]
    NotAnImage(String),
}

/// Raw bytes of the drawing the user picked, plus its declared MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    bytes: Vec<u8>,
    mime_type: String,
    origin: Option<PathBuf>,
}

impl SourceImage {
    /// Build from in-memory bytes. The MIME type is sniffed from the content;
    /// anything that is not a recognizable image is rejected.
    pub fn from_bytes(bytes: Vec<u8>, label: &str) -> Result<Self, MediaError> {
        let mime_type = detect_image_mime(&bytes)
            .ok_or_else(|| MediaError::NotAnImage(label.to_string()))?;
        Ok(Self {
            bytes,
            mime_type: mime_type.to_string(),
            origin: None,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, MediaError> {
        let bytes = std::fs::read(path).map_err(|source| MediaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut image = Self::from_bytes(bytes, &path.display().to_string())?;
        image.origin = Some(path.to_path_buf());
        Ok(image)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.bytes)
    }

    /// Local reference for displaying the original: a `file://` URL when the
    /// image came from disk, otherwise an inline data URI.
    pub fn preview_url(&self) -> String {
        match &self.origin {
            Some(path) => {
                let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.clone());
                format!("file://{}", absolute.display())
            }
            None => format!("data:{};base64,{}", self.mime_type, self.to_base64()),
        }
    }
}

/// Detect an image MIME type from the content's magic bytes.
pub fn detect_image_mime(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().map(|format| format.to_mime_type())
}
