//! Saving the transformed image. The data URI payload is written as-is under
//! a fixed file name; no format conversion.

use base64::{engine::general_purpose, Engine as _};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DOWNLOAD_FILE_NAME: &str = "donusturulmus_resim.png";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to download yet")]
    NoResult,
    #[error("Not a base64 data URI")]
    MalformedUri,
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Split `data:<mime>;base64,<payload>` into its MIME type and payload.
pub fn parse_data_uri(uri: &str) -> Result<(&str, &str), ExportError> {
    let rest = uri.strip_prefix("data:").ok_or(ExportError::MalformedUri)?;
    let (header, payload) = rest.split_once(',').ok_or(ExportError::MalformedUri)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(ExportError::MalformedUri)?;
    Ok((mime, payload))
}

/// Decode the URI and write it to `dir/donusturulmus_resim.png`, replacing
/// any previous download.
pub fn save_data_uri(uri: &str, dir: &Path) -> Result<PathBuf, ExportError> {
    let (_, payload) = parse_data_uri(uri)?;
    let bytes = general_purpose::STANDARD.decode(payload)?;

    let path = dir.join(DOWNLOAD_FILE_NAME);
    std::fs::create_dir_all(dir)
        .and_then(|_| std::fs::write(&path, &bytes))
        .map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;

    tracing::info!("[Export] Saved {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}
