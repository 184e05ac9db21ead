//! Upload capture: accept an image, reject everything else, build a preview.
//!
//! Files reach the pipeline from a file picker ([`UploadFile::from_path`]) or
//! from a drop target or in-memory buffer ([`UploadFile::new`]). Both carry a
//! *declared* content type, and that is what decides acceptance: anything not
//! under `image/` is rejected with a visible
//! [`FieldSenseError::InvalidFileType`]. No network I/O happens here.

use crate::error::FieldSenseError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Content type assumed when the extension says nothing useful.
pub const UNKNOWN_CONTENT_TYPE: &str = "application/octet-stream";

/// A file handed over by the user, not yet validated.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Wrap an in-memory file (e.g. a dropped file) with its declared type.
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a picked file from disk, declaring its type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, FieldSenseError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => FieldSenseError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => FieldSenseError::FileNotFound {
                path: path.to_path_buf(),
            },
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self {
            content_type: content_type_for_path(path).to_string(),
            file_name,
            bytes,
        })
    }

    /// Override the declared content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Size in mebibytes, for display.
    pub fn size_mib(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0 / 1024.0
    }
}

/// Displayable in-memory representation of an accepted image.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    /// `data:<mime>;base64,<payload>`; never empty.
    pub data_url: String,
    /// Pixel dimensions when the bytes decode as PNG or JPEG.
    pub dimensions: Option<(u32, u32)>,
}

/// An upload that passed capture: the raw file plus its preview.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedUpload {
    pub file: UploadFile,
    pub preview: Preview,
}

/// Guess the declared content type from a file extension.
pub fn content_type_for_path(path: &Path) -> &'static str {
    if let Ok(format) = ImageFormat::from_path(path) {
        return format.to_mime_type();
    }
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("json") => "application/json",
        _ => UNKNOWN_CONTENT_TYPE,
    }
}

/// Whether a declared content type is in the image category.
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type
        .trim()
        .get(..6)
        .map(|prefix| prefix.eq_ignore_ascii_case("image/"))
        .unwrap_or(false)
}

/// Validate an upload and build its preview.
pub fn accept(file: UploadFile) -> Result<AcceptedUpload, FieldSenseError> {
    if !is_image_content_type(&file.content_type) {
        debug!(
            "Rejected '{}': declared type {}",
            file.file_name, file.content_type
        );
        return Err(FieldSenseError::InvalidFileType {
            file_name: file.file_name,
            content_type: file.content_type,
        });
    }
    if file.bytes.is_empty() {
        return Err(FieldSenseError::EmptyUpload {
            file_name: file.file_name,
        });
    }

    let preview = build_preview(&file);
    debug!(
        "Accepted '{}' ({} bytes, {:?})",
        file.file_name,
        file.bytes.len(),
        preview.dimensions
    );
    Ok(AcceptedUpload { file, preview })
}

fn build_preview(file: &UploadFile) -> Preview {
    let data_url = format!(
        "data:{};base64,{}",
        file.content_type.trim(),
        STANDARD.encode(&file.bytes)
    );
    let dimensions = ImageReader::new(Cursor::new(&file.bytes))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.into_dimensions().ok());
    Preview {
        data_url,
        dimensions,
    }
}
