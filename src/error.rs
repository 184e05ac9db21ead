//! Error types for the fieldsense library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`FieldSenseError`]: **Fatal** for one submission: the upload was
//!   rejected, the endpoint could not be reached, or the response body is not
//!   an extraction result at all. Every variant is recoverable by the user
//!   starting a new upload; none of them is fatal to the process.
//!
//! * [`RecordError`]: **Non-fatal**: a single record in an otherwise valid
//!   response is malformed. It is dropped, the remaining records are kept,
//!   and the rejection is stored alongside the salvaged
//!   [`crate::document::DocumentData`] in [`crate::document::Extraction`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the fieldsense library.
///
/// Per-record validation failures use [`RecordError`] and are stored in
/// [`crate::document::Extraction`] rather than propagated here.
#[derive(Debug, Error)]
pub enum FieldSenseError {
    // ── Capture errors ────────────────────────────────────────────────────
    /// The declared content type of the upload is not an image.
    #[error("'{file_name}' is not an image (declared type: {content_type}).\nUpload a JPG or PNG photo of the service log.")]
    InvalidFileType {
        file_name: String,
        content_type: String,
    },

    /// The upload has no bytes.
    #[error("'{file_name}' is empty")]
    EmptyUpload { file_name: String },

    /// Input file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── Submission errors ─────────────────────────────────────────────────
    /// The endpoint answered with a non-success HTTP status.
    #[error("API request failed with status {status}")]
    RequestFailed { status: u16, detail: String },

    /// The body arrived but is not decodable into an extraction result.
    #[error("Malformed response from inference service: {detail}")]
    MalformedResponse { detail: String },

    /// The request never completed (DNS, connection refused, reset …).
    #[error("Inference service unavailable at '{endpoint}': {reason}\nCheck the endpoint URL and your network connection.")]
    NetworkUnavailable { endpoint: String, reason: String },

    /// The request did not complete within the configured timeout.
    #[error("Request to '{endpoint}' timed out after {secs}s\nIncrease --timeout.")]
    RequestTimeout { endpoint: String, secs: u64 },

    /// A submission is already outstanding and the session rejects a second one.
    #[error("A document is already being processed (submission #{seq})")]
    SubmissionInFlight { seq: u64 },

    // ── Export errors ─────────────────────────────────────────────────────
    /// Could not create or write the exported JSON file.
    #[error("Failed to write export file '{path}': {source}")]
    ExportWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FieldSenseError {
    /// Whether a retry of the same request might succeed.
    ///
    /// Only failures where the request never produced a response qualify;
    /// an HTTP error status is an answer and is not retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FieldSenseError::NetworkUnavailable { .. } | FieldSenseError::RequestTimeout { .. }
        )
    }
}

/// A non-fatal error for a single record of the response.
///
/// The record at `index` (0-based, position in the raw `results` array) was
/// dropped; all other records are still rendered.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
#[error("Record {index}: {reason}")]
pub struct RecordError {
    pub index: usize,
    pub reason: String,
}
