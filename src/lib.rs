//! # fieldsense
//!
//! Extract structured fields from photos of handwritten field-service logs.
//!
//! The heavy lifting (YOLO field detection + OCR) happens in a remote
//! inference service. This crate is the client side of that demo: it accepts
//! an image, posts it to `<endpoint>/analyze`, validates the JSON that comes
//! back and renders it as a table with confidence badges and statistics. A
//! decorative progress sequence plays while the request is in flight.
//!
//! ## Flow
//!
//! ```text
//! image
//!  │
//!  ├─ 1. Capture   declared type must be image/*, preview built in memory
//!  ├─ 2. Submit    multipart POST, 30 s timeout, one retry on network failure
//!  ├─ 3. Validate  shape check, per-record salvage
//!  ├─ 4. Render    rows, tiers, Fields Detected / Avg / High Confidence
//!  └─ 5. Export    clipboard listing, pretty JSON file
//! ```
//!
//! [`Session`] ties the steps together and owns the single [`UploadState`];
//! responses to superseded uploads are discarded.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fieldsense::{
//!     ClientConfig, ExtractionReport, FieldCatalog, InferenceClient, NoopProgressCallback,
//!     ProgressScript, Session, UploadFile, UploadState,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder().endpoint("http://localhost:8000").build()?;
//!     let client = InferenceClient::new(&config)?;
//!     let session = Session::new();
//!
//!     let file = UploadFile::from_path("service-log.jpg").await?;
//!     session
//!         .upload(&client, file, &ProgressScript::default(), Arc::new(NoopProgressCallback))
//!         .await?;
//!
//!     if let UploadState::Completed(extraction) = session.state() {
//!         let report = ExtractionReport::new(&extraction.document, FieldCatalog::field_service());
//!         print!("{}", report.render_table());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `fieldsense` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! fieldsense = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod fields;
pub mod landing;
pub mod pipeline;
pub mod progress;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ClientConfig, ClientConfigBuilder};
pub use document::{BoundingBox, DocumentData, Extraction};
pub use error::{FieldSenseError, RecordError};
pub use export::{
    clipboard_listing, copy_to_clipboard, export_json, Clipboard, SystemClipboard,
    DEFAULT_EXPORT_FILENAME,
};
pub use fields::{FieldCatalog, FieldIcon};
pub use pipeline::capture::{accept, AcceptedUpload, Preview, UploadFile};
pub use pipeline::render::{
    ConfidenceTier, ExtractionReport, ExtractionStats, FieldRow, ProcessingDetails,
};
pub use pipeline::submit::InferenceClient;
pub use progress::{
    NoopProgressCallback, ProgressCallback, ProgressCallbackRef, ProgressHandle, ProgressScript,
    ProgressStage,
};
pub use session::{InFlightPolicy, Resolution, Session, UploadState};
