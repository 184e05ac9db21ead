//! Submission client: one multipart POST to `<endpoint>/analyze`.
//!
//! ## Retry Strategy
//!
//! At most one retry, and only when the request never produced a response
//! (connect failure or timeout). A non-success status is an answer from the
//! service and is mapped straight to [`FieldSenseError::RequestFailed`].
//!
//! Every attempt is bounded by `request_timeout_secs`, so a dead backend
//! surfaces as [`FieldSenseError::RequestTimeout`] instead of hanging the
//! session.

use crate::config::ClientConfig;
use crate::document::Extraction;
use crate::error::FieldSenseError;
use crate::pipeline::capture::AcceptedUpload;
use crate::pipeline::validate;
use reqwest::multipart::{Form, Part};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Name of the multipart field the service reads the image from.
pub const FILE_FIELD: &str = "file";

/// Longest excerpt of an error body kept in [`FieldSenseError::RequestFailed`].
const DETAIL_LIMIT: usize = 200;

/// HTTP client for the inference service.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    url: String,
    config: ClientConfig,
}

impl InferenceClient {
    /// Build a client from a validated configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, FieldSenseError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FieldSenseError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: config.analyze_url(),
            config: config.clone(),
        })
    }

    /// The full URL requests are sent to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Submit an accepted upload and return the validated extraction.
    pub async fn submit(&self, upload: &AcceptedUpload) -> Result<Extraction, FieldSenseError> {
        let start = Instant::now();
        info!(
            "Submitting '{}' ({} bytes) to {}",
            upload.file.file_name,
            upload.file.bytes.len(),
            self.url
        );

        let max_retries = self.config.max_retries.min(1);
        let mut attempt = 0;
        let body = loop {
            match self.send_once(upload).await {
                Ok(body) => break body,
                Err(e) if e.is_transient() && attempt < max_retries => {
                    attempt += 1;
                    warn!(
                        "Attempt {} failed: {}; retrying in {}ms",
                        attempt, e, self.config.retry_backoff_ms
                    );
                    sleep(Duration::from_millis(self.config.retry_backoff_ms)).await;
                }
                Err(e) => return Err(e),
            }
        };

        let extraction = validate::parse_extraction(&body)?;
        info!(
            "Received {} fields ({} rejected) in {}ms",
            extraction.document.results.len(),
            extraction.rejected.len(),
            start.elapsed().as_millis()
        );
        Ok(extraction)
    }

    /// One POST; returns the raw body of a success response.
    async fn send_once(&self, upload: &AcceptedUpload) -> Result<Vec<u8>, FieldSenseError> {
        let part = Part::bytes(upload.file.bytes.clone())
            .file_name(upload.file.file_name.clone())
            .mime_str(upload.file.content_type.trim())
            .map_err(|e| FieldSenseError::InvalidFileType {
                file_name: upload.file.file_name.clone(),
                content_type: format!("{} ({e})", upload.file.content_type),
            })?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .http
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        debug!("{} answered {}", self.url, status);
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(FieldSenseError::RequestFailed {
                status: status.as_u16(),
                detail: excerpt(&text),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        debug!("Response body: {} bytes", body.len());
        Ok(body.to_vec())
    }

    fn map_transport_error(&self, e: reqwest::Error) -> FieldSenseError {
        if e.is_timeout() {
            FieldSenseError::RequestTimeout {
                endpoint: self.url.clone(),
                secs: self.config.request_timeout_secs,
            }
        } else {
            FieldSenseError::NetworkUnavailable {
                endpoint: self.url.clone(),
                reason: e.to_string(),
            }
        }
    }
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(DETAIL_LIMIT) {
        Some((cut, _)) => format!("{}\u{2026}", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
