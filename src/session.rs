//! Page-level state: one [`UploadState`] per user session.
//!
//! Every accepted upload gets a sequence number, published on a
//! `tokio::sync::watch` channel. A response is applied only if its sequence
//! number is still the current one; anything older is discarded as stale.
//! Starting a new upload or resetting bumps the number, which also tells the
//! in-flight [`Session::upload`] to stop its progress timers.

use crate::document::Extraction;
use crate::error::FieldSenseError;
use crate::pipeline::capture::{self, AcceptedUpload, Preview, UploadFile};
use crate::pipeline::submit::InferenceClient;
use crate::progress::{ProgressCallbackRef, ProgressHandle, ProgressScript};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Label of the action that leaves `Failed`.
pub const RETRY_LABEL: &str = "Try Again";

/// Label of the action that leaves `Completed`.
pub const NEW_DOCUMENT_LABEL: &str = "Process New Document";

/// Where the session is. Replaced wholesale on every transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum UploadState {
    #[default]
    Idle,
    /// Accepted and captured, request not yet dispatched. [`Session::upload`]
    /// leaves this state as soon as it hands the request to the client, so
    /// it is only observable when driving [`Session::begin`] by hand.
    Uploading,
    /// Request dispatched, waiting for the response.
    Processing,
    Completed(Extraction),
    Failed(String),
}

impl UploadState {
    /// `Uploading` or `Processing`.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, UploadState::Uploading | UploadState::Processing)
    }

    pub fn name(&self) -> &'static str {
        match self {
            UploadState::Idle => "idle",
            UploadState::Uploading => "uploading",
            UploadState::Processing => "processing",
            UploadState::Completed(_) => "completed",
            UploadState::Failed(_) => "failed",
        }
    }
}

/// What to do with a new upload while another is outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InFlightPolicy {
    /// Abandon the outstanding submission; its response will be stale.
    #[default]
    Supersede,
    /// Refuse the new upload with [`FieldSenseError::SubmissionInFlight`].
    Reject,
}

/// An accepted upload tagged with its sequence number.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub seq: u64,
    pub upload: AcceptedUpload,
}

/// Outcome of handing a response to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The response belonged to the live submission; this is the new state.
    Applied(UploadState),
    /// The response belonged to an abandoned submission and was dropped.
    Stale { seq: u64, current: u64 },
}

struct SessionInner {
    state: UploadState,
    preview: Option<Preview>,
    policy: InFlightPolicy,
}

/// Owner of the upload state for one user session.
pub struct Session {
    inner: Mutex<SessionInner>,
    generation: watch::Sender<u64>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_policy(InFlightPolicy::default())
    }

    pub fn with_policy(policy: InFlightPolicy) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            inner: Mutex::new(SessionInner {
                state: UploadState::Idle,
                preview: None,
                policy,
            }),
            generation,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> UploadState {
        self.lock().state.clone()
    }

    /// Preview of the live upload, if any.
    pub fn preview(&self) -> Option<Preview> {
        self.lock().preview.clone()
    }

    /// Sequence number of the most recent upload or reset.
    pub fn current_seq(&self) -> u64 {
        *self.generation.borrow()
    }

    /// Subscribe to sequence-number changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    /// Capture `file` and, if accepted, make it the live submission.
    ///
    /// A rejected file leaves the state untouched.
    pub fn begin(&self, file: UploadFile) -> Result<Ticket, FieldSenseError> {
        let mut inner = self.lock();
        if inner.policy == InFlightPolicy::Reject && inner.state.is_in_flight() {
            return Err(FieldSenseError::SubmissionInFlight {
                seq: self.current_seq(),
            });
        }

        let upload = capture::accept(file)?;

        let mut seq = 0;
        self.generation.send_modify(|g| {
            *g += 1;
            seq = *g;
        });
        if inner.state.is_in_flight() {
            info!("Submission #{} supersedes #{}", seq, seq - 1);
        }
        inner.state = UploadState::Uploading;
        inner.preview = Some(upload.preview.clone());
        debug!("Submission #{} uploading '{}'", seq, upload.file.file_name);
        Ok(Ticket { seq, upload })
    }

    /// `Uploading` → `Processing` for the live submission. Returns whether the
    /// transition happened.
    pub fn mark_processing(&self, seq: u64) -> bool {
        let mut inner = self.lock();
        if seq == self.current_seq() && inner.state == UploadState::Uploading {
            inner.state = UploadState::Processing;
            true
        } else {
            false
        }
    }

    /// Apply the outcome of submission `seq`, unless it has been superseded.
    pub fn resolve(
        &self,
        seq: u64,
        outcome: Result<Extraction, FieldSenseError>,
    ) -> Resolution {
        let mut inner = self.lock();
        let current = self.current_seq();
        if seq != current || !inner.state.is_in_flight() {
            debug!("Discarding stale response #{} (current #{})", seq, current);
            return Resolution::Stale { seq, current };
        }

        inner.state = match outcome {
            Ok(extraction) => {
                info!(
                    "Submission #{} completed with {} fields",
                    seq,
                    extraction.document.results.len()
                );
                UploadState::Completed(extraction)
            }
            Err(e) => {
                warn!("Submission #{} failed: {}", seq, e);
                UploadState::Failed(e.to_string())
            }
        };
        Resolution::Applied(inner.state.clone())
    }

    /// Back to `Idle` with no residue. Any outstanding response becomes stale.
    pub fn reset(&self) {
        let mut inner = self.lock();
        self.generation.send_modify(|g| *g += 1);
        inner.state = UploadState::Idle;
        inner.preview = None;
        debug!("Session reset (#{})", self.current_seq());
    }

    /// Full flow for one file: capture, submit with progress, resolve.
    ///
    /// The request is raced against supersession: when a newer upload or a
    /// reset takes over, the progress timers stop at once and the call
    /// returns [`Resolution::Stale`] without waiting for the response.
    pub async fn upload(
        &self,
        client: &InferenceClient,
        file: UploadFile,
        script: &ProgressScript,
        callback: ProgressCallbackRef,
    ) -> Result<Resolution, FieldSenseError> {
        let ticket = self.begin(file)?;
        let seq = ticket.seq;
        let generation = self.subscribe();
        let progress = ProgressHandle::spawn(script.clone(), callback);
        // reqwest gives no "body sent" signal; dispatch is the boundary.
        self.mark_processing(seq);

        let outcome = tokio::select! {
            result = client.submit(&ticket.upload) => Some(result),
            _ = superseded(generation, seq) => None,
        };

        let Some(result) = outcome else {
            progress.abort();
            return Ok(Resolution::Stale {
                seq,
                current: self.current_seq(),
            });
        };

        let resolution = self.resolve(seq, result);
        match resolution {
            Resolution::Applied(UploadState::Completed(_)) => progress.finish().await,
            _ => progress.abort(),
        }
        Ok(resolution)
    }
}

/// Resolves once the sequence number moves past `seq`.
async fn superseded(mut generation: watch::Receiver<u64>, seq: u64) {
    let _ = generation.wait_for(|g| *g != seq).await;
}
