//! Photo verification for one subject.
//!
//! ```text
//! Idle -> Capturing -> Captured -> Uploading -> {Verified | Rejected | NetworkFailed}
//! ```
//!
//! Every run ends in a [`VerificationOutcome`] and leaves the subject back at
//! `Idle`. Nothing is retried here; a retry is a new run.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::attendance::capture::{CaptureResult, CapturedImage, ImageCapture, Permission};
use crate::attendance::role::RoleConfig;
use crate::client::api_client::AttendanceBackend;
use crate::client::auth::AuthProvider;
use crate::client::roster::models::roster_models::SubjectId;
use crate::client::verification::models::verification_models::VerificationResponse;
use crate::logger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Idle,
    Capturing,
    Captured,
    Uploading,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Capturing => "capturing",
            PipelineStage::Captured => "captured",
            PipelineStage::Uploading => "uploading",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Server accepted the photo. The roster must be fetched again.
    Verified,
    /// Server answered with anything but 200.
    Rejected { status: u16, detail: String },
    /// No response. Whether the server recorded anything is unknown.
    NetworkFailed { reason: String },
    /// Camera permission refused; fixing it needs the device settings.
    PermissionDenied,
    /// The user backed out of the camera. Not an error.
    Cancelled,
    CaptureFailed { reason: String },
    /// No bearer credential; nothing was sent.
    Unauthenticated,
    /// Another run for this subject has not finished.
    AlreadyInProgress,
    /// The subject is not an absent row on the current roster.
    NotEligible,
}

impl VerificationOutcome {
    pub fn requires_refresh(&self) -> bool {
        matches!(self, VerificationOutcome::Verified)
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VerificationOutcome::Rejected { .. }
                | VerificationOutcome::NetworkFailed { .. }
                | VerificationOutcome::Cancelled
                | VerificationOutcome::CaptureFailed { .. }
        )
    }

    /// Text to show the user, if any.
    pub fn user_message(&self) -> Option<String> {
        match self {
            VerificationOutcome::Verified => Some("Attendance verified".to_string()),
            VerificationOutcome::Rejected { detail, .. } => Some(detail.clone()),
            VerificationOutcome::NetworkFailed { .. } => {
                Some("Could not reach the server. Check your connection and try again.".to_string())
            }
            VerificationOutcome::PermissionDenied => {
                Some("Camera permission is required to take attendance photo".to_string())
            }
            VerificationOutcome::Cancelled => None,
            VerificationOutcome::CaptureFailed { .. } => Some("Could not read the photo. Please try again.".to_string()),
            VerificationOutcome::Unauthenticated => Some("Please sign in again".to_string()),
            VerificationOutcome::AlreadyInProgress => None,
            VerificationOutcome::NotEligible => None,
        }
    }
}

/// 200 is the only success; every other answer is a rejection whose
/// detail is shown as the server wrote it.
pub fn interpret_response(response: &VerificationResponse) -> VerificationOutcome {
    if response.status == 200 {
        return VerificationOutcome::Verified;
    }
    let detail = response
        .detail
        .clone()
        .unwrap_or_else(|| format!("Verification failed ({})", response.status));
    VerificationOutcome::Rejected { status: response.status, detail }
}

/// One in-memory attempt. Dropped when the run ends.
#[derive(Debug, Clone)]
pub struct VerificationAttempt {
    pub subject: SubjectId,
    pub image: CapturedImage,
    pub submitted_at: DateTime<Utc>,
}

/// Which subjects have a run in flight, and at what stage.
#[derive(Debug, Clone, Default)]
pub struct AttemptBoard {
    stages: Arc<Mutex<HashMap<SubjectId, PipelineStage>>>,
}

impl AttemptBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SubjectId, PipelineStage>> {
        self.stages.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn stage(&self, subject: SubjectId) -> PipelineStage {
        self.lock().get(&subject).copied().unwrap_or(PipelineStage::Idle)
    }

    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }

    /// `None` when the subject already has a run.
    pub fn claim(&self, subject: SubjectId) -> Option<AttemptTicket> {
        let mut stages = self.lock();
        if stages.contains_key(&subject) {
            return None;
        }
        stages.insert(subject, PipelineStage::Capturing);
        Some(AttemptTicket { board: self.clone(), subject })
    }
}

/// Holds a subject's slot on the board; the slot frees on drop, including
/// when the run's future is dropped mid-upload.
#[derive(Debug)]
pub struct AttemptTicket {
    board: AttemptBoard,
    subject: SubjectId,
}

impl AttemptTicket {
    pub fn advance(&self, stage: PipelineStage) {
        self.board.lock().insert(self.subject, stage);
    }
}

impl Drop for AttemptTicket {
    fn drop(&mut self) {
        self.board.lock().remove(&self.subject);
    }
}

pub struct VerifyPipeline<'a, B, A, C> {
    backend: &'a B,
    auth: &'a A,
    camera: &'a C,
    board: &'a AttemptBoard,
    upload_timeout: Duration,
}

impl<'a, B, A, C> VerifyPipeline<'a, B, A, C>
where
    B: AttendanceBackend,
    A: AuthProvider,
    C: ImageCapture,
{
    pub fn new(backend: &'a B, auth: &'a A, camera: &'a C, board: &'a AttemptBoard, upload_timeout: Duration) -> Self {
        VerifyPipeline { backend, auth, camera, board, upload_timeout }
    }

    pub async fn run(&self, role: &RoleConfig, subject: SubjectId) -> VerificationOutcome {
        let Some(ticket) = self.board.claim(subject) else {
            return VerificationOutcome::AlreadyInProgress;
        };

        let outcome = self.drive(&ticket, role, subject).await;
        drop(ticket);

        match &outcome {
            VerificationOutcome::Verified => {
                logger::info(format!("{} {}: verified", role.kind, subject));
            }
            VerificationOutcome::Rejected { status, detail } => {
                logger::warn(format!("{} {}: rejected ({}): {}", role.kind, subject, status, detail));
            }
            VerificationOutcome::NetworkFailed { reason } => {
                logger::error(format!("{} {}: network failure: {}", role.kind, subject, reason));
            }
            other => {
                logger::info(format!("{} {}: {:?}", role.kind, subject, other));
            }
        }
        outcome
    }

    async fn drive(&self, ticket: &AttemptTicket, role: &RoleConfig, subject: SubjectId) -> VerificationOutcome {
        // Checked before the camera opens so a photo is never taken for nothing
        let Some(token) = self.auth.bearer_token().await else {
            return VerificationOutcome::Unauthenticated;
        };

        if self.camera.request_permission().await == Permission::Denied {
            return VerificationOutcome::PermissionDenied;
        }

        let image = match self.camera.capture().await {
            Ok(CaptureResult::Captured(image)) => image,
            Ok(CaptureResult::Cancelled) => return VerificationOutcome::Cancelled,
            Err(e) => return VerificationOutcome::CaptureFailed { reason: e.to_string() },
        };
        ticket.advance(PipelineStage::Captured);

        let attempt = VerificationAttempt { subject, image, submitted_at: Utc::now() };
        ticket.advance(PipelineStage::Uploading);
        logger::info(format!(
            "{} {}: uploading {} at {}",
            role.kind,
            subject,
            attempt.image.file_name,
            attempt.submitted_at.to_rfc3339()
        ));

        let upload = self.backend.upload_verification(role, attempt.subject, &attempt.image, &token);
        match tokio::time::timeout(self.upload_timeout, upload).await {
            Ok(Ok(response)) => interpret_response(&response),
            Ok(Err(e)) => VerificationOutcome::NetworkFailed { reason: e.to_string() },
            Err(_) => VerificationOutcome::NetworkFailed {
                reason: format!("no response within {:?}", self.upload_timeout),
            },
        }
    }
}
