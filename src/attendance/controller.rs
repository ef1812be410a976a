//! One attendance screen, parameterised by [`RoleConfig`].
//!
//! Holds the last roster and history the backend sent, derives each row's
//! status from the clock on every read, and runs verification for absent
//! rows. Fetches are numbered; a response from a fetch that has since been
//! superseded is dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::attendance::capture::ImageCapture;
use crate::attendance::clock::Clock;
use crate::attendance::filter::{HistoryView, filter_records};
use crate::attendance::guard::SubmissionGuard;
use crate::attendance::pipeline::{AttemptBoard, PipelineStage, VerificationOutcome, VerifyPipeline};
use crate::attendance::role::RoleConfig;
use crate::attendance::status::{AttendanceStatus, derive_status};
use crate::attendance::window::AttendanceFilter;
use crate::client::api_client::AttendanceBackend;
use crate::client::auth::AuthProvider;
use crate::client::roster::models::roster_models::{AttendanceRecord, Person, RowKey, SubjectId};
use crate::config::marker_store::LocalStore;
use crate::logger;

pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied(usize),
    /// A newer fetch was started before this one answered.
    Superseded,
    Unauthenticated,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountOutcome {
    pub daily_reset: bool,
    pub roster: RefreshOutcome,
    pub history: Option<RefreshOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    Verify(SubjectId),
    InProgress(PipelineStage),
    /// Present rows, and absent rows without a server id.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub key: RowKey,
    pub person: Person,
    pub status: AttendanceStatus,
    pub action: RowAction,
}

#[derive(Debug)]
struct Snapshot<T> {
    items: Vec<T>,
    last_error: Option<String>,
}

pub struct AttendanceController<B, A, C, S, K> {
    role: RoleConfig,
    backend: B,
    auth: A,
    camera: C,
    clock: K,
    guard: Mutex<SubmissionGuard<S, K>>,
    board: AttemptBoard,
    upload_timeout: Duration,
    roster: Mutex<Snapshot<Person>>,
    roster_requests: AtomicU64,
    history: Mutex<Snapshot<AttendanceRecord>>,
    history_requests: AtomicU64,
    daily_submitted: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl<B, A, C, S, K> AttendanceController<B, A, C, S, K>
where
    B: AttendanceBackend,
    A: AuthProvider,
    C: ImageCapture,
    S: LocalStore,
    K: Clock + Clone,
{
    pub fn new(role: RoleConfig, backend: B, auth: A, camera: C, store: S, clock: K) -> Self {
        AttendanceController {
            role,
            backend,
            auth,
            camera,
            guard: Mutex::new(SubmissionGuard::new(store, clock.clone())),
            clock,
            board: AttemptBoard::new(),
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
            roster: Mutex::new(Snapshot { items: Vec::new(), last_error: None }),
            roster_requests: AtomicU64::new(0),
            history: Mutex::new(Snapshot { items: Vec::new(), last_error: None }),
            history_requests: AtomicU64::new(0),
            daily_submitted: AtomicBool::new(false),
        }
    }

    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    pub fn role(&self) -> &RoleConfig {
        &self.role
    }

    /// Shared view of in-flight runs, for a progress indicator.
    pub fn attempts(&self) -> &AttemptBoard {
        &self.board
    }

    pub async fn mount(&self) -> MountOutcome {
        let daily_reset = lock(&self.guard).should_reset_daily_state(&self.role.context_key);
        if daily_reset {
            self.daily_submitted.store(false, Ordering::SeqCst);
        }

        let (roster, history) = if self.role.shows_history {
            let (roster, history) = futures::future::join(self.refresh(), self.load_history()).await;
            (roster, Some(history))
        } else {
            (self.refresh().await, None)
        };

        MountOutcome { daily_reset, roster, history }
    }

    /// Fetch the roster again. On failure the previous roster stays.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Some(token) = self.auth.bearer_token().await else {
            lock(&self.roster).last_error = Some("Not signed in".to_string());
            return RefreshOutcome::Unauthenticated;
        };

        // Numbered only once a request is really going out
        let ticket = self.roster_requests.fetch_add(1, Ordering::SeqCst) + 1;

        let result = self.backend.fetch_roster(&self.role, &token).await;

        if self.roster_requests.load(Ordering::SeqCst) != ticket {
            logger::info(format!("{} roster response #{} superseded", self.role.kind, ticket));
            return RefreshOutcome::Superseded;
        }

        let mut roster = lock(&self.roster);
        match result {
            Ok(people) => {
                let count = people.len();
                roster.items = people;
                roster.last_error = None;
                RefreshOutcome::Applied(count)
            }
            Err(e) => {
                logger::error(format!("{} roster fetch failed: {}", self.role.kind, e));
                let message = format!("Failed to fetch {} list", self.role.kind);
                roster.last_error = Some(message.clone());
                RefreshOutcome::Failed(message)
            }
        }
    }

    pub async fn load_history(&self) -> RefreshOutcome {
        let Some(token) = self.auth.bearer_token().await else {
            lock(&self.history).last_error = Some("Not signed in".to_string());
            return RefreshOutcome::Unauthenticated;
        };

        // Numbered only once a request is really going out
        let ticket = self.history_requests.fetch_add(1, Ordering::SeqCst) + 1;

        let result = self.backend.fetch_history(&self.role, &token).await;

        if self.history_requests.load(Ordering::SeqCst) != ticket {
            logger::info(format!("{} history response #{} superseded", self.role.kind, ticket));
            return RefreshOutcome::Superseded;
        }

        let mut history = lock(&self.history);
        match result {
            Ok(records) => {
                let count = records.len();
                history.items = records;
                history.last_error = None;
                RefreshOutcome::Applied(count)
            }
            Err(e) => {
                logger::error(format!("{} history fetch failed: {}", self.role.kind, e));
                let message = "Failed to fetch attendance history".to_string();
                history.last_error = Some(message.clone());
                RefreshOutcome::Failed(message)
            }
        }
    }

    /// Rows with status as of the clock's today. Computed on every call.
    pub fn rows(&self) -> Vec<RosterRow> {
        let today = self.clock.today();
        let roster = lock(&self.roster);

        roster
            .items
            .iter()
            .map(|person| {
                let status = derive_status(person, today);
                let action = match (status, person.subject_id()) {
                    (AttendanceStatus::Absent, Some(id)) => match self.board.stage(id) {
                        PipelineStage::Idle => RowAction::Verify(id),
                        stage => RowAction::InProgress(stage),
                    },
                    _ => RowAction::None,
                };
                RosterRow { key: person.row_key(), person: person.clone(), status, action }
            })
            .collect()
    }

    pub fn history(&self, filter: &AttendanceFilter) -> HistoryView {
        let today = self.clock.today();
        let history = lock(&self.history);
        HistoryView::from_records(filter_records(&history.items, filter, today))
    }

    pub fn roster_error(&self) -> Option<String> {
        lock(&self.roster).last_error.clone()
    }

    pub fn history_error(&self) -> Option<String> {
        lock(&self.history).last_error.clone()
    }

    /// Photograph and verify an absent subject. A verified result refetches
    /// the roster once; the status flips only when the server says so.
    pub async fn verify(&self, subject: SubjectId) -> VerificationOutcome {
        let today = self.clock.today();
        let eligible = lock(&self.roster)
            .items
            .iter()
            .any(|p| p.subject_id() == Some(subject) && derive_status(p, today) == AttendanceStatus::Absent);
        if !eligible {
            return VerificationOutcome::NotEligible;
        }

        let pipeline = VerifyPipeline::new(&self.backend, &self.auth, &self.camera, &self.board, self.upload_timeout);
        let outcome = pipeline.run(&self.role, subject).await;

        if outcome.requires_refresh() {
            let refreshed = self.refresh().await;
            if !matches!(refreshed, RefreshOutcome::Applied(_)) {
                logger::warn(format!("{} roster refresh after verify: {:?}", self.role.kind, refreshed));
            }
        }
        outcome
    }

    pub fn daily_submitted(&self) -> bool {
        self.daily_submitted.load(Ordering::SeqCst)
    }

    pub fn mark_daily_submitted(&self) {
        self.daily_submitted.store(true, Ordering::SeqCst);
    }
}
