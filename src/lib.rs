// The traits are consumed through generics on one runtime; no caller needs
// a `Send` bound on their futures.
#![allow(async_fn_in_trait)]

pub mod attendance;
pub mod client;
pub mod config;
pub mod error;
pub mod logger;

pub use attendance::capture::{CaptureResult, CapturedImage, FileCapture, ImageCapture, Permission};
pub use attendance::clock::{Clock, FixedClock, SystemClock};
pub use attendance::controller::{AttendanceController, MountOutcome, RefreshOutcome, RosterRow, RowAction};
pub use attendance::filter::{HistoryView, filter_records};
pub use attendance::guard::SubmissionGuard;
pub use attendance::pipeline::{AttemptBoard, PipelineStage, VerificationOutcome, VerifyPipeline};
pub use attendance::role::{PersonKind, RoleConfig};
pub use attendance::status::{AttendanceStatus, derive_status};
pub use attendance::window::{AttendanceFilter, WindowKind, is_within_window};
pub use client::roster::models::roster_models::{AttendanceMode, AttendanceRecord, Person, RowKey, SubjectId};
pub use client::verification::models::verification_models::VerificationResponse;
pub use client::{ApiClient, AttendanceBackend, AuthProvider, StaticToken};
pub use config::config::Config;
pub use config::marker_store::{JsonFileStore, LocalStore, MemoryStore};
pub use error::{Error, Result};
