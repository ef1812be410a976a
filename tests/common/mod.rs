#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anganwadi_attendance::{
    AttendanceBackend, AttendanceRecord, AuthProvider, CaptureResult, CapturedImage, Error, ImageCapture, Permission,
    Person, Result, RoleConfig, SubjectId, VerificationResponse,
};

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn person(id: i64, name: &str, last: Option<&str>) -> Person {
    Person {
        id: Some(id),
        name: Some(name.to_string()),
        phone: Some(format!("98765{:05}", id)),
        last_attendance_date: last.map(d),
    }
}

pub fn record(id: i64, subject: i64, date: &str) -> AttendanceRecord {
    AttendanceRecord {
        id,
        subject_id: Some(subject),
        attendance_date: date.to_string(),
        attendance_mode: None,
        center_id: Some(1),
    }
}

#[derive(Debug, Clone)]
pub enum UploadReply {
    Status(u16, Option<String>),
    NetworkError,
    Hang,
}

#[derive(Debug)]
pub struct BackendState {
    pub roster: Vec<Person>,
    pub history: Vec<AttendanceRecord>,
    /// Date the fake server stamps on a verified person.
    pub server_today: NaiveDate,
    pub upload_reply: UploadReply,
    /// Per-call (delay, roster) overrides for roster fetches, consumed in order.
    pub roster_script: VecDeque<(Duration, Vec<Person>)>,
    pub roster_fetches: usize,
    pub history_fetches: usize,
    pub uploads: Vec<(SubjectId, String, usize)>,
    pub tokens_seen: Vec<String>,
    pub fail_roster: bool,
}

#[derive(Debug, Clone)]
pub struct FakeBackend {
    pub state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    pub fn new(roster: Vec<Person>, server_today: NaiveDate) -> Self {
        FakeBackend {
            state: Arc::new(Mutex::new(BackendState {
                roster,
                history: Vec::new(),
                server_today,
                upload_reply: UploadReply::Status(200, None),
                roster_script: VecDeque::new(),
                roster_fetches: 0,
                history_fetches: 0,
                uploads: Vec::new(),
                tokens_seen: Vec::new(),
                fail_roster: false,
            })),
        }
    }

    pub fn with_history(self, history: Vec<AttendanceRecord>) -> Self {
        self.state.lock().unwrap().history = history;
        self
    }

    pub fn reply_with(&self, reply: UploadReply) {
        self.state.lock().unwrap().upload_reply = reply;
    }

    pub fn roster_fetches(&self) -> usize {
        self.state.lock().unwrap().roster_fetches
    }

    pub fn history_fetches(&self) -> usize {
        self.state.lock().unwrap().history_fetches
    }

    pub fn uploads(&self) -> usize {
        self.state.lock().unwrap().uploads.len()
    }
}

impl AttendanceBackend for FakeBackend {
    async fn fetch_roster(&self, _role: &RoleConfig, token: &str) -> Result<Vec<Person>> {
        let (delay, roster, fail) = {
            let mut state = self.state.lock().unwrap();
            state.roster_fetches += 1;
            state.tokens_seen.push(token.to_string());
            match state.roster_script.pop_front() {
                Some((delay, roster)) => (delay, roster, state.fail_roster),
                None => (Duration::ZERO, state.roster.clone(), state.fail_roster),
            }
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(Error::Status(503));
        }
        Ok(roster)
    }

    async fn fetch_history(&self, _role: &RoleConfig, _token: &str) -> Result<Vec<AttendanceRecord>> {
        let mut state = self.state.lock().unwrap();
        state.history_fetches += 1;
        Ok(state.history.clone())
    }

    async fn upload_verification(
        &self,
        _role: &RoleConfig,
        subject: SubjectId,
        image: &CapturedImage,
        token: &str,
    ) -> Result<VerificationResponse> {
        let reply = {
            let mut state = self.state.lock().unwrap();
            state.uploads.push((subject, token.to_string(), image.bytes.len()));
            state.upload_reply.clone()
        };
        match reply {
            UploadReply::Status(status, detail) => {
                if status == 200 {
                    let mut state = self.state.lock().unwrap();
                    let today = state.server_today;
                    for p in state.roster.iter_mut().filter(|p| p.id == Some(subject.0)) {
                        p.last_attendance_date = Some(today);
                    }
                }
                Ok(VerificationResponse::new(status, detail))
            }
            UploadReply::NetworkError => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            ))),
            UploadReply::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(VerificationResponse::new(200, None))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakeAuth {
    token: Arc<Mutex<Option<String>>>,
}

impl FakeAuth {
    pub fn signed_in() -> Self {
        FakeAuth { token: Arc::new(Mutex::new(Some("test-token".to_string()))) }
    }

    pub fn signed_out() -> Self {
        FakeAuth { token: Arc::new(Mutex::new(None)) }
    }

    pub fn sign_out(&self) {
        *self.token.lock().unwrap() = None;
    }
}

impl AuthProvider for FakeAuth {
    async fn bearer_token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }
}

#[derive(Debug, Clone)]
pub struct FakeCamera {
    pub permission: Permission,
    pub cancel: bool,
    pub captures: Arc<AtomicUsize>,
}

impl FakeCamera {
    pub fn granted() -> Self {
        FakeCamera { permission: Permission::Granted, cancel: false, captures: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn denied() -> Self {
        FakeCamera { permission: Permission::Denied, ..Self::granted() }
    }

    pub fn cancelling() -> Self {
        FakeCamera { cancel: true, ..Self::granted() }
    }

    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }
}

impl ImageCapture for FakeCamera {
    async fn request_permission(&self) -> Permission {
        self.permission
    }

    async fn capture(&self) -> Result<CaptureResult> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        if self.cancel {
            Ok(CaptureResult::Cancelled)
        } else {
            Ok(CaptureResult::Captured(CapturedImage::jpeg(vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3])))
        }
    }
}
