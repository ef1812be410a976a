use chrono::NaiveDate;
use std::fmt;

use crate::client::roster::models::roster_models::Person;

/// Derived per render; never stored on the person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceStatus::Present => f.write_str("Present"),
            AttendanceStatus::Absent => f.write_str("Absent"),
        }
    }
}

pub fn derive_status(person: &Person, today: NaiveDate) -> AttendanceStatus {
    match person.last_attendance_date {
        Some(date) if date == today => AttendanceStatus::Present,
        _ => AttendanceStatus::Absent,
    }
}
