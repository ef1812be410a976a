use std::fmt;
use std::str::FromStr;

use crate::client::roster::models::roster_models::SubjectId;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonKind {
    Student,
    Staff,
    /// The signed-in worker marking their own attendance.
    SelfUser,
}

impl PersonKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonKind::Student => "student",
            PersonKind::Staff => "staff",
            PersonKind::SelfUser => "self",
        }
    }
}

impl fmt::Display for PersonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" | "students" => Ok(PersonKind::Student),
            "staff" | "staffs" => Ok(PersonKind::Staff),
            "self" => Ok(PersonKind::SelfUser),
            other => Err(Error::InvalidInput(format!("unknown role '{}'", other))),
        }
    }
}

/// Everything that differs between the student, staff and self screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleConfig {
    pub kind: PersonKind,
    /// Key for this role's daily marker in local storage.
    pub context_key: String,
    pub roster_path: String,
    pub history_path: String,
    /// Contains `{id}`, replaced by the subject id.
    pub verify_path: String,
    /// Whether the screen lists historical records under the roster.
    pub shows_history: bool,
}

impl RoleConfig {
    pub fn student() -> Self {
        RoleConfig {
            kind: PersonKind::Student,
            context_key: "student-attendance".to_string(),
            roster_path: "/v1/students/".to_string(),
            history_path: "/v1/attendance/students/".to_string(),
            verify_path: "/v1/attendance/students/{id}/verify/".to_string(),
            shows_history: true,
        }
    }

    pub fn staff() -> Self {
        RoleConfig {
            kind: PersonKind::Staff,
            context_key: "staff-attendance".to_string(),
            roster_path: "/v1/staffs/".to_string(),
            history_path: "/v1/attendance/staffs/".to_string(),
            verify_path: "/v1/attendance/staffs/{id}/verify/".to_string(),
            shows_history: true,
        }
    }

    pub fn self_attendance() -> Self {
        RoleConfig {
            kind: PersonKind::SelfUser,
            context_key: "self-attendance".to_string(),
            roster_path: "/v1/staffs/me/".to_string(),
            history_path: "/v1/attendance/self/".to_string(),
            verify_path: "/v1/attendance/self/{id}/verify/".to_string(),
            shows_history: false,
        }
    }

    pub fn for_kind(kind: PersonKind) -> Self {
        match kind {
            PersonKind::Student => Self::student(),
            PersonKind::Staff => Self::staff(),
            PersonKind::SelfUser => Self::self_attendance(),
        }
    }

    pub fn verify_path_for(&self, subject: SubjectId) -> String {
        self.verify_path.replace("{id}", &subject.to_string())
    }
}
