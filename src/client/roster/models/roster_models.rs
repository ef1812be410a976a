use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

use crate::attendance::clock::parse_calendar_date;

/// Server-side identity of a subject. Only this is ever sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubjectId(pub i64);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// List key for a roster row. `Fallback` keys are for rendering only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    Id(SubjectId),
    Fallback(String),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Id(id) => write!(f, "{}", id),
            RowKey::Fallback(key) => f.write_str(key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "RawPerson")]
pub struct Person {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub last_attendance_date: Option<NaiveDate>,
}

/// Student and staff rows name the same things differently, and some rows
/// carry more than one of the names. The generic name wins.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPerson {
    #[serde(deserialize_with = "de_opt_id")]
    id: Option<i64>,
    #[serde(deserialize_with = "de_opt_id")]
    student_id: Option<i64>,
    #[serde(deserialize_with = "de_opt_id")]
    staff_id: Option<i64>,
    #[serde(deserialize_with = "de_opt_text")]
    name: Option<String>,
    #[serde(deserialize_with = "de_opt_text")]
    student_name: Option<String>,
    #[serde(deserialize_with = "de_opt_text")]
    staff_full_name: Option<String>,
    #[serde(deserialize_with = "de_opt_text")]
    full_name: Option<String>,
    #[serde(deserialize_with = "de_opt_text")]
    phone: Option<String>,
    #[serde(deserialize_with = "de_opt_text")]
    student_phone: Option<String>,
    #[serde(deserialize_with = "de_opt_text")]
    staff_phone: Option<String>,
    #[serde(deserialize_with = "de_opt_date")]
    last_attendance_date: Option<NaiveDate>,
}

impl From<RawPerson> for Person {
    fn from(raw: RawPerson) -> Self {
        Person {
            id: raw.id.or(raw.student_id).or(raw.staff_id),
            name: raw.name.or(raw.student_name).or(raw.staff_full_name).or(raw.full_name),
            phone: raw.phone.or(raw.student_phone).or(raw.staff_phone),
            last_attendance_date: raw.last_attendance_date,
        }
    }
}

impl Person {
    pub fn subject_id(&self) -> Option<SubjectId> {
        self.id.map(SubjectId)
    }

    /// Id when present, else phone, else name and phone together.
    pub fn row_key(&self) -> RowKey {
        if let Some(id) = self.subject_id() {
            return RowKey::Id(id);
        }
        match self.phone.as_deref().filter(|p| !p.is_empty()) {
            Some(phone) => RowKey::Fallback(phone.to_string()),
            None => RowKey::Fallback(format!(
                "{}:{}",
                self.name.as_deref().unwrap_or_default(),
                self.phone.as_deref().unwrap_or_default()
            )),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceMode {
    #[serde(alias = "photo_verification", alias = "face")]
    Photo,
    Manual,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawRecord")]
pub struct AttendanceRecord {
    pub id: i64,
    pub subject_id: Option<i64>,
    /// Raw as sent by the backend; window matching reads it as a string.
    pub attendance_date: String,
    pub attendance_mode: Option<AttendanceMode>,
    pub center_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRecord {
    #[serde(deserialize_with = "de_opt_id")]
    id: Option<i64>,
    #[serde(deserialize_with = "de_opt_id")]
    attendance_id: Option<i64>,
    #[serde(deserialize_with = "de_opt_id")]
    subject_id: Option<i64>,
    #[serde(deserialize_with = "de_opt_id")]
    student_id: Option<i64>,
    #[serde(deserialize_with = "de_opt_id")]
    staff_id: Option<i64>,
    #[serde(deserialize_with = "de_opt_text")]
    attendance_date: Option<String>,
    #[serde(deserialize_with = "de_opt_text")]
    date: Option<String>,
    attendance_mode: Option<AttendanceMode>,
    mode: Option<AttendanceMode>,
    #[serde(deserialize_with = "de_opt_id")]
    center_id: Option<i64>,
    #[serde(deserialize_with = "de_opt_id")]
    anganwadi_center_id: Option<i64>,
}

impl TryFrom<RawRecord> for AttendanceRecord {
    type Error = String;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let id = raw.id.or(raw.attendance_id).ok_or("attendance record without an id")?;
        let attendance_date = raw
            .attendance_date
            .or(raw.date)
            .ok_or_else(|| format!("attendance record {} without a date", id))?;
        Ok(AttendanceRecord {
            id,
            subject_id: raw.subject_id.or(raw.student_id).or(raw.staff_id),
            attendance_date,
            attendance_mode: raw.attendance_mode.or(raw.mode),
            center_id: raw.center_id.or(raw.anganwadi_center_id),
        })
    }
}

/// The backend wraps every list in `{"data": ...}`.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

fn value_to_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn de_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_id))
}

fn de_opt_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn de_opt_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(parse_calendar_date))
}
