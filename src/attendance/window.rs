use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::attendance::clock::parse_calendar_date;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowKind {
    Today,
    ThisWeek,
    CurrentMonth,
    LastMonth,
    Yearly,
    CustomDate,
}

impl WindowKind {
    pub const ALL: [WindowKind; 6] = [
        WindowKind::Today,
        WindowKind::ThisWeek,
        WindowKind::CurrentMonth,
        WindowKind::LastMonth,
        WindowKind::Yearly,
        WindowKind::CustomDate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WindowKind::Today => "today",
            WindowKind::ThisWeek => "thisWeek",
            WindowKind::CurrentMonth => "currentMonth",
            WindowKind::LastMonth => "lastMonth",
            WindowKind::Yearly => "yearly",
            WindowKind::CustomDate => "customDate",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WindowKind::Today => "Today",
            WindowKind::ThisWeek => "This Week",
            WindowKind::CurrentMonth => "Current Month",
            WindowKind::LastMonth => "Last Month",
            WindowKind::Yearly => "Yearly",
            WindowKind::CustomDate => "Find by Date",
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        WindowKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::InvalidInput(format!("unknown attendance window '{}'", s)))
    }
}

/// The window a user picked for the history list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub kind: WindowKind,
    /// Only read for `CustomDate`: a date or date prefix such as `2024-03`.
    pub date: Option<String>,
}

impl AttendanceFilter {
    pub fn new(kind: WindowKind) -> Self {
        AttendanceFilter { kind, date: None }
    }

    pub fn custom(date: impl Into<String>) -> Self {
        AttendanceFilter { kind: WindowKind::CustomDate, date: Some(date.into()) }
    }
}

impl Default for AttendanceFilter {
    fn default() -> Self {
        AttendanceFilter::new(WindowKind::Today)
    }
}

/// Whether `candidate` (a backend date string) falls in `filter`'s window as
/// seen from `reference`.
///
/// `ThisWeek` is a rolling lookback: `reference - candidate <= 7` days, so
/// future dates are kept. `CustomDate` is a plain string prefix match on the
/// raw candidate; no custom date at all keeps everything. A candidate that
/// does not start with a valid `YYYY-MM-DD` only ever matches `CustomDate`.
pub fn is_within_window(candidate: &str, filter: &AttendanceFilter, reference: NaiveDate) -> bool {
    let date = || parse_calendar_date(candidate);

    match filter.kind {
        WindowKind::CustomDate => match filter.date.as_deref() {
            Some(prefix) => candidate.starts_with(prefix),
            None => true,
        },
        WindowKind::Today => date() == Some(reference),
        WindowKind::ThisWeek => date().is_some_and(|date| (reference - date).num_days() <= 7),
        WindowKind::CurrentMonth => {
            date().is_some_and(|date| date.year() == reference.year() && date.month() == reference.month())
        }
        WindowKind::LastMonth => {
            let (year, month) = previous_month(reference);
            date().is_some_and(|date| date.year() == year && date.month() == month)
        }
        WindowKind::Yearly => date().is_some_and(|date| date.year() == reference.year()),
    }
}

fn previous_month(reference: NaiveDate) -> (i32, u32) {
    if reference.month() == 1 {
        (reference.year() - 1, 12)
    } else {
        (reference.year(), reference.month() - 1)
    }
}
