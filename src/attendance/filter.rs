use chrono::NaiveDate;

use crate::attendance::window::{AttendanceFilter, is_within_window};
use crate::client::roster::models::roster_models::AttendanceRecord;

/// Records in `filter`'s window, in input order.
pub fn filter_records(records: &[AttendanceRecord], filter: &AttendanceFilter, reference: NaiveDate) -> Vec<AttendanceRecord> {
    records
        .iter()
        .filter(|record| is_within_window(&record.attendance_date, filter, reference))
        .cloned()
        .collect()
}

/// What a history list shows. An empty window is a state to render, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryView {
    NoRecords,
    Records(Vec<AttendanceRecord>),
}

impl HistoryView {
    pub fn from_records(records: Vec<AttendanceRecord>) -> Self {
        if records.is_empty() {
            HistoryView::NoRecords
        } else {
            HistoryView::Records(records)
        }
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        match self {
            HistoryView::NoRecords => &[],
            HistoryView::Records(records) => records,
        }
    }
}
