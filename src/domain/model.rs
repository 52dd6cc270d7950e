use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Roster entry. Reference data only; the import never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

/// One spreadsheet row exactly as read: header text to scalar cell value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawAttendanceRow {
    pub cells: HashMap<String, serde_json::Value>,
}

impl RawAttendanceRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, header: &str, value: impl Into<serde_json::Value>) -> Self {
        self.cells.insert(header.to_string(), value.into());
        self
    }

    pub fn get(&self, header: &str) -> Option<&serde_json::Value> {
        self.cells.get(header)
    }
}

impl<K: Into<String>, V: Into<serde_json::Value>> FromIterator<(K, V)> for RawAttendanceRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// A raw row after column aliases have been resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRow {
    pub row_number: usize,
    pub employee_id: Option<String>,
    pub employee_name: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub employee_id: String,
    pub employee_name: String,
    pub status: AttendanceStatus,
    pub date: NaiveDate,
    pub original_row: usize,
}

/// `original_row` of a record marked by hand rather than imported from a sheet.
pub const MANUAL_ENTRY_ROW: usize = 0;

/// An attendance record once the store has accepted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAttendanceRecord {
    pub id: u64,
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub uploaded_at: DateTime<Utc>,
    /// Last time the status was set by hand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind")]
pub enum ImportErrorReason {
    #[error("Employee ID or name is required")]
    MissingEmployeeIdentifier,

    #[error("Status is required")]
    MissingStatus,

    #[error("Employee '{identifier}' not found")]
    EmployeeNotFound { identifier: String },

    #[error("Invalid status '{token}'. Use Present/Absent, P/A, 1/0, or Yes/No")]
    UnrecognizedStatus { token: String },
}

impl ImportErrorReason {
    /// Stable machine name of the reason, independent of the message text.
    pub fn code(&self) -> &'static str {
        match self {
            ImportErrorReason::MissingEmployeeIdentifier => "MissingEmployeeIdentifier",
            ImportErrorReason::MissingStatus => "MissingStatus",
            ImportErrorReason::EmployeeNotFound { .. } => "EmployeeNotFound",
            ImportErrorReason::UnrecognizedStatus { .. } => "UnrecognizedStatus",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportError {
    pub row: usize,
    pub reason: ImportErrorReason,
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row, self.reason)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub records: Vec<AttendanceRecord>,
    pub errors: Vec<ImportError>,
}

impl ImportResult {
    pub fn valid_count(&self) -> usize {
        self.records.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn total_rows(&self) -> usize {
        self.records.len() + self.errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReportEntry {
    pub employee_id: String,
    pub employee_name: String,
    pub department_name: String,
    pub status: AttendanceStatus,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub total_employees: usize,
    pub total_present: usize,
    pub total_absent: usize,
    pub total_marked: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub entries: Vec<DailyReportEntry>,
    pub summary: DailySummary,
}

/// Status of one roster employee on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayStatus {
    Present,
    Absent,
    NotMarked,
}

impl DayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayStatus::Present => "present",
            DayStatus::Absent => "absent",
            DayStatus::NotMarked => "not-marked",
        }
    }
}

impl From<AttendanceStatus> for DayStatus {
    fn from(status: AttendanceStatus) -> Self {
        match status {
            AttendanceStatus::Present => DayStatus::Present,
            AttendanceStatus::Absent => DayStatus::Absent,
        }
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterDayEntry {
    pub employee_id: String,
    pub employee_name: String,
    pub department_name: String,
    pub status: DayStatus,
    pub record_id: Option<u64>,
    pub marked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterDaySummary {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub not_marked: usize,
}

/// Every roster employee for one day, marked or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterDay {
    pub date: NaiveDate,
    pub entries: Vec<RosterDayEntry>,
    pub summary: RosterDaySummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReportEntry {
    pub employee_id: String,
    pub employee_name: String,
    pub department_name: String,
    pub total_days: u32,
    pub present_days: usize,
    pub absent_days: usize,
    pub attendance_percentage: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub total_employees: usize,
    pub average_attendance: u32,
    pub total_present_days: usize,
    pub total_absent_days: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub total_days: u32,
    pub entries: Vec<MonthlyReportEntry>,
    pub summary: MonthlySummary,
}
