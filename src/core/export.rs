use crate::domain::model::{AttendanceRecord, DailyReport, ImportError, ImportResult, MonthlyReport, RosterDay};
use crate::utils::error::{EtlError, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const TEMPLATE_HEADERS: [&str; 4] = ["Employee_ID", "Employee_Name", "Status", "Date"];

pub fn daily_report_filename(date: NaiveDate) -> String {
    format!("daily_attendance_{}.csv", date.format("%Y-%m-%d"))
}

pub fn monthly_report_filename(year: i32, month: u32) -> String {
    format!("monthly_attendance_{:04}_{:02}.csv", year, month)
}

pub fn roster_day_filename(date: NaiveDate) -> String {
    format!("roster_attendance_{}.csv", date.format("%Y-%m-%d"))
}

pub fn template_filename(date: NaiveDate) -> String {
    format!("attendance_template_{}.csv", date.format("%Y-%m-%d"))
}

pub fn import_bundle_filename(fallback_date: NaiveDate) -> String {
    format!("import_{}.zip", fallback_date.format("%Y-%m-%d"))
}

fn write_csv<I, R>(headers: &[&str], rows: I) -> Result<String>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| EtlError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| EtlError::processing(format!("CSV output is not UTF-8: {}", e)))
}

pub fn records_csv(records: &[AttendanceRecord]) -> Result<String> {
    write_csv(
        &["Employee ID", "Employee Name", "Status", "Date", "Row"],
        records.iter().map(|r| {
            [
                r.employee_id.clone(),
                r.employee_name.clone(),
                r.status.to_string(),
                r.date.to_string(),
                r.original_row.to_string(),
            ]
        }),
    )
}

pub fn errors_csv(errors: &[ImportError]) -> Result<String> {
    write_csv(
        &["Row", "Reason", "Message"],
        errors
            .iter()
            .map(|e| [e.row.to_string(), e.reason.code().to_string(), e.reason.to_string()]),
    )
}

pub fn daily_report_csv(report: &DailyReport) -> Result<String> {
    write_csv(
        &["Employee Name", "Department", "Status", "Date"],
        report.entries.iter().map(|e| {
            [
                e.employee_name.clone(),
                e.department_name.clone(),
                e.status.to_string(),
                e.date.to_string(),
            ]
        }),
    )
}

pub fn roster_day_csv(day: &RosterDay) -> Result<String> {
    write_csv(
        &["Employee ID", "Employee Name", "Department", "Status", "Marked At"],
        day.entries.iter().map(|e| {
            [
                e.employee_id.clone(),
                e.employee_name.clone(),
                e.department_name.clone(),
                e.status.to_string(),
                e.marked_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            ]
        }),
    )
}

pub fn monthly_report_csv(report: &MonthlyReport) -> Result<String> {
    write_csv(
        &[
            "Employee Name",
            "Department",
            "Total Days",
            "Present Days",
            "Absent Days",
            "Attendance %",
        ],
        report.entries.iter().map(|e| {
            [
                e.employee_name.clone(),
                e.department_name.clone(),
                e.total_days.to_string(),
                e.present_days.to_string(),
                e.absent_days.to_string(),
                format!("{}%", e.attendance_percentage),
            ]
        }),
    )
}

/// Sample upload sheet with one row per accepted status style.
pub fn template_csv(date: NaiveDate) -> Result<String> {
    let date = date.to_string();
    write_csv(
        &TEMPLATE_HEADERS,
        [
            ["001", "John Doe", "Present", date.as_str()],
            ["002", "Jane Smith", "Absent", date.as_str()],
            ["003", "Mike Johnson", "P", date.as_str()],
        ],
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BundleSummary<'a> {
    fallback_date: NaiveDate,
    total_rows: usize,
    valid_records: usize,
    errors: usize,
    committed: usize,
    error_messages: Vec<String>,
    records: &'a [AttendanceRecord],
}

/// Zip holding `records.csv`, `errors.csv` and `summary.json` for one import run.
pub fn import_bundle(result: &ImportResult, fallback_date: NaiveDate, committed: usize) -> Result<Vec<u8>> {
    let summary = BundleSummary {
        fallback_date,
        total_rows: result.total_rows(),
        valid_records: result.valid_count(),
        errors: result.error_count(),
        committed,
        error_messages: result.errors.iter().map(|e| e.to_string()).collect(),
        records: &result.records,
    };

    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    zip.start_file::<_, ()>("records.csv", FileOptions::default())?;
    zip.write_all(records_csv(&result.records)?.as_bytes())?;

    zip.start_file::<_, ()>("errors.csv", FileOptions::default())?;
    zip.write_all(errors_csv(&result.errors)?.as_bytes())?;

    zip.start_file::<_, ()>("summary.json", FileOptions::default())?;
    zip.write_all(serde_json::to_string_pretty(&summary)?.as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
