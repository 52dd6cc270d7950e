use crate::domain::model::{
    AttendanceRecord, AttendanceStatus, DailyReport, DailyReportEntry, DailySummary, Employee, MonthlyReport,
    MonthlyReportEntry, MonthlySummary, StoredAttendanceRecord,
};
use crate::domain::ports::AttendanceRepository;
use crate::utils::error::{EtlError, Result};
use chrono::{Datelike, NaiveDate};

const UNKNOWN_DEPARTMENT: &str = "N/A";

/// `round(numerator / denominator * 100)`, halves rounded up. Zero when the denominator is zero.
pub fn rounded_percentage(numerator: usize, denominator: usize) -> u32 {
    if denominator == 0 {
        return 0;
    }
    // floor(x + 0.5) with x = 100n/d, kept in integers
    ((200 * numerator as u64 + denominator as u64) / (2 * denominator as u64)) as u32
}

/// Inclusive first and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let invalid = || EtlError::validation(format!("{:04}-{:02} is not a valid calendar month", year, month));

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last = next_first.and_then(|d| d.pred_opt()).ok_or_else(invalid)?;
    Ok((first, last))
}

pub(crate) fn department_of(employee: Option<&Employee>) -> String {
    employee
        .and_then(|e| e.department.as_deref())
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(UNKNOWN_DEPARTMENT)
        .to_string()
}

/// Records marked for `date`, joined to the roster. Employees with no record
/// that day are left out rather than counted as absent.
pub fn daily_report(
    records: &[AttendanceRecord],
    roster: &[Employee],
    date: NaiveDate,
    employee_id: Option<&str>,
) -> DailyReport {
    let entries: Vec<DailyReportEntry> = records
        .iter()
        .filter(|r| r.date == date)
        .filter(|r| employee_id.is_none_or(|id| r.employee_id == id))
        .map(|r| {
            let employee = roster.iter().find(|e| e.id == r.employee_id);
            DailyReportEntry {
                employee_id: r.employee_id.clone(),
                employee_name: employee.map_or_else(|| r.employee_name.clone(), |e| e.name.clone()),
                department_name: department_of(employee),
                status: r.status,
                date: r.date,
            }
        })
        .collect();

    let count = |status: AttendanceStatus| entries.iter().filter(|e| e.status == status).count();
    let summary = DailySummary {
        total_employees: if employee_id.is_some() { 1 } else { roster.len() },
        total_present: count(AttendanceStatus::Present),
        total_absent: count(AttendanceStatus::Absent),
        total_marked: entries.len(),
    };

    DailyReport { date, entries, summary }
}

/// Per-employee present/absent counts for a month, with the percentage taken
/// over every calendar day of the month.
pub fn monthly_report(
    records: &[AttendanceRecord],
    roster: &[Employee],
    year: i32,
    month: u32,
    employee_id: Option<&str>,
) -> Result<MonthlyReport> {
    let (first, last) = month_bounds(year, month)?;
    let total_days = last.day();

    let in_month: Vec<&AttendanceRecord> = records.iter().filter(|r| r.date >= first && r.date <= last).collect();

    let entries: Vec<MonthlyReportEntry> = roster
        .iter()
        .filter(|e| employee_id.is_none_or(|id| e.id == id))
        .map(|employee| {
            let mut present_days = 0;
            let mut absent_days = 0;
            for record in in_month.iter().filter(|r| r.employee_id == employee.id) {
                match record.status {
                    AttendanceStatus::Present => present_days += 1,
                    AttendanceStatus::Absent => absent_days += 1,
                }
            }

            MonthlyReportEntry {
                employee_id: employee.id.clone(),
                employee_name: employee.name.clone(),
                department_name: department_of(Some(employee)),
                total_days,
                present_days,
                absent_days,
                attendance_percentage: rounded_percentage(present_days, total_days as usize),
            }
        })
        .collect();

    let percentage_sum: usize = entries.iter().map(|e| e.attendance_percentage as usize).sum();
    let summary = MonthlySummary {
        total_employees: entries.len(),
        // mean of whole percentages, rounded like the percentages themselves
        average_attendance: rounded_percentage(percentage_sum, entries.len() * 100),
        total_present_days: entries.iter().map(|e| e.present_days).sum(),
        total_absent_days: entries.iter().map(|e| e.absent_days).sum(),
    };

    Ok(MonthlyReport {
        year,
        month,
        total_days,
        entries,
        summary,
    })
}

/// Runs the aggregations over records fetched from an injected store.
pub struct ReportService<R: AttendanceRepository> {
    repository: R,
}

impl<R: AttendanceRepository> ReportService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub async fn daily(&self, roster: &[Employee], date: NaiveDate, employee_id: Option<&str>) -> Result<DailyReport> {
        let stored = match employee_id {
            Some(id) => self.repository.find_by_employee(id).await?,
            None => self.repository.find_by_date(date).await?,
        };
        let report = daily_report(&unwrap_records(stored), roster, date, employee_id);
        tracing::info!(
            "📅 Daily report for {}: {} marked, {} present, {} absent",
            date,
            report.summary.total_marked,
            report.summary.total_present,
            report.summary.total_absent
        );
        Ok(report)
    }

    pub async fn monthly(
        &self,
        roster: &[Employee],
        year: i32,
        month: u32,
        employee_id: Option<&str>,
    ) -> Result<MonthlyReport> {
        let (first, last) = month_bounds(year, month)?;
        let stored = self.repository.find_between(first, last).await?;
        let report = monthly_report(&unwrap_records(stored), roster, year, month, employee_id)?;
        tracing::info!(
            "📅 Monthly report for {:04}-{:02}: {} employees, average attendance {}%",
            year,
            month,
            report.summary.total_employees,
            report.summary.average_attendance
        );
        Ok(report)
    }
}

fn unwrap_records(stored: Vec<StoredAttendanceRecord>) -> Vec<AttendanceRecord> {
    stored.into_iter().map(|s| s.record).collect()
}
