use crate::core::report::department_of;
use crate::domain::model::{
    AttendanceRecord, AttendanceStatus, DayStatus, Employee, RosterDay, RosterDayEntry, RosterDaySummary,
    StoredAttendanceRecord, MANUAL_ENTRY_ROW,
};
use crate::domain::ports::AttendanceRepository;
use crate::utils::error::{EtlError, Result};
use chrono::NaiveDate;

/// Every roster employee for `date`, in roster order. Employees without a
/// record that day are `not-marked`; with several records the first one counts.
pub fn roster_day(stored: &[StoredAttendanceRecord], roster: &[Employee], date: NaiveDate) -> RosterDay {
    let entries: Vec<RosterDayEntry> = roster
        .iter()
        .map(|employee| {
            let marked = stored
                .iter()
                .find(|s| s.record.date == date && s.record.employee_id == employee.id);
            RosterDayEntry {
                employee_id: employee.id.clone(),
                employee_name: employee.name.clone(),
                department_name: department_of(Some(employee)),
                status: marked.map_or(DayStatus::NotMarked, |s| s.record.status.into()),
                record_id: marked.map(|s| s.id),
                marked_at: marked.and_then(|s| s.marked_at),
            }
        })
        .collect();

    let count = |status: DayStatus| entries.iter().filter(|e| e.status == status).count();
    let summary = RosterDaySummary {
        total: entries.len(),
        present: count(DayStatus::Present),
        absent: count(DayStatus::Absent),
        not_marked: count(DayStatus::NotMarked),
    };

    RosterDay { date, entries, summary }
}

fn manual_record(employee: &Employee, date: NaiveDate, status: AttendanceStatus) -> AttendanceRecord {
    AttendanceRecord {
        employee_id: employee.id.clone(),
        employee_name: employee.name.clone(),
        status,
        date,
        original_row: MANUAL_ENTRY_ROW,
    }
}

/// Hand marking against the store: one record per employee and day.
pub struct MarkingService<R: AttendanceRepository> {
    repository: R,
}

impl<R: AttendanceRepository> MarkingService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub async fn roster_day(&self, roster: &[Employee], date: NaiveDate) -> Result<RosterDay> {
        let stored = self.repository.find_by_date(date).await?;
        Ok(roster_day(&stored, roster, date))
    }

    /// Sets one employee's status for `date`, replacing any earlier status that day.
    pub async fn mark(
        &self,
        roster: &[Employee],
        employee_id: &str,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<StoredAttendanceRecord> {
        let employee = roster
            .iter()
            .find(|e| e.id == employee_id)
            .ok_or_else(|| EtlError::validation(format!("Employee '{}' not found", employee_id)))?;

        let stored = self
            .repository
            .mark(vec![manual_record(employee, date, status)])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EtlError::processing(format!("Store returned no record for employee '{}'", employee_id)))?;

        tracing::info!("✏️ Marked {} {} for {}", employee.name, status, date);
        Ok(stored)
    }

    /// Marks every employee still `not-marked` on `date`. Already marked employees keep their status.
    pub async fn mark_unmarked(
        &self,
        roster: &[Employee],
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<Vec<StoredAttendanceRecord>> {
        let day = self.roster_day(roster, date).await?;
        let unmarked: Vec<AttendanceRecord> = roster
            .iter()
            .zip(&day.entries)
            .filter(|(_, entry)| entry.status == DayStatus::NotMarked)
            .map(|(employee, _)| manual_record(employee, date, status))
            .collect();

        if unmarked.is_empty() {
            tracing::info!("No unmarked employees found for {}", date);
            return Ok(Vec::new());
        }

        let marked = self.repository.mark(unmarked).await?;
        tracing::info!("✏️ Marked {} unmarked employees {} for {}", marked.len(), status, date);
        Ok(marked)
    }
}
