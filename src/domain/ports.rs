use crate::domain::model::{AttendanceRecord, Employee, ImportResult, RawAttendanceRow, StoredAttendanceRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn rows_file(&self) -> &str;
    fn roster_file(&self) -> &str;
    fn fallback_date(&self) -> NaiveDate;
    fn output_path(&self) -> &str;
    /// Extra header spellings, consulted after the built-in ones.
    fn column_aliases(&self) -> &crate::core::columns::ColumnAliases;
    fn commit(&self) -> bool;
    fn allow_partial(&self) -> bool;
}

/// Attendance record store. Single writer; implementations do not guard
/// against concurrent imports.
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    async fn append(&self, records: Vec<AttendanceRecord>) -> Result<Vec<StoredAttendanceRecord>>;
    /// Sets the status for each (employee, date): the first stored record for
    /// that pair is updated in place, otherwise a new record is added.
    async fn mark(&self, records: Vec<AttendanceRecord>) -> Result<Vec<StoredAttendanceRecord>>;
    async fn all(&self) -> Result<Vec<StoredAttendanceRecord>>;

    async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<StoredAttendanceRecord>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|stored| stored.record.date == date)
            .collect())
    }

    async fn find_by_employee(&self, employee_id: &str) -> Result<Vec<StoredAttendanceRecord>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|stored| stored.record.employee_id == employee_id)
            .collect())
    }

    /// Records dated within `start..=end`.
    async fn find_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<StoredAttendanceRecord>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|stored| stored.record.date >= start && stored.record.date <= end)
            .collect())
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Extracted>;
    async fn transform(&self, extracted: Extracted) -> Result<ImportResult>;
    async fn load(&self, result: ImportResult) -> Result<LoadSummary>;
}

/// What the extract phase hands to transform.
#[derive(Debug, Clone, Default)]
pub struct Extracted {
    pub roster: Vec<Employee>,
    pub rows: Vec<RawAttendanceRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    pub bundle_path: String,
    pub valid_records: usize,
    pub errors: usize,
    /// Records appended to the store; zero for previews.
    pub committed: usize,
}
