use crate::domain::model::{AttendanceRecord, StoredAttendanceRecord};
use crate::domain::ports::{AttendanceRepository, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const DEFAULT_STORE_FILE: &str = "attendance_records.json";

fn stamp(records: Vec<AttendanceRecord>, first_id: u64) -> Vec<StoredAttendanceRecord> {
    let uploaded_at = Utc::now();
    records
        .into_iter()
        .zip(first_id..)
        .map(|(record, id)| StoredAttendanceRecord {
            id,
            record,
            uploaded_at,
            marked_at: None,
        })
        .collect()
}

fn upsert_marks(store: &mut Vec<StoredAttendanceRecord>, records: Vec<AttendanceRecord>) -> Vec<StoredAttendanceRecord> {
    let now = Utc::now();
    let mut marked = Vec::with_capacity(records.len());

    for record in records {
        let existing = store
            .iter()
            .position(|s| s.record.employee_id == record.employee_id && s.record.date == record.date);

        let stored = match existing {
            Some(index) => {
                let stored = &mut store[index];
                stored.record.status = record.status;
                stored.marked_at = Some(now);
                stored.clone()
            }
            None => {
                let stored = StoredAttendanceRecord {
                    id: next_id(store),
                    record,
                    uploaded_at: now,
                    marked_at: Some(now),
                };
                store.push(stored.clone());
                stored
            }
        };
        marked.push(stored);
    }
    marked
}

fn next_id(existing: &[StoredAttendanceRecord]) -> u64 {
    existing.iter().map(|s| s.id).max().map_or(1, |max| max + 1)
}

/// Process-local store, shared between clones.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    records: Arc<Mutex<Vec<StoredAttendanceRecord>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttendanceRepository for InMemoryRepository {
    async fn append(&self, records: Vec<AttendanceRecord>) -> Result<Vec<StoredAttendanceRecord>> {
        let mut store = self.records.lock().await;
        let stored = stamp(records, next_id(&store));
        store.extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn mark(&self, records: Vec<AttendanceRecord>) -> Result<Vec<StoredAttendanceRecord>> {
        let mut store = self.records.lock().await;
        Ok(upsert_marks(&mut store, records))
    }

    async fn all(&self) -> Result<Vec<StoredAttendanceRecord>> {
        Ok(self.records.lock().await.clone())
    }
}

/// Keeps the whole record list as one JSON array in a file behind `Storage`.
/// Appends rewrite the file; a failed write leaves the previous contents in place.
pub struct JsonFileRepository<S: Storage> {
    storage: S,
    file_name: String,
}

impl<S: Storage> JsonFileRepository<S> {
    pub fn new(storage: S, file_name: impl Into<String>) -> Self {
        Self {
            storage,
            file_name: file_name.into(),
        }
    }

    async fn load(&self) -> Result<Vec<StoredAttendanceRecord>> {
        if !self.storage.exists(&self.file_name).await {
            return Ok(Vec::new());
        }

        let data = self.storage.read_file(&self.file_name).await?;
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&data)?)
    }
}

#[async_trait]
impl<S: Storage> AttendanceRepository for JsonFileRepository<S> {
    async fn append(&self, records: Vec<AttendanceRecord>) -> Result<Vec<StoredAttendanceRecord>> {
        let mut existing = self.load().await?;
        let stored = stamp(records, next_id(&existing));
        existing.extend(stored.iter().cloned());

        let json = serde_json::to_vec_pretty(&existing)?;
        self.storage.write_file(&self.file_name, &json).await?;

        tracing::debug!(
            "Appended {} records to {} ({} total)",
            stored.len(),
            self.file_name,
            existing.len()
        );
        Ok(stored)
    }

    async fn mark(&self, records: Vec<AttendanceRecord>) -> Result<Vec<StoredAttendanceRecord>> {
        let mut existing = self.load().await?;
        let marked = upsert_marks(&mut existing, records);

        let json = serde_json::to_vec_pretty(&existing)?;
        self.storage.write_file(&self.file_name, &json).await?;

        tracing::debug!("Marked {} records in {}", marked.len(), self.file_name);
        Ok(marked)
    }

    async fn all(&self) -> Result<Vec<StoredAttendanceRecord>> {
        self.load().await
    }
}
