use crate::adapters::sources::{parse_roster, parse_rows, SourceFormat};
use crate::core::export::{import_bundle, import_bundle_filename};
use crate::core::reducer::reduce_rows;
use crate::core::{AttendanceRepository, ConfigProvider, Extracted, ImportResult, LoadSummary, Pipeline, Storage};
use crate::utils::error::{EtlError, Result};
use std::path::Path;

pub struct AttendanceImportPipeline<S: Storage, R: AttendanceRepository, C: ConfigProvider> {
    storage: S,
    repository: R,
    config: C,
}

impl<S: Storage, R: AttendanceRepository, C: ConfigProvider> AttendanceImportPipeline<S, R, C> {
    pub fn new(storage: S, repository: R, config: C) -> Self {
        Self {
            storage,
            repository,
            config,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Decides whether `result` may be written to the store. Refusals carry the
    /// message shown to the person running the import.
    pub fn check_commit(&self, result: &ImportResult) -> Result<()> {
        if result.records.is_empty() {
            return Err(EtlError::CommitRefused {
                message: "No valid data to upload".to_string(),
            });
        }
        if !result.is_clean() && !self.config.allow_partial() {
            return Err(EtlError::CommitRefused {
                message: format!(
                    "Please fix validation errors before uploading ({} rows rejected)",
                    result.error_count()
                ),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<S: Storage, R: AttendanceRepository, C: ConfigProvider> Pipeline for AttendanceImportPipeline<S, R, C> {
    async fn extract(&self) -> Result<Extracted> {
        let roster_format = SourceFormat::from_path("import.roster_file", self.config.roster_file())?;
        let rows_format = SourceFormat::from_path("import.rows_file", self.config.rows_file())?;

        tracing::debug!("Reading roster from: {}", self.config.roster_file());
        let roster_data = self.storage.read_file(self.config.roster_file()).await?;
        let roster = parse_roster(&roster_data, roster_format)?;

        tracing::debug!("Reading attendance rows from: {}", self.config.rows_file());
        let rows_data = self.storage.read_file(self.config.rows_file()).await?;
        let rows = parse_rows(&rows_data, rows_format)?;

        if roster.is_empty() {
            tracing::warn!("⚠️ Roster is empty; every row will be rejected as an unknown employee");
        }

        Ok(Extracted { roster, rows })
    }

    async fn transform(&self, extracted: Extracted) -> Result<ImportResult> {
        Ok(reduce_rows(
            &extracted.rows,
            &extracted.roster,
            self.config.fallback_date(),
            self.config.column_aliases(),
        ))
    }

    async fn load(&self, result: ImportResult) -> Result<LoadSummary> {
        let committed = if self.config.commit() {
            self.check_commit(&result)?;
            let stored = self.repository.append(result.records.clone()).await?;
            tracing::info!("💾 Appended {} attendance records to the store", stored.len());
            stored.len()
        } else {
            tracing::info!("🔍 Preview only; nothing was written to the store");
            0
        };

        let bundle_name = import_bundle_filename(self.config.fallback_date());
        let bundle_path = Path::new(self.config.output_path())
            .join(&bundle_name)
            .to_string_lossy()
            .into_owned();

        let zip_data = import_bundle(&result, self.config.fallback_date(), committed)?;
        tracing::debug!("Writing import bundle ({} bytes) to {}", zip_data.len(), bundle_path);
        self.storage.write_file(&bundle_path, &zip_data).await?;

        Ok(LoadSummary {
            bundle_path,
            valid_records: result.valid_count(),
            errors: result.error_count(),
            committed,
        })
    }
}
