pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::repository::{InMemoryRepository, JsonFileRepository};
pub use config::storage::LocalStorage;
pub use config::{ImportOverrides, ImportSettings};
pub use crate::core::{
    etl::ImportEngine, marking::MarkingService, pipeline::AttendanceImportPipeline, reducer::reduce_rows,
    report::ReportService,
};
pub use domain::model::{AttendanceRecord, AttendanceStatus, Employee, ImportError, ImportErrorReason, ImportResult};
pub use utils::error::{EtlError, Result};

#[cfg(feature = "cli")]
pub use config::args::CliConfig;
