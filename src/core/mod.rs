pub mod columns;
pub mod etl;
pub mod marking;
pub mod export;
pub mod pipeline;
pub mod reducer;
pub mod report;
pub mod status;
pub mod validator;

pub use crate::domain::model::{AttendanceRecord, Employee, ImportResult, RawAttendanceRow};
pub use crate::domain::ports::{AttendanceRepository, ConfigProvider, Extracted, LoadSummary, Pipeline, Storage};
pub use crate::utils::error::Result;
