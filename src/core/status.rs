use crate::domain::model::{AttendanceStatus, ImportErrorReason};

const PRESENT_TOKENS: [&str; 4] = ["present", "p", "1", "yes"];
const ABSENT_TOKENS: [&str; 4] = ["absent", "a", "0", "no"];

/// Maps a spreadsheet status cell to present/absent. Case-insensitive, trimmed,
/// whole-token matches only.
pub fn normalize_status(token: &str) -> Result<AttendanceStatus, ImportErrorReason> {
    let normalized = token.trim().to_lowercase();

    if PRESENT_TOKENS.contains(&normalized.as_str()) {
        Ok(AttendanceStatus::Present)
    } else if ABSENT_TOKENS.contains(&normalized.as_str()) {
        Ok(AttendanceStatus::Absent)
    } else {
        Err(ImportErrorReason::UnrecognizedStatus {
            token: token.to_string(),
        })
    }
}
