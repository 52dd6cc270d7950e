use crate::core::columns::ColumnAliases;
use crate::core::validator::validate_row;
use crate::domain::model::{Employee, ImportResult, RawAttendanceRow};
use chrono::NaiveDate;

/// Validates every row in order and splits the outcomes into records and
/// errors. Never stops early; each row lands in exactly one of the two lists.
pub fn reduce_rows(
    rows: &[RawAttendanceRow],
    roster: &[Employee],
    fallback_date: NaiveDate,
    aliases: &ColumnAliases,
) -> ImportResult {
    let mut result = ImportResult {
        records: Vec::with_capacity(rows.len()),
        errors: Vec::new(),
    };

    for (index, raw) in rows.iter().enumerate() {
        let normalized = aliases.resolve(raw, index);
        match validate_row(&normalized, roster, fallback_date) {
            Ok(record) => result.records.push(record),
            Err(error) => {
                tracing::debug!("{}", error);
                result.errors.push(error);
            }
        }
    }

    tracing::debug!(
        "Reduced {} rows: {} valid, {} errors",
        rows.len(),
        result.valid_count(),
        result.error_count()
    );
    result
}

/// Display digest of an error list: the first `limit` lines, then a count of the rest.
pub fn error_digest(result: &ImportResult, limit: usize) -> Vec<String> {
    let mut lines: Vec<String> = result.errors.iter().take(limit).map(|e| e.to_string()).collect();
    if result.errors.len() > limit {
        lines.push(format!("... and {} more errors", result.errors.len() - limit));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AttendanceRecord, AttendanceStatus, ImportErrorReason};
    use serde_json::json;

    fn roster() -> Vec<Employee> {
        vec![
            Employee {
                id: "1".to_string(),
                name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                department: Some("Engineering".to_string()),
            },
            Employee {
                id: "2".to_string(),
                name: "Grace Hopper".to_string(),
                email: "grace@example.com".to_string(),
                department: Some("Operations".to_string()),
            },
        ]
    }

    fn fallback() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn reduce(rows: &[RawAttendanceRow]) -> ImportResult {
        reduce_rows(rows, &roster(), fallback(), &ColumnAliases::default())
    }

    fn mixed_rows() -> Vec<RawAttendanceRow> {
        vec![
            RawAttendanceRow::new().with("Employee_ID", "1").with("Status", "Present"),
            RawAttendanceRow::new().with("Employee_Name", "Ghost").with("Status", "P"),
            RawAttendanceRow::new().with("Name", "grace hopper").with("Attendance", json!(0)),
            RawAttendanceRow::new().with("Status", "P"),
            RawAttendanceRow::new().with("ID", "2").with("Status", "sick"),
            RawAttendanceRow::new().with("ID", json!(1)).with("Present", "yes").with("Date", "2024-03-04"),
        ]
    }

    #[test]
    fn test_single_row_by_id() {
        let rows = vec![RawAttendanceRow::new().with("Employee_ID", "1").with("Status", "P")];
        let result = reduce(&rows);

        assert!(result.errors.is_empty());
        assert_eq!(
            result.records,
            vec![AttendanceRecord {
                employee_id: "1".to_string(),
                employee_name: "Ada Lovelace".to_string(),
                status: AttendanceStatus::Present,
                date: fallback(),
                original_row: 2,
            }]
        );
    }

    #[test]
    fn test_unknown_employee_yields_single_error() {
        let rows = vec![RawAttendanceRow::new().with("Employee_Name", "Ghost").with("Status", "Present")];
        let result = reduce(&rows);

        assert!(result.records.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row, 2);
        assert_eq!(result.errors[0].reason.code(), "EmployeeNotFound");
    }

    #[test]
    fn test_row_missing_identifier_and_status_reports_identifier_only() {
        let rows = vec![RawAttendanceRow::new().with("Date", "2024-03-02")];
        let result = reduce(&rows);

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].reason, ImportErrorReason::MissingEmployeeIdentifier);
    }

    #[test]
    fn test_every_row_has_exactly_one_outcome() {
        let rows = mixed_rows();
        let result = reduce(&rows);

        assert_eq!(result.valid_count() + result.error_count(), rows.len());
        assert_eq!(result.total_rows(), rows.len());

        let mut seen: Vec<usize> = result
            .records
            .iter()
            .map(|r| r.original_row)
            .chain(result.errors.iter().map(|e| e.row))
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (2..rows.len() + 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_outcomes_keep_input_order() {
        let result = reduce(&mixed_rows());

        let record_rows: Vec<usize> = result.records.iter().map(|r| r.original_row).collect();
        let error_rows: Vec<usize> = result.errors.iter().map(|e| e.row).collect();
        assert_eq!(record_rows, vec![2, 4, 7]);
        assert_eq!(error_rows, vec![3, 5, 6]);

        assert_eq!(result.records[1].status, AttendanceStatus::Absent);
        assert_eq!(result.records[2].date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(result.errors[1].reason, ImportErrorReason::MissingEmployeeIdentifier);
        assert_eq!(result.errors[2].reason.code(), "UnrecognizedStatus");
    }

    #[test]
    fn test_reducer_is_deterministic() {
        let rows = mixed_rows();
        assert_eq!(reduce(&rows), reduce(&rows));
    }

    #[test]
    fn test_empty_input() {
        let result = reduce(&[]);
        assert_eq!(result, ImportResult::default());
        assert!(result.is_clean());
    }

    #[test]
    fn test_error_digest_truncates() {
        let rows: Vec<RawAttendanceRow> = (0..13).map(|_| RawAttendanceRow::new().with("Status", "P")).collect();
        let result = reduce(&rows);

        let digest = error_digest(&result, 10);
        assert_eq!(digest.len(), 11);
        assert_eq!(digest[0], "Row 2: Employee ID or name is required");
        assert_eq!(digest[10], "... and 3 more errors");

        assert_eq!(error_digest(&result, 20).len(), 13);
    }
}
