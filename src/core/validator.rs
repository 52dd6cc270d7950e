use crate::core::status::normalize_status;
use crate::domain::model::{AttendanceRecord, Employee, ImportError, ImportErrorReason, NormalizedRow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Checks one row and builds its record. The first failing check decides the
/// error: identifier, then status presence, then roster lookup, then status vocabulary.
pub fn validate_row(
    row: &NormalizedRow,
    roster: &[Employee],
    fallback_date: NaiveDate,
) -> Result<AttendanceRecord, ImportError> {
    let fail = |reason| ImportError {
        row: row.row_number,
        reason,
    };

    if row.employee_id.is_none() && row.employee_name.is_none() {
        return Err(fail(ImportErrorReason::MissingEmployeeIdentifier));
    }

    let status_token = row.status.as_deref().ok_or_else(|| fail(ImportErrorReason::MissingStatus))?;

    let employee = find_employee(roster, row.employee_id.as_deref(), row.employee_name.as_deref())
        .ok_or_else(|| {
            fail(ImportErrorReason::EmployeeNotFound {
                identifier: describe_identifier(row),
            })
        })?;

    let status = normalize_status(status_token).map_err(fail)?;

    let date = match row.date.as_deref() {
        Some(text) => parse_row_date(text).unwrap_or_else(|| {
            tracing::debug!(
                "Row {}: unparseable date '{}', using {}",
                row.row_number,
                text,
                fallback_date
            );
            fallback_date
        }),
        None => fallback_date,
    };

    Ok(AttendanceRecord {
        employee_id: employee.id.clone(),
        employee_name: employee.name.clone(),
        status,
        date,
        original_row: row.row_number,
    })
}

/// First roster entry whose id equals the id cell exactly, or whose name or
/// email equals the name cell ignoring case and surrounding whitespace.
pub fn find_employee<'a>(roster: &'a [Employee], id: Option<&str>, name: Option<&str>) -> Option<&'a Employee> {
    let needle = name.map(|n| n.trim().to_lowercase());
    let matches = |employee: &&Employee| {
        id.is_some_and(|id| employee.id == id)
            || needle.as_deref().is_some_and(|needle| {
                employee.name.trim().to_lowercase() == needle || employee.email.trim().to_lowercase() == needle
            })
    };

    let mut candidates = roster.iter().filter(matches);
    let found = candidates.next()?;

    if let Some(other) = candidates.next() {
        tracing::debug!(
            "Identifier (id {:?}, name {:?}) matches several employees ('{}' and '{}'); using the first",
            id,
            name,
            found.id,
            other.id
        );
    }

    Some(found)
}

fn describe_identifier(row: &NormalizedRow) -> String {
    match (row.employee_name.as_deref(), row.employee_id.as_deref()) {
        (Some(name), Some(id)) => format!("{} (ID: {})", name, id),
        (Some(name), None) => name.to_string(),
        (None, Some(id)) => id.to_string(),
        (None, None) => String::new(),
    }
}

/// Reduces a date cell to a calendar date. Returns `None` for anything that
/// is not one of the accepted layouts.
pub fn parse_row_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    // offset timestamps count on their UTC calendar day
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::AttendanceStatus;

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
                department: None,
            },
        ]
    }

    fn row(id: Option<&str>, name: Option<&str>, status: Option<&str>, date: Option<&str>) -> NormalizedRow {
        NormalizedRow {
            row_number: 2,
            employee_id: id.map(str::to_string),
            employee_name: name.map(str::to_string),
            status: status.map(str::to_string),
            date: date.map(str::to_string),
        }
    }

    fn march_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_valid_row_by_id_uses_fallback_date() {
        let record = validate_row(&row(Some("1"), None, Some("P"), None), &roster(), march_first()).unwrap();
        assert_eq!(
            record,
            AttendanceRecord {
                employee_id: "1".to_string(),
                employee_name: "Ada Lovelace".to_string(),
                status: AttendanceStatus::Present,
                date: march_first(),
                original_row: 2,
            }
        );
    }

    #[test]
    fn test_missing_identifier_wins_over_missing_status() {
        let err = validate_row(&row(None, None, None, None), &roster(), march_first()).unwrap_err();
        assert_eq!(err.reason, ImportErrorReason::MissingEmployeeIdentifier);
        assert_eq!(err.row, 2);
    }

    #[test]
    fn test_missing_status() {
        let err = validate_row(&row(Some("1"), None, None, None), &roster(), march_first()).unwrap_err();
        assert_eq!(err.reason, ImportErrorReason::MissingStatus);
    }

    #[test]
    fn test_missing_status_wins_over_unknown_employee() {
        let err = validate_row(&row(Some("99"), None, None, None), &roster(), march_first()).unwrap_err();
        assert_eq!(err.reason, ImportErrorReason::MissingStatus);
        assert_eq!(err.row, 2);
    }

    #[test]
    fn test_unknown_employee_is_reported_before_bad_status() {
        let err = validate_row(&row(None, Some("Ghost"), Some("late"), None), &roster(), march_first()).unwrap_err();
        assert_eq!(
            err.reason,
            ImportErrorReason::EmployeeNotFound {
                identifier: "Ghost".to_string()
            }
        );
    }

    #[test]
    fn test_unrecognized_status() {
        let err = validate_row(&row(Some("2"), None, Some("maybe"), None), &roster(), march_first()).unwrap_err();
        assert_eq!(err.reason.code(), "UnrecognizedStatus");
    }

    #[test]
    fn test_matches_name_and_email_case_insensitively() {
        let by_name = validate_row(&row(None, Some("  grace HOPPER "), Some("no"), None), &roster(), march_first());
        assert_eq!(by_name.unwrap().employee_id, "2");

        let by_email = validate_row(&row(None, Some("ADA@example.com"), Some("1"), None), &roster(), march_first());
        assert_eq!(by_email.unwrap().employee_id, "1");
    }

    #[test]
    fn test_id_match_is_exact() {
        let err = validate_row(&row(Some("01"), None, Some("p"), None), &roster(), march_first()).unwrap_err();
        assert_eq!(err.reason.code(), "EmployeeNotFound");
    }

    #[test]
    fn test_lookup_is_column_specific() {
        // an email in the id column is not an id
        let err = validate_row(&row(Some("ada@example.com"), None, Some("p"), None), &roster(), march_first()).unwrap_err();
        assert_eq!(err.reason.code(), "EmployeeNotFound");

        // an id in the name column is not a name
        let err = validate_row(&row(None, Some("2"), Some("p"), None), &roster(), march_first()).unwrap_err();
        assert_eq!(err.reason.code(), "EmployeeNotFound");

        // either column may resolve the row
        let record = validate_row(&row(Some("99"), Some("Grace Hopper"), Some("p"), None), &roster(), march_first()).unwrap();
        assert_eq!(record.employee_id, "2");
    }

    #[test]
    fn test_first_match_wins_for_duplicate_names() {
        let mut employees = roster();
        employees.push(Employee {
            id: "3".to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada2@example.com".to_string(),
            department: None,
        });
        let found = find_employee(&employees, None, Some("ada lovelace")).unwrap();
        assert_eq!(found.id, "1");
    }

    #[test]
    fn test_row_date_overrides_fallback() {
        let record = validate_row(
            &row(Some("1"), None, Some("a"), Some("2024-03-15T09:30:00Z")),
            &roster(),
            march_first(),
        )
        .unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(record.status, AttendanceStatus::Absent);
    }

    #[test]
    fn test_unparseable_date_falls_back() {
        let record = validate_row(&row(Some("1"), None, Some("p"), Some("next tuesday")), &roster(), march_first()).unwrap();
        assert_eq!(record.date, march_first());
    }

    #[test]
    fn test_parse_row_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5);
        assert_eq!(parse_row_date("2024-03-05"), expected);
        assert_eq!(parse_row_date("2024/03/05"), expected);
        assert_eq!(parse_row_date("03/05/2024"), expected);
        assert_eq!(parse_row_date("2024-03-05 17:45:00"), expected);
        assert_eq!(parse_row_date("2024-03-05T23:00:00+00:00"), expected);
        assert_eq!(parse_row_date("2024-02-30"), None);
    }

    #[test]
    fn test_offset_timestamps_use_the_utc_day() {
        assert_eq!(parse_row_date("2024-03-15T23:30:00-05:00"), NaiveDate::from_ymd_opt(2024, 3, 16));
        assert_eq!(parse_row_date("2024-03-16T01:00:00+09:00"), NaiveDate::from_ymd_opt(2024, 3, 15));
    }
}
