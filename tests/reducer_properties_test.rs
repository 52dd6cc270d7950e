use attendance_etl::core::columns::ColumnAliases;
use attendance_etl::core::report::monthly_report;
use attendance_etl::domain::model::RawAttendanceRow;
use attendance_etl::{reduce_rows, AttendanceRecord, AttendanceStatus, Employee, ImportErrorReason, ImportResult};
use chrono::NaiveDate;
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
            department: None,
        },
    ]
}

fn march_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn reduce(rows: &[RawAttendanceRow]) -> ImportResult {
    reduce_rows(rows, &roster(), march_first(), &ColumnAliases::default())
}

/// Every combination of identifier column, status column and status token
/// the importer is expected to see, plus some it must reject.
fn generated_rows() -> Vec<RawAttendanceRow> {
    let identifiers: [(&str, serde_json::Value); 6] = [
        ("Employee_ID", json!("1")),
        ("EmployeeID", json!(2)),
        ("ID", json!("99")),
        ("Employee_Name", json!("ada lovelace")),
        ("Name", json!("GRACE@example.com")),
        ("Nickname", json!("Ada")),
    ];
    let statuses = ["Present", "p", "1", "Yes", "absent", "A", "0", "no", "late", ""];

    let mut rows = Vec::new();
    for (column, value) in &identifiers {
        for (i, status) in statuses.iter().enumerate() {
            let status_column = ["Status", "Attendance", "Present"][i % 3];
            rows.push(
                RawAttendanceRow::new()
                    .with(column, value.clone())
                    .with(status_column, *status),
            );
        }
    }
    rows
}

#[test]
fn test_each_row_has_exactly_one_outcome() {
    let rows = generated_rows();
    let result = reduce(&rows);

    assert_eq!(result.records.len() + result.errors.len(), rows.len());

    let mut rows_seen: Vec<usize> = result
        .records
        .iter()
        .map(|r| r.original_row)
        .chain(result.errors.iter().map(|e| e.row))
        .collect();
    rows_seen.sort_unstable();
    rows_seen.dedup();
    assert_eq!(rows_seen.len(), rows.len());
}

#[test]
fn test_synonym_sets_decide_the_status() {
    let result = reduce(&generated_rows());

    for record in &result.records {
        assert!(matches!(record.status, AttendanceStatus::Present | AttendanceStatus::Absent));
    }
    // 4 resolvable identifier columns x 8 recognized tokens
    assert_eq!(result.records.len(), 32);
    let present = result.records.iter().filter(|r| r.status == AttendanceStatus::Present).count();
    assert_eq!(present, 16);

    let unrecognized = result
        .errors
        .iter()
        .filter(|e| matches!(e.reason, ImportErrorReason::UnrecognizedStatus { .. }))
        .count();
    // "late" for each of the 4 resolvable identifiers
    assert_eq!(unrecognized, 4);
}

#[test]
fn test_outcomes_are_in_ascending_row_order() {
    let result = reduce(&generated_rows());

    assert!(result.records.windows(2).all(|w| w[0].original_row < w[1].original_row));
    assert!(result.errors.windows(2).all(|w| w[0].row < w[1].row));
}

#[test]
fn test_reducing_twice_gives_the_same_result() {
    let rows = generated_rows();
    assert_eq!(reduce(&rows), reduce(&rows));
}

#[test]
fn test_first_data_row_is_row_two() {
    let result = reduce(&[RawAttendanceRow::new().with("Employee_ID", "1").with("Status", "P")]);

    assert_eq!(
        result.records,
        vec![AttendanceRecord {
            employee_id: "1".to_string(),
            employee_name: "Ada Lovelace".to_string(),
            status: AttendanceStatus::Present,
            date: march_first(),
            original_row: 2,
        }]
    );
    assert!(result.errors.is_empty());
}

#[test]
fn test_unknown_name_is_reported_at_row_two() {
    let result = reduce(&[RawAttendanceRow::new().with("Employee_Name", "Ghost").with("Status", "Present")]);

    assert!(result.records.is_empty());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].row, 2);
    assert_eq!(result.errors[0].reason.code(), "EmployeeNotFound");
}

#[test]
fn test_missing_identifier_and_status_reports_identifier_only() {
    let result = reduce(&[RawAttendanceRow::new().with("Comment", "left early")]);

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].reason, ImportErrorReason::MissingEmployeeIdentifier);
}

#[test]
fn test_twenty_seven_of_thirty_days_is_ninety_percent() {
    let records: Vec<AttendanceRecord> = (1..=30)
        .map(|day| AttendanceRecord {
            employee_id: "1".to_string(),
            employee_name: "Ada Lovelace".to_string(),
            status: if day <= 27 {
                AttendanceStatus::Present
            } else {
                AttendanceStatus::Absent
            },
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            original_row: day as usize + 1,
        })
        .collect();

    let report = monthly_report(&records, &roster(), 2024, 6, Some("1")).unwrap();
    assert_eq!(report.total_days, 30);
    assert_eq!(report.entries[0].present_days, 27);
    assert_eq!(report.entries[0].absent_days, 3);
    assert_eq!(report.entries[0].attendance_percentage, 90);
}
