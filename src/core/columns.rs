use crate::domain::model::{NormalizedRow, RawAttendanceRow};
use serde::{Deserialize, Serialize};

const EMPLOYEE_ID_HEADERS: [&str; 3] = ["Employee_ID", "EmployeeID", "ID"];
const EMPLOYEE_NAME_HEADERS: [&str; 3] = ["Employee_Name", "Name", "EmployeeName"];
const STATUS_HEADERS: [&str; 3] = ["Status", "Attendance", "Present"];
const DATE_HEADERS: [&str; 1] = ["Date"];

/// Data row `i` (0-based) sits under a header line, so spreadsheets show it as `i + 2`.
pub fn spreadsheet_row_number(index: usize) -> usize {
    index + 2
}

/// Header spellings accepted for each field, in lookup order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnAliases {
    pub employee_id: Vec<String>,
    pub employee_name: Vec<String>,
    pub status: Vec<String>,
    pub date: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        let owned = |headers: &[&str]| headers.iter().map(|h| h.to_string()).collect();
        Self {
            employee_id: owned(&EMPLOYEE_ID_HEADERS),
            employee_name: owned(&EMPLOYEE_NAME_HEADERS),
            status: owned(&STATUS_HEADERS),
            date: owned(&DATE_HEADERS),
        }
    }
}

impl ColumnAliases {
    /// Built-in aliases followed by `extra`, skipping duplicates.
    pub fn extended_with(extra: &ColumnAliases) -> Self {
        let mut aliases = Self::default();
        merge(&mut aliases.employee_id, &extra.employee_id);
        merge(&mut aliases.employee_name, &extra.employee_name);
        merge(&mut aliases.status, &extra.status);
        merge(&mut aliases.date, &extra.date);
        aliases
    }

    pub fn resolve(&self, row: &RawAttendanceRow, index: usize) -> NormalizedRow {
        NormalizedRow {
            row_number: spreadsheet_row_number(index),
            employee_id: first_populated(row, &self.employee_id),
            employee_name: first_populated(row, &self.employee_name),
            status: first_populated(row, &self.status),
            date: first_populated(row, &self.date),
        }
    }
}

fn merge(target: &mut Vec<String>, extra: &[String]) {
    for alias in extra {
        if !target.iter().any(|existing| existing == alias) {
            target.push(alias.clone());
        }
    }
}

fn first_populated(row: &RawAttendanceRow, headers: &[String]) -> Option<String> {
    headers.iter().find_map(|header| row.get(header).and_then(cell_text))
}

/// Text of a populated cell. Blank strings, nulls and nested values count as empty.
pub fn cell_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        serde_json::Value::Number(n) => Some(match n.as_f64() {
            // 1.0 from a spreadsheet cell means employee "1", not "1.0"
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        }),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
    }
}
