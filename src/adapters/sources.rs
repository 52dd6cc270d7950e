use crate::domain::model::{Employee, RawAttendanceRow};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_file_extensions;
use std::collections::HashSet;
use std::path::Path;

pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["csv", "tsv", "json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Tsv,
    Json,
}

impl SourceFormat {
    pub fn from_path(field_name: &str, path: &str) -> Result<Self> {
        validate_file_extensions(field_name, &[path], &SUPPORTED_EXTENSIONS)?;

        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(SourceFormat::Csv),
            Some("tsv") => Ok(SourceFormat::Tsv),
            Some("json") => Ok(SourceFormat::Json),
            _ => Err(EtlError::ConfigError {
                message: format!("Cannot tell the format of '{}'", path),
            }),
        }
    }

    fn delimiter(&self) -> u8 {
        match self {
            SourceFormat::Tsv => b'\t',
            _ => b',',
        }
    }
}

fn csv_reader(data: &[u8], format: SourceFormat) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .delimiter(format.delimiter())
        .has_headers(true)
        .flexible(true)
        .from_reader(data)
}

/// Reads attendance rows. Spreadsheet cells stay strings; JSON keeps its scalar types.
pub fn parse_rows(data: &[u8], format: SourceFormat) -> Result<Vec<RawAttendanceRow>> {
    match format {
        SourceFormat::Csv | SourceFormat::Tsv => {
            let mut reader = csv_reader(data, format);
            let headers = reader.headers()?.clone();

            let mut rows: Vec<RawAttendanceRow> = Vec::new();
            for record in reader.records() {
                let record = record?;
                // blank spreadsheet lines are not data rows
                if record.iter().all(|cell| cell.trim().is_empty()) {
                    continue;
                }
                rows.push(
                    headers
                        .iter()
                        .zip(record.iter())
                        .map(|(header, cell)| (header.trim(), cell))
                        .collect(),
                );
            }
            Ok(rows)
        }
        SourceFormat::Json => {
            let value: serde_json::Value = serde_json::from_slice(data)?;
            let items = match value {
                serde_json::Value::Array(items) => items,
                _ => return Err(EtlError::validation("Attendance JSON must be an array of row objects")),
            };

            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| match item {
                    serde_json::Value::Object(cells) => Ok(cells.into_iter().collect()),
                    _ => Err(EtlError::validation(format!(
                        "Attendance JSON item {} is not an object",
                        index
                    ))),
                })
                .collect()
        }
    }
}

/// Reads the employee roster (`id`, `name`, `email`, optional `department`).
pub fn parse_roster(data: &[u8], format: SourceFormat) -> Result<Vec<Employee>> {
    let roster: Vec<Employee> = match format {
        SourceFormat::Csv | SourceFormat::Tsv => {
            let mut reader = csv::ReaderBuilder::new()
                .delimiter(format.delimiter())
                .trim(csv::Trim::All)
                .from_reader(data);
            reader
                .deserialize::<Employee>()
                .collect::<std::result::Result<Vec<_>, _>>()?
                .into_iter()
                .map(|mut employee| {
                    employee.department = employee.department.filter(|d| !d.is_empty());
                    employee
                })
                .collect()
        }
        SourceFormat::Json => {
            let entries: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_slice(data)?;
            entries
                .into_iter()
                .map(|mut entry| {
                    // some HR exports write ids as JSON numbers
                    if let Some(serde_json::Value::Number(id)) = entry.get("id") {
                        let id = id.to_string();
                        entry.insert("id".to_string(), serde_json::Value::String(id));
                    }
                    serde_json::from_value(serde_json::Value::Object(entry))
                })
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let mut seen = HashSet::new();
    for employee in &roster {
        if employee.id.trim().is_empty() {
            return Err(EtlError::validation(format!(
                "Roster entry '{}' has an empty id",
                employee.name
            )));
        }
        if !seen.insert(employee.id.as_str()) {
            tracing::warn!("⚠️ Duplicate roster id '{}'; the first entry wins during lookup", employee.id);
        }
    }

    Ok(roster)
}
