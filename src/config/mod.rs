#[cfg(feature = "cli")]
pub mod args;
pub mod storage;
pub mod toml_config;

use crate::core::columns::ColumnAliases;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{parse_iso_date, validate_path, validate_required_field, Validate};
use crate::adapters::sources::SUPPORTED_EXTENSIONS;
use chrono::NaiveDate;
use toml_config::TomlConfig;

pub const DEFAULT_STORE_PATH: &str = "data/attendance_records.json";
pub const DEFAULT_OUTPUT_PATH: &str = "output";

/// Values given on the command line; each one beats the config file.
#[derive(Debug, Clone, Default)]
pub struct ImportOverrides {
    pub rows_file: Option<String>,
    pub roster_file: Option<String>,
    pub fallback_date: Option<String>,
    pub store_path: Option<String>,
    pub output_path: Option<String>,
    pub commit: bool,
    pub allow_partial: bool,
    pub monitor: Option<bool>,
}

/// Fully resolved settings for one import run.
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub rows_file: String,
    pub roster_file: String,
    pub fallback_date: NaiveDate,
    pub store_path: String,
    pub output_path: String,
    pub column_aliases: ColumnAliases,
    pub commit: bool,
    pub allow_partial: bool,
    pub monitor: bool,
}

impl ImportSettings {
    /// Merges CLI values over the config file. `today` fills a missing fallback date.
    pub fn resolve(overrides: ImportOverrides, file: &TomlConfig, today: NaiveDate) -> Result<Self> {
        file.validate()?;

        let rows_file = overrides.rows_file.or_else(|| file.import.rows_file.clone());
        let roster_file = overrides.roster_file.or_else(|| file.import.roster_file.clone());

        let fallback_date = match overrides.fallback_date.or_else(|| file.import.fallback_date.clone()) {
            Some(text) => parse_iso_date("import.fallback_date", &text)?,
            None => today,
        };

        let settings = Self {
            rows_file: validate_required_field("import.rows_file", &rows_file)?.clone(),
            roster_file: validate_required_field("import.roster_file", &roster_file)?.clone(),
            fallback_date,
            store_path: overrides
                .store_path
                .or_else(|| file.store.path.clone())
                .unwrap_or_else(|| DEFAULT_STORE_PATH.to_string()),
            output_path: overrides
                .output_path
                .or_else(|| file.output.path.clone())
                .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string()),
            column_aliases: ColumnAliases::extended_with(&file.columns),
            commit: overrides.commit || file.import.commit.unwrap_or(false),
            allow_partial: overrides.allow_partial || file.import.allow_partial.unwrap_or(false),
            monitor: overrides.monitor.unwrap_or_else(|| file.monitoring_enabled()),
        };

        settings.validate()?;
        Ok(settings)
    }
}

/// Where report commands read the roster and store and write their CSV.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub roster_file: String,
    pub store_path: String,
    pub output_path: String,
}

impl ReportSettings {
    pub fn resolve(
        roster_file: Option<String>,
        store_path: Option<String>,
        output_path: Option<String>,
        file: &TomlConfig,
    ) -> Result<Self> {
        file.validate()?;

        let roster_file = roster_file.or_else(|| file.import.roster_file.clone());
        let settings = Self {
            roster_file: validate_required_field("import.roster_file", &roster_file)?.clone(),
            store_path: store_path
                .or_else(|| file.store.path.clone())
                .unwrap_or_else(|| DEFAULT_STORE_PATH.to_string()),
            output_path: output_path
                .or_else(|| file.output.path.clone())
                .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string()),
        };

        validate_path("store.path", &settings.store_path)?;
        validate_path("output.path", &settings.output_path)?;
        crate::utils::validation::validate_file_extensions(
            "import.roster_file",
            &[settings.roster_file.as_str()],
            &SUPPORTED_EXTENSIONS,
        )?;
        Ok(settings)
    }
}

impl Validate for ImportSettings {
    fn validate(&self) -> Result<()> {
        validate_path("import.rows_file", &self.rows_file)?;
        validate_path("import.roster_file", &self.roster_file)?;
        validate_path("store.path", &self.store_path)?;
        validate_path("output.path", &self.output_path)?;
        crate::utils::validation::validate_file_extensions(
            "import",
            &[self.rows_file.as_str(), self.roster_file.as_str()],
            &SUPPORTED_EXTENSIONS,
        )?;
        crate::utils::validation::validate_file_extensions("store.path", &[self.store_path.as_str()], &["json"])?;
        Ok(())
    }
}

impl ConfigProvider for ImportSettings {
    fn rows_file(&self) -> &str {
        &self.rows_file
    }

    fn roster_file(&self) -> &str {
        &self.roster_file
    }

    fn fallback_date(&self) -> NaiveDate {
        self.fallback_date
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn column_aliases(&self) -> &ColumnAliases {
        &self.column_aliases
    }

    fn commit(&self) -> bool {
        self.commit
    }

    fn allow_partial(&self) -> bool {
        self.allow_partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    fn overrides() -> ImportOverrides {
        ImportOverrides {
            rows_file: Some("march.csv".to_string()),
            roster_file: Some("roster.json".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let settings = ImportSettings::resolve(overrides(), &TomlConfig::default(), today()).unwrap();
        assert_eq!(settings.fallback_date, today());
        assert_eq!(settings.store_path, DEFAULT_STORE_PATH);
        assert_eq!(settings.output_path, DEFAULT_OUTPUT_PATH);
        assert_eq!(settings.column_aliases, ColumnAliases::default());
        assert!(!settings.commit);
        assert!(!settings.monitor);
    }

    #[test]
    fn test_cli_values_beat_the_file() {
        let file = TomlConfig::from_toml_str(
            r#"
[import]
rows_file = "from-file.csv"
fallback_date = "2024-02-01"
commit = true

[output]
path = "file-out"

[columns]
status = ["Mark"]
"#,
        )
        .unwrap();

        let mut cli = overrides();
        cli.fallback_date = Some("2024-03-01".to_string());
        let settings = ImportSettings::resolve(cli, &file, today()).unwrap();

        assert_eq!(settings.rows_file, "march.csv");
        assert_eq!(settings.fallback_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(settings.output_path, "file-out");
        assert!(settings.commit);
        assert_eq!(settings.column_aliases.status.last().map(String::as_str), Some("Mark"));
    }

    #[test]
    fn test_missing_rows_file() {
        let cli = ImportOverrides {
            roster_file: Some("roster.json".to_string()),
            ..Default::default()
        };
        let err = ImportSettings::resolve(cli, &TomlConfig::default(), today()).unwrap_err();
        assert!(matches!(err, EtlError::MissingConfigError { ref field } if field == "import.rows_file"));
    }

    #[test]
    fn test_report_settings_take_roster_from_file() {
        let file = TomlConfig::from_toml_str("[import]\nroster_file = \"staff.csv\"\n\n[store]\npath = \"hr/records.json\"\n").unwrap();

        let settings = ReportSettings::resolve(None, None, Some("reports".to_string()), &file).unwrap();
        assert_eq!(settings.roster_file, "staff.csv");
        assert_eq!(settings.store_path, "hr/records.json");
        assert_eq!(settings.output_path, "reports");

        assert!(ReportSettings::resolve(None, None, None, &TomlConfig::default()).is_err());
    }

    #[test]
    fn test_rejects_spreadsheet_binaries_and_non_json_store() {
        let mut cli = overrides();
        cli.rows_file = Some("march.xlsx".to_string());
        assert!(ImportSettings::resolve(cli, &TomlConfig::default(), today()).is_err());

        let mut cli = overrides();
        cli.store_path = Some("records.csv".to_string());
        assert!(ImportSettings::resolve(cli, &TomlConfig::default(), today()).is_err());
    }
}
