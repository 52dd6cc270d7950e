use crate::core::columns::ColumnAliases;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{parse_iso_date, validate_path, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub import: ImportSection,
    pub store: StoreSection,
    pub output: OutputSection,
    /// Extra header spellings, added after the built-in ones.
    pub columns: ColumnAliases,
    pub monitoring: Option<MonitoringSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSection {
    pub rows_file: Option<String>,
    pub roster_file: Option<String>,
    /// `YYYY-MM-DD`; rows without a usable date get this one.
    pub fallback_date: Option<String>,
    pub commit: Option<bool>,
    pub allow_partial: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringSection {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().is_some_and(|m| m.enabled)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(rows) = &self.import.rows_file {
            validate_path("import.rows_file", rows)?;
        }
        if let Some(roster) = &self.import.roster_file {
            validate_path("import.roster_file", roster)?;
        }
        if let Some(date) = &self.import.fallback_date {
            parse_iso_date("import.fallback_date", date)?;
        }
        if let Some(store) = &self.store.path {
            validate_path("store.path", store)?;
        }
        if let Some(output) = &self.output.path {
            validate_path("output.path", output)?;
        }
        Ok(())
    }
}
