use super::{
    validate_provider, DEFAULT_CSV_OUTPUT_PATH, DEFAULT_DATABASE_PATH, DEFAULT_EXCHANGE_RATE_PATH,
    DEFAULT_LOG_FILE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SOURCE_URL, DEFAULT_TABLE_NAME,
};
use crate::core::extract::{DEFAULT_MAX_ROWS, DEFAULT_NAME_LINK_INDEX};
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub extract: ExtractConfig,
    pub transform: TransformConfig,
    pub load: LoadConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub max_rows: usize,
    pub name_link_index: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            name_link_index: DEFAULT_NAME_LINK_INDEX,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub exchange_rate_path: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            exchange_rate_path: DEFAULT_EXCHANGE_RATE_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub csv_path: String,
    pub csv_index_column: bool,
    pub database_path: String,
    pub table_name: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            csv_path: DEFAULT_CSV_OUTPUT_PATH.to_string(),
            csv_index_column: true,
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for TomlConfig {
    fn source_url(&self) -> &str {
        &self.source.url
    }

    fn exchange_rate_path(&self) -> &str {
        &self.transform.exchange_rate_path
    }

    fn csv_output_path(&self) -> &str {
        &self.load.csv_path
    }

    fn csv_index_column(&self) -> bool {
        self.load.csv_index_column
    }

    fn database_path(&self) -> &str {
        &self.load.database_path
    }

    fn table_name(&self) -> &str {
        &self.load.table_name
    }

    fn log_file(&self) -> &str {
        &self.logging.log_file
    }

    fn max_rows(&self) -> usize {
        self.extract.max_rows
    }

    fn name_link_index(&self) -> usize {
        self.extract.name_link_index
    }

    fn request_timeout_secs(&self) -> u64 {
        self.source.timeout_seconds
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
