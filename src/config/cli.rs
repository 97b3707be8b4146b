use super::{
    validate_provider, DEFAULT_CSV_OUTPUT_PATH, DEFAULT_DATABASE_PATH, DEFAULT_EXCHANGE_RATE_PATH,
    DEFAULT_LOG_FILE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SOURCE_URL, DEFAULT_TABLE_NAME,
};
use crate::core::extract::{DEFAULT_MAX_ROWS, DEFAULT_NAME_LINK_INDEX};
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "banks-etl")]
#[command(about = "Extract the largest banks ranking, convert market caps and load them into CSV and SQLite")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,

    #[arg(long, default_value = DEFAULT_EXCHANGE_RATE_PATH)]
    pub exchange_rate_path: String,

    #[arg(long, default_value = DEFAULT_CSV_OUTPUT_PATH)]
    pub csv_output_path: String,

    /// Omit the leading row-index column from the CSV file
    #[arg(long)]
    pub no_csv_index: bool,

    #[arg(long, default_value = DEFAULT_DATABASE_PATH)]
    pub database_path: String,

    #[arg(long, default_value = DEFAULT_TABLE_NAME)]
    pub table_name: String,

    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: String,

    /// Number of ranking rows read after the header
    #[arg(long, default_value_t = DEFAULT_MAX_ROWS)]
    pub max_rows: usize,

    /// Zero-based position of the bank-name link inside the name cell
    #[arg(long, default_value_t = DEFAULT_NAME_LINK_INDEX)]
    pub name_link_index: usize,

    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Load settings from a TOML file instead of these flags
    #[arg(long)]
    pub config: Option<String>,

    /// Exit with a nonzero status when any stage fails
    #[arg(long)]
    pub strict: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn source_url(&self) -> &str {
        &self.source_url
    }

    fn exchange_rate_path(&self) -> &str {
        &self.exchange_rate_path
    }

    fn csv_output_path(&self) -> &str {
        &self.csv_output_path
    }

    fn csv_index_column(&self) -> bool {
        !self.no_csv_index
    }

    fn database_path(&self) -> &str {
        &self.database_path
    }

    fn table_name(&self) -> &str {
        &self.table_name
    }

    fn log_file(&self) -> &str {
        &self.log_file
    }

    fn max_rows(&self) -> usize {
        self.max_rows
    }

    fn name_link_index(&self) -> usize {
        self.name_link_index
    }

    fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
