#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_table_name, validate_url,
};

pub const DEFAULT_SOURCE_URL: &str = "https://en.wikipedia.org/wiki/List_of_largest_banks";
pub const DEFAULT_EXCHANGE_RATE_PATH: &str = "./exchange_rate.csv";
pub const DEFAULT_CSV_OUTPUT_PATH: &str = "./Largest_banks_data.csv";
pub const DEFAULT_DATABASE_PATH: &str = "Banks.db";
pub const DEFAULT_TABLE_NAME: &str = "Largest_banks";
pub const DEFAULT_LOG_FILE: &str = "./code_log.txt";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Checks the values every configuration source must satisfy.
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_url("source_url", config.source_url())?;
    validate_path("exchange_rate_path", config.exchange_rate_path())?;
    validate_path("csv_output_path", config.csv_output_path())?;
    validate_path("database_path", config.database_path())?;
    validate_path("log_file", config.log_file())?;
    validate_table_name("table_name", config.table_name())?;
    validate_positive_number("max_rows", config.max_rows(), 1)?;
    validate_positive_number(
        "request_timeout_secs",
        config.request_timeout_secs() as usize,
        1,
    )?;
    Ok(())
}
