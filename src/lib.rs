pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{sqlite::SqliteStore, storage::LocalStorage};
pub use config::toml_config::TomlConfig;
pub use crate::core::{
    etl::{EtlEngine, RunSummary, Stage, StageStatus},
    pipeline::BanksPipeline,
};
pub use domain::model::{BankRecord, FinalRecord, RateTable};
pub use utils::error::{EtlError, Result};
