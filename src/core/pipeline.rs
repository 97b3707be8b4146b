use crate::adapters::csv_file::encode_csv;
use crate::adapters::sqlite::SqliteStore;
use crate::core::extract::{parse_bank_table, ExtractRules};
use crate::core::{BankRecord, ConfigProvider, FinalRecord, Pipeline, Storage};
use crate::domain::model::{render_bank_records, render_final_records, RateTable};
use crate::domain::services::convert_records;
use crate::utils::error::Result;
use reqwest::Client;
use std::time::Duration;

/// Sent with every page request; Wikimedia refuses clients without one.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Scrapes the bank ranking, converts it and writes it to CSV and SQLite.
pub struct BanksPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> BanksPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs()))
            .build()?;
        Ok(Self {
            storage,
            config,
            client,
        })
    }

    fn rules(&self) -> ExtractRules {
        ExtractRules {
            max_rows: self.config.max_rows(),
            name_link_index: self.config.name_link_index(),
        }
    }

    fn store(&self) -> SqliteStore {
        SqliteStore::new(self.config.database_path())
    }

    async fn fetch_page(&self) -> Result<String> {
        tracing::debug!("Requesting page: {}", self.config.source_url());
        let response = self
            .client
            .get(self.config.source_url())
            .send()
            .await?
            .error_for_status()?;
        tracing::debug!("Page response status: {}", response.status());
        Ok(response.text().await?)
    }

    async fn load_rates(&self) -> Result<RateTable> {
        let data = self
            .storage
            .read_file(self.config.exchange_rate_path())
            .await?;
        RateTable::from_csv(&data)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for BanksPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<BankRecord>> {
        tracing::info!("Data Extraction Started...");

        let result = match self.fetch_page().await {
            Ok(html) => parse_bank_table(&html, &self.rules()),
            Err(e) => Err(e),
        };

        match result {
            Ok(records) => {
                tracing::info!(
                    "Data Extraction Completed...\n{}\n",
                    render_bank_records(&records)
                );
                Ok(records)
            }
            Err(e) => {
                tracing::error!("Failed To Extract Data : {}", e.with_causes());
                Err(e)
            }
        }
    }

    async fn transform(&self, records: Vec<BankRecord>) -> Result<Vec<FinalRecord>> {
        tracing::info!("Data Transform Started...");

        let result = match self.load_rates().await {
            Ok(rates) => {
                tracing::debug!("Loaded {} exchange rates", rates.len());
                convert_records(&records, &rates)
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(final_records) => {
                tracing::info!(
                    "Data Transform Completed...\n{}\n",
                    render_final_records(&final_records)
                );
                Ok(final_records)
            }
            Err(e) => {
                tracing::error!("Failed To Transform Data : {}", e.with_causes());
                Err(e)
            }
        }
    }

    async fn load_csv(&self, records: &[FinalRecord]) -> Result<()> {
        tracing::info!("Loading Data Into Csv File...");

        let result = match encode_csv(records, self.config.csv_index_column()) {
            Ok(data) => {
                self.storage
                    .write_file(self.config.csv_output_path(), &data)
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                tracing::info!("Data Loaded Successfully In Csv");
                Ok(())
            }
            Err(e) => {
                tracing::error!("Data Loading Into Csv Failed : {}", e.with_causes());
                Err(e)
            }
        }
    }

    async fn load_database(&self, records: &[FinalRecord]) -> Result<()> {
        tracing::info!("Loading Data Into DataBase...");

        match self.store().write_table(self.config.table_name(), records) {
            Ok(count) => {
                tracing::info!("Data Loaded Successfully Into Database ({} rows)", count);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Data Loading Into Database Failed : {}", e.with_causes());
                Err(e)
            }
        }
    }

    async fn report(&self) -> Result<()> {
        let store = self.store();
        let mut stdout = std::io::stdout().lock();

        match store.run_reports(self.config.table_name(), &mut stdout) {
            Ok(()) => {
                tracing::info!("Queries Executed Successfully");
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    "Queries Failed on Database {} : {}",
                    store.path().display(),
                    e.with_causes()
                );
                Err(e)
            }
        }
    }
}
