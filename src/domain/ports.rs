use crate::domain::model::{BankRecord, FinalRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn source_url(&self) -> &str;
    fn exchange_rate_path(&self) -> &str;
    fn csv_output_path(&self) -> &str;
    fn csv_index_column(&self) -> bool;
    fn database_path(&self) -> &str;
    fn table_name(&self) -> &str;
    fn log_file(&self) -> &str;
    fn max_rows(&self) -> usize;
    fn name_link_index(&self) -> usize;
    fn request_timeout_secs(&self) -> u64;
}

/// The stages of one run. Each stage logs its own progress and failure.
#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<BankRecord>>;
    async fn transform(&self, records: Vec<BankRecord>) -> Result<Vec<FinalRecord>>;
    async fn load_csv(&self, records: &[FinalRecord]) -> Result<()>;
    async fn load_database(&self, records: &[FinalRecord]) -> Result<()>;
    async fn report(&self) -> Result<()>;
}
