pub mod etl;
pub mod extract;
pub mod pipeline;

pub use crate::domain::model::{BankRecord, FinalRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
