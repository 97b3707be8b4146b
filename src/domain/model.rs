use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write;

use crate::utils::error::{EtlError, Result};

pub const EXTRACTION_COLUMNS: [&str; 2] = ["Name", "MC_USD_Billion"];

pub const FINAL_COLUMNS: [&str; 5] = [
    "Name",
    "MC_USD_Billion",
    "MC_GBP_Billion",
    "MC_EUR_Billion",
    "MC_INR_Billion",
];

/// One row of the source table, as extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "MC_USD_Billion")]
    pub mc_usd_billion: f64,
}

/// A bank's market capitalization in USD, GBP, EUR and INR billions,
/// each rounded to 2 decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "MC_USD_Billion")]
    pub mc_usd_billion: f64,
    #[serde(rename = "MC_GBP_Billion")]
    pub mc_gbp_billion: f64,
    #[serde(rename = "MC_EUR_Billion")]
    pub mc_eur_billion: f64,
    #[serde(rename = "MC_INR_Billion")]
    pub mc_inr_billion: f64,
}

impl FinalRecord {
    pub fn amounts(&self) -> [f64; 4] {
        [
            self.mc_usd_billion,
            self.mc_gbp_billion,
            self.mc_eur_billion,
            self.mc_inr_billion,
        ]
    }
}

#[derive(Debug, Deserialize)]
struct RateRow {
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "Rate")]
    rate: f64,
}

/// Currency code to units of that currency per one USD.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            rates: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Reads a delimited file with `Currency` and `Rate` columns. Other
    /// columns are ignored.
    pub fn from_csv(data: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(data);
        let mut rates = HashMap::new();
        for row in reader.deserialize::<RateRow>() {
            let row = row?;
            rates.insert(row.currency, row.rate);
        }
        Ok(Self { rates })
    }

    pub fn rate(&self, currency: &str) -> Result<f64> {
        self.rates
            .get(currency)
            .copied()
            .ok_or_else(|| EtlError::MissingRateError {
                currency: currency.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Renders rows as an indexed text table for the log.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.len());
            }
        }
    }
    let index_width = rows.len().saturating_sub(1).to_string().len();

    let mut out = String::new();
    let _ = write!(out, "{:index_width$}", "");
    for (header, &width) in headers.iter().zip(&widths) {
        let _ = write!(out, "  {:>width$}", header);
    }
    for (index, row) in rows.iter().enumerate() {
        let _ = write!(out, "\n{:<index_width$}", index);
        for (cell, &width) in row.iter().zip(&widths) {
            let _ = write!(out, "  {:>width$}", cell);
        }
    }
    out
}

pub fn render_bank_records(records: &[BankRecord]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| vec![r.name.clone(), format!("{:.2}", r.mc_usd_billion)])
        .collect();
    render_table(&EXTRACTION_COLUMNS, &rows)
}

pub fn render_final_records(records: &[FinalRecord]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            let mut row = vec![r.name.clone()];
            row.extend(r.amounts().iter().map(|v| format!("{:.2}", v)));
            row
        })
        .collect();
    render_table(&FINAL_COLUMNS, &rows)
}
