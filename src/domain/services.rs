use crate::domain::model::{BankRecord, FinalRecord, RateTable};
use crate::utils::error::Result;

pub const TARGET_CURRENCIES: [&str; 3] = ["GBP", "EUR", "INR"];

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Converts every record into GBP, EUR and INR. All rates are looked up
/// before any row is touched, so a missing currency yields no output at all.
pub fn convert_records(records: &[BankRecord], rates: &RateTable) -> Result<Vec<FinalRecord>> {
    let gbp = rates.rate("GBP")?;
    let eur = rates.rate("EUR")?;
    let inr = rates.rate("INR")?;

    Ok(records
        .iter()
        .map(|record| {
            let usd = record.mc_usd_billion;
            FinalRecord {
                name: record.name.clone(),
                mc_usd_billion: round2(usd),
                mc_gbp_billion: round2(usd * gbp),
                mc_eur_billion: round2(usd * eur),
                mc_inr_billion: round2(usd * inr),
            }
        })
        .collect())
}
