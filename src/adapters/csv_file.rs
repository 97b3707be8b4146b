use crate::domain::model::{FinalRecord, FINAL_COLUMNS};
use crate::utils::error::Result;

fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}

/// Serializes records with a header row. With `index_column` a leading
/// unnamed column carries the zero-based row index.
pub fn encode_csv(records: &[FinalRecord], index_column: bool) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = Vec::with_capacity(FINAL_COLUMNS.len() + 1);
    if index_column {
        header.push("");
    }
    header.extend(FINAL_COLUMNS);
    writer.write_record(&header)?;

    for (index, record) in records.iter().enumerate() {
        let mut row: Vec<String> = Vec::with_capacity(header.len());
        if index_column {
            row.push(index.to_string());
        }
        row.push(record.name.clone());
        row.extend(record.amounts().into_iter().map(format_amount));
        writer.write_record(&row)?;
    }

    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

/// Reads records back by column name; an index column, if present, is ignored.
pub fn decode_csv(data: &[u8]) -> Result<Vec<FinalRecord>> {
    let mut reader = csv::Reader::from_reader(data);
    let mut records = Vec::new();
    for row in reader.deserialize::<FinalRecord>() {
        records.push(row?);
    }
    Ok(records)
}
