use crate::domain::model::BankRecord;
use crate::utils::error::{EtlError, Result};
use scraper::{ElementRef, Html, Selector};

pub const DEFAULT_MAX_ROWS: usize = 10;
/// The name cell links a flag icon first and the bank article second.
pub const DEFAULT_NAME_LINK_INDEX: usize = 1;

const NAME_CELL: usize = 1;
const MARKET_CAP_CELL: usize = 2;

/// How rows of the ranking table are read. Both values describe the current
/// layout of the source page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractRules {
    pub max_rows: usize,
    pub name_link_index: usize,
}

impl Default for ExtractRules {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            name_link_index: DEFAULT_NAME_LINK_INDEX,
        }
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| EtlError::parse(format!("invalid selector '{}': {}", css, e)))
}

fn cell_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Bank name: text of the `link_index`-th hyperlink in the name cell.
pub fn bank_name_from_cell(cell: ElementRef<'_>, link_index: usize) -> Result<String> {
    let links = selector("a")?;
    let link = cell.select(&links).nth(link_index).ok_or_else(|| {
        EtlError::parse(format!(
            "name cell has no hyperlink at position {} (found {})",
            link_index,
            cell.select(&links).count()
        ))
    })?;
    Ok(cell_text(link))
}

/// Market cap in USD billions, with thousands separators removed.
pub fn market_cap_from_cell(cell: ElementRef<'_>) -> Result<f64> {
    let raw = cell_text(cell);
    let cleaned = raw.replace(',', "");
    cleaned
        .trim()
        .parse::<f64>()
        .map_err(|e| EtlError::parse(format!("market cap '{}' is not a number: {}", raw, e)))
}

/// Parses the first table of `html`. The first body row is the header and is
/// skipped; at most `rules.max_rows` data rows are read. Any malformed row
/// fails the whole extraction.
pub fn parse_bank_table(html: &str, rules: &ExtractRules) -> Result<Vec<BankRecord>> {
    let document = Html::parse_document(html);
    let table_selector = selector("table")?;
    let body_selector = selector("tbody")?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("td")?;

    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| EtlError::parse("no <table> element found"))?;
    let body = table
        .select(&body_selector)
        .next()
        .ok_or_else(|| EtlError::parse("table has no <tbody>"))?;

    let mut rows = body.select(&row_selector);
    rows.next()
        .ok_or_else(|| EtlError::parse("table has no header row"))?;

    let mut records = Vec::new();
    for (position, row) in rows.take(rules.max_rows).enumerate() {
        let cells: Vec<ElementRef<'_>> = row.select(&cell_selector).collect();
        let name_cell = cells.get(NAME_CELL).ok_or_else(|| {
            EtlError::parse(format!("row {} has no name cell", position + 1))
        })?;
        let cap_cell = cells.get(MARKET_CAP_CELL).ok_or_else(|| {
            EtlError::parse(format!("row {} has no market cap cell", position + 1))
        })?;

        records.push(BankRecord {
            name: bank_name_from_cell(*name_cell, rules.name_link_index)?,
            mc_usd_billion: market_cap_from_cell(*cap_cell)?,
        });
    }

    Ok(records)
}
