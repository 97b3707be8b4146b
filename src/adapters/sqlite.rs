use crate::domain::model::FinalRecord;
use crate::utils::error::Result;
use rusqlite::types::Value;
use rusqlite::{params, Connection};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A file-backed SQLite store. Each call opens its own connection and closes
/// it before returning.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

/// Rows returned by one query, column values in select order.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub sql: String,
    pub rows: Vec<Vec<Value>>,
}

/// Double-quoted SQL identifier, so names like `order` are not read as keywords.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn report_queries(table_name: &str) -> [String; 3] {
    let table = quote_identifier(table_name);
    [
        format!("SELECT * FROM {};", table),
        format!("SELECT AVG(MC_GBP_Billion) FROM {};", table),
        format!("SELECT Name FROM {} LIMIT 5;", table),
    ]
}

fn close(conn: Connection) -> Result<()> {
    conn.close().map_err(|(_, e)| e)?;
    Ok(())
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    /// Replaces `table_name` with `records`. The drop, create and inserts run
    /// in one transaction, so a failed write leaves the previous table intact.
    pub fn write_table(&self, table_name: &str, records: &[FinalRecord]) -> Result<usize> {
        let table = quote_identifier(table_name);
        let mut conn = self.open()?;

        let tx = conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table};
             CREATE TABLE {table} (
                Name TEXT,
                MC_USD_Billion REAL,
                MC_GBP_Billion REAL,
                MC_EUR_Billion REAL,
                MC_INR_Billion REAL
             );",
            table = table
        ))?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (Name, MC_USD_Billion, MC_GBP_Billion, MC_EUR_Billion, MC_INR_Billion)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                table
            ))?;
            for record in records {
                stmt.execute(params![
                    record.name,
                    record.mc_usd_billion,
                    record.mc_gbp_billion,
                    record.mc_eur_billion,
                    record.mc_inr_billion,
                ])?;
            }
        }
        tx.commit()?;

        close(conn)?;
        Ok(records.len())
    }

    /// Reads the table back in insertion order.
    pub fn read_table(&self, table_name: &str) -> Result<Vec<FinalRecord>> {
        let conn = self.open()?;
        let records = {
            let mut stmt = conn.prepare(&format!(
                "SELECT Name, MC_USD_Billion, MC_GBP_Billion, MC_EUR_Billion, MC_INR_Billion
                 FROM {} ORDER BY rowid",
                quote_identifier(table_name)
            ))?;
            let rows = stmt.query_map([], |row| {
                Ok(FinalRecord {
                    name: row.get(0)?,
                    mc_usd_billion: row.get(1)?,
                    mc_gbp_billion: row.get(2)?,
                    mc_eur_billion: row.get(3)?,
                    mc_inr_billion: row.get(4)?,
                })
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        close(conn)?;
        Ok(records)
    }

    /// Runs the three report queries, printing each result set to `out` and
    /// logging it.
    pub fn run_reports(&self, table_name: &str, out: &mut dyn Write) -> Result<()> {
        tracing::info!("Initiating connection with db-{}...", self.path.display());
        let conn = self.open()?;
        tracing::info!("Connection Successful with db-{}", self.path.display());

        for sql in report_queries(table_name) {
            let result = execute_query(&conn, &sql)?;
            print_result(&result, out)?;
        }

        close(conn)?;
        tracing::info!("Connection Closed");
        Ok(())
    }
}

pub fn execute_query(conn: &Connection, sql: &str) -> Result<QueryResult> {
    let mut stmt = conn.prepare(sql)?;
    let column_count = stmt.column_count();
    let rows = stmt
        .query_map([], |row| {
            (0..column_count)
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let result = QueryResult {
        sql: sql.to_string(),
        rows,
    };
    tracing::info!(
        "query {} successfully executed : [{}]",
        result.sql,
        result
            .rows
            .iter()
            .map(|row| format_row(row))
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(result)
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => format!("{:?}", f),
        Value::Text(s) => format!("'{}'", s),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

/// Formats a row as a tuple, e.g. `('Bank A', 100.0)` or `(80.0,)`.
pub fn format_row(row: &[Value]) -> String {
    let cells: Vec<String> = row.iter().map(format_value).collect();
    if cells.len() == 1 {
        format!("({},)", cells[0])
    } else {
        format!("({})", cells.join(", "))
    }
}

fn print_result(result: &QueryResult, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "query {}", result.sql)?;
    writeln!(out, "results : ")?;
    for row in &result.rows {
        writeln!(out, "{}", format_row(row))?;
    }
    writeln!(out)?;
    Ok(())
}
