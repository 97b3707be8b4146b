// Adapters layer: concrete implementations for files, CSV and the SQLite store.

pub mod csv_file;
pub mod sqlite;
pub mod storage;
