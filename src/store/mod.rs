//! Table-oriented access to the backing spreadsheet.
//!
//! A store holds named tables. The first row of a table is its header, and
//! [`Store::get_table`] maps every following row onto those column names.

pub mod file;
pub mod memory;
pub mod sheets;

use crate::errors::StoreError;
use async_trait::async_trait;
use serde_json::{Map, Value};

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sheets::{Credentials, SheetsStore};

/// One stored row keyed by header column name.
pub type Row = Map<String, Value>;

/// Initial grid size of a table created by [`Store::ensure_table`].
pub const NEW_TABLE_ROWS: u32 = 10;
pub const NEW_TABLE_COLS: u32 = 20;

#[async_trait]
pub trait Store: Send + Sync + 'static {
    fn backend_tag(&self) -> &'static str;

    /// Reads every row below the header, in stored order.
    async fn get_table(&self, table: &str) -> Result<Vec<Row>, StoreError>;

    async fn append_row(&self, table: &str, values: Vec<Value>) -> Result<(), StoreError>;

    /// Creates `table` empty if it does not exist yet.
    async fn ensure_table(&self, table: &str) -> Result<(), StoreError>;

    /// Removes every row, header included. The table itself stays.
    async fn clear_table(&self, table: &str) -> Result<(), StoreError>;

    /// Replaces the whole content of `table` with `rows`, header included.
    ///
    /// Not atomic on remote backends: a concurrent writer can land between the
    /// clear and the write.
    async fn replace_all(&self, table: &str, rows: Vec<Vec<Value>>) -> Result<(), StoreError>;
}

/// Maps raw grid rows (header first) onto header-keyed records.
///
/// Short rows are padded with empty text, cells beyond the header are dropped.
pub fn grid_to_rows(grid: &[Vec<Value>]) -> Vec<Row> {
    let Some((header, body)) = grid.split_first() else {
        return Vec::new();
    };
    let columns: Vec<String> = header.iter().map(cell_text).collect();

    body.iter()
        .map(|cells| {
            columns
                .iter()
                .enumerate()
                .map(|(idx, column)| {
                    let value = cells
                        .get(idx)
                        .cloned()
                        .unwrap_or_else(|| Value::String(String::new()));
                    (column.clone(), value)
                })
                .collect()
        })
        .collect()
}

pub fn header_row(columns: &[&str]) -> Vec<Value> {
    columns.iter().map(|column| Value::from(*column)).collect()
}

/// Text rendering of a cell, used for header names.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
