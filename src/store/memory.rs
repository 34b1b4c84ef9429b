use super::{Row, Store, grid_to_rows, header_row};
use crate::errors::StoreError;
use crate::models::{DATA_COLUMNS, DATA_TABLE};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// In-process store. Tables live only as long as the value.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Vec<Value>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding an empty "Data" table with its header row.
    pub fn with_data_table() -> Self {
        Self::new().with_table(DATA_TABLE, vec![header_row(&DATA_COLUMNS)])
    }

    pub fn with_table(mut self, table: &str, grid: Vec<Vec<Value>>) -> Self {
        self.tables.get_mut().insert(table.to_string(), grid);
        self
    }

    /// Raw grid of `table`, header included.
    pub async fn grid(&self, table: &str) -> Option<Vec<Vec<Value>>> {
        self.tables.lock().await.get(table).cloned()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn get_table(&self, table: &str) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables.lock().await;
        let grid = tables
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        Ok(grid_to_rows(grid))
    }

    async fn append_row(&self, table: &str, values: Vec<Value>) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?
            .push(values);
        Ok(())
    }

    async fn ensure_table(&self, table: &str) -> Result<(), StoreError> {
        self.tables
            .lock()
            .await
            .entry(table.to_string())
            .or_default();
        Ok(())
    }

    async fn clear_table(&self, table: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?
            .clear();
        Ok(())
    }

    async fn replace_all(&self, table: &str, rows: Vec<Vec<Value>>) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        let grid = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        *grid = rows;
        Ok(())
    }
}
