use super::{Row, Store, grid_to_rows, header_row};
use crate::errors::StoreError;
use crate::models::{DATA_COLUMNS, DATA_TABLE};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    tables: BTreeMap<String, Vec<Vec<Value>>>,
}

/// Tables kept in a single JSON file.
///
/// Every operation reads the file and writes it back, nothing is cached between calls.
pub struct FileStore {
    path: PathBuf,
    io: Mutex<()>,
}

impl FileStore {
    /// Opens the store at `path`, creating it with an empty "Data" table if absent.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| StoreError::connection(format!("{}: {err}", parent.display())))?;
        }

        let exists = fs::try_exists(&path)
            .await
            .map_err(|err| StoreError::connection(format!("{}: {err}", path.display())))?;
        if exists {
            load(&path).await?;
        } else {
            let mut data = StoreFile::default();
            data.tables
                .insert(DATA_TABLE.to_string(), vec![header_row(&DATA_COLUMNS)]);
            persist(&path, &data).await?;
            info!("created store file at {}", path.display());
        }

        Ok(Self {
            path,
            io: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn modify<F>(&self, table: &str, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Vec<Vec<Value>>) + Send,
    {
        let _guard = self.io.lock().await;
        let mut data = load(&self.path).await?;
        let grid = data
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        apply(grid);
        persist(&self.path, &data).await
    }
}

async fn load(path: &Path) -> Result<StoreFile, StoreError> {
    let bytes = fs::read(path)
        .await
        .map_err(|err| StoreError::connection(format!("failed to read {}: {err}", path.display())))?;
    serde_json::from_slice(&bytes)
        .map_err(|err| StoreError::connection(format!("failed to parse {}: {err}", path.display())))
}

async fn persist(path: &Path, data: &StoreFile) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(data)
        .map_err(|err| StoreError::connection(err.to_string()))?;
    fs::write(path, payload)
        .await
        .map_err(|err| StoreError::connection(format!("failed to write {}: {err}", path.display())))
}

#[async_trait]
impl Store for FileStore {
    fn backend_tag(&self) -> &'static str {
        "file"
    }

    async fn get_table(&self, table: &str) -> Result<Vec<Row>, StoreError> {
        debug!(table, "reading table from {}", self.path.display());
        let _guard = self.io.lock().await;
        let data = load(&self.path).await?;
        let grid = data
            .tables
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        Ok(grid_to_rows(grid))
    }

    async fn append_row(&self, table: &str, values: Vec<Value>) -> Result<(), StoreError> {
        debug!(table, "appending row");
        self.modify(table, move |grid| grid.push(values)).await
    }

    async fn ensure_table(&self, table: &str) -> Result<(), StoreError> {
        let _guard = self.io.lock().await;
        let mut data = load(&self.path).await?;
        if data.tables.contains_key(table) {
            return Ok(());
        }
        data.tables.insert(table.to_string(), Vec::new());
        info!(table, "created table");
        persist(&self.path, &data).await
    }

    async fn clear_table(&self, table: &str) -> Result<(), StoreError> {
        self.modify(table, |grid| grid.clear()).await
    }

    async fn replace_all(&self, table: &str, rows: Vec<Vec<Value>>) -> Result<(), StoreError> {
        debug!(table, rows = rows.len(), "replacing table");
        self.modify(table, move |grid| *grid = rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn open_creates_data_table_and_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileStore::open(&path).await.unwrap();
        assert!(store.get_table("Data").await.unwrap().is_empty());
        store
            .append_row("Data", vec![json!("2025-05-01"), json!(70.0), json!(90), json!(80), json!(95)])
            .await
            .unwrap();

        let reopened = FileStore::open(&path).await.unwrap();
        let rows = reopened.get_table("Data").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Tummy"], json!(80));
    }

    #[tokio::test]
    async fn goals_table_is_created_on_demand() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("store.json")).await.unwrap();

        assert!(matches!(
            store.get_table("Goals").await,
            Err(StoreError::TableNotFound(_))
        ));

        store.ensure_table("Goals").await.unwrap();
        store
            .replace_all(
                "Goals",
                vec![
                    vec![json!("Month"), json!("Weight")],
                    vec![json!("May"), json!(60)],
                ],
            )
            .await
            .unwrap();

        let rows = store.get_table("Goals").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Month"], json!("May"));
    }

    #[tokio::test]
    async fn corrupt_file_is_a_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, b"not json").unwrap();

        assert!(matches!(
            FileStore::open(&path).await,
            Err(StoreError::Connection(_))
        ));
    }

    #[tokio::test]
    async fn unreadable_path_is_a_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"keep me").unwrap();

        assert!(matches!(
            FileStore::open(blocker.join("store.json")).await,
            Err(StoreError::Connection(_))
        ));
        assert!(matches!(
            FileStore::open(dir.path().join("x".repeat(300))).await,
            Err(StoreError::Connection(_))
        ));
        assert_eq!(std::fs::read(&blocker).unwrap(), b"keep me");
    }
}
