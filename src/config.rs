use crate::errors::{ConfigError, StoreError};
use crate::store::sheets::{DEFAULT_DRIVE_API, DEFAULT_SHEETS_API, SheetsEndpoints};
use crate::store::{Credentials, FileStore, MemoryStore, SheetsStore, Store};
use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::info;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SHEET_NAME: &str = "MyFitnessProgress";
pub const DEFAULT_DATA_PATH: &str = "data/store.json";
pub const DEFAULT_GOAL_MONTHS: [&str; 3] = ["May", "June", "July"];

#[derive(Debug, Clone)]
pub enum StoreBackend {
    Sheets {
        sheet_name: String,
        credentials: Credentials,
        endpoints: SheetsEndpoints,
    },
    File {
        path: PathBuf,
    },
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend: StoreBackend,
    /// Month labels offered for goals, in display order.
    pub goal_months: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, which maps variable names to values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match var("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue { key: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let backend = match var("FITNESS_STORE").as_deref().map(str::trim) {
            None | Some("file") => StoreBackend::File {
                path: PathBuf::from(
                    var("FITNESS_DATA_PATH").unwrap_or_else(|| DEFAULT_DATA_PATH.to_string()),
                ),
            },
            Some("memory") => StoreBackend::Memory,
            Some("sheets") => StoreBackend::Sheets {
                sheet_name: var("FITNESS_SHEET_NAME")
                    .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
                credentials: load_credentials(&var)?,
                endpoints: SheetsEndpoints {
                    sheets_api: var("FITNESS_SHEETS_API_URL")
                        .unwrap_or_else(|| DEFAULT_SHEETS_API.to_string()),
                    drive_api: var("FITNESS_DRIVE_API_URL")
                        .unwrap_or_else(|| DEFAULT_DRIVE_API.to_string()),
                },
            },
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        let goal_months = match var("FITNESS_GOAL_MONTHS") {
            Some(value) => {
                let months: Vec<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|month| !month.is_empty())
                    .map(ToOwned::to_owned)
                    .collect();
                if months.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        key: "FITNESS_GOAL_MONTHS",
                        value,
                    });
                }
                months
            }
            None => DEFAULT_GOAL_MONTHS.iter().map(|m| m.to_string()).collect(),
        };

        Ok(Self {
            port,
            backend,
            goal_months,
        })
    }

    /// Opens the configured store.
    pub async fn open_store(&self) -> Result<Arc<dyn Store>, StoreError> {
        let store: Arc<dyn Store> = match &self.backend {
            StoreBackend::Sheets {
                sheet_name,
                credentials,
                endpoints,
            } => Arc::new(SheetsStore::open(sheet_name, credentials, endpoints).await?),
            StoreBackend::File { path } => Arc::new(FileStore::open(path.clone()).await?),
            StoreBackend::Memory => Arc::new(MemoryStore::with_data_table()),
        };
        info!(backend = store.backend_tag(), "store ready");
        Ok(store)
    }
}

fn load_credentials<F>(var: &F) -> Result<Credentials, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = var("GOOGLE_ACCESS_TOKEN") {
        return Ok(Credentials::new(token.trim()));
    }
    if let Some(key_json) = var("GOOGLE_SERVICE_ACCOUNT_JSON") {
        return Credentials::service_account(&key_json)
            .map_err(|err| ConfigError::Credentials(format!("GOOGLE_SERVICE_ACCOUNT_JSON: {err}")));
    }
    let path = var("GOOGLE_CREDENTIALS_PATH").ok_or(ConfigError::MissingCredentials)?;
    Credentials::from_json_file(Path::new(&path))
        .map_err(|err| ConfigError::Credentials(format!("{path}: {err}")))
}
