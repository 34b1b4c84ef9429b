use super::{NEW_TABLE_COLS, NEW_TABLE_ROWS, Row, Store, grid_to_rows};
use crate::errors::StoreError;
use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_SHEETS_API: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_DRIVE_API: &str = "https://www.googleapis.com/drive/v3";

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// OAuth scopes requested for service-account tokens.
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

/// Secret used to authorize every API call.
///
/// A service-account key is handed to `gcp_auth` untouched, which mints the
/// access tokens and refreshes them before they expire.
#[derive(Clone)]
pub enum Credentials {
    /// Access token minted elsewhere, sent as is.
    Token(String),
    ServiceAccount(Arc<CustomServiceAccount>),
}

impl Credentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::Token(access_token.into())
    }

    /// Builds credentials from a service-account key document.
    pub fn service_account(key_json: &str) -> Result<Self, gcp_auth::Error> {
        Ok(Self::ServiceAccount(Arc::new(CustomServiceAccount::from_json(key_json)?)))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, String> {
        let key_json = std::fs::read_to_string(path).map_err(|err| err.to_string())?;
        Self::service_account(&key_json).map_err(|err| err.to_string())
    }

    /// Current bearer token, fetched or refreshed when needed.
    pub async fn bearer(&self) -> Result<String, StoreError> {
        match self {
            Self::Token(token) => Ok(token.clone()),
            Self::ServiceAccount(account) => {
                let token = account
                    .token(&SCOPES)
                    .await
                    .map_err(|err| StoreError::connection(format!("token request failed: {err}")))?;
                Ok(token.as_str().to_string())
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Credentials::Token(***)"),
            Self::ServiceAccount(_) => f.write_str("Credentials::ServiceAccount(***)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SheetsEndpoints {
    pub sheets_api: String,
    pub drive_api: String,
}

impl Default for SheetsEndpoints {
    fn default() -> Self {
        Self {
            sheets_api: DEFAULT_SHEETS_API.to_string(),
            drive_api: DEFAULT_DRIVE_API.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// Google Sheets backed store. Each worksheet of the spreadsheet is one table.
pub struct SheetsStore {
    client: Client,
    credentials: Credentials,
    sheets_api: Url,
    spreadsheet_id: String,
}

impl SheetsStore {
    /// Authenticates and opens the spreadsheet called `name`.
    pub async fn open(
        name: &str,
        credentials: &Credentials,
        endpoints: &SheetsEndpoints,
    ) -> Result<Self, StoreError> {
        let client = Client::builder().build()?;
        let sheets_api = parse_base(&endpoints.sheets_api)?;
        let drive_api = parse_base(&endpoints.drive_api)?;

        let mut url = join(&drive_api, &["files"])?;
        let query = format!(
            "name = '{}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false",
            escape_query(name)
        );
        url.query_pairs_mut()
            .append_pair("q", &query)
            .append_pair("fields", "files(id,name)");

        debug!(name, "looking up spreadsheet");
        let response = send(credentials, client.get(url), None).await?;
        let list: FileList = response.json().await?;
        let file = list.files.into_iter().next().ok_or_else(|| {
            StoreError::connection(format!("spreadsheet '{name}' not found or not shared"))
        })?;

        info!(name, id = %file.id, "opened spreadsheet");
        Ok(Self {
            client,
            credentials: credentials.clone(),
            sheets_api,
            spreadsheet_id: file.id,
        })
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    fn values_url(&self, table: &str, action: Option<&str>) -> Result<Url, StoreError> {
        let mut range = quote_sheet(table);
        if let Some(action) = action {
            range.push(':');
            range.push_str(action);
        }
        join(
            &self.sheets_api,
            &["spreadsheets", self.spreadsheet_id.as_str(), "values", range.as_str()],
        )
    }

    async fn send(&self, request: RequestBuilder, table: Option<&str>) -> Result<Response, StoreError> {
        send(&self.credentials, request, table).await
    }

    async fn sheet_titles(&self) -> Result<Vec<String>, StoreError> {
        let mut url = join(&self.sheets_api, &["spreadsheets", self.spreadsheet_id.as_str()])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");
        let response = self.send(self.client.get(url), None).await?;
        let meta: SpreadsheetMeta = response.json().await?;
        Ok(meta
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.title)
            .collect())
    }
}

#[async_trait]
impl Store for SheetsStore {
    fn backend_tag(&self) -> &'static str {
        "sheets"
    }

    async fn get_table(&self, table: &str) -> Result<Vec<Row>, StoreError> {
        let mut url = self.values_url(table, None)?;
        url.query_pairs_mut()
            .append_pair("valueRenderOption", "UNFORMATTED_VALUE");
        debug!(table, "reading sheet");
        let response = self.send(self.client.get(url), Some(table)).await?;
        let range: ValueRange = response.json().await?;
        Ok(grid_to_rows(&range.values))
    }

    async fn append_row(&self, table: &str, values: Vec<Value>) -> Result<(), StoreError> {
        let mut url = self.values_url(table, Some("append"))?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        debug!(table, "appending row");
        let body = json!({ "values": [values] });
        self.send(self.client.post(url).json(&body), Some(table)).await?;
        Ok(())
    }

    async fn ensure_table(&self, table: &str) -> Result<(), StoreError> {
        if self.sheet_titles().await?.iter().any(|title| title == table) {
            return Ok(());
        }

        let url = join(
            &self.sheets_api,
            &["spreadsheets", format!("{}:batchUpdate", self.spreadsheet_id).as_str()],
        )?;
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": table,
                        "gridProperties": {
                            "rowCount": NEW_TABLE_ROWS,
                            "columnCount": NEW_TABLE_COLS,
                        }
                    }
                }
            }]
        });
        self.send(self.client.post(url).json(&body), None).await?;
        info!(table, "created sheet");
        Ok(())
    }

    async fn clear_table(&self, table: &str) -> Result<(), StoreError> {
        let url = self.values_url(table, Some("clear"))?;
        debug!(table, "clearing sheet");
        self.send(self.client.post(url).json(&json!({})), Some(table))
            .await?;
        Ok(())
    }

    async fn replace_all(&self, table: &str, rows: Vec<Vec<Value>>) -> Result<(), StoreError> {
        self.clear_table(table).await?;
        if rows.is_empty() {
            return Ok(());
        }

        let mut url = self.values_url(table, None)?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        debug!(table, rows = rows.len(), "writing sheet");
        let body = json!({ "majorDimension": "ROWS", "values": rows });
        self.send(self.client.put(url).json(&body), Some(table)).await?;
        Ok(())
    }
}

/// Sends `request` with a fresh bearer token and checks the response status.
async fn send(
    credentials: &Credentials,
    request: RequestBuilder,
    table: Option<&str>,
) -> Result<Response, StoreError> {
    let token = credentials.bearer().await?;
    check(request.bearer_auth(token).send().await?, table).await
}

fn parse_base(raw: &str) -> Result<Url, StoreError> {
    Url::parse(raw.trim_end_matches('/'))
        .map_err(|err| StoreError::connection(format!("invalid API url {raw}: {err}")))
}

fn join(base: &Url, segments: &[&str]) -> Result<Url, StoreError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| StoreError::connection(format!("API url {base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// A1-notation sheet reference, quoted so any title is taken literally.
fn quote_sheet(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Converts a non-success response into the matching [`StoreError`].
async fn check(response: Response, table: Option<&str>) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .map(|body| body.error.message)
        .unwrap_or(text);

    if let Some(table) = table {
        if status == StatusCode::BAD_REQUEST && message.contains("Unable to parse range") {
            return Err(StoreError::TableNotFound(table.to_string()));
        }
    }

    warn!(%status, "sheets API call failed: {message}");
    Err(StoreError::connection(format!("{status}: {message}")))
}
