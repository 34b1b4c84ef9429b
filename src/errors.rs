use axum::http::StatusCode;
use thiserror::Error;

/// Failures surfaced by a [`crate::store::Store`] and the repositories built on it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached, authenticated against, or opened.
    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("table not found: {0}")]
    TableNotFound(String),

    /// A stored row could not be coerced to its semantic type.
    #[error("bad data in table {table}, row {row}: {message}")]
    DataFormat {
        table: String,
        row: usize,
        message: String,
    },
}

impl StoreError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    pub fn data_format(table: &str, row: usize, message: impl Into<String>) -> Self {
        Self::DataFormat {
            table: table.to_string(),
            row,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Connection(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("unknown store backend '{0}', expected sheets, file or memory")]
    UnknownBackend(String),

    #[error("missing credentials: set GOOGLE_CREDENTIALS_PATH, GOOGLE_SERVICE_ACCOUNT_JSON or GOOGLE_ACCESS_TOKEN")]
    MissingCredentials,

    #[error("invalid credentials: {0}")]
    Credentials(String),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let status = match &err {
            StoreError::Connection(_) => StatusCode::BAD_GATEWAY,
            StoreError::TableNotFound(_) => StatusCode::NOT_FOUND,
            StoreError::DataFormat { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!("store operation failed: {err}");
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
