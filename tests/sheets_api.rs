use axum::{
    extract::{Form, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use fitness_dashboard::models::{GoalSet, GoalTargets, Measurement};
use fitness_dashboard::store::sheets::SheetsEndpoints;
use fitness_dashboard::store::{Credentials, SheetsStore, Store};
use fitness_dashboard::{GoalRepository, MeasurementRepository, StoreError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const SPREADSHEET_ID: &str = "sheet-123";
const TOKEN: &str = "test-token";

#[derive(Clone, Default)]
struct MockSheets {
    sheets: Arc<Mutex<Vec<(String, Vec<Vec<Value>>)>>>,
    added: Arc<Mutex<Vec<Value>>>,
    token_requests: Arc<Mutex<usize>>,
}

impl MockSheets {
    fn with_sheet(self, title: &str, grid: Vec<Vec<Value>>) -> Self {
        self.sheets.lock().unwrap().push((title.to_string(), grid));
        self
    }

    fn grid(&self, title: &str) -> Option<Vec<Vec<Value>>> {
        self.sheets
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| name == title)
            .map(|(_, grid)| grid.clone())
    }
}

fn api_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "code": status.as_u16(), "message": message } })),
    )
        .into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {TOKEN}").as_str())
}

/// Splits `'Title':action` into the unquoted title and the optional action.
fn parse_range(raw: &str) -> (String, Option<String>) {
    let (quoted, action) = match raw.rsplit_once("':") {
        Some((quoted, action)) => (format!("{quoted}'"), Some(action.to_string())),
        None => (raw.to_string(), None),
    };
    let title = quoted
        .trim_start_matches('\'')
        .trim_end_matches('\'')
        .replace("''", "'");
    (title, action)
}

async fn issue_token(
    State(mock): State<MockSheets>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let grant = form.get("grant_type").map(String::as_str);
    let signed = form
        .get("assertion")
        .is_some_and(|assertion| assertion.split('.').count() == 3);
    if grant != Some("urn:ietf:params:oauth:grant-type:jwt-bearer") || !signed {
        return api_error(StatusCode::BAD_REQUEST, "invalid_grant");
    }
    *mock.token_requests.lock().unwrap() += 1;
    Json(json!({ "access_token": TOKEN, "token_type": "Bearer", "expires_in": 3600 }))
        .into_response()
}

async fn drive_files(
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return api_error(StatusCode::UNAUTHORIZED, "Invalid Credentials");
    }
    let q = query.get("q").cloned().unwrap_or_default();
    if q.contains("name = 'MyFitnessProgress'") {
        Json(json!({ "files": [{ "id": SPREADSHEET_ID, "name": "MyFitnessProgress" }] }))
            .into_response()
    } else {
        Json(json!({ "files": [] })).into_response()
    }
}

async fn spreadsheet_meta(State(mock): State<MockSheets>, Path(id): Path<String>) -> Response {
    if id != SPREADSHEET_ID {
        return api_error(StatusCode::NOT_FOUND, "Requested entity was not found.");
    }
    let sheets: Vec<Value> = mock
        .sheets
        .lock()
        .unwrap()
        .iter()
        .map(|(title, _)| json!({ "properties": { "title": title } }))
        .collect();
    Json(json!({ "sheets": sheets })).into_response()
}

async fn batch_update(
    State(mock): State<MockSheets>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if id != format!("{SPREADSHEET_ID}:batchUpdate") {
        return api_error(StatusCode::NOT_FOUND, "Requested entity was not found.");
    }
    let properties = &body["requests"][0]["addSheet"]["properties"];
    let title = properties["title"].as_str().unwrap_or_default().to_string();
    mock.added.lock().unwrap().push(properties.clone());
    mock.sheets.lock().unwrap().push((title, Vec::new()));
    Json(json!({ "replies": [{}] })).into_response()
}

async fn get_values(
    State(mock): State<MockSheets>,
    Path((_, range)): Path<(String, String)>,
) -> Response {
    let (title, _) = parse_range(&range);
    match mock.grid(&title) {
        Some(grid) if grid.is_empty() => Json(json!({ "range": range })).into_response(),
        Some(grid) => Json(json!({ "range": range, "values": grid })).into_response(),
        None => api_error(
            StatusCode::BAD_REQUEST,
            &format!("Unable to parse range: {range}"),
        ),
    }
}

async fn put_values(
    State(mock): State<MockSheets>,
    Path((_, range)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let (title, _) = parse_range(&range);
    let rows: Vec<Vec<Value>> = serde_json::from_value(body["values"].clone()).unwrap_or_default();
    let mut sheets = mock.sheets.lock().unwrap();
    match sheets.iter_mut().find(|(name, _)| *name == title) {
        Some((_, grid)) => {
            *grid = rows;
            Json(json!({ "updatedRange": range })).into_response()
        }
        None => api_error(
            StatusCode::BAD_REQUEST,
            &format!("Unable to parse range: {range}"),
        ),
    }
}

async fn post_values(
    State(mock): State<MockSheets>,
    Path((_, range)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let (title, action) = parse_range(&range);
    let mut sheets = mock.sheets.lock().unwrap();
    let Some((_, grid)) = sheets.iter_mut().find(|(name, _)| *name == title) else {
        return api_error(
            StatusCode::BAD_REQUEST,
            &format!("Unable to parse range: {range}"),
        );
    };
    match action.as_deref() {
        Some("append") => {
            let rows: Vec<Vec<Value>> =
                serde_json::from_value(body["values"].clone()).unwrap_or_default();
            grid.extend(rows);
        }
        Some("clear") => grid.clear(),
        _ => return api_error(StatusCode::BAD_REQUEST, "unsupported action"),
    }
    Json(json!({})).into_response()
}

async fn start_mock(mock: MockSheets) -> SheetsEndpoints {
    let app = Router::new()
        .route("/token", post(issue_token))
        .route("/drive/v3/files", get(drive_files))
        .route(
            "/v4/spreadsheets/:id",
            get(spreadsheet_meta).post(batch_update),
        )
        .route(
            "/v4/spreadsheets/:id/values/:range",
            get(get_values).put(put_values).post(post_values),
        )
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    SheetsEndpoints {
        sheets_api: format!("http://{addr}/v4"),
        drive_api: format!("http://{addr}/drive/v3"),
    }
}

fn service_account(endpoints: &SheetsEndpoints) -> Credentials {
    let key = json!({
        "type": "service_account",
        "project_id": "fitness",
        "private_key_id": "key-1",
        "private_key": include_str!("fixtures/service_account_key.pem"),
        "client_email": "dashboard@fitness.iam.gserviceaccount.com",
        "client_id": "1",
        "token_uri": endpoints.sheets_api.replace("/v4", "/token"),
    });
    Credentials::service_account(&key.to_string()).unwrap()
}

fn data_header() -> Vec<Value> {
    vec![json!("Date"), json!("Weight"), json!("Chest"), json!("Tummy"), json!("Glutes")]
}

#[tokio::test]
async fn open_fails_for_unknown_spreadsheet_or_bad_token() {
    let endpoints = start_mock(MockSheets::default()).await;

    let missing = SheetsStore::open("Elsewhere", &Credentials::new(TOKEN), &endpoints).await;
    assert!(matches!(missing, Err(StoreError::Connection(_))));

    let rejected =
        SheetsStore::open("MyFitnessProgress", &Credentials::new("wrong"), &endpoints).await;
    assert!(matches!(rejected, Err(StoreError::Connection(message)) if message.contains("401")));
}

#[tokio::test]
async fn missing_worksheet_is_table_not_found() {
    let endpoints = start_mock(MockSheets::default()).await;
    let store = SheetsStore::open("MyFitnessProgress", &Credentials::new(TOKEN), &endpoints)
        .await
        .unwrap();
    assert_eq!(store.spreadsheet_id(), SPREADSHEET_ID);

    assert!(matches!(
        store.get_table("Data").await,
        Err(StoreError::TableNotFound(table)) if table == "Data"
    ));
}

#[tokio::test]
async fn measurements_round_trip_through_sheets() {
    let mock = MockSheets::default().with_sheet("Data", vec![data_header()]);
    let endpoints = start_mock(mock.clone()).await;
    let store: Arc<dyn Store> = Arc::new(
        SheetsStore::open("MyFitnessProgress", &Credentials::new(TOKEN), &endpoints)
            .await
            .unwrap(),
    );
    let repo = MeasurementRepository::new(store);

    let measurement = Measurement {
        date: NaiveDate::from_ymd_opt(2025, 5, 6).unwrap(),
        weight: 68.5,
        chest: 91.2,
        tummy: 80.0,
        glutes: 97.3,
    };
    repo.record(&measurement).await.unwrap();

    assert_eq!(
        mock.grid("Data").unwrap()[1],
        vec![json!("2025-05-06"), json!(68.5), json!(91.2), json!(80.0), json!(97.3)]
    );
    assert_eq!(repo.list().await.unwrap(), vec![measurement]);
}

#[tokio::test]
async fn goals_sheet_is_created_once_and_replaced() {
    let mock = MockSheets::default().with_sheet("Data", vec![data_header()]);
    let endpoints = start_mock(mock.clone()).await;
    let store: Arc<dyn Store> = Arc::new(
        SheetsStore::open("MyFitnessProgress", &Credentials::new(TOKEN), &endpoints)
            .await
            .unwrap(),
    );
    let repo = GoalRepository::new(store);

    assert!(repo.list().await.unwrap().is_empty());

    let mut may = GoalSet::new();
    may.insert(
        "May",
        GoalTargets {
            weight: 60.0,
            chest: 80.0,
            tummy: 70.0,
            glutes: 90.0,
        },
    );
    repo.save(&may).await.unwrap();

    let mut june = GoalSet::new();
    june.insert(
        "June",
        GoalTargets {
            weight: 59.0,
            chest: 79.0,
            tummy: 69.0,
            glutes: 89.0,
        },
    );
    repo.save(&june).await.unwrap();

    let added = mock.added.lock().unwrap().clone();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0]["gridProperties"]["rowCount"], json!(10));
    assert_eq!(added[0]["gridProperties"]["columnCount"], json!(20));

    let grid = mock.grid("Goals").unwrap();
    assert_eq!(grid.len(), 2);
    assert_eq!(grid[0][0], json!("Month"));

    let listed = repo.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].month, "June");
    assert_eq!(listed[0].targets.glutes, 89.0);
}

#[tokio::test]
async fn service_account_token_is_minted_once_and_reused() {
    let mock = MockSheets::default().with_sheet("Data", vec![data_header()]);
    let endpoints = start_mock(mock.clone()).await;
    let credentials = service_account(&endpoints);

    let store = SheetsStore::open("MyFitnessProgress", &credentials, &endpoints)
        .await
        .unwrap();
    store
        .append_row(
            "Data",
            vec![json!("2025-05-01"), json!(70.0), json!(90.0), json!(80.0), json!(95.0)],
        )
        .await
        .unwrap();
    assert_eq!(store.get_table("Data").await.unwrap().len(), 1);

    assert_eq!(*mock.token_requests.lock().unwrap(), 1);
}
