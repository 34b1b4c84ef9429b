use crate::errors::AppError;
use crate::models::{
    GoalRow, GoalSet, GoalsRequest, Measurement, MeasurementRequest, MonthsResponse,
    ProgressResponse,
};
use crate::progress::build_progress;
use crate::state::AppState;
use crate::ui::render_index;
use axum::{extract::State, http::StatusCode, response::Html, Json};
use chrono::{Local, NaiveDate};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(today(), &state.goal_months))
}

pub async fn list_measurements(
    State(state): State<AppState>,
) -> Result<Json<Vec<Measurement>>, AppError> {
    Ok(Json(state.measurements.list().await?))
}

pub async fn record_measurement(
    State(state): State<AppState>,
    Json(payload): Json<MeasurementRequest>,
) -> Result<(StatusCode, Json<Measurement>), AppError> {
    let measurement = Measurement {
        date: payload.date.unwrap_or_else(today),
        weight: non_negative("weight", payload.weight)?,
        chest: non_negative("chest", payload.chest)?,
        tummy: non_negative("tummy", payload.tummy)?,
        glutes: non_negative("glutes", payload.glutes)?,
    };

    state.measurements.record(&measurement).await?;
    Ok((StatusCode::CREATED, Json(measurement)))
}

pub async fn list_goals(State(state): State<AppState>) -> Result<Json<Vec<GoalRow>>, AppError> {
    Ok(Json(state.goals.list().await?))
}

pub async fn save_goals(
    State(state): State<AppState>,
    Json(payload): Json<GoalsRequest>,
) -> Result<Json<Vec<GoalRow>>, AppError> {
    if let Some(unknown) = payload
        .goals
        .iter()
        .find(|goal| !state.goal_months.contains(&goal.month))
    {
        return Err(AppError::bad_request(format!(
            "unknown month '{}', expected one of {}",
            unknown.month,
            state.goal_months.join(", ")
        )));
    }

    let goals: GoalSet = payload.goals.into_iter().collect();
    state.goals.save(&goals).await?;
    Ok(Json(goals.iter().cloned().collect()))
}

pub async fn get_months(State(state): State<AppState>) -> Json<MonthsResponse> {
    Json(MonthsResponse {
        months: state.goal_months.as_ref().clone(),
    })
}

pub async fn get_progress(State(state): State<AppState>) -> Result<Json<ProgressResponse>, AppError> {
    let measurements = state.measurements.list().await?;
    Ok(Json(build_progress(measurements)))
}

fn non_negative(field: &str, value: f64) -> Result<f64, AppError> {
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(AppError::bad_request(format!(
            "{field} must be a non-negative number"
        )))
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
