use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/measurements",
            get(handlers::list_measurements).post(handlers::record_measurement),
        )
        .route("/api/goals", get(handlers::list_goals).post(handlers::save_goals))
        .route("/api/months", get(handlers::get_months))
        .route("/api/progress", get(handlers::get_progress))
        .with_state(state)
}
