pub mod app;
pub mod coerce;
pub mod config;
pub mod errors;
pub mod goals;
pub mod handlers;
pub mod measurements;
pub mod models;
pub mod progress;
pub mod state;
pub mod store;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use errors::{AppError, StoreError};
pub use goals::GoalRepository;
pub use measurements::MeasurementRepository;
pub use state::AppState;
