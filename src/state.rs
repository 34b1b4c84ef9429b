use crate::goals::GoalRepository;
use crate::measurements::MeasurementRepository;
use crate::store::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub measurements: MeasurementRepository,
    pub goals: GoalRepository,
    pub goal_months: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, goal_months: Vec<String>) -> Self {
        Self {
            measurements: MeasurementRepository::new(Arc::clone(&store)),
            goals: GoalRepository::new(store),
            goal_months: Arc::new(goal_months),
        }
    }
}
