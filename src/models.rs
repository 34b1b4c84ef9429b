use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DATA_TABLE: &str = "Data";
pub const GOALS_TABLE: &str = "Goals";

pub const DATA_COLUMNS: [&str; 5] = ["Date", "Weight", "Chest", "Tummy", "Glutes"];
pub const GOAL_COLUMNS: [&str; 5] = ["Month", "Weight", "Chest", "Tummy", "Glutes"];

/// Text form of a measurement date as written to the store.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub date: NaiveDate,
    pub weight: f64,
    pub chest: f64,
    pub tummy: f64,
    pub glutes: f64,
}

/// One submission from the tracking form.
pub type MeasurementInput = Measurement;

/// Target values for one month. Unset metrics default to 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GoalTargets {
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub chest: f64,
    #[serde(default)]
    pub tummy: f64,
    #[serde(default)]
    pub glutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRow {
    pub month: String,
    #[serde(flatten)]
    pub targets: GoalTargets,
}

/// Ordered month -> targets mapping saved as a whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalSet {
    entries: Vec<GoalRow>,
}

impl GoalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the targets for `month`, keeping its first position.
    pub fn insert(&mut self, month: impl Into<String>, targets: GoalTargets) {
        let month = month.into();
        match self.entries.iter_mut().find(|row| row.month == month) {
            Some(row) => row.targets = targets,
            None => self.entries.push(GoalRow { month, targets }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &GoalRow> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<GoalRow> for GoalSet {
    fn from_iter<I: IntoIterator<Item = GoalRow>>(iter: I) -> Self {
        let mut set = GoalSet::new();
        for row in iter {
            set.insert(row.month, row.targets);
        }
        set
    }
}

#[derive(Debug, Deserialize)]
pub struct MeasurementRequest {
    pub date: Option<NaiveDate>,
    pub weight: f64,
    pub chest: f64,
    pub tummy: f64,
    pub glutes: f64,
}

#[derive(Debug, Deserialize)]
pub struct GoalsRequest {
    pub goals: Vec<GoalRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Steady,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub window_start: NaiveDate,
    pub latest: NaiveDate,
    pub entries: usize,
    pub avg_weight: f64,
    pub avg_tummy: f64,
    pub trend: Trend,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub series: Vec<Measurement>,
    pub weekly_summary: Option<WeeklySummary>,
}

#[derive(Debug, Serialize)]
pub struct MonthsResponse {
    pub months: Vec<String>,
}
