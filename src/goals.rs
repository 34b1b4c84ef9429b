use crate::coerce;
use crate::errors::StoreError;
use crate::models::{GOAL_COLUMNS, GOALS_TABLE, GoalRow, GoalSet, GoalTargets};
use crate::store::{Row, Store, cell_text, header_row};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Whole-table access to the "Goals" table.
#[derive(Clone)]
pub struct GoalRepository {
    store: Arc<dyn Store>,
}

impl GoalRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Replaces every stored goal with `goals`. Months absent from `goals` are dropped.
    pub async fn save(&self, goals: &GoalSet) -> Result<(), StoreError> {
        self.store.ensure_table(GOALS_TABLE).await?;

        let mut rows: Vec<Vec<Value>> = Vec::with_capacity(goals.len() + 1);
        rows.push(header_row(&GOAL_COLUMNS));
        rows.extend(goals.iter().map(|goal| {
            vec![
                Value::from(goal.month.as_str()),
                Value::from(goal.targets.weight),
                Value::from(goal.targets.chest),
                Value::from(goal.targets.tummy),
                Value::from(goal.targets.glutes),
            ]
        }));

        self.store.replace_all(GOALS_TABLE, rows).await?;
        info!(months = goals.len(), "saved goals");
        Ok(())
    }

    /// Stored goals in table order; empty when no goals were ever saved.
    pub async fn list(&self) -> Result<Vec<GoalRow>, StoreError> {
        let rows = match self.store.get_table(GOALS_TABLE).await {
            Ok(rows) => rows,
            Err(StoreError::TableNotFound(_)) => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        rows.iter()
            .enumerate()
            .map(|(idx, row)| {
                parse_row(row).map_err(|message| StoreError::data_format(GOALS_TABLE, idx + 2, message))
            })
            .collect()
    }
}

fn parse_row(row: &Row) -> Result<GoalRow, String> {
    Ok(GoalRow {
        month: coerce::field(row, "Month").map(cell_text)?,
        targets: GoalTargets {
            weight: coerce::decimal_or_zero(coerce::field(row, "Weight")?, "Weight")?,
            chest: coerce::decimal_or_zero(coerce::field(row, "Chest")?, "Chest")?,
            tummy: coerce::decimal_or_zero(coerce::field(row, "Tummy")?, "Tummy")?,
            glutes: coerce::decimal_or_zero(coerce::field(row, "Glutes")?, "Glutes")?,
        },
    })
}
