use crate::coerce;
use crate::errors::StoreError;
use crate::models::{DATA_TABLE, DATE_FORMAT, Measurement, MeasurementInput};
use crate::store::{Row, Store};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Append-only access to the "Data" table.
#[derive(Clone)]
pub struct MeasurementRepository {
    store: Arc<dyn Store>,
}

impl MeasurementRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Appends one row. Identical inputs produce identical duplicate rows.
    pub async fn record(&self, input: &MeasurementInput) -> Result<(), StoreError> {
        let values = vec![
            Value::from(input.date.format(DATE_FORMAT).to_string()),
            Value::from(input.weight),
            Value::from(input.chest),
            Value::from(input.tummy),
            Value::from(input.glutes),
        ];
        self.store.append_row(DATA_TABLE, values).await?;
        info!(date = %input.date, "recorded measurement");
        Ok(())
    }

    /// Full history in stored order. One malformed row fails the whole read.
    pub async fn list(&self) -> Result<Vec<Measurement>, StoreError> {
        let rows = self.store.get_table(DATA_TABLE).await?;
        rows.iter()
            .enumerate()
            .map(|(idx, row)| {
                parse_row(row).map_err(|message| StoreError::data_format(DATA_TABLE, idx + 2, message))
            })
            .collect()
    }
}

fn parse_row(row: &Row) -> Result<Measurement, String> {
    Ok(Measurement {
        date: coerce::date(coerce::field(row, "Date")?, "Date")?,
        weight: coerce::decimal(coerce::field(row, "Weight")?, "Weight")?,
        chest: coerce::decimal(coerce::field(row, "Chest")?, "Chest")?,
        tummy: coerce::decimal(coerce::field(row, "Tummy")?, "Tummy")?,
        glutes: coerce::decimal(coerce::field(row, "Glutes")?, "Glutes")?,
    })
}
