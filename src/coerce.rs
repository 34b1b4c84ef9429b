use crate::models::DATE_FORMAT;
use crate::store::Row;
use chrono::{Days, NaiveDate, NaiveDateTime};
use serde_json::Value;

const DATE_FALLBACK_FORMATS: [&str; 3] = ["%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Day zero of spreadsheet date serials.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

pub fn field<'a>(row: &'a Row, column: &str) -> Result<&'a Value, String> {
    row.get(column)
        .ok_or_else(|| format!("missing column {column}"))
}

/// Parses a stored date cell. Accepts the canonical text form, a few
/// spreadsheet-friendly spellings with an optional time part, and the day
/// serials a sheet returns for cells it formats as dates.
pub fn date(value: &Value, column: &str) -> Result<NaiveDate, String> {
    let text = match value {
        Value::String(text) => text,
        Value::Number(number) => return serial_date(number.as_f64(), column, value),
        other => return Err(format!("{column}: expected a date, got {other}")),
    };
    let text = text.trim();

    if let Ok(date) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Ok(stamp.date());
    }
    DATE_FALLBACK_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .ok_or_else(|| format!("{column}: '{text}' is not a date"))
}

fn serial_date(serial: Option<f64>, column: &str, value: &Value) -> Result<NaiveDate, String> {
    let (year, month, day) = SERIAL_EPOCH;
    serial
        .filter(|serial| serial.is_finite() && *serial >= 0.0)
        .and_then(|serial| {
            NaiveDate::from_ymd_opt(year, month, day)?.checked_add_days(Days::new(serial.trunc() as u64))
        })
        .ok_or_else(|| format!("{column}: {value} is not a date serial"))
}

/// Parses a numeric cell stored either as a number or as numeric text.
/// NaN and infinities are rejected.
pub fn decimal(value: &Value, column: &str) -> Result<f64, String> {
    let parsed = match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| format!("{column}: {number} is out of range"))?,
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("{column}: '{text}' is not a number"))?,
        other => return Err(format!("{column}: expected a number, got {other}")),
    };
    if !parsed.is_finite() {
        return Err(format!("{column}: {value} is not a finite number"));
    }
    Ok(parsed)
}

/// Like [`decimal`], but an empty cell reads as 0.
pub fn decimal_or_zero(value: &Value, column: &str) -> Result<f64, String> {
    match value {
        Value::Null => Ok(0.0),
        Value::String(text) if text.trim().is_empty() => Ok(0.0),
        other => decimal(other, column),
    }
}
