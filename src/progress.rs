use crate::models::{Measurement, ProgressResponse, Trend, WeeklySummary};
use chrono::Duration;

const WINDOW_DAYS: i64 = 7;

pub fn build_progress(measurements: Vec<Measurement>) -> ProgressResponse {
    let series = build_series(measurements);
    let weekly_summary = weekly_summary(&series);
    ProgressResponse {
        series,
        weekly_summary,
    }
}

/// Orders measurements by date, oldest first. Same-day rows keep their input order.
pub fn build_series(mut measurements: Vec<Measurement>) -> Vec<Measurement> {
    measurements.sort_by_key(|measurement| measurement.date);
    measurements
}

/// Summarises rows dated within the 7 days ending at the latest date.
///
/// `series` must be in ascending date order, as produced by [`build_series`].
/// The trend compares only the first and last rows of the window.
pub fn weekly_summary(series: &[Measurement]) -> Option<WeeklySummary> {
    let latest = series.iter().map(|measurement| measurement.date).max()?;
    let cutoff = latest - Duration::days(WINDOW_DAYS);

    let window: Vec<&Measurement> = series
        .iter()
        .filter(|measurement| measurement.date > cutoff)
        .collect();
    let (first, last) = (window.first()?, window.last()?);

    let count = window.len() as f64;
    let avg_weight = window.iter().map(|m| m.weight).sum::<f64>() / count;
    let avg_tummy = window.iter().map(|m| m.tummy).sum::<f64>() / count;

    let trend = if last.weight < first.weight {
        Trend::Improving
    } else {
        Trend::Steady
    };

    Some(WeeklySummary {
        window_start: cutoff + Duration::days(1),
        latest,
        entries: window.len(),
        avg_weight,
        avg_tummy,
        trend,
    })
}
