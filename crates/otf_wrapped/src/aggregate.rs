//! Aggregate statistics over parsed records and aligned matrices.
//!
//! Everything here is a pure function over in-memory data: per-minute
//! distribution summaries, categorical counters, the zone/extrema frame
//! with its calendar-week histogram, and the heart-rate first-difference
//! signal.

use crate::align::quantile;
use crate::error::{ReportError, ReportResult};
use crate::records::WorkoutRecord;
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate};
use std::collections::{BTreeMap, HashMap};

/// Descriptive summary of one minute column: the five-number summary plus
/// count, mean and sample standard deviation.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

/// Summarize each minute column of a rectangular row set. Uses the same
/// linear-interpolation quantile estimator as the alignment cutoff.
pub fn describe_columns(rows: &[Vec<u32>]) -> ReportResult<Vec<ColumnSummary>> {
    if rows.is_empty() {
        return Err(ReportError::InsufficientData(
            "no rows to summarize".into(),
        ));
    }
    let ncols = rows[0].len();
    let mut summaries = Vec::with_capacity(ncols);
    for col in 0..ncols {
        let mut values: Vec<f64> = rows.iter().map(|r| f64::from(r[col])).collect();
        values.sort_by(|a, b| a.partial_cmp(b).expect("BPM values are finite"));
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std_dev = if count > 1 {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };
        summaries.push(ColumnSummary {
            count,
            mean,
            std_dev,
            min: values[0],
            p25: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            p75: quantile(&values, 0.75),
            max: values[count - 1],
        });
    }
    Ok(summaries)
}

/// Frequency of each class type across all records.
pub fn count_by_class_type(records: &[WorkoutRecord]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for record in records {
        *counts.entry(record.class_type.clone()).or_insert(0) += 1;
    }
    counts
}

/// Frequency of each `coach - studio` pairing across all records. The same
/// coach at two studios counts separately.
pub fn count_by_coach(records: &[WorkoutRecord]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for record in records {
        let key = format!("{} - {}", record.coach, record.studio_name);
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// One class worth of zone/extrema data.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoneRow {
    pub black: u32,
    pub blue: u32,
    pub green: u32,
    pub orange: u32,
    pub red: u32,
    pub splats: u32,
    pub calories: u32,
    pub max_hr: u32,
    pub timestamp: DateTime<FixedOffset>,
}

/// Per-class zone seconds, splats, calories, max HR and timestamp, for
/// time-filtered aggregation. Derived once from all records; immutable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZoneFrame {
    rows: Vec<ZoneRow>,
}

/// Display order of the five intensity zones.
pub const ZONE_NAMES: [&str; 5] = ["black", "blue", "green", "orange", "red"];

impl ZoneFrame {
    pub fn from_records(records: &[WorkoutRecord]) -> Self {
        let rows = records
            .iter()
            .map(|r| ZoneRow {
                black: r.zone_seconds.black,
                blue: r.zone_seconds.blue,
                green: r.zone_seconds.green,
                orange: r.zone_seconds.orange,
                red: r.zone_seconds.red,
                splats: r.splat_points,
                calories: r.calories,
                max_hr: r.max_hr,
                timestamp: r.class_date,
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows with `start <= timestamp < end`.
    pub fn filter_range(&self, start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|r| r.timestamp >= start && r.timestamp < end)
            .cloned()
            .collect();
        Self { rows }
    }

    fn require_rows(&self, what: &str) -> ReportResult<()> {
        if self.rows.is_empty() {
            return Err(ReportError::InsufficientData(format!(
                "no classes in range for {what}"
            )));
        }
        Ok(())
    }

    /// Total minutes spent in each zone, in [`ZONE_NAMES`] order.
    pub fn zone_minutes(&self) -> ReportResult<Vec<(&'static str, f64)>> {
        self.require_rows("zone minutes")?;
        let mut totals = [0u64; 5];
        for row in &self.rows {
            totals[0] += u64::from(row.black);
            totals[1] += u64::from(row.blue);
            totals[2] += u64::from(row.green);
            totals[3] += u64::from(row.orange);
            totals[4] += u64::from(row.red);
        }
        Ok(ZONE_NAMES
            .iter()
            .zip(totals)
            .map(|(&name, secs)| (name, secs as f64 / 60.0))
            .collect())
    }

    pub fn max_splats(&self) -> ReportResult<u32> {
        self.require_rows("max splats")?;
        Ok(self.rows.iter().map(|r| r.splats).max().unwrap_or(0))
    }

    pub fn max_calories(&self) -> ReportResult<u32> {
        self.require_rows("max calories")?;
        Ok(self.rows.iter().map(|r| r.calories).max().unwrap_or(0))
    }

    pub fn total_calories(&self) -> ReportResult<u64> {
        self.require_rows("total calories")?;
        Ok(self.rows.iter().map(|r| u64::from(r.calories)).sum())
    }

    pub fn max_hr(&self) -> ReportResult<u32> {
        self.require_rows("max heart rate")?;
        Ok(self.rows.iter().map(|r| r.max_hr).max().unwrap_or(0))
    }

    /// Class counts per calendar week, labeled by the week-ending Sunday,
    /// in chronological order.
    pub fn weekly_counts(&self) -> ReportResult<Vec<(NaiveDate, usize)>> {
        self.require_rows("weekly histogram")?;
        let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(week_ending_sunday(row.timestamp)).or_insert(0) += 1;
        }
        Ok(counts.into_iter().collect())
    }

    /// The calendar week with the most classes; earliest week wins ties.
    pub fn busiest_week(&self) -> ReportResult<(NaiveDate, usize)> {
        let weekly = self.weekly_counts()?;
        let mut best = weekly[0];
        for &(date, count) in &weekly[1..] {
            if count > best.1 {
                best = (date, count);
            }
        }
        Ok(best)
    }
}

/// The Sunday that closes the calendar week containing `ts`. A class on a
/// Sunday belongs to the week ending that same day.
fn week_ending_sunday(ts: DateTime<FixedOffset>) -> NaiveDate {
    let date = ts.date_naive();
    let days_left = 6 - i64::from(date.weekday().num_days_from_monday());
    date + Duration::days(days_left)
}

/// Minute-over-minute deltas of each aligned row. With a one-minute sample
/// interval the first difference is the heart-rate derivative.
pub fn first_differences(rows: &[Vec<u32>]) -> Vec<Vec<i64>> {
    rows.iter()
        .map(|row| {
            row.windows(2)
                .map(|w| i64::from(w[1]) - i64::from(w[0]))
                .collect()
        })
        .collect()
}

/// Sign classification of one delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trend {
    Increasing,
    Decreasing,
    Flat,
}

/// Classify each minute of each row as increasing, decreasing or flat.
/// Analytical extension point; the default report does not consume it.
pub fn hr_trends(rows: &[Vec<u32>]) -> Vec<Vec<Trend>> {
    first_differences(rows)
        .into_iter()
        .map(|deltas| {
            deltas
                .into_iter()
                .map(|d| match d.signum() {
                    1 => Trend::Increasing,
                    -1 => Trend::Decreasing,
                    _ => Trend::Flat,
                })
                .collect()
        })
        .collect()
}
