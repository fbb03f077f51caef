//! Reshapes the provider's flat 3-hour forecast list into the hourly strip and the
//! per-day summary shown by the dashboard.

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::model::ForecastPoint;

/// Number of 3-hour slots in the hourly strip (about 18 hours).
pub const HOURLY_SLOTS: usize = 6;

/// Maximum number of days in the daily summary.
pub const DAILY_SLOTS: usize = 7;

/// One calendar day of forecast points.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBucket {
    pub date: NaiveDate,
    /// Condition of the first point seen on that day.
    pub code: i32,
    pub description: String,
    pub temps: Vec<f64>,
}

impl DailyBucket {
    fn start(date: NaiveDate, point: &ForecastPoint) -> Self {
        Self {
            date,
            code: point.condition_code(),
            description: point.description().to_string(),
            temps: vec![point.main.temp],
        }
    }

    pub fn min(&self) -> f64 {
        self.temps.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.temps.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// The next few forecast slots, in series order.
pub fn hourly(series: &[ForecastPoint]) -> &[ForecastPoint] {
    &series[..series.len().min(HOURLY_SLOTS)]
}

/// Groups `series` by calendar date in `tz`.
///
/// Buckets come out in first-seen order and at most [`DAILY_SLOTS`] are returned.
/// Points whose timestamp is out of chrono's range are skipped.
pub fn daily_buckets<Tz: TimeZone>(series: &[ForecastPoint], tz: &Tz) -> Vec<DailyBucket> {
    let mut buckets: Vec<DailyBucket> = Vec::new();

    for point in series {
        let Some(date) = local_date(point.dt, tz) else {
            tracing::debug!(dt = point.dt, "Skipping forecast point with invalid timestamp");
            continue;
        };

        match buckets.iter_mut().find(|b| b.date == date) {
            Some(bucket) => bucket.temps.push(point.main.temp),
            None => buckets.push(DailyBucket::start(date, point)),
        }
    }

    buckets.truncate(DAILY_SLOTS);
    buckets
}

/// "Today" for the first bucket, the short weekday name ("Mon") otherwise.
pub fn day_label(index: usize, bucket: &DailyBucket) -> String {
    if index == 0 {
        "Today".to_string()
    } else {
        bucket.date.format("%a").to_string()
    }
}

pub(crate) fn local_time<Tz: TimeZone>(ts: i64, tz: &Tz) -> Option<DateTime<Tz>> {
    DateTime::from_timestamp(ts, 0).map(|utc| utc.with_timezone(tz))
}

fn local_date<Tz: TimeZone>(ts: i64, tz: &Tz) -> Option<NaiveDate> {
    local_time(ts, tz).map(|dt| dt.date_naive())
}
