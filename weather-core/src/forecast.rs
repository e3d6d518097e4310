//! Slicing and day-grouping of 3-hourly forecast samples.

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;
use std::collections::HashMap;

use crate::model::{Condition, ForecastSample};

/// Eight 3-hour samples cover the next 24 hours.
pub const HOURLY_SLOTS: usize = 8;
pub const DAILY_SLOTS: usize = 5;

/// Samples that fall on one calendar date in the location's time zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub temperatures: Vec<f64>,
    /// Condition of the first sample seen for the day.
    pub condition: Condition,
    pub samples: Vec<ForecastSample>,
}

impl DailyBucket {
    fn new(date: NaiveDate, first: &ForecastSample) -> Self {
        Self {
            date,
            temperatures: Vec::new(),
            condition: first.condition.clone(),
            samples: Vec::new(),
        }
    }

    fn push(&mut self, sample: &ForecastSample) {
        self.temperatures.push(sample.temperature);
        self.samples.push(sample.clone());
    }

    pub fn max_temperature(&self) -> f64 {
        self.temperatures.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn min_temperature(&self) -> f64 {
        self.temperatures.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

/// The first `count` samples. Returns fewer when the forecast is shorter.
pub fn next_hours(samples: &[ForecastSample], count: usize) -> &[ForecastSample] {
    &samples[..count.min(samples.len())]
}

/// Buckets samples by local date, in order of first appearance.
pub fn group_by_day<Tz: TimeZone>(samples: &[ForecastSample], tz: &Tz) -> Vec<DailyBucket> {
    let mut buckets: Vec<DailyBucket> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for sample in samples {
        let date = sample.timestamp.with_timezone(tz).date_naive();
        let slot = *index.entry(date).or_insert_with(|| {
            buckets.push(DailyBucket::new(date, sample));
            buckets.len() - 1
        });
        buckets[slot].push(sample);
    }

    buckets
}

/// Drops the first bucket (the partial current day) and keeps up to `count` more.
pub fn next_days(buckets: Vec<DailyBucket>, count: usize) -> Vec<DailyBucket> {
    buckets.into_iter().skip(1).take(count).collect()
}
