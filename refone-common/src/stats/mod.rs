//! Post-match statistics computed from the workout recording: time in heart rate zones, distance
//! covered and a heatmap of the referee's position. Career totals over many matches live in
//! [`career`].

use crate::config::{HeartRate as HeartRateConfig, Heatmap as HeatmapConfig};
use core::time::Duration;
use heart_rate::{HeartRateSample, ZoneTimes};
use log::*;
use route::{Coordinate, HeatBin};
use serde::de::DeserializeOwned;
use std::io::Read;
use thiserror::Error;

pub mod career;
pub mod heart_rate;
pub mod route;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Failed to read samples: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, StatsError>;

/// Reads every row of a CSV file with a header row into `T`
pub fn read_csv<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    reader
        .deserialize()
        .map(|row| row.map_err(StatsError::from))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutReport {
    pub duration: Duration,
    pub average_bpm: Option<f64>,
    pub max_bpm: Option<f64>,
    pub zones: ZoneTimes,
    pub distance_m: f64,
    pub heatmap: Vec<HeatBin>,
}

impl WorkoutReport {
    pub fn new(
        heart_rate: &[HeartRateSample],
        route: &[Coordinate],
        hr_config: &HeartRateConfig,
        heatmap_config: &HeatmapConfig,
    ) -> Self {
        let on_field = route::filter_to_field(route, heatmap_config);

        let (first, last) = heart_rate
            .iter()
            .map(|s| s.seconds)
            .filter(|s| s.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s), hi.max(s))
            });
        let duration = if last > first {
            Duration::try_from_secs_f64(last - first).unwrap_or_else(|e| {
                warn!("Recording spans {} s, too long to measure: {e}", last - first);
                Duration::MAX
            })
        } else {
            Duration::ZERO
        };

        Self {
            duration,
            average_bpm: heart_rate::average_bpm(heart_rate),
            max_bpm: heart_rate::max_bpm(heart_rate),
            zones: heart_rate::time_in_zones(heart_rate, hr_config),
            distance_m: route::distance(&on_field),
            heatmap: route::heatmap(&on_field, heatmap_config),
        }
    }
}
