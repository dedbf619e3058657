use crate::config::Heatmap as HeatmapConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great circle distance in metres
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
    }
}

pub fn centroid(points: &[Coordinate]) -> Option<Coordinate> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (lat, lon) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lon), p| (lat + p.latitude, lon + p.longitude));
    Some(Coordinate::new(lat / n, lon / n))
}

/// Drops the points recorded away from the pitch, e.g. walking to the changing rooms
pub fn filter_to_field(points: &[Coordinate], config: &HeatmapConfig) -> Vec<Coordinate> {
    let Some(center) = centroid(points) else {
        return Vec::new();
    };
    points
        .iter()
        .filter(|p| p.distance_to(&center) < config.field_radius_m)
        .copied()
        .collect()
}

/// Length of the route in metres
pub fn distance(points: &[Coordinate]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatBin {
    pub center: Coordinate,
    pub count: u32,
    /// 0 to 1, saturating well before the busiest cell so quieter areas stay visible
    pub intensity: f64,
}

pub fn heatmap(points: &[Coordinate], config: &HeatmapConfig) -> Vec<HeatBin> {
    let size = config.grid_size_degrees;

    let mut counts: BTreeMap<(i64, i64), u32> = BTreeMap::new();
    for p in points {
        let key = (
            (p.latitude / size).floor() as i64,
            (p.longitude / size).floor() as i64,
        );
        *counts.entry(key).or_default() += 1;
    }

    let Some(&max_count) = counts.values().max() else {
        return Vec::new();
    };
    let saturation = (f64::from(max_count) * config.saturation_fraction).max(config.min_saturation);

    counts
        .into_iter()
        .map(|((x, y), count)| HeatBin {
            center: Coordinate::new(
                x as f64 * size + size / 2.0,
                y as f64 * size + size / 2.0,
            ),
            count,
            intensity: (f64::from(count) / saturation).min(1.0),
        })
        .collect()
}
