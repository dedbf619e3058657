use log::*;
use refone_common::{
    config::{Heatmap, HeartRate},
    drawing_support::time_string,
    stats::{
        self, WorkoutReport,
        career::{CareerStats, Period},
        heart_rate::HeartRateSample,
        route::Coordinate,
    },
};
use serde::de::DeserializeOwned;
use std::{fmt::Write, fs::File, path::Path};
use thiserror::Error;

const HOTTEST_BINS: usize = 5;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Couldn't open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Stats(#[from] stats::StatsError),
}

fn read_samples<T: DeserializeOwned>(path: Option<&Path>) -> Result<Vec<T>, ReportError> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let file = File::open(path).map_err(|source| ReportError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let samples = stats::read_csv(file)?;
    debug!("Read {} rows from {path:?}", samples.len());
    Ok(samples)
}

pub fn build_report(
    heart_rate: Option<&Path>,
    route: Option<&Path>,
    hr_config: &HeartRate,
    heatmap_config: &Heatmap,
) -> Result<WorkoutReport, ReportError> {
    let samples: Vec<HeartRateSample> = read_samples(heart_rate)?;
    let points: Vec<Coordinate> = read_samples(route)?;
    Ok(WorkoutReport::new(&samples, &points, hr_config, heatmap_config))
}

fn bpm_bound(bound: Option<f64>) -> String {
    bound.map_or_else(|| "..".to_string(), |bpm| format!("{bpm:.0}"))
}

pub fn format_report(report: &WorkoutReport, hr_config: &HeartRate) -> String {
    let mut out = String::new();
    // Writing to a String can't fail
    let _ = writeln!(out, "Duration: {}", time_string(report.duration));

    match (report.average_bpm, report.max_bpm) {
        (Some(average), Some(max)) => {
            let _ = writeln!(out, "Heart rate: avg {average:.0} bpm, max {max:.0} bpm");
        }
        _ => {
            let _ = writeln!(out, "Heart rate: no samples");
        }
    }

    let total = report.zones.total().as_secs_f64();
    for (zone, time) in report.zones.iter() {
        let (low, high) = zone.bpm_range(hr_config);
        let share = if total > 0.0 {
            time.as_secs_f64() / total * 100.0
        } else {
            0.0
        };
        let _ = writeln!(
            out,
            "  {zone} {:>4}-{:<4} bpm  {}  {share:>3.0}%",
            bpm_bound(low),
            bpm_bound(high),
            time_string(time),
        );
    }

    let _ = writeln!(out, "Distance: {:.2} km", report.distance_m / 1000.0);

    if report.heatmap.is_empty() {
        let _ = writeln!(out, "Heatmap: no positions on the field");
    } else {
        let _ = writeln!(out, "Heatmap: {} cells", report.heatmap.len());
        let mut bins = report.heatmap.clone();
        bins.sort_by(|a, b| b.count.cmp(&a.count));
        for bin in bins.iter().take(HOTTEST_BINS) {
            let _ = writeln!(
                out,
                "  {:.6}, {:.6}  {} points  {:.0}%",
                bin.center.latitude,
                bin.center.longitude,
                bin.count,
                bin.intensity * 100.0
            );
        }
    }
    out
}

fn minutes_string(minutes: u32) -> String {
    if minutes < 60 {
        format!("{minutes} min")
    } else {
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

pub fn format_career(stats: &CareerStats, period: Period) -> String {
    let mut out = String::new();
    if stats.matches == 0 {
        let _ = writeln!(out, "No finished matches in {period}");
        return out;
    }

    let _ = writeln!(out, "Career ({period}): {} matches", stats.matches);
    let _ = writeln!(
        out,
        "Earnings: {:.2} ({:.2} per match, {:.2} per minute)",
        stats.earnings,
        stats.earnings_per_match(),
        stats.earnings_per_minute()
    );
    let principal = stats.principal_share();
    let _ = writeln!(
        out,
        "Roles: {} principal ({principal:.0}%), {} assistant ({:.0}%)",
        stats.as_principal,
        stats.as_assistant,
        100.0 - principal
    );
    let _ = writeln!(
        out,
        "Refereed: {}, {} goals, {:.1} km",
        minutes_string(stats.minutes),
        stats.goals,
        stats.distance_m / 1000.0
    );
    if let (Some(day), Some(time_of_day)) = (stats.busiest_weekday, stats.time_of_day) {
        let _ = writeln!(out, "Busiest day: {day}, mostly {time_of_day}");
    }

    let _ = writeln!(out, "Matches per month:");
    for month in &stats.per_month {
        let _ = writeln!(
            out,
            "  {}-{:02}  {}",
            month.year,
            u8::from(month.month),
            month.matches
        );
    }

    if let Some(best) = &stats.highest_scoring {
        let _ = writeln!(
            out,
            "Highest scoring: {} goals, {} vs {} on {}",
            best.goals, best.home, best.away, best.date
        );
    }
    if let Some((team, count)) = &stats.most_frequent_team {
        let _ = writeln!(out, "Most frequent team: {team} ({count} matches)");
    }
    out
}
