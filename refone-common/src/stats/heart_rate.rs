use crate::config::HeartRate as HeartRateConfig;
use core::{ops::Index, time::Duration};
use enum_iterator::{Sequence, all};
use serde::{Deserialize, Serialize};

/// The longest gap a single sample is allowed to stand for
const MAX_SAMPLE_SPAN: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
    /// Seconds since the start of the recording
    pub seconds: f64,
    pub bpm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Sequence)]
pub enum Zone {
    Z1,
    Z2,
    Z3,
    Z4,
    Z5,
}

impl Zone {
    pub fn for_bpm(bpm: f64, config: &HeartRateConfig) -> Self {
        let fraction = bpm / config.max_bpm;
        all::<Zone>()
            .zip(config.zone_limits)
            .find(|(_, limit)| fraction < *limit)
            .map_or(Zone::Z5, |(zone, _)| zone)
    }

    fn index(self) -> usize {
        self as usize
    }

    /// The bpm range of this zone, `None` marking an open end
    pub fn bpm_range(self, config: &HeartRateConfig) -> (Option<f64>, Option<f64>) {
        let i = self.index();
        let lower = i
            .checked_sub(1)
            .map(|j| config.zone_limits[j] * config.max_bpm);
        let upper = config.zone_limits.get(i).map(|l| l * config.max_bpm);
        (lower, upper)
    }
}

impl core::fmt::Display for Zone {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "Z{}", self.index() + 1)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ZoneTimes([Duration; 5]);

impl ZoneTimes {
    pub fn iter(&self) -> impl Iterator<Item = (Zone, Duration)> + '_ {
        all::<Zone>().map(|zone| (zone, self[zone]))
    }

    pub fn total(&self) -> Duration {
        self.0.iter().sum()
    }
}

impl Index<Zone> for ZoneTimes {
    type Output = Duration;

    fn index(&self, zone: Zone) -> &Self::Output {
        &self.0[zone.index()]
    }
}

/// Splits the recording into zones. Every sample counts for the time until the next one, capped
/// at [`MAX_SAMPLE_SPAN`]; the last sample counts for nothing.
pub fn time_in_zones(samples: &[HeartRateSample], config: &HeartRateConfig) -> ZoneTimes {
    let mut sorted: Vec<_> = samples
        .iter()
        .filter(|s| s.seconds.is_finite() && s.bpm.is_finite())
        .copied()
        .collect();
    sorted.sort_by(|a, b| a.seconds.total_cmp(&b.seconds));

    let mut times = ZoneTimes::default();
    for pair in sorted.windows(2) {
        // Gaps too long for a Duration are still only worth the cap
        let span = Duration::try_from_secs_f64(pair[1].seconds - pair[0].seconds)
            .map_or(MAX_SAMPLE_SPAN, |gap| gap.min(MAX_SAMPLE_SPAN));
        times.0[Zone::for_bpm(pair[0].bpm, config).index()] += span;
    }
    times
}

pub fn average_bpm(samples: &[HeartRateSample]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().map(|s| s.bpm).sum::<f64>() / samples.len() as f64)
}

pub fn max_bpm(samples: &[HeartRateSample]) -> Option<f64> {
    samples.iter().map(|s| s.bpm).reduce(f64::max)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::stats::read_csv;
    use indoc::indoc;

    fn sample(seconds: f64, bpm: f64) -> HeartRateSample {
        HeartRateSample { seconds, bpm }
    }

    #[test]
    fn test_zone_boundaries() {
        let config = HeartRateConfig::default();
        // 190 bpm max: limits at 114, 133, 152, 171
        assert_eq!(Zone::for_bpm(100.0, &config), Zone::Z1);
        assert_eq!(Zone::for_bpm(113.9, &config), Zone::Z1);
        assert_eq!(Zone::for_bpm(114.0, &config), Zone::Z2);
        assert_eq!(Zone::for_bpm(140.0, &config), Zone::Z3);
        assert_eq!(Zone::for_bpm(160.0, &config), Zone::Z4);
        assert_eq!(Zone::for_bpm(171.0, &config), Zone::Z5);
        assert_eq!(Zone::for_bpm(200.0, &config), Zone::Z5);
    }

    #[test]
    fn test_bpm_range() {
        let config = HeartRateConfig {
            max_bpm: 200.0,
            ..Default::default()
        };
        assert_eq!(Zone::Z1.bpm_range(&config), (None, Some(120.0)));
        assert_eq!(Zone::Z3.bpm_range(&config), (Some(140.0), Some(160.0)));
        assert_eq!(Zone::Z5.bpm_range(&config), (Some(180.0), None));
        assert_eq!(Zone::Z4.to_string(), "Z4");
    }

    #[test]
    fn test_time_in_zones() {
        let config = HeartRateConfig::default();
        let samples = [
            sample(0.0, 100.0),
            sample(5.0, 140.0),
            // 30s gap, only 10s of it counts
            sample(35.0, 180.0),
            sample(37.0, 100.0),
        ];
        let times = time_in_zones(&samples, &config);

        assert_eq!(times[Zone::Z1], Duration::from_secs(5));
        assert_eq!(times[Zone::Z3], Duration::from_secs(10));
        assert_eq!(times[Zone::Z5], Duration::from_secs(2));
        assert_eq!(times[Zone::Z2], Duration::ZERO);
        assert_eq!(times.total(), Duration::from_secs(17));
    }

    #[test]
    fn test_unsorted_samples() {
        let config = HeartRateConfig::default();
        let sorted = [sample(0.0, 100.0), sample(4.0, 160.0), sample(6.0, 100.0)];
        let shuffled = [sorted[2], sorted[0], sorted[1]];
        assert_eq!(
            time_in_zones(&sorted, &config),
            time_in_zones(&shuffled, &config)
        );
    }

    #[test]
    fn test_too_few_samples() {
        let config = HeartRateConfig::default();
        assert_eq!(time_in_zones(&[], &config), ZoneTimes::default());
        assert_eq!(
            time_in_zones(&[sample(0.0, 150.0)], &config).total(),
            Duration::ZERO
        );
        assert_eq!(average_bpm(&[]), None);
        assert_eq!(max_bpm(&[]), None);
    }

    #[test]
    fn test_huge_gaps_are_capped() {
        let config = HeartRateConfig::default();
        let samples = [
            sample(-f64::MAX, 100.0),
            sample(f64::MAX, 100.0),
            sample(f64::MAX, 150.0),
        ];
        let times = time_in_zones(&samples, &config);
        assert_eq!(times[Zone::Z1], MAX_SAMPLE_SPAN);
        assert_eq!(times.total(), MAX_SAMPLE_SPAN);

        let times = time_in_zones(&[sample(0.0, 100.0), sample(1e20, 100.0)], &config);
        assert_eq!(times.total(), MAX_SAMPLE_SPAN);
    }

    #[test]
    fn test_average_and_max() {
        let samples = [sample(0.0, 120.0), sample(1.0, 150.0), sample(2.0, 180.0)];
        assert_eq!(average_bpm(&samples), Some(150.0));
        assert_eq!(max_bpm(&samples), Some(180.0));
    }

    #[test]
    fn test_read_csv() {
        let csv = indoc!(
            "seconds, bpm
             0, 98
             1.5, 101.5
            "
        );
        let samples: Vec<HeartRateSample> = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(samples, vec![sample(0.0, 98.0), sample(1.5, 101.5)]);

        let broken = read_csv::<HeartRateSample, _>("seconds,bpm\nzero,98\n".as_bytes());
        assert!(broken.is_err());
    }
}
