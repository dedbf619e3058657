use log::*;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_with::{DurationMilliSeconds, DurationSeconds, serde_as};
use std::{fs::read_to_string, path::Path, time::Duration};
use thiserror::Error;

/// Upper bound for the length of a half or a break
pub const MAX_SEGMENT_LENGTH: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTiming {
    #[serde_as(as = "DurationSeconds<u64>")]
    pub half_length: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub break_length: Duration,
}

impl Default for MatchTiming {
    fn default() -> Self {
        Self {
            half_length: Duration::from_secs(45 * 60),
            break_length: Duration::from_secs(15 * 60),
        }
    }
}

impl MatchTiming {
    pub fn from_minutes(half_minutes: u32, break_minutes: u32) -> Self {
        Self {
            half_length: Duration::from_secs(u64::from(half_minutes) * 60),
            break_length: Duration::from_secs(u64::from(break_minutes) * 60),
        }
    }

    /// Half length in whole minutes, the base offset used when tagging second half goals
    pub fn half_minutes(&self) -> u32 {
        u32::try_from(self.half_length.as_secs() / 60).unwrap_or(u32::MAX)
    }

    pub fn break_minutes(&self) -> u32 {
        u32::try_from(self.break_length.as_secs() / 60).unwrap_or(u32::MAX)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.half_length.is_zero() {
            return Err(ConfigError::Invalid(
                "half_length must be longer than zero".to_string(),
            ));
        }
        if self.half_length > MAX_SEGMENT_LENGTH || self.break_length > MAX_SEGMENT_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "half_length and break_length can be at most {} s",
                MAX_SEGMENT_LENGTH.as_secs()
            )));
        }
        Ok(())
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertTiming {
    /// How often the clock face is redrawn
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub display_tick: Duration,
    /// How often the alert checks run
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub check_tick: Duration,
    /// Repeating alerts fire once every this many check ticks
    pub repeat_every: u32,
}

impl Default for AlertTiming {
    fn default() -> Self {
        Self {
            display_tick: Duration::from_millis(500),
            check_tick: Duration::from_millis(1000),
            repeat_every: 10,
        }
    }
}

impl AlertTiming {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display_tick.is_zero() || self.check_tick.is_zero() {
            return Err(ConfigError::Invalid(
                "tick intervals must be longer than zero".to_string(),
            ));
        }
        if self.repeat_every == 0 {
            return Err(ConfigError::Invalid(
                "repeat_every must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeartRate {
    pub max_bpm: f64,
    /// Upper bounds of zones 1 to 4 as fractions of `max_bpm`. Zone 5 is everything above.
    pub zone_limits: [f64; 4],
}

impl Default for HeartRate {
    fn default() -> Self {
        Self {
            max_bpm: 190.0,
            zone_limits: [0.60, 0.70, 0.80, 0.90],
        }
    }
}

impl HeartRate {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_bpm > 0.0) {
            return Err(ConfigError::Invalid("max_bpm must be positive".to_string()));
        }
        if self.zone_limits.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(ConfigError::Invalid(format!(
                "zone_limits must be strictly increasing, got {:?}",
                self.zone_limits
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    pub grid_size_degrees: f64,
    pub field_radius_m: f64,
    pub saturation_fraction: f64,
    pub min_saturation: f64,
}

impl Default for Heatmap {
    fn default() -> Self {
        Self {
            grid_size_degrees: 0.00002,
            field_radius_m: 85.0,
            saturation_fraction: 0.30,
            min_saturation: 2.0,
        }
    }
}

impl Heatmap {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.grid_size_degrees > 0.0) {
            return Err(ConfigError::Invalid(
                "grid_size_degrees must be positive".to_string(),
            ));
        }
        if !(self.min_saturation > 0.0) {
            return Err(ConfigError::Invalid(
                "min_saturation must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reads and parses a TOML file
pub fn load_from_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, ConfigError> {
    let config_file = read_to_string(path).map_err(|e| {
        error!("Failed to read config file: {e}");
        e
    })?;

    toml::from_str(&config_file).map_err(|e| {
        error!("Failed to parse config file: {e}");
        e.into()
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use indoc::indoc;
    use std::io::Write;

    const TIMING_STRING: &str = indoc!(
        r#"half_length = 2700
           break_length = 900"#
    );

    const ALERTS_STRING: &str = indoc!(
        r#"display_tick = 500
           check_tick = 1000
           repeat_every = 10"#
    );

    const HEART_RATE_STRING: &str = indoc!(
        r#"max_bpm = 190.0
           zone_limits = [0.6, 0.7, 0.8, 0.9]"#
    );

    #[test]
    fn test_deser_timing() {
        let timing: MatchTiming = Default::default();
        let deser = toml::from_str(TIMING_STRING);
        assert_eq!(deser, Ok(timing));
    }

    #[test]
    fn test_deser_alerts() {
        let alerts: AlertTiming = Default::default();
        let deser = toml::from_str(ALERTS_STRING);
        assert_eq!(deser, Ok(alerts));
    }

    #[test]
    fn test_deser_heart_rate() {
        let hr: HeartRate = Default::default();
        let deser = toml::from_str(HEART_RATE_STRING);
        assert_eq!(deser, Ok(hr));
    }

    #[test]
    fn test_ser_heatmap() {
        let hm: Heatmap = Default::default();
        let serialized = toml::to_string(&hm).unwrap();
        let deser = toml::from_str(&serialized);
        assert_eq!(deser, Ok(hm));
    }

    #[test]
    fn test_timing_minutes() {
        let timing = MatchTiming::from_minutes(30, 10);
        assert_eq!(timing.half_length, Duration::from_secs(1800));
        assert_eq!(timing.half_minutes(), 30);
        assert_eq!(timing.break_minutes(), 10);
    }

    #[test]
    fn test_validation() {
        assert!(MatchTiming::default().validate().is_ok());
        assert!(MatchTiming::from_minutes(0, 5).validate().is_err());
        assert!(MatchTiming::from_minutes(24 * 60, 24 * 60).validate().is_ok());
        assert!(MatchTiming::from_minutes(24 * 60 + 1, 15).validate().is_err());
        assert!(MatchTiming::from_minutes(45, 24 * 60 + 1).validate().is_err());
        let huge: Result<MatchTiming, _> = toml::from_str(indoc!(
            r#"half_length = 9223372036854775807
               break_length = 900"#
        ));
        assert!(huge.unwrap().validate().is_err());
        assert!(AlertTiming::default().validate().is_ok());
        let alerts = AlertTiming {
            repeat_every: 0,
            ..Default::default()
        };
        assert!(alerts.validate().is_err());
        assert!(HeartRate::default().validate().is_ok());
        let hr = HeartRate {
            zone_limits: [0.6, 0.5, 0.8, 0.9],
            ..Default::default()
        };
        assert!(hr.validate().is_err());
        assert!(Heatmap::default().validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{TIMING_STRING}").unwrap();
        let timing: MatchTiming = load_from_file(file.path()).unwrap();
        assert_eq!(timing, MatchTiming::default());

        let missing = load_from_file::<MatchTiming, _>("/definitely/not/here.toml");
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
