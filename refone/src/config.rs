use crate::cue_controller::CueSettings;
use directories::ProjectDirs;
use refone_common::config::{ConfigError, Heatmap, HeartRate};
pub use refone_common::config::{AlertTiming, MatchTiming};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const APP_NAME: &str = "refone";

/// Where payloads are exchanged with the phone and where the last match list is kept.
/// Unset paths fall back to the platform data directory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handoff_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_file: Option<PathBuf>,
}

impl SyncSettings {
    pub fn handoff_dir(&self) -> PathBuf {
        self.handoff_dir
            .clone()
            .unwrap_or_else(|| data_dir().join("handoff"))
    }

    pub fn cache_file(&self) -> PathBuf {
        self.cache_file
            .clone()
            .unwrap_or_else(|| data_dir().join("matches.json"))
    }
}

pub fn data_dir() -> PathBuf {
    ProjectDirs::from("org", "RefONE", APP_NAME)
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(APP_NAME))
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub match_timing: MatchTiming,
    pub alerts: AlertTiming,
    pub cues: CueSettings,
    pub heart_rate: HeartRate,
    pub heatmap: Heatmap,
    pub sync: SyncSettings,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.match_timing.validate()?;
        self.alerts.validate()?;
        self.heart_rate.validate()?;
        self.heatmap.validate()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use indoc::indoc;
    use std::time::Duration;

    #[test]
    fn test_ser_sync() {
        let s = SyncSettings {
            handoff_dir: Some(PathBuf::from("/tmp/refone/handoff")),
            cache_file: None,
        };
        let serialized = toml::to_string(&s).unwrap();
        let deser = toml::from_str(&serialized);
        assert_eq!(deser, Ok(s));
    }

    #[test]
    fn test_ser_cues() {
        let c: CueSettings = Default::default();
        let serialized = toml::to_string(&c).unwrap();
        let deser = toml::from_str(&serialized);
        assert_eq!(deser, Ok(c));
    }

    #[test]
    fn test_ser_config() {
        let config: Config = Default::default();
        let serialized = toml::to_string(&config).unwrap();
        let deser = toml::from_str(&serialized);
        assert_eq!(deser, Ok(config));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let config: Config = toml::from_str(indoc! {r#"
            [match_timing]
            half_length = 1200
            break_length = 300

            [cues]
            bell = true

            [sync]
            handoff_dir = "/srv/refone"
        "#})
        .unwrap();

        assert_eq!(config.match_timing.half_length, Duration::from_secs(1200));
        assert_eq!(config.match_timing.break_length, Duration::from_secs(300));
        assert!(config.cues.enabled);
        assert!(config.cues.bell);
        assert_eq!(config.sync.handoff_dir(), PathBuf::from("/srv/refone"));
        assert_eq!(config.alerts, AlertTiming::default());
        assert!(config.sync.cache_file().ends_with("matches.json"));
    }

    #[test]
    fn test_invalid_config() {
        let config = Config {
            alerts: AlertTiming {
                repeat_every: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
