//! Payloads exchanged between the phone and the wrist device, and the file based channel that
//! carries them.
//!
//! Payloads are replaced wholesale on every sync and carry no version field.

use crate::{bundles::HomeAwayBundle, color::KitColor, config::MatchTiming, side::Side};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

mod cache;
pub use cache::MatchListCache;

mod handoff;
pub use handoff::{Endpoint, HandoffDir, Received};

pub mod schedule;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Handoff I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Payload encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Schedule parse error: {0}")]
    Schedule(#[from] toml::de::Error),
    #[error("Schedule encode error: {0}")]
    ScheduleEncode(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct TeamInfo {
    pub name: String,
    pub acronym: String,
    pub color: KitColor,
}

/// The lightweight description of a scheduled match that the wrist device needs to run it
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub id: Uuid,
    pub home: TeamInfo,
    pub away: TeamInfo,
    pub stadium: String,
    #[serde(with = "time::serde::rfc3339")]
    pub kickoff: OffsetDateTime,
    pub category: String,
    pub half_minutes: u32,
    pub break_minutes: u32,
    pub workout_id: Option<Uuid>,
}

impl MatchSummary {
    pub fn timing(&self) -> MatchTiming {
        MatchTiming::from_minutes(self.half_minutes, self.break_minutes)
    }

    pub fn team(&self, side: Side) -> &TeamInfo {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }
}

impl core::fmt::Display for MatchSummary {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{} vs {} ({}) at {}, {}",
            self.home.acronym,
            self.away.acronym,
            self.category,
            self.stadium,
            self.kickoff.date()
        )
    }
}

/// The final score sent back from the wrist device once a match is over
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: Uuid,
    pub scores: HomeAwayBundle<u8>,
    #[serde(with = "time::serde::timestamp")]
    pub finished_at: OffsetDateTime,
    pub workout_id: Option<Uuid>,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SyncPayload {
    MatchList { matches: Vec<MatchSummary> },
    FinalResult(MatchResult),
}

impl SyncPayload {
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use std::sync::Once;
    use time::macros::datetime;

    static INIT: Once = Once::new();

    pub(crate) fn initialize() {
        INIT.call_once(|| {
            env_logger::init();
        });
    }

    pub(crate) fn summary(n: u128) -> MatchSummary {
        MatchSummary {
            id: Uuid::from_u128(n),
            home: TeamInfo {
                name: "Lions".to_string(),
                acronym: "LIO".to_string(),
                color: KitColor::new(0xFF, 0, 0),
            },
            away: TeamInfo {
                name: "Bears".to_string(),
                acronym: "BEA".to_string(),
                color: KitColor::WHITE,
            },
            stadium: "North Field".to_string(),
            kickoff: datetime!(2026-10-20 18:00 UTC),
            category: "Juvenil".to_string(),
            half_minutes: 40,
            break_minutes: 10,
            workout_id: None,
        }
    }

    #[test]
    fn test_summary_timing() {
        let timing = summary(1).timing();
        assert_eq!(timing, MatchTiming::from_minutes(40, 10));
        assert_eq!(summary(1).team(Side::Away).acronym, "BEA");
        assert_eq!(
            summary(1).to_string(),
            "LIO vs BEA (Juvenil) at North Field, 2026-10-20"
        );
    }

    #[test]
    fn test_result_payload_shape() {
        let payload = SyncPayload::FinalResult(MatchResult {
            match_id: Uuid::from_u128(7),
            scores: HomeAwayBundle::new(2, 1),
            finished_at: datetime!(2026-10-20 19:50 UTC),
            workout_id: None,
        });
        let value: serde_json::Value = serde_json::from_slice(&payload.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "finalResult");
        assert_eq!(value["scores"]["home"], 2);
        assert_eq!(value["scores"]["away"], 1);
        assert_eq!(value["finished_at"], 1792525800);
        assert!(value["workout_id"].is_null());
    }

    #[test]
    fn test_match_list_decode() {
        let payload = SyncPayload::MatchList {
            matches: vec![summary(1), summary(2)],
        };
        let json = payload.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["type"], "matchList");
        assert_eq!(value["matches"][0]["kickoff"], "2026-10-20T18:00:00Z");
        assert_eq!(value["matches"][0]["home"]["color"], "#FF0000");
        assert_eq!(SyncPayload::from_json(&json).unwrap(), payload);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(matches!(
            SyncPayload::from_json(b"{\"type\":\"somethingElse\"}"),
            Err(SyncError::Json(_))
        ));
    }
}
