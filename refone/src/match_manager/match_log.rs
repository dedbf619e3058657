use super::{Duration, Instant, MatchPhase, OffsetDateTime, Side};
use serde::Serialize;
use std::cmp::Ordering;
use time::format_description::well_known::{Iso8601, iso8601};

const CONFIG: iso8601::EncodedConfig = iso8601::Config::DEFAULT
    .set_year_is_six_digits(false)
    .encode();
const FORMAT: Iso8601<CONFIG> = Iso8601::<CONFIG>;
time::serde::format_description!(iso8601_short_year, OffsetDateTime, FORMAT);

/// Wall clock record of what happened during a match, kept alongside the monotonic clocks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchLog {
    #[serde(with = "iso8601_short_year::option")]
    #[serde(rename = "startedAt")]
    start_timestamp: Option<OffsetDateTime>,
    #[serde(with = "iso8601_short_year::option")]
    #[serde(rename = "finishedAt")]
    end_timestamp: Option<OffsetDateTime>,
    events: Vec<Event>,
}

impl Default for MatchLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchLog {
    pub fn new() -> Self {
        Self {
            start_timestamp: None,
            end_timestamp: None,
            events: Vec::new(),
        }
    }

    pub(super) fn add_phase_change(&mut self, phase: MatchPhase, instant: Instant) {
        let occurred_on = calculate_timestamp(instant);
        match phase {
            MatchPhase::FirstHalf => self.start_timestamp = Some(occurred_on),
            MatchPhase::Finished => self.end_timestamp = Some(occurred_on),
            _ => {}
        }
        self.events.push(Event::PhaseChange { phase, occurred_on });
    }

    pub(super) fn add_clock_change(
        &mut self,
        running: bool,
        phase: MatchPhase,
        half_time: Duration,
        instant: Instant,
    ) {
        let occurred_on = calculate_timestamp(instant);
        let period_time = half_time.as_secs_f32();
        self.events.push(if running {
            Event::ClockResumed {
                phase,
                period_time,
                occurred_on,
            }
        } else {
            Event::ClockPaused {
                phase,
                period_time,
                occurred_on,
            }
        });
    }

    pub(super) fn add_goal(
        &mut self,
        side: Side,
        minute: u32,
        phase: MatchPhase,
        half_time: Duration,
        instant: Instant,
    ) {
        self.events.push(Event::Goal {
            side,
            minute,
            phase,
            period_time: half_time.as_secs_f32(),
            occurred_on: calculate_timestamp(instant),
        });
    }

    pub fn finished_at(&self) -> Option<OffsetDateTime> {
        self.end_timestamp
    }

    pub fn as_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "$type")]
enum Event {
    #[serde(rename = "phase")]
    PhaseChange {
        phase: MatchPhase,
        #[serde(with = "iso8601_short_year")]
        #[serde(rename = "occurredOn")]
        occurred_on: OffsetDateTime,
    },
    #[serde(rename = "paused")]
    ClockPaused {
        phase: MatchPhase,
        #[serde(rename = "periodTime")]
        period_time: f32,
        #[serde(with = "iso8601_short_year")]
        #[serde(rename = "occurredOn")]
        occurred_on: OffsetDateTime,
    },
    #[serde(rename = "resumed")]
    ClockResumed {
        phase: MatchPhase,
        #[serde(rename = "periodTime")]
        period_time: f32,
        #[serde(with = "iso8601_short_year")]
        #[serde(rename = "occurredOn")]
        occurred_on: OffsetDateTime,
    },
    #[serde(rename = "goal")]
    Goal {
        side: Side,
        minute: u32,
        phase: MatchPhase,
        #[serde(rename = "periodTime")]
        period_time: f32,
        #[serde(with = "iso8601_short_year")]
        #[serde(rename = "occurredOn")]
        occurred_on: OffsetDateTime,
    },
}

pub(crate) fn calculate_timestamp(instant: Instant) -> OffsetDateTime {
    let now = Instant::now();
    let mut timestamp = OffsetDateTime::now_utc();

    match instant.cmp(&now) {
        Ordering::Equal => {}
        Ordering::Less => {
            let duration = now - instant;
            timestamp -= duration;
        }
        Ordering::Greater => {
            let duration = instant - now;
            timestamp += duration;
        }
    }
    timestamp
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_timestamps_follow_phases() {
        let mut log = MatchLog::new();
        let start = Instant::now();
        log.add_phase_change(MatchPhase::FirstHalf, start);
        assert!(log.finished_at().is_none());
        log.add_phase_change(MatchPhase::Break, start + Duration::from_secs(60));
        log.add_phase_change(MatchPhase::SecondHalf, start + Duration::from_secs(90));
        log.add_phase_change(MatchPhase::Finished, start + Duration::from_secs(150));

        let (Some(started), Some(finished)) = (log.start_timestamp, log.finished_at()) else {
            panic!("Missing timestamps");
        };
        let length = finished - started;
        assert!(length.whole_seconds() >= 149 && length.whole_seconds() <= 151);
    }

    #[test]
    fn test_json_events() {
        let mut log = MatchLog::new();
        let start = Instant::now();
        log.add_phase_change(MatchPhase::FirstHalf, start);
        log.add_goal(
            Side::Away,
            3,
            MatchPhase::FirstHalf,
            Duration::from_secs(150),
            start + Duration::from_secs(150),
        );
        log.add_clock_change(
            false,
            MatchPhase::FirstHalf,
            Duration::from_secs(200),
            start + Duration::from_secs(200),
        );

        let json: serde_json::Value = serde_json::from_str(&log.as_json().unwrap()).unwrap();
        let events = json["events"].as_array().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0]["$type"], "phase");
        assert_eq!(events[0]["phase"], "FirstHalf");
        assert_eq!(events[1]["$type"], "goal");
        assert_eq!(events[1]["side"], "Away");
        assert_eq!(events[1]["minute"], 3);
        assert_eq!(events[2]["$type"], "paused");
        assert!(json["startedAt"].is_string());
        assert!(json["finishedAt"].is_null());
    }
}
