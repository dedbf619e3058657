use crate::{
    bundles::HomeAwayBundle, config::MatchTiming, drawing_support::time_string, side::Side,
};
use core::time::Duration;
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Serialize, Deserialize, Sequence,
)]
pub enum MatchPhase {
    PreMatch,
    FirstHalf,
    Break,
    SecondHalf,
    Finished,
}

impl MatchPhase {
    pub fn next_phase(self) -> Option<MatchPhase> {
        match self {
            Self::PreMatch => Some(Self::FirstHalf),
            Self::FirstHalf => Some(Self::Break),
            Self::Break => Some(Self::SecondHalf),
            Self::SecondHalf => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    /// True for the phases where the ball is in play and goals can be scored
    pub fn is_half(self) -> bool {
        matches!(self, Self::FirstHalf | Self::SecondHalf)
    }

    /// Number of regulation halves completed before this phase starts
    fn halves_before(self) -> u32 {
        match self {
            Self::PreMatch | Self::FirstHalf => 0,
            Self::Break | Self::SecondHalf => 1,
            Self::Finished => 2,
        }
    }

    /// The minute of the match a goal scored now belongs to, or `None` outside a half.
    ///
    /// Minutes are 1-based: the first sixty seconds of a half are minute `base + 1`.
    pub fn goal_minute(self, elapsed: Duration, timing: &MatchTiming) -> Option<u32> {
        if !self.is_half() {
            return None;
        }
        let base = self.halves_before() * timing.half_minutes();
        let played = u32::try_from(elapsed.as_secs() / 60).unwrap_or(u32::MAX);
        Some(base.saturating_add(played).saturating_add(1))
    }
}

impl core::fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            MatchPhase::PreMatch => write!(f, "Pre Match"),
            MatchPhase::FirstHalf => write!(f, "First Half"),
            MatchPhase::Break => write!(f, "Break"),
            MatchPhase::SecondHalf => write!(f, "Second Half"),
            MatchPhase::Finished => write!(f, "Finished"),
        }
    }
}

/// What the main clock face shows. Added time is a way of drawing a half, not a phase.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ClockDisplay {
    Idle,
    Regulation {
        elapsed: Duration,
        total: Option<Duration>,
    },
    AddedTime {
        base: Duration,
        added: Duration,
    },
    Break {
        elapsed: Duration,
        exceeded: bool,
    },
    FullTime,
}

impl ClockDisplay {
    pub fn new(
        phase: MatchPhase,
        game_elapsed: Duration,
        break_elapsed: Duration,
        timing: &MatchTiming,
    ) -> Self {
        match phase {
            MatchPhase::PreMatch => Self::Idle,
            p @ MatchPhase::FirstHalf | p @ MatchPhase::SecondHalf => {
                let regulation_before = timing.half_length.saturating_mul(p.halves_before());
                if game_elapsed < timing.half_length {
                    Self::Regulation {
                        elapsed: game_elapsed,
                        total: (p == MatchPhase::SecondHalf)
                            .then(|| regulation_before.saturating_add(game_elapsed)),
                    }
                } else {
                    Self::AddedTime {
                        base: regulation_before.saturating_add(timing.half_length),
                        added: game_elapsed - timing.half_length,
                    }
                }
            }
            MatchPhase::Break => Self::Break {
                elapsed: break_elapsed,
                exceeded: break_elapsed > timing.break_length,
            },
            MatchPhase::Finished => Self::FullTime,
        }
    }
}

impl core::fmt::Display for ClockDisplay {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Self::Idle => write!(f, "00:00"),
            Self::Regulation {
                elapsed,
                total: None,
            } => write!(f, "{}", time_string(elapsed)),
            Self::Regulation {
                elapsed,
                total: Some(total),
            } => write!(f, "{} ({})", time_string(elapsed), time_string(total)),
            Self::AddedTime { base, added } => {
                write!(f, "{} +{}", time_string(base), time_string(added))
            }
            Self::Break {
                elapsed,
                exceeded: false,
            } => write!(f, "{} BREAK", time_string(elapsed)),
            Self::Break {
                elapsed,
                exceeded: true,
            } => write!(f, "{} BREAK EXCEEDED", time_string(elapsed)),
            Self::FullTime => write!(f, "FULL TIME"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct GoalSnapshot {
    pub side: Side,
    pub minute: u32,
    pub phase: MatchPhase,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MatchSnapshot {
    pub phase: MatchPhase,
    pub clock: ClockDisplay,
    pub clock_running: bool,
    pub scores: HomeAwayBundle<u8>,
    pub goals: Vec<GoalSnapshot>,
}
