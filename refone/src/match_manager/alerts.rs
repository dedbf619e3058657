use crate::cue_controller::Cue;
use refone_common::{config::MatchTiming, match_snapshot::MatchPhase};
use tokio::time::Duration;

/// Counters behind the cues raised by the periodic check tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct AlertState {
    paused_ticks: u32,
    break_overrun_ticks: u32,
    regulation_cue_fired: bool,
}

pub(super) struct CheckInput<'a> {
    pub phase: MatchPhase,
    pub clock_running: bool,
    pub game_elapsed: Duration,
    pub break_elapsed: Duration,
    pub timing: &'a MatchTiming,
    pub repeat_every: u32,
}

impl AlertState {
    /// Called on every entry into a half or the break
    pub(super) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(super) fn clock_resumed(&mut self) {
        self.paused_ticks = 0;
    }

    pub(super) fn check(&mut self, input: CheckInput<'_>) -> Option<Cue> {
        let repeat_every = input.repeat_every.max(1);
        match input.phase {
            MatchPhase::FirstHalf | MatchPhase::SecondHalf if input.clock_running => {
                if !self.regulation_cue_fired && input.game_elapsed >= input.timing.half_length {
                    self.regulation_cue_fired = true;
                    Some(Cue::RegulationEnd)
                } else {
                    None
                }
            }
            MatchPhase::FirstHalf | MatchPhase::SecondHalf => {
                self.paused_ticks = self.paused_ticks.saturating_add(1);
                (self.paused_ticks % repeat_every == 0).then_some(Cue::PausedTooLong)
            }
            MatchPhase::Break if input.break_elapsed > input.timing.break_length => {
                self.break_overrun_ticks = self.break_overrun_ticks.saturating_add(1);
                (self.break_overrun_ticks % repeat_every == 0).then_some(Cue::BreakOverrun)
            }
            MatchPhase::PreMatch | MatchPhase::Break | MatchPhase::Finished => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn input(
        phase: MatchPhase,
        clock_running: bool,
        game_secs: u64,
        break_secs: u64,
        timing: &MatchTiming,
    ) -> CheckInput<'_> {
        CheckInput {
            phase,
            clock_running,
            game_elapsed: Duration::from_secs(game_secs),
            break_elapsed: Duration::from_secs(break_secs),
            timing,
            repeat_every: 10,
        }
    }

    #[test]
    fn test_regulation_end_fires_once() {
        let timing = MatchTiming::from_minutes(1, 1);
        let mut state = AlertState::default();

        assert_eq!(state.check(input(MatchPhase::FirstHalf, true, 59, 0, &timing)), None);
        assert_eq!(
            state.check(input(MatchPhase::FirstHalf, true, 60, 0, &timing)),
            Some(Cue::RegulationEnd)
        );
        for secs in 61..200 {
            assert_eq!(state.check(input(MatchPhase::FirstHalf, true, secs, 0, &timing)), None);
        }

        state.reset();
        assert_eq!(
            state.check(input(MatchPhase::SecondHalf, true, 75, 0, &timing)),
            Some(Cue::RegulationEnd)
        );
    }

    #[test]
    fn test_paused_repeats() {
        let timing = MatchTiming::default();
        let mut state = AlertState::default();

        let fired: Vec<_> = (1..=30)
            .filter(|_| {
                state
                    .check(input(MatchPhase::FirstHalf, false, 100, 0, &timing))
                    .is_some()
            })
            .collect();
        assert_eq!(fired, vec![10, 20, 30]);

        for _ in 0..5 {
            state.check(input(MatchPhase::FirstHalf, false, 100, 0, &timing));
        }
        state.clock_resumed();
        let first = (1..=10)
            .find(|_| {
                state
                    .check(input(MatchPhase::FirstHalf, false, 100, 0, &timing))
                    .is_some()
            });
        assert_eq!(first, Some(10));
    }

    #[test]
    fn test_break_overrun() {
        let timing = MatchTiming::from_minutes(45, 15);
        let mut state = AlertState::default();

        for _ in 0..20 {
            assert_eq!(state.check(input(MatchPhase::Break, false, 0, 900, &timing)), None);
        }
        let cues: Vec<_> = (1..=20)
            .map(|n| state.check(input(MatchPhase::Break, false, 0, 900 + n, &timing)))
            .collect();
        assert_eq!(cues[8], None);
        assert_eq!(cues[9], Some(Cue::BreakOverrun));
        assert_eq!(cues[19], Some(Cue::BreakOverrun));
        assert_eq!(cues.iter().flatten().count(), 2);
    }

    #[test]
    fn test_quiet_phases() {
        let timing = MatchTiming::from_minutes(1, 1);
        let mut state = AlertState::default();
        for _ in 0..50 {
            assert_eq!(state.check(input(MatchPhase::PreMatch, false, 0, 0, &timing)), None);
            assert_eq!(state.check(input(MatchPhase::Finished, false, 90, 90, &timing)), None);
        }
    }
}
