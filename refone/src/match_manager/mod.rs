use crate::cue_controller::Cue;
use enum_derive_2018::EnumDisplay;
use log::*;
use macro_attr_2018::macro_attr;
use refone_common::{
    bundles::HomeAwayBundle,
    config::{AlertTiming, MatchTiming},
    match_snapshot::{ClockDisplay, GoalSnapshot, MatchPhase, MatchSnapshot},
    side::Side,
};
use std::collections::VecDeque;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::time::{Duration, Instant};
use uuid::Uuid;

mod alerts;
use alerts::*;

mod match_log;
pub use match_log::MatchLog;

pub mod stopwatch;
use stopwatch::ElapsedTimeTracker;

macro_attr! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, EnumDisplay!)]
    pub enum Action {
        StartMatch,
        ToggleClock,
        EndHalf,
        EndBreak,
        EndMatch,
        ScoreGoal,
    }
}

#[derive(Debug)]
pub struct MatchManager {
    timing: MatchTiming,
    repeat_every: u32,
    phase: MatchPhase,
    game_clock: ElapsedTimeTracker,
    break_clock: ElapsedTimeTracker,
    scores: HomeAwayBundle<u8>,
    goals: Vec<GoalSnapshot>,
    alerts: AlertState,
    pending_cues: VecDeque<Cue>,
    workout_id: Option<Uuid>,
    log: MatchLog,
}

impl MatchManager {
    pub fn new(timing: MatchTiming, alerts: &AlertTiming) -> Self {
        Self {
            timing,
            repeat_every: alerts.repeat_every,
            phase: MatchPhase::PreMatch,
            game_clock: ElapsedTimeTracker::new(),
            break_clock: ElapsedTimeTracker::new(),
            scores: Default::default(),
            goals: Vec::new(),
            alerts: AlertState::default(),
            pending_cues: VecDeque::new(),
            workout_id: None,
            log: MatchLog::new(),
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn timing(&self) -> &MatchTiming {
        &self.timing
    }

    pub fn clock_is_running(&self) -> bool {
        self.game_clock.is_running()
    }

    pub fn get_scores(&self) -> HomeAwayBundle<u8> {
        self.scores
    }

    pub fn goals(&self) -> &[GoalSnapshot] {
        &self.goals
    }

    pub fn log(&self) -> &MatchLog {
        &self.log
    }

    pub fn workout_id(&self) -> Option<Uuid> {
        self.workout_id
    }

    pub fn set_workout_id(&mut self, id: Option<Uuid>) {
        self.workout_id = id;
    }

    /// Cues raised since the last call, oldest first
    pub fn drain_cues(&mut self) -> impl Iterator<Item = Cue> + '_ {
        self.pending_cues.drain(..)
    }

    pub fn game_clock_time(&self, now: Instant) -> Duration {
        self.game_clock.elapsed(now)
    }

    pub fn break_clock_time(&self, now: Instant) -> Duration {
        self.break_clock.elapsed(now)
    }

    pub fn start_match(&mut self, now: Instant) -> Result<()> {
        self.require_phase(Action::StartMatch, MatchPhase::PreMatch)?;
        self.set_phase(MatchPhase::FirstHalf, now);
        self.alerts.reset();
        self.start_game_clock(now);
        self.pending_cues.push_back(Cue::Start);
        Ok(())
    }

    pub fn toggle_clock(&mut self, now: Instant) -> Result<()> {
        if !self.phase.is_half() {
            return Err(MatchManagerError::WrongPhase(Action::ToggleClock, self.phase));
        }
        if self.game_clock.is_running() {
            self.stop_game_clock(now);
        } else {
            self.start_game_clock(now);
            self.alerts.clock_resumed();
        }
        self.log.add_clock_change(
            self.game_clock.is_running(),
            self.phase,
            self.game_clock.elapsed(now),
            now,
        );
        self.pending_cues.push_back(Cue::Click);
        Ok(())
    }

    pub fn end_half(&mut self, now: Instant) -> Result<()> {
        self.require_phase(Action::EndHalf, MatchPhase::FirstHalf)?;
        self.stop_game_clock(now);
        self.set_phase(MatchPhase::Break, now);
        self.alerts.reset();
        self.break_clock.reset(now);
        self.break_clock.start(now);
        self.pending_cues.push_back(Cue::Stop);
        Ok(())
    }

    pub fn end_break(&mut self, now: Instant) -> Result<()> {
        self.require_phase(Action::EndBreak, MatchPhase::Break)?;
        self.break_clock.pause(now);
        self.game_clock.reset(now);
        self.set_phase(MatchPhase::SecondHalf, now);
        self.alerts.reset();
        self.pending_cues.push_back(Cue::Click);
        Ok(())
    }

    pub fn end_match(&mut self, now: Instant) -> Result<()> {
        self.require_phase(Action::EndMatch, MatchPhase::SecondHalf)?;
        self.stop_game_clock(now);
        self.set_phase(MatchPhase::Finished, now);
        self.pending_cues.push_back(Cue::Success);
        Ok(())
    }

    pub fn score_goal(&mut self, side: Side, now: Instant) -> Result<GoalSnapshot> {
        let elapsed = self.game_clock.elapsed(now);
        let minute = self
            .phase
            .goal_minute(elapsed, &self.timing)
            .ok_or(MatchManagerError::WrongPhase(Action::ScoreGoal, self.phase))?;
        let score = self.scores[side]
            .checked_add(1)
            .ok_or(MatchManagerError::ScoreOverflow(side))?;

        self.scores[side] = score;
        let goal = GoalSnapshot {
            side,
            minute,
            phase: self.phase,
        };
        self.goals.push(goal);
        self.log.add_goal(side, minute, self.phase, elapsed, now);
        info!(
            "{} Goal for {side} in minute {minute}, scores now {}",
            self.status_string(now),
            self.scores
        );
        self.pending_cues.push_back(Cue::Notification);
        Ok(goal)
    }

    /// The periodic check. Never changes the clocks, only the alert counters.
    pub fn check_alerts(&mut self, now: Instant) {
        let cue = self.alerts.check(CheckInput {
            phase: self.phase,
            clock_running: self.game_clock.is_running(),
            game_elapsed: self.game_clock.elapsed(now),
            break_elapsed: self.break_clock.elapsed(now),
            timing: &self.timing,
            repeat_every: self.repeat_every,
        });
        if let Some(cue) = cue {
            debug!("{} Raising alert {cue}", self.status_string(now));
            self.pending_cues.push_back(cue);
        }
    }

    pub fn clock_display(&self, now: Instant) -> ClockDisplay {
        ClockDisplay::new(
            self.phase,
            self.game_clock.elapsed(now),
            self.break_clock.elapsed(now),
            &self.timing,
        )
    }

    pub fn generate_snapshot(&self, now: Instant) -> MatchSnapshot {
        trace!("Generating snapshot");
        MatchSnapshot {
            phase: self.phase,
            clock: self.clock_display(now),
            clock_running: self.game_clock.is_running(),
            scores: self.scores,
            goals: self.goals.clone(),
        }
    }

    /// Wall clock time the match finished, or `None` while it is still going
    pub fn finished_at(&self) -> Option<OffsetDateTime> {
        if self.phase == MatchPhase::Finished {
            self.log.finished_at()
        } else {
            None
        }
    }

    fn require_phase(&self, action: Action, phase: MatchPhase) -> Result<()> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(MatchManagerError::WrongPhase(action, self.phase))
        }
    }

    fn set_phase(&mut self, phase: MatchPhase, now: Instant) {
        info!("{} Entering {phase}", self.status_string(now));
        self.phase = phase;
        self.log.add_phase_change(phase, now);
    }

    fn start_game_clock(&mut self, now: Instant) {
        if self.game_clock.start(now) {
            info!("{} Starting the game clock", self.status_string(now));
        }
    }

    fn stop_game_clock(&mut self, now: Instant) {
        if self.game_clock.pause(now) {
            info!("{} Stopping the game clock", self.status_string(now));
        }
    }

    fn status_string(&self, now: Instant) -> String {
        let time = match self.phase {
            MatchPhase::Break => self.break_clock.elapsed(now),
            _ => self.game_clock.elapsed(now),
        }
        .as_secs_f64();

        format!(
            "[{:02.0}:{:06.3} {}]",
            (time / 60.0).floor(),
            time % 60.0,
            match self.phase {
                MatchPhase::PreMatch => "PREMTCH",
                MatchPhase::FirstHalf => "FRSTHLF",
                MatchPhase::Break => "HLFTIME",
                MatchPhase::SecondHalf => "SCNDHLF",
                MatchPhase::Finished => "FINISHD",
            }
        )
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum MatchManagerError {
    #[error("Can't {0} during {1}")]
    WrongPhase(Action, MatchPhase),
    #[error("The {0} score can't go any higher")]
    ScoreOverflow(Side),
}

pub type Result<T> = std::result::Result<T, MatchManagerError>;
