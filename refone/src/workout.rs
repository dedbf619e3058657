use log::*;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorkoutError {
    #[error("The workout session has already been started")]
    AlreadyStarted,
    #[error("The workout session is not running")]
    NotRunning,
    #[error("The workout session is not paused")]
    NotPaused,
    #[error("The workout session has already finished")]
    Finished,
}

/// The fitness recording that runs alongside a match. Failures here never stop the match.
pub trait WorkoutSession {
    fn start(&mut self) -> Result<(), WorkoutError>;
    fn pause(&mut self) -> Result<(), WorkoutError>;
    fn resume(&mut self) -> Result<(), WorkoutError>;
    /// Returns the id the recording was saved under, if it was saved
    fn finish(&mut self) -> Result<Option<Uuid>, WorkoutError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkoutState {
    Idle,
    Recording,
    Paused,
    Finished,
}

/// A recorder with no fitness backend. It tracks the session state, logs each call and
/// hands out a fresh id when the session ends.
#[derive(Debug)]
pub struct LoggedWorkout {
    state: WorkoutState,
    started_at: Option<OffsetDateTime>,
}

impl Default for LoggedWorkout {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggedWorkout {
    pub fn new() -> Self {
        Self {
            state: WorkoutState::Idle,
            started_at: None,
        }
    }

    fn transition(&mut self, from: WorkoutState, to: WorkoutState) -> Result<(), WorkoutError> {
        if self.state == from {
            self.state = to;
            Ok(())
        } else {
            Err(match self.state {
                WorkoutState::Finished => WorkoutError::Finished,
                WorkoutState::Recording | WorkoutState::Paused if from == WorkoutState::Idle => {
                    WorkoutError::AlreadyStarted
                }
                _ if from == WorkoutState::Paused => WorkoutError::NotPaused,
                _ => WorkoutError::NotRunning,
            })
        }
    }
}

impl WorkoutSession for LoggedWorkout {
    fn start(&mut self) -> Result<(), WorkoutError> {
        self.transition(WorkoutState::Idle, WorkoutState::Recording)?;
        self.started_at = Some(OffsetDateTime::now_utc());
        info!("Workout session started");
        Ok(())
    }

    fn pause(&mut self) -> Result<(), WorkoutError> {
        self.transition(WorkoutState::Recording, WorkoutState::Paused)?;
        info!("Workout session paused");
        Ok(())
    }

    fn resume(&mut self) -> Result<(), WorkoutError> {
        self.transition(WorkoutState::Paused, WorkoutState::Recording)?;
        info!("Workout session resumed");
        Ok(())
    }

    fn finish(&mut self) -> Result<Option<Uuid>, WorkoutError> {
        match self.state {
            WorkoutState::Recording | WorkoutState::Paused => {
                self.state = WorkoutState::Finished;
                let id = Uuid::new_v4();
                let length = self
                    .started_at
                    .map(|start| OffsetDateTime::now_utc() - start)
                    .unwrap_or_default();
                info!(
                    "Workout session finished after {}s, saved as {id}",
                    length.whole_seconds()
                );
                Ok(Some(id))
            }
            WorkoutState::Idle => Err(WorkoutError::NotRunning),
            WorkoutState::Finished => Err(WorkoutError::Finished),
        }
    }
}
