use tokio::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
enum TrackerState {
    Stopped {
        accumulated: Duration,
    },
    Running {
        segment_start: Instant,
        accumulated: Duration,
    },
}

/// Counts up the time spent running, across any number of start/pause segments.
///
/// The elapsed value is always derived from the stored segment start and `now`, so it
/// does not matter how often (or how rarely) it is sampled.
#[derive(Debug, Clone, PartialEq)]
pub struct ElapsedTimeTracker {
    state: TrackerState,
}

impl Default for ElapsedTimeTracker {
    fn default() -> Self {
        Self {
            state: TrackerState::Stopped {
                accumulated: Duration::ZERO,
            },
        }
    }
}

impl ElapsedTimeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TrackerState::Running { .. })
    }

    /// Returns true if the tracker was started, false if it was already running
    pub fn start(&mut self, now: Instant) -> bool {
        if let TrackerState::Stopped { accumulated } = self.state {
            self.state = TrackerState::Running {
                segment_start: now,
                accumulated,
            };
            true
        } else {
            false
        }
    }

    /// Returns true if the tracker was paused, false if it was already stopped
    pub fn pause(&mut self, now: Instant) -> bool {
        if self.is_running() {
            self.state = TrackerState::Stopped {
                accumulated: self.elapsed(now),
            };
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self, now: Instant) {
        self.pause(now);
        self.state = TrackerState::Stopped {
            accumulated: Duration::ZERO,
        };
    }

    /// A `now` before the start of the running segment counts as no time at all
    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.state {
            TrackerState::Stopped { accumulated } => accumulated,
            TrackerState::Running {
                segment_start,
                accumulated,
            } => accumulated + now.saturating_duration_since(segment_start),
        }
    }
}
