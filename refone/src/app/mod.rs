use crate::{
    cue_controller::CueSink,
    match_manager::{MatchLog, MatchManager},
    workout::WorkoutSession,
};
use log::*;
use refone_common::{
    config::{AlertTiming, MatchTiming},
    match_snapshot::MatchSnapshot,
    sync::{MatchResult, MatchSummary},
};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    sync::mpsc::{UnboundedReceiver, UnboundedSender},
    task::{self, JoinHandle},
    time::{Instant, MissedTickBehavior, interval},
};
use uuid::Uuid;

pub mod message;
pub use message::Message;

pub mod view;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Finished,
    Quit,
}

/// One match being refereed: the manager plus the collaborators its transitions drive
pub struct LiveSession<C: CueSink, W: WorkoutSession> {
    manager: MatchManager,
    cues: C,
    workout: W,
    summary: Option<MatchSummary>,
    match_id: Uuid,
}

impl<C: CueSink, W: WorkoutSession> LiveSession<C, W> {
    /// A match picked from the synced list runs with that match's timings and id
    pub fn for_match(summary: MatchSummary, alerts: &AlertTiming, cues: C, workout: W) -> Self {
        let mut manager = MatchManager::new(summary.timing(), alerts);
        manager.set_workout_id(summary.workout_id);
        Self {
            manager,
            cues,
            workout,
            match_id: summary.id,
            summary: Some(summary),
        }
    }

    /// A match that isn't on any schedule gets a fresh id
    pub fn ad_hoc(timing: MatchTiming, alerts: &AlertTiming, cues: C, workout: W) -> Self {
        Self {
            manager: MatchManager::new(timing, alerts),
            cues,
            workout,
            summary: None,
            match_id: Uuid::new_v4(),
        }
    }

    pub fn manager(&self) -> &MatchManager {
        &self.manager
    }

    pub fn summary(&self) -> Option<&MatchSummary> {
        self.summary.as_ref()
    }

    pub fn log(&self) -> &MatchLog {
        self.manager.log()
    }

    pub fn snapshot(&self, now: Instant) -> MatchSnapshot {
        self.manager.generate_snapshot(now)
    }

    pub fn handle(&mut self, message: Message, now: Instant) -> Flow {
        let outcome = match message {
            Message::StartMatch => self.manager.start_match(now).map(|_| {
                workout_call("start", self.workout.start());
                Flow::Continue
            }),
            Message::ToggleClock => self.manager.toggle_clock(now).map(|_| {
                if self.manager.clock_is_running() {
                    workout_call("resume", self.workout.resume());
                } else {
                    workout_call("pause", self.workout.pause());
                }
                Flow::Continue
            }),
            Message::EndHalf => self.manager.end_half(now).map(|_| {
                workout_call("pause", self.workout.pause());
                Flow::Continue
            }),
            Message::EndBreak => self.manager.end_break(now).map(|_| Flow::Continue),
            Message::EndMatch => self.manager.end_match(now).map(|_| {
                match self.workout.finish() {
                    Ok(Some(id)) => self.manager.set_workout_id(Some(id)),
                    Ok(None) => {}
                    Err(e) => warn!("Workout session couldn't finish: {e}"),
                }
                Flow::Finished
            }),
            Message::Goal(side) => self.manager.score_goal(side, now).map(|_| Flow::Continue),
            Message::Quit => {
                info!("Leaving the match in {}", self.manager.phase());
                Ok(Flow::Quit)
            }
        };

        self.forward_cues();
        outcome.unwrap_or_else(|e| {
            warn!("Ignoring {message:?}: {e}");
            Flow::Continue
        })
    }

    pub fn check(&mut self, now: Instant) {
        self.manager.check_alerts(now);
        self.forward_cues();
    }

    /// The payload for the phone, once the match is over
    pub fn result(&self) -> Option<MatchResult> {
        Some(MatchResult {
            match_id: self.match_id,
            scores: self.manager.get_scores(),
            finished_at: self.manager.finished_at()?,
            workout_id: self.manager.workout_id(),
        })
    }

    fn forward_cues(&mut self) {
        for cue in self.manager.drain_cues() {
            self.cues.trigger(cue);
        }
    }
}

fn workout_call(what: &str, result: Result<(), crate::workout::WorkoutError>) {
    if let Err(e) = result {
        warn!("Workout session couldn't {what}: {e}");
    }
}

/// Drives a session until the match finishes or the referee quits. All state is touched
/// from this one task; `render` is called on every display tick and after every message.
pub async fn run_session<C, W, F>(
    session: &mut LiveSession<C, W>,
    mut msg_rx: UnboundedReceiver<Message>,
    alerts: &AlertTiming,
    mut render: F,
) -> Option<MatchResult>
where
    C: CueSink,
    W: WorkoutSession,
    F: FnMut(&MatchSnapshot, Option<&MatchSummary>),
{
    let mut display = interval(alerts.display_tick);
    display.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut check = interval(alerts.check_tick);
    check.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            msg = msg_rx.recv() => {
                let now = Instant::now();
                let message = msg.unwrap_or(Message::Quit);
                let flow = session.handle(message, now);
                render(&session.snapshot(now), session.summary());
                match flow {
                    Flow::Continue => {}
                    Flow::Finished => return session.result(),
                    Flow::Quit => return None,
                }
            }
            _ = check.tick() => {
                session.check(Instant::now());
            }
            _ = display.tick() => {
                render(&session.snapshot(Instant::now()), session.summary());
            }
        }
    }
}

/// Reads commands line by line and forwards them to the session. Lines that don't parse
/// are reported and skipped; the end of input quits the session.
pub fn spawn_input_reader<R>(input: R, tx: UnboundedSender<Message>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    task::spawn(async move {
        let mut lines = BufReader::new(input).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match line.parse::<Message>() {
                        Ok(message) => {
                            if tx.send(message).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("{e}");
                            eprintln!("{e}\n{}", message::HELP);
                        }
                    }
                }
                Ok(None) => {
                    let _ = tx.send(Message::Quit);
                    break;
                }
                Err(e) => {
                    error!("Failed to read input: {e}");
                    let _ = tx.send(Message::Quit);
                    break;
                }
            }
        }
    })
}
