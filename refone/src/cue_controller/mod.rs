use derivative::Derivative;
use log::*;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tokio::{
    sync::{
        mpsc::{UnboundedSender, unbounded_channel},
        watch::{self, Sender},
    },
    task::{self, JoinHandle},
};

mod cues;
pub use cues::*;

const BELL: &[u8] = b"\x07";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct CueSettings {
    #[derivative(Default(value = "true"))]
    pub enabled: bool,
    pub bell: bool,
}

/// Anything that can deliver a cue to the referee. Delivery must not block the caller.
pub trait CueSink {
    fn trigger(&self, cue: Cue);
}

pub struct CueController {
    msg_tx: UnboundedSender<Cue>,
    stop_tx: Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl CueController {
    /// Must be called from within a tokio runtime
    pub fn new(settings: CueSettings) -> Self {
        Self::with_output(settings, std::io::stdout())
    }

    pub fn with_output<W: Write + Send + 'static>(settings: CueSettings, mut output: W) -> Self {
        let (msg_tx, mut msg_rx) = unbounded_channel::<Cue>();

        let (stop_tx, mut stop_rx) = watch::channel(false);
        stop_rx.borrow_and_update();

        let handle = task::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    msg = msg_rx.recv() => {
                        match msg {
                            Some(cue) => play(cue, &settings, &mut output),
                            None => break,
                        }
                    }
                    _ = stop_rx.changed() => {
                        break;
                    }
                }
            }
        });

        Self {
            msg_tx,
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Stops the background task after it has played every cue already triggered
    pub async fn shutdown(mut self) {
        if self.stop_tx.send(true).is_err() {
            return;
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!("Cue controller task failed: {e}");
            }
        }
    }
}

impl CueSink for CueController {
    fn trigger(&self, cue: Cue) {
        if let Err(e) = self.msg_tx.send(cue) {
            error!("Failed to deliver cue {}", e.0);
        }
    }
}

impl Drop for CueController {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(true);
    }
}

fn play<W: Write>(cue: Cue, settings: &CueSettings, output: &mut W) {
    if !settings.enabled {
        trace!("Cues disabled, skipping {cue}");
        return;
    }
    let pattern = cue.haptic();
    info!("Cue: {cue} ({pattern})");
    if settings.bell {
        let result = (0..pattern.bells())
            .try_for_each(|_| output.write_all(BELL))
            .and_then(|_| output.flush());
        if let Err(e) = result {
            warn!("Couldn't ring the bell for {cue}: {e}");
        }
    }
}
