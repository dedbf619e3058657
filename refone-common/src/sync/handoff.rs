use super::{Result, SyncPayload};
use log::*;
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};
use time::OffsetDateTime;

const TO_WRIST: &str = "to-wrist";
const TO_PHONE: &str = "to-phone";
const PAYLOAD_EXT: &str = "json";
const TEMP_EXT: &str = "tmp";
const BAD_EXT: &str = "bad";

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Phone,
    Wrist,
}

impl Endpoint {
    fn outbox(self) -> &'static str {
        match self {
            Self::Phone => TO_WRIST,
            Self::Wrist => TO_PHONE,
        }
    }

    fn inbox(self) -> &'static str {
        match self {
            Self::Phone => TO_PHONE,
            Self::Wrist => TO_WRIST,
        }
    }
}

/// A store-and-forward channel between the two devices backed by a shared directory.
///
/// Each payload is one file. Writers create the file under a temporary name and rename it into
/// place, so a reader never sees half a payload. Readers get payloads in the order they were sent
/// and delete them with [`HandoffDir::ack`] once they have been dealt with, so a payload is never
/// lost between reading it and storing what it says.
#[derive(Debug, Clone)]
pub struct HandoffDir {
    root: PathBuf,
    endpoint: Endpoint,
}

/// A payload waiting in the inbox. The file stays in place until it is acknowledged.
#[derive(Debug, Clone, PartialEq)]
pub struct Received {
    pub payload: SyncPayload,
    path: PathBuf,
}

impl HandoffDir {
    pub fn open<P: AsRef<Path>>(root: P, endpoint: Endpoint) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(TO_WRIST))?;
        fs::create_dir_all(root.join(TO_PHONE))?;
        debug!("Opened handoff dir {root:?} as {endpoint:?}");
        Ok(Self { root, endpoint })
    }

    /// Queues `payload` for the other device and returns the path it was written to
    pub fn send(&self, payload: &SyncPayload) -> Result<PathBuf> {
        let dir = self.root.join(self.endpoint.outbox());
        let stem = format!(
            "{:024}-{:08}",
            OffsetDateTime::now_utc().unix_timestamp_nanos().max(0),
            SEQUENCE.fetch_add(1, Ordering::Relaxed)
        );
        let temp_path = dir.join(&stem).with_extension(TEMP_EXT);
        let final_path = dir.join(&stem).with_extension(PAYLOAD_EXT);

        fs::write(&temp_path, payload.to_json()?)?;
        fs::rename(&temp_path, &final_path)?;

        info!("Queued payload for transfer at {final_path:?}");
        Ok(final_path)
    }

    /// Reads every payload waiting for this device, oldest first, without removing any.
    ///
    /// Entries that can't be read are skipped and left where they are. Files that can't be
    /// decoded are renamed with a `.bad` extension. Only failing to list the inbox is an error.
    pub fn receive(&self) -> Result<Vec<Received>> {
        let dir = self.root.join(self.endpoint.inbox());

        let mut paths: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(e) => {
                    warn!("Failed to read handoff entry in {dir:?}: {e}");
                    None
                }
            })
            .filter(|path| path.extension().is_some_and(|ext| ext == PAYLOAD_EXT))
            .collect();
        paths.sort();

        let mut received = Vec::with_capacity(paths.len());
        for path in paths {
            let data = match fs::read(&path) {
                Ok(data) => data,
                Err(e) => {
                    warn!("Skipping unreadable payload {path:?}: {e}");
                    continue;
                }
            };
            match SyncPayload::from_json(&data) {
                Ok(payload) => {
                    debug!("Received payload from {path:?}");
                    received.push(Received { payload, path });
                }
                Err(e) => {
                    error!("Setting aside undecodable payload {path:?}: {e}");
                    if let Err(e) = fs::rename(&path, path.with_extension(BAD_EXT)) {
                        warn!("Failed to set aside {path:?}: {e}");
                    }
                }
            }
        }

        Ok(received)
    }

    /// Removes payloads whose contents have been stored. One that can't be removed is logged and
    /// will be received again.
    pub fn ack(&self, received: &[Received]) {
        for Received { path, .. } in received {
            match fs::remove_file(path) {
                Ok(()) => trace!("Removed delivered payload {path:?}"),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("Payload {path:?} was already removed");
                }
                Err(e) => warn!("Failed to remove delivered payload {path:?}: {e}"),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::super::test::{initialize, summary};
    use super::super::{MatchResult, SyncPayload};
    use super::*;
    use crate::bundles::HomeAwayBundle;
    use time::macros::datetime;
    use uuid::Uuid;

    fn result(n: u128) -> SyncPayload {
        SyncPayload::FinalResult(MatchResult {
            match_id: Uuid::from_u128(n),
            scores: HomeAwayBundle::new(1, 0),
            finished_at: datetime!(2026-10-20 19:50 UTC),
            workout_id: Some(Uuid::from_u128(99)),
        })
    }

    fn payloads(received: &[Received]) -> Vec<SyncPayload> {
        received.iter().map(|r| r.payload.clone()).collect()
    }

    #[test]
    fn test_phone_to_wrist() {
        initialize();
        let dir = tempfile::tempdir().unwrap();
        let phone = HandoffDir::open(dir.path(), Endpoint::Phone).unwrap();
        let wrist = HandoffDir::open(dir.path(), Endpoint::Wrist).unwrap();

        let list = SyncPayload::MatchList {
            matches: vec![summary(1)],
        };
        phone.send(&list).unwrap();

        // The sender never reads its own outbox
        assert_eq!(phone.receive().unwrap(), vec![]);
        let received = wrist.receive().unwrap();
        assert_eq!(payloads(&received), vec![list]);
        wrist.ack(&received);
        assert_eq!(wrist.receive().unwrap(), vec![]);
    }

    #[test]
    fn test_receive_keeps_send_order() {
        initialize();
        let dir = tempfile::tempdir().unwrap();
        let phone = HandoffDir::open(dir.path(), Endpoint::Phone).unwrap();
        let wrist = HandoffDir::open(dir.path(), Endpoint::Wrist).unwrap();

        for n in 0..5 {
            wrist.send(&result(n)).unwrap();
        }

        let received = phone.receive().unwrap();
        assert_eq!(payloads(&received), (0..5).map(result).collect::<Vec<_>>());
    }

    #[test]
    fn test_unacked_payloads_are_kept() {
        initialize();
        let dir = tempfile::tempdir().unwrap();
        let phone = HandoffDir::open(dir.path(), Endpoint::Phone).unwrap();
        let wrist = HandoffDir::open(dir.path(), Endpoint::Wrist).unwrap();

        wrist.send(&result(1)).unwrap();
        wrist.send(&result(2)).unwrap();

        let first = phone.receive().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(phone.receive().unwrap(), first);

        phone.ack(&first[..1]);
        assert_eq!(payloads(&phone.receive().unwrap()), vec![result(2)]);

        // Acknowledging twice is harmless
        phone.ack(&first);
        phone.ack(&first);
        assert_eq!(phone.receive().unwrap(), vec![]);
    }

    #[test]
    fn test_unreadable_entry_does_not_block_others() {
        initialize();
        let dir = tempfile::tempdir().unwrap();
        let phone = HandoffDir::open(dir.path(), Endpoint::Phone).unwrap();
        let wrist = HandoffDir::open(dir.path(), Endpoint::Wrist).unwrap();

        wrist.send(&result(1)).unwrap();
        let stuck = dir.path().join(TO_PHONE).join("zzzz.json");
        fs::create_dir(&stuck).unwrap();

        let received = phone.receive().unwrap();
        assert_eq!(payloads(&received), vec![result(1)]);
        phone.ack(&received);

        // Later syncs keep working and the entry is left alone
        wrist.send(&result(2)).unwrap();
        assert_eq!(payloads(&phone.receive().unwrap()), vec![result(2)]);
        assert!(stuck.is_dir());
    }

    #[test]
    fn test_bad_payloads_are_set_aside() {
        initialize();
        let dir = tempfile::tempdir().unwrap();
        let phone = HandoffDir::open(dir.path(), Endpoint::Phone).unwrap();
        let wrist = HandoffDir::open(dir.path(), Endpoint::Wrist).unwrap();

        let inbox = dir.path().join(TO_PHONE);
        fs::write(inbox.join("0-broken.json"), b"not json").unwrap();
        fs::write(inbox.join("1-partial.tmp"), b"{").unwrap();
        wrist.send(&result(3)).unwrap();

        let received = phone.receive().unwrap();
        assert_eq!(payloads(&received), vec![result(3)]);
        assert!(inbox.join("0-broken.bad").exists());
        assert!(inbox.join("1-partial.tmp").exists());

        phone.ack(&received);
        assert_eq!(phone.receive().unwrap(), vec![]);
    }
}
