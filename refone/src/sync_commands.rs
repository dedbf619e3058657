use log::*;
use refone_common::{
    config::MatchTiming,
    sync::{
        HandoffDir, MatchListCache, MatchResult, MatchSummary, Result, SyncPayload,
        schedule::Schedule,
    },
};
use std::path::Path;

/// Phone side: sends every unplayed match of the schedule to the wrist. The schedule file is
/// written back so generated match ids stay stable between pushes.
pub fn push_schedule<P: AsRef<Path>>(
    schedule_path: P,
    handoff: &HandoffDir,
    default_timing: &MatchTiming,
) -> Result<Vec<MatchSummary>> {
    let schedule_path = schedule_path.as_ref();
    let schedule = Schedule::load(schedule_path)?;
    schedule.save(schedule_path)?;

    let matches = schedule.upcoming(default_timing);
    let sent = handoff.send(&SyncPayload::MatchList {
        matches: matches.clone(),
    })?;
    info!("Pushed {} matches to the wrist in {sent:?}", matches.len());
    Ok(matches)
}

/// Phone side: applies every result received from the wrist to the schedule. Results are only
/// removed from the handoff dir once the schedule has been saved.
pub fn collect_results<P: AsRef<Path>>(
    schedule_path: P,
    handoff: &HandoffDir,
) -> Result<Vec<MatchResult>> {
    let schedule_path = schedule_path.as_ref();
    let mut schedule = Schedule::load(schedule_path)?;
    collect_into(&mut schedule, handoff, |schedule| schedule.save(schedule_path))
}

fn collect_into<F>(
    schedule: &mut Schedule,
    handoff: &HandoffDir,
    save: F,
) -> Result<Vec<MatchResult>>
where
    F: FnOnce(&Schedule) -> Result<()>,
{
    let received = handoff.receive()?;

    let mut applied = Vec::new();
    for item in &received {
        match &item.payload {
            SyncPayload::FinalResult(result) => {
                if schedule.apply_result(result) {
                    applied.push(result.clone());
                }
            }
            SyncPayload::MatchList { .. } => {
                warn!("Ignoring a match list sent to the phone");
            }
        }
    }

    if !applied.is_empty() {
        save(schedule)?;
    }
    handoff.ack(&received);
    Ok(applied)
}

/// Wrist side: the newest match list received replaces the cached one wholesale. Anything
/// that goes wrong leaves the cache as it was, and a list that couldn't be cached is received
/// again on the next refresh.
pub fn refresh_match_list(handoff: &HandoffDir, cache: &MatchListCache) -> Vec<MatchSummary> {
    let received = match handoff.receive() {
        Ok(received) => received,
        Err(e) => {
            warn!("Couldn't read from the phone: {e}");
            return cache.load();
        }
    };

    let mut latest = None;
    for item in &received {
        match &item.payload {
            SyncPayload::MatchList { matches } => latest = Some(matches.clone()),
            SyncPayload::FinalResult(result) => {
                warn!("Ignoring a result for {} sent to the wrist", result.match_id);
            }
        }
    }

    match latest {
        Some(matches) => {
            info!("Received {} matches from the phone", matches.len());
            match cache.store(&matches) {
                Ok(()) => handoff.ack(&received),
                Err(e) => error!("Failed to cache the match list: {e}"),
            }
            matches
        }
        None => {
            handoff.ack(&received);
            cache.load()
        }
    }
}

/// Wrist side: sends a finished match to the phone. Failures are logged, not retried.
pub fn deliver_result(handoff: &HandoffDir, result: MatchResult) -> bool {
    let match_id = result.match_id;
    match handoff.send(&SyncPayload::FinalResult(result)) {
        Ok(path) => {
            info!("Result for match {match_id} queued in {path:?}");
            true
        }
        Err(e) => {
            error!("Failed to send the result for match {match_id}: {e}");
            false
        }
    }
}
