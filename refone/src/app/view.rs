use refone_common::{
    match_snapshot::{MatchPhase, MatchSnapshot},
    side::Side,
    sync::MatchSummary,
};

/// One status line for the terminal, redrawn in place on every display tick
pub fn status_line(snapshot: &MatchSnapshot, summary: Option<&MatchSummary>) -> String {
    let name = |side: Side| match summary {
        Some(summary) => summary.team(side).acronym.clone(),
        None => side.to_string(),
    };
    let mut line = format!(
        "[{}] {} {} - {} {}  {}",
        snapshot.phase,
        name(Side::Home),
        snapshot.scores.home,
        snapshot.scores.away,
        name(Side::Away),
        snapshot.clock,
    );
    if snapshot.phase.is_half() && !snapshot.clock_running {
        line.push_str("  PAUSED");
    }
    if let Some(goal) = snapshot.goals.last() {
        line.push_str(&format!("  last goal: {} {}'", name(goal.side), goal.minute));
    }
    line
}

/// The final summary printed once the match is over
pub fn full_time_report(snapshot: &MatchSnapshot, summary: Option<&MatchSummary>) -> String {
    let team = |side: Side| match summary {
        Some(summary) => summary.team(side).name.clone(),
        None => side.to_string(),
    };
    let mut report = format!(
        "{} {} - {} {}",
        team(Side::Home),
        snapshot.scores.home,
        snapshot.scores.away,
        team(Side::Away)
    );
    if snapshot.phase != MatchPhase::Finished {
        report.push_str(" (abandoned)");
    }
    for goal in &snapshot.goals {
        report.push_str(&format!("\n  {}' {}", goal.minute, team(goal.side)));
    }
    report
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use refone_common::{
        bundles::HomeAwayBundle,
        color::KitColor,
        match_snapshot::{ClockDisplay, GoalSnapshot},
        sync::TeamInfo,
    };
    use std::time::Duration;
    use time::macros::datetime;
    use uuid::Uuid;

    pub(crate) fn summary(n: u128) -> MatchSummary {
        MatchSummary {
            id: Uuid::from_u128(n),
            home: TeamInfo {
                name: "Rovers".to_string(),
                acronym: "ROV".to_string(),
                color: KitColor::new(0, 0x40, 0xA0),
            },
            away: TeamInfo {
                name: "United".to_string(),
                acronym: "UTD".to_string(),
                color: KitColor::WHITE,
            },
            stadium: "Field 2".to_string(),
            kickoff: datetime!(2026-11-01 10:30 UTC),
            category: "Senior".to_string(),
            half_minutes: 1,
            break_minutes: 1,
            workout_id: None,
        }
    }

    fn snapshot(phase: MatchPhase, clock_running: bool) -> MatchSnapshot {
        MatchSnapshot {
            phase,
            clock: ClockDisplay::Regulation {
                elapsed: Duration::from_secs(125),
                total: None,
            },
            clock_running,
            scores: HomeAwayBundle::new(1, 0),
            goals: vec![GoalSnapshot {
                side: Side::Home,
                minute: 2,
                phase: MatchPhase::FirstHalf,
            }],
        }
    }

    #[test]
    fn test_status_line_without_teams() {
        assert_eq!(
            status_line(&snapshot(MatchPhase::FirstHalf, true), None),
            "[First Half] Home 1 - 0 Away  02:05  last goal: Home 2'"
        );
        assert_eq!(
            status_line(&snapshot(MatchPhase::FirstHalf, false), None),
            "[First Half] Home 1 - 0 Away  02:05  PAUSED  last goal: Home 2'"
        );
    }

    #[test]
    fn test_status_line_with_teams() {
        let summary = summary(1);
        let line = status_line(&snapshot(MatchPhase::FirstHalf, true), Some(&summary));
        assert_eq!(line, "[First Half] ROV 1 - 0 UTD  02:05  last goal: ROV 2'");
    }

    #[test]
    fn test_full_time_report() {
        let mut snap = snapshot(MatchPhase::Finished, false);
        snap.clock = ClockDisplay::FullTime;
        assert_eq!(full_time_report(&snap, None), "Home 1 - 0 Away\n  2' Home");

        let snap = snapshot(MatchPhase::SecondHalf, true);
        assert!(full_time_report(&snap, None).contains("(abandoned)"));
    }
}
