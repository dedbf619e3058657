//! Totals over the refereeing history kept in the phone's schedule: earnings, roles, time on the
//! pitch and a few habits.

use crate::{
    config::MatchTiming,
    sync::schedule::{Role, Schedule, ScheduledMatch},
};
use log::*;
use std::collections::BTreeMap;
use time::{Date, Month, OffsetDateTime, UtcOffset, Weekday, macros::format_description};

/// Matches kicking off before this hour count as morning matches
const AFTERNOON_STARTS: u8 = 14;

/// Parses a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<Date, time::error::Parse> {
    Date::parse(s, format_description!("[year]-[month]-[day]"))
}

/// The span of kick-off dates to compute statistics over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    All,
    /// The calendar month containing the date
    Month(Date),
    Year(i32),
    /// Both ends included
    Range { from: Date, to: Date },
}

impl Period {
    pub fn contains(&self, date: Date) -> bool {
        match *self {
            Self::All => true,
            Self::Month(month) => date.year() == month.year() && date.month() == month.month(),
            Self::Year(year) => date.year() == year,
            Self::Range { from, to } => from <= date && date <= to,
        }
    }
}

impl core::fmt::Display for Period {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::All => write!(f, "all time"),
            Self::Month(date) => write!(f, "{} {}", date.month(), date.year()),
            Self::Year(year) => write!(f, "{year}"),
            Self::Range { from, to } => write!(f, "{from} to {to}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
}

impl core::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Morning => write!(f, "mornings"),
            Self::Afternoon => write!(f, "afternoons"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCount {
    pub year: i32,
    pub month: Month,
    pub matches: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighestScoring {
    pub goals: u32,
    pub home: String,
    pub away: String,
    pub date: Date,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CareerStats {
    pub matches: usize,
    pub as_principal: usize,
    pub as_assistant: usize,
    pub earnings: f64,
    /// Regulation minutes of every match, added time not included
    pub minutes: u32,
    pub goals: u32,
    pub distance_m: f64,
    pub busiest_weekday: Option<Weekday>,
    pub time_of_day: Option<TimeOfDay>,
    /// Oldest month first, months without matches left out
    pub per_month: Vec<MonthCount>,
    pub highest_scoring: Option<HighestScoring>,
    pub most_frequent_team: Option<(String, usize)>,
}

impl CareerStats {
    /// Statistics over the finished matches of `schedule` that kicked off within `period`.
    /// Dates and hours are read in `offset`.
    pub fn new(
        schedule: &Schedule,
        period: Period,
        offset: UtcOffset,
        default_timing: &MatchTiming,
    ) -> Self {
        let played: Vec<(&ScheduledMatch, OffsetDateTime)> = schedule
            .matches
            .iter()
            .filter(|m| m.finished)
            .map(|m| (m, m.kickoff.to_offset(offset)))
            .filter(|(_, kickoff)| period.contains(kickoff.date()))
            .collect();
        debug!("{} finished matches in {period}", played.len());

        let mut stats = Self {
            matches: played.len(),
            ..Default::default()
        };
        let mut weekdays = [0usize; 7];
        let mut months: BTreeMap<(i32, u8), usize> = BTreeMap::new();
        let mut teams: BTreeMap<&str, usize> = BTreeMap::new();
        let mut mornings = 0;

        for (m, kickoff) in &played {
            let category = schedule.category(&m.category);
            match m.role {
                Role::Principal => stats.as_principal += 1,
                Role::Assistant => stats.as_assistant += 1,
            }
            stats.earnings += m.earnings(category);
            stats.minutes = stats
                .minutes
                .saturating_add(m.half_minutes(category, default_timing).saturating_mul(2));
            let goals = m.goals();
            stats.goals = stats.goals.saturating_add(goals);
            stats.distance_m += m.distance_m;

            weekdays[usize::from(kickoff.weekday().number_days_from_monday())] += 1;
            *months
                .entry((kickoff.year(), u8::from(kickoff.month())))
                .or_default() += 1;
            if kickoff.hour() < AFTERNOON_STARTS {
                mornings += 1;
            }
            for team in [&m.home, &m.away] {
                *teams.entry(team.name.as_str()).or_default() += 1;
            }

            if stats
                .highest_scoring
                .as_ref()
                .is_none_or(|best| goals > best.goals)
            {
                stats.highest_scoring = Some(HighestScoring {
                    goals,
                    home: m.home.acronym(),
                    away: m.away.acronym(),
                    date: kickoff.date(),
                });
            }
        }

        // Ties go to the earlier weekday
        stats.busiest_weekday = weekdays
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .max_by(|(i, a), (j, b)| a.cmp(b).then(j.cmp(i)))
            .map(|(i, _)| Weekday::Monday.nth_next(i as u8));

        if stats.matches > 0 {
            stats.time_of_day = Some(if mornings > stats.matches - mornings {
                TimeOfDay::Morning
            } else {
                TimeOfDay::Afternoon
            });
        }

        stats.per_month = months
            .into_iter()
            .map(|((year, month), matches)| MonthCount {
                year,
                month: Month::January.nth_next(month - 1),
                matches,
            })
            .collect();

        // Ties go to the name first in alphabetical order
        stats.most_frequent_team = teams
            .into_iter()
            .rev()
            .max_by_key(|(_, count)| *count)
            .map(|(name, count)| (name.to_string(), count));

        stats
    }

    pub fn earnings_per_match(&self) -> f64 {
        if self.matches == 0 {
            0.0
        } else {
            self.earnings / self.matches as f64
        }
    }

    pub fn earnings_per_minute(&self) -> f64 {
        if self.minutes == 0 {
            0.0
        } else {
            self.earnings / f64::from(self.minutes)
        }
    }

    /// Percentage of the matches refereed as principal
    pub fn principal_share(&self) -> f64 {
        if self.matches == 0 {
            0.0
        } else {
            self.as_principal as f64 / self.matches as f64 * 100.0
        }
    }
}
