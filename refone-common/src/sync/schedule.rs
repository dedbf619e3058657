//! The phone side's list of matches, kept as a TOML file.

use super::{MatchResult, MatchSummary, Result, TeamInfo};
use crate::{bundles::HomeAwayBundle, color::KitColor, config::MatchTiming, side::Side};
use log::*;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use time::OffsetDateTime;
use uuid::Uuid;

const DEFAULT_STADIUM: &str = "Field";

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub matches: Vec<ScheduledMatch>,
}

/// A competition category: what a match pays and, optionally, how long it lasts
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub principal_fee: f64,
    #[serde(default)]
    pub assistant_fee: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_minutes: Option<u32>,
}

impl Category {
    pub fn fee(&self, role: Role) -> f64 {
        match role {
            Role::Principal => self.principal_fee,
            Role::Assistant => self.assistant_fee,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Principal,
    Assistant,
}

impl Role {
    fn is_principal(&self) -> bool {
        *self == Self::Principal
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Principal => write!(f, "principal"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ScheduledTeam {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acronym: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ScheduledTeam {
    /// The given acronym, or the first three letters of the name
    pub fn acronym(&self) -> String {
        self.acronym.clone().unwrap_or_else(|| {
            self.name
                .chars()
                .filter(|c| c.is_alphanumeric())
                .take(3)
                .collect::<String>()
                .to_uppercase()
        })
    }

    fn to_info(&self, side: Side) -> TeamInfo {
        let color = match &self.color {
            Some(hex) => KitColor::from_hex_lossy(hex),
            None => match side {
                Side::Home => KitColor::BLACK,
                Side::Away => KitColor::WHITE,
            },
        };
        TeamInfo {
            name: self.name.clone(),
            acronym: self.acronym(),
            color,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ScheduledMatch {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub home: ScheduledTeam,
    pub away: ScheduledTeam,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stadium: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub kickoff: OffsetDateTime,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Role::is_principal")]
    pub role: Role,
    /// Travel expenses paid on top of the category fee
    #[serde(default, skip_serializing_if = "is_zero")]
    pub travel_cost: f64,
    /// Metres covered, copied from the workout
    #[serde(default, skip_serializing_if = "is_zero")]
    pub distance_m: f64,
    #[serde(default)]
    pub finished: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<HomeAwayBundle<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_id: Option<Uuid>,
}

impl ScheduledMatch {
    /// The match's own half length, else its category's, else the configured one
    pub fn half_minutes(&self, category: Option<&Category>, default_timing: &MatchTiming) -> u32 {
        self.half_minutes
            .or_else(|| category.and_then(|c| c.half_minutes))
            .unwrap_or_else(|| default_timing.half_minutes())
    }

    pub fn break_minutes(&self, category: Option<&Category>, default_timing: &MatchTiming) -> u32 {
        self.break_minutes
            .or_else(|| category.and_then(|c| c.break_minutes))
            .unwrap_or_else(|| default_timing.break_minutes())
    }

    /// The category fee for the role refereed plus travel
    pub fn earnings(&self, category: Option<&Category>) -> f64 {
        category.map_or(0.0, |c| c.fee(self.role)) + self.travel_cost
    }

    pub fn goals(&self) -> u32 {
        self.score.map_or(0, |s| u32::from(s.home) + u32::from(s.away))
    }

    pub fn to_summary(
        &self,
        category: Option<&Category>,
        default_timing: &MatchTiming,
    ) -> MatchSummary {
        MatchSummary {
            id: self.id,
            home: self.home.to_info(Side::Home),
            away: self.away.to_info(Side::Away),
            stadium: self
                .stadium
                .clone()
                .unwrap_or_else(|| DEFAULT_STADIUM.to_string()),
            kickoff: self.kickoff,
            category: self.category.clone(),
            half_minutes: self.half_minutes(category, default_timing),
            break_minutes: self.break_minutes(category, default_timing),
            workout_id: self.workout_id,
        }
    }
}

impl Schedule {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, toml::to_string(self)?)?;
        Ok(())
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        let category = self.categories.iter().find(|c| c.name == name);
        if category.is_none() {
            trace!("No category named {name:?}");
        }
        category
    }

    /// Summaries of every match not yet played, in schedule order
    pub fn upcoming(&self, default_timing: &MatchTiming) -> Vec<MatchSummary> {
        self.matches
            .iter()
            .filter(|m| !m.finished)
            .map(|m| m.to_summary(self.category(&m.category), default_timing))
            .collect()
    }

    /// Records a result from the wrist device. Returns `false` if no match has the result's id.
    pub fn apply_result(&mut self, result: &MatchResult) -> bool {
        let Some(scheduled) = self.matches.iter_mut().find(|m| m.id == result.match_id) else {
            warn!("No scheduled match with id {}", result.match_id);
            return false;
        };

        scheduled.score = Some(result.scores);
        scheduled.finished = true;
        if let Some(workout_id) = result.workout_id {
            scheduled.workout_id = Some(workout_id);
            debug!("Linked workout {workout_id} to match {}", result.match_id);
        }
        info!(
            "Recorded result for match {}: {}",
            result.match_id, result.scores
        );
        true
    }
}
