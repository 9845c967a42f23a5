//! Care actions that write to an animal's health log.
//!
//! Every action stamps a log entry with a millisecond id, updates the field
//! it concerns, and returns the short status line shown to the user. The
//! log accepts [`MAX_LOGS_PER_DAY`] entries per local day.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::dates::{dd_mm, entry_date, entry_millis, iso};
use crate::error::RosterError;
use crate::model::{AnimalProfile, HealthLogEntry, HealthLogType, WeightEntry};

pub const MAX_LOGS_PER_DAY: usize = 50;
pub const SHED_CYCLE_DAYS: i64 = 30;
pub const MAX_FEED_ROWS: usize = 4;
pub const MAX_FEED_QTY: u8 = 99;

pub const INTEGRATORS: [&str; 3] = ["Calcium", "D3", "Multivitamin"];

pub const SUBSTRATE_TYPES: [&str; 5] = [
    "OAK FLAKE SOIL",
    "COCONUT FIBER",
    "FERMENTED WOOD",
    "LEAF LITTER MIX",
    "CUSTOM",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Feeder {
    Mealworms,
    Crickets,
    Roaches,
    /// Anything else, kept uppercased. Empty means "CUSTOM".
    Custom(String),
}

impl Feeder {
    pub fn custom(name: &str) -> Self {
        Self::Custom(name.trim().to_uppercase())
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Mealworms => "MEALWORMS",
            Self::Crickets => "CRICKETS",
            Self::Roaches => "ROACHES",
            Self::Custom(name) if name.is_empty() => "CUSTOM",
            Self::Custom(name) => name,
        }
    }

    /// Next entry in the picker: mealworms, crickets, roaches, custom.
    pub fn next(&self) -> Self {
        match self {
            Self::Mealworms => Self::Crickets,
            Self::Crickets => Self::Roaches,
            Self::Roaches => Self::Custom(String::new()),
            Self::Custom(_) => Self::Mealworms,
        }
    }
}

impl From<String> for Feeder {
    fn from(name: String) -> Self {
        match name.as_str() {
            "MEALWORMS" => Self::Mealworms,
            "CRICKETS" => Self::Crickets,
            "ROACHES" => Self::Roaches,
            "CUSTOM" => Self::Custom(String::new()),
            _ => Self::Custom(name),
        }
    }
}

impl From<Feeder> for String {
    fn from(feeder: Feeder) -> Self {
        feeder.label().to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRow {
    pub feeder: Feeder,
    pub qty: u8,
}

impl Default for FeedRow {
    fn default() -> Self {
        Self {
            feeder: Feeder::Crickets,
            qty: 3,
        }
    }
}

impl FeedRow {
    pub fn step_qty(&mut self, delta: i16) {
        let qty = (i16::from(self.qty) + delta).clamp(1, i16::from(MAX_FEED_QTY));
        self.qty = u8::try_from(qty).unwrap_or(1);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumIter, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ShedQuality {
    #[default]
    Clean,
    Partial,
    Stuck,
}

impl ShedQuality {
    pub fn next(self) -> Self {
        let all: Vec<_> = Self::iter().collect();
        let index = all.iter().position(|quality| *quality == self).unwrap_or(0);
        all[(index + 1) % all.len()]
    }
}

/// Which entries to drop from a log. Open ends are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRange {
    All,
    Between {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl LogRange {
    /// Entries whose id carries no date only match [`LogRange::All`].
    pub fn matches(&self, entry: &HealthLogEntry) -> bool {
        match *self {
            Self::All => true,
            Self::Between { from, to } => entry_date(&entry.id).is_some_and(|date| {
                from.is_none_or(|from| date >= from) && to.is_none_or(|to| date <= to)
            }),
        }
    }
}

/// Text progress bar through the shed cycle, full once a cycle has passed.
pub fn shed_bar(days_since: i64, width: usize) -> String {
    let progress = (days_since.max(0) as f64 / SHED_CYCLE_DAYS as f64).min(1.0);
    let filled = (progress * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

/// Shown entries for a filter button, newest first. `None` shows everything.
pub fn filtered_log(
    profile: &AnimalProfile,
    filter: Option<HealthLogType>,
) -> Vec<&HealthLogEntry> {
    profile
        .health_log
        .iter()
        .rev()
        .filter(|entry| filter.is_none_or(|kind| entry.kind == kind))
        .collect()
}

impl AnimalProfile {
    pub fn logs_on(&self, day: NaiveDate) -> usize {
        self.health_log
            .iter()
            .filter(|entry| entry_date(&entry.id) == Some(day))
            .count()
    }

    pub fn can_add_log(&self, now: DateTime<Local>) -> Result<(), RosterError> {
        if self.logs_on(now.date_naive()) >= MAX_LOGS_PER_DAY {
            return Err(RosterError::DailyLogLimit(MAX_LOGS_PER_DAY));
        }
        Ok(())
    }

    /// Timestamp id for a new entry, bumped past existing ids so two
    /// entries written in the same millisecond stay distinct.
    pub fn next_log_id(&self, now: DateTime<Local>) -> String {
        let newest = self
            .health_log
            .iter()
            .filter_map(|entry| entry_millis(&entry.id))
            .max();
        let millis = match newest {
            Some(newest) if newest >= now.timestamp_millis() => newest + 1,
            _ => now.timestamp_millis(),
        };
        millis.to_string()
    }

    pub(crate) fn push_log(
        &mut self,
        kind: HealthLogType,
        text: String,
        suffix: &str,
        now: DateTime<Local>,
    ) -> Result<(), RosterError> {
        self.can_add_log(now)?;
        let id = self.next_log_id(now) + suffix;
        self.health_log.push(HealthLogEntry { id, kind, text });
        Ok(())
    }

    pub fn log_feeding(
        &mut self,
        rows: &[FeedRow],
        integrators: &[String],
        now: DateTime<Local>,
    ) -> Result<String, RosterError> {
        if rows.is_empty() {
            return Err(RosterError::Rejected("ADD A FEEDER FIRST"));
        }
        let summary = rows
            .iter()
            .take(MAX_FEED_ROWS)
            .map(|row| format!("{} {}", row.qty, row.feeder.label()))
            .collect::<Vec<_>>()
            .join(", ");
        let extras = if integrators.is_empty() {
            String::new()
        } else {
            format!(" [{}]", integrators.join(", "))
        };
        let text = format!("FEED: {} - {summary}{extras}", dd_mm(now.date_naive()));
        self.push_log(HealthLogType::Feeding, text, "", now)?;
        self.last_feed = iso(now.date_naive());
        Ok(format!("FED {summary}!"))
    }

    pub fn log_weight(&mut self, grams: &str, now: DateTime<Local>) -> Result<String, RosterError> {
        let grams = grams.trim();
        let text = format!("WEIGHT: {grams}g LOGGED");
        self.push_log(HealthLogType::Vet, text, "", now)?;
        self.weight = grams.to_owned();
        self.weight_history.push(WeightEntry {
            date: iso(now.date_naive()),
            value: grams.parse().unwrap_or(0.0),
        });
        Ok(format!("WEIGHT: {grams}g"))
    }

    pub fn log_shed(
        &mut self,
        quality: ShedQuality,
        now: DateTime<Local>,
    ) -> Result<String, RosterError> {
        let text = format!("SHED: {} - {quality}", dd_mm(now.date_naive()));
        self.push_log(HealthLogType::Shed, text, "", now)?;
        self.last_shed = iso(now.date_naive());
        Ok(format!("SHED: {quality}!"))
    }

    pub fn log_water_change(&mut self, now: DateTime<Local>) -> Result<String, RosterError> {
        let text = format!("WATER: {} - CHANGED", dd_mm(now.date_naive()));
        self.push_log(HealthLogType::Water, text, "", now)?;
        self.last_water_change = Some(iso(now.date_naive()));
        Ok("WATER CHANGED!".to_owned())
    }

    pub fn log_substrate(
        &mut self,
        substrate: &str,
        now: DateTime<Local>,
    ) -> Result<String, RosterError> {
        let substrate = substrate.trim().to_uppercase();
        if substrate.is_empty() {
            return Err(RosterError::Rejected("NAME THE SUBSTRATE"));
        }
        let text = format!("SUBSTRATE: {} - {substrate}", dd_mm(now.date_naive()));
        self.push_log(HealthLogType::Substrate, text, "", now)?;
        self.last_substrate_change = Some(iso(now.date_naive()));
        let message = format!("SUBSTRATE: {substrate}!");
        self.substrate = Some(substrate);
        Ok(message)
    }

    /// Removes matching entries and returns how many went.
    pub fn delete_logs(&mut self, range: LogRange) -> usize {
        let before = self.health_log.len();
        self.health_log.retain(|entry| !range.matches(entry));
        before - self.health_log.len()
    }
}
