use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum FlowLevel {
    #[default]
    None,
    Light,
    Medium,
    Heavy,
    Spotting,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mood {
    Happy,
    Sensitive,
    Sad,
    Irritable,
    Anxious,
    Energetic,
    Tired,
    Calm,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Symptom {
    Cramps,
    Headache,
    Bloating,
    Acne,
    Backache,
    Insomnia,
    Cravings,
}

/// One entry per calendar date; the date is the entry's identity. Saving a
/// log for a date that already has one replaces the whole record. A missing
/// record means "no data", which is not the same as `is_period: false`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyLog {
    pub date: NaiveDate,
    pub is_period: bool,
    /// Meaningful only when `is_period` is set.
    #[serde(default)]
    pub flow: FlowLevel,
    #[serde(default)]
    pub moods: Vec<Mood>,
    #[serde(default)]
    pub symptoms: Vec<Symptom>,
    pub notes: Option<String>,
    /// Basal body temperature. Recorded, not consumed by the engine.
    pub temperature: Option<f32>,
}

impl DailyLog {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            is_period: false,
            flow: FlowLevel::None,
            moods: Vec::new(),
            symptoms: Vec::new(),
            notes: None,
            temperature: None,
        }
    }

    /// Moods and symptoms are order-preserving sets: drop duplicates, first
    /// occurrence wins.
    pub(crate) fn normalize(&mut self) {
        dedup_preserving(&mut self.moods);
        dedup_preserving(&mut self.symptoms);
    }
}

fn dedup_preserving<T: PartialEq + Copy>(items: &mut Vec<T>) {
    let mut seen: Vec<T> = Vec::with_capacity(items.len());
    items.retain(|item| {
        if seen.contains(item) {
            false
        } else {
            seen.push(*item);
            true
        }
    });
}

/// A completed cycle inferred from the log set. `length` is the number of
/// days from this cycle's start to the next cycle's start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cycle {
    pub start_date: NaiveDate,
    pub length: i64,
}

/// Derived statistics, recomputed from the raw logs on every query and never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleStats {
    pub average_length: i64,
    pub last_period_start: Option<NaiveDate>,
    pub predicted_next_start: Option<NaiveDate>,
    pub predicted_ovulation: Option<NaiveDate>,
    /// Completed cycles, newest first. Never includes the still-open cycle.
    pub history: Vec<Cycle>,
}

/// What the calendar needs to know about a single day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayStatus {
    pub is_period: bool,
    pub is_predicted_period: bool,
    pub is_ovulation: bool,
    pub log: Option<DailyLog>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppSettings {
    pub user_name: String,
    pub cycle_length_goal: u32,
    pub period_length_goal: u32,
    /// Hours between mood-check reminders; 0 turns them off.
    pub mood_check_frequency: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            user_name: "User".into(),
            cycle_length_goal: 28,
            period_length_goal: 5,
            mood_check_frequency: 24,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_duplicate_tags() {
        let mut log = DailyLog::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        log.moods = vec![Mood::Happy, Mood::Tired, Mood::Happy];
        log.symptoms = vec![Symptom::Cramps, Symptom::Cramps, Symptom::Acne];
        log.normalize();
        assert_eq!(log.moods, vec![Mood::Happy, Mood::Tired]);
        assert_eq!(log.symptoms, vec![Symptom::Cramps, Symptom::Acne]);
    }
}
