use std::collections::HashMap;
use std::collections::HashSet;

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{AppSettings, CycleStats, DailyLog, Symptom};

/// How many of the most recent logs feed symptom-targeted advice.
const RECENT_LOG_WINDOW: usize = 3;
/// Insights are trimmed to this many tips after shuffling.
const MAX_TIPS: usize = 4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CyclePhase {
    Menstrual,
    Follicular,
    Ovulatory,
    Luteal,
}

/// Map days since the last period start onto a phase. The cut-points are
/// fixed: 0-5 menstrual, 6-11 follicular, 12-16 ovulatory, 17+ luteal.
pub fn phase_for(days_since_start: i64) -> CyclePhase {
    if days_since_start < 6 {
        CyclePhase::Menstrual
    } else if days_since_start < 12 {
        CyclePhase::Follicular
    } else if days_since_start < 17 {
        CyclePhase::Ovulatory
    } else {
        CyclePhase::Luteal
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insights {
    pub summary: String,
    pub tips: Vec<String>,
}

/// Assemble the companion view's summary and up to four wellness tips from
/// the current phase and recently logged symptoms. `today` is passed in so
/// the selection stays clock-free; only the final shuffle is random.
pub fn generate_insights(
    logs: &HashMap<NaiveDate, DailyLog>,
    stats: &CycleStats,
    settings: &AppSettings,
    today: NaiveDate,
) -> Insights {
    let mut tips: Vec<String> = Vec::new();
    let greeting = format!("Hello {}, ", settings.user_name);

    let summary = match stats.last_period_start {
        None => {
            tips.push("Log your first period to unlock predictions.".into());
            format!("{greeting}start tracking your period to get personalized insights!")
        }
        Some(last_start) => {
            let days_since = (today - last_start).num_days();
            let phase = phase_for(days_since);
            debug!(days_since, ?phase, "selecting phase tips");
            match phase {
                CyclePhase::Menstrual => {
                    tips.push(
                        "Nutrition: focus on iron-rich foods like spinach and lentils, plus vitamin C."
                            .into(),
                    );
                    tips.push(
                        "Movement: gentle yoga or walking is best; skip high-intensity cardio.".into(),
                    );
                    tips.push("Rest: your body is working hard, so prioritize sleep.".into());
                    format!("{greeting}you are in your menstrual phase. Your energy is naturally lower.")
                }
                CyclePhase::Follicular => {
                    tips.push("Exercise: a great time for HIIT, running, or strength training.".into());
                    tips.push("Creativity: your brain is primed for learning and complex tasks.".into());
                    tips.push(
                        "Nutrition: fermented foods like kimchi and yogurt support hormone metabolism."
                            .into(),
                    );
                    format!(
                        "{greeting}you are in the follicular phase. Estrogen is rising, boosting your energy!"
                    )
                }
                CyclePhase::Ovulatory => {
                    tips.push("Social: a perfect time for big presentations or gatherings.".into());
                    tips.push("Energy: you're at peak performance, but don't overtrain.".into());
                    tips.push(
                        "Nutrition: cruciferous veggies like broccoli help manage estrogen spikes."
                            .into(),
                    );
                    format!(
                        "{greeting}you are likely approaching ovulation. You may feel your most social and confident."
                    )
                }
                CyclePhase::Luteal => {
                    tips.push("Focus: good for wrapping up projects and organizing.".into());
                    tips.push("Cravings: dark chocolate provides magnesium to fight fatigue.".into());
                    tips.push(
                        "Nutrition: complex carbs like oats and sweet potato help stabilize mood.".into(),
                    );
                    tips.push("Mindset: be gentle with yourself if your energy dips.".into());
                    format!(
                        "{greeting}you are in the luteal phase. Progesterone is dominant, suggesting a time to slow down."
                    )
                }
            }
        }
    };

    for symptom in recent_symptoms(logs) {
        match symptom {
            Symptom::Cramps => {
                tips.push("Cramps: a warm bath with Epsom salts or ginger tea can ease them.".into());
            }
            Symptom::Bloating => {
                tips.push("Bloating: dandelion tea and less salt relieve water retention.".into());
            }
            Symptom::Insomnia => {
                tips.push("Sleep: magnesium glycinate before bed can improve sleep quality.".into());
            }
            Symptom::Headache => {
                tips.push("Headache: hydrate first; sometimes it's just dehydration.".into());
            }
            Symptom::Acne => {
                tips.push("Skin: zinc supplements may reduce cyclical breakouts.".into());
            }
            _ => {}
        }
    }

    if tips.len() < 3 {
        tips.push("Hydration: aim for two liters of water today.".into());
        tips.push("Journaling: tracking your mood helps identify patterns.".into());
    }

    tips.shuffle(&mut rand::thread_rng());
    tips.truncate(MAX_TIPS);

    Insights { summary, tips }
}

/// Union of symptoms over the three most recently logged days.
fn recent_symptoms(logs: &HashMap<NaiveDate, DailyLog>) -> HashSet<Symptom> {
    let mut recent: Vec<&DailyLog> = logs.values().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent
        .iter()
        .take(RECENT_LOG_WINDOW)
        .flat_map(|log| log.symptoms.iter().copied())
        .collect()
}

/// Canned, fully-local replies for the companion chat box.
pub fn assistant_reply(message: &str) -> String {
    let lower = message.to_lowercase();
    if lower.contains("pain") || lower.contains("cramp") {
        "I'm sorry you're in pain. Heat, rest, and hydration are your best friends right now. \
         If it's severe, please consult a doctor."
            .into()
    } else if lower.contains("happy") || lower.contains("good") {
        "I'm glad to hear that! Keep up the good vibes.".into()
    } else {
        "I am a local health assistant. I can help track your cycle and suggest wellness tips \
         based on your logs!"
            .into()
    }
}
