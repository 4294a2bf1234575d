use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use crate::models::{Cycle, CycleStats, DailyLog, DayStatus};
use crate::trend::{LengthPredictor, MeanLength};

/// A gap of more than this many days between two period-marked dates starts
/// a new cycle. Anything closer counts as the same flow event, so sparse
/// logging inside one period does not split it: a period rarely runs past
/// ten days, and two distinct periods are rarely closer than two weeks.
pub const CYCLE_GAP_DAYS: i64 = 14;

/// Fallback cycle length until at least one cycle has completed.
pub const DEFAULT_CYCLE_LENGTH: i64 = 28;

/// Ovulation is assumed a fixed 14 days before the next period.
pub const LUTEAL_PHASE_DAYS: i64 = 14;

/// Width of the predicted-period window shown on the calendar, starting at
/// the predicted date.
pub const PREDICTED_PERIOD_DAYS: i64 = 4;

/// Partition the period-marked dates into cycles and derive statistics and
/// predictions. Pure: the same log set always yields the same stats.
pub fn cycle_stats(logs: &HashMap<NaiveDate, DailyLog>) -> CycleStats {
    cycle_stats_with(logs, &MeanLength)
}

/// Same segmentation as [`cycle_stats`], with the average cycle length
/// supplied by the given strategy.
pub fn cycle_stats_with(
    logs: &HashMap<NaiveDate, DailyLog>,
    predictor: &dyn LengthPredictor,
) -> CycleStats {
    let mut period_days: Vec<NaiveDate> = logs
        .iter()
        .filter(|(_, log)| log.is_period)
        .map(|(&date, _)| date)
        .collect();
    period_days.sort();

    let Some(&first) = period_days.first() else {
        // Zero-state: nothing logged yet.
        return CycleStats {
            average_length: DEFAULT_CYCLE_LENGTH,
            last_period_start: None,
            predicted_next_start: None,
            predicted_ovulation: None,
            history: Vec::new(),
        };
    };

    let mut history: Vec<Cycle> = Vec::new();
    let mut current_start = first;

    for pair in period_days.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        if (curr - prev).num_days() > CYCLE_GAP_DAYS {
            history.push(Cycle {
                start_date: current_start,
                length: (curr - current_start).num_days(),
            });
            current_start = curr;
        }
    }

    // The cycle that began at `current_start` is still open; it never enters
    // history, even though a later close would fix its length.
    let average_length = predictor
        .predict(&history)
        .unwrap_or(DEFAULT_CYCLE_LENGTH);

    let predicted_next_start = current_start + Duration::days(average_length);
    let predicted_ovulation = current_start + Duration::days(average_length - LUTEAL_PHASE_DAYS);

    history.reverse();

    CycleStats {
        average_length,
        last_period_start: Some(current_start),
        predicted_next_start: Some(predicted_next_start),
        predicted_ovulation: Some(predicted_ovulation),
        history,
    }
}

/// Resolve one calendar day against the raw log and the derived stats.
/// Called once per visible day per render pass; O(1) beyond the map lookup.
pub fn day_status(
    date: NaiveDate,
    logs: &HashMap<NaiveDate, DailyLog>,
    stats: &CycleStats,
) -> DayStatus {
    let log = logs.get(&date).cloned();
    let is_period = log.as_ref().map_or(false, |l| l.is_period);

    let is_predicted_period = stats.predicted_next_start.map_or(false, |start| {
        let offset = (date - start).num_days();
        (0..PREDICTED_PERIOD_DAYS).contains(&offset)
    });

    let is_ovulation = stats.predicted_ovulation == Some(date);

    DayStatus {
        is_period,
        is_predicted_period,
        is_ovulation,
        log,
    }
}
