use crate::models::Cycle;

/// The trend model fits against at most this many recent cycles.
const TREND_WINDOW: usize = 6;

/// Strategy for estimating the typical cycle length from completed cycles,
/// ordered oldest first. `None` means "no estimate"; callers fall back to
/// the 28-day default.
pub trait LengthPredictor {
    fn predict(&self, completed: &[Cycle]) -> Option<i64>;
}

/// Rounded arithmetic mean of all completed cycle lengths. The default
/// strategy used by [`crate::prediction::cycle_stats`].
pub struct MeanLength;

impl LengthPredictor for MeanLength {
    fn predict(&self, completed: &[Cycle]) -> Option<i64> {
        if completed.is_empty() {
            return None;
        }
        let sum: i64 = completed.iter().map(|c| c.length).sum();
        Some((sum as f64 / completed.len() as f64).round() as i64)
    }
}

/// Least-squares fit over the lengths of the most recent cycles,
/// extrapolated one step forward. Needs at least two completed cycles.
/// Opt-in: nothing selects it by default.
pub struct LinearTrend;

impl LengthPredictor for LinearTrend {
    fn predict(&self, completed: &[Cycle]) -> Option<i64> {
        if completed.len() < 2 {
            return None;
        }
        let skip = completed.len().saturating_sub(TREND_WINDOW);
        let lengths: Vec<f64> = completed[skip..].iter().map(|c| c.length as f64).collect();

        let n = lengths.len() as f64;
        let mean_x = (n - 1.0) / 2.0;
        let mean_y = lengths.iter().sum::<f64>() / n;

        let mut num = 0.0;
        let mut den = 0.0;
        for (i, y) in lengths.iter().enumerate() {
            let dx = i as f64 - mean_x;
            num += dx * (y - mean_y);
            den += dx * dx;
        }
        let slope = num / den;

        // Extrapolate at x = n, one step past the fitted window.
        let next = mean_y + slope * (n - mean_x);
        Some(next.round() as i64)
    }
}
