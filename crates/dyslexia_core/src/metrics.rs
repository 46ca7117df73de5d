//! crates/dyslexia_core/src/metrics.rs
//!
//! Derives the dashboard summary from a user's raw activity history.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Estimated minutes credited per recorded session. No durations are stored.
pub const READING_MINUTES_PER_SESSION: u64 = 5;
pub const SPEAKING_MINUTES_PER_SESSION: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardMetrics {
    pub total_reading_minutes: u64,
    pub total_speaking_minutes: u64,
    pub completed_sessions: u64,
    pub words_learned: u64,
    pub streak_days: u32,
}

impl DashboardMetrics {
    /// Computes the summary. Activity timestamps are bucketed into calendar
    /// days of `tz`, and `today` is the current day in that same zone.
    pub fn compute<Tz: TimeZone>(
        reading: &[DateTime<Utc>],
        speaking: &[DateTime<Utc>],
        words_learned: u64,
        tz: &Tz,
        today: NaiveDate,
    ) -> Self {
        let reading_sessions = reading.len() as u64;
        let speaking_sessions = speaking.len() as u64;

        let days = reading
            .iter()
            .chain(speaking.iter())
            .map(|ts| ts.with_timezone(tz).date_naive());

        Self {
            total_reading_minutes: reading_sessions * READING_MINUTES_PER_SESSION,
            total_speaking_minutes: speaking_sessions * SPEAKING_MINUTES_PER_SESSION,
            completed_sessions: reading_sessions + speaking_sessions,
            words_learned,
            streak_days: streak(days, today),
        }
    }
}

/// Counts consecutive calendar days with activity, ending today or yesterday.
///
/// Days are walked from most recent to oldest. Repeated days are skipped, a
/// one-day step extends the streak and any larger gap ends it.
pub fn streak<I>(days: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut days: Vec<NaiveDate> = days.into_iter().collect();
    days.sort_unstable_by(|a, b| b.cmp(a));

    let Some((&latest, rest)) = days.split_first() else {
        return 0;
    };

    // Clock skew can put the latest activity slightly in the future.
    if (today - latest).num_days().abs() > 1 {
        return 0;
    }

    let mut count = 1;
    let mut current = latest;
    for &day in rest {
        match (current - day).num_days() {
            0 => continue,
            1 => {
                count += 1;
                current = day;
            }
            _ => break,
        }
    }
    count
}
