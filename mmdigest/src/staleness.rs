use chrono::{DateTime, Utc};

const MILLIS_PER_MINUTE: i64 = 60_000;
const MILLIS_PER_DAY: i64 = 86_400_000;
const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;

/// Whole days and minutes elapsed since a reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Staleness {
    pub days: i64,
    pub minutes: i64,
}

impl Staleness {
    /// `now` is injected so every computation of a pass agrees on it.
    pub fn between(reference: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let elapsed = (now - reference).num_milliseconds();
        Self {
            days: elapsed.div_euclid(MILLIS_PER_DAY),
            minutes: elapsed.div_euclid(MILLIS_PER_MINUTE),
        }
    }
}

/// "3 days 4 hours", "2 hours 5 minutes", "12 minutes"
pub fn pretty_delay(minutes: i64) -> String {
    let minutes = minutes.max(0);
    let days = minutes / MINUTES_PER_DAY;
    let hours = (minutes % MINUTES_PER_DAY) / MINUTES_PER_HOUR;
    let remaining = minutes % MINUTES_PER_HOUR;

    if days > 0 {
        format!("{} {}", count(days, "day"), count(hours, "hour"))
    } else if hours > 0 {
        format!("{} {}", count(hours, "hour"), count(remaining, "minute"))
    } else {
        count(remaining, "minute")
    }
}

fn count(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}
