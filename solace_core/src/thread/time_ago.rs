use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;
const WEEK: i64 = 604_800;
const MONTH: i64 = 2_592_000;
const YEAR: i64 = 31_536_000;

/// Coarse relative age of a post or comment.
///
/// Variants are declared smallest unit first, so the derived ordering makes
/// an older timestamp compare greater than or equal to a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "unit", content = "count", rename_all = "lowercase")]
pub enum TimeAgo {
    JustNow,
    Minutes(i64),
    Hours(i64),
    Days(i64),
    Weeks(i64),
    Months(i64),
    Years(i64),
}

impl TimeAgo {
    pub fn between(then: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self::from_seconds((now - then).num_seconds())
    }

    /// Largest unit with a whole count of at least one wins.
    pub fn from_seconds(seconds: i64) -> Self {
        let buckets: [(i64, fn(i64) -> TimeAgo); 6] = [
            (YEAR, TimeAgo::Years),
            (MONTH, TimeAgo::Months),
            (WEEK, TimeAgo::Weeks),
            (DAY, TimeAgo::Days),
            (HOUR, TimeAgo::Hours),
            (MINUTE, TimeAgo::Minutes),
        ];

        for (unit, make) in buckets {
            let count = seconds / unit;
            if count >= 1 {
                return make(count);
            }
        }
        TimeAgo::JustNow
    }

    fn parts(&self) -> Option<(i64, &'static str)> {
        match *self {
            TimeAgo::JustNow => None,
            TimeAgo::Minutes(n) => Some((n, "minute")),
            TimeAgo::Hours(n) => Some((n, "hour")),
            TimeAgo::Days(n) => Some((n, "day")),
            TimeAgo::Weeks(n) => Some((n, "week")),
            TimeAgo::Months(n) => Some((n, "month")),
            TimeAgo::Years(n) => Some((n, "year")),
        }
    }
}

impl fmt::Display for TimeAgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parts() {
            None => f.write_str("just now"),
            Some((1, unit)) => write!(f, "1 {unit} ago"),
            Some((n, unit)) => write!(f, "{n} {unit}s ago"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn picks_the_first_whole_bucket() {
        assert_eq!(TimeAgo::from_seconds(0), TimeAgo::JustNow);
        assert_eq!(TimeAgo::from_seconds(59), TimeAgo::JustNow);
        assert_eq!(TimeAgo::from_seconds(60), TimeAgo::Minutes(1));
        assert_eq!(TimeAgo::from_seconds(2 * HOUR + 5), TimeAgo::Hours(2));
        assert_eq!(TimeAgo::from_seconds(6 * DAY), TimeAgo::Days(6));
        assert_eq!(TimeAgo::from_seconds(13 * DAY), TimeAgo::Weeks(1));
        assert_eq!(TimeAgo::from_seconds(45 * DAY), TimeAgo::Months(1));
        assert_eq!(TimeAgo::from_seconds(800 * DAY), TimeAgo::Years(2));
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        let now = Utc::now();
        assert_eq!(TimeAgo::between(now + Duration::hours(3), now), TimeAgo::JustNow);
    }

    #[test]
    fn renders_singular_and_plural() {
        assert_eq!(TimeAgo::JustNow.to_string(), "just now");
        assert_eq!(TimeAgo::Days(1).to_string(), "1 day ago");
        assert_eq!(TimeAgo::Weeks(3).to_string(), "3 weeks ago");
    }

    #[test]
    fn older_never_reads_younger() {
        let now = Utc::now();
        let mut previous = TimeAgo::between(now - Duration::seconds(60), now);

        // walk back in irregular steps across every bucket boundary
        let mut age = 60;
        while age < 3 * YEAR {
            age += 1 + age / 7;
            let current = TimeAgo::between(now - Duration::seconds(age), now);
            assert!(current >= previous, "{current:?} < {previous:?} at {age}s");
            previous = current;
        }
    }
}
