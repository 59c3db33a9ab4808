use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed-width RFC 3339 so stored timestamps sort lexically in time order.
pub fn stamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn now() -> String {
    stamp(Utc::now())
}

pub fn parse(stored: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(stored)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stamps_have_constant_width() {
        let whole = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let fractional = whole + chrono::Duration::microseconds(120);
        assert_eq!(stamp(whole).len(), stamp(fractional).len());
        assert!(stamp(whole) < stamp(fractional));
    }

    #[test]
    fn parses_what_it_stamps() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
        assert_eq!(parse(&stamp(at)), Some(at));
        assert_eq!(parse("yesterday"), None);
    }
}
