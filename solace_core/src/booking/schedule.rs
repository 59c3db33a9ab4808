use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, Days, NaiveDate, Weekday};
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Lowercase English weekday name used as the template key.
pub fn weekday_key(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// A counselor's recurring weekly hours: weekday name to ordered slot labels.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct WeeklyAvailability(BTreeMap<String, Vec<String>>);

impl WeeklyAvailability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day(mut self, day: Weekday, slots: &[&str]) -> Self {
        self.0.insert(
            weekday_key(day).to_string(),
            slots.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    /// Slots offered on the weekday of `date`; empty when the counselor is off.
    pub fn slots_on(&self, date: NaiveDate) -> &[String] {
        self.0
            .get(weekday_key(date.weekday()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn offers(&self, date: NaiveDate, time: &str) -> bool {
        self.slots_on(date).iter().any(|slot| slot == time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub time: String,
    pub available: bool,
}

/// Flags each template slot as available unless a scheduled booking holds it.
pub fn resolve_slots<S: AsRef<str>>(template: &[String], booked: &[S]) -> Vec<SlotAvailability> {
    let taken: HashSet<&str> = booked.iter().map(AsRef::as_ref).collect();
    template
        .iter()
        .map(|time| SlotAvailability {
            time: time.clone(),
            available: !taken.contains(time.as_str()),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlots {
    pub date: NaiveDate,
    pub weekday: String,
    /// Hint for the caller; past days are still resolved.
    pub is_past: bool,
    pub slots: Vec<SlotAvailability>,
}

/// Seven consecutive days starting at `from`, cut short at the end of the calendar.
pub fn week_from(from: NaiveDate) -> Vec<NaiveDate> {
    (0..7)
        .map_while(|offset| from.checked_add_days(Days::new(offset)))
        .collect()
}
