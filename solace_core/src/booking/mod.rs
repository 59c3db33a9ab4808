//! Counselor availability and appointment rules.

use serde::{Deserialize, Serialize};

use crate::{entity::prelude::AppointmentKind, ids::CounselorId};

mod schedule;

pub use schedule::{
    format_date, resolve_slots, week_from, weekday_key, DaySlots, SlotAvailability,
    WeeklyAvailability,
};

/// Every session is booked for the same length.
pub const SESSION_MINUTES: i32 = 50;

pub const DEFAULT_USER_NAME: &str = "User";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub counselor_id: CounselorId,
    pub date: chrono::NaiveDate,
    pub time: String,
    pub kind: AppointmentKind,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCounselor {
    pub name: String,
    pub credentials: String,
    pub specialization: String,
    pub bio: String,
    pub avatar_url: String,
    pub rating: f64,
    pub review_count: i32,
    pub years_experience: i32,
    pub tags: Vec<String>,
    pub availability: WeeklyAvailability,
}
