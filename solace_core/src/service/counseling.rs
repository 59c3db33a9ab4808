use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use thiserror::Error;
use zel_core::prelude::*;

use super::{is_unique_violation, resolve_session};
use crate::{
    booking::{
        format_date, resolve_slots, week_from, weekday_key, BookingRequest, DaySlots,
        NewCounselor, SlotAvailability, DEFAULT_USER_NAME, SESSION_MINUTES,
    },
    entity::prelude::*,
    ids::{AppointmentId, CounselorId},
    session::Session,
    timestamps,
};

/// Specialization filter value that matches every counselor.
pub const ALL_SPECIALIZATIONS: &str = "All";

#[derive(Debug, Error)]
pub enum CounselingServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("counselor not found")]
    CounselorNotFound,

    #[error("appointment not found")]
    AppointmentNotFound,

    #[error("counselor does not offer that time on that day")]
    SlotNotOffered,

    #[error("slot is already booked")]
    SlotTaken,

    #[error("unauthorized: not the booking user")]
    Unauthorized,

    #[error("not signed in")]
    Unauthenticated,
}

impl From<CounselingServiceError> for ResourceError {
    fn from(error: CounselingServiceError) -> Self {
        match error {
            CounselingServiceError::DbError(error) => ResourceError::infra(error),
            CounselingServiceError::CounselorNotFound => ResourceError::app(error),
            CounselingServiceError::AppointmentNotFound => ResourceError::app(error),
            CounselingServiceError::SlotNotOffered => ResourceError::app(error),
            CounselingServiceError::SlotTaken => ResourceError::app(error),
            CounselingServiceError::Unauthorized => ResourceError::app(error),
            CounselingServiceError::Unauthenticated => ResourceError::app(error),
        }
    }
}

#[derive(Clone)]
pub struct CounselingService {
    db: DatabaseConnection,
}

impl CounselingService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_counselor(
        &self,
        counselor_id: CounselorId,
    ) -> Result<CounselorModel, CounselingServiceError> {
        Counselor::find_by_id(counselor_id)
            .one(&self.db)
            .await?
            .ok_or(CounselingServiceError::CounselorNotFound)
    }

    /// Times already held by scheduled appointments on the given dates
    async fn booked_times(
        &self,
        counselor_id: CounselorId,
        dates: Vec<String>,
    ) -> Result<HashMap<String, Vec<String>>, CounselingServiceError> {
        let held = Appointment::find()
            .filter(AppointmentColumn::CounselorId.eq(counselor_id))
            .filter(AppointmentColumn::Date.is_in(dates))
            .filter(AppointmentColumn::Status.eq(AppointmentStatus::Scheduled))
            .all(&self.db)
            .await?;

        let mut by_date: HashMap<String, Vec<String>> = HashMap::new();
        for appointment in held {
            by_date
                .entry(appointment.date)
                .or_default()
                .push(appointment.time);
        }
        Ok(by_date)
    }

    /// Add a counselor to the directory
    pub async fn _create_counselor(
        &self,
        counselor: NewCounselor,
    ) -> Result<CounselorModel, CounselingServiceError> {
        let model = CounselorActiveModel {
            id: Set(CounselorId::new()),
            name: Set(counselor.name),
            credentials: Set(counselor.credentials),
            specialization: Set(counselor.specialization),
            bio: Set(counselor.bio),
            avatar_url: Set(counselor.avatar_url),
            rating: Set(counselor.rating),
            review_count: Set(counselor.review_count),
            years_experience: Set(counselor.years_experience),
            tags: Set(counselor.tags.into()),
            availability: Set(counselor.availability),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(counselor = %model.id, "counselor created");
        Ok(model)
    }

    /// Counselors whose tags include `specialization`; `None` or "All" lists everyone
    pub async fn _list_counselors(
        &self,
        specialization: Option<&str>,
    ) -> Result<Vec<CounselorModel>, CounselingServiceError> {
        let counselors = Counselor::find()
            .order_by_asc(CounselorColumn::Name)
            .all(&self.db)
            .await?;

        let wanted = specialization
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != ALL_SPECIALIZATIONS);

        Ok(match wanted {
            None => counselors,
            Some(spec) => counselors
                .into_iter()
                .filter(|c| c.tags.contains(spec))
                .collect(),
        })
    }

    pub async fn _get_counselor(
        &self,
        counselor_id: CounselorId,
    ) -> Result<CounselorModel, CounselingServiceError> {
        self.find_counselor(counselor_id).await
    }

    /// The counselor's template slots for `date`, each flagged available or booked
    pub async fn _available_slots(
        &self,
        counselor_id: CounselorId,
        date: NaiveDate,
    ) -> Result<Vec<SlotAvailability>, CounselingServiceError> {
        let counselor = self.find_counselor(counselor_id).await?;
        let key = format_date(date);
        let booked = self.booked_times(counselor_id, vec![key.clone()]).await?;

        tracing::debug!(counselor = %counselor_id, date = %key, "resolving availability");
        let held = booked.get(&key).map(Vec::as_slice).unwrap_or(&[]);
        Ok(resolve_slots(counselor.availability.slots_on(date), held))
    }

    /// Availability for seven consecutive days starting at `from`, fewer at the end of the calendar
    pub async fn _weekly_slots(
        &self,
        counselor_id: CounselorId,
        from: NaiveDate,
    ) -> Result<Vec<DaySlots>, CounselingServiceError> {
        let counselor = self.find_counselor(counselor_id).await?;
        let days = week_from(from);
        let booked = self
            .booked_times(counselor_id, days.iter().copied().map(format_date).collect())
            .await?;
        let today = Utc::now().date_naive();

        Ok(days
            .into_iter()
            .map(|date| {
                let held = booked
                    .get(&format_date(date))
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                DaySlots {
                    date,
                    weekday: weekday_key(date.weekday()).to_string(),
                    is_past: date < today,
                    slots: resolve_slots(counselor.availability.slots_on(date), held),
                }
            })
            .collect())
    }

    /// Book a slot. The insert is a single statement and the scheduled-slot
    /// unique index decides which of several concurrent bookings wins.
    pub async fn _book_appointment(
        &self,
        session: &Session,
        request: BookingRequest,
    ) -> Result<AppointmentModel, CounselingServiceError> {
        let counselor = self.find_counselor(request.counselor_id).await?;
        if !counselor.availability.offers(request.date, &request.time) {
            tracing::warn!(
                counselor = %counselor.id,
                time = %request.time,
                "booking rejected: slot not offered"
            );
            return Err(CounselingServiceError::SlotNotOffered);
        }

        let date = format_date(request.date);
        let appointment = AppointmentActiveModel {
            id: Set(AppointmentId::new()),
            counselor_id: Set(counselor.id),
            counselor_name: Set(counselor.name),
            user_id: Set(session.user_id),
            user_name: Set(session.name_or(DEFAULT_USER_NAME)),
            user_email: Set(session.email.clone()),
            date: Set(date.clone()),
            time: Set(request.time.clone()),
            duration_minutes: Set(SESSION_MINUTES),
            kind: Set(request.kind),
            status: Set(AppointmentStatus::Scheduled),
            notes: Set(request.notes.filter(|n| !n.trim().is_empty())),
            created_at: Set(timestamps::now()),
        };

        let model = match appointment.insert(&self.db).await {
            Ok(model) => model,
            Err(err) if is_unique_violation(&err) => {
                tracing::warn!(counselor = %counselor.id, %date, time = %request.time, "slot already booked");
                return Err(CounselingServiceError::SlotTaken);
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to insert appointment");
                return Err(err.into());
            }
        };

        tracing::info!(
            appointment = %model.id,
            counselor = %model.counselor_id,
            date = %model.date,
            time = %model.time,
            "appointment booked"
        );
        Ok(model)
    }

    /// Cancel one of the caller's appointments; cancelling twice is a no-op
    pub async fn _cancel_appointment(
        &self,
        session: &Session,
        appointment_id: AppointmentId,
    ) -> Result<AppointmentModel, CounselingServiceError> {
        let appointment = Appointment::find_by_id(appointment_id)
            .one(&self.db)
            .await?
            .ok_or(CounselingServiceError::AppointmentNotFound)?;

        if appointment.user_id != session.user_id {
            tracing::warn!(appointment = %appointment_id, user = %session.user_id, "cancel rejected: not the booking user");
            return Err(CounselingServiceError::Unauthorized);
        }

        if appointment.status == AppointmentStatus::Cancelled {
            return Ok(appointment);
        }

        let mut active: AppointmentActiveModel = appointment.into();
        active.status = Set(AppointmentStatus::Cancelled);
        let model = active.update(&self.db).await?;

        tracing::info!(appointment = %appointment_id, "appointment cancelled");
        Ok(model)
    }

    /// Every appointment of the caller, latest date first
    pub async fn _list_for_user(
        &self,
        session: &Session,
    ) -> Result<Vec<AppointmentModel>, CounselingServiceError> {
        let mut appointments = Appointment::find()
            .filter(AppointmentColumn::UserId.eq(session.user_id))
            .all(&self.db)
            .await?;

        appointments.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.time.cmp(&a.time)));
        Ok(appointments)
    }

    pub async fn _list_for_counselor_on_date(
        &self,
        counselor_id: CounselorId,
        date: NaiveDate,
    ) -> Result<Vec<AppointmentModel>, CounselingServiceError> {
        Ok(Appointment::find()
            .filter(AppointmentColumn::CounselorId.eq(counselor_id))
            .filter(AppointmentColumn::Date.eq(format_date(date)))
            .filter(AppointmentColumn::Status.eq(AppointmentStatus::Scheduled))
            .order_by_asc(AppointmentColumn::Time)
            .all(&self.db)
            .await?)
    }

    async fn require_session(&self, ctx: &RequestContext) -> Result<Session, CounselingServiceError> {
        resolve_session(&self.db, &ctx.connection().remote_id())
            .await?
            .ok_or(CounselingServiceError::Unauthenticated)
    }
}

#[zel_service(name = "counseling")]
trait Counseling {
    #[method(name = "list_counselors")]
    async fn list_counselors(
        &self,
        specialization: Option<String>,
    ) -> Result<Vec<CounselorModel>, ResourceError>;

    #[method(name = "get_counselor")]
    async fn get_counselor(&self, counselor_id: CounselorId) -> Result<CounselorModel, ResourceError>;

    #[method(name = "available_slots")]
    async fn available_slots(
        &self,
        counselor_id: CounselorId,
        date: NaiveDate,
    ) -> Result<Vec<SlotAvailability>, ResourceError>;

    #[method(name = "weekly_slots")]
    async fn weekly_slots(
        &self,
        counselor_id: CounselorId,
        from: NaiveDate,
    ) -> Result<Vec<DaySlots>, ResourceError>;

    #[method(name = "book_appointment")]
    async fn book_appointment(&self, request: BookingRequest) -> Result<AppointmentModel, ResourceError>;

    #[method(name = "cancel_appointment")]
    async fn cancel_appointment(
        &self,
        appointment_id: AppointmentId,
    ) -> Result<AppointmentModel, ResourceError>;

    #[method(name = "my_appointments")]
    async fn my_appointments(&self) -> Result<Vec<AppointmentModel>, ResourceError>;

    #[method(name = "counselor_schedule")]
    async fn counselor_schedule(
        &self,
        counselor_id: CounselorId,
        date: NaiveDate,
    ) -> Result<Vec<AppointmentModel>, ResourceError>;
}

#[async_trait]
impl CounselingServer for CounselingService {
    async fn list_counselors(
        &self,
        _ctx: RequestContext,
        specialization: Option<String>,
    ) -> Result<Vec<CounselorModel>, ResourceError> {
        Ok(self._list_counselors(specialization.as_deref()).await?)
    }

    async fn get_counselor(
        &self,
        _ctx: RequestContext,
        counselor_id: CounselorId,
    ) -> Result<CounselorModel, ResourceError> {
        Ok(self._get_counselor(counselor_id).await?)
    }

    async fn available_slots(
        &self,
        _ctx: RequestContext,
        counselor_id: CounselorId,
        date: NaiveDate,
    ) -> Result<Vec<SlotAvailability>, ResourceError> {
        Ok(self._available_slots(counselor_id, date).await?)
    }

    async fn weekly_slots(
        &self,
        _ctx: RequestContext,
        counselor_id: CounselorId,
        from: NaiveDate,
    ) -> Result<Vec<DaySlots>, ResourceError> {
        Ok(self._weekly_slots(counselor_id, from).await?)
    }

    async fn book_appointment(
        &self,
        ctx: RequestContext,
        request: BookingRequest,
    ) -> Result<AppointmentModel, ResourceError> {
        let session = self.require_session(&ctx).await?;
        Ok(self._book_appointment(&session, request).await?)
    }

    async fn cancel_appointment(
        &self,
        ctx: RequestContext,
        appointment_id: AppointmentId,
    ) -> Result<AppointmentModel, ResourceError> {
        let session = self.require_session(&ctx).await?;
        Ok(self._cancel_appointment(&session, appointment_id).await?)
    }

    async fn my_appointments(&self, ctx: RequestContext) -> Result<Vec<AppointmentModel>, ResourceError> {
        let session = self.require_session(&ctx).await?;
        Ok(self._list_for_user(&session).await?)
    }

    async fn counselor_schedule(
        &self,
        _ctx: RequestContext,
        counselor_id: CounselorId,
        date: NaiveDate,
    ) -> Result<Vec<AppointmentModel>, ResourceError> {
        Ok(self._list_for_counselor_on_date(counselor_id, date).await?)
    }
}
