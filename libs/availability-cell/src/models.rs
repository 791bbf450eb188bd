use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use shared_models::error::AppError;

// ==============================================================================
// SCHEDULING ROWS
// ==============================================================================

/// A doctor's working hours on one calendar date. Times are clinic wall-clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingWindow {
    #[serde(default)]
    pub id: u64,
    pub doctor_id: u64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// An existing appointment as stored: a clock time and the service it books.
/// The occupied length comes from the service, not from the appointment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedAppointment {
    #[serde(rename = "appointment_date")]
    pub date: NaiveDate,
    pub service_id: u64,
    pub appointment_time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestedService {
    pub service_id: u64,
    pub duration_minutes: u32,
}

/// Outcome of looking up a booked appointment's service length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceDuration {
    Resolved(u32),
    /// The service row is gone; the booking occupies nothing.
    Unresolved,
}

impl ServiceDuration {
    pub fn lookup(durations: &HashMap<u64, u32>, service_id: u64) -> Self {
        match durations.get(&service_id) {
            Some(minutes) => ServiceDuration::Resolved(*minutes),
            None => ServiceDuration::Unresolved,
        }
    }
}

/// Half-open absolute interval `[start, end)` in the clinic timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl Slot {
    pub fn label(&self) -> String {
        self.start.format("%H:%M").to_string()
    }
}

// ==============================================================================
// RESPONSE DTOs
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableDatesResponse {
    pub specialist_id: u64,
    pub month: String,
    pub available_dates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlotsResponse {
    pub specialist_id: u64,
    pub date: String,
    pub available_slots: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsForDay {
    pub date: String,
    pub available_slots: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableRangeSlotsResponse {
    pub specialist_id: u64,
    pub service_id: u64,
    pub slots_by_day: Vec<SlotsForDay>,
}

/// Advisory answer to "is this start time still free?". Not a reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotCheckResponse {
    pub specialist_id: u64,
    pub service_id: u64,
    pub date: String,
    pub time: String,
    pub available: bool,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AvailabilityError {
    #[error("invalid date format, expected YYYY-MM-DD: {0}")]
    InvalidDate(String),

    #[error("invalid month format, expected YYYY-MM: {0}")]
    InvalidMonth(String),

    #[error("invalid time format, expected HH:MM: {0}")]
    InvalidTime(String),

    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("doctor has no schedule for the selected date")]
    NoSchedule,

    #[error("no available slots for the selected date")]
    NoAvailableSlots,

    #[error("service {0} not found")]
    ServiceNotFound(u64),

    #[error("service {service_id} has unusable duration of {minutes} minutes")]
    InvalidServiceDuration { service_id: u64, minutes: u32 },

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl AvailabilityError {
    /// Outcomes that mean "nothing bookable" rather than a failure.
    pub fn is_empty_availability(&self) -> bool {
        matches!(self, AvailabilityError::NoSchedule | AvailabilityError::NoAvailableSlots)
    }
}

impl From<anyhow::Error> for AvailabilityError {
    fn from(e: anyhow::Error) -> Self {
        AvailabilityError::DatabaseError(e.to_string())
    }
}

impl From<AvailabilityError> for AppError {
    fn from(e: AvailabilityError) -> Self {
        match e {
            AvailabilityError::InvalidDate(_)
            | AvailabilityError::InvalidMonth(_)
            | AvailabilityError::InvalidTime(_)
            | AvailabilityError::InvalidRange { .. } => AppError::BadRequest(e.to_string()),
            AvailabilityError::DatabaseError(msg) => AppError::Database(msg),
            _ => AppError::Internal(e.to_string()),
        }
    }
}
