use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::models::{
    AvailabilityError, AvailableDatesResponse, AvailableRangeSlotsResponse,
    AvailableSlotsResponse, BookedAppointment, RequestedService, Slot, SlotCheckResponse,
    SlotsForDay,
};
use crate::services::calendar::{parse_date, parse_month, parse_slot_time, DATE_FORMAT};
use crate::services::reader::{ScheduleReader, SupabaseScheduleReader};
use crate::services::slots::SlotCalculator;

/// Public availability operations: month dates, one-day slots, range slots.
///
/// Read-only. Nothing here reserves a slot, so two callers may both see the
/// same start time as free and both go on to book it.
pub struct AvailabilityService {
    reader: Arc<dyn ScheduleReader>,
    calculator: SlotCalculator,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let tz = config.clinic_tz()?;
        Ok(Self::with_reader(Arc::new(SupabaseScheduleReader::new(config)), tz))
    }

    pub fn with_reader(reader: Arc<dyn ScheduleReader>, tz: Tz) -> Self {
        Self {
            reader,
            calculator: SlotCalculator::new(tz),
        }
    }

    /// Dates in `month` on which the doctor has a working window. Occupancy is
    /// not considered and `service_id` does not filter.
    pub async fn get_available_dates(
        &self,
        doctor_id: u64,
        service_id: u64,
        month: &str,
    ) -> Result<AvailableDatesResponse, AvailabilityError> {
        let (month_start, month_end) = parse_month(month)?;
        debug!(
            "Fetching scheduled dates for doctor {} (service {}) in {}",
            doctor_id, service_id, month
        );

        let dates = self
            .reader
            .get_distinct_scheduled_dates(doctor_id, month_start, month_end)
            .await?;

        Ok(AvailableDatesResponse {
            specialist_id: doctor_id,
            month: month.to_string(),
            available_dates: dates
                .iter()
                .map(|d| d.format(DATE_FORMAT).to_string())
                .collect(),
        })
    }

    /// Free start times on one date. A day without a schedule or without a
    /// free slot is a successful empty answer.
    pub async fn get_available_slots(
        &self,
        doctor_id: u64,
        service_id: u64,
        date: &str,
    ) -> Result<AvailableSlotsResponse, AvailabilityError> {
        let day = parse_date(date)?;

        let available_slots = match self.calculate_day_slots(doctor_id, service_id, day).await {
            Ok(slots) => slots.iter().map(Slot::label).collect(),
            Err(e) if e.is_empty_availability() => {
                debug!("No slots for doctor {} on {}: {}", doctor_id, day, e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        Ok(AvailableSlotsResponse {
            specialist_id: doctor_id,
            date: date.to_string(),
            available_slots,
        })
    }

    /// Free start times for every scheduled day in `[start_date, end_date]`.
    ///
    /// Windows and bookings are each loaded with a single query for the whole
    /// range. Days without a free slot are left out; a day that fails for any
    /// other reason is logged and left out too.
    pub async fn get_available_slots_by_range(
        &self,
        doctor_id: u64,
        service_id: u64,
        start_date: &str,
        end_date: &str,
    ) -> Result<AvailableRangeSlotsResponse, AvailabilityError> {
        let start = parse_date(start_date)?;
        let end = parse_date(end_date)?;
        if start > end {
            return Err(AvailabilityError::InvalidRange { start, end });
        }

        let mut response = AvailableRangeSlotsResponse {
            specialist_id: doctor_id,
            service_id,
            slots_by_day: Vec::new(),
        };

        let mut windows = self.reader.get_windows_in_range(doctor_id, start, end).await?;
        if windows.is_empty() {
            debug!("Doctor {} has no schedule between {} and {}", doctor_id, start, end);
            return Ok(response);
        }
        windows.sort_by_key(|w| (w.date, w.start_time));
        let total_windows = windows.len();
        // One window per date: the earliest-starting row wins, as in `get_window`.
        windows.dedup_by_key(|w| w.date);
        if windows.len() < total_windows {
            warn!(
                "Doctor {} has {} extra schedule rows between {} and {}; using the earliest per date",
                doctor_id,
                total_windows - windows.len(),
                start,
                end
            );
        }

        let booked = self
            .reader
            .get_booked_appointments_in_range(doctor_id, start, end)
            .await?;
        let requested = self.requested_service(service_id).await?;
        let durations = self.booked_durations(&booked).await?;

        let mut booked_by_day: HashMap<NaiveDate, Vec<BookedAppointment>> = HashMap::new();
        for appointment in booked {
            booked_by_day.entry(appointment.date).or_default().push(appointment);
        }

        for window in &windows {
            let day_bookings = booked_by_day
                .get(&window.date)
                .map(Vec::as_slice)
                .unwrap_or(&[]);

            let outcome = self.calculator.calculate(
                Some(window),
                &requested,
                window.date,
                day_bookings,
                &durations,
            );
            record_day(&mut response.slots_by_day, doctor_id, window.date, outcome);
        }

        Ok(response)
    }

    /// Whether `time` is currently a free start on `date` for this service.
    /// The answer is advisory: it is not held for the caller.
    pub async fn check_slot(
        &self,
        doctor_id: u64,
        service_id: u64,
        date: &str,
        time: &str,
    ) -> Result<SlotCheckResponse, AvailabilityError> {
        let day = parse_date(date)?;
        let start = parse_slot_time(time)?;

        let available = match self.calculate_day_slots(doctor_id, service_id, day).await {
            Ok(slots) => slots.iter().any(|slot| slot.start.time() == start),
            Err(e) if e.is_empty_availability() => false,
            Err(e) => return Err(e),
        };

        Ok(SlotCheckResponse {
            specialist_id: doctor_id,
            service_id,
            date: date.to_string(),
            time: time.to_string(),
            available,
        })
    }

    async fn calculate_day_slots(
        &self,
        doctor_id: u64,
        service_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<Slot>, AvailabilityError> {
        let window = self
            .reader
            .get_window(doctor_id, date)
            .await?
            .ok_or(AvailabilityError::NoSchedule)?;

        let requested = self.requested_service(service_id).await?;
        let booked = self.reader.get_booked_appointments(doctor_id, date).await?;
        let durations = self.booked_durations(&booked).await?;

        self.calculator
            .calculate(Some(&window), &requested, date, &booked, &durations)
    }

    async fn requested_service(&self, service_id: u64) -> Result<RequestedService, AvailabilityError> {
        let duration_minutes = self
            .reader
            .get_service_duration(service_id)
            .await?
            .ok_or(AvailabilityError::ServiceNotFound(service_id))?;

        if duration_minutes == 0 {
            return Err(AvailabilityError::InvalidServiceDuration {
                service_id,
                minutes: duration_minutes,
            });
        }

        Ok(RequestedService {
            service_id,
            duration_minutes,
        })
    }

    async fn booked_durations(
        &self,
        booked: &[BookedAppointment],
    ) -> Result<HashMap<u64, u32>, AvailabilityError> {
        let service_ids: Vec<u64> = booked
            .iter()
            .map(|a| a.service_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(self.reader.get_service_durations(&service_ids).await?)
    }
}

/// Fold one day's calculation into a range result. Days with no free slot are
/// omitted; a day that fails for any other reason is logged and dropped so the
/// rest of the range still answers.
fn record_day(
    slots_by_day: &mut Vec<SlotsForDay>,
    doctor_id: u64,
    date: NaiveDate,
    outcome: Result<Vec<Slot>, AvailabilityError>,
) {
    match outcome {
        Ok(slots) => slots_by_day.push(SlotsForDay {
            date: date.format(DATE_FORMAT).to_string(),
            available_slots: slots.iter().map(Slot::label).collect(),
        }),
        Err(AvailabilityError::NoAvailableSlots) => {}
        Err(e) => warn!("Skipping {} for doctor {} in range query: {}", date, doctor_id, e),
    }
}
