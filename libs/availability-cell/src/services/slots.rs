use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::models::{
    AvailabilityError, BookedAppointment, RequestedService, ServiceDuration, Slot,
    TimeInterval, WorkingWindow,
};
use crate::services::calendar::{build_occupied, build_window};

/// Computes free start times for one doctor-day. Pure: all data is handed in.
#[derive(Debug, Clone, Copy)]
pub struct SlotCalculator {
    tz: Tz,
}

impl SlotCalculator {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Walk the working window on a grid of `requested.duration_minutes` and keep
    /// every slot that overlaps no booking. The last slot may end exactly at the
    /// window end.
    pub fn calculate(
        &self,
        window: Option<&WorkingWindow>,
        requested: &RequestedService,
        date: NaiveDate,
        booked: &[BookedAppointment],
        durations: &HashMap<u64, u32>,
    ) -> Result<Vec<Slot>, AvailabilityError> {
        let window = window.ok_or(AvailabilityError::NoSchedule)?;

        if requested.duration_minutes == 0 {
            return Err(AvailabilityError::InvalidServiceDuration {
                service_id: requested.service_id,
                minutes: requested.duration_minutes,
            });
        }
        let step = Duration::minutes(i64::from(requested.duration_minutes));

        let occupied = self.occupied_intervals(date, booked, durations);
        let working = build_window(window, date, self.tz);

        let mut slots = Vec::new();
        let mut slot_start = working.start;
        while slot_start + step <= working.end {
            let candidate = Slot {
                start: slot_start,
                end: slot_start + step,
            };
            let interval = TimeInterval {
                start: candidate.start,
                end: candidate.end,
            };

            if !occupied.iter().any(|busy| interval.overlaps(busy)) {
                slots.push(candidate);
            }
            slot_start = candidate.end;
        }

        debug!(
            "{} free slots of {} minutes on {} ({} bookings)",
            slots.len(),
            requested.duration_minutes,
            date,
            occupied.len()
        );

        if slots.is_empty() {
            return Err(AvailabilityError::NoAvailableSlots);
        }

        Ok(slots)
    }

    fn occupied_intervals(
        &self,
        date: NaiveDate,
        booked: &[BookedAppointment],
        durations: &HashMap<u64, u32>,
    ) -> Vec<TimeInterval> {
        booked
            .iter()
            .filter_map(|appointment| {
                let minutes = match ServiceDuration::lookup(durations, appointment.service_id) {
                    ServiceDuration::Resolved(minutes) => minutes,
                    ServiceDuration::Unresolved => {
                        warn!(
                            "Service {} for booking at {} on {} has no duration; booking ignored",
                            appointment.service_id, appointment.appointment_time, date
                        );
                        return None;
                    }
                };

                match build_occupied(&appointment.appointment_time, date, minutes, self.tz) {
                    Ok(interval) => Some(interval),
                    Err(e) => {
                        warn!("Skipping booking on {}: {}", date, e);
                        None
                    }
                }
            })
            .collect()
    }
}
