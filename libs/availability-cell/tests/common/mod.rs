#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use availability_cell::models::{BookedAppointment, WorkingWindow};
use availability_cell::services::{AvailabilityService, ScheduleReader};

/// In-memory scheduling tables with a counter of storage round-trips.
#[derive(Default)]
pub struct InMemoryScheduleReader {
    pub windows: Vec<WorkingWindow>,
    pub appointments: Vec<(u64, BookedAppointment)>,
    pub services: HashMap<u64, u32>,
    pub queries: AtomicUsize,
}

impl InMemoryScheduleReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(mut self, doctor_id: u64, date: &str, start: &str, end: &str) -> Self {
        let id = self.windows.len() as u64 + 1;
        self.windows.push(WorkingWindow {
            id,
            doctor_id,
            date: day(date),
            start_time: NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
            end_time: NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
        });
        self
    }

    pub fn with_booking(mut self, doctor_id: u64, date: &str, time: &str, service_id: u64) -> Self {
        self.appointments.push((
            doctor_id,
            BookedAppointment {
                date: day(date),
                service_id,
                appointment_time: time.to_string(),
            },
        ));
        self
    }

    pub fn with_service(mut self, service_id: u64, minutes: u32) -> Self {
        self.services.insert(service_id, minutes);
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }

    fn windows_for(&self, doctor_id: u64, start: NaiveDate, end: NaiveDate) -> Vec<WorkingWindow> {
        let mut windows: Vec<WorkingWindow> = self
            .windows
            .iter()
            .filter(|w| w.doctor_id == doctor_id && w.date >= start && w.date <= end)
            .cloned()
            .collect();
        windows.sort_by_key(|w| (w.date, w.start_time));
        windows
    }

    fn bookings_for(&self, doctor_id: u64, start: NaiveDate, end: NaiveDate) -> Vec<BookedAppointment> {
        self.appointments
            .iter()
            .filter(|(doctor, a)| *doctor == doctor_id && a.date >= start && a.date <= end)
            .map(|(_, a)| a.clone())
            .collect()
    }
}

#[async_trait]
impl ScheduleReader for InMemoryScheduleReader {
    async fn get_window(&self, doctor_id: u64, date: NaiveDate) -> Result<Option<WorkingWindow>> {
        self.hit();
        Ok(self.windows_for(doctor_id, date, date).into_iter().next())
    }

    async fn get_windows_in_range(
        &self,
        doctor_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WorkingWindow>> {
        self.hit();
        Ok(self.windows_for(doctor_id, start, end))
    }

    async fn get_booked_appointments(
        &self,
        doctor_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<BookedAppointment>> {
        self.hit();
        Ok(self.bookings_for(doctor_id, date, date))
    }

    async fn get_booked_appointments_in_range(
        &self,
        doctor_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BookedAppointment>> {
        self.hit();
        Ok(self.bookings_for(doctor_id, start, end))
    }

    async fn get_service_duration(&self, service_id: u64) -> Result<Option<u32>> {
        self.hit();
        Ok(self.services.get(&service_id).copied())
    }

    async fn get_service_durations(&self, service_ids: &[u64]) -> Result<HashMap<u64, u32>> {
        if service_ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.hit();
        Ok(service_ids
            .iter()
            .filter_map(|id| self.services.get(id).map(|minutes| (*id, *minutes)))
            .collect())
    }

    async fn get_distinct_scheduled_dates(
        &self,
        doctor_id: u64,
        month_start: NaiveDate,
        month_end: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        self.hit();
        let dates: BTreeSet<NaiveDate> = self
            .windows_for(doctor_id, month_start, month_end)
            .into_iter()
            .map(|w| w.date)
            .collect();
        Ok(dates.into_iter().collect())
    }
}

pub fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

pub fn service_with(reader: Arc<InMemoryScheduleReader>) -> AvailabilityService {
    AvailabilityService::with_reader(reader, chrono_tz::Europe::Moscow)
}
