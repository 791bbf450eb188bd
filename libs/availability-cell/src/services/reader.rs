use std::collections::{BTreeSet, HashMap};

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{BookedAppointment, WorkingWindow};
use crate::services::calendar::DATE_FORMAT;

/// Appointment statuses that no longer occupy the doctor's time:
/// cancelled by the patient (3) and cancelled by the clinic (4).
pub const CANCELLED_STATUS_IDS: [u32; 2] = [3, 4];

/// PostgREST filter value excluding every cancelled status, e.g. `not.in.(3,4)`.
pub fn active_status_filter() -> String {
    let ids = CANCELLED_STATUS_IDS
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("not.in.({})", ids)
}

/// Read-only view of the scheduling tables the availability engine depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleReader: Send + Sync {
    /// The doctor's window on `date`. When storage holds several rows for the
    /// date, the one starting earliest is returned.
    async fn get_window(&self, doctor_id: u64, date: NaiveDate) -> Result<Option<WorkingWindow>>;

    /// Windows with `start <= date <= end`, ordered by date then start time.
    async fn get_windows_in_range(
        &self,
        doctor_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WorkingWindow>>;

    async fn get_booked_appointments(
        &self,
        doctor_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<BookedAppointment>>;

    async fn get_booked_appointments_in_range(
        &self,
        doctor_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BookedAppointment>>;

    async fn get_service_duration(&self, service_id: u64) -> Result<Option<u32>>;

    /// Durations for the services that exist; missing ids are simply absent.
    async fn get_service_durations(&self, service_ids: &[u64]) -> Result<HashMap<u64, u32>>;

    /// Distinct dates with a working window, ascending.
    async fn get_distinct_scheduled_dates(
        &self,
        doctor_id: u64,
        month_start: NaiveDate,
        month_end: NaiveDate,
    ) -> Result<Vec<NaiveDate>>;
}

#[derive(Debug, Deserialize)]
struct ServiceRow {
    id: u64,
    duration_minutes: u32,
}

#[derive(Debug, Deserialize)]
struct ScheduleDateRow {
    date: NaiveDate,
}

const SCHEDULE_COLUMNS: &str = "id,doctor_id,date,start_time,end_time";
const APPOINTMENT_COLUMNS: &str = "appointment_date,appointment_time,service_id";

/// `ScheduleReader` backed by the PostgREST API.
pub struct SupabaseScheduleReader {
    supabase: SupabaseClient,
}

impl SupabaseScheduleReader {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }
}

#[async_trait]
impl ScheduleReader for SupabaseScheduleReader {
    async fn get_window(&self, doctor_id: u64, date: NaiveDate) -> Result<Option<WorkingWindow>> {
        debug!("Fetching schedule for doctor {} on {}", doctor_id, date);

        let path = format!(
            "/rest/v1/schedules?doctor_id=eq.{}&date=eq.{}&select={}&order=start_time.asc&limit=1",
            doctor_id,
            date.format(DATE_FORMAT),
            SCHEDULE_COLUMNS
        );
        let rows: Vec<WorkingWindow> = self.supabase.select(&path).await?;

        Ok(rows.into_iter().next())
    }

    async fn get_windows_in_range(
        &self,
        doctor_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WorkingWindow>> {
        debug!("Fetching schedules for doctor {} from {} to {}", doctor_id, start, end);

        let path = format!(
            "/rest/v1/schedules?doctor_id=eq.{}&date=gte.{}&date=lte.{}&select={}&order=date.asc,start_time.asc",
            doctor_id,
            start.format(DATE_FORMAT),
            end.format(DATE_FORMAT),
            SCHEDULE_COLUMNS
        );

        self.supabase.select(&path).await
    }

    async fn get_booked_appointments(
        &self,
        doctor_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<BookedAppointment>> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&appointment_date=eq.{}&status_id={}&select={}&order=appointment_time.asc",
            doctor_id,
            date.format(DATE_FORMAT),
            active_status_filter(),
            APPOINTMENT_COLUMNS
        );

        self.supabase.select(&path).await
    }

    async fn get_booked_appointments_in_range(
        &self,
        doctor_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BookedAppointment>> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&appointment_date=gte.{}&appointment_date=lte.{}&status_id={}&select={}&order=appointment_date.asc,appointment_time.asc",
            doctor_id,
            start.format(DATE_FORMAT),
            end.format(DATE_FORMAT),
            active_status_filter(),
            APPOINTMENT_COLUMNS
        );

        self.supabase.select(&path).await
    }

    async fn get_service_duration(&self, service_id: u64) -> Result<Option<u32>> {
        let path = format!(
            "/rest/v1/services?id=eq.{}&select=id,duration_minutes&limit=1",
            service_id
        );
        let rows: Vec<ServiceRow> = self.supabase.select(&path).await?;

        Ok(rows.into_iter().next().map(|row| row.duration_minutes))
    }

    async fn get_service_durations(&self, service_ids: &[u64]) -> Result<HashMap<u64, u32>> {
        if service_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids = service_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let path = format!("/rest/v1/services?id=in.({})&select=id,duration_minutes", ids);
        let rows: Vec<ServiceRow> = self.supabase.select(&path).await?;

        Ok(rows.into_iter().map(|row| (row.id, row.duration_minutes)).collect())
    }

    async fn get_distinct_scheduled_dates(
        &self,
        doctor_id: u64,
        month_start: NaiveDate,
        month_end: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let path = format!(
            "/rest/v1/schedules?doctor_id=eq.{}&date=gte.{}&date=lte.{}&select=date&order=date.asc",
            doctor_id,
            month_start.format(DATE_FORMAT),
            month_end.format(DATE_FORMAT)
        );
        let rows: Vec<ScheduleDateRow> = self.supabase.select(&path).await?;

        // PostgREST has no DISTINCT; split shifts on one day come back as separate rows.
        let dates: BTreeSet<NaiveDate> = rows.into_iter().map(|row| row.date).collect();
        Ok(dates.into_iter().collect())
    }
}
