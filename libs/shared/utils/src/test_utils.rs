use std::sync::Arc;
use serde_json::json;

use shared_config::AppConfig;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub clinic_timezone: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            clinic_timezone: "UTC".to_string(),
        }
    }
}

impl TestConfig {
    /// Config pointing at a mock PostgREST server.
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn with_timezone(mut self, timezone: &str) -> Self {
        self.clinic_timezone = timezone.to_string();
        self
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            clinic_timezone: self.clinic_timezone.clone(),
            server_port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Row shapes as PostgREST returns them for the scheduling tables.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn schedule_row(id: u64, doctor_id: u64, date: &str, start: &str, end: &str) -> serde_json::Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "date": date,
            "start_time": start,
            "end_time": end
        })
    }

    pub fn appointment_row(date: &str, time: &str, service_id: u64) -> serde_json::Value {
        json!({
            "appointment_date": date,
            "appointment_time": time,
            "service_id": service_id
        })
    }

    pub fn service_row(id: u64, duration_minutes: u32) -> serde_json::Value {
        json!({
            "id": id,
            "duration_minutes": duration_minutes
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert_eq!(app_config.clinic_timezone, "UTC");
    }

    #[test]
    fn test_timezone_override() {
        let config = TestConfig::with_supabase_url("http://127.0.0.1:9999")
            .with_timezone("Europe/Moscow")
            .to_app_config();

        assert_eq!(config.supabase_url, "http://127.0.0.1:9999");
        assert!(config.clinic_tz().is_ok());
    }

    #[test]
    fn test_schedule_row_shape() {
        let row = MockSupabaseResponses::schedule_row(1, 7, "2025-09-15", "09:00:00", "11:00:00");
        assert_eq!(row["doctor_id"], 7);
        assert_eq!(row["start_time"], "09:00:00");
    }
}
