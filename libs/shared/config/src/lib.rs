use std::env;

use anyhow::{Result, anyhow};
use chrono_tz::Tz;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// IANA zone the clinic's wall-clock schedules are written in.
    pub clinic_timezone: String,
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            clinic_timezone: env::var("CLINIC_TIMEZONE")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_TIMEZONE not set, using UTC");
                    "UTC".to_string()
                }),
            server_port: env::var("PORT")
                .ok()
                .and_then(|port| {
                    port.parse().map_err(|_| warn!("PORT is not a valid port number: {}", port)).ok()
                })
                .unwrap_or(3000),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
    }

    pub fn clinic_tz(&self) -> Result<Tz> {
        self.clinic_timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("Invalid clinic timezone '{}': {}", self.clinic_timezone, e))
    }
}
