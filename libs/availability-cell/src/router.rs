use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    routing::get,
};

use shared_config::AppConfig;

use crate::handlers;
use crate::services::AvailabilityService;

/// Availability routes backed by the Supabase reader. Fails if the configured
/// clinic timezone is not a known IANA zone.
pub fn availability_routes(state: Arc<AppConfig>) -> Result<Router> {
    let service = AvailabilityService::new(&state)?;
    Ok(availability_routes_with_service(Arc::new(service)))
}

pub fn availability_routes_with_service(service: Arc<AvailabilityService>) -> Router {
    Router::new()
        .route("/available-dates", get(handlers::get_available_dates))
        .route("/available-slots", get(handlers::get_available_slots))
        .route("/slots-by-range", get(handlers::get_available_slots_by_range))
        .route("/slot-check", get(handlers::check_slot))
        .with_state(service)
}
