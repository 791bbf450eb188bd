use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::services::AvailabilityService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableDatesQuery {
    pub specialist_id: u64,
    pub service_id: u64,
    /// `YYYY-MM`
    pub month: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlotsQuery {
    pub specialist_id: u64,
    pub service_id: u64,
    /// `YYYY-MM-DD`
    pub date: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsByRangeQuery {
    pub specialist_id: u64,
    pub service_id: u64,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotCheckQuery {
    pub specialist_id: u64,
    pub service_id: u64,
    pub date: String,
    /// `HH:MM`
    pub time: String,
}

// ==============================================================================
// AVAILABILITY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_available_dates(
    State(service): State<Arc<AvailabilityService>>,
    Query(query): Query<AvailableDatesQuery>,
) -> Result<Json<Value>, AppError> {
    let dates = service
        .get_available_dates(query.specialist_id, query.service_id, &query.month)
        .await?;

    Ok(Json(json!(dates)))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(service): State<Arc<AvailabilityService>>,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let slots = service
        .get_available_slots(query.specialist_id, query.service_id, &query.date)
        .await?;

    Ok(Json(json!(slots)))
}

#[axum::debug_handler]
pub async fn get_available_slots_by_range(
    State(service): State<Arc<AvailabilityService>>,
    Query(query): Query<SlotsByRangeQuery>,
) -> Result<Json<Value>, AppError> {
    let slots = service
        .get_available_slots_by_range(
            query.specialist_id,
            query.service_id,
            &query.start_date,
            &query.end_date,
        )
        .await?;

    Ok(Json(json!(slots)))
}

/// Pre-booking check. Advisory only: nothing is held for the caller.
#[axum::debug_handler]
pub async fn check_slot(
    State(service): State<Arc<AvailabilityService>>,
    Query(query): Query<SlotCheckQuery>,
) -> Result<Json<Value>, AppError> {
    let check = service
        .check_slot(query.specialist_id, query.service_id, &query.date, &query.time)
        .await?;

    Ok(Json(json!(check)))
}
