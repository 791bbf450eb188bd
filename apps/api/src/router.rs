use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    routing::get,
};

use availability_cell::router::availability_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Result<Router> {
    Ok(Router::new()
        .route("/", get(|| async { "Clinic availability API is running!" }))
        .nest("/appointments", availability_routes(state)?))
}
