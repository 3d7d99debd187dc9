use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::api::health::{HealthResponse, HealthState};
use crate::display::SlotStore;
use crate::types::{Slot, SlotValue};

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<SlotStore>,
    pub health: Arc<HealthState>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/slots", get(get_slots))
        .route("/slots/:name", get(get_slot))
        .route("/health", get(get_health))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_slots(State(state): State<ApiState>) -> Json<BTreeMap<&'static str, SlotValue>> {
    Json(state.store.snapshot())
}

async fn get_slot(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Result<Json<SlotValue>, (StatusCode, String)> {
    let slot = Slot::from_name(&name)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("unknown slot: {name}")))?;
    state
        .store
        .get(slot)
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("slot not set yet: {name}")))
}

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(state.health.report())
}
