//! Handlers for managers and the prospect queue.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use cabinet_core::compatibility::{rank_managers, score, Compatibility};
use cabinet_core::roster::Prospect;
use cabinet_core::types::EntityId;
use cabinet_events::bus::PROSPECT_ASSIGNED;
use cabinet_events::DashboardEvent;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body for `POST /prospects/{id}/assign`.
#[derive(Debug, Deserialize)]
pub struct AssignProspectRequest {
    pub manager_id: EntityId,
}

/// Outcome of assigning a prospect.
#[derive(Debug, Serialize)]
pub struct ProspectAssignment {
    pub prospect: Prospect,
    pub manager_id: EntityId,
    pub manager_name: String,
    /// The pairing's compatibility at assignment time.
    pub compatibility: Compatibility,
}

pub async fn list_managers(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse {
        data: state.portfolio.managers.clone(),
    }))
}

/// Prospects still awaiting a manager.
pub async fn list_prospects(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let snapshot = state.portfolio.prospects.snapshot();
    Ok(Json(DataResponse {
        data: snapshot.items.clone(),
    }))
}

/// Every manager scored against the prospect, best match first.
pub async fn prospect_matches(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let prospect = state.portfolio.prospects.get(id)?;
    let ranked = rank_managers(&prospect, &state.portfolio.managers);

    tracing::debug!(
        prospect_id = id,
        best_manager = ?ranked.first().map(|c| c.manager_id),
        best_score = ?ranked.first().map(|c| c.score),
        "Ranked managers for prospect"
    );

    Ok(Json(DataResponse { data: ranked }))
}

/// Assign a prospect to a manager, removing it from the pending list.
///
/// Manager capacity figures are left unchanged.
pub async fn assign_prospect(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(body): Json<AssignProspectRequest>,
) -> AppResult<impl IntoResponse> {
    let manager = state.portfolio.manager(body.manager_id)?;
    let prospect = state.portfolio.prospects.take(id)?;
    let compatibility = score(&prospect, manager);

    tracing::info!(
        prospect_id = id,
        manager_id = manager.id,
        score = compatibility.score,
        "Prospect assigned"
    );
    state.event_bus.publish(
        DashboardEvent::new(PROSPECT_ASSIGNED)
            .with_entity("prospect", id)
            .with_payload(json!({
                "manager_id": manager.id,
                "score": compatibility.score,
            })),
    );

    Ok(Json(DataResponse {
        data: ProspectAssignment {
            prospect,
            manager_id: manager.id,
            manager_name: manager.name.clone(),
            compatibility,
        },
    }))
}
