//! Handlers for the assignment store.
//!
//! Request bodies go through the same normalization as seed records, so a
//! missing hour figure becomes `0` and a missing coefficient becomes `1`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use cabinet_core::ingest::{normalize_assignment, RawAssignment};
use cabinet_core::roster::Assignment;
use cabinet_core::store::UpsertOutcome;
use cabinet_core::types::{EntityId, Hours};
use cabinet_events::bus::{ASSIGNMENT_REMOVED, ASSIGNMENT_UPSERTED};
use cabinet_events::DashboardEvent;
use serde::Deserialize;
use serde_json::json;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /assignments`.
#[derive(Debug, Default, Deserialize)]
pub struct AssignmentFilter {
    pub collaborator_id: Option<EntityId>,
}

/// Body for creating or replacing an assignment.
#[derive(Debug, Deserialize)]
pub struct AssignmentInput {
    pub collaborator_id: EntityId,
    pub client_file_id: EntityId,
    /// `manager`, `encoder`, `supervisor` or `custom`.
    pub role: String,
    pub custom_label: Option<String>,
    pub budgeted_hours: Option<Hours>,
    pub realized_hours: Option<Hours>,
    pub value_coefficient: Option<f64>,
    pub period: Option<String>,
}

impl AssignmentInput {
    fn normalize(self, id: EntityId) -> AppResult<Assignment> {
        Ok(normalize_assignment(RawAssignment {
            id,
            collaborator_id: self.collaborator_id,
            client_file_id: self.client_file_id,
            role: self.role,
            custom_label: self.custom_label,
            budgeted_hours: self.budgeted_hours,
            realized_hours: self.realized_hours,
            value_coefficient: self.value_coefficient,
            period: self.period,
        })?)
    }
}

fn upserted_event(assignment: &Assignment, revision: u64, created: bool) -> DashboardEvent {
    DashboardEvent::new(ASSIGNMENT_UPSERTED)
        .with_entity("assignment", assignment.id)
        .with_payload(json!({
            "collaborator_id": assignment.collaborator_id,
            "client_file_id": assignment.client_file_id,
            "budgeted_hours": assignment.budgeted_hours,
            "created": created,
            "revision": revision,
        }))
}

// ---------------------------------------------------------------------------
// GET /assignments
// ---------------------------------------------------------------------------

/// Current snapshot, optionally filtered to one collaborator.
pub async fn list_assignments(
    State(state): State<AppState>,
    Query(filter): Query<AssignmentFilter>,
) -> AppResult<impl IntoResponse> {
    let snapshot = state.portfolio.assignments.snapshot();
    let items: Vec<Assignment> = snapshot
        .items
        .iter()
        .filter(|a| filter.collaborator_id.is_none_or(|id| a.collaborator_id == id))
        .cloned()
        .collect();
    Ok(Json(DataResponse { data: items }))
}

// ---------------------------------------------------------------------------
// POST /assignments
// ---------------------------------------------------------------------------

pub async fn create_assignment(
    State(state): State<AppState>,
    Json(input): Json<AssignmentInput>,
) -> AppResult<impl IntoResponse> {
    let draft = input.normalize(0)?;
    let (created, snapshot) = state.portfolio.assignments.create(draft)?;

    tracing::info!(
        assignment_id = created.id,
        collaborator_id = created.collaborator_id,
        client_file_id = created.client_file_id,
        revision = snapshot.revision,
        "Assignment created"
    );
    state
        .event_bus
        .publish(upserted_event(&created, snapshot.revision, true));

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

// ---------------------------------------------------------------------------
// PUT /assignments/{id}
// ---------------------------------------------------------------------------

/// Insert or replace the assignment with this id.
pub async fn upsert_assignment(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<AssignmentInput>,
) -> AppResult<impl IntoResponse> {
    let assignment = input.normalize(id)?;
    let (outcome, snapshot) = state.portfolio.assignments.upsert(assignment.clone())?;
    let created = outcome == UpsertOutcome::Inserted;

    tracing::info!(
        assignment_id = id,
        created,
        revision = snapshot.revision,
        "Assignment upserted"
    );
    state
        .event_bus
        .publish(upserted_event(&assignment, snapshot.revision, created));

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(DataResponse { data: assignment })))
}

// ---------------------------------------------------------------------------
// DELETE /assignments/{id}
// ---------------------------------------------------------------------------

pub async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<StatusCode> {
    let (removed, snapshot) = state.portfolio.assignments.remove(id)?;

    tracing::info!(
        assignment_id = id,
        collaborator_id = removed.collaborator_id,
        revision = snapshot.revision,
        "Assignment removed"
    );
    state.event_bus.publish(
        DashboardEvent::new(ASSIGNMENT_REMOVED)
            .with_entity("assignment", id)
            .with_payload(json!({
                "collaborator_id": removed.collaborator_id,
                "revision": snapshot.revision,
            })),
    );

    Ok(StatusCode::NO_CONTENT)
}
