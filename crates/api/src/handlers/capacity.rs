//! Handlers for the capacity views.
//!
//! Every view is computed from the current assignment snapshot; nothing here
//! mutates state.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use cabinet_core::aggregation::{
    aggregate_collaborator, aggregate_team, list_loads, summarize_client_files, summarize_team,
    LoadAlert, LoadListing, LoadSortKey, SortDirection,
};
use cabinet_core::benchmark::benchmark_team;
use cabinet_core::seasonality::{project, workloads_for};
use cabinet_core::types::EntityId;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Query parameters for `GET /collaborators`.
#[derive(Debug, Default, Deserialize)]
pub struct LoadListQuery {
    pub sort_by: Option<LoadSortKey>,
    pub direction: Option<SortDirection>,
    /// `none`, `watch` or `overload`.
    pub alert: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl LoadListQuery {
    fn into_listing(self) -> AppResult<LoadListing> {
        let alert = match self.alert.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(LoadAlert::parse(raw).ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Invalid alert '{raw}'. Must be one of: none, watch, overload"
                ))
            })?),
        };
        Ok(LoadListing {
            sort_by: self.sort_by.unwrap_or_default(),
            direction: self.direction.unwrap_or_default(),
            alert,
            limit: self.limit,
            offset: self.offset,
        })
    }
}

// ---------------------------------------------------------------------------
// GET /collaborators
// ---------------------------------------------------------------------------

/// Aggregated load per collaborator, sorted, filtered and paginated.
pub async fn list_collaborators(
    State(state): State<AppState>,
    Query(params): Query<LoadListQuery>,
) -> AppResult<impl IntoResponse> {
    let listing = params.into_listing()?;
    let snapshot = state.portfolio.assignments.snapshot();
    let loads = aggregate_team(&state.portfolio.collaborators, &snapshot.items);
    let (page, total) = list_loads(loads, &listing);

    tracing::debug!(
        revision = snapshot.revision,
        total,
        returned = page.len(),
        "Listed collaborator loads"
    );

    Ok(Json(PageResponse { data: page, total }))
}

// ---------------------------------------------------------------------------
// GET /collaborators/{id}
// ---------------------------------------------------------------------------

pub async fn get_collaborator(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let collaborator = state.portfolio.collaborator(id)?;
    let snapshot = state.portfolio.assignments.snapshot();
    let load = aggregate_collaborator(collaborator, &snapshot.items);
    Ok(Json(DataResponse { data: load }))
}

// ---------------------------------------------------------------------------
// GET /collaborators/{id}/seasonality
// ---------------------------------------------------------------------------

/// Quarterly projection, memoized per assignment snapshot revision.
pub async fn get_seasonality(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let collaborator = state.portfolio.collaborator(id)?;
    let snapshot = state.portfolio.assignments.snapshot();

    let projection = state
        .seasonality_cache
        .get_or_compute(id, snapshot.revision, || {
            let workloads = workloads_for(id, &snapshot.items, &state.portfolio.client_files);
            project(collaborator, &workloads)
        });

    let stats = state.seasonality_cache.stats();
    tracing::debug!(
        collaborator_id = id,
        revision = snapshot.revision,
        hits = stats.hits,
        misses = stats.misses,
        "Seasonality projection served"
    );

    Ok(Json(DataResponse {
        data: projection.as_ref().clone(),
    }))
}

// ---------------------------------------------------------------------------
// GET /team/summary
// ---------------------------------------------------------------------------

pub async fn team_summary(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let snapshot = state.portfolio.assignments.snapshot();
    let loads = aggregate_team(&state.portfolio.collaborators, &snapshot.items);
    Ok(Json(DataResponse {
        data: summarize_team(&loads),
    }))
}

// ---------------------------------------------------------------------------
// GET /benchmark
// ---------------------------------------------------------------------------

/// Value-added benchmark over the whole team, in roster order.
pub async fn benchmark(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let snapshot = state.portfolio.assignments.snapshot();
    let values: Vec<(EntityId, f64)> =
        aggregate_team(&state.portfolio.collaborators, &snapshot.items)
            .iter()
            .map(|l| (l.collaborator_id, l.value_added))
            .collect();
    Ok(Json(DataResponse {
        data: benchmark_team(&values),
    }))
}

// ---------------------------------------------------------------------------
// GET /client-files
// ---------------------------------------------------------------------------

pub async fn list_client_files(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let snapshot = state.portfolio.assignments.snapshot();
    Ok(Json(DataResponse {
        data: summarize_client_files(&state.portfolio.client_files, &snapshot.items),
    }))
}
