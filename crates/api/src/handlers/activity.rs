use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default number of events returned by `GET /activity`.
pub const DEFAULT_ACTIVITY_LIMIT: i64 = 50;

/// Most recent dashboard events, newest first.
pub async fn recent_activity(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<impl IntoResponse> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
        .clamp(1, state.activity.capacity() as i64) as usize;
    Ok(Json(DataResponse {
        data: state.activity.recent(limit).await,
    }))
}
