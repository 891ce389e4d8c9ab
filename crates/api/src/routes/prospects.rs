//! Route definitions for managers and the prospect queue.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::prospects;
use crate::state::AppState;

/// Prospect routes, mounted at the `/api/v1` root.
///
/// ```text
/// GET  /managers                 -> list_managers
/// GET  /prospects                -> list_prospects
/// GET  /prospects/{id}/matches   -> prospect_matches
/// POST /prospects/{id}/assign    -> assign_prospect
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/managers", get(prospects::list_managers))
        .route("/prospects", get(prospects::list_prospects))
        .route("/prospects/{id}/matches", get(prospects::prospect_matches))
        .route("/prospects/{id}/assign", post(prospects::assign_prospect))
}
