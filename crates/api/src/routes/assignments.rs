//! Route definitions for the assignment store.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::assignments;
use crate::state::AppState;

/// Assignment routes mounted at `/assignments`.
///
/// ```text
/// GET    /          -> list_assignments (?collaborator_id=)
/// POST   /          -> create_assignment
/// PUT    /{id}      -> upsert_assignment
/// DELETE /{id}      -> delete_assignment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(assignments::list_assignments).post(assignments::create_assignment),
        )
        .route(
            "/{id}",
            put(assignments::upsert_assignment).delete(assignments::delete_assignment),
        )
}
