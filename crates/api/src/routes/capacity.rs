//! Route definitions for the capacity views.

use axum::routing::get;
use axum::Router;

use crate::handlers::capacity;
use crate::state::AppState;

/// Capacity routes, mounted at the `/api/v1` root.
///
/// ```text
/// GET /collaborators                    -> list_collaborators
/// GET /collaborators/{id}               -> get_collaborator
/// GET /collaborators/{id}/seasonality   -> get_seasonality
/// GET /team/summary                     -> team_summary
/// GET /benchmark                        -> benchmark
/// GET /client-files                     -> list_client_files
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/collaborators", get(capacity::list_collaborators))
        .route("/collaborators/{id}", get(capacity::get_collaborator))
        .route(
            "/collaborators/{id}/seasonality",
            get(capacity::get_seasonality),
        )
        .route("/team/summary", get(capacity::team_summary))
        .route("/benchmark", get(capacity::benchmark))
        .route("/client-files", get(capacity::list_client_files))
}
