pub mod activity;
pub mod annotations;
pub mod assignments;
pub mod capacity;
pub mod health;
pub mod prospects;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /collaborators                                   aggregated loads (sort, filter, paginate)
/// /collaborators/{id}                              one collaborator's load
/// /collaborators/{id}/seasonality                  quarterly projection
/// /team/summary                                    team totals
/// /benchmark                                       value-added benchmark
/// /client-files                                    per-file summaries
///
/// /assignments                                     list, create
/// /assignments/{id}                                upsert, delete
///
/// /managers                                        manager capacity records
/// /prospects                                       pending prospects
/// /prospects/{id}/matches                          ranked manager matches
/// /prospects/{id}/assign                           assign to a manager (POST)
///
/// /documents/{doc}/annotations                     list, commit
/// /documents/{doc}/annotations/render              display list
/// /documents/{doc}/annotations/{id}                delete
///
/// /activity                                        recent events
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Capacity views over the assignment snapshot.
        .merge(capacity::router())
        .nest("/assignments", assignments::router())
        // Managers and the prospect queue.
        .merge(prospects::router())
        .nest("/documents/{doc}/annotations", annotations::router())
        .merge(activity::router())
}
