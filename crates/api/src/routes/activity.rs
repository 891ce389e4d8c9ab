use axum::routing::get;
use axum::Router;

use crate::handlers::activity;
use crate::state::AppState;

/// ```text
/// GET /activity   -> recent_activity (?limit=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/activity", get(activity::recent_activity))
}
