//! Route definitions for document annotations.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::annotations;
use crate::state::AppState;

/// Annotation routes mounted at `/documents/{doc}/annotations`.
///
/// ```text
/// GET    /          -> list_annotations
/// POST   /          -> create_annotation
/// GET    /render    -> render_annotations
/// DELETE /{id}      -> delete_annotation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(annotations::list_annotations).post(annotations::create_annotation),
        )
        .route("/render", get(annotations::render_annotations))
        .route("/{id}", delete(annotations::delete_annotation))
}
