//! Handlers for document annotations.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use cabinet_core::annotation::{AnnotationKind, Rect};
use serde::Deserialize;
use uuid::Uuid;

use crate::annotations::validate_document_key;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body for `POST /documents/{doc}/annotations`.
///
/// `rect` is in natural image pixels. `image_width`/`image_height` set the
/// image size when this is the document's first annotation and are ignored
/// afterwards.
#[derive(Debug, Deserialize)]
pub struct CreateAnnotationRequest {
    pub rect: Rect,
    pub comment: String,
    pub kind: Option<AnnotationKind>,
    pub image_width: Option<f64>,
    pub image_height: Option<f64>,
}

pub async fn list_annotations(
    State(state): State<AppState>,
    Path(doc): Path<String>,
) -> AppResult<impl IntoResponse> {
    validate_document_key(&doc)?;
    Ok(Json(DataResponse {
        data: state.annotations.list(&doc).await,
    }))
}

pub async fn create_annotation(
    State(state): State<AppState>,
    Path(doc): Path<String>,
    Json(body): Json<CreateAnnotationRequest>,
) -> AppResult<impl IntoResponse> {
    let image_size = match (body.image_width, body.image_height) {
        (Some(w), Some(h)) => Some((w, h)),
        (None, None) => None,
        _ => {
            return Err(AppError::BadRequest(
                "image_width and image_height must be given together".to_string(),
            ))
        }
    };

    let annotation = state
        .annotations
        .commit(
            &doc,
            body.rect,
            &body.comment,
            body.kind.unwrap_or(AnnotationKind::Highlight),
            image_size,
        )
        .await?;

    tracing::info!(
        document = %doc,
        annotation_id = %annotation.id,
        kind = annotation.kind.as_str(),
        "Annotation created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: annotation })))
}

pub async fn delete_annotation(
    State(state): State<AppState>,
    Path((doc, id)): Path<(String, Uuid)>,
) -> AppResult<StatusCode> {
    state
        .annotations
        .delete(&doc, id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("annotation {id} not found on {doc}")))?;

    tracing::info!(document = %doc, annotation_id = %id, "Annotation deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Full display list for the document's canvas.
pub async fn render_annotations(
    State(state): State<AppState>,
    Path(doc): Path<String>,
) -> AppResult<impl IntoResponse> {
    validate_document_key(&doc)?;
    Ok(Json(DataResponse {
        data: state.annotations.render(&doc).await,
    }))
}
