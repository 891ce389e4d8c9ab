//! Per-document annotation boards.
//!
//! The server owns one [`Annotator`] per document key and is the parent that
//! receives every list change. Boards are created lazily on the first
//! committed annotation. Mutations publish `annotation.*` events on the
//! shared [`EventBus`].

use std::collections::HashMap;
use std::sync::Arc;

use cabinet_core::annotation::{
    render_annotations, Annotation, AnnotationKind, Annotator, DrawCommand, Rect, Viewport,
};
use cabinet_core::error::CoreError;
use cabinet_events::bus::{ANNOTATION_CREATED, ANNOTATION_DELETED};
use cabinet_events::{DashboardEvent, EventBus};
use serde_json::json;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Natural size used when a board is created without explicit dimensions
/// (A4 scanned at 150 dpi).
pub const DEFAULT_IMAGE_WIDTH: f64 = 1240.0;
pub const DEFAULT_IMAGE_HEIGHT: f64 = 1754.0;

/// Maximum length of a document key.
pub const MAX_DOCUMENT_KEY_LENGTH: usize = 128;

/// Check a document key: non-empty, bounded, `[A-Za-z0-9._-]` only.
pub fn validate_document_key(key: &str) -> Result<(), CoreError> {
    if key.is_empty() || key.len() > MAX_DOCUMENT_KEY_LENGTH {
        return Err(CoreError::Validation(format!(
            "document key must be 1 to {MAX_DOCUMENT_KEY_LENGTH} characters"
        )));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(CoreError::Validation(format!(
            "document key '{key}' may only contain letters, digits, '.', '_' and '-'"
        )));
    }
    Ok(())
}

fn validate_image_size(width: f64, height: f64) -> Result<(), CoreError> {
    if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
        return Err(CoreError::Validation(format!(
            "image size must be positive, got {width}x{height}"
        )));
    }
    Ok(())
}

/// All annotators, keyed by document.
pub struct AnnotationBoards {
    boards: Mutex<HashMap<String, Annotator>>,
    event_bus: Arc<EventBus>,
}

impl AnnotationBoards {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            boards: Mutex::new(HashMap::new()),
            event_bus,
        }
    }

    fn new_board(document: &str, width: f64, height: f64) -> Annotator {
        let key = document.to_string();
        Annotator::new(Viewport::identity(width, height)).on_annotations_change(Box::new(
            move |list| {
                tracing::debug!(document = %key, count = list.len(), "Annotations changed");
            },
        ))
    }

    fn commit_on(
        board: &mut Annotator,
        rect: Rect,
        comment: &str,
        kind: AnnotationKind,
    ) -> Result<Annotation, CoreError> {
        let viewport = board.viewport();
        if rect.x + rect.width > viewport.natural_width
            || rect.y + rect.height > viewport.natural_height
        {
            return Err(CoreError::Validation(format!(
                "annotation rectangle exceeds the {}x{} image",
                viewport.natural_width, viewport.natural_height
            )));
        }
        Ok(board.commit(rect, comment, kind)?.clone())
    }

    /// Committed annotations for a document, in creation order. Unknown
    /// documents have none.
    pub async fn list(&self, document: &str) -> Vec<Annotation> {
        self.boards
            .lock()
            .await
            .get(document)
            .map(|a| a.annotations().to_vec())
            .unwrap_or_default()
    }

    /// Commit an annotation, creating the board on first use with the given
    /// natural image size (or the default page size).
    pub async fn commit(
        &self,
        document: &str,
        rect: Rect,
        comment: &str,
        kind: AnnotationKind,
        image_size: Option<(f64, f64)>,
    ) -> Result<Annotation, CoreError> {
        validate_document_key(document)?;
        let (width, height) = image_size.unwrap_or((DEFAULT_IMAGE_WIDTH, DEFAULT_IMAGE_HEIGHT));
        validate_image_size(width, height)?;

        let mut boards = self.boards.lock().await;
        let annotation = match boards.get_mut(document) {
            Some(board) => Self::commit_on(board, rect, comment, kind)?,
            None => {
                // A new board only joins the map once its first commit succeeds.
                let mut board = Self::new_board(document, width, height);
                let annotation = Self::commit_on(&mut board, rect, comment, kind)?;
                boards.insert(document.to_string(), board);
                annotation
            }
        };
        drop(boards);

        self.event_bus.publish(
            DashboardEvent::new(ANNOTATION_CREATED).with_payload(json!({
                "document": document,
                "annotation_id": annotation.id,
                "kind": annotation.kind.as_str(),
            })),
        );
        Ok(annotation)
    }

    /// Delete an annotation. Returns `None` when the document or the id is
    /// unknown.
    pub async fn delete(&self, document: &str, id: Uuid) -> Option<Annotation> {
        let removed = self.boards.lock().await.get_mut(document)?.delete(id)?;

        self.event_bus.publish(
            DashboardEvent::new(ANNOTATION_DELETED).with_payload(json!({
                "document": document,
                "annotation_id": removed.id,
            })),
        );
        Some(removed)
    }

    /// Full display list for a document. Unknown documents render as an
    /// empty page of the default size.
    pub async fn render(&self, document: &str) -> Vec<DrawCommand> {
        match self.boards.lock().await.get(document) {
            Some(board) => board.render(),
            None => render_annotations(&[], DEFAULT_IMAGE_WIDTH, DEFAULT_IMAGE_HEIGHT),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn rect(x: f64, y: f64) -> Rect {
        Rect {
            x,
            y,
            width: 40.0,
            height: 20.0,
        }
    }

    #[test]
    fn document_key_rules() {
        assert!(validate_document_key("invoice-2024_03.png").is_ok());
        assert!(validate_document_key("").is_err());
        assert!(validate_document_key("../etc/passwd").is_err());
        assert!(validate_document_key(&"a".repeat(MAX_DOCUMENT_KEY_LENGTH + 1)).is_err());
    }

    #[tokio::test]
    async fn commit_creates_board_and_publishes_event() {
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        let boards = AnnotationBoards::new(Arc::clone(&bus));

        let saved = boards
            .commit("doc-1", rect(10.0, 10.0), "Check total", AnnotationKind::Highlight, None)
            .await
            .unwrap();

        assert_eq!(boards.list("doc-1").await, vec![saved.clone()]);
        assert!(boards.list("doc-2").await.is_empty());

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, ANNOTATION_CREATED);
        assert_eq!(event.payload["document"], "doc-1");
    }

    #[tokio::test]
    async fn rectangle_outside_image_is_rejected() {
        let boards = AnnotationBoards::new(Arc::new(EventBus::default()));
        let result = boards
            .commit(
                "small",
                rect(90.0, 0.0),
                "off the edge",
                AnnotationKind::Outline,
                Some((100.0, 100.0)),
            )
            .await;
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn rejected_first_commit_does_not_fix_the_image_size() {
        let boards = AnnotationBoards::new(Arc::new(EventBus::default()));
        let square = Rect {
            x: 150.0,
            y: 150.0,
            width: 40.0,
            height: 40.0,
        };

        let first = boards
            .commit("scan", square, "late fee", AnnotationKind::Outline, Some((100.0, 100.0)))
            .await;
        assert_matches!(first, Err(CoreError::Validation(_)));
        assert!(boards.list("scan").await.is_empty());

        let retry = boards
            .commit("scan", square, "late fee", AnnotationKind::Outline, Some((2000.0, 2000.0)))
            .await;
        assert!(retry.is_ok());
        assert_eq!(
            boards.render("scan").await[0],
            DrawCommand::Clear {
                width: 2000.0,
                height: 2000.0
            }
        );
    }

    #[tokio::test]
    async fn blank_first_comment_leaves_no_board() {
        let boards = AnnotationBoards::new(Arc::new(EventBus::default()));
        let result = boards
            .commit("memo", rect(0.0, 0.0), "   ", AnnotationKind::Highlight, Some((300.0, 300.0)))
            .await;
        assert_matches!(result, Err(CoreError::Validation(_)));

        assert_eq!(
            boards.render("memo").await,
            vec![DrawCommand::Clear {
                width: DEFAULT_IMAGE_WIDTH,
                height: DEFAULT_IMAGE_HEIGHT
            }]
        );
    }

    #[tokio::test]
    async fn delete_unknown_returns_none() {
        let boards = AnnotationBoards::new(Arc::new(EventBus::default()));
        assert!(boards.delete("nope", Uuid::new_v4()).await.is_none());

        let saved = boards
            .commit("doc", rect(0.0, 0.0), "n", AnnotationKind::Outline, None)
            .await
            .unwrap();
        assert!(boards.delete("doc", Uuid::new_v4()).await.is_none());
        assert_eq!(boards.delete("doc", saved.id).await.map(|a| a.id), Some(saved.id));
        assert!(boards.list("doc").await.is_empty());
    }

    #[tokio::test]
    async fn render_unknown_document_is_blank_page() {
        let boards = AnnotationBoards::new(Arc::new(EventBus::default()));
        let commands = boards.render("blank").await;
        assert_eq!(
            commands,
            vec![DrawCommand::Clear {
                width: DEFAULT_IMAGE_WIDTH,
                height: DEFAULT_IMAGE_HEIGHT
            }]
        );
    }
}
