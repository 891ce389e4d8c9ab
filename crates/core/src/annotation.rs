//! Rectangle annotation over a static image.
//!
//! [`Annotator`] is the pointer-driven state machine
//! (`Idle -> Drawing -> PendingComment -> Idle`) that owns the committed
//! annotation list. Coordinates arrive in client space and are stored in the
//! image's natural pixel space via [`Viewport`]. Rendering produces a full
//! display list of [`DrawCommand`]s on every call; the canvas backend replays
//! it after clearing.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum drag size, in natural image pixels, on both axes.
pub const MIN_DRAG_PX: f64 = 10.0;

/// Maximum comment length in characters.
pub const MAX_COMMENT_LENGTH: usize = 500;

/// Stroke width in pixels for committed rectangles.
pub const STROKE_WIDTH: f64 = 2.0;

/// Offset of the index label from the rectangle's top-left corner.
const LABEL_OFFSET: f64 = 4.0;

/// Font size for index labels.
const LABEL_FONT_PX: f64 = 14.0;

/// Color of the in-progress drag preview.
const PREVIEW_COLOR: &str = "#6B7280";

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle with non-negative size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Build a rectangle from two opposite corners in any drag direction.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Whether the rectangle is large enough to become an annotation.
    pub fn meets_threshold(&self) -> bool {
        self.width >= MIN_DRAG_PX && self.height >= MIN_DRAG_PX
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// Maps client (on-screen) coordinates to natural image pixels.
///
/// `origin_*` is the top-left of the rendered image in client space;
/// `display_*` its rendered size; `natural_*` its intrinsic size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub origin_x: f64,
    pub origin_y: f64,
    pub display_width: f64,
    pub display_height: f64,
    pub natural_width: f64,
    pub natural_height: f64,
}

impl Viewport {
    /// A viewport rendering the image at its natural size at the origin.
    pub fn identity(width: f64, height: f64) -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            display_width: width,
            display_height: height,
            natural_width: width,
            natural_height: height,
        }
    }

    fn scale(natural: f64, display: f64) -> f64 {
        if display > 0.0 && natural > 0.0 {
            natural / display
        } else {
            1.0
        }
    }

    pub fn scale_x(&self) -> f64 {
        Self::scale(self.natural_width, self.display_width)
    }

    pub fn scale_y(&self) -> f64 {
        Self::scale(self.natural_height, self.display_height)
    }

    /// Convert a client-space point into natural image space.
    pub fn to_image(&self, client: Point) -> Point {
        Point {
            x: (client.x - self.origin_x) * self.scale_x(),
            y: (client.y - self.origin_y) * self.scale_y(),
        }
    }
}

// ---------------------------------------------------------------------------
// Annotation kinds and styles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Highlight,
    Outline,
}

/// Paint settings for one annotation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnnotationStyle {
    pub stroke: &'static str,
    /// `None` for stroke-only rendering.
    pub fill: Option<&'static str>,
    pub label: &'static str,
}

impl AnnotationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Highlight => "highlight",
            Self::Outline => "outline",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "highlight" => Ok(Self::Highlight),
            "outline" => Ok(Self::Outline),
            _ => Err(CoreError::Validation(format!(
                "Invalid annotation kind '{s}'. Must be one of: highlight, outline"
            ))),
        }
    }

    pub fn style(&self) -> AnnotationStyle {
        match self {
            Self::Highlight => AnnotationStyle {
                stroke: "#F59E0B",
                fill: Some("#FDE68A66"),
                label: "#B45309",
            },
            Self::Outline => AnnotationStyle {
                stroke: "#EF4444",
                fill: None,
                label: "#B91C1C",
            },
        }
    }
}

/// A committed annotation, in natural image pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: Uuid,
    pub rect: Rect,
    pub comment: String,
    pub kind: AnnotationKind,
}

/// Validate a comment: non-empty after trimming and within
/// [`MAX_COMMENT_LENGTH`]. Returns the trimmed text.
pub fn validate_comment(comment: &str) -> Result<String, CoreError> {
    let trimmed = comment.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "annotation comment must not be empty".to_string(),
        ));
    }
    let len = trimmed.chars().count();
    if len > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "annotation comment has {len} characters, maximum is {MAX_COMMENT_LENGTH}"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate a rectangle submitted without going through the pointer flow.
pub fn validate_rect(rect: &Rect) -> Result<(), CoreError> {
    if !rect.is_finite() {
        return Err(CoreError::Validation(
            "annotation rectangle must contain finite numbers".to_string(),
        ));
    }
    if rect.x < 0.0 || rect.y < 0.0 {
        return Err(CoreError::Validation(format!(
            "annotation rectangle origin must not be negative, got ({}, {})",
            rect.x, rect.y
        )));
    }
    if !rect.meets_threshold() {
        return Err(CoreError::Validation(format!(
            "annotation rectangle must be at least {MIN_DRAG_PX}x{MIN_DRAG_PX} px, got {}x{}",
            rect.width, rect.height
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Display list
// ---------------------------------------------------------------------------

/// One immediate-mode 2D canvas operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        width: f64,
        height: f64,
    },
    FillRect {
        rect: Rect,
        color: &'static str,
    },
    StrokeRect {
        rect: Rect,
        color: &'static str,
        line_width: f64,
        dashed: bool,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        color: &'static str,
        font_px: f64,
    },
}

/// Full redraw of `annotations` on a `width` x `height` canvas.
pub fn render_annotations(annotations: &[Annotation], width: f64, height: f64) -> Vec<DrawCommand> {
    let mut commands = Vec::with_capacity(1 + annotations.len() * 3);
    commands.push(DrawCommand::Clear { width, height });

    for (i, a) in annotations.iter().enumerate() {
        let style = a.kind.style();
        if let Some(fill) = style.fill {
            commands.push(DrawCommand::FillRect {
                rect: a.rect,
                color: fill,
            });
        }
        commands.push(DrawCommand::StrokeRect {
            rect: a.rect,
            color: style.stroke,
            line_width: STROKE_WIDTH,
            dashed: false,
        });
        commands.push(DrawCommand::Text {
            x: a.rect.x + LABEL_OFFSET,
            y: a.rect.y + LABEL_OFFSET + LABEL_FONT_PX,
            text: (i + 1).to_string(),
            color: style.label,
            font_px: LABEL_FONT_PX,
        });
    }
    commands
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnnotatorState {
    Idle,
    /// Corners are in natural image space.
    Drawing { start: Point, current: Point },
    PendingComment { draft: Rect },
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// No drag was in progress.
    Ignored,
    /// Drag below [`MIN_DRAG_PX`]; back to idle, nothing created.
    TooSmall,
    /// Drag accepted; waiting for a comment.
    AwaitingComment(Rect),
}

/// Callback invoked with the full list after every change.
pub type ChangeListener = Box<dyn FnMut(&[Annotation]) + Send>;

pub struct Annotator {
    viewport: Viewport,
    state: AnnotatorState,
    annotations: Vec<Annotation>,
    on_change: Option<ChangeListener>,
}

impl fmt::Debug for Annotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Annotator")
            .field("viewport", &self.viewport)
            .field("state", &self.state)
            .field("annotations", &self.annotations)
            .field("has_listener", &self.on_change.is_some())
            .finish()
    }
}

impl Annotator {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            state: AnnotatorState::Idle,
            annotations: Vec::new(),
            on_change: None,
        }
    }

    /// Register the owner's change callback.
    pub fn on_annotations_change(mut self, listener: ChangeListener) -> Self {
        self.on_change = Some(listener);
        self
    }

    pub fn state(&self) -> AnnotatorState {
        self.state
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn notify(&mut self) {
        if let Some(listener) = self.on_change.as_mut() {
            listener(&self.annotations);
        }
    }

    // -- pointer events ------------------------------------------------------

    /// Begin a drag. Ignored unless idle.
    pub fn pointer_down(&mut self, client: Point) -> bool {
        if self.state != AnnotatorState::Idle {
            return false;
        }
        let p = self.viewport.to_image(client);
        self.state = AnnotatorState::Drawing {
            start: p,
            current: p,
        };
        true
    }

    /// Track the drag. Ignored unless drawing.
    pub fn pointer_move(&mut self, client: Point) -> bool {
        match self.state {
            AnnotatorState::Drawing { start, .. } => {
                self.state = AnnotatorState::Drawing {
                    start,
                    current: self.viewport.to_image(client),
                };
                true
            }
            _ => false,
        }
    }

    /// Finish the drag.
    pub fn pointer_up(&mut self, client: Point) -> DragOutcome {
        let AnnotatorState::Drawing { start, .. } = self.state else {
            return DragOutcome::Ignored;
        };
        let rect = Rect::from_corners(start, self.viewport.to_image(client));
        if rect.meets_threshold() {
            self.state = AnnotatorState::PendingComment { draft: rect };
            DragOutcome::AwaitingComment(rect)
        } else {
            self.state = AnnotatorState::Idle;
            DragOutcome::TooSmall
        }
    }

    // -- comment dialog ------------------------------------------------------

    /// Commit the pending draft with a comment and kind.
    ///
    /// On a validation error the draft stays pending so the dialog can be
    /// corrected.
    pub fn save(&mut self, comment: &str, kind: AnnotationKind) -> Result<&Annotation, CoreError> {
        let AnnotatorState::PendingComment { draft } = self.state else {
            return Err(CoreError::Conflict(
                "no pending annotation to save".to_string(),
            ));
        };
        let comment = validate_comment(comment)?;
        self.push(draft, comment, kind);
        self.state = AnnotatorState::Idle;
        self.notify();
        self.annotations
            .last()
            .ok_or_else(|| CoreError::Internal("annotation list empty after save".to_string()))
    }

    /// Discard the pending draft. Returns whether there was one.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            AnnotatorState::PendingComment { .. } | AnnotatorState::Drawing { .. } => {
                self.state = AnnotatorState::Idle;
                true
            }
            AnnotatorState::Idle => false,
        }
    }

    // -- list operations -----------------------------------------------------

    /// Append a rectangle already in image space, bypassing the pointer flow.
    pub fn commit(
        &mut self,
        rect: Rect,
        comment: &str,
        kind: AnnotationKind,
    ) -> Result<&Annotation, CoreError> {
        validate_rect(&rect)?;
        let comment = validate_comment(comment)?;
        self.push(rect, comment, kind);
        self.notify();
        self.annotations
            .last()
            .ok_or_else(|| CoreError::Internal("annotation list empty after commit".to_string()))
    }

    fn push(&mut self, rect: Rect, comment: String, kind: AnnotationKind) {
        self.annotations.push(Annotation {
            id: Uuid::new_v4(),
            rect,
            comment,
            kind,
        });
    }

    /// Delete an annotation by id. Returns it if it existed.
    pub fn delete(&mut self, id: Uuid) -> Option<Annotation> {
        let pos = self.annotations.iter().position(|a| a.id == id)?;
        let removed = self.annotations.remove(pos);
        self.notify();
        Some(removed)
    }

    // -- rendering -----------------------------------------------------------

    /// Full display list at natural image size, including the drag preview.
    pub fn render(&self) -> Vec<DrawCommand> {
        let mut commands = render_annotations(
            &self.annotations,
            self.viewport.natural_width,
            self.viewport.natural_height,
        );
        let preview = match self.state {
            AnnotatorState::Drawing { start, current } => Some(Rect::from_corners(start, current)),
            AnnotatorState::PendingComment { draft } => Some(draft),
            AnnotatorState::Idle => None,
        };
        if let Some(rect) = preview {
            commands.push(DrawCommand::StrokeRect {
                rect,
                color: PREVIEW_COLOR,
                line_width: STROKE_WIDTH,
                dashed: true,
            });
        }
        commands
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
