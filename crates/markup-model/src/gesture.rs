//! Modal pointer gestures: dragging a text box, resizing its font or width, freehand drawing.
//!
//! At most one gesture is active. Pointer positions arrive in display space and are turned into
//! render-space deltas with the zoom scale of each event. Text gestures edit a preview copy and
//! commit a single store update when the pointer is released.

use crate::annotation::{AnnotationId, Rgb, TextAnnotation, TextPatch};
use crate::geometry::{to_render_space, Point};
use crate::settings::ResizeLimits;
use crate::store::{AnnotationStore, StoreError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GestureError {
    #[error("a {0:?} gesture is already active")]
    GestureActive(GestureKind),
    #[error("unknown text annotation {0}")]
    UnknownText(AnnotationId),
    #[error("zoom scale must be positive, got {0}")]
    InvalidScale(f32),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GestureTarget {
    /// Body of a text box.
    Text { id: AnnotationId },
    /// Round handle at the bottom-right corner of a text box.
    FontHandle { id: AnnotationId },
    /// Bar on the right edge of a text box.
    WidthHandle { id: AnnotationId },
    /// Page surface with the pen tool active.
    Page { page: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Dragging,
    ResizingText,
    ResizingBox,
    Drawing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenStyle {
    pub color: Rgb,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Idle,
    Dragging { origin: Point, original: TextAnnotation, preview: TextAnnotation },
    ResizingText { origin: Point, original: TextAnnotation, preview: TextAnnotation },
    ResizingBox { origin: Point, original: TextAnnotation, preview: TextAnnotation },
    Drawing { page: u32, style: PenStyle, points: Vec<Point> },
}

impl Gesture {
    pub fn kind(&self) -> Option<GestureKind> {
        match self {
            Self::Idle => None,
            Self::Dragging { .. } => Some(GestureKind::Dragging),
            Self::ResizingText { .. } => Some(GestureKind::ResizingText),
            Self::ResizingBox { .. } => Some(GestureKind::ResizingBox),
            Self::Drawing { .. } => Some(GestureKind::Drawing),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Pointer released with no gesture active.
    Idle,
    /// Text gesture ended where it started.
    Unchanged,
    TextUpdated(AnnotationId),
    StrokeAdded(AnnotationId),
    /// Freehand gesture with fewer than two points.
    StrokeDiscarded,
}

#[derive(Debug, Clone)]
pub struct GestureMachine {
    state: Gesture,
    limits: ResizeLimits,
}

impl GestureMachine {
    pub fn new(limits: ResizeLimits) -> Self {
        Self { state: Gesture::Idle, limits }
    }

    pub fn state(&self) -> &Gesture {
        &self.state
    }

    pub fn active(&self) -> Option<GestureKind> {
        self.state.kind()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, Gesture::Idle)
    }

    /// Text box as it should be painted while a text gesture is in flight.
    pub fn preview_text(&self) -> Option<&TextAnnotation> {
        match &self.state {
            Gesture::Dragging { preview, .. }
            | Gesture::ResizingText { preview, .. }
            | Gesture::ResizingBox { preview, .. } => Some(preview),
            Gesture::Idle | Gesture::Drawing { .. } => None,
        }
    }

    /// Render-space points of the stroke being drawn.
    pub fn pending_points(&self) -> &[Point] {
        match &self.state {
            Gesture::Drawing { points, .. } => points,
            _ => &[],
        }
    }

    pub fn pointer_down(
        &mut self,
        target: GestureTarget,
        at: Point,
        scale: f32,
        pen: PenStyle,
        store: &AnnotationStore,
    ) -> Result<(), GestureError> {
        if let Some(active) = self.active() {
            return Err(GestureError::GestureActive(active));
        }
        check_scale(scale)?;

        let text = |id: AnnotationId| store.text(id).cloned().ok_or(GestureError::UnknownText(id));
        let next = match target {
            GestureTarget::Text { id } => {
                let original = text(id)?;
                Gesture::Dragging { origin: at, preview: original.clone(), original }
            }
            GestureTarget::FontHandle { id } => {
                let original = text(id)?;
                Gesture::ResizingText { origin: at, preview: original.clone(), original }
            }
            GestureTarget::WidthHandle { id } => {
                let original = text(id)?;
                Gesture::ResizingBox { origin: at, preview: original.clone(), original }
            }
            GestureTarget::Page { page } => {
                Gesture::Drawing { page, style: pen, points: vec![to_render_space(at, scale)] }
            }
        };

        self.enter(next);
        Ok(())
    }

    /// Ignored while idle, like a hover move.
    pub fn pointer_move(&mut self, at: Point, scale: f32) -> Result<(), GestureError> {
        if self.is_idle() {
            return Ok(());
        }
        check_scale(scale)?;

        let limits = self.limits;
        let delta = |origin: Point| {
            to_render_space(Point::new(at.x - origin.x, at.y - origin.y), scale)
        };

        match &mut self.state {
            Gesture::Idle => {}
            Gesture::Dragging { origin, original, preview } => {
                let delta = delta(*origin);
                preview.x = original.x + delta.x;
                preview.y = original.y + delta.y;
            }
            Gesture::ResizingText { origin, original, preview } => {
                let delta = delta(*origin);
                preview.font_size = (original.font_size + delta.x * limits.font_resize_rate)
                    .max(limits.min_font_size);
            }
            Gesture::ResizingBox { origin, original, preview } => {
                let delta = delta(*origin);
                preview.width = (original.width + delta.x).max(limits.min_box_width);
            }
            Gesture::Drawing { points, .. } => points.push(to_render_space(at, scale)),
        }

        Ok(())
    }

    /// Ends the active gesture and commits it at the current position.
    pub fn pointer_up(
        &mut self,
        store: &mut AnnotationStore,
    ) -> Result<GestureOutcome, GestureError> {
        match self.exit() {
            Gesture::Idle => Ok(GestureOutcome::Idle),
            Gesture::Dragging { original, preview, .. }
            | Gesture::ResizingText { original, preview, .. }
            | Gesture::ResizingBox { original, preview, .. } => {
                let patch = diff(&original, &preview);
                if patch.is_empty() {
                    return Ok(GestureOutcome::Unchanged);
                }
                store.update_text(original.id, &patch)?;
                Ok(GestureOutcome::TextUpdated(original.id))
            }
            Gesture::Drawing { page, style, points } => {
                match store.complete_stroke(page, points, style.color, style.width)? {
                    Some(id) => Ok(GestureOutcome::StrokeAdded(id)),
                    None => Ok(GestureOutcome::StrokeDiscarded),
                }
            }
        }
    }

    fn enter(&mut self, next: Gesture) {
        tracing::trace!(gesture = ?next.kind(), "gesture started");
        self.state = next;
    }

    fn exit(&mut self) -> Gesture {
        let previous = std::mem::replace(&mut self.state, Gesture::Idle);
        if let Some(kind) = previous.kind() {
            tracing::trace!(gesture = ?kind, "gesture ended");
        }
        previous
    }
}

fn check_scale(scale: f32) -> Result<(), GestureError> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(GestureError::InvalidScale(scale))
    }
}

fn diff(original: &TextAnnotation, preview: &TextAnnotation) -> TextPatch {
    let changed = |before: f32, after: f32| (before != after).then_some(after);

    TextPatch {
        text: None,
        x: changed(original.x, preview.x),
        y: changed(original.y, preview.y),
        font_size: changed(original.font_size, preview.font_size),
        width: changed(original.width, preview.width),
        height: changed(original.height, preview.height),
    }
}
