//! Text and pen annotations of one editing session, with every mutation routed through history.

use crate::annotation::{AnnotationId, PenStroke, Rgb, TextAnnotation, TextPatch};
use crate::geometry::Point;
use crate::history::{History, Snapshot};
use crate::settings::TextDefaults;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("unknown text annotation {0}")]
    UnknownText(AnnotationId),
    #[error("unknown pen stroke {0}")]
    UnknownStroke(AnnotationId),
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },
}

#[derive(Debug, Clone)]
pub struct AnnotationStore {
    page_count: u32,
    defaults: TextDefaults,
    history: History,
}

impl AnnotationStore {
    pub fn new(page_count: u32, defaults: TextDefaults) -> Self {
        Self { page_count, defaults, history: History::new() }
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.history.current()
    }

    pub fn texts(&self) -> &[TextAnnotation] {
        self.snapshot().texts()
    }

    pub fn strokes(&self) -> &[PenStroke] {
        self.snapshot().strokes()
    }

    pub fn text(&self, id: AnnotationId) -> Option<&TextAnnotation> {
        self.texts().iter().find(|text| text.id == id)
    }

    pub fn stroke(&self, id: AnnotationId) -> Option<&PenStroke> {
        self.strokes().iter().find(|stroke| stroke.id == id)
    }

    pub fn add_text(&mut self, page: u32) -> Result<AnnotationId, StoreError> {
        self.check_page(page)?;

        let id = next_id(self.texts().iter().map(|text| text.id));
        let defaults = &self.defaults;
        let text = TextAnnotation {
            id,
            page,
            x: defaults.x,
            y: defaults.y,
            text: defaults.text.clone(),
            font_size: defaults.font_size,
            width: defaults.width,
            height: defaults.height,
        };

        let mut texts = self.texts().to_vec();
        texts.push(text);
        self.commit(self.snapshot().with_texts(texts));

        tracing::debug!(id, page, "added text annotation");
        Ok(id)
    }

    /// Applies the `Some` fields of `patch`. A patch that changes nothing records no snapshot.
    pub fn update_text(&mut self, id: AnnotationId, patch: &TextPatch) -> Result<(), StoreError> {
        let index =
            self.texts().iter().position(|text| text.id == id).ok_or(StoreError::UnknownText(id))?;

        let mut updated = self.texts()[index].clone();
        updated.apply(patch);
        validate_text(&updated)?;

        if updated == self.texts()[index] {
            return Ok(());
        }

        let mut texts = self.texts().to_vec();
        texts[index] = updated;
        self.commit(self.snapshot().with_texts(texts));
        Ok(())
    }

    pub fn delete_text(&mut self, id: AnnotationId) -> Result<(), StoreError> {
        if self.text(id).is_none() {
            return Err(StoreError::UnknownText(id));
        }

        let texts = self.texts().iter().filter(|text| text.id != id).cloned().collect();
        self.commit(self.snapshot().with_texts(texts));

        tracing::debug!(id, "deleted text annotation");
        Ok(())
    }

    pub fn delete_stroke(&mut self, id: AnnotationId) -> Result<(), StoreError> {
        if self.stroke(id).is_none() {
            return Err(StoreError::UnknownStroke(id));
        }

        let strokes = self.strokes().iter().filter(|stroke| stroke.id != id).cloned().collect();
        self.commit(self.snapshot().with_strokes(strokes));

        tracing::debug!(id, "deleted pen stroke");
        Ok(())
    }

    /// Commits a finished freehand gesture. Fewer than two points is not a stroke and is
    /// dropped without touching history.
    pub fn complete_stroke(
        &mut self,
        page: u32,
        points: Vec<Point>,
        color: Rgb,
        stroke_width: f32,
    ) -> Result<Option<AnnotationId>, StoreError> {
        if points.len() < 2 {
            tracing::trace!(page, points = points.len(), "discarded stroke with too few points");
            return Ok(None);
        }

        self.check_page(page)?;
        require_positive("stroke_width", stroke_width)?;
        for point in &points {
            require_finite("point.x", point.x)?;
            require_finite("point.y", point.y)?;
        }

        let id = next_id(self.strokes().iter().map(|stroke| stroke.id));
        let mut strokes = self.strokes().to_vec();
        strokes.push(PenStroke { id, page, points, color, stroke_width });
        self.commit(self.snapshot().with_strokes(strokes));

        tracing::debug!(id, page, "added pen stroke");
        Ok(Some(id))
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn cursor(&self) -> usize {
        self.history.cursor()
    }

    fn commit(&mut self, snapshot: Snapshot) {
        self.history.push(snapshot);
    }

    fn check_page(&self, page: u32) -> Result<(), StoreError> {
        if page == 0 || page > self.page_count {
            return Err(StoreError::PageOutOfRange { page, page_count: self.page_count });
        }
        Ok(())
    }
}

fn next_id(ids: impl Iterator<Item = AnnotationId>) -> AnnotationId {
    ids.max().unwrap_or(0) + 1
}

fn validate_text(text: &TextAnnotation) -> Result<(), StoreError> {
    require_finite("x", text.x)?;
    require_finite("y", text.y)?;
    require_positive("font_size", text.font_size)?;
    require_positive("width", text.width)?;
    require_positive("height", text.height)
}

fn require_finite(field: &'static str, value: f32) -> Result<(), StoreError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(StoreError::NotFinite { field, value })
    }
}

fn require_positive(field: &'static str, value: f32) -> Result<(), StoreError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(StoreError::NotPositive { field, value })
    }
}
