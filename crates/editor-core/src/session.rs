use markup_model::{
    AnnotationId, AnnotationStore, EditorSettings, GestureError, GestureKind, GestureMachine,
    GestureOutcome, GestureTarget, InvalidRotation, PageGeometry, PageGeometryCache, PenStyle,
    Point, Rgb, Rotation, SettingsError, StoreError, TextAnnotation, TextPatch,
};
use pdf_engine::{
    DocumentHandle, OpenSource, PageLayout, PageRenderer, PdfDocument, PdfEngineError,
    RenderRequest, RgbaImage,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::export::{ExportError, ExportJob, ExportReport};
use crate::preview::{paint_overlay, Overlay, OverlayStroke};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Gesture(#[from] GestureError),
    #[error("invalid editor settings")]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Rotation(#[from] InvalidRotation),
    #[error(transparent)]
    Engine(#[from] PdfEngineError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },
    #[error("an export is already in progress")]
    ExportInProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Text,
    Pen,
}

/// Everything the user can do to a session. Pointer positions are in display space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorAction {
    AddText,
    UpdateText { id: AnnotationId, patch: TextPatch },
    DeleteText { id: AnnotationId },
    DeleteStroke { id: AnnotationId },
    SelectTool { tool: Tool },
    SetPenColor { color: Rgb },
    SetPenWidth { width: f32 },
    ZoomIn,
    ZoomOut,
    SetZoom { scale: f32 },
    NextPage,
    PreviousPage,
    GoToPage { page: u32 },
    Undo,
    Redo,
    PointerDown { target: GestureTarget, at: Point },
    PointerMove { at: Point },
    PointerUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Changed,
    Unchanged,
    TextAdded(AnnotationId),
    GestureStarted(GestureKind),
    Gesture(GestureOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

/// Ctrl+Z / Cmd+Z undoes, Ctrl+Y / Cmd+Y redoes.
pub fn shortcut_for(key: char, modifiers: Modifiers) -> Option<EditorAction> {
    if !(modifiers.ctrl || modifiers.meta) || modifiers.shift || modifiers.alt {
        return None;
    }

    match key {
        'z' => Some(EditorAction::Undo),
        'y' => Some(EditorAction::Redo),
        _ => None,
    }
}

/// One open document and everything edited on it.
#[derive(Debug)]
pub struct EditorSession {
    file_name: String,
    source: Arc<Vec<u8>>,
    page_count: u32,
    geometry: PageGeometryCache,
    store: AnnotationStore,
    gestures: GestureMachine,
    current_page: u32,
    scale: f32,
    tool: Tool,
    pen: PenStyle,
    exporting: bool,
    settings: EditorSettings,
}

impl EditorSession {
    pub fn new(
        file_name: impl Into<String>,
        source: Vec<u8>,
        page_count: u32,
        settings: EditorSettings,
    ) -> Result<Self, SessionError> {
        settings.validate()?;
        if page_count == 0 {
            return Err(SessionError::PageOutOfRange { page: 1, page_count });
        }

        let file_name = file_name.into();
        tracing::debug!(file_name = %file_name, page_count, "opened editing session");

        Ok(Self {
            file_name,
            source: Arc::new(source),
            page_count,
            geometry: PageGeometryCache::new(),
            store: AnnotationStore::new(page_count, settings.default_text.clone()),
            gestures: GestureMachine::new(settings.resize),
            current_page: 1,
            scale: 1.0,
            tool: Tool::default(),
            pen: PenStyle {
                color: settings.pen.color,
                width: settings.pen.clamp_width(settings.pen.width),
            },
            exporting: false,
            settings,
        })
    }

    /// Opens `source` with the renderer and starts a session for it.
    pub fn open<R: PageRenderer>(
        renderer: &mut R,
        file_name: impl Into<String>,
        source: Vec<u8>,
        settings: EditorSettings,
    ) -> Result<(Self, DocumentHandle), SessionError> {
        let handle = renderer.open(OpenSource::Bytes(source.clone()))?;
        let page_count = renderer.page_count(handle)?;
        let session = Self::new(file_name, source, page_count, settings)?;
        Ok((session, handle))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn source(&self) -> &[u8] {
        &self.source
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn pen(&self) -> PenStyle {
        self.pen
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn geometry(&self) -> &PageGeometryCache {
        &self.geometry
    }

    pub fn gestures(&self) -> &GestureMachine {
        &self.gestures
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    /// Records the page's geometry the first time it is laid out. Returns whether it was new.
    pub fn on_page_rendered(&mut self, layout: &PageLayout) -> Result<bool, SessionError> {
        self.check_page(layout.page_number)?;
        let rotation = Rotation::from_degrees(i64::from(layout.rotation))?;
        let (rendered_width, rendered_height) = layout.rendered_size(1.0);

        Ok(self.geometry.record(
            layout.page_number,
            PageGeometry {
                rendered_width,
                rendered_height,
                native_width: layout.native_width,
                native_height: layout.native_height,
                rotation,
            },
        ))
    }

    /// Renders a page at the current zoom, recording its geometry on the way.
    pub fn render_page<R: PageRenderer>(
        &mut self,
        renderer: &R,
        handle: DocumentHandle,
        page: u32,
    ) -> Result<RgbaImage, SessionError> {
        self.check_page(page)?;
        let rendered =
            renderer.render_page(handle, RenderRequest { page_number: page, scale: self.scale })?;
        self.on_page_rendered(&rendered.layout)?;
        Ok(rendered.surface)
    }

    /// The rendered page with its annotations painted on top, as the user would see it.
    pub fn preview<R: PageRenderer>(
        &mut self,
        renderer: &R,
        handle: DocumentHandle,
        page: u32,
    ) -> Result<RgbaImage, SessionError> {
        let mut surface = self.render_page(renderer, handle, page)?;

        let preview = self.gestures.preview_text();
        let texts: Vec<TextAnnotation> = self
            .store
            .texts()
            .iter()
            .filter(|text| text.page == page)
            .map(|text| match preview {
                Some(moving) if moving.id == text.id => moving.clone(),
                _ => text.clone(),
            })
            .collect();

        let mut strokes: Vec<OverlayStroke<'_>> = self
            .store
            .strokes()
            .iter()
            .filter(|stroke| stroke.page == page)
            .map(|stroke| OverlayStroke {
                color: stroke.color,
                width: stroke.stroke_width,
                points: &stroke.points,
            })
            .collect();
        if let markup_model::Gesture::Drawing { page: drawing_page, style, points } =
            self.gestures.state()
        {
            if *drawing_page == page {
                strokes.push(OverlayStroke { color: style.color, width: style.width, points });
            }
        }

        paint_overlay(&mut surface, &Overlay { texts: &texts, strokes: &strokes, scale: self.scale });
        Ok(surface)
    }

    pub fn apply(&mut self, action: EditorAction) -> Result<ActionOutcome, SessionError> {
        tracing::trace!(?action, "applying editor action");

        match action {
            EditorAction::AddText => {
                self.ensure_no_gesture()?;
                let id = self.store.add_text(self.current_page)?;
                self.tool = Tool::Text;
                Ok(ActionOutcome::TextAdded(id))
            }
            EditorAction::UpdateText { id, patch } => {
                self.ensure_no_gesture()?;
                let before = self.store.history_len();
                self.store.update_text(id, &patch)?;
                Ok(changed(self.store.history_len() != before))
            }
            EditorAction::DeleteText { id } => {
                self.ensure_no_gesture()?;
                self.store.delete_text(id)?;
                Ok(ActionOutcome::Changed)
            }
            EditorAction::DeleteStroke { id } => {
                self.ensure_no_gesture()?;
                self.store.delete_stroke(id)?;
                Ok(ActionOutcome::Changed)
            }
            EditorAction::SelectTool { tool } => {
                let was = self.tool;
                self.tool = tool;
                Ok(changed(was != tool))
            }
            EditorAction::SetPenColor { color } => {
                let was = self.pen.color;
                self.pen.color = color;
                Ok(changed(was != color))
            }
            EditorAction::SetPenWidth { width } => {
                require_finite("pen width", width)?;
                let was = self.pen.width;
                self.pen.width = self.settings.pen.clamp_width(width);
                Ok(changed(was != self.pen.width))
            }
            EditorAction::ZoomIn => Ok(self.set_scale(self.scale + self.settings.zoom.step)),
            EditorAction::ZoomOut => Ok(self.set_scale(self.scale - self.settings.zoom.step)),
            EditorAction::SetZoom { scale } => {
                require_finite("zoom scale", scale)?;
                Ok(self.set_scale(scale))
            }
            EditorAction::NextPage => Ok(self.set_page(self.current_page.saturating_add(1))),
            EditorAction::PreviousPage => Ok(self.set_page(self.current_page.saturating_sub(1))),
            EditorAction::GoToPage { page } => Ok(self.set_page(page)),
            EditorAction::Undo => {
                self.ensure_no_gesture()?;
                Ok(changed(self.store.undo()))
            }
            EditorAction::Redo => {
                self.ensure_no_gesture()?;
                Ok(changed(self.store.redo()))
            }
            EditorAction::PointerDown { target, at } => {
                if matches!(target, GestureTarget::Page { .. }) && self.tool != Tool::Pen {
                    return Ok(ActionOutcome::Unchanged);
                }
                self.gestures.pointer_down(target, at, self.scale, self.pen, &self.store)?;
                Ok(self
                    .gestures
                    .active()
                    .map_or(ActionOutcome::Unchanged, ActionOutcome::GestureStarted))
            }
            EditorAction::PointerMove { at } => {
                self.gestures.pointer_move(at, self.scale)?;
                Ok(ActionOutcome::Unchanged)
            }
            EditorAction::PointerUp => {
                let outcome = self.gestures.pointer_up(&mut self.store)?;
                Ok(ActionOutcome::Gesture(outcome))
            }
        }
    }

    /// Starts an export of the current state. Fails while another export is in flight.
    pub fn begin_export(&mut self) -> Result<ExportJob, SessionError> {
        if self.exporting {
            return Err(SessionError::ExportInProgress);
        }
        self.exporting = true;

        Ok(ExportJob {
            file_name: self.file_name.clone(),
            source: Arc::clone(&self.source),
            snapshot: self.store.snapshot().clone(),
            geometry: self.geometry.clone(),
            settings: self.settings.clone(),
        })
    }

    /// Ends the export started by [`Self::begin_export`], whatever its result.
    pub fn finish_export(
        &mut self,
        result: Result<ExportReport, ExportError>,
    ) -> Result<ExportReport, ExportError> {
        self.exporting = false;
        match &result {
            Ok(report) => tracing::debug!(file_name = %report.file.file_name, "export finished"),
            Err(err) => tracing::warn!(error = %err, "export failed"),
        }
        result
    }

    /// Runs a whole export on the current thread.
    pub fn export<D: PdfDocument>(&mut self) -> Result<ExportReport, SessionError> {
        let job = self.begin_export()?;
        let result = job.run::<D>();
        self.finish_export(result).map_err(SessionError::from)
    }

    fn set_scale(&mut self, scale: f32) -> ActionOutcome {
        // Keep repeated steps from drifting away from round values.
        let scale = (self.settings.zoom.clamp(scale) * 1000.0).round() / 1000.0;
        let was = self.scale;
        self.scale = scale;
        changed(was != scale)
    }

    fn set_page(&mut self, page: u32) -> ActionOutcome {
        let was = self.current_page;
        self.current_page = page.clamp(1, self.page_count);
        changed(was != self.current_page)
    }

    fn check_page(&self, page: u32) -> Result<(), SessionError> {
        if page == 0 || page > self.page_count {
            return Err(SessionError::PageOutOfRange { page, page_count: self.page_count });
        }
        Ok(())
    }

    fn ensure_no_gesture(&self) -> Result<(), SessionError> {
        match self.gestures.active() {
            Some(kind) => Err(GestureError::GestureActive(kind).into()),
            None => Ok(()),
        }
    }
}

fn changed(did_change: bool) -> ActionOutcome {
    if did_change {
        ActionOutcome::Changed
    } else {
        ActionOutcome::Unchanged
    }
}

fn require_finite(field: &'static str, value: f32) -> Result<(), SessionError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SessionError::NotFinite { field, value })
    }
}
