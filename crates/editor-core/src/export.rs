//! Re-serializes the annotation state into a copy of the source PDF.
//!
//! Every annotation is mapped from render space into the point space of its page with the
//! geometry the renderer reported for that page. Annotations on pages that were never rendered
//! (or whose geometry is unusable) are skipped and listed in the [`ExportReport`]; any failure of
//! the document itself aborts the export.

use markup_model::{
    AnnotationId, EditorSettings, PageGeometryCache, PageTransform, Point, Rotation, Snapshot,
};
use pdf_engine::{
    Color, LineCap, LineOptions, PdfDocument, PdfEngineError, PdfPoint, StandardFont, TextOptions,
    UnknownFont,
};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to load the source PDF")]
    Load(#[source] PdfEngineError),
    #[error("unsupported export font")]
    Font(#[from] UnknownFont),
    #[error("failed to embed the export font")]
    Embed(#[source] PdfEngineError),
    #[error("failed to inspect page {page}")]
    Page {
        page: u32,
        #[source]
        source: PdfEngineError,
    },
    #[error("failed to draw on page {page}")]
    Draw {
        page: u32,
        #[source]
        source: PdfEngineError,
    },
    #[error("failed to write the edited PDF")]
    Save(#[source] PdfEngineError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    Text,
    Stroke,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The page was never rendered, so its render-space size is unknown.
    MissingGeometry,
    PageOutOfRange,
    DegenerateGeometry,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingGeometry => "page geometry unknown",
            Self::PageOutOfRange => "page out of range",
            Self::DegenerateGeometry => "page geometry degenerate",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedAnnotation {
    pub kind: AnnotationKind,
    pub id: AnnotationId,
    pub page: u32,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            AnnotationKind::Text => "text",
            AnnotationKind::Stroke => "stroke",
        };
        write!(f, "skip {kind} {} on page {}: {}", self.id, self.page, self.reason)
    }
}

/// One call against [`PdfDocument`], in PDF points.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Line {
        page_index: u32,
        stroke: AnnotationId,
        options: LineOptions,
    },
    Text {
        page_index: u32,
        annotation: AnnotationId,
        text: String,
        origin: PdfPoint,
        size: f32,
        max_width: f32,
        line_height: f32,
    },
}

impl DrawCommand {
    pub fn page_index(&self) -> u32 {
        match self {
            Self::Line { page_index, .. } | Self::Text { page_index, .. } => *page_index,
        }
    }
}

impl fmt::Display for DrawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line { page_index, stroke, options } => write!(
                f,
                "page {} line stroke={stroke} ({:.2}, {:.2}) -> ({:.2}, {:.2}) thickness={:.2}",
                page_index + 1,
                options.start.x,
                options.start.y,
                options.end.x,
                options.end.y,
                options.thickness,
            ),
            Self::Text { page_index, annotation, text, origin, size, max_width, line_height } => {
                write!(
                    f,
                    "page {} text id={annotation} at ({:.2}, {:.2}) size={size:.2} max_width={max_width:.2} line_height={line_height:.2} {text:?}",
                    page_index + 1,
                    origin.x,
                    origin.y,
                )
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportPlan {
    /// Strokes first, then texts, so text lands on top.
    pub commands: Vec<DrawCommand>,
    pub skipped: Vec<SkippedAnnotation>,
    pub strokes: usize,
    pub texts: usize,
}

impl ExportPlan {
    pub fn segments(&self) -> usize {
        self.commands.iter().filter(|command| matches!(command, DrawCommand::Line { .. })).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub file: ExportedFile,
    pub strokes_drawn: usize,
    pub segments_drawn: usize,
    pub texts_drawn: usize,
    pub skipped: Vec<SkippedAnnotation>,
}

/// `edited_` followed by the file name component of `original`.
pub fn exported_file_name(original: &str) -> String {
    let name = Path::new(original).file_name().and_then(|name| name.to_str()).unwrap_or(original);
    format!("edited_{name}")
}

struct Planner<'a, D> {
    document: &'a D,
    geometry: &'a PageGeometryCache,
    page_count: u32,
    resolved: BTreeMap<u32, Result<PageTransform, SkipReason>>,
}

impl<D: PdfDocument> Planner<'_, D> {
    fn transform(&mut self, page: u32) -> Result<Result<PageTransform, SkipReason>, ExportError> {
        if let Some(resolved) = self.resolved.get(&page) {
            return Ok(*resolved);
        }

        let resolved = self.resolve(page)?;
        self.resolved.insert(page, resolved);
        Ok(resolved)
    }

    fn resolve(&self, page: u32) -> Result<Result<PageTransform, SkipReason>, ExportError> {
        if page == 0 || page > self.page_count {
            return Ok(Err(SkipReason::PageOutOfRange));
        }
        let Some(geometry) = self.geometry.get(page) else {
            return Ok(Err(SkipReason::MissingGeometry));
        };

        let page_index = page - 1;
        let page_error = |source| ExportError::Page { page, source };
        let crop = self.document.crop_box(page_index).map_err(page_error)?;
        let media = self.document.page_size(page_index).map_err(page_error)?;

        if geometry.rotation != Rotation::Deg0 {
            tracing::warn!(
                page,
                rotation = geometry.rotation.degrees(),
                "page is rotated; annotations are placed as if it were not"
            );
        }
        if (media.width_pt, media.height_pt) != (geometry.native_width, geometry.native_height) {
            tracing::debug!(
                page,
                media_width = media.width_pt,
                media_height = media.height_pt,
                native_width = geometry.native_width,
                native_height = geometry.native_height,
                "document page size differs from rendered page size"
            );
        }

        Ok(PageTransform::new(geometry, Point::new(crop.x, crop.y))
            .ok_or(SkipReason::DegenerateGeometry))
    }
}

fn note_skip(skipped: &mut Vec<SkippedAnnotation>, skip: SkippedAnnotation) {
    match skip.reason {
        SkipReason::MissingGeometry => {
            tracing::debug!(id = skip.id, page = skip.page, kind = ?skip.kind, "skipping annotation on unrendered page");
        }
        SkipReason::PageOutOfRange | SkipReason::DegenerateGeometry => {
            tracing::warn!(id = skip.id, page = skip.page, kind = ?skip.kind, reason = %skip.reason, "skipping annotation");
        }
    }
    skipped.push(skip);
}

/// Maps the snapshot into draw commands against `document` without drawing anything.
pub fn plan_export<D: PdfDocument>(
    document: &D,
    snapshot: &Snapshot,
    geometry: &PageGeometryCache,
    settings: &EditorSettings,
) -> Result<ExportPlan, ExportError> {
    let mut planner =
        Planner { document, geometry, page_count: document.page_count(), resolved: BTreeMap::new() };
    let mut plan = ExportPlan::default();

    for stroke in snapshot.strokes() {
        let transform = match planner.transform(stroke.page)? {
            Ok(transform) => transform,
            Err(reason) => {
                let skip = SkippedAnnotation {
                    kind: AnnotationKind::Stroke,
                    id: stroke.id,
                    page: stroke.page,
                    reason,
                };
                note_skip(&mut plan.skipped, skip);
                continue;
            }
        };

        let (r, g, b) = stroke.color.to_normalized();
        let color = Color::new(r, g, b);
        let thickness = transform.width_to_pdf(stroke.stroke_width);
        for (start, end) in stroke.segments() {
            let start = transform.to_pdf_space(start);
            let end = transform.to_pdf_space(end);
            plan.commands.push(DrawCommand::Line {
                page_index: stroke.page - 1,
                stroke: stroke.id,
                options: LineOptions {
                    start: PdfPoint::new(start.x, start.y),
                    end: PdfPoint::new(end.x, end.y),
                    thickness,
                    color,
                    cap: LineCap::Round,
                },
            });
        }
        plan.strokes += 1;
    }

    for text in snapshot.texts() {
        let transform = match planner.transform(text.page)? {
            Ok(transform) => transform,
            Err(reason) => {
                let skip = SkippedAnnotation {
                    kind: AnnotationKind::Text,
                    id: text.id,
                    page: text.page,
                    reason,
                };
                note_skip(&mut plan.skipped, skip);
                continue;
            }
        };

        let origin =
            transform.text_baseline(text.top_left(), text.font_size, settings.text_baseline_factor);
        plan.commands.push(DrawCommand::Text {
            page_index: text.page - 1,
            annotation: text.id,
            text: text.text.clone(),
            origin: PdfPoint::new(origin.x, origin.y),
            size: text.font_size,
            max_width: transform.width_to_pdf(text.width),
            line_height: text.font_size * settings.text_line_height_factor,
        });
        plan.texts += 1;
    }

    Ok(plan)
}

/// Loads `source`, draws the snapshot onto it and serializes the result. `source` is not
/// modified.
pub fn export_pdf<D: PdfDocument>(
    source: &[u8],
    file_name: &str,
    snapshot: &Snapshot,
    geometry: &PageGeometryCache,
    settings: &EditorSettings,
) -> Result<ExportReport, ExportError> {
    let font: StandardFont = settings.export_font.parse()?;
    let mut document = D::load(source).map_err(ExportError::Load)?;
    let font = document.embed_standard_font(font).map_err(ExportError::Embed)?;

    let plan = plan_export(&document, snapshot, geometry, settings)?;
    let mut touched_pages = BTreeSet::new();

    for command in &plan.commands {
        let page_index = command.page_index();
        let result = match command {
            DrawCommand::Line { options, .. } => document.draw_line(page_index, *options),
            DrawCommand::Text { text, origin, size, max_width, line_height, .. } => document
                .draw_text(
                    page_index,
                    text,
                    TextOptions {
                        origin: *origin,
                        size: *size,
                        font,
                        color: Color::BLACK,
                        max_width: Some(*max_width),
                        line_height: *line_height,
                    },
                ),
        };
        result.map_err(|source| ExportError::Draw { page: page_index + 1, source })?;
        touched_pages.insert(page_index);
    }

    let bytes = document.save().map_err(ExportError::Save)?;
    let segments_drawn = plan.segments();
    tracing::info!(
        strokes = plan.strokes,
        segments = segments_drawn,
        texts = plan.texts,
        skipped = plan.skipped.len(),
        pages = touched_pages.len(),
        bytes = bytes.len(),
        "exported annotated PDF"
    );

    Ok(ExportReport {
        file: ExportedFile { file_name: exported_file_name(file_name), bytes },
        strokes_drawn: plan.strokes,
        segments_drawn,
        texts_drawn: plan.texts,
        skipped: plan.skipped,
    })
}

/// Everything an export needs, detached from the session so it can run on another thread
/// while editing continues.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub(crate) file_name: String,
    pub(crate) source: Arc<Vec<u8>>,
    pub(crate) snapshot: Snapshot,
    pub(crate) geometry: PageGeometryCache,
    pub(crate) settings: EditorSettings,
}

impl ExportJob {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn run<D: PdfDocument>(&self) -> Result<ExportReport, ExportError> {
        export_pdf::<D>(&self.source, &self.file_name, &self.snapshot, &self.geometry, &self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markup_model::{PageGeometry, PenStroke, Rgb, TextAnnotation};
    use pdf_engine::{FontHandle, PageBox, PageSize};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct FakePage {
        width: f32,
        height: f32,
        crop_x: f32,
        crop_y: f32,
        #[serde(default)]
        fail_draws: bool,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    enum Drawn {
        Line { page_index: u32, start: (f32, f32), end: (f32, f32), thickness: f32, color: (f32, f32, f32) },
        Text { page_index: u32, text: String, origin: (f32, f32), size: f32, max_width: Option<f32>, line_height: f32 },
    }

    /// Document whose bytes are a JSON page list; `save` returns the recorded draw calls as JSON.
    struct RecordingDocument {
        pages: Vec<FakePage>,
        drawn: Vec<Drawn>,
    }

    impl RecordingDocument {
        fn bytes(pages: &[FakePage]) -> Vec<u8> {
            serde_json::to_vec(pages).expect("pages should serialize")
        }

        fn page(&self, page_index: u32) -> Result<&FakePage, PdfEngineError> {
            self.pages.get(page_index as usize).ok_or(PdfEngineError::PageOutOfRange {
                page: page_index,
                page_count: self.pages.len() as u32,
            })
        }

        fn check_draw(&self, page_index: u32) -> Result<(), PdfEngineError> {
            if self.page(page_index)?.fail_draws {
                return Err(PdfEngineError::Backend("draw failed".to_owned()));
            }
            Ok(())
        }
    }

    impl PdfDocument for RecordingDocument {
        fn load(bytes: &[u8]) -> Result<Self, PdfEngineError> {
            let pages: Vec<FakePage> = serde_json::from_slice(bytes)
                .map_err(|err| PdfEngineError::Backend(err.to_string()))?;
            Ok(Self { pages, drawn: Vec::new() })
        }

        fn page_count(&self) -> u32 {
            self.pages.len() as u32
        }

        fn page_size(&self, page_index: u32) -> Result<PageSize, PdfEngineError> {
            let page = self.page(page_index)?;
            Ok(PageSize { width_pt: page.width, height_pt: page.height })
        }

        fn crop_box(&self, page_index: u32) -> Result<PageBox, PdfEngineError> {
            let page = self.page(page_index)?;
            Ok(PageBox { x: page.crop_x, y: page.crop_y, width: page.width, height: page.height })
        }

        fn embed_standard_font(&mut self, _font: StandardFont) -> Result<FontHandle, PdfEngineError> {
            Ok(FontHandle::from_raw(0))
        }

        fn draw_line(&mut self, page_index: u32, options: LineOptions) -> Result<(), PdfEngineError> {
            self.check_draw(page_index)?;
            self.drawn.push(Drawn::Line {
                page_index,
                start: (options.start.x, options.start.y),
                end: (options.end.x, options.end.y),
                thickness: options.thickness,
                color: (options.color.r, options.color.g, options.color.b),
            });
            Ok(())
        }

        fn draw_text(
            &mut self,
            page_index: u32,
            text: &str,
            options: TextOptions,
        ) -> Result<(), PdfEngineError> {
            self.check_draw(page_index)?;
            self.drawn.push(Drawn::Text {
                page_index,
                text: text.to_owned(),
                origin: (options.origin.x, options.origin.y),
                size: options.size,
                max_width: options.max_width,
                line_height: options.line_height,
            });
            Ok(())
        }

        fn save(&mut self) -> Result<Vec<u8>, PdfEngineError> {
            serde_json::to_vec(&self.drawn).map_err(|err| PdfEngineError::Backend(err.to_string()))
        }
    }

    fn letter() -> FakePage {
        FakePage { width: 612.0, height: 792.0, crop_x: 0.0, crop_y: 0.0, fail_draws: false }
    }

    fn geometry(rendered: (f32, f32), native: (f32, f32)) -> PageGeometry {
        PageGeometry {
            rendered_width: rendered.0,
            rendered_height: rendered.1,
            native_width: native.0,
            native_height: native.1,
            rotation: Rotation::Deg0,
        }
    }

    fn text(id: AnnotationId, page: u32) -> TextAnnotation {
        TextAnnotation {
            id,
            page,
            x: 50.0,
            y: 50.0,
            text: "Hello".to_owned(),
            font_size: 16.0,
            width: 200.0,
            height: 50.0,
        }
    }

    fn stroke(id: AnnotationId, page: u32, points: &[(f32, f32)]) -> PenStroke {
        PenStroke {
            id,
            page,
            points: points.iter().map(|(x, y)| Point::new(*x, *y)).collect(),
            color: Rgb::RED,
            stroke_width: 3.0,
        }
    }

    fn drawn(report: &ExportReport) -> Vec<Drawn> {
        serde_json::from_slice(&report.file.bytes).expect("recorded calls should parse")
    }

    #[test]
    fn text_lands_on_the_baseline_below_its_box() {
        let mut cache = PageGeometryCache::new();
        cache.record(1, geometry((600.0, 800.0), (612.0, 792.0)));
        let snapshot = Snapshot::new(vec![text(1, 1)], Vec::new());

        let report = export_pdf::<RecordingDocument>(
            &RecordingDocument::bytes(&[letter()]),
            "resume.pdf",
            &snapshot,
            &cache,
            &EditorSettings::default(),
        )
        .expect("export should succeed");

        let calls = drawn(&report);
        let [Drawn::Text { origin, size, max_width, line_height, .. }] = calls.as_slice() else {
            panic!("expected a single text draw");
        };
        assert!((origin.0 - 51.0).abs() < 0.01);
        assert!((origin.1 - 729.3).abs() <= 0.5);
        assert_eq!(*size, 16.0);
        assert!(max_width.is_some_and(|width| (width - 204.0).abs() < 1e-3));
        assert!((line_height - 19.2).abs() < 1e-4);
        assert_eq!(report.file.file_name, "edited_resume.pdf");
    }

    #[test]
    fn unrendered_page_is_skipped_and_the_rest_exported() {
        let mut cache = PageGeometryCache::new();
        cache.record(1, geometry((612.0, 792.0), (612.0, 792.0)));
        let snapshot = Snapshot::new(
            vec![text(1, 1), text(2, 2)],
            vec![stroke(1, 2, &[(0.0, 0.0), (10.0, 10.0)])],
        );

        let report = export_pdf::<RecordingDocument>(
            &RecordingDocument::bytes(&[letter(), letter()]),
            "two.pdf",
            &snapshot,
            &cache,
            &EditorSettings::default(),
        )
        .expect("export should succeed");

        assert_eq!(report.texts_drawn, 1);
        assert_eq!(report.strokes_drawn, 0);
        let pages: Vec<u32> = drawn(&report)
            .iter()
            .map(|call| match call {
                Drawn::Line { page_index, .. } | Drawn::Text { page_index, .. } => *page_index,
            })
            .collect();
        assert_eq!(pages, vec![0]);
        assert_eq!(
            report.skipped,
            vec![
                SkippedAnnotation {
                    kind: AnnotationKind::Stroke,
                    id: 1,
                    page: 2,
                    reason: SkipReason::MissingGeometry,
                },
                SkippedAnnotation {
                    kind: AnnotationKind::Text,
                    id: 2,
                    page: 2,
                    reason: SkipReason::MissingGeometry,
                },
            ]
        );
    }

    #[test]
    fn strokes_draw_one_segment_per_point_pair_before_texts() {
        let mut cache = PageGeometryCache::new();
        cache.record(1, geometry((306.0, 396.0), (612.0, 792.0)));
        let snapshot = Snapshot::new(
            vec![text(1, 1)],
            vec![stroke(1, 1, &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)])],
        );

        let report = export_pdf::<RecordingDocument>(
            &RecordingDocument::bytes(&[letter()]),
            "scaled.pdf",
            &snapshot,
            &cache,
            &EditorSettings::default(),
        )
        .expect("export should succeed");

        let calls = drawn(&report);
        assert_eq!(report.segments_drawn, 2);
        assert_eq!(
            calls[0],
            Drawn::Line {
                page_index: 0,
                start: (0.0, 792.0),
                end: (20.0, 792.0),
                thickness: 6.0,
                color: (1.0, 0.0, 0.0),
            }
        );
        assert!(matches!(calls[1], Drawn::Line { end: (20.0, 772.0), .. }));
        assert!(matches!(calls[2], Drawn::Text { .. }));
    }

    #[test]
    fn crop_box_offset_shifts_every_annotation() {
        let mut cache = PageGeometryCache::new();
        cache.record(1, geometry((500.0, 700.0), (500.0, 700.0)));
        let page = FakePage { crop_x: 20.0, crop_y: 30.0, ..letter() };
        let snapshot = Snapshot::new(Vec::new(), vec![stroke(1, 1, &[(0.0, 0.0), (100.0, 100.0)])]);

        let report = export_pdf::<RecordingDocument>(
            &RecordingDocument::bytes(&[page]),
            "cropped.pdf",
            &snapshot,
            &cache,
            &EditorSettings::default(),
        )
        .expect("export should succeed");

        assert!(matches!(
            drawn(&report).as_slice(),
            [Drawn::Line { start: (20.0, 730.0), end: (120.0, 630.0), .. }]
        ));
    }

    #[test]
    fn out_of_range_and_degenerate_pages_are_reported() {
        let mut cache = PageGeometryCache::new();
        cache.record(1, geometry((0.0, 792.0), (612.0, 792.0)));
        let snapshot = Snapshot::new(vec![text(1, 1), text(2, 9)], Vec::new());

        let document = RecordingDocument::load(&RecordingDocument::bytes(&[letter()]))
            .expect("load should succeed");
        let plan = plan_export(&document, &snapshot, &cache, &EditorSettings::default())
            .expect("plan should succeed");

        assert!(plan.commands.is_empty());
        let reasons: Vec<SkipReason> = plan.skipped.iter().map(|skip| skip.reason).collect();
        assert_eq!(reasons, vec![SkipReason::DegenerateGeometry, SkipReason::PageOutOfRange]);
    }

    #[test]
    fn draw_failure_aborts_the_export() {
        let mut cache = PageGeometryCache::new();
        cache.record(1, geometry((612.0, 792.0), (612.0, 792.0)));
        let page = FakePage { fail_draws: true, ..letter() };
        let snapshot = Snapshot::new(vec![text(1, 1)], Vec::new());

        let err = export_pdf::<RecordingDocument>(
            &RecordingDocument::bytes(&[page]),
            "broken.pdf",
            &snapshot,
            &cache,
            &EditorSettings::default(),
        )
        .expect_err("draw failure should abort");

        assert!(matches!(err, ExportError::Draw { page: 1, .. }));
    }

    #[test]
    fn load_and_font_failures_are_distinct() {
        let snapshot = Snapshot::default();
        let cache = PageGeometryCache::new();

        let err = export_pdf::<RecordingDocument>(
            b"not json",
            "x.pdf",
            &snapshot,
            &cache,
            &EditorSettings::default(),
        )
        .expect_err("load should fail");
        assert!(matches!(err, ExportError::Load(_)));

        let settings = EditorSettings { export_font: "Wingdings".to_owned(), ..EditorSettings::default() };
        let err = export_pdf::<RecordingDocument>(
            &RecordingDocument::bytes(&[letter()]),
            "x.pdf",
            &snapshot,
            &cache,
            &settings,
        )
        .expect_err("unknown font should fail");
        assert!(matches!(err, ExportError::Font(_)));
    }

    #[test]
    fn exported_name_uses_the_file_name_component() {
        assert_eq!(exported_file_name("notes.pdf"), "edited_notes.pdf");
        assert_eq!(exported_file_name("/tmp/in/notes.pdf"), "edited_notes.pdf");
    }

    #[test]
    fn plan_lines_are_readable() {
        let command = DrawCommand::Line {
            page_index: 0,
            stroke: 4,
            options: LineOptions {
                start: PdfPoint::new(1.0, 2.0),
                end: PdfPoint::new(3.5, 4.25),
                thickness: 3.0,
                color: Color::BLACK,
                cap: LineCap::Round,
            },
        };
        assert_eq!(
            command.to_string(),
            "page 1 line stroke=4 (1.00, 2.00) -> (3.50, 4.25) thickness=3.00"
        );
    }
}
