//! PDF capabilities behind two narrow traits: [`PageRenderer`] answers page layout and
//! produces surfaces for display, [`PdfDocument`] edits a loaded document and writes it back.

use image::{ImageBuffer, Rgba};
use std::path::{Path, PathBuf};

mod document;
mod fonts;
mod page_box;
mod renderer;

pub use document::{blank_pdf, LopdfDocument, PdfDocument};
pub use fonts::{encode_win_ansi, wrap_text, StandardFont, UnknownFont};
pub use renderer::{LopdfRenderer, PageLayout, PageRenderer, RenderRequest, RenderedPage};

pub type RgbaImage = ImageBuffer<Rgba<u8>, Vec<u8>>;

/// US Letter, used when a page has no usable MediaBox.
pub const DEFAULT_PAGE_SIZE: PageSize = PageSize { width_pt: 612.0, height_pt: 792.0 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentHandle(u64);

impl DocumentHandle {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

/// A page rectangle in PDF user space, normalized so `x`/`y` is the lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PageBox {
    pub fn size(&self) -> PageSize {
        PageSize { width_pt: self.width, height_pt: self.height }
    }
}

#[derive(Debug, Clone)]
pub enum OpenSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl From<PathBuf> for OpenSource {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<&Path> for OpenSource {
    fn from(value: &Path) -> Self {
        Self::Path(value.to_path_buf())
    }
}

impl From<Vec<u8>> for OpenSource {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

/// Normalized RGB, each channel in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r: r.clamp(0.0, 1.0), g: g.clamp(0.0, 1.0), b: b.clamp(0.0, 1.0) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    Butt,
    #[default]
    Round,
    Square,
}

impl LineCap {
    pub(crate) fn style(self) -> i64 {
        match self {
            Self::Butt => 0,
            Self::Round => 1,
            Self::Square => 2,
        }
    }
}

/// Position in PDF points, origin at the page's lower-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfPoint {
    pub x: f32,
    pub y: f32,
}

impl PdfPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineOptions {
    pub start: PdfPoint,
    pub end: PdfPoint,
    pub thickness: f32,
    pub color: Color,
    pub cap: LineCap,
}

/// Font embedded into one [`PdfDocument`]. Handles are not portable between documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle(u32);

impl FontHandle {
    /// For [`PdfDocument`] implementations outside this crate.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextOptions {
    /// Baseline of the first line.
    pub origin: PdfPoint,
    pub size: f32,
    pub font: FontHandle,
    pub color: Color,
    pub max_width: Option<f32>,
    pub line_height: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum PdfEngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("invalid handle {0}")]
    InvalidHandle(u64),
    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("encrypted PDFs are not supported in the default backend")]
    EncryptedUnsupported,
    #[error("font handle {0} was not embedded in this document")]
    UnknownFont(u32),
    #[error("{field} must be finite")]
    NotFinite { field: &'static str },
    #[error("backend error: {0}")]
    Backend(String),
}

pub(crate) fn ensure_not_encrypted(bytes: &[u8]) -> Result<(), PdfEngineError> {
    if bytes.windows("/Encrypt".len()).any(|window| window == b"/Encrypt") {
        return Err(PdfEngineError::EncryptedUnsupported);
    }
    Ok(())
}

pub fn default_renderer(pixels_per_point: f32) -> LopdfRenderer {
    LopdfRenderer::new(pixels_per_point)
}
