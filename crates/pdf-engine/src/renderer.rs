use image::Rgba;
use lopdf::Document;
use std::collections::HashMap;
use std::fs;

use crate::{ensure_not_encrypted, page_box, DocumentHandle, OpenSource, PdfEngineError, RgbaImage};

/// What the display side learns about a page once it is loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    /// One-based.
    pub page_number: u32,
    /// Size of the visible (crop) box in points, before rotation.
    pub native_width: f32,
    pub native_height: f32,
    /// Clockwise degrees, one of 0, 90, 180, 270.
    pub rotation: u16,
    pub pixels_per_point: f32,
}

impl PageLayout {
    /// Pixel size of the page rendered at `scale`, with axes swapped for quarter turns.
    pub fn rendered_size(&self, scale: f32) -> (f32, f32) {
        let width = self.native_width * scale * self.pixels_per_point;
        let height = self.native_height * scale * self.pixels_per_point;
        if self.rotation % 180 == 90 {
            (height, width)
        } else {
            (width, height)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub page_number: u32,
    pub scale: f32,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self { page_number: 1, scale: 1.0 }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub surface: RgbaImage,
    pub layout: PageLayout,
    pub scale: f32,
}

pub trait PageRenderer {
    fn open(&mut self, source: OpenSource) -> Result<DocumentHandle, PdfEngineError>;
    fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError>;
    fn page_layout(
        &self,
        handle: DocumentHandle,
        page_number: u32,
    ) -> Result<PageLayout, PdfEngineError>;
    fn render_page(
        &self,
        handle: DocumentHandle,
        request: RenderRequest,
    ) -> Result<RenderedPage, PdfEngineError>;
    fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError>;
}

#[derive(Debug, Clone)]
struct DocumentRecord {
    layouts: Vec<PageLayout>,
}

/// Layout-accurate renderer: pages come out as blank sheets of the right size, which is all
/// the annotation overlay needs to place itself.
#[derive(Debug)]
pub struct LopdfRenderer {
    pixels_per_point: f32,
    next_handle: u64,
    docs: HashMap<DocumentHandle, DocumentRecord>,
}

impl Default for LopdfRenderer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl LopdfRenderer {
    pub fn new(pixels_per_point: f32) -> Self {
        let pixels_per_point =
            if pixels_per_point.is_finite() && pixels_per_point > 0.0 { pixels_per_point } else { 1.0 };
        Self { pixels_per_point, next_handle: 0, docs: HashMap::new() }
    }

    fn parse_layouts(&self, bytes: &[u8]) -> Result<Vec<PageLayout>, PdfEngineError> {
        ensure_not_encrypted(bytes)?;

        let doc = Document::load_mem(bytes)?;
        let layouts: Vec<PageLayout> = doc
            .get_pages()
            .into_iter()
            .map(|(page_number, page_id)| {
                let visible = page_box::crop_box(&doc, page_id);
                PageLayout {
                    page_number,
                    native_width: visible.width,
                    native_height: visible.height,
                    rotation: page_box::rotation(&doc, page_id),
                    pixels_per_point: self.pixels_per_point,
                }
            })
            .collect();

        if layouts.is_empty() {
            return Err(PdfEngineError::Backend("document has no pages".to_owned()));
        }

        Ok(layouts)
    }

    fn record(&self, handle: DocumentHandle) -> Result<&DocumentRecord, PdfEngineError> {
        self.docs.get(&handle).ok_or(PdfEngineError::InvalidHandle(handle.raw()))
    }
}

impl PageRenderer for LopdfRenderer {
    fn open(&mut self, source: OpenSource) -> Result<DocumentHandle, PdfEngineError> {
        let bytes = match source {
            OpenSource::Path(path) => fs::read(path)?,
            OpenSource::Bytes(bytes) => bytes,
        };

        let layouts = self.parse_layouts(&bytes)?;
        tracing::debug!(pages = layouts.len(), "opened document for rendering");

        self.next_handle += 1;
        let handle = DocumentHandle(self.next_handle);
        self.docs.insert(handle, DocumentRecord { layouts });

        Ok(handle)
    }

    fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError> {
        Ok(self.record(handle)?.layouts.len() as u32)
    }

    fn page_layout(
        &self,
        handle: DocumentHandle,
        page_number: u32,
    ) -> Result<PageLayout, PdfEngineError> {
        let record = self.record(handle)?;
        page_number
            .checked_sub(1)
            .and_then(|index| record.layouts.get(index as usize))
            .copied()
            .ok_or(PdfEngineError::PageOutOfRange {
                page: page_number,
                page_count: record.layouts.len() as u32,
            })
    }

    fn render_page(
        &self,
        handle: DocumentHandle,
        request: RenderRequest,
    ) -> Result<RenderedPage, PdfEngineError> {
        let layout = self.page_layout(handle, request.page_number)?;
        let scale = if request.scale.is_finite() && request.scale > 0.0 { request.scale } else { 1.0 };

        let (width, height) = layout.rendered_size(scale);
        let width = width.round().max(1.0) as u32;
        let height = height.round().max(1.0) as u32;

        let mut surface = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));

        if width >= 4 && height >= 4 {
            for x in 0..width {
                surface.put_pixel(x, 0, Rgba([220, 220, 220, 255]));
                surface.put_pixel(x, height - 1, Rgba([220, 220, 220, 255]));
            }
            for y in 0..height {
                surface.put_pixel(0, y, Rgba([220, 220, 220, 255]));
                surface.put_pixel(width - 1, y, Rgba([220, 220, 220, 255]));
            }
        }

        Ok(RenderedPage { surface, layout, scale })
    }

    fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError> {
        self.docs.remove(&handle).map(|_| ()).ok_or(PdfEngineError::InvalidHandle(handle.raw()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{blank_pdf, PageSize};
    use lopdf::{dictionary, Object, Stream};

    fn open_blank(renderer: &mut LopdfRenderer, sizes: &[PageSize]) -> DocumentHandle {
        let bytes = blank_pdf(sizes).expect("blank pdf should build");
        renderer.open(OpenSource::Bytes(bytes)).expect("open should succeed")
    }

    /// Two pages whose MediaBox and Rotate live on the page tree node, the second with its
    /// own CropBox.
    fn inherited_boxes_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(lopdf::Dictionary::new(), Vec::new()));
        let first = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
        });
        let second = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "CropBox" => vec![Object::Integer(10), Object::Integer(20), Object::Integer(310), Object::Integer(420)],
            "Rotate" => Object::Integer(0),
            "Contents" => Object::Reference(content_id),
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(first), Object::Reference(second)],
                "Count" => Object::Integer(2),
                "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(595), Object::Integer(842)],
                "Rotate" => Object::Integer(90),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("save should succeed");
        bytes
    }

    #[test]
    fn opens_pdf_and_reads_page_count() {
        let mut renderer = LopdfRenderer::new(1.0);
        let handle = open_blank(&mut renderer, &[PageSize { width_pt: 612.0, height_pt: 792.0 }]);

        assert_eq!(renderer.page_count(handle).expect("count should succeed"), 1);
    }

    #[test]
    fn layout_follows_inherited_boxes_and_rotation() {
        let mut renderer = LopdfRenderer::new(1.0);
        let handle =
            renderer.open(OpenSource::Bytes(inherited_boxes_pdf())).expect("open should succeed");

        let first = renderer.page_layout(handle, 1).expect("layout should succeed");
        assert_eq!((first.native_width, first.native_height, first.rotation), (595.0, 842.0, 90));
        assert_eq!(first.rendered_size(1.0), (842.0, 595.0));

        let second = renderer.page_layout(handle, 2).expect("layout should succeed");
        assert_eq!((second.native_width, second.native_height, second.rotation), (300.0, 400.0, 0));
    }

    #[test]
    fn render_surface_matches_rendered_size() {
        let mut renderer = LopdfRenderer::new(2.0);
        let handle = open_blank(&mut renderer, &[PageSize { width_pt: 300.0, height_pt: 200.0 }]);

        let page = renderer
            .render_page(handle, RenderRequest { page_number: 1, scale: 1.5 })
            .expect("render should succeed");

        assert_eq!(page.layout.rendered_size(1.5), (900.0, 600.0));
        assert_eq!(page.surface.dimensions(), (900, 600));
        assert_eq!(page.surface.get_pixel(10, 10), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn page_numbers_are_one_based() {
        let mut renderer = LopdfRenderer::new(1.0);
        let handle = open_blank(&mut renderer, &[PageSize { width_pt: 100.0, height_pt: 100.0 }]);

        assert!(matches!(
            renderer.page_layout(handle, 0),
            Err(PdfEngineError::PageOutOfRange { page: 0, page_count: 1 })
        ));
        assert!(matches!(
            renderer.page_layout(handle, 2),
            Err(PdfEngineError::PageOutOfRange { page: 2, page_count: 1 })
        ));
    }

    #[test]
    fn invalid_handle_returns_error() {
        let mut renderer = LopdfRenderer::new(1.0);
        let err = renderer
            .page_count(DocumentHandle(999))
            .expect_err("should fail for unknown handle");
        assert!(matches!(err, PdfEngineError::InvalidHandle(999)));

        let handle = open_blank(&mut renderer, &[PageSize { width_pt: 100.0, height_pt: 100.0 }]);
        renderer.close(handle).expect("close should succeed");
        assert!(matches!(renderer.close(handle), Err(PdfEngineError::InvalidHandle(_))));
    }
}
