use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::{BTreeMap, BTreeSet};

use crate::fonts::{encode_win_ansi, wrap_text, StandardFont};
use crate::{
    ensure_not_encrypted, page_box, Color, FontHandle, LineOptions, PageBox, PageSize,
    PdfEngineError, TextOptions,
};

/// A loaded document that can be drawn on and serialized again. Pages are addressed by
/// zero-based index.
pub trait PdfDocument: Sized {
    fn load(bytes: &[u8]) -> Result<Self, PdfEngineError>;
    fn page_count(&self) -> u32;
    /// MediaBox size in points.
    fn page_size(&self, page_index: u32) -> Result<PageSize, PdfEngineError>;
    fn crop_box(&self, page_index: u32) -> Result<PageBox, PdfEngineError>;
    fn embed_standard_font(&mut self, font: StandardFont) -> Result<FontHandle, PdfEngineError>;
    fn draw_line(&mut self, page_index: u32, options: LineOptions) -> Result<(), PdfEngineError>;
    fn draw_text(
        &mut self,
        page_index: u32,
        text: &str,
        options: TextOptions,
    ) -> Result<(), PdfEngineError>;
    fn save(&mut self) -> Result<Vec<u8>, PdfEngineError>;
}

#[derive(Debug, Clone)]
struct EmbeddedFont {
    font: StandardFont,
    object_id: ObjectId,
    resource_name: Vec<u8>,
}

#[derive(Debug, Default)]
struct PendingPage {
    operations: Vec<Operation>,
    fonts: BTreeSet<u32>,
}

/// [`PdfDocument`] over lopdf. Drawing is buffered per page and appended as one content
/// stream per page on [`PdfDocument::save`], isolated from the page's own graphics state.
pub struct LopdfDocument {
    doc: Document,
    pages: Vec<ObjectId>,
    fonts: Vec<EmbeddedFont>,
    pending: BTreeMap<u32, PendingPage>,
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("pages", &self.pages.len())
            .field("fonts", &self.fonts.len())
            .field("pending_pages", &self.pending.len())
            .finish()
    }
}

impl LopdfDocument {
    fn page_id(&self, page_index: u32) -> Result<ObjectId, PdfEngineError> {
        self.pages.get(page_index as usize).copied().ok_or(PdfEngineError::PageOutOfRange {
            page: page_index,
            page_count: self.page_count(),
        })
    }

    fn font(&self, handle: FontHandle) -> Result<&EmbeddedFont, PdfEngineError> {
        self.fonts.get(handle.raw() as usize).ok_or(PdfEngineError::UnknownFont(handle.raw()))
    }

    fn pending_mut(&mut self, page_index: u32) -> &mut PendingPage {
        self.pending.entry(page_index).or_default()
    }
}

impl PdfDocument for LopdfDocument {
    fn load(bytes: &[u8]) -> Result<Self, PdfEngineError> {
        ensure_not_encrypted(bytes)?;

        let doc = Document::load_mem(bytes)?;
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if pages.is_empty() {
            return Err(PdfEngineError::Backend("document has no pages".to_owned()));
        }

        Ok(Self { doc, pages, fonts: Vec::new(), pending: BTreeMap::new() })
    }

    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_size(&self, page_index: u32) -> Result<PageSize, PdfEngineError> {
        let page_id = self.page_id(page_index)?;
        Ok(page_box::media_box(&self.doc, page_id).size())
    }

    fn crop_box(&self, page_index: u32) -> Result<PageBox, PdfEngineError> {
        let page_id = self.page_id(page_index)?;
        Ok(page_box::crop_box(&self.doc, page_id))
    }

    fn embed_standard_font(&mut self, font: StandardFont) -> Result<FontHandle, PdfEngineError> {
        if let Some(index) = self.fonts.iter().position(|embedded| embedded.font == font) {
            return Ok(FontHandle(index as u32));
        }

        let object_id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        let index = self.fonts.len() as u32;
        let resource_name = format!("PdfMarkupF{}", index + 1).into_bytes();
        self.fonts.push(EmbeddedFont { font, object_id, resource_name });
        tracing::debug!(%font, index, "embedded standard font");

        Ok(FontHandle(index))
    }

    fn draw_line(&mut self, page_index: u32, options: LineOptions) -> Result<(), PdfEngineError> {
        self.page_id(page_index)?;
        ensure_finite("line start", &[options.start.x, options.start.y])?;
        ensure_finite("line end", &[options.end.x, options.end.y])?;
        ensure_finite("line thickness", &[options.thickness])?;

        let operations = [
            Operation::new("q", vec![]),
            Operation::new("RG", color_operands(options.color)),
            Operation::new("w", vec![options.thickness.into()]),
            Operation::new("J", vec![options.cap.style().into()]),
            Operation::new("m", vec![options.start.x.into(), options.start.y.into()]),
            Operation::new("l", vec![options.end.x.into(), options.end.y.into()]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ];
        self.pending_mut(page_index).operations.extend(operations);

        Ok(())
    }

    fn draw_text(
        &mut self,
        page_index: u32,
        text: &str,
        options: TextOptions,
    ) -> Result<(), PdfEngineError> {
        self.page_id(page_index)?;
        ensure_finite("text origin", &[options.origin.x, options.origin.y])?;
        ensure_finite("text size", &[options.size, options.line_height])?;
        let embedded = self.font(options.font)?;
        let font = embedded.font;
        let resource_name = embedded.resource_name.clone();

        let lines = wrap_text(text, font, options.size, options.max_width);
        let mut operations = vec![
            Operation::new("q", vec![]),
            Operation::new("rg", color_operands(options.color)),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(resource_name), options.size.into()]),
            Operation::new("TL", vec![options.line_height.into()]),
            Operation::new("Td", vec![options.origin.x.into(), options.origin.y.into()]),
        ];

        let mut replaced = 0;
        for (index, line) in lines.iter().enumerate() {
            if index > 0 {
                operations.push(Operation::new("T*", vec![]));
            }
            let (bytes, line_replaced) = encode_win_ansi(line);
            replaced += line_replaced;
            operations.push(Operation::new("Tj", vec![Object::String(bytes, StringFormat::Hexadecimal)]));
        }
        operations.push(Operation::new("ET", vec![]));
        operations.push(Operation::new("Q", vec![]));

        if replaced > 0 {
            tracing::warn!(page_index, replaced, %font, "characters outside WinAnsi were replaced with '?'");
        }

        let pending = self.pending_mut(page_index);
        pending.operations.extend(operations);
        pending.fonts.insert(options.font.raw());

        Ok(())
    }

    fn save(&mut self) -> Result<Vec<u8>, PdfEngineError> {
        for (page_index, pending) in std::mem::take(&mut self.pending) {
            let page_id = self.page_id(page_index)?;
            let fonts: Vec<(Vec<u8>, ObjectId)> = pending
                .fonts
                .iter()
                .filter_map(|index| self.fonts.get(*index as usize))
                .map(|embedded| (embedded.resource_name.clone(), embedded.object_id))
                .collect();

            if !fonts.is_empty() {
                add_font_resources(&mut self.doc, page_id, &fonts)?;
            }

            let content = Content { operations: pending.operations }.encode()?;
            append_content(&mut self.doc, page_id, content)?;
            tracing::debug!(page_index, fonts = fonts.len(), "appended annotation content");
        }

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|err| PdfEngineError::Backend(format!("failed to write PDF: {err}")))?;
        Ok(bytes)
    }
}

fn ensure_finite(field: &'static str, values: &[f32]) -> Result<(), PdfEngineError> {
    if values.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(PdfEngineError::NotFinite { field })
    }
}

fn color_operands(color: Color) -> Vec<Object> {
    vec![color.r.into(), color.g.into(), color.b.into()]
}

/// Gives the page its own Resources dictionary (copied from whatever it inherited or
/// referenced) with the fonts added, so sibling pages sharing resources are untouched.
fn add_font_resources(
    doc: &mut Document,
    page_id: ObjectId,
    fonts: &[(Vec<u8>, ObjectId)],
) -> Result<(), PdfEngineError> {
    let mut resources = page_box::inherited(doc, page_id, b"Resources")
        .and_then(|object| object.as_dict().ok())
        .cloned()
        .unwrap_or_else(Dictionary::new);
    let mut font_dict = resources
        .get(b"Font")
        .ok()
        .and_then(|object| page_box::resolve(doc, object))
        .and_then(|object| object.as_dict().ok())
        .cloned()
        .unwrap_or_else(Dictionary::new);

    for (name, object_id) in fonts {
        font_dict.set(name.clone(), Object::Reference(*object_id));
    }
    resources.set("Font", Object::Dictionary(font_dict));
    doc.get_object_mut(page_id)?.as_dict_mut()?.set("Resources", Object::Dictionary(resources));

    Ok(())
}

/// Appends `content` after the existing page content, which is wrapped in `q`/`Q` so any
/// graphics state it leaves behind does not leak into the appended drawing.
fn append_content(doc: &mut Document, page_id: ObjectId, content: Vec<u8>) -> Result<(), PdfEngineError> {
    let existing: Vec<Object> = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    let mut contents = Vec::with_capacity(existing.len() + 2);
    if existing.is_empty() {
        contents.push(Object::Reference(doc.add_object(Stream::new(Dictionary::new(), content))));
    } else {
        let open = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        // Leading newline keeps `Q` apart from an unterminated last operator.
        let close = doc.add_object(Stream::new(
            Dictionary::new(),
            [b"\nQ\n".as_slice(), content.as_slice()].concat(),
        ));
        contents.push(Object::Reference(open));
        contents.extend(existing);
        contents.push(Object::Reference(close));
    }

    doc.get_object_mut(page_id)?.as_dict_mut()?.set("Contents", Object::Array(contents));
    Ok(())
}

/// Minimal document with one blank page per entry in `page_sizes`.
pub fn blank_pdf(page_sizes: &[PageSize]) -> Result<Vec<u8>, PdfEngineError> {
    if page_sizes.is_empty() {
        return Err(PdfEngineError::Backend("a document needs at least one page".to_owned()));
    }

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(page_sizes.len());

    for size in page_sizes {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(size.width_pt),
                Object::Real(size.height_pt),
            ],
            "Contents" => Object::Reference(content_id),
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(page_sizes.len() as i64),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|err| PdfEngineError::Backend(format!("failed to write PDF: {err}")))?;
    Ok(bytes)
}
