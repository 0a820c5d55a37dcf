use lopdf::{Document, Object, ObjectId};

use crate::{PageBox, DEFAULT_PAGE_SIZE};

const MAX_PARENT_DEPTH: usize = 32;

/// Inheritable page attribute, following `/Parent` links up the page tree.
pub(crate) fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut dict = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_PARENT_DEPTH {
        if let Ok(value) = dict.get(key) {
            return resolve(doc, value);
        }
        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_dictionary(parent).ok()?;
    }
    None
}

pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn rect(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<PageBox> {
    let array = inherited(doc, page_id, key)?.as_array().ok()?;
    if array.len() != 4 {
        return None;
    }

    let mut values = [0.0f32; 4];
    for (slot, item) in values.iter_mut().zip(array) {
        *slot = resolve(doc, item)?.as_float().ok()?;
    }
    let [x0, y0, x1, y1] = values;

    Some(PageBox { x: x0.min(x1), y: y0.min(y1), width: (x1 - x0).abs(), height: (y1 - y0).abs() })
        .filter(|rect| rect.width > 0.0 && rect.height > 0.0)
}

pub(crate) fn media_box(doc: &Document, page_id: ObjectId) -> PageBox {
    rect(doc, page_id, b"MediaBox").unwrap_or(PageBox {
        x: 0.0,
        y: 0.0,
        width: DEFAULT_PAGE_SIZE.width_pt,
        height: DEFAULT_PAGE_SIZE.height_pt,
    })
}

/// Visible region: the CropBox clipped to the MediaBox, or the MediaBox itself.
pub(crate) fn crop_box(doc: &Document, page_id: ObjectId) -> PageBox {
    let media = media_box(doc, page_id);
    let Some(crop) = rect(doc, page_id, b"CropBox") else {
        return media;
    };

    let x = crop.x.max(media.x);
    let y = crop.y.max(media.y);
    let right = (crop.x + crop.width).min(media.x + media.width);
    let top = (crop.y + crop.height).min(media.y + media.height);
    if right <= x || top <= y {
        return media;
    }

    PageBox { x, y, width: right - x, height: top - y }
}

pub(crate) fn rotation(doc: &Document, page_id: ObjectId) -> u16 {
    let degrees = inherited(doc, page_id, b"Rotate").and_then(|value| value.as_i64().ok()).unwrap_or(0);
    let normalized = degrees.rem_euclid(360);
    if normalized % 90 != 0 {
        tracing::warn!(degrees, "ignoring page rotation that is not a multiple of 90");
        return 0;
    }
    normalized as u16
}
