//! Paints the annotation overlay of one page onto a rendered surface, in display space.

use image::Rgba;
use markup_model::{to_display_space, Point, Rgb, TextAnnotation};
use pdf_engine::RgbaImage;

const BOX_OUTLINE: Rgba<u8> = Rgba([59, 130, 246, 255]);
const HANDLE_SIZE: f32 = 8.0;

/// Render-space polyline, either committed or still being drawn.
#[derive(Debug, Clone, Copy)]
pub struct OverlayStroke<'a> {
    pub color: Rgb,
    pub width: f32,
    pub points: &'a [Point],
}

/// What to paint for one page. `texts` should already reflect an in-flight text gesture.
#[derive(Debug, Clone, Copy)]
pub struct Overlay<'a> {
    pub texts: &'a [TextAnnotation],
    pub strokes: &'a [OverlayStroke<'a>],
    pub scale: f32,
}

pub fn paint_overlay(surface: &mut RgbaImage, overlay: &Overlay<'_>) {
    for stroke in overlay.strokes {
        let pixel = Rgba([stroke.color.r, stroke.color.g, stroke.color.b, 255]);
        let radius = (stroke.width * overlay.scale / 2.0).max(0.5);
        for pair in stroke.points.windows(2) {
            let start = to_display_space(pair[0], overlay.scale);
            let end = to_display_space(pair[1], overlay.scale);
            stamp_segment(surface, start, end, radius, pixel);
        }
    }

    for text in overlay.texts {
        let top_left = to_display_space(text.top_left(), overlay.scale);
        let bottom_right =
            to_display_space(Point::new(text.x + text.width, text.y + text.height), overlay.scale);
        outline_rect(surface, top_left, bottom_right, BOX_OUTLINE);

        // Width handle on the right edge, font handle in the bottom-right corner.
        let mid_y = (top_left.y + bottom_right.y) / 2.0;
        fill_rect(
            surface,
            Point::new(bottom_right.x - 2.0, mid_y - HANDLE_SIZE),
            Point::new(bottom_right.x + 2.0, mid_y + HANDLE_SIZE),
            BOX_OUTLINE,
        );
        fill_rect(
            surface,
            Point::new(bottom_right.x - HANDLE_SIZE / 2.0, bottom_right.y - HANDLE_SIZE / 2.0),
            Point::new(bottom_right.x + HANDLE_SIZE / 2.0, bottom_right.y + HANDLE_SIZE / 2.0),
            BOX_OUTLINE,
        );
    }
}

fn put(surface: &mut RgbaImage, x: f32, y: f32, pixel: Rgba<u8>) {
    if x < 0.0 || y < 0.0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x < surface.width() && y < surface.height() {
        surface.put_pixel(x, y, pixel);
    }
}

fn stamp_segment(surface: &mut RgbaImage, start: Point, end: Point, radius: f32, pixel: Rgba<u8>) {
    let length = ((end.x - start.x).powi(2) + (end.y - start.y).powi(2)).sqrt();
    let steps = (length * 2.0).ceil().max(1.0) as u32;
    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let center = Point::new(start.x + (end.x - start.x) * t, start.y + (end.y - start.y) * t);
        stamp_disc(surface, center, radius, pixel);
    }
}

fn stamp_disc(surface: &mut RgbaImage, center: Point, radius: f32, pixel: Rgba<u8>) {
    let reach = radius.ceil() as i32;
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let (dx, dy) = (dx as f32, dy as f32);
            if dx * dx + dy * dy <= radius * radius {
                put(surface, center.x + dx, center.y + dy, pixel);
            }
        }
    }
}

fn outline_rect(surface: &mut RgbaImage, top_left: Point, bottom_right: Point, pixel: Rgba<u8>) {
    let (left, right) = (top_left.x.round(), bottom_right.x.round());
    let (top, bottom) = (top_left.y.round(), bottom_right.y.round());

    let mut x = left;
    while x <= right {
        put(surface, x, top, pixel);
        put(surface, x, bottom, pixel);
        x += 1.0;
    }
    let mut y = top;
    while y <= bottom {
        put(surface, left, y, pixel);
        put(surface, right, y, pixel);
        y += 1.0;
    }
}

fn fill_rect(surface: &mut RgbaImage, top_left: Point, bottom_right: Point, pixel: Rgba<u8>) {
    let mut y = top_left.y.round();
    while y <= bottom_right.y.round() {
        let mut x = top_left.x.round();
        while x <= bottom_right.x.round() {
            put(surface, x, y, pixel);
            x += 1.0;
        }
        y += 1.0;
    }
}
