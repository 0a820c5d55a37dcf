//! Coordinate frames and the page geometry cache.
//!
//! Three frames are in play:
//! - display space: screen pixels at the current zoom, origin top-left, y down
//! - render space: display space divided by the zoom scale; every annotation is stored here
//! - PDF point space: the page's native frame, origin bottom-left, y up, 1/72 inch units

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Converts a pointer position (relative to the page's on-screen origin) to render space.
pub fn to_render_space(display: Point, scale: f32) -> Point {
    debug_assert!(scale > 0.0, "zoom scale must be positive");
    Point::new(display.x / scale, display.y / scale)
}

pub fn to_display_space(render: Point, scale: f32) -> Point {
    Point::new(render.x * scale, render.y * scale)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("page rotation must be a multiple of 90 degrees, got {0}")]
pub struct InvalidRotation(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Normalizes any multiple of 90 (including negative values) into `0..360`.
    pub fn from_degrees(degrees: i64) -> Result<Self, InvalidRotation> {
        match degrees.rem_euclid(360) {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            _ => Err(InvalidRotation(degrees)),
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    pub fn swaps_axes(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

impl TryFrom<i64> for Rotation {
    type Error = InvalidRotation;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_degrees(value)
    }
}

impl From<Rotation> for u16 {
    fn from(value: Rotation) -> Self {
        value.degrees()
    }
}

/// Page size as laid out by the renderer at scale 1, next to its native point size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub rendered_width: f32,
    pub rendered_height: f32,
    pub native_width: f32,
    pub native_height: f32,
    pub rotation: Rotation,
}

impl PageGeometry {
    pub fn is_degenerate(&self) -> bool {
        [self.rendered_width, self.rendered_height, self.native_width, self.native_height]
            .iter()
            .any(|value| !value.is_finite() || *value <= 0.0)
    }
}

/// Render space to PDF point space for one page.
///
/// Assumes an unrotated page. The rotation is recorded on [`PageGeometry`] but not applied here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageTransform {
    scale_x: f32,
    scale_y: f32,
    native_height: f32,
    crop_origin: Point,
}

impl PageTransform {
    /// Returns `None` for degenerate geometry, which callers treat like missing geometry.
    pub fn new(geometry: &PageGeometry, crop_origin: Point) -> Option<Self> {
        if geometry.is_degenerate() || !crop_origin.is_finite() {
            return None;
        }

        Some(Self {
            scale_x: geometry.native_width / geometry.rendered_width,
            scale_y: geometry.native_height / geometry.rendered_height,
            native_height: geometry.native_height,
            crop_origin,
        })
    }

    pub fn scale_x(&self) -> f32 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f32 {
        self.scale_y
    }

    pub fn to_pdf_space(&self, render: Point) -> Point {
        Point::new(
            render.x * self.scale_x + self.crop_origin.x,
            self.native_height + self.crop_origin.y - render.y * self.scale_y,
        )
    }

    /// Baseline anchor for a text box whose top-left corner is `top_left`.
    ///
    /// The box is anchored at its top-left on screen while the PDF text operator anchors on the
    /// glyph baseline; `baseline_factor` of the render-space font size bridges the two.
    pub fn text_baseline(&self, top_left: Point, font_size: f32, baseline_factor: f32) -> Point {
        let anchor = self.to_pdf_space(top_left);
        Point::new(anchor.x, anchor.y - font_size * baseline_factor)
    }

    /// Horizontal render-space length in points (stroke widths, wrap widths).
    pub fn width_to_pdf(&self, width: f32) -> f32 {
        width * self.scale_x
    }
}

pub fn to_pdf_space(render: Point, geometry: &PageGeometry, crop_origin: Point) -> Option<Point> {
    PageTransform::new(geometry, crop_origin).map(|transform| transform.to_pdf_space(render))
}

/// Geometry reported by the renderer, keyed by 1-based page number.
///
/// An entry is written the first time a page is rendered and never replaced afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageGeometryCache {
    pages: BTreeMap<u32, PageGeometry>,
}

impl PageGeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the page was already known; the stored geometry is kept.
    pub fn record(&mut self, page: u32, geometry: PageGeometry) -> bool {
        if self.pages.contains_key(&page) {
            tracing::trace!(page, "page geometry already recorded");
            return false;
        }

        tracing::debug!(
            page,
            rendered_width = geometry.rendered_width,
            rendered_height = geometry.rendered_height,
            native_width = geometry.native_width,
            native_height = geometry.native_height,
            rotation = geometry.rotation.degrees(),
            "recorded page geometry"
        );
        self.pages.insert(page, geometry);
        true
    }

    pub fn get(&self, page: u32) -> Option<&PageGeometry> {
        self.pages.get(&page)
    }

    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains_key(&page)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &PageGeometry)> {
        self.pages.iter().map(|(page, geometry)| (*page, geometry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn letter_at_600_by_800() -> PageGeometry {
        PageGeometry {
            rendered_width: 600.0,
            rendered_height: 800.0,
            native_width: 612.0,
            native_height: 792.0,
            rotation: Rotation::Deg0,
        }
    }

    #[test]
    fn pdf_space_flips_y_axis_and_scales() {
        let transform =
            PageTransform::new(&letter_at_600_by_800(), Point::default()).expect("geometry is valid");

        let top_left = transform.to_pdf_space(Point::new(0.0, 0.0));
        assert_eq!(top_left, Point::new(0.0, 792.0));

        let bottom_right = transform.to_pdf_space(Point::new(600.0, 800.0));
        assert!((bottom_right.x - 612.0).abs() < 1e-3);
        assert!(bottom_right.y.abs() < 1e-3);
    }

    #[test]
    fn crop_box_origin_offsets_both_axes() {
        let geometry = PageGeometry {
            rendered_width: 612.0,
            rendered_height: 792.0,
            native_width: 612.0,
            native_height: 792.0,
            rotation: Rotation::Deg0,
        };
        let mapped = to_pdf_space(Point::new(10.0, 20.0), &geometry, Point::new(30.0, 40.0))
            .expect("geometry is valid");

        assert_eq!(mapped, Point::new(40.0, 812.0));
    }

    #[test]
    fn text_baseline_matches_letter_scenario() {
        let transform =
            PageTransform::new(&letter_at_600_by_800(), Point::default()).expect("geometry is valid");

        let anchor = transform.text_baseline(Point::new(50.0, 50.0), 16.0, 0.8);

        assert!((anchor.x - 51.0).abs() < 0.01, "x was {}", anchor.x);
        assert!((anchor.y - 729.3).abs() < 0.5, "y was {}", anchor.y);
        assert!((anchor.y - (792.0 - 50.0 * 0.99 - 16.0 * 0.8)).abs() < 1e-3);
    }

    #[test]
    fn degenerate_geometry_has_no_transform() {
        let zero_width = PageGeometry { rendered_width: 0.0, ..letter_at_600_by_800() };
        assert!(PageTransform::new(&zero_width, Point::default()).is_none());

        let nan_height = PageGeometry { native_height: f32::NAN, ..letter_at_600_by_800() };
        assert!(to_pdf_space(Point::new(1.0, 1.0), &nan_height, Point::default()).is_none());
    }

    #[test]
    fn rotation_normalizes_multiples_of_ninety() {
        assert_eq!(Rotation::from_degrees(-90), Ok(Rotation::Deg270));
        assert_eq!(Rotation::from_degrees(450), Ok(Rotation::Deg90));
        assert_eq!(Rotation::from_degrees(45), Err(InvalidRotation(45)));
        assert!(Rotation::Deg270.swaps_axes());
        assert!(!Rotation::Deg180.swaps_axes());
    }

    #[test]
    fn rotation_serializes_as_degrees() {
        let json = serde_json::to_string(&Rotation::Deg180).expect("serialize should succeed");
        assert_eq!(json, "180");

        let parsed: Rotation = serde_json::from_str("-90").expect("deserialize should succeed");
        assert_eq!(parsed, Rotation::Deg270);
        assert!(serde_json::from_str::<Rotation>("30").is_err());
    }

    #[test]
    fn cache_keeps_first_geometry_for_a_page() {
        let mut cache = PageGeometryCache::new();
        assert!(cache.record(1, letter_at_600_by_800()));

        let replacement = PageGeometry { rendered_width: 1200.0, ..letter_at_600_by_800() };
        assert!(!cache.record(1, replacement));

        assert_eq!(cache.get(1), Some(&letter_at_600_by_800()));
        assert_eq!(cache.len(), 1);
        assert!(!cache.contains(2));
    }

    proptest! {
        #[test]
        fn display_render_round_trip(
            x in -5000.0f32..5000.0,
            y in -5000.0f32..5000.0,
            scale in 0.05f32..8.0,
        ) {
            let display = Point::new(x, y);
            let back = to_display_space(to_render_space(display, scale), scale);

            let tolerance = 1e-4 * (1.0 + x.abs().max(y.abs()));
            prop_assert!((back.x - x).abs() <= tolerance);
            prop_assert!((back.y - y).abs() <= tolerance);
        }

        #[test]
        fn moving_down_on_screen_moves_down_on_the_page(
            rendered_width in 50.0f32..3000.0,
            rendered_height in 50.0f32..3000.0,
            native_width in 50.0f32..3000.0,
            native_height in 50.0f32..3000.0,
            y in 0.0f32..2000.0,
            delta in 1.0f32..500.0,
        ) {
            let geometry = PageGeometry {
                rendered_width,
                rendered_height,
                native_width,
                native_height,
                rotation: Rotation::Deg0,
            };
            let transform = PageTransform::new(&geometry, Point::default()).expect("valid geometry");

            let upper = transform.to_pdf_space(Point::new(10.0, y));
            let lower = transform.to_pdf_space(Point::new(10.0, y + delta));

            prop_assert!(lower.y < upper.y);
        }
    }
}
