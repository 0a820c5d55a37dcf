use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Session-scoped identifier, unique within its collection.
pub type AnnotationId = u32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}, expected #rrggbb")]
pub struct ParseColorError(pub String);

/// Opaque stroke color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);
    pub const RED: Rgb = Rgb::new(0xff, 0x00, 0x00);
    pub const BLUE: Rgb = Rgb::new(0x00, 0x00, 0xff);
    pub const GREEN: Rgb = Rgb::new(0x00, 0x80, 0x00);
    pub const ORANGE: Rgb = Rgb::new(0xff, 0xa5, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components in the 0.0..=1.0 range used by PDF color operators.
    pub fn to_normalized(self) -> (f32, f32, f32) {
        (self.r as f32 / 255.0, self.g as f32 / 255.0, self.b as f32 / 255.0)
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseColorError(value.to_owned());
        let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };

        Ok(Self { r: channel(0..2)?, g: channel(2..4)?, b: channel(4..6)? })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// Free text box. Position and sizes are render-space pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    pub id: AnnotationId,
    pub page: u32,
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub font_size: f32,
    pub width: f32,
    pub height: f32,
}

impl TextAnnotation {
    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Applies every `Some` field of the patch.
    pub fn apply(&mut self, patch: &TextPatch) {
        if let Some(text) = &patch.text {
            self.text.clone_from(text);
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(font_size) = patch.font_size {
            self.font_size = font_size;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
    }
}

/// Partial update of a [`TextAnnotation`]. `None` leaves a field alone; `Some(String::new())`
/// clears the text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextPatch {
    pub text: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub font_size: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl TextPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Self::default() }
    }

    pub fn position(x: f32, y: f32) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    pub fn font_size(font_size: f32) -> Self {
        Self { font_size: Some(font_size), ..Self::default() }
    }

    pub fn size(width: f32, height: f32) -> Self {
        Self { width: Some(width), height: Some(height), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Freehand polyline in render space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenStroke {
    pub id: AnnotationId,
    pub page: u32,
    #[serde(with = "crate::path_data::as_path_data")]
    pub points: Vec<Point>,
    pub color: Rgb,
    pub stroke_width: f32,
}

impl PenStroke {
    /// Consecutive point pairs, one per drawn line segment.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|pair| (pair[0], pair[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_text() -> TextAnnotation {
        TextAnnotation {
            id: 1,
            page: 1,
            x: 50.0,
            y: 50.0,
            text: "New Text".to_owned(),
            font_size: 16.0,
            width: 200.0,
            height: 50.0,
        }
    }

    #[test]
    fn color_parses_and_prints_hex() {
        let color: Rgb = "#FFa500".parse().expect("color should parse");
        assert_eq!(color, Rgb::ORANGE);
        assert_eq!(color.to_string(), "#ffa500");

        assert!("ffa500".parse::<Rgb>().is_err());
        assert!("#ffa5".parse::<Rgb>().is_err());
        assert!("#gg0000".parse::<Rgb>().is_err());
    }

    #[test]
    fn color_normalizes_to_unit_range() {
        let (r, g, b) = Rgb::new(255, 0, 51).to_normalized();
        assert_eq!((r, g), (1.0, 0.0));
        assert!((b - 0.2).abs() < 1e-6);
    }

    #[test]
    fn patch_leaves_missing_fields_untouched() {
        let mut text = sample_text();
        text.apply(&TextPatch { x: Some(75.0), ..TextPatch::default() });

        assert_eq!(text.x, 75.0);
        assert_eq!(text.y, 50.0);
        assert_eq!(text.text, "New Text");
    }

    #[test]
    fn patch_can_clear_text() {
        let mut text = sample_text();
        text.apply(&TextPatch::text(""));

        assert_eq!(text.text, "");
        assert_eq!(text.font_size, 16.0);
    }

    #[test]
    fn patch_deserializes_with_absent_fields() {
        let patch: TextPatch =
            serde_json::from_str(r#"{"text":"","width":120}"#).expect("patch should parse");

        assert_eq!(patch.text.as_deref(), Some(""));
        assert_eq!(patch.width, Some(120.0));
        assert_eq!(patch.x, None);
    }

    #[test]
    fn stroke_segments_pair_consecutive_points() {
        let stroke = PenStroke {
            id: 1,
            page: 1,
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 0.0)],
            color: Rgb::RED,
            stroke_width: 3.0,
        };

        let segments: Vec<_> = stroke.segments().collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1], (Point::new(1.0, 1.0), Point::new(2.0, 0.0)));
    }

    #[test]
    fn stroke_points_serialize_as_path_data() {
        let stroke = PenStroke {
            id: 2,
            page: 1,
            points: vec![Point::new(10.0, 20.5), Point::new(30.0, 40.0)],
            color: Rgb::BLUE,
            stroke_width: 2.0,
        };

        let json = serde_json::to_value(&stroke).expect("serialize should succeed");
        assert_eq!(json["points"], "M 10 20.5 L 30 40");
        assert_eq!(json["color"], "#0000ff");

        let parsed: PenStroke = serde_json::from_value(json).expect("deserialize should succeed");
        assert_eq!(parsed, stroke);
    }

    #[test]
    fn stroke_with_bad_path_data_is_rejected() {
        let parsed = serde_json::from_str::<PenStroke>(
            r##"{"id":1,"page":1,"points":"M 0 0 C 1 1 2 2 3 3","color":"#000000","stroke_width":1.0}"##,
        );

        assert!(parsed.is_err());
    }
}
