use crate::annotation::Rgb;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field}: minimum {min} exceeds maximum {max}")]
    InvertedRange { field: &'static str, min: f32, max: f32 },
}

/// Box created by "Add Text", in render-space pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextDefaults {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub font_size: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            x: 50.0,
            y: 50.0,
            text: "New Text".to_owned(),
            font_size: 16.0,
            width: 200.0,
            height: 50.0,
        }
    }
}

/// Lower bounds applied while resizing a text box with its handles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeLimits {
    pub min_font_size: f32,
    pub min_box_width: f32,
    /// Font size points gained per render-space pixel of horizontal handle travel.
    pub font_resize_rate: f32,
}

impl Default for ResizeLimits {
    fn default() -> Self {
        Self { min_font_size: 8.0, min_box_width: 50.0, font_resize_rate: 0.5 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenSettings {
    pub color: Rgb,
    pub width: f32,
    pub min_width: f32,
    pub max_width: f32,
}

impl Default for PenSettings {
    fn default() -> Self {
        Self { color: Rgb::RED, width: 3.0, min_width: 1.0, max_width: 20.0 }
    }
}

impl PenSettings {
    pub fn clamp_width(&self, width: f32) -> f32 {
        width.clamp(self.min_width, self.max_width)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self { min: 0.5, max: 3.0, step: 0.1 }
    }
}

impl ZoomSettings {
    pub fn clamp(&self, scale: f32) -> f32 {
        scale.clamp(self.min, self.max)
    }
}

/// Calibration constants of the editor and its PDF export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Fraction of the font size between a text box's top edge and the first baseline.
    pub text_baseline_factor: f32,
    pub text_line_height_factor: f32,
    /// Rendered pixels per PDF point at zoom 1.
    pub pixels_per_point: f32,
    pub export_font: String,
    pub default_text: TextDefaults,
    pub resize: ResizeLimits,
    pub pen: PenSettings,
    pub zoom: ZoomSettings,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            text_baseline_factor: 0.8,
            text_line_height_factor: 1.2,
            pixels_per_point: 1.0,
            export_font: "Helvetica".to_owned(),
            default_text: TextDefaults::default(),
            resize: ResizeLimits::default(),
            pen: PenSettings::default(),
            zoom: ZoomSettings::default(),
        }
    }
}

impl EditorSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive = [
            ("text_line_height_factor", self.text_line_height_factor),
            ("pixels_per_point", self.pixels_per_point),
            ("default_text.font_size", self.default_text.font_size),
            ("default_text.width", self.default_text.width),
            ("default_text.height", self.default_text.height),
            ("resize.min_font_size", self.resize.min_font_size),
            ("resize.min_box_width", self.resize.min_box_width),
            ("pen.width", self.pen.width),
            ("pen.min_width", self.pen.min_width),
            ("zoom.min", self.zoom.min),
            ("zoom.step", self.zoom.step),
        ];

        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SettingsError::NotPositive { field, value });
            }
        }

        if !self.text_baseline_factor.is_finite() {
            return Err(SettingsError::NotPositive {
                field: "text_baseline_factor",
                value: self.text_baseline_factor,
            });
        }

        if self.pen.min_width > self.pen.max_width {
            return Err(SettingsError::InvertedRange {
                field: "pen",
                min: self.pen.min_width,
                max: self.pen.max_width,
            });
        }

        if self.zoom.min > self.zoom.max {
            return Err(SettingsError::InvertedRange {
                field: "zoom",
                min: self.zoom.min,
                max: self.zoom.max,
            });
        }

        Ok(())
    }
}
