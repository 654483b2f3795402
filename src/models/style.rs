use serde::{Deserialize, Serialize};

pub const RED: [u8; 3] = [255, 0, 0];
pub const WHITE: [u8; 3] = [255, 255, 255];
pub const BLACK: [u8; 3] = [0, 0, 0];

pub const OPAQUE: u8 = 255;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum StrokeCap {
    #[serde(rename = "butt")]
    Butt,
    #[serde(rename = "round")]
    Round,
}

impl Default for StrokeCap {
    fn default() -> Self {
        StrokeCap::Butt
    }
}

/// Whether closed shapes are outlined or filled
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum PaintStyle {
    #[serde(rename = "fill")]
    Fill,
    #[serde(rename = "stroke")]
    Stroke,
}

impl Default for PaintStyle {
    fn default() -> Self {
        PaintStyle::Fill
    }
}

/// Soft shadow drawn underneath an element
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Shadow {
    pub radius: f32,
    pub color: [u8; 3],
}

/// Resolved paint for one visual element of a face.
///
/// All sizes are absolute surface units for the frame they were resolved for.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct StrokeStyle {
    pub color: [u8; 3],
    pub width: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    pub opacity: u8,
    pub anti_aliased: bool,
    #[serde(default)]
    pub cap: StrokeCap,
    #[serde(default)]
    pub paint: PaintStyle,
    #[serde(default)]
    pub text_size: f32,
    #[serde(default)]
    pub bold: bool,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: WHITE,
            width: 0.0,
            shadow: None,
            opacity: OPAQUE,
            anti_aliased: true,
            cap: StrokeCap::default(),
            paint: PaintStyle::default(),
            text_size: 0.0,
            bold: false,
        }
    }
}

impl StrokeStyle {
    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn with_shadow(mut self, shadow: Option<Shadow>) -> Self {
        self.shadow = shadow;
        self
    }

    pub fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_anti_alias(mut self, anti_aliased: bool) -> Self {
        self.anti_aliased = anti_aliased;
        self
    }

    pub fn with_cap(mut self, cap: StrokeCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_paint(mut self, paint: PaintStyle) -> Self {
        self.paint = paint;
        self
    }

    pub fn with_text_size(mut self, text_size: f32) -> Self {
        self.text_size = text_size;
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn has_shadow(&self) -> bool {
        self.shadow.is_some()
    }
}

/// Apply an 8-bit opacity to a color, the way brightness is applied to LEDs
pub fn scale_color(color: [u8; 3], opacity: u8) -> [u8; 3] {
    let scale = opacity as f32 / 255.0;
    [
        (color[0] as f32 * scale).round() as u8,
        (color[1] as f32 * scale).round() as u8,
        (color[2] as f32 * scale).round() as u8,
    ]
}
