use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Visual style of a watch face
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum FaceStyle {
    #[serde(rename = "analogue")]
    Analogue,
    #[serde(rename = "digital")]
    Digital,
}

impl Default for FaceStyle {
    fn default() -> Self {
        FaceStyle::Analogue
    }
}

impl FromStr for FaceStyle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "analogue" | "analog" => Ok(FaceStyle::Analogue),
            "digital" => Ok(FaceStyle::Digital),
            other => Err(format!(
                "Invalid face style '{}'. Must be 'analogue' or 'digital'",
                other
            )),
        }
    }
}

impl fmt::Display for FaceStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaceStyle::Analogue => write!(f, "analogue"),
            FaceStyle::Digital => write!(f, "digital"),
        }
    }
}

/// Display state flags supplied by the host for a single frame.
/// Both flags are independent and may be combined.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct RenderMode {
    /// Low-power always-on state: monochrome, no shadows, no second hand
    #[serde(default)]
    pub ambient: bool,
    /// Dimmed state: reduced opacity on the hands and digits
    #[serde(default)]
    pub mute: bool,
}

impl RenderMode {
    pub fn new(ambient: bool, mute: bool) -> Self {
        Self { ambient, mute }
    }

    pub fn interactive() -> Self {
        Self::default()
    }
}

/// Viewport of the circular face in surface coordinates
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct FaceGeometry {
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
}

impl FaceGeometry {
    pub fn new(center_x: f32, center_y: f32, radius: f32) -> Self {
        Self {
            center_x,
            center_y,
            radius,
        }
    }

    /// Geometry of the largest circle inscribed in a `width` x `height` surface
    pub fn inscribed(width: u32, height: u32) -> Self {
        let center_x = width as f32 / 2.0;
        let center_y = height as f32 / 2.0;
        Self::new(center_x, center_y, center_x.min(center_y))
    }

    /// A degenerate face draws nothing
    pub fn is_degenerate(&self) -> bool {
        !(self.radius > 0.0
            && self.radius.is_finite()
            && self.center_x.is_finite()
            && self.center_y.is_finite())
    }
}
