mod analogue;
mod digital;

pub use analogue::{AnalogueFace, AnalogueStyles, HandAngles};
pub use digital::{format_time, DigitalFace};

use crate::display::surface::Surface;
use crate::models::clock::{FaceGeometry, FaceStyle, RenderMode};
use crate::palette::{PaletteColors, PaletteExtractor};
use chrono::NaiveTime;
use image::RgbImage;
use std::sync::Arc;

/// Stroke and shadow sizes are expressed against a 160 unit reference radius
pub(crate) const REFERENCE_RADIUS: f32 = 160.0;
pub(crate) const SHADOW_RADIUS_RATIO: f32 = 6.0 / REFERENCE_RADIUS;

pub(crate) const MUTED_OPACITY: u8 = 100;

/// Core contract every watch face style implements
pub trait DrawableFace: Send {
    /// Start deriving colors from the background. Never blocks; until extraction
    /// finishes the face renders with the default palette.
    fn init(&mut self, background: RgbImage);

    /// Issue the drawing commands for one frame. Degenerate geometry draws nothing
    /// and surface failures are logged, never returned.
    fn draw(
        &self,
        surface: &mut dyn Surface,
        time: &NaiveTime,
        geometry: FaceGeometry,
        mode: RenderMode,
    );

    fn style(&self) -> FaceStyle;

    /// Palette in effect for the next frame
    fn palette(&self) -> PaletteColors;

    /// Whether the background palette has been published yet
    fn palette_resolved(&self) -> bool;
}

/// Factory function to create the face for a style
pub fn create_face(
    style: FaceStyle,
    extractor: Arc<dyn PaletteExtractor>,
) -> Box<dyn DrawableFace> {
    match style {
        FaceStyle::Analogue => Box::new(AnalogueFace::new(extractor)),
        FaceStyle::Digital => Box::new(DigitalFace::new(extractor)),
    }
}
