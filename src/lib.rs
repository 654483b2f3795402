//! Analogue and digital watch face rendering.
//!
//! Faces implement [`DrawableFace`] and issue their drawing commands against a
//! [`Surface`]. Colors come from the background image through a
//! [`PaletteExtractor`] that runs off the render path.

pub mod config;
pub mod display;
pub mod models;
pub mod palette;

pub use display::renderer::{create_face, AnalogueFace, DigitalFace, DrawableFace};
pub use display::surface::{CanvasSurface, DrawCommand, RecordingSurface, Surface};
pub use models::clock::{FaceGeometry, FaceStyle, RenderMode};
pub use palette::{PaletteColors, PaletteExtractor, SharedPalette, SwatchExtractor};
