use super::{DrawableFace, MUTED_OPACITY, SHADOW_RADIUS_RATIO};
use crate::display::surface::Surface;
use crate::models::clock::{FaceGeometry, FaceStyle, RenderMode};
use crate::models::style::{Shadow, StrokeStyle, OPAQUE};
use crate::palette::{
    spawn_extraction, PaletteColors, PaletteExtractor, SharedPalette, SwatchExtractor,
};
use chrono::NaiveTime;
use image::RgbImage;
use log::{debug, warn};
use std::sync::Arc;

const TEXT_SIZE_RATIO: f32 = 0.3;
/// Baseline sits a quarter of the text size below center to balance the cap height
const BASELINE_OFFSET_RATIO: f32 = TEXT_SIZE_RATIO * 0.25;

/// 24-hour, zero padded, no AM/PM
pub fn format_time(time: &NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// Time as centered text
pub struct DigitalFace {
    extractor: Arc<dyn PaletteExtractor>,
    palette: SharedPalette,
}

impl Default for DigitalFace {
    fn default() -> Self {
        Self::new(Arc::new(SwatchExtractor::new()))
    }
}

impl DigitalFace {
    pub fn new(extractor: Arc<dyn PaletteExtractor>) -> Self {
        Self {
            extractor,
            palette: SharedPalette::new(),
        }
    }

    pub fn resolve_style(palette: &PaletteColors, mode: RenderMode, radius: f32) -> StrokeStyle {
        let shadow = if mode.ambient {
            None
        } else {
            Some(Shadow {
                radius: SHADOW_RADIUS_RATIO * radius,
                color: palette.shadow,
            })
        };

        StrokeStyle::default()
            .with_color(palette.accent)
            .with_anti_alias(true)
            .with_bold(true)
            .with_text_size(TEXT_SIZE_RATIO * radius)
            .with_shadow(shadow)
            .with_opacity(if mode.mute { MUTED_OPACITY } else { OPAQUE })
    }
}

impl DrawableFace for DigitalFace {
    fn init(&mut self, background: RgbImage) {
        debug!(
            "Digital face: extracting palette from {}x{} background",
            background.width(),
            background.height()
        );
        self.palette = spawn_extraction(background, self.extractor.clone(), "digital");
    }

    fn draw(
        &self,
        surface: &mut dyn Surface,
        time: &NaiveTime,
        geometry: FaceGeometry,
        mode: RenderMode,
    ) {
        if geometry.is_degenerate() {
            return;
        }

        let style = Self::resolve_style(&self.palette.snapshot(), mode, geometry.radius);
        let text = format_time(time);
        let baseline = geometry.center_y + BASELINE_OFFSET_RATIO * geometry.radius;

        if let Err(e) = surface.draw_text(&text, geometry.center_x, baseline, &style) {
            warn!("Digital face: failed to draw {}: {}", text, e);
        }
    }

    fn style(&self) -> FaceStyle {
        FaceStyle::Digital
    }

    fn palette(&self) -> PaletteColors {
        self.palette.snapshot()
    }

    fn palette_resolved(&self) -> bool {
        self.palette.is_resolved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::canvas::FrameBuffer;
    use crate::display::surface::{CanvasSurface, DrawCommand, RecordingSurface};
    use crate::models::style::RED;
    use crate::palette::tests::{palette_of, FixedExtractor};
    use std::time::Duration;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn record(
        face: &DigitalFace,
        time: NaiveTime,
        geometry: FaceGeometry,
        mode: RenderMode,
    ) -> Vec<DrawCommand> {
        let mut surface = RecordingSurface::new();
        face.draw(&mut surface, &time, geometry, mode);
        surface.into_commands()
    }

    #[test]
    fn formats_twenty_four_hour_zero_padded() {
        assert_eq!(format_time(&NaiveTime::from_hms_opt(13, 5, 9).unwrap()), "13:05:09");
        assert_eq!(format_time(&NaiveTime::from_hms_opt(0, 0, 0).unwrap()), "00:00:00");
        assert_eq!(format_time(&NaiveTime::from_hms_opt(23, 59, 1).unwrap()), "23:59:01");
    }

    #[test]
    fn text_is_centered_below_middle() {
        let face = DigitalFace::default();
        let commands = record(
            &face,
            NaiveTime::from_hms_opt(13, 5, 9).unwrap(),
            FaceGeometry::new(120.0, 100.0, 100.0),
            RenderMode::interactive(),
        );

        assert_eq!(commands.len(), 1);
        match &commands[0] {
            DrawCommand::Text { text, x, y, style } => {
                assert_eq!(text, "13:05:09");
                assert!(close(*x, 120.0));
                assert!(close(*y, 107.5));
                assert!(close(style.text_size, 30.0));
                assert_eq!(style.color, RED);
                assert!(style.bold);
            }
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn ambient_removes_shadow_and_mute_dims() {
        let palette = PaletteColors::default();

        let interactive = DigitalFace::resolve_style(&palette, RenderMode::interactive(), 160.0);
        let shadow = interactive.shadow.unwrap();
        assert!(close(shadow.radius, 6.0));
        assert_eq!(shadow.color, palette.shadow);
        assert_eq!(interactive.opacity, OPAQUE);

        let ambient = DigitalFace::resolve_style(&palette, RenderMode::new(true, false), 160.0);
        assert!(ambient.shadow.is_none());

        let muted = DigitalFace::resolve_style(&palette, RenderMode::new(true, true), 160.0);
        assert_eq!(muted.opacity, 100);
        assert!(muted.shadow.is_none());
    }

    #[test]
    fn degenerate_radius_draws_nothing() {
        let face = DigitalFace::default();
        let time = NaiveTime::from_hms_opt(1, 1, 1).unwrap();
        let geometry = FaceGeometry::new(0.0, 0.0, 0.0);
        assert!(record(&face, time, geometry, RenderMode::interactive()).is_empty());
    }

    #[test]
    fn extracted_accent_colors_the_digits() {
        let palette = palette_of([30, 90, 220], [240, 240, 120], [20, 30, 20]);
        let mut face = DigitalFace::new(Arc::new(FixedExtractor(Ok(palette))));
        face.init(RgbImage::new(4, 4));
        assert!(face.palette.wait_for(Duration::from_secs(5)));

        let commands = record(
            &face,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            FaceGeometry::new(50.0, 50.0, 50.0),
            RenderMode::interactive(),
        );
        let style = commands[0].style().unwrap();
        assert_eq!(style.color, [30, 90, 220]);
        assert_eq!(style.shadow.map(|s| s.color), Some([20, 30, 20]));
    }

    #[test]
    fn identical_inputs_give_identical_frames() {
        let face = DigitalFace::default();
        let time = NaiveTime::from_hms_opt(4, 4, 4).unwrap();
        let geometry = FaceGeometry::new(64.0, 64.0, 64.0);
        let mode = RenderMode::new(false, true);
        assert_eq!(record(&face, time, geometry, mode), record(&face, time, geometry, mode));
    }

    #[test]
    fn rasterized_digits_light_up_pixels() {
        let mut buffer = FrameBuffer::new(200, 200);
        {
            let mut surface = CanvasSurface::new(&mut buffer);
            DigitalFace::default().draw(
                &mut surface,
                &NaiveTime::from_hms_opt(10, 10, 10).unwrap(),
                FaceGeometry::inscribed(200, 200),
                RenderMode::new(true, false),
            );
        }
        assert!(buffer.image().pixels().any(|p| p.0 == RED));
    }

    #[test]
    fn oversized_faces_rasterize_without_panicking() {
        let face = DigitalFace::default();
        for radius in [1_000.0, 1.0e6, 1.0e9] {
            let mut buffer = FrameBuffer::new(64, 64);
            let mut surface = CanvasSurface::new(&mut buffer);
            let geometry = FaceGeometry::new(32.0, 32.0, radius);
            let time = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
            let mode = RenderMode::interactive();
            face.draw(&mut surface, &time, geometry, mode);
        }
    }
}
