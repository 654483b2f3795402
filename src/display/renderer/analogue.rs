use super::{DrawableFace, MUTED_OPACITY, REFERENCE_RADIUS, SHADOW_RADIUS_RATIO};
use crate::display::surface::Surface;
use crate::models::clock::{FaceGeometry, FaceStyle, RenderMode};
use crate::models::style::{PaintStyle, Shadow, StrokeCap, StrokeStyle, OPAQUE, WHITE};
use crate::palette::{
    spawn_extraction, PaletteColors, PaletteExtractor, SharedPalette, SwatchExtractor,
};
use chrono::Timelike;
use chrono::NaiveTime;
use image::RgbImage;
use log::{debug, warn};
use std::f32::consts::PI;
use std::sync::Arc;

const HOUR_STROKE_WIDTH_RATIO: f32 = 5.0 / REFERENCE_RADIUS;
const MINUTE_STROKE_WIDTH_RATIO: f32 = 3.0 / REFERENCE_RADIUS;
const SECOND_TICK_STROKE_WIDTH_RATIO: f32 = 2.0 / REFERENCE_RADIUS;
const CENTER_GAP_AND_CIRCLE_RADIUS_RATIO: f32 = 4.0 / REFERENCE_RADIUS;

const HOUR_HAND_LENGTH_RATIO: f32 = 0.5;
const MINUTE_HAND_LENGTH_RATIO: f32 = 0.75;
const SECOND_HAND_LENGTH_RATIO: f32 = 0.875;
const INNER_TICK_RADIUS_RATIO: f32 = 0.9375;

const TICK_COUNT: usize = 12;
const MUTED_SECOND_OPACITY: u8 = 80;

/// Absolute hand rotations in degrees, clockwise from 12 o'clock
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandAngles {
    pub hours: f32,
    pub minutes: f32,
    pub seconds: f32,
}

impl HandAngles {
    pub fn from_time<T: Timelike>(time: &T) -> Self {
        // Leap seconds report more than 999ms; keep the hand inside the minute
        let millis = (time.nanosecond() / 1_000_000).min(999);
        let seconds = time.second() as f32 + millis as f32 / 1000.0;
        let minute = time.minute() as f32;
        let hour12 = (time.hour() % 12) as f32;

        Self {
            hours: hour12 * 30.0 + minute / 2.0,
            minutes: minute * 6.0,
            seconds: seconds * 6.0,
        }
    }
}

/// Paints for every element of the analogue face, resolved for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnalogueStyles {
    pub hour: StrokeStyle,
    pub minute: StrokeStyle,
    pub second: StrokeStyle,
    pub tick: StrokeStyle,
}

impl AnalogueStyles {
    pub fn resolve(palette: &PaletteColors, mode: RenderMode, radius: f32) -> Self {
        let hand = StrokeStyle::default().with_cap(StrokeCap::Round);
        let mut styles = Self {
            hour: hand.with_width(HOUR_STROKE_WIDTH_RATIO * radius),
            minute: hand.with_width(MINUTE_STROKE_WIDTH_RATIO * radius),
            second: hand.with_width(SECOND_TICK_STROKE_WIDTH_RATIO * radius),
            tick: StrokeStyle::default()
                .with_paint(PaintStyle::Stroke)
                .with_width(SECOND_TICK_STROKE_WIDTH_RATIO * radius),
        };

        if mode.ambient {
            for style in styles.all_mut() {
                *style = style
                    .with_color(WHITE)
                    .with_anti_alias(false)
                    .with_shadow(None);
            }
        } else {
            let shadow = Some(Shadow {
                radius: SHADOW_RADIUS_RATIO * radius,
                color: palette.shadow,
            });
            styles.hour = styles.hour.with_color(palette.base);
            styles.minute = styles.minute.with_color(palette.base);
            styles.second = styles.second.with_color(palette.accent);
            styles.tick = styles.tick.with_color(palette.base);
            for style in styles.all_mut() {
                *style = style.with_anti_alias(true).with_shadow(shadow);
            }
        }

        let (hand_opacity, second_opacity) = if mode.mute {
            (MUTED_OPACITY, MUTED_SECOND_OPACITY)
        } else {
            (OPAQUE, OPAQUE)
        };
        styles.hour = styles.hour.with_opacity(hand_opacity);
        styles.minute = styles.minute.with_opacity(hand_opacity);
        styles.second = styles.second.with_opacity(second_opacity);

        styles
    }

    fn all_mut(&mut self) -> [&mut StrokeStyle; 4] {
        [
            &mut self.hour,
            &mut self.minute,
            &mut self.second,
            &mut self.tick,
        ]
    }
}

/// Classic face: twelve ticks, hour and minute hands, and a second hand while interactive
pub struct AnalogueFace {
    extractor: Arc<dyn PaletteExtractor>,
    palette: SharedPalette,
}

impl Default for AnalogueFace {
    fn default() -> Self {
        Self::new(Arc::new(SwatchExtractor::new()))
    }
}

impl AnalogueFace {
    pub fn new(extractor: Arc<dyn PaletteExtractor>) -> Self {
        Self {
            extractor,
            palette: SharedPalette::new(),
        }
    }

    fn render(
        &self,
        surface: &mut dyn Surface,
        time: &NaiveTime,
        geometry: FaceGeometry,
        mode: RenderMode,
    ) -> Result<(), String> {
        let FaceGeometry {
            center_x,
            center_y,
            radius,
        } = geometry;
        let styles = AnalogueStyles::resolve(&self.palette.snapshot(), mode, radius);

        let inner_tick_radius = radius * INNER_TICK_RADIUS_RATIO;
        for tick_index in 0..TICK_COUNT {
            let tick_rotation = tick_index as f32 * PI * 2.0 / TICK_COUNT as f32;
            let (sin, cos) = tick_rotation.sin_cos();
            surface.draw_line(
                center_x + sin * inner_tick_radius,
                center_y - cos * inner_tick_radius,
                center_x + sin * radius,
                center_y - cos * radius,
                &styles.tick,
            )?;
        }

        let angles = HandAngles::from_time(time);
        let center_gap = CENTER_GAP_AND_CIRCLE_RADIUS_RATIO * radius;

        surface.save();
        let hands = self.draw_hands(surface, &angles, &styles, geometry, center_gap, mode);
        let restored = surface.restore();
        hands.and(restored)
    }

    fn draw_hands(
        &self,
        surface: &mut dyn Surface,
        angles: &HandAngles,
        styles: &AnalogueStyles,
        geometry: FaceGeometry,
        center_gap: f32,
        mode: RenderMode,
    ) -> Result<(), String> {
        let FaceGeometry {
            center_x,
            center_y,
            radius,
        } = geometry;
        let hand_start = center_y - center_gap;

        surface.rotate(angles.hours, center_x, center_y);
        surface.draw_line(
            center_x,
            hand_start,
            center_x,
            center_y - radius * HOUR_HAND_LENGTH_RATIO,
            &styles.hour,
        )?;

        surface.rotate(angles.minutes - angles.hours, center_x, center_y);
        surface.draw_line(
            center_x,
            hand_start,
            center_x,
            center_y - radius * MINUTE_HAND_LENGTH_RATIO,
            &styles.minute,
        )?;

        // Ambient frames are refreshed once a minute, so there is no second hand
        if !mode.ambient {
            surface.rotate(angles.seconds - angles.minutes, center_x, center_y);
            surface.draw_line(
                center_x,
                hand_start,
                center_x,
                center_y - radius * SECOND_HAND_LENGTH_RATIO,
                &styles.second,
            )?;
        }

        surface.draw_circle(center_x, center_y, center_gap, &styles.tick)
    }
}

impl DrawableFace for AnalogueFace {
    fn init(&mut self, background: RgbImage) {
        debug!(
            "Analogue face: extracting palette from {}x{} background",
            background.width(),
            background.height()
        );
        self.palette = spawn_extraction(background, self.extractor.clone(), "analogue");
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
        if let Err(e) = self.render(surface, time, geometry, mode) {
            warn!("Analogue face: frame at {} not fully drawn: {}", time, e);
        }
    }

    fn style(&self) -> FaceStyle {
        FaceStyle::Analogue
    }

    fn palette(&self) -> PaletteColors {
        self.palette.snapshot()
    }

    fn palette_resolved(&self) -> bool {
        self.palette.is_resolved()
    }
}
