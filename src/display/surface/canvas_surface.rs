use super::Surface;
use crate::display::canvas::FaceCanvas;
use crate::display::graphics::embedded_graphics_support::EmbeddedGraphicsCanvas;
use crate::models::style::{PaintStyle, StrokeCap, StrokeStyle};
use embedded_graphics::geometry::{OriginDimensions, Point};
use embedded_graphics::mono_font::ascii::{
    FONT_10X20, FONT_4X6, FONT_5X8, FONT_6X10, FONT_7X14, FONT_7X14_BOLD, FONT_8X13,
    FONT_8X13_BOLD, FONT_9X15, FONT_9X15_BOLD, FONT_9X18, FONT_9X18_BOLD,
};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::primitives::{
    Circle, Line, Primitive, PrimitiveStyle, PrimitiveStyleBuilder,
};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use embedded_graphics::Drawable;

// embedded-graphics squares `2 * width * length` of a thick line in i32
const THICK_LINE_BUDGET: f32 = 46_000.0;

// Circle math in embedded-graphics squares doubled coordinates in i32
const MAX_CIRCLE_DIAMETER: u32 = 16_384;

/// 2x3 affine transform: x' = a*x + c*y + e, y' = b*x + d*y + f
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Transform {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Transform {
    pub(crate) const IDENTITY: Transform = Transform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Clockwise rotation on a y-down surface about a pivot
    pub(crate) fn rotation(degrees: f32, px: f32, py: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: px - cos * px + sin * py,
            f: py - sin * px - cos * py,
        }
    }

    /// `self` applied after `inner`
    pub(crate) fn concat(&self, inner: &Transform) -> Self {
        Self {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            e: self.a * inner.e + self.c * inner.f + self.e,
            f: self.b * inner.e + self.d * inner.f + self.f,
        }
    }

    pub(crate) fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

/// Rasterizes surface commands onto a [`FaceCanvas`] using embedded-graphics.
///
/// Anti-aliasing is not available on this path; the flag is ignored. Shadows are
/// approximated by a wider half-opacity stroke underneath the element.
pub struct CanvasSurface<'a> {
    target: EmbeddedGraphicsCanvas<'a>,
    transform: Transform,
    stack: Vec<Transform>,
}

impl<'a> CanvasSurface<'a> {
    pub fn new(canvas: &'a mut dyn FaceCanvas) -> Self {
        Self {
            target: EmbeddedGraphicsCanvas::new(canvas),
            transform: Transform::IDENTITY,
            stack: Vec::new(),
        }
    }

    fn to_screen(&self, x: f32, y: f32) -> Result<(f32, f32), String> {
        let (tx, ty) = self.transform.apply(x, y);
        if !tx.is_finite() || !ty.is_finite() {
            return Err(format!("non-finite coordinate ({}, {})", x, y));
        }
        Ok((tx, ty))
    }

    fn canvas_size(&self) -> (f32, f32) {
        let size = self.target.size();
        (size.width as f32, size.height as f32)
    }

    /// Whether a point lies within `margin` pixels of the canvas
    fn near_canvas(&self, (x, y): (f32, f32), margin: f32) -> bool {
        let (width, height) = self.canvas_size();
        x >= -margin && y >= -margin && x <= width + margin && y <= height + margin
    }

    /// Draws the visible part of a thick line in pieces short enough for
    /// embedded-graphics to rasterize without overflowing.
    fn stroke_line(
        &mut self,
        start: (f32, f32),
        end: (f32, f32),
        color: [u8; 3],
        width: u32,
        cap: StrokeCap,
        alpha: u8,
    ) -> Result<(), String> {
        let max_length = THICK_LINE_BUDGET / (2.0 * width as f32) - 2.0;
        if max_length < 1.0 {
            return Err(format!("stroke width {} is too wide to rasterize", width));
        }

        let margin = width as f32 + 1.0;
        let (canvas_width, canvas_height) = self.canvas_size();
        let Some((t0, t1)) = clip_segment(
            start,
            end,
            (-margin, -margin),
            (canvas_width + margin, canvas_height + margin),
        ) else {
            return Ok(());
        };

        let (dx, dy) = (end.0 - start.0, end.1 - start.1);
        let at = |t: f32| {
            Point::new(
                (start.0 + t * dx).round() as i32,
                (start.1 + t * dy).round() as i32,
            )
        };
        let visible_length = (t1 - t0) * (dx * dx + dy * dy).sqrt();
        let pieces = ((visible_length / max_length).ceil() as u32).max(1);

        let color = Rgb888::new(color[0], color[1], color[2]);
        let stroke = PrimitiveStyle::with_stroke(color, width);
        self.target.set_alpha(alpha);

        let mut from = at(t0);
        for piece in 1..=pieces {
            let to = at(t0 + (t1 - t0) * piece as f32 / pieces as f32);
            let delta = to - from;
            let length_squared = i64::from(delta.x).pow(2) + i64::from(delta.y).pow(2);
            if (2 * i64::from(width)).pow(2) * length_squared > i64::from(i32::MAX) {
                return Err(format!("line {:?}..{:?} too long to rasterize", from, to));
            }
            Line::new(from, to)
                .into_styled(stroke)
                .draw(&mut self.target)
                .map_err(|e| format!("{:?}", e))?;
            from = to;
        }

        // Clipped-away ends lie too far outside the canvas for their cap to show
        if cap == StrokeCap::Round && width > 1 {
            let fill = PrimitiveStyle::with_fill(color);
            for (t, kept) in [(0.0, t0 <= 0.0), (1.0, t1 >= 1.0)] {
                if kept {
                    Circle::with_center(at(t), width)
                        .into_styled(fill)
                        .draw(&mut self.target)
                        .map_err(|e| format!("{:?}", e))?;
                }
            }
        }
        Ok(())
    }

    fn circle(
        &mut self,
        center: (f32, f32),
        diameter: u32,
        color: [u8; 3],
        width: u32,
        paint: PaintStyle,
        alpha: u8,
    ) -> Result<(), String> {
        let outer = match paint {
            PaintStyle::Stroke => diameter.saturating_add(width),
            PaintStyle::Fill => diameter,
        };
        if !self.near_canvas(center, outer as f32 / 2.0 + 1.0) {
            return Ok(());
        }
        if outer > MAX_CIRCLE_DIAMETER {
            return Err(format!("circle of diameter {} is too large to rasterize", outer));
        }
        let center = Point::new(center.0.round() as i32, center.1.round() as i32);

        let color = Rgb888::new(color[0], color[1], color[2]);
        let style = match paint {
            PaintStyle::Stroke => PrimitiveStyleBuilder::new()
                .stroke_color(color)
                .stroke_width(width)
                .build(),
            PaintStyle::Fill => PrimitiveStyle::with_fill(color),
        };
        self.target.set_alpha(alpha);
        Circle::with_center(center, diameter)
            .into_styled(style)
            .draw(&mut self.target)
            .map_err(|e| format!("{:?}", e))?;
        Ok(())
    }
}

fn stroke_width(width: f32) -> u32 {
    (width.round() as u32).max(1)
}

/// Liang-Barsky clip of `start..end` against the box `min..max`.
/// Returns the visible parameter range, or `None` when nothing is inside.
fn clip_segment(
    start: (f32, f32),
    end: (f32, f32),
    min: (f32, f32),
    max: (f32, f32),
) -> Option<(f32, f32)> {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;
    for (p, q) in [
        (-dx, start.0 - min.0),
        (dx, max.0 - start.0),
        (-dy, start.1 - min.1),
        (dy, max.1 - start.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

/// Tallest mono font whose glyphs fit in `text_size` pixels
fn select_font(text_size: f32, bold: bool) -> &'static MonoFont<'static> {
    let pick = |regular: &'static MonoFont<'static>, bold_font: &'static MonoFont<'static>| {
        if bold {
            bold_font
        } else {
            regular
        }
    };
    let size = if text_size.is_finite() {
        text_size.max(0.0) as u32
    } else {
        0
    };

    match size {
        20.. => &FONT_10X20,
        18..=19 => pick(&FONT_9X18, &FONT_9X18_BOLD),
        15..=17 => pick(&FONT_9X15, &FONT_9X15_BOLD),
        14 => pick(&FONT_7X14, &FONT_7X14_BOLD),
        13 => pick(&FONT_8X13, &FONT_8X13_BOLD),
        10..=12 => &FONT_6X10,
        8..=9 => &FONT_5X8,
        _ => &FONT_4X6,
    }
}

impl<'a> Surface for CanvasSurface<'a> {
    fn save(&mut self) {
        self.stack.push(self.transform);
    }

    fn restore(&mut self) -> Result<(), String> {
        match self.stack.pop() {
            Some(transform) => {
                self.transform = transform;
                Ok(())
            }
            None => Err("restore called without a matching save".to_string()),
        }
    }

    fn rotate(&mut self, degrees: f32, px: f32, py: f32) {
        self.transform = self
            .transform
            .concat(&Transform::rotation(degrees, px, py));
    }

    fn draw_line(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        style: &StrokeStyle,
    ) -> Result<(), String> {
        let start = self.to_screen(x1, y1)?;
        let end = self.to_screen(x2, y2)?;
        let width = stroke_width(style.width);

        if let Some(shadow) = style.shadow {
            let shadow_width = stroke_width(style.width + shadow.radius);
            self.stroke_line(
                start,
                end,
                shadow.color,
                shadow_width,
                style.cap,
                style.opacity / 2,
            )?;
        }
        self.stroke_line(start, end, style.color, width, style.cap, style.opacity)
    }

    fn draw_circle(
        &mut self,
        cx: f32,
        cy: f32,
        radius: f32,
        style: &StrokeStyle,
    ) -> Result<(), String> {
        let center = self.to_screen(cx, cy)?;
        if !(radius.is_finite() && radius > 0.0) {
            return Ok(());
        }
        let diameter = ((radius * 2.0).round() as u32).max(1);
        let width = stroke_width(style.width);

        if let Some(shadow) = style.shadow {
            let shadow_width = stroke_width(style.width + shadow.radius);
            self.circle(
                center,
                diameter,
                shadow.color,
                shadow_width,
                style.paint,
                style.opacity / 2,
            )?;
        }
        self.circle(center, diameter, style.color, width, style.paint, style.opacity)
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        style: &StrokeStyle,
    ) -> Result<(), String> {
        let anchor = self.to_screen(x, y)?;
        let font = select_font(style.text_size, style.bold);
        let glyph = font.character_size;
        let extent = (text.chars().count() as u32 * glyph.width + 2 * glyph.height) as f32;
        if !self.near_canvas(anchor, extent) {
            return Ok(());
        }
        let position = Point::new(anchor.0.round() as i32, anchor.1.round() as i32);
        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Alphabetic)
            .build();

        if let Some(shadow) = style.shadow {
            let offset = (shadow.radius / 2.0)
                .round()
                .clamp(1.0, glyph.height as f32) as i32;
            let character_style = MonoTextStyle::new(
                font,
                Rgb888::new(shadow.color[0], shadow.color[1], shadow.color[2]),
            );
            self.target.set_alpha(style.opacity / 2);
            let corners = [
                (-offset, -offset),
                (offset, -offset),
                (-offset, offset),
                (offset, offset),
            ];
            for (dx, dy) in corners {
                let shifted = position + Point::new(dx, dy);
                Text::with_text_style(text, shifted, character_style, text_style)
                    .draw(&mut self.target)
                    .map_err(|e| format!("{:?}", e))?;
            }
        }

        let character_style = MonoTextStyle::new(
            font,
            Rgb888::new(style.color[0], style.color[1], style.color[2]),
        );
        self.target.set_alpha(style.opacity);
        Text::with_text_style(text, position, character_style, text_style)
            .draw(&mut self.target)
            .map_err(|e| format!("{:?}", e))?;
        Ok(())
    }
}
