use crate::display::canvas::FaceCanvas;
use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::Size,
    pixelcolor::{Rgb888, RgbColor},
    Pixel,
};

/// `DrawTarget` over a [`FaceCanvas`] that composites every pixel with a fixed alpha
pub struct EmbeddedGraphicsCanvas<'a> {
    canvas: &'a mut dyn FaceCanvas,
    alpha: u8,
}

impl<'a> EmbeddedGraphicsCanvas<'a> {
    pub fn new(canvas: &'a mut dyn FaceCanvas) -> Self {
        Self { canvas, alpha: 255 }
    }

    pub fn set_alpha(&mut self, alpha: u8) {
        self.alpha = alpha;
    }
}

impl<'a> DrawTarget for EmbeddedGraphicsCanvas<'a> {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = self.canvas.size();
        for Pixel(point, color) in pixels.into_iter() {
            if point.x < 0 || point.y < 0 || point.x >= width || point.y >= height {
                continue;
            }

            let rgb = [color.r(), color.g(), color.b()];
            if self.alpha == 255 {
                self.canvas
                    .set_pixel(point.x as usize, point.y as usize, rgb[0], rgb[1], rgb[2]);
            } else {
                self.canvas
                    .blend_pixel(point.x as usize, point.y as usize, rgb, self.alpha);
            }
        }
        Ok(())
    }

    fn clear(&mut self, _color: Self::Color) -> Result<(), Self::Error> {
        // Use black for clear
        self.canvas.fill(0, 0, 0);
        Ok(())
    }
}

impl<'a> embedded_graphics::prelude::OriginDimensions for EmbeddedGraphicsCanvas<'a> {
    fn size(&self) -> Size {
        let (width, height) = self.canvas.size();
        Size::new(width.max(0) as u32, height.max(0) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::canvas::FrameBuffer;
    use embedded_graphics::geometry::Point;

    #[test]
    fn opaque_pixels_replace_and_translucent_pixels_blend() {
        let mut buffer = FrameBuffer::new(3, 1);
        buffer.fill(0, 0, 0);
        {
            let mut target = EmbeddedGraphicsCanvas::new(&mut buffer);
            target
                .draw_iter([Pixel(Point::new(0, 0), Rgb888::new(255, 255, 255))])
                .unwrap();
            target.set_alpha(0);
            target
                .draw_iter([Pixel(Point::new(1, 0), Rgb888::new(255, 255, 255))])
                .unwrap();
            target
                .draw_iter([Pixel(Point::new(-1, 0), Rgb888::new(255, 255, 255))])
                .unwrap();
        }
        assert_eq!(buffer.pixel(0, 0), Some([255, 255, 255]));
        assert_eq!(buffer.pixel(1, 0), Some([0, 0, 0]));
        assert_eq!(buffer.pixel(2, 0), Some([0, 0, 0]));
    }
}
