use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use std::fmt::Debug;
use std::path::Path;

/// Pixel target faces are rasterized onto
pub trait FaceCanvas: Debug + Send {
    fn set_pixel(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8);

    /// Composite `color` over the current pixel with the given 8-bit alpha
    fn blend_pixel(&mut self, x: usize, y: usize, color: [u8; 3], alpha: u8);

    fn fill(&mut self, r: u8, g: u8, b: u8);
    fn size(&self) -> (i32, i32); // (width, height)
}

/// In-memory canvas backed by an RGB image
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    image: RgbImage,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::new(width, height),
        }
    }

    /// Start from the background scaled to cover the whole buffer
    pub fn with_background(background: &RgbImage, width: u32, height: u32) -> Self {
        let (bg_width, bg_height) = background.dimensions();
        if bg_width == 0 || bg_height == 0 {
            return Self::new(width, height);
        }

        let scale = (width as f32 / bg_width as f32).max(height as f32 / bg_height as f32);
        let scaled_width = ((bg_width as f32 * scale).ceil() as u32).max(width);
        let scaled_height = ((bg_height as f32 * scale).ceil() as u32).max(height);
        let scaled = imageops::resize(
            background,
            scaled_width,
            scaled_height,
            FilterType::Triangle,
        );

        let offset_x = (scaled_width - width) / 2;
        let offset_y = (scaled_height - height) / 2;
        let image = imageops::crop_imm(&scaled, offset_x, offset_y, width, height).to_image();
        Self { image }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x < self.image.width() && y < self.image.height() {
            Some(self.image.get_pixel(x, y).0)
        } else {
            None
        }
    }

    pub fn save_png(&self, path: &Path) -> Result<(), String> {
        self.image
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))
    }

    fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.image.width() as usize && y < self.image.height() as usize
    }
}

impl FaceCanvas for FrameBuffer {
    fn set_pixel(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8) {
        if self.in_bounds(x, y) {
            self.image.put_pixel(x as u32, y as u32, Rgb([r, g, b]));
        }
    }

    fn blend_pixel(&mut self, x: usize, y: usize, color: [u8; 3], alpha: u8) {
        if !self.in_bounds(x, y) {
            return;
        }
        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        let alpha = alpha as u32;
        for channel in 0..3 {
            let src = color[channel] as u32;
            let dst = pixel.0[channel] as u32;
            pixel.0[channel] = ((src * alpha + dst * (255 - alpha) + 127) / 255) as u8;
        }
    }

    fn fill(&mut self, r: u8, g: u8, b: u8) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgb([r, g, b]);
        }
    }

    fn size(&self) -> (i32, i32) {
        (self.image.width() as i32, self.image.height() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut buffer = FrameBuffer::new(4, 4);
        buffer.set_pixel(10, 1, 255, 255, 255);
        buffer.blend_pixel(1, 10, [255, 255, 255], 255);
        assert!(buffer.image().pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn blending_respects_alpha() {
        let mut buffer = FrameBuffer::new(2, 1);
        buffer.fill(100, 100, 100);

        buffer.blend_pixel(0, 0, [200, 0, 255], 0);
        assert_eq!(buffer.pixel(0, 0), Some([100, 100, 100]));

        buffer.blend_pixel(1, 0, [200, 0, 255], 255);
        assert_eq!(buffer.pixel(1, 0), Some([200, 0, 255]));

        buffer.blend_pixel(0, 0, [200, 0, 255], 128);
        assert_eq!(buffer.pixel(0, 0), Some([150, 50, 178]));
    }

    #[test]
    fn background_covers_and_centers() {
        let background = RgbImage::from_fn(20, 10, |x, _| {
            if x < 10 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let buffer = FrameBuffer::with_background(&background, 10, 10);
        assert_eq!(buffer.size(), (10, 10));
        assert_eq!(buffer.pixel(0, 5), Some([255, 0, 0]));
        assert_eq!(buffer.pixel(9, 5), Some([0, 0, 255]));
    }

    #[test]
    fn empty_background_gives_black_buffer() {
        let buffer = FrameBuffer::with_background(&RgbImage::new(0, 0), 3, 3);
        assert_eq!(buffer.size(), (3, 3));
        assert_eq!(buffer.pixel(2, 2), Some([0, 0, 0]));
    }
}
