use super::{Palette, PaletteExtractor};
use image::imageops::{self, FilterType};
use image::RgbImage;
use std::collections::HashMap;

const MAX_DIMENSION: u32 = 112;
const MAX_SWATCHES: usize = 16;
const QUANTIZE_SHIFT: u8 = 3;

const WEIGHT_SATURATION: f32 = 0.24;
const WEIGHT_LIGHTNESS: f32 = 0.52;
const WEIGHT_POPULATION: f32 = 0.24;

/// Representative color of a cluster of similar pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Swatch {
    pub rgb: [u8; 3],
    pub population: u32,
    /// Hue in degrees, saturation and lightness in 0..=1
    pub hsl: [f32; 3],
}

impl Swatch {
    pub fn new(rgb: [u8; 3], population: u32) -> Self {
        Self {
            rgb,
            population,
            hsl: rgb_to_hsl(rgb),
        }
    }

    pub fn saturation(&self) -> f32 {
        self.hsl[1]
    }

    pub fn lightness(&self) -> f32 {
        self.hsl[2]
    }
}

/// Saturation and lightness window a swatch must fall in to be picked for a role
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target {
    pub saturation: [f32; 3],
    pub lightness: [f32; 3],
}

impl Target {
    pub const LIGHT_VIBRANT: Target = Target {
        saturation: [0.35, 1.0, 1.0],
        lightness: [0.55, 0.74, 1.0],
    };
    pub const VIBRANT: Target = Target {
        saturation: [0.35, 1.0, 1.0],
        lightness: [0.3, 0.5, 0.7],
    };
    pub const DARK_VIBRANT: Target = Target {
        saturation: [0.35, 1.0, 1.0],
        lightness: [0.0, 0.26, 0.45],
    };
    pub const LIGHT_MUTED: Target = Target {
        saturation: [0.0, 0.3, 0.4],
        lightness: [0.55, 0.74, 1.0],
    };
    pub const MUTED: Target = Target {
        saturation: [0.0, 0.3, 0.4],
        lightness: [0.3, 0.5, 0.7],
    };
    pub const DARK_MUTED: Target = Target {
        saturation: [0.0, 0.3, 0.4],
        lightness: [0.0, 0.26, 0.45],
    };

    /// Evaluation order; a swatch taken by an earlier target is not reused
    pub const ALL: [Target; 6] = [
        Target::LIGHT_VIBRANT,
        Target::VIBRANT,
        Target::DARK_VIBRANT,
        Target::LIGHT_MUTED,
        Target::MUTED,
        Target::DARK_MUTED,
    ];

    fn accepts(&self, swatch: &Swatch) -> bool {
        let s = swatch.saturation();
        let l = swatch.lightness();
        s >= self.saturation[0]
            && s <= self.saturation[2]
            && l >= self.lightness[0]
            && l <= self.lightness[2]
    }

    fn score(&self, swatch: &Swatch, max_population: u32) -> f32 {
        let saturation = 1.0 - (swatch.saturation() - self.saturation[1]).abs();
        let lightness = 1.0 - (swatch.lightness() - self.lightness[1]).abs();
        let population = if max_population > 0 {
            swatch.population as f32 / max_population as f32
        } else {
            0.0
        };
        WEIGHT_SATURATION * saturation
            + WEIGHT_LIGHTNESS * lightness
            + WEIGHT_POPULATION * population
    }
}

/// Histogram based extractor: quantizes a thumbnail of the image into buckets,
/// keeps the most populated ones and scores them against each [`Target`].
#[derive(Clone, Debug, Default)]
pub struct SwatchExtractor;

impl SwatchExtractor {
    pub fn new() -> Self {
        Self
    }

    fn thumbnail(image: &RgbImage) -> RgbImage {
        let (width, height) = image.dimensions();
        let longest = width.max(height);
        if longest <= MAX_DIMENSION {
            return image.clone();
        }
        let scale = MAX_DIMENSION as f32 / longest as f32;
        let target_width = ((width as f32 * scale).round() as u32).max(1);
        let target_height = ((height as f32 * scale).round() as u32).max(1);
        imageops::resize(image, target_width, target_height, FilterType::Triangle)
    }

    fn quantize(image: &RgbImage) -> Vec<Swatch> {
        // bucket -> (sum r, sum g, sum b, count)
        let mut buckets: HashMap<[u8; 3], [u64; 4]> = HashMap::new();
        for pixel in image.pixels() {
            let rgb = pixel.0;
            let lightness = rgb_to_hsl(rgb)[2];
            if lightness <= 0.05 || lightness >= 0.95 {
                continue;
            }
            let key = [
                rgb[0] >> QUANTIZE_SHIFT,
                rgb[1] >> QUANTIZE_SHIFT,
                rgb[2] >> QUANTIZE_SHIFT,
            ];
            let entry = buckets.entry(key).or_insert([0; 4]);
            entry[0] += rgb[0] as u64;
            entry[1] += rgb[1] as u64;
            entry[2] += rgb[2] as u64;
            entry[3] += 1;
        }

        let mut swatches: Vec<Swatch> = buckets
            .values()
            .map(|[r, g, b, count]| {
                let mean = [
                    (*r / *count) as u8,
                    (*g / *count) as u8,
                    (*b / *count) as u8,
                ];
                Swatch::new(mean, *count as u32)
            })
            .collect();

        // Most populated first; ties broken by color for a stable result
        swatches.sort_by(|a, b| b.population.cmp(&a.population).then(a.rgb.cmp(&b.rgb)));
        swatches.truncate(MAX_SWATCHES);
        swatches
    }

    fn select(swatches: &[Swatch]) -> Vec<(Target, Swatch)> {
        let max_population = swatches.iter().map(|s| s.population).max().unwrap_or(0);
        let mut used = vec![false; swatches.len()];
        let mut selected = Vec::new();

        for target in Target::ALL {
            let best = swatches
                .iter()
                .enumerate()
                .filter(|(index, swatch)| !used[*index] && target.accepts(swatch))
                .map(|(index, swatch)| (index, target.score(swatch, max_population)))
                .fold(None, |best: Option<(usize, f32)>, candidate| match best {
                    Some(current) if current.1 >= candidate.1 => Some(current),
                    _ => Some(candidate),
                });

            if let Some((index, _)) = best {
                used[index] = true;
                selected.push((target, swatches[index]));
            }
        }

        selected
    }
}

impl PaletteExtractor for SwatchExtractor {
    fn generate(&self, image: &RgbImage) -> Result<Palette, String> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(format!("Cannot extract a palette from a {}x{} image", width, height));
        }

        let thumbnail = Self::thumbnail(image);
        let swatches = Self::quantize(&thumbnail);
        let selected = Self::select(&swatches);

        Ok(Palette { swatches, selected })
    }
}

pub(crate) fn rgb_to_hsl(rgb: [u8; 3]) -> [f32; 3] {
    let r = rgb[0] as f32 / 255.0;
    let g = rgb[1] as f32 / 255.0;
    let b = rgb[2] as f32 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let lightness = (max + min) / 2.0;

    if delta <= f32::EPSILON {
        return [0.0, 0.0, lightness];
    }

    let saturation = delta / (1.0 - (2.0 * lightness - 1.0).abs());
    let hue = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    [hue * 60.0, saturation.min(1.0), lightness]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const RED_ISH: [u8; 3] = [200, 30, 30];
    const PINK: [u8; 3] = [255, 150, 150];
    const DARK_GREEN_GREY: [u8; 3] = [40, 50, 45];

    fn banded_image(bands: &[[u8; 3]], band_width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(band_width * bands.len() as u32, height, |x, _| {
            Rgb(bands[(x / band_width) as usize])
        })
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn hsl_of_primaries_and_grey() {
        let red = rgb_to_hsl([255, 0, 0]);
        assert!(close(red[0], 0.0) && close(red[1], 1.0) && close(red[2], 0.5));

        let blue = rgb_to_hsl([0, 0, 255]);
        assert!(close(blue[0], 240.0));

        let grey = rgb_to_hsl([128, 128, 128]);
        assert!(close(grey[1], 0.0) && close(grey[2], 0.502));
    }

    #[test]
    fn picks_each_role_from_matching_band() {
        let image = banded_image(&[RED_ISH, PINK, DARK_GREEN_GREY], 20, 30);
        let palette = SwatchExtractor::new().generate(&image).unwrap();

        assert_eq!(palette.swatch(Target::VIBRANT).map(|s| s.rgb), Some(RED_ISH));
        assert_eq!(palette.swatch(Target::LIGHT_VIBRANT).map(|s| s.rgb), Some(PINK));
        assert_eq!(
            palette.swatch(Target::DARK_MUTED).map(|s| s.rgb),
            Some(DARK_GREEN_GREY)
        );
    }

    #[test]
    fn black_and_white_pixels_are_ignored() {
        let image = banded_image(&[[0, 0, 0], [255, 255, 255]], 10, 10);
        let palette = SwatchExtractor::new().generate(&image).unwrap();
        assert!(palette.swatches.is_empty());
        assert!(palette.selected.is_empty());
    }

    #[test]
    fn empty_image_is_an_error() {
        assert!(SwatchExtractor::new().generate(&RgbImage::new(0, 0)).is_err());
    }

    #[test]
    fn large_images_are_downsampled_before_quantizing() {
        let image = RgbImage::from_pixel(1000, 500, Rgb(RED_ISH));
        let palette = SwatchExtractor::new().generate(&image).unwrap();
        assert_eq!(palette.swatches.len(), 1);
        assert_eq!(palette.swatches[0].population, 112 * 56);
        assert_eq!(palette.swatches[0].rgb, RED_ISH);
    }

    #[test]
    fn swatch_is_used_for_one_role_only() {
        let image = RgbImage::from_pixel(8, 8, Rgb(RED_ISH));
        let palette = SwatchExtractor::new().generate(&image).unwrap();
        assert_eq!(palette.selected.len(), 1);
    }
}
