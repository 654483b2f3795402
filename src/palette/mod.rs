//! Background color extraction and the palette snapshot shared with renderers

mod extractor;

pub use extractor::{Swatch, SwatchExtractor, Target};

use crate::models::style::{BLACK, RED, WHITE};
use image::RgbImage;
use log::{debug, warn};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::thread;
#[cfg(test)]
use std::time::{Duration, Instant};

/// The three colors a face is styled with
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaletteColors {
    /// Highlight color: second hand, digits
    pub accent: [u8; 3],
    /// Main color: hour and minute hands, ticks
    pub base: [u8; 3],
    pub shadow: [u8; 3],
}

impl Default for PaletteColors {
    fn default() -> Self {
        Self {
            accent: RED,
            base: WHITE,
            shadow: BLACK,
        }
    }
}

impl PaletteColors {
    /// Pick colors from an extracted palette, falling back per color to the defaults
    pub fn from_palette(palette: &Palette) -> Self {
        let defaults = Self::default();
        Self {
            accent: palette
                .swatch(Target::VIBRANT)
                .map(|swatch| swatch.rgb)
                .unwrap_or(defaults.accent),
            base: palette
                .swatch(Target::LIGHT_VIBRANT)
                .map(|swatch| swatch.rgb)
                .unwrap_or(defaults.base),
            shadow: palette
                .swatch(Target::DARK_MUTED)
                .map(|swatch| swatch.rgb)
                .unwrap_or(defaults.shadow),
        }
    }
}

/// Result of running an extractor over an image
#[derive(Clone, Debug, Default)]
pub struct Palette {
    pub swatches: Vec<Swatch>,
    pub selected: Vec<(Target, Swatch)>,
}

impl Palette {
    pub fn swatch(&self, target: Target) -> Option<&Swatch> {
        self.selected
            .iter()
            .find(|(selected_target, _)| *selected_target == target)
            .map(|(_, swatch)| swatch)
    }
}

/// Derives a palette from a decoded background image
pub trait PaletteExtractor: Send + Sync {
    fn generate(&self, image: &RgbImage) -> Result<Palette, String>;
}

/// Palette snapshot published once by the extraction thread and read by every frame.
///
/// Readers never block: until extraction completes they see the defaults, afterwards
/// they see the whole published triple.
#[derive(Clone, Debug, Default)]
pub struct SharedPalette {
    cell: Arc<OnceCell<PaletteColors>>,
}

impl SharedPalette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> PaletteColors {
        self.cell.get().copied().unwrap_or_default()
    }

    /// Returns false if a palette was already published
    pub fn publish(&self, colors: PaletteColors) -> bool {
        self.cell.set(colors).is_ok()
    }

    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Poll until the palette is published or the timeout passes
    #[cfg(test)]
    pub(crate) fn wait_for(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.is_resolved() {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
        true
    }
}

/// Run the extractor on its own thread and return the palette it will publish into
pub fn spawn_extraction(
    image: RgbImage,
    extractor: Arc<dyn PaletteExtractor>,
    owner: &str,
) -> SharedPalette {
    let shared = SharedPalette::new();
    let target = shared.clone();
    let thread_owner = owner.to_string();

    let spawned = thread::Builder::new()
        .name(format!("{}-palette", owner))
        .spawn(move || match extractor.generate(&image) {
            Ok(palette) => {
                let colors = PaletteColors::from_palette(&palette);
                debug!(
                    "{}: extracted palette accent={:?} base={:?} shadow={:?} from {} swatches",
                    thread_owner,
                    colors.accent,
                    colors.base,
                    colors.shadow,
                    palette.swatches.len()
                );
                target.publish(colors);
            }
            Err(e) => {
                warn!(
                    "{}: palette extraction failed, keeping default colors: {}",
                    thread_owner, e
                );
            }
        });

    if let Err(e) = spawned {
        warn!(
            "{}: could not start palette extraction, keeping default colors: {}",
            owner, e
        );
    }

    shared
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::mpsc::{channel, Receiver, Sender};
    use std::sync::Mutex;

    /// Extractor that returns a fixed result
    pub struct FixedExtractor(pub Result<Palette, String>);

    impl PaletteExtractor for FixedExtractor {
        fn generate(&self, _image: &RgbImage) -> Result<Palette, String> {
            self.0.clone()
        }
    }

    /// Extractor that blocks until the test releases it
    pub struct GatedExtractor {
        gate: Mutex<Receiver<()>>,
        palette: Palette,
    }

    impl GatedExtractor {
        pub fn new(palette: Palette) -> (Self, Sender<()>) {
            let (sender, receiver) = channel();
            (
                Self {
                    gate: Mutex::new(receiver),
                    palette,
                },
                sender,
            )
        }
    }

    impl PaletteExtractor for GatedExtractor {
        fn generate(&self, _image: &RgbImage) -> Result<Palette, String> {
            let gate = self.gate.lock().map_err(|e| e.to_string())?;
            gate.recv().map_err(|e| e.to_string())?;
            Ok(self.palette.clone())
        }
    }

    pub fn palette_of(vibrant: [u8; 3], light_vibrant: [u8; 3], dark_muted: [u8; 3]) -> Palette {
        let swatch = |rgb| Swatch::new(rgb, 10);
        Palette {
            swatches: vec![swatch(vibrant), swatch(light_vibrant), swatch(dark_muted)],
            selected: vec![
                (Target::VIBRANT, swatch(vibrant)),
                (Target::LIGHT_VIBRANT, swatch(light_vibrant)),
                (Target::DARK_MUTED, swatch(dark_muted)),
            ],
        }
    }

    #[test]
    fn defaults_are_red_white_black() {
        let colors = PaletteColors::default();
        assert_eq!(colors.accent, RED);
        assert_eq!(colors.base, WHITE);
        assert_eq!(colors.shadow, BLACK);
    }

    #[test]
    fn missing_targets_fall_back_individually() {
        let palette = Palette {
            swatches: vec![Swatch::new([10, 200, 30], 4)],
            selected: vec![(Target::VIBRANT, Swatch::new([10, 200, 30], 4))],
        };
        let colors = PaletteColors::from_palette(&palette);
        assert_eq!(colors.accent, [10, 200, 30]);
        assert_eq!(colors.base, WHITE);
        assert_eq!(colors.shadow, BLACK);
    }

    #[test]
    fn shared_palette_publishes_once() {
        let shared = SharedPalette::new();
        assert!(!shared.is_resolved());
        assert_eq!(shared.snapshot(), PaletteColors::default());

        let first = PaletteColors {
            accent: [1, 2, 3],
            base: [4, 5, 6],
            shadow: [7, 8, 9],
        };
        assert!(shared.publish(first));
        assert!(!shared.publish(PaletteColors::default()));
        assert_eq!(shared.snapshot(), first);
        assert_eq!(shared.clone().snapshot(), first);
    }

    #[test]
    fn failed_extraction_keeps_defaults() {
        let extractor = Arc::new(FixedExtractor(Err("decoder exploded".to_string())));
        let shared = spawn_extraction(RgbImage::new(4, 4), extractor, "test");
        assert!(!shared.wait_for(Duration::from_millis(100)));
        assert_eq!(shared.snapshot(), PaletteColors::default());
    }

    #[test]
    fn successful_extraction_is_adopted() {
        let palette = palette_of([200, 30, 30], [255, 150, 150], [40, 50, 45]);
        let extractor = Arc::new(FixedExtractor(Ok(palette)));
        let shared = spawn_extraction(RgbImage::new(4, 4), extractor, "test");
        assert!(shared.wait_for(Duration::from_secs(5)));
        assert_eq!(
            shared.snapshot(),
            PaletteColors {
                accent: [200, 30, 30],
                base: [255, 150, 150],
                shadow: [40, 50, 45],
            }
        );
    }

    #[test]
    fn readers_never_observe_a_torn_palette() {
        let published = PaletteColors {
            accent: [9, 9, 9],
            base: [8, 8, 8],
            shadow: [7, 7, 7],
        };
        let shared = SharedPalette::new();
        let reader = shared.clone();
        let handle = thread::spawn(move || {
            for _ in 0..20_000 {
                let seen = reader.snapshot();
                assert!(seen == PaletteColors::default() || seen == published);
            }
        });
        shared.publish(published);
        handle.join().unwrap();
    }
}
