use crate::display::canvas::FrameBuffer;
use crate::display::renderer::DrawableFace;
use crate::display::surface::CanvasSurface;
use crate::models::clock::{FaceGeometry, RenderMode};
use chrono::{Local, NaiveTime, Timelike};
use image::RgbImage;
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// Longest single sleep so a shutdown request is noticed promptly
const SHUTDOWN_POLL: Duration = Duration::from_millis(250);

/// Where frames are written, with the background already scaled to the frame size
pub struct FrameTarget {
    base: FrameBuffer,
    output: PathBuf,
}

impl FrameTarget {
    pub fn new(background: Option<&RgbImage>, size: u32, output: PathBuf) -> Self {
        Self {
            base: base_frame(background, size),
            output,
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

fn base_frame(background: Option<&RgbImage>, size: u32) -> FrameBuffer {
    match background {
        Some(background) => FrameBuffer::with_background(background, size, size),
        None => FrameBuffer::new(size, size),
    }
}

/// Draw `face` onto a copy of `base`, inscribed in its shorter side
fn draw_frame(
    face: &dyn DrawableFace,
    mut buffer: FrameBuffer,
    time: &NaiveTime,
    mode: RenderMode,
) -> FrameBuffer {
    let (width, height) = buffer.image().dimensions();
    {
        let mut surface = CanvasSurface::new(&mut buffer);
        face.draw(&mut surface, time, FaceGeometry::inscribed(width, height), mode);
    }
    buffer
}

/// Rasterize one frame of `face` over the background
pub fn render_frame(
    face: &dyn DrawableFace,
    background: Option<&RgbImage>,
    size: u32,
    time: &NaiveTime,
    mode: RenderMode,
) -> FrameBuffer {
    draw_frame(face, base_frame(background, size), time, mode)
}

/// Time left until the next frame is due: the next second while interactive,
/// the next minute in ambient mode.
pub fn delay_until_next_frame(now: &NaiveTime, mode: RenderMode) -> Duration {
    let millis_into_second = ((now.nanosecond() / 1_000_000) as u64).min(999);
    let remaining_in_second = 1000 - millis_into_second;
    if mode.ambient {
        let remaining_seconds = 59 - now.second().min(59) as u64;
        Duration::from_millis(remaining_seconds * 1000 + remaining_in_second)
    } else {
        Duration::from_millis(remaining_in_second)
    }
}

async fn sleep_unless_shutdown(delay: Duration, shutdown: &AtomicBool) {
    let deadline = Instant::now() + delay;
    while !shutdown.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        tokio::time::sleep((deadline - now).min(SHUTDOWN_POLL)).await;
    }
}

// Display loop function that manages the update cycle
pub async fn display_loop(
    face: Box<dyn DrawableFace>,
    target: FrameTarget,
    mode: RenderMode,
    shutdown: Arc<AtomicBool>,
) {
    info!(
        "Starting {} face update loop ({} mode), writing to {}",
        face.style(),
        if mode.ambient { "ambient" } else { "interactive" },
        target.output().display()
    );
    let mut frame_count = 0;
    let mut last_stats_time = Instant::now();

    while !shutdown.load(Ordering::SeqCst) {
        let now = Local::now().time();
        let started = Instant::now();

        let frame = draw_frame(face.as_ref(), target.base.clone(), &now, mode);
        match frame.save_png(target.output()) {
            Ok(()) => debug!(
                "Rendered {} in {:.1}ms",
                now.format("%H:%M:%S"),
                started.elapsed().as_secs_f32() * 1000.0
            ),
            Err(e) => error!("{}", e),
        }

        // Log frame stats periodically
        frame_count += 1;
        if last_stats_time.elapsed().as_secs() >= 60 {
            info!(
                "Rendered {} frames in the last {:.0}s",
                frame_count,
                last_stats_time.elapsed().as_secs_f32()
            );
            frame_count = 0;
            last_stats_time = Instant::now();
        }

        let delay = delay_until_next_frame(&Local::now().time(), mode);
        sleep_unless_shutdown(delay, &shutdown).await;
    }

    info!("Face update loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_SIZE;
    use crate::display::renderer::{AnalogueFace, DigitalFace};
    use crate::models::style::{RED, WHITE};

    fn at(hour: u32, minute: u32, second: u32, milli: u32) -> NaiveTime {
        NaiveTime::from_hms_milli_opt(hour, minute, second, milli).unwrap()
    }

    #[test]
    fn interactive_frames_align_to_seconds() {
        let mode = RenderMode::interactive();
        assert_eq!(
            delay_until_next_frame(&at(1, 2, 3, 250), mode),
            Duration::from_millis(750)
        );
        assert_eq!(
            delay_until_next_frame(&at(1, 2, 3, 0), mode),
            Duration::from_millis(1000)
        );
    }

    #[test]
    fn ambient_frames_align_to_minutes() {
        let mode = RenderMode::new(true, false);
        assert_eq!(
            delay_until_next_frame(&at(1, 2, 0, 0), mode),
            Duration::from_secs(60)
        );
        assert_eq!(
            delay_until_next_frame(&at(1, 2, 59, 500), mode),
            Duration::from_millis(500)
        );
        assert_eq!(
            delay_until_next_frame(&at(23, 59, 59, 1_500), mode),
            Duration::from_millis(1)
        );
    }

    #[test]
    fn render_frame_draws_over_background() {
        let background = RgbImage::from_pixel(10, 10, image::Rgb([0, 0, 90]));
        let face = AnalogueFace::default();
        let frame = render_frame(
            &face,
            Some(&background),
            161,
            &at(12, 0, 0, 0),
            RenderMode::new(true, false),
        );
        assert_eq!(frame.pixel(80, 60), Some(WHITE));
        assert_eq!(frame.pixel(80, 120), Some([0, 0, 90]));
    }

    #[tokio::test]
    async fn loop_exits_when_shutdown_is_requested() {
        let shutdown = Arc::new(AtomicBool::new(true));
        let output = std::env::temp_dir().join("watchface-loop-test.png");
        let target = FrameTarget::new(None, 8, output);
        let face = Box::new(AnalogueFace::default());
        tokio::time::timeout(
            Duration::from_secs(5),
            display_loop(face, target, RenderMode::interactive(), shutdown),
        )
        .await
        .unwrap();
    }

    #[test]
    fn largest_accepted_frames_render() {
        let time = at(12, 0, 0, 0);
        let analogue = render_frame(
            &AnalogueFace::default(),
            None,
            MAX_SIZE,
            &time,
            RenderMode::new(true, false),
        );
        assert_eq!(analogue.pixel(2048, 1434), Some(WHITE));

        let digital = render_frame(
            &DigitalFace::default(),
            None,
            MAX_SIZE,
            &time,
            RenderMode::interactive(),
        );
        let lit = (2180..2205)
            .flat_map(|y| (1900..2200).map(move |x| (x, y)))
            .any(|(x, y)| digital.pixel(x, y) == Some(RED));
        assert!(lit);
    }

    #[test]
    fn loop_frames_reuse_the_scaled_background() {
        let background = RgbImage::from_pixel(10, 10, image::Rgb([0, 0, 90]));
        let target = FrameTarget::new(Some(&background), 32, PathBuf::from("unused.png"));
        let face = AnalogueFace::default();
        let mode = RenderMode::new(true, false);
        let frame = draw_frame(&face, target.base.clone(), &at(12, 0, 0, 0), mode);
        assert_eq!(frame.image().dimensions(), (32, 32));
        assert_eq!(frame.pixel(16, 28), Some([0, 0, 90]));
        assert_eq!(target.base.pixel(16, 8), Some([0, 0, 90]));
    }
}
