use chrono::Local;
use colored::*;
use env_logger::Builder;
use log::{debug, error, info, warn, LevelFilter};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use watchface_renderer::config::init_config;
use watchface_renderer::display::update_loop::{display_loop, render_frame, FrameTarget};
use watchface_renderer::{create_face, DrawableFace, RecordingSurface, SwatchExtractor};

fn load_background(path: &Path) -> Result<image::RgbImage, String> {
    image::open(path)
        .map(|dynamic| dynamic.to_rgb8())
        .map_err(|e| format!("Failed to open background {}: {}", path.display(), e))
}

async fn wait_for_palette(face: &dyn DrawableFace, timeout: Duration) {
    let started = Instant::now();
    while !face.palette_resolved() {
        if started.elapsed() >= timeout {
            warn!(
                "Palette not ready after {}ms, first frame uses default colors",
                timeout.as_millis()
            );
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    debug!("Palette ready after {}ms", started.elapsed().as_millis());
}

#[tokio::main]
async fn main() {
    // Initialize the logger with a custom format that includes timestamps and colors
    Builder::new()
        .format(|buf, record| {
            // Color based on log level
            let level = match record.level() {
                log::Level::Error => record.level().to_string().red().bold(),
                log::Level::Warn => record.level().to_string().yellow().bold(),
                log::Level::Info => record.level().to_string().green(),
                log::Level::Debug => record.level().to_string().blue(),
                log::Level::Trace => record.level().to_string().purple(),
            };

            // Apply appropriate colors to the message based on level
            let message = match record.level() {
                log::Level::Error => record.args().to_string().red(),
                log::Level::Warn => record.args().to_string().yellow(),
                log::Level::Info => record.args().to_string().normal(),
                log::Level::Debug => record.args().to_string().blue(),
                log::Level::Trace => record.args().to_string().purple(),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                level,
                message
            )
        })
        .filter(None, LevelFilter::Info) // Set default log level to Info
        .parse_env("RUST_LOG") // Allow overriding with RUST_LOG environment variable
        .init();

    // Initialize configuration
    let config = init_config();

    // Validate configuration
    if let Err(errors) = config.validate() {
        for error in errors {
            error!("{}", error);
        }
        std::process::exit(1);
    }

    // Validation guarantees these parse
    let (style, fixed_time) = match (config.face_style(), config.fixed_time()) {
        (Ok(style), Ok(time)) => (style, time),
        (Err(e), _) | (_, Err(e)) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!("Rendering {} face at {}x{}", style, config.size, config.size);

    let background = match &config.background {
        Some(path) => match load_background(path) {
            Ok(image) => Some(image),
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        },
        None => {
            info!("No background given, using default colors on black");
            None
        }
    };

    let mut face = create_face(style, Arc::new(SwatchExtractor::new()));
    if let Some(background) = &background {
        face.init(background.clone());
        wait_for_palette(face.as_ref(), Duration::from_millis(config.palette_wait_ms)).await;
    }

    let mode = config.render_mode();
    let geometry = config.geometry();
    let first_frame_time = fixed_time.unwrap_or_else(|| Local::now().time());

    if config.dump_commands {
        let mut surface = RecordingSurface::new();
        face.draw(&mut surface, &first_frame_time, geometry, mode);
        match surface.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize drawing commands: {}", e),
        }
    }

    if !config.watch {
        let frame = render_frame(
            face.as_ref(),
            background.as_ref(),
            config.size,
            &first_frame_time,
            mode,
        );
        if let Err(e) = frame.save_png(&config.output) {
            error!("{}", e);
            std::process::exit(1);
        }
        info!(
            "Wrote {} ({})",
            config.output.display(),
            first_frame_time.format("%H:%M:%S")
        );
        return;
    }

    // Set up signal handler for clean shutdown
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received termination signal, shutting down...");
        shutdown_flag.store(true, Ordering::SeqCst);
    }) {
        error!("Error setting Ctrl-C handler: {}", e);
    }

    let target = FrameTarget::new(background.as_ref(), config.size, config.output.clone());
    display_loop(face, target, mode, shutdown).await;

    info!("Application exiting");
}
