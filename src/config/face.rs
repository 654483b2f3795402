//! Face configuration structure and methods

use super::{CliArgs, EnvVars};
use crate::models::clock::{FaceGeometry, FaceStyle, RenderMode};
use chrono::NaiveTime;
use std::path::{Path, PathBuf};

/// Largest frame edge the binary accepts
pub const MAX_SIZE: u32 = 4096;

/// Configuration structure that stores all render settings
#[derive(Clone, Debug)]
pub struct FaceConfig {
    pub background: Option<PathBuf>,
    pub style: String,
    pub output: PathBuf,
    pub size: u32,
    pub time: Option<String>,
    pub ambient: bool,
    pub mute: bool,
    pub watch: bool,
    pub dump_commands: bool,
    pub palette_wait_ms: u64,
}

impl FaceConfig {
    /// Create a new configuration by combining CLI arguments and environment variables
    pub fn new(cli_args: CliArgs, env_vars: EnvVars) -> Self {
        let background = env_vars.background.or(cli_args.background).map(PathBuf::from);
        let style = env_vars
            .style
            .or(cli_args.style)
            .unwrap_or_else(|| FaceStyle::default().to_string());
        let output = PathBuf::from(env_vars.output.unwrap_or(cli_args.output));
        let size = env_vars.size.unwrap_or(cli_args.size);
        let ambient = env_vars.ambient.unwrap_or(cli_args.ambient);
        let mute = env_vars.mute.unwrap_or(cli_args.mute);
        let palette_wait_ms = env_vars.palette_wait_ms.unwrap_or(cli_args.palette_wait_ms);

        Self {
            background,
            style,
            output,
            size,
            time: cli_args.time,
            ambient,
            mute,
            watch: cli_args.watch,
            dump_commands: cli_args.dump_commands,
            palette_wait_ms,
        }
    }

    pub fn face_style(&self) -> Result<FaceStyle, String> {
        self.style.parse()
    }

    /// The time given on the command line, if any
    pub fn fixed_time(&self) -> Result<Option<NaiveTime>, String> {
        match &self.time {
            None => Ok(None),
            Some(value) => parse_time(value).map(Some),
        }
    }

    pub fn render_mode(&self) -> RenderMode {
        RenderMode::new(self.ambient, self.mute)
    }

    pub fn geometry(&self) -> FaceGeometry {
        FaceGeometry::inscribed(self.size, self.size)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.size == 0 {
            errors.push("Size must be greater than 0".to_string());
        }

        if self.size > MAX_SIZE {
            errors.push(format!("Size must be at most {}", MAX_SIZE));
        }

        if let Err(e) = self.face_style() {
            errors.push(e);
        }

        if let Err(e) = self.fixed_time() {
            errors.push(e);
        }

        if let Some(background) = &self.background {
            if !Path::new(background).is_file() {
                errors.push(format!(
                    "Background image '{}' does not exist",
                    background.display()
                ));
            }
        }

        if self.output.as_os_str().is_empty() {
            errors.push("Output path must not be empty".to_string());
        }

        if self.watch && self.time.is_some() {
            errors.push("A fixed time cannot be combined with --watch".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|e| format!("Invalid time '{}': {}. Use HH:MM[:SS[.mmm]]", value, e))
}
