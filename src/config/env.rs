//! Environment variable handling

/// Environment variables for watch face configuration
#[derive(Debug, Default, Clone)]
pub struct EnvVars {
    pub background: Option<String>,
    pub style: Option<String>,
    pub output: Option<String>,
    pub size: Option<u32>,
    pub ambient: Option<bool>,
    pub mute: Option<bool>,
    pub palette_wait_ms: Option<u64>,
}

/// Load configuration from environment variables
pub fn load_env_vars() -> EnvVars {
    load_env_vars_from(|name| std::env::var(name).ok())
}

/// Load configuration through an arbitrary variable lookup
pub fn load_env_vars_from<F>(lookup: F) -> EnvVars
where
    F: Fn(&str) -> Option<String>,
{
    let mut env = EnvVars::default();

    if let Some(value) = lookup("WATCHFACE_BACKGROUND") {
        env.background = Some(value);
    }

    if let Some(value) = lookup("WATCHFACE_STYLE") {
        env.style = Some(value);
    }

    if let Some(value) = lookup("WATCHFACE_OUTPUT") {
        env.output = Some(value);
    }

    if let Some(value) = lookup("WATCHFACE_SIZE") {
        if let Ok(size) = value.parse() {
            env.size = Some(size);
        }
    }

    if let Some(value) = lookup("WATCHFACE_AMBIENT") {
        env.ambient = parse_flag(&value);
    }

    if let Some(value) = lookup("WATCHFACE_MUTE") {
        env.mute = parse_flag(&value);
    }

    if let Some(value) = lookup("WATCHFACE_PALETTE_WAIT_MS") {
        if let Ok(wait) = value.parse() {
            env.palette_wait_ms = Some(wait);
        }
    }

    env
}

fn parse_flag(value: &str) -> Option<bool> {
    if let Ok(enabled) = value.parse::<bool>() {
        Some(enabled)
    } else if let Ok(enabled) = value.parse::<u8>() {
        // Also support numeric values (0/1)
        Some(enabled != 0)
    } else {
        None
    }
}
