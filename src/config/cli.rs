//! Command-line argument parsing

/// Command-line arguments for the watch face renderer
#[derive(argh::FromArgs, Debug, Clone)]
/// Watch Face Renderer
///
/// Renders an analogue or digital watch face over a background image into a PNG.
pub struct CliArgs {
    #[argh(option, short = 'b')]
    /// background image the face colors are derived from. Default: none (black, default colors)
    pub background: Option<String>,

    #[argh(option, short = 's')]
    /// face style: "analogue" or "digital". Default: "analogue"
    pub style: Option<String>,

    #[argh(option, short = 'o', default = "String::from(\"watchface.png\")")]
    /// output PNG path. Default: "watchface.png"
    pub output: String,

    #[argh(option, short = 'z', default = "320")]
    /// width and height of the rendered square in pixels. Default: 320
    pub size: u32,

    #[argh(option, short = 't')]
    /// fixed time to render as HH:MM[:SS[.mmm]]. Default: current local time
    pub time: Option<String>,

    #[argh(switch)]
    /// render the low-power ambient variant
    pub ambient: bool,

    #[argh(switch)]
    /// render the dimmed mute variant
    pub mute: bool,

    #[argh(switch, short = 'w')]
    /// keep re-rendering the output until interrupted
    /// (every second, or every minute when ambient)
    pub watch: bool,

    #[argh(switch)]
    /// print the drawing commands of the first frame as JSON
    pub dump_commands: bool,

    #[argh(option, default = "500")]
    /// how long to wait for the background palette before the first frame, in
    /// milliseconds. Frames never wait afterwards. Default: 500
    pub palette_wait_ms: u64,
}

impl CliArgs {
    /// Parse CLI arguments
    pub fn parse() -> Self {
        // Use argh to parse args from environment
        argh::from_env()
    }
}
