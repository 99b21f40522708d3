#![forbid(unsafe_code)]

//! Command-line argument parsing for the replay demo.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `VLIST_DEMO_*` prefix; list geometry also
//! honours the library-level `VLIST_*` variables, which the demo flags
//! override in turn.

use std::env;
use std::fmt;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit status for bad arguments.
pub const EXIT_USAGE: i32 = 2;

const HELP_TEXT: &str = "\
vlist-demo: scroll a mock chat from its newest message to the top of history

USAGE:
    vlist-demo [OPTIONS]

OPTIONS:
    --messages=N         Messages in the conversation, visible + history (default: 200)
    --height=PX          Scroll container height in pixels (default: 600)
    --item-height=PX     Row height in pixels (default: 100)
    --overscan=N         Rows rendered beyond each viewport edge (default: 5)
    --step=PX            Scroll distance per replayed event (default: 150)
    --width=COLS         Row width in columns (default: 72)
    --log-json           Emit logs as JSON lines on stderr
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    VLIST_DEMO_MESSAGES      Override --messages
    VLIST_DEMO_HEIGHT        Override --height
    VLIST_DEMO_ITEM_HEIGHT   Override --item-height
    VLIST_DEMO_OVERSCAN      Override --overscan
    VLIST_DEMO_STEP          Override --step
    VLIST_DEMO_WIDTH         Override --width
    VLIST_DEMO_LOG_JSON      JSON logs (1/true to enable)
    VLIST_ITEM_HEIGHT        Library default row height
    VLIST_OVERSCAN           Library default overscan
    VLIST_LOAD_THRESHOLD     Load-more distance: N rows or Npx
    RUST_LOG                 Log filter (default: info)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    /// Total messages, visible plus paged history.
    pub messages: usize,
    /// Container height in pixels.
    pub height: f64,
    /// Row height override.
    pub item_height: Option<f64>,
    /// Overscan override.
    pub overscan: Option<usize>,
    /// Pixels scrolled per event.
    pub step: f64,
    /// Row width in columns.
    pub width: usize,
    pub log_json: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            messages: 200,
            height: 600.0,
            item_height: None,
            overscan: None,
            step: 150.0,
            width: 72,
            log_json: false,
        }
    }
}

/// Why argument parsing stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    Help,
    Version,
    InvalidValue { flag: &'static str, value: String },
    UnknownArg(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Help => f.write_str("help requested"),
            Self::Version => f.write_str("version requested"),
            Self::InvalidValue { flag, value } => write!(f, "Invalid {flag} value: {value}"),
            Self::UnknownArg(arg) => write!(f, "Unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags.
    pub fn parse() -> Self {
        match Self::parse_from_env_and_args(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(opts) => opts,
            Err(CliError::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Err(CliError::Version) => {
                println!("vlist-demo {VERSION}");
                process::exit(0);
            }
            Err(err @ CliError::InvalidValue { .. }) => {
                eprintln!("{err}");
                process::exit(EXIT_USAGE);
            }
            Err(err @ CliError::UnknownArg(_)) => {
                eprintln!("{err}");
                eprintln!("Run with --help for usage information.");
                process::exit(EXIT_USAGE);
            }
        }
    }

    pub fn parse_from_env_and_args<I, S, F>(args: I, get_env: F) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Environment first; bad values are ignored here.
        if let Some(val) = get_env("VLIST_DEMO_MESSAGES")
            && let Ok(n) = val.trim().parse()
        {
            opts.messages = n;
        }
        if let Some(val) = get_env("VLIST_DEMO_HEIGHT")
            && let Some(px) = parse_pixels(&val)
        {
            opts.height = px;
        }
        if let Some(val) = get_env("VLIST_DEMO_ITEM_HEIGHT")
            && let Some(px) = parse_pixels(&val).filter(|px| *px > 0.0)
        {
            opts.item_height = Some(px);
        }
        if let Some(val) = get_env("VLIST_DEMO_OVERSCAN")
            && let Ok(n) = val.trim().parse()
        {
            opts.overscan = Some(n);
        }
        if let Some(val) = get_env("VLIST_DEMO_STEP")
            && let Some(px) = parse_pixels(&val).filter(|px| *px > 0.0)
        {
            opts.step = px;
        }
        if let Some(val) = get_env("VLIST_DEMO_WIDTH")
            && let Ok(n) = val.trim().parse()
        {
            opts.width = n;
        }
        if let Some(val) = get_env("VLIST_DEMO_LOG_JSON") {
            opts.log_json = val == "1" || val.eq_ignore_ascii_case("true");
        }

        // Command-line args override env vars.
        for arg in args {
            let arg = arg.as_ref();
            match arg {
                "--help" | "-h" => return Err(CliError::Help),
                "--version" | "-V" => return Err(CliError::Version),
                "--log-json" => opts.log_json = true,
                other => {
                    if let Some(val) = other.strip_prefix("--messages=") {
                        opts.messages = parse_flag("--messages", val, |v| v.parse().ok())?;
                    } else if let Some(val) = other.strip_prefix("--height=") {
                        opts.height = parse_flag("--height", val, parse_pixels)?;
                    } else if let Some(val) = other.strip_prefix("--item-height=") {
                        opts.item_height = Some(parse_flag("--item-height", val, |v| {
                            parse_pixels(v).filter(|px| *px > 0.0)
                        })?);
                    } else if let Some(val) = other.strip_prefix("--overscan=") {
                        opts.overscan = Some(parse_flag("--overscan", val, |v| v.parse().ok())?);
                    } else if let Some(val) = other.strip_prefix("--step=") {
                        opts.step = parse_flag("--step", val, |v| {
                            parse_pixels(v).filter(|px| *px > 0.0)
                        })?;
                    } else if let Some(val) = other.strip_prefix("--width=") {
                        opts.width = parse_flag("--width", val, |v| v.parse().ok())?;
                    } else {
                        return Err(CliError::UnknownArg(other.to_string()));
                    }
                }
            }
        }

        Ok(opts)
    }
}

fn parse_flag<T>(
    flag: &'static str,
    value: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, CliError> {
    parse(value.trim()).ok_or_else(|| CliError::InvalidValue {
        flag,
        value: value.to_string(),
    })
}

/// Finite, non-negative pixel count, with or without a `px` suffix.
fn parse_pixels(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed);
    number
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|px| px.is_finite() && *px >= 0.0)
}
