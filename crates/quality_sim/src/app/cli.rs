use std::path::PathBuf;

use render_quality::settings::{FrameRateLimit, QualityPreset, SettingValue};
use thiserror::Error;

pub(crate) const DEFAULT_SETTINGS_PATH: &str = "settings.json";
pub(crate) const DEFAULT_FRAMES: u64 = 1_800;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SimOptions {
    pub(crate) settings_path: PathBuf,
    pub(crate) frames: u64,
    pub(crate) fps_limit: Option<FrameRateLimit>,
    pub(crate) preset: Option<QualityPreset>,
    pub(crate) dynamic_quality: bool,
    pub(crate) post_stage: bool,
    pub(crate) save: bool,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            settings_path: PathBuf::from(DEFAULT_SETTINGS_PATH),
            frames: DEFAULT_FRAMES,
            fps_limit: None,
            preset: None,
            dynamic_quality: true,
            post_stage: true,
            save: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CliCommand {
    Help,
    Run(SimOptions),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CliError {
    #[error("missing value for {flag}")]
    MissingValue { flag: &'static str },
    #[error("invalid {flag} value '{value}' (expected {expected})")]
    InvalidValue {
        flag: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("unknown argument '{0}'")]
    UnknownArgument(String),
}

pub(crate) fn parse_args(args: &[String]) -> Result<CliCommand, CliError> {
    let mut options = SimOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "-h" | "--help" => return Ok(CliCommand::Help),
            "--settings" => {
                let value = flag_value(args, index, "--settings")?;
                options.settings_path = PathBuf::from(value);
                index += 2;
            }
            "--frames" => {
                let value = flag_value(args, index, "--frames")?;
                options.frames = value
                    .parse::<u64>()
                    .ok()
                    .filter(|frames| *frames > 0)
                    .ok_or_else(|| invalid("--frames", value, "positive integer"))?;
                index += 2;
            }
            "--fps-limit" => {
                let value = flag_value(args, index, "--fps-limit")?;
                let limit = FrameRateLimit::parse(value)
                    .ok_or_else(|| invalid("--fps-limit", value, "integer or 'unlimited'"))?;
                options.fps_limit = Some(limit);
                index += 2;
            }
            "--preset" => {
                let value = flag_value(args, index, "--preset")?;
                let preset = QualityPreset::parse(value)
                    .filter(|preset| preset.is_named())
                    .ok_or_else(|| invalid("--preset", value, "low, medium, high or ultra"))?;
                options.preset = Some(preset);
                index += 2;
            }
            "--no-dynamic" => {
                options.dynamic_quality = false;
                index += 1;
            }
            "--no-post-stage" => {
                options.post_stage = false;
                index += 1;
            }
            "--save" => {
                options.save = true;
                index += 1;
            }
            other => return Err(CliError::UnknownArgument(other.to_string())),
        }
    }
    Ok(CliCommand::Run(options))
}

pub(crate) fn usage_text() -> String {
    [
        "usage: quality_sim [options]",
        "",
        "options:",
        "  --settings <path>         settings JSON to load (default: settings.json)",
        "  --frames <n>              rendered frames to simulate (default: 1800)",
        "  --fps-limit <n|unlimited> override the configured frame rate limit",
        "  --preset <name>           apply a named preset (low, medium, high, ultra)",
        "  --no-dynamic              disable dynamic quality adjustment",
        "  --no-post-stage           simulate a renderer without a post-processing composer",
        "  --save                    write the final settings back to the settings file",
        "",
        "env:",
        "  RUST_LOG                  tracing filter (default: info)",
        "  QUALITY_SIM_SLOW_FRAME_MS extra simulated cost per frame in milliseconds",
    ]
    .join("\n")
}

fn flag_value<'a>(
    args: &'a [String],
    index: usize,
    flag: &'static str,
) -> Result<&'a str, CliError> {
    args.get(index + 1)
        .map(String::as_str)
        .ok_or(CliError::MissingValue { flag })
}

fn invalid(flag: &'static str, value: &str, expected: &'static str) -> CliError {
    CliError::InvalidValue {
        flag,
        value: value.to_string(),
        expected,
    }
}
