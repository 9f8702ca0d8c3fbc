use render_quality::GraphicsConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::cli::{parse_args, usage_text, CliCommand, SimOptions};
use super::cost_model::resolve_slow_frame_cost;
use super::settings_store;
use super::sim_loop::{run_simulation, SimConfig, SimError};

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

pub(crate) fn run(args: &[String]) -> Result<(), SimError> {
    let options = match parse_args(args)? {
        CliCommand::Help => {
            println!("{}", usage_text());
            return Ok(());
        }
        CliCommand::Run(options) => options,
    };
    info!("=== Quality Sim Startup ===");

    let mut config = settings_store::load_or_default(&options.settings_path)?;
    apply_overrides(&mut config, &options);

    let sim = SimConfig {
        frames: options.frames,
        dynamic_quality: options.dynamic_quality,
        post_stage: options.post_stage,
        slow_frame: resolve_slow_frame_cost(0),
        ..SimConfig::default()
    };
    info!(
        frames = sim.frames,
        preset = %config.preset,
        frame_rate_limit = %config.frame_rate_limit,
        dynamic_quality = sim.dynamic_quality,
        post_stage = sim.post_stage,
        slow_frame_ms = sim.slow_frame.as_millis() as u64,
        "sim_configured"
    );

    run_simulation(&mut config, &sim)?;

    if options.save {
        settings_store::save(&options.settings_path, &config)?;
    }
    Ok(())
}

/// CLI overrides land before the first reconciliation, so the label is
/// recomputed from the resulting fields.
fn apply_overrides(config: &mut GraphicsConfig, options: &SimOptions) {
    if let Some(table) = options.preset.and_then(GraphicsConfig::for_preset) {
        *config = table;
    }
    if let Some(limit) = options.fps_limit {
        config.frame_rate_limit = limit;
    }
    if options.preset.is_some() || options.fps_limit.is_some() {
        config.preset = config.detect_preset();
    }
}

#[cfg(test)]
mod tests {
    use render_quality::settings::{FrameRateLimit, QualityPreset};

    use super::*;

    #[test]
    fn preset_override_replaces_loaded_fields() {
        let mut config = GraphicsConfig {
            resolution_scale: 2.0,
            ..GraphicsConfig::default()
        };
        let options = SimOptions {
            preset: Some(QualityPreset::Medium),
            ..SimOptions::default()
        };

        apply_overrides(&mut config, &options);

        assert_eq!(Some(config), GraphicsConfig::for_preset(QualityPreset::Medium));
    }

    #[test]
    fn fps_override_off_table_relabels_custom() {
        let mut config = GraphicsConfig::default();
        let options = SimOptions {
            fps_limit: Some(FrameRateLimit::Capped(144)),
            ..SimOptions::default()
        };

        apply_overrides(&mut config, &options);

        assert_eq!(config.frame_rate_limit, FrameRateLimit::Capped(144));
        assert_eq!(config.preset, QualityPreset::Custom);
    }

    #[test]
    fn run_saves_settings_when_requested() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("settings.json");
        let args = [
            "--settings",
            path.to_str().expect("utf-8 temp path"),
            "--frames",
            "40",
            "--preset",
            "low",
            "--save",
        ]
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();

        run(&args).expect("simulation run");

        let saved = settings_store::load_or_default(&path).expect("saved settings");
        assert_eq!(saved.preset, QualityPreset::Low);
    }
}
