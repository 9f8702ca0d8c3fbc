use std::env;
use std::time::Duration;

use render_quality::apply::{
    anti_alias_params, lighting_params, post_process_params, shadow_params, texture_params,
};
use render_quality::GraphicsConfig;
use tracing::warn;

pub(crate) const SLOW_FRAME_ENV_VAR: &str = "QUALITY_SIM_SLOW_FRAME_MS";

const BASE_FRAME_MS: f32 = 4.0;
const FULL_RESOLUTION_FILL_MS: f32 = 10.0;
const MSAA_FILL_COST_PER_SAMPLE: f32 = 0.075;
const FXAA_MS: f32 = 0.5;
const SHADOW_MS_PER_1K_MAP: f32 = 1.0;
const POST_BASE_MS: f32 = 1.0;
const BLOOM_MS: f32 = 2.0;
const POINT_LIGHTS_MS: f32 = 1.5;
const TEXTURE_MS_PER_2K: f32 = 1.0;
const FULL_PARTICLES_MS: f32 = 6.0;

/// Simulated GPU time for one frame at `config`, plus a fixed `extra` cost.
pub(crate) fn frame_cost(config: &GraphicsConfig, extra: Duration) -> Duration {
    let anti_alias = anti_alias_params(config.anti_aliasing);
    let scale = if config.resolution_scale.is_finite() {
        config.resolution_scale.max(0.0)
    } else {
        1.0
    };
    let fill_factor = 1.0 + anti_alias.msaa_samples as f32 * MSAA_FILL_COST_PER_SAMPLE;
    let mut cost_ms = BASE_FRAME_MS + scale * scale * FULL_RESOLUTION_FILL_MS * fill_factor;

    if anti_alias.fxaa {
        cost_ms += FXAA_MS;
    }

    let shadows = shadow_params(config.shadow_quality);
    if shadows.enabled {
        cost_ms += shadows.map_size as f32 / 1024.0 * SHADOW_MS_PER_1K_MAP;
    }

    let post = post_process_params(config.post_processing);
    if post.enabled {
        cost_ms += POST_BASE_MS + post.bloom_strength * BLOOM_MS;
    }

    if lighting_params(config.lighting_quality).point_lights {
        cost_ms += POINT_LIGHTS_MS;
    }

    cost_ms += texture_params(config.texture_quality).max_size as f32 / 2048.0 * TEXTURE_MS_PER_2K;

    let density = if config.particle_density.is_finite() {
        config.particle_density.clamp(0.0, 1.0)
    } else {
        1.0
    };
    cost_ms += density * FULL_PARTICLES_MS;

    Duration::from_secs_f32(cost_ms / 1000.0).saturating_add(extra)
}

/// Extra simulated cost per frame; the env var wins over the configured value.
pub(crate) fn resolve_slow_frame_cost(config_slow_frame_ms: u64) -> Duration {
    slow_frame_cost_from(env::var(SLOW_FRAME_ENV_VAR), config_slow_frame_ms)
}

fn slow_frame_cost_from(
    value: Result<String, env::VarError>,
    config_slow_frame_ms: u64,
) -> Duration {
    let configured = Duration::from_millis(config_slow_frame_ms);
    let raw = match value {
        Ok(raw) => raw,
        Err(env::VarError::NotPresent) => return configured,
        Err(error) => {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                error = %error,
                configured_ms = config_slow_frame_ms,
                "simulated_frame_cost_env_unreadable"
            );
            return configured;
        }
    };

    raw.trim().parse::<u64>().map_or_else(
        |_| {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                value = raw.as_str(),
                configured_ms = config_slow_frame_ms,
                "simulated_frame_cost_env_not_millis"
            );
            configured
        },
        Duration::from_millis,
    )
}
