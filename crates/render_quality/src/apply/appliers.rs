use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::settings::{
    AntiAliasing, BackgroundDetail, FogEffect, GraphicsConfig, LightingQuality, PostProcessing,
    RenderPrecision, SettingField, ShadowQuality, TextureQuality, ViewDistance,
    RESOLUTION_SCALE_MAX, RESOLUTION_SCALE_MIN,
};

use super::sink::{
    AntiAliasParams, BackgroundParams, FogParams, LightingParams, PipelineStage,
    PostProcessParams, RenderSink, RenderWrite, ResolutionParams, ShaderPrecision, ShadowFilter,
    ShadowParams, SinkError, TextureParams, ViewDistanceParams,
};

pub const FOG_FAR_RATIO: f32 = 0.8;
pub const FOG_EXP2_DENSITY: f32 = 0.000_02;
pub const DEFAULT_BACKGROUND_FIELD_LEN: u32 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplyContext {
    pub device_pixel_ratio: f32,
    pub background_field_len: u32,
}

impl Default for ApplyContext {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            background_field_len: DEFAULT_BACKGROUND_FIELD_LEN,
        }
    }
}

/// Pure value-to-parameter mapping for one field.
pub fn compute_write(
    field: SettingField,
    config: &GraphicsConfig,
    context: &ApplyContext,
) -> RenderWrite {
    match field {
        SettingField::ResolutionScale => RenderWrite::Resolution(resolution_params(
            config.resolution_scale,
            context.device_pixel_ratio,
        )),
        SettingField::ShadowQuality => RenderWrite::Shadows(shadow_params(config.shadow_quality)),
        SettingField::AntiAliasing => {
            RenderWrite::AntiAliasing(anti_alias_params(config.anti_aliasing))
        }
        SettingField::PostProcessing => {
            RenderWrite::PostProcessing(post_process_params(config.post_processing))
        }
        SettingField::ViewDistance => RenderWrite::ViewDistance(view_distance_params(
            config.view_distance,
            config.fog_effect,
        )),
        SettingField::LightingQuality => {
            RenderWrite::Lighting(lighting_params(config.lighting_quality))
        }
        SettingField::FogEffect => {
            RenderWrite::Fog(fog_params(config.fog_effect, config.view_distance))
        }
        SettingField::RenderPrecision => {
            RenderWrite::Precision(shader_precision(config.render_precision))
        }
        SettingField::ParticleDensity => RenderWrite::BackgroundDrawRange {
            count: background_draw_count(config.particle_density, context.background_field_len),
        },
        SettingField::FrameRateLimit => RenderWrite::FrameRateLimit(config.frame_rate_limit.cap()),
        SettingField::ObjectDetail => RenderWrite::ObjectDetail {
            lod_multiplier: config.object_detail.lod_multiplier(),
        },
        SettingField::UiAnimations => RenderWrite::UiAnimations(config.ui_animations),
        SettingField::TextureQuality => {
            RenderWrite::Textures(texture_params(config.texture_quality))
        }
        SettingField::BackgroundDetail => {
            RenderWrite::Background(background_params(config.background_detail))
        }
    }
}

/// Non-finite scale falls back to 1.0, anything else clamps to the valid range.
pub fn resolution_params(scale: f32, device_pixel_ratio: f32) -> ResolutionParams {
    let scale = if scale.is_finite() {
        scale.clamp(RESOLUTION_SCALE_MIN, RESOLUTION_SCALE_MAX)
    } else {
        1.0
    };
    let device_pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    ResolutionParams {
        scale,
        pixel_ratio: scale * device_pixel_ratio,
    }
}

pub fn shadow_params(quality: ShadowQuality) -> ShadowParams {
    let (enabled, map_size, filter) = match quality {
        ShadowQuality::Off => (false, 0, ShadowFilter::Basic),
        ShadowQuality::Low => (true, 512, ShadowFilter::Basic),
        ShadowQuality::Medium => (true, 1024, ShadowFilter::Basic),
        ShadowQuality::High => (true, 2048, ShadowFilter::Pcf),
        ShadowQuality::Ultra => (true, 4096, ShadowFilter::PcfSoft),
    };
    ShadowParams {
        enabled,
        map_size,
        filter,
    }
}

pub fn anti_alias_params(mode: AntiAliasing) -> AntiAliasParams {
    let (msaa_samples, fxaa) = match mode {
        AntiAliasing::Off => (0, false),
        AntiAliasing::Fxaa => (0, true),
        AntiAliasing::Msaa2x => (2, false),
        AntiAliasing::Msaa4x => (4, false),
        AntiAliasing::Msaa8x => (8, false),
    };
    AntiAliasParams { msaa_samples, fxaa }
}

pub fn post_process_params(level: PostProcessing) -> PostProcessParams {
    let (enabled, bloom_strength) = match level {
        PostProcessing::Off => (false, 0.0),
        PostProcessing::Low => (true, 0.0),
        PostProcessing::Medium => (true, 0.5),
        PostProcessing::High => (true, 1.0),
    };
    PostProcessParams {
        enabled,
        bloom_strength,
        tone_mapping: enabled,
    }
}

pub fn far_plane(distance: ViewDistance) -> f32 {
    match distance {
        ViewDistance::Minimal => 12_000.0,
        ViewDistance::Near => 15_000.0,
        ViewDistance::Medium => 20_000.0,
        ViewDistance::Far => 30_000.0,
        ViewDistance::Unlimited => 50_000.0,
    }
}

pub fn view_distance_params(distance: ViewDistance, fog: FogEffect) -> ViewDistanceParams {
    ViewDistanceParams {
        far_plane: far_plane(distance),
        fog: fog.is_linear().then(|| fog_params(fog, distance)),
    }
}

pub fn lighting_params(quality: LightingQuality) -> LightingParams {
    let (ambient_intensity, sun_intensity, point_lights) = match quality {
        LightingQuality::Low => (0.8, 0.6, false),
        LightingQuality::Medium => (0.6, 0.9, true),
        LightingQuality::High => (0.5, 1.0, true),
        LightingQuality::Ultra => (0.4, 1.2, true),
    };
    LightingParams {
        ambient_intensity,
        sun_intensity,
        point_lights,
    }
}

pub fn fog_params(fog: FogEffect, distance: ViewDistance) -> FogParams {
    let far = far_plane(distance);
    match fog {
        FogEffect::Off => FogParams::None,
        FogEffect::Simple => FogParams::Linear {
            near: far * 0.5,
            far: far * FOG_FAR_RATIO,
        },
        FogEffect::Standard => FogParams::Linear {
            near: far * 0.25,
            far: far * FOG_FAR_RATIO,
        },
        FogEffect::High => FogParams::ExponentialSquared {
            density: FOG_EXP2_DENSITY,
        },
    }
}

pub fn shader_precision(precision: RenderPrecision) -> ShaderPrecision {
    match precision {
        RenderPrecision::Low => ShaderPrecision::Low,
        RenderPrecision::Medium => ShaderPrecision::Medium,
        RenderPrecision::High => ShaderPrecision::High,
    }
}

/// Visible prefix of the background field; the sink cuts the draw range
/// instead of hiding elements one by one.
pub fn background_draw_count(density: f32, field_len: u32) -> u32 {
    let density = if density.is_finite() {
        density.clamp(0.0, 1.0)
    } else {
        1.0
    };
    (field_len as f32 * density).round() as u32
}

pub fn texture_params(quality: TextureQuality) -> TextureParams {
    let (max_size, anisotropy) = match quality {
        TextureQuality::Low => (512, 1),
        TextureQuality::Medium => (1024, 2),
        TextureQuality::High => (2048, 4),
        TextureQuality::Ultra => (4096, 8),
    };
    TextureParams {
        max_size,
        anisotropy,
    }
}

pub fn background_params(detail: BackgroundDetail) -> BackgroundParams {
    let (star_layers, nebula) = match detail {
        BackgroundDetail::Low => (1, false),
        BackgroundDetail::Medium => (2, true),
        BackgroundDetail::High => (3, true),
    };
    BackgroundParams {
        star_layers,
        nebula,
    }
}

#[derive(Debug, Default)]
pub struct ApplierTable {
    context: ApplyContext,
    reported_missing: BTreeSet<PipelineStage>,
}

impl ApplierTable {
    pub fn new(context: ApplyContext) -> Self {
        Self {
            context,
            reported_missing: BTreeSet::new(),
        }
    }

    pub fn context(&self) -> &ApplyContext {
        &self.context
    }

    pub fn set_context(&mut self, context: ApplyContext) {
        self.context = context;
    }

    pub fn apply<S: RenderSink + ?Sized>(
        &mut self,
        field: SettingField,
        config: &GraphicsConfig,
        sink: &mut S,
    ) {
        let write = compute_write(field, config, &self.context);
        match sink.write(write) {
            Ok(()) => debug!(field = %field, write = ?write, "setting_applied"),
            Err(SinkError::MissingStage(stage)) => {
                if self.reported_missing.insert(stage) {
                    debug!(field = %field, stage = %stage, "pipeline_stage_missing_skipped");
                }
            }
            Err(error) => warn!(field = %field, error = %error, "render_sink_write_failed"),
        }
    }

    pub fn apply_all<S: RenderSink + ?Sized>(&mut self, config: &GraphicsConfig, sink: &mut S) {
        for field in SettingField::ALL {
            self.apply(field, config, sink);
        }
    }

    pub fn reset_state(&mut self) {
        self.reported_missing.clear();
    }

    pub fn has_reported_missing(&self, stage: PipelineStage) -> bool {
        self.reported_missing.contains(&stage)
    }
}
