use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

use crate::lod::RepresentationId;
use crate::settings::SettingField;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolutionParams {
    pub scale: f32,
    pub pixel_ratio: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowFilter {
    Basic,
    Pcf,
    PcfSoft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowParams {
    pub enabled: bool,
    pub map_size: u32,
    pub filter: ShadowFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AntiAliasParams {
    pub msaa_samples: u32,
    pub fxaa: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostProcessParams {
    pub enabled: bool,
    pub bloom_strength: f32,
    pub tone_mapping: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewDistanceParams {
    pub far_plane: f32,
    /// Linear fog rescaled to the new far plane. Set only when fog is linear.
    pub fog: Option<FogParams>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingParams {
    pub ambient_intensity: f32,
    pub sun_intensity: f32,
    pub point_lights: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FogParams {
    None,
    Linear { near: f32, far: f32 },
    ExponentialSquared { density: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderPrecision {
    Low,
    Medium,
    High,
}

impl ShaderPrecision {
    pub fn as_glsl(self) -> &'static str {
        match self {
            ShaderPrecision::Low => "lowp",
            ShaderPrecision::Medium => "mediump",
            ShaderPrecision::High => "highp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureParams {
    pub max_size: u32,
    pub anisotropy: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundParams {
    pub star_layers: u32,
    pub nebula: bool,
}

/// Concrete parameter write produced by exactly one setting applier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderWrite {
    Resolution(ResolutionParams),
    Shadows(ShadowParams),
    AntiAliasing(AntiAliasParams),
    PostProcessing(PostProcessParams),
    ViewDistance(ViewDistanceParams),
    Lighting(LightingParams),
    Fog(FogParams),
    Precision(ShaderPrecision),
    BackgroundDrawRange { count: u32 },
    FrameRateLimit(Option<u32>),
    ObjectDetail { lod_multiplier: f32 },
    UiAnimations(bool),
    Textures(TextureParams),
    Background(BackgroundParams),
}

impl RenderWrite {
    pub fn field(&self) -> SettingField {
        match self {
            RenderWrite::Resolution(_) => SettingField::ResolutionScale,
            RenderWrite::Shadows(_) => SettingField::ShadowQuality,
            RenderWrite::AntiAliasing(_) => SettingField::AntiAliasing,
            RenderWrite::PostProcessing(_) => SettingField::PostProcessing,
            RenderWrite::ViewDistance(_) => SettingField::ViewDistance,
            RenderWrite::Lighting(_) => SettingField::LightingQuality,
            RenderWrite::Fog(_) => SettingField::FogEffect,
            RenderWrite::Precision(_) => SettingField::RenderPrecision,
            RenderWrite::BackgroundDrawRange { .. } => SettingField::ParticleDensity,
            RenderWrite::FrameRateLimit(_) => SettingField::FrameRateLimit,
            RenderWrite::ObjectDetail { .. } => SettingField::ObjectDetail,
            RenderWrite::UiAnimations(_) => SettingField::UiAnimations,
            RenderWrite::Textures(_) => SettingField::TextureQuality,
            RenderWrite::Background(_) => SettingField::BackgroundDetail,
        }
    }

    /// Optional pipeline stage that must exist for this write to take effect.
    pub fn required_stage(&self) -> Option<PipelineStage> {
        match self {
            RenderWrite::PostProcessing(params) if params.enabled => {
                Some(PipelineStage::PostComposer)
            }
            RenderWrite::AntiAliasing(params) if params.fxaa => Some(PipelineStage::FxaaPass),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PipelineStage {
    PostComposer,
    FxaaPass,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::PostComposer => f.write_str("post_composer"),
            PipelineStage::FxaaPass => f.write_str("fxaa_pass"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SinkError {
    #[error("optional pipeline stage {0} is not available")]
    MissingStage(PipelineStage),
    #[error("render sink rejected write: {0}")]
    Rejected(String),
}

pub trait RenderSink {
    fn write(&mut self, write: RenderWrite) -> Result<(), SinkError>;

    fn set_representation_visible(
        &mut self,
        representation: RepresentationId,
        visible: bool,
    ) -> Result<(), SinkError>;
}

impl<S: RenderSink + ?Sized> RenderSink for &mut S {
    fn write(&mut self, write: RenderWrite) -> Result<(), SinkError> {
        (**self).write(write)
    }

    fn set_representation_visible(
        &mut self,
        representation: RepresentationId,
        visible: bool,
    ) -> Result<(), SinkError> {
        (**self).set_representation_visible(representation, visible)
    }
}

/// Headless sink that keeps every write and the resulting parameter state.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    writes: Vec<RenderWrite>,
    state: BTreeMap<SettingField, RenderWrite>,
    visible: BTreeSet<RepresentationId>,
    visibility_calls: Vec<(RepresentationId, bool)>,
    missing_stages: BTreeSet<PipelineStage>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_missing_stage(mut self, stage: PipelineStage) -> Self {
        self.missing_stages.insert(stage);
        self
    }

    /// Every write attempt, including ones refused for a missing stage.
    pub fn writes(&self) -> &[RenderWrite] {
        &self.writes
    }

    pub fn write_count(&self, field: SettingField) -> usize {
        self.writes
            .iter()
            .filter(|write| write.field() == field)
            .count()
    }

    pub fn clear_log(&mut self) {
        self.writes.clear();
        self.visibility_calls.clear();
    }

    pub fn current(&self, field: SettingField) -> Option<&RenderWrite> {
        self.state.get(&field)
    }

    pub fn state(&self) -> &BTreeMap<SettingField, RenderWrite> {
        &self.state
    }

    pub fn is_visible(&self, representation: RepresentationId) -> bool {
        self.visible.contains(&representation)
    }

    pub fn visible_count(&self, representations: &[RepresentationId]) -> usize {
        representations
            .iter()
            .filter(|representation| self.visible.contains(representation))
            .count()
    }

    pub fn visibility_calls(&self) -> &[(RepresentationId, bool)] {
        &self.visibility_calls
    }
}

impl RecordingSink {
    /// Fog carried by a view distance write lands in the fog state, the way a
    /// renderer updates its scene fog.
    fn record_state(&mut self, write: RenderWrite) {
        match write {
            RenderWrite::ViewDistance(params) => {
                if let Some(fog) = params.fog {
                    self.state
                        .insert(SettingField::FogEffect, RenderWrite::Fog(fog));
                }
                let far_plane_only = ViewDistanceParams {
                    fog: None,
                    ..params
                };
                self.state.insert(
                    SettingField::ViewDistance,
                    RenderWrite::ViewDistance(far_plane_only),
                );
            }
            other => {
                self.state.insert(other.field(), other);
            }
        }
    }
}

impl RenderSink for RecordingSink {
    fn write(&mut self, write: RenderWrite) -> Result<(), SinkError> {
        self.writes.push(write);
        if let Some(stage) = write.required_stage() {
            if self.missing_stages.contains(&stage) {
                return Err(SinkError::MissingStage(stage));
            }
        }
        self.record_state(write);
        Ok(())
    }

    fn set_representation_visible(
        &mut self,
        representation: RepresentationId,
        visible: bool,
    ) -> Result<(), SinkError> {
        self.visibility_calls.push((representation, visible));
        if visible {
            self.visible.insert(representation);
        } else {
            self.visible.remove(&representation);
        }
        Ok(())
    }
}
