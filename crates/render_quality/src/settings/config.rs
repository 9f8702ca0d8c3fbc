use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::lenient::{resolve_frame_rate_limit, resolve_setting, RawFrameRateLimit, RawSetting};

pub const RESOLUTION_SCALE_MIN: f32 = 0.25;
pub const RESOLUTION_SCALE_MAX: f32 = 3.0;
pub const DEFAULT_FRAME_RATE_LIMIT_FPS: u32 = 60;

/// Closed set of values for one graphics setting.
///
/// `Default` is the documented fallback used when a persisted value is not
/// recognized.
pub trait SettingValue: Copy + Default + 'static {
    const KIND: &'static str;
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn parse(text: &str) -> Option<Self> {
        let needle = text.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|value| value.as_str().eq_ignore_ascii_case(needle))
    }
}

macro_rules! setting_enum {
    ($name:ident, default = $default:ident, { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl SettingValue for $name {
            const KIND: &'static str = stringify!($name);
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawSetting::deserialize(deserializer).map(resolve_setting)
            }
        }
    };
}

// An unrecognized preset name falls back to `custom` so the stored fields are
// kept instead of being overwritten by a tier table.
setting_enum!(QualityPreset, default = Custom, {
    Low => "low",
    Medium => "medium",
    High => "high",
    Ultra => "ultra",
    Custom => "custom",
});

setting_enum!(ShadowQuality, default = Medium, {
    Off => "off",
    Low => "low",
    Medium => "medium",
    High => "high",
    Ultra => "ultra",
});

setting_enum!(AntiAliasing, default = Fxaa, {
    Off => "off",
    Fxaa => "fxaa",
    Msaa2x => "msaa2x",
    Msaa4x => "msaa4x",
    Msaa8x => "msaa8x",
});

setting_enum!(PostProcessing, default = Low, {
    Off => "off",
    Low => "low",
    Medium => "medium",
    High => "high",
});

setting_enum!(ViewDistance, default = Medium, {
    Minimal => "minimal",
    Near => "near",
    Medium => "medium",
    Far => "far",
    Unlimited => "unlimited",
});

setting_enum!(LightingQuality, default = Medium, {
    Low => "low",
    Medium => "medium",
    High => "high",
    Ultra => "ultra",
});

setting_enum!(FogEffect, default = Standard, {
    Off => "off",
    Simple => "simple",
    Standard => "standard",
    High => "high",
});

setting_enum!(RenderPrecision, default = High, {
    Low => "low",
    Medium => "medium",
    High => "high",
});

setting_enum!(ObjectDetail, default = Medium, {
    Low => "low",
    Medium => "medium",
    High => "high",
    Ultra => "ultra",
});

setting_enum!(TextureQuality, default = Medium, {
    Low => "low",
    Medium => "medium",
    High => "high",
    Ultra => "ultra",
});

setting_enum!(BackgroundDetail, default = Medium, {
    Low => "low",
    Medium => "medium",
    High => "high",
});

impl QualityPreset {
    pub const NAMED: [QualityPreset; 4] = [
        QualityPreset::Low,
        QualityPreset::Medium,
        QualityPreset::High,
        QualityPreset::Ultra,
    ];

    pub fn is_named(self) -> bool {
        self != QualityPreset::Custom
    }
}

impl FogEffect {
    pub fn is_linear(self) -> bool {
        matches!(self, FogEffect::Simple | FogEffect::Standard)
    }
}

impl ObjectDetail {
    pub fn lod_multiplier(self) -> f32 {
        match self {
            ObjectDetail::Low => 0.7,
            ObjectDetail::Medium => 1.0,
            ObjectDetail::High => 1.5,
            ObjectDetail::Ultra => 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameRateLimit {
    Capped(u32),
    Unlimited,
}

impl Default for FrameRateLimit {
    fn default() -> Self {
        FrameRateLimit::Capped(DEFAULT_FRAME_RATE_LIMIT_FPS)
    }
}

impl FrameRateLimit {
    pub const UNLIMITED_SENTINEL: i32 = -1;

    pub fn from_fps(fps: i64) -> Self {
        if fps <= 0 {
            FrameRateLimit::Unlimited
        } else {
            FrameRateLimit::Capped(u32::try_from(fps).unwrap_or(u32::MAX))
        }
    }

    pub fn cap(self) -> Option<u32> {
        match self {
            FrameRateLimit::Capped(fps) if fps > 0 => Some(fps),
            _ => None,
        }
    }

    /// Target rate in the limiter's convention: values `<= 0` mean unlimited.
    pub fn target_fps(self) -> i32 {
        match self.cap() {
            Some(fps) => i32::try_from(fps).unwrap_or(i32::MAX),
            None => Self::UNLIMITED_SENTINEL,
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.eq_ignore_ascii_case("unlimited") {
            return Some(FrameRateLimit::Unlimited);
        }
        trimmed.parse::<i64>().ok().map(Self::from_fps)
    }
}

impl fmt::Display for FrameRateLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cap() {
            Some(fps) => write!(f, "{fps}"),
            None => f.write_str("unlimited"),
        }
    }
}

impl Serialize for FrameRateLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.cap() {
            Some(fps) => serializer.serialize_u32(fps),
            None => serializer.serialize_str("unlimited"),
        }
    }
}

impl<'de> Deserialize<'de> for FrameRateLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawFrameRateLimit::deserialize(deserializer).map(resolve_frame_rate_limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphicsConfig {
    pub preset: QualityPreset,
    pub resolution_scale: f32,
    pub shadow_quality: ShadowQuality,
    pub anti_aliasing: AntiAliasing,
    pub post_processing: PostProcessing,
    pub view_distance: ViewDistance,
    pub lighting_quality: LightingQuality,
    pub fog_effect: FogEffect,
    pub render_precision: RenderPrecision,
    pub particle_density: f32,
    pub frame_rate_limit: FrameRateLimit,
    pub object_detail: ObjectDetail,
    pub ui_animations: bool,
    pub texture_quality: TextureQuality,
    pub background_detail: BackgroundDetail,
}

/// One configuration dimension that owns an applier.
///
/// `preset` has no applier: it selects a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingField {
    ResolutionScale,
    ShadowQuality,
    AntiAliasing,
    PostProcessing,
    ViewDistance,
    LightingQuality,
    FogEffect,
    RenderPrecision,
    ParticleDensity,
    FrameRateLimit,
    ObjectDetail,
    UiAnimations,
    TextureQuality,
    BackgroundDetail,
}

impl SettingField {
    pub const ALL: [SettingField; 14] = [
        SettingField::ResolutionScale,
        SettingField::ShadowQuality,
        SettingField::AntiAliasing,
        SettingField::PostProcessing,
        SettingField::ViewDistance,
        SettingField::LightingQuality,
        SettingField::FogEffect,
        SettingField::RenderPrecision,
        SettingField::ParticleDensity,
        SettingField::FrameRateLimit,
        SettingField::ObjectDetail,
        SettingField::UiAnimations,
        SettingField::TextureQuality,
        SettingField::BackgroundDetail,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingField::ResolutionScale => "resolutionScale",
            SettingField::ShadowQuality => "shadowQuality",
            SettingField::AntiAliasing => "antiAliasing",
            SettingField::PostProcessing => "postProcessing",
            SettingField::ViewDistance => "viewDistance",
            SettingField::LightingQuality => "lightingQuality",
            SettingField::FogEffect => "fogEffect",
            SettingField::RenderPrecision => "renderPrecision",
            SettingField::ParticleDensity => "particleDensity",
            SettingField::FrameRateLimit => "frameRateLimit",
            SettingField::ObjectDetail => "objectDetail",
            SettingField::UiAnimations => "uiAnimations",
            SettingField::TextureQuality => "textureQuality",
            SettingField::BackgroundDetail => "backgroundDetail",
        }
    }
}

impl fmt::Display for SettingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GraphicsConfig {
    /// Float fields compare by bit pattern so a stored NaN does not read as a
    /// change on every pass.
    pub fn differs_in(&self, other: &Self, field: SettingField) -> bool {
        match field {
            SettingField::ResolutionScale => {
                self.resolution_scale.to_bits() != other.resolution_scale.to_bits()
            }
            SettingField::ShadowQuality => self.shadow_quality != other.shadow_quality,
            SettingField::AntiAliasing => self.anti_aliasing != other.anti_aliasing,
            SettingField::PostProcessing => self.post_processing != other.post_processing,
            SettingField::ViewDistance => self.view_distance != other.view_distance,
            SettingField::LightingQuality => self.lighting_quality != other.lighting_quality,
            SettingField::FogEffect => self.fog_effect != other.fog_effect,
            SettingField::RenderPrecision => self.render_precision != other.render_precision,
            SettingField::ParticleDensity => {
                self.particle_density.to_bits() != other.particle_density.to_bits()
            }
            SettingField::FrameRateLimit => self.frame_rate_limit != other.frame_rate_limit,
            SettingField::ObjectDetail => self.object_detail != other.object_detail,
            SettingField::UiAnimations => self.ui_animations != other.ui_animations,
            SettingField::TextureQuality => self.texture_quality != other.texture_quality,
            SettingField::BackgroundDetail => self.background_detail != other.background_detail,
        }
    }

    pub fn changed_fields(&self, previous: &Self) -> Vec<SettingField> {
        SettingField::ALL
            .iter()
            .copied()
            .filter(|field| self.differs_in(previous, *field))
            .collect()
    }

    pub fn same_fields_as(&self, other: &Self) -> bool {
        SettingField::ALL
            .iter()
            .all(|field| !self.differs_in(other, *field))
    }
}
