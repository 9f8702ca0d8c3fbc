mod config;
mod lenient;
mod preset;

pub use config::{
    AntiAliasing, BackgroundDetail, FogEffect, FrameRateLimit, GraphicsConfig, LightingQuality,
    ObjectDetail, PostProcessing, QualityPreset, RenderPrecision, SettingField, SettingValue,
    ShadowQuality, TextureQuality, ViewDistance, DEFAULT_FRAME_RATE_LIMIT_FPS,
    RESOLUTION_SCALE_MAX, RESOLUTION_SCALE_MIN,
};
