mod appliers;
mod reconciler;
mod sink;

pub use appliers::{
    anti_alias_params, background_draw_count, background_params, compute_write, far_plane,
    fog_params, lighting_params, post_process_params, resolution_params, shader_precision,
    shadow_params, texture_params, view_distance_params, ApplierTable, ApplyContext,
    DEFAULT_BACKGROUND_FIELD_LEN, FOG_EXP2_DENSITY, FOG_FAR_RATIO,
};
pub use reconciler::{QualityReconciler, ReconcileKind, ReconcileReport};
pub use sink::{
    AntiAliasParams, BackgroundParams, FogParams, LightingParams, PipelineStage,
    PostProcessParams, RecordingSink, RenderSink, RenderWrite, ResolutionParams, ShaderPrecision,
    ShadowFilter, ShadowParams, SinkError, TextureParams, ViewDistanceParams,
};
