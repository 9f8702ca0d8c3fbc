pub mod adaptive;
pub mod apply;
pub mod lod;
pub mod pacing;
mod runtime;
pub mod settings;

pub use adaptive::{
    AdjustmentOutcome, DynamicQualityController, LadderRung, LogOnlyUpgrade, QualityTuning,
    UpgradePolicy,
};
pub use apply::{
    ApplyContext, PipelineStage, QualityReconciler, ReconcileKind, ReconcileReport,
    RecordingSink, RenderSink, RenderWrite, SinkError,
};
pub use lod::{LodError, LodHandle, LodLevel, LodRegistry, ObjectId, RepresentationId, Vec3};
pub use pacing::{FpsSource, FrameRateLimiter, FrameStats, FrameTimeSnapshot, LimiterState};
pub use runtime::{RenderQuality, TickReport};
pub use settings::{FrameRateLimit, GraphicsConfig, QualityPreset, SettingField};
