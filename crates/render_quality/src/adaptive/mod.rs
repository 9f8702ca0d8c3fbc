mod dynamic;
mod tuning;

pub use dynamic::{
    AdjustmentOutcome, DynamicQualityController, LadderRung, LogOnlyUpgrade, UpgradePolicy,
};
pub use tuning::{
    QualityTuning, DEFAULT_COOLDOWN_TICKS, DEFAULT_DEGRADE_RATIO, DEFAULT_FALLBACK_TARGET_FPS,
    DEFAULT_HEADROOM_RATIO, PARTICLE_DENSITY_FLOOR, PARTICLE_DENSITY_STEP, RESOLUTION_SCALE_FLOOR,
    RESOLUTION_SCALE_STEP,
};
