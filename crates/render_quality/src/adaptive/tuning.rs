use serde::{Deserialize, Serialize};

use crate::pacing::DEFAULT_MIN_FPS_SAMPLES;

pub const DEFAULT_COOLDOWN_TICKS: u32 = 300;
pub const DEFAULT_DEGRADE_RATIO: f32 = 0.8;
pub const DEFAULT_HEADROOM_RATIO: f32 = 1.2;
pub const DEFAULT_FALLBACK_TARGET_FPS: f32 = 60.0;
pub const RESOLUTION_SCALE_STEP: f32 = 0.25;
pub const RESOLUTION_SCALE_FLOOR: f32 = 0.5;
pub const PARTICLE_DENSITY_STEP: f32 = 0.25;
pub const PARTICLE_DENSITY_FLOOR: f32 = 0.1;

/// Knobs for the dynamic quality feedback loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QualityTuning {
    /// Ticks that must pass after an adjustment before the next one.
    pub cooldown_ticks: u32,
    pub degrade_ratio: f32,
    pub headroom_ratio: f32,
    /// Target used when the frame rate limit is `unlimited`.
    pub fallback_target_fps: f32,
    pub min_fps_samples: usize,
    pub resolution_step: f32,
    pub resolution_floor: f32,
    pub particle_step: f32,
    pub particle_floor: f32,
}

impl Default for QualityTuning {
    fn default() -> Self {
        Self {
            cooldown_ticks: DEFAULT_COOLDOWN_TICKS,
            degrade_ratio: DEFAULT_DEGRADE_RATIO,
            headroom_ratio: DEFAULT_HEADROOM_RATIO,
            fallback_target_fps: DEFAULT_FALLBACK_TARGET_FPS,
            min_fps_samples: DEFAULT_MIN_FPS_SAMPLES,
            resolution_step: RESOLUTION_SCALE_STEP,
            resolution_floor: RESOLUTION_SCALE_FLOOR,
            particle_step: PARTICLE_DENSITY_STEP,
            particle_floor: PARTICLE_DENSITY_FLOOR,
        }
    }
}

impl QualityTuning {
    /// Target frame rate for a configured cap, falling back when uncapped.
    pub fn target_fps_for(&self, cap: Option<u32>) -> f32 {
        match cap {
            Some(fps) => fps as f32,
            None => self.fallback_target_fps,
        }
    }
}
