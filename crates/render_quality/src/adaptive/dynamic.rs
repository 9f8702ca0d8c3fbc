use std::fmt;

use tracing::{debug, info};

use crate::settings::{GraphicsConfig, QualityPreset, ShadowQuality};

use super::tuning::QualityTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LadderRung {
    ReduceResolution,
    DisableShadows,
    ReduceParticles,
}

impl LadderRung {
    pub const ALL: [LadderRung; 3] = [
        LadderRung::ReduceResolution,
        LadderRung::DisableShadows,
        LadderRung::ReduceParticles,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LadderRung::ReduceResolution => "reduce_resolution",
            LadderRung::DisableShadows => "disable_shadows",
            LadderRung::ReduceParticles => "reduce_particles",
        }
    }

    fn can_act(self, config: &GraphicsConfig, tuning: &QualityTuning) -> bool {
        match self {
            LadderRung::ReduceResolution => config.resolution_scale > tuning.resolution_floor,
            LadderRung::DisableShadows => config.shadow_quality != ShadowQuality::Off,
            LadderRung::ReduceParticles => config.particle_density > tuning.particle_floor,
        }
    }

    fn act(self, config: &mut GraphicsConfig, tuning: &QualityTuning) {
        match self {
            LadderRung::ReduceResolution => {
                config.resolution_scale =
                    (config.resolution_scale - tuning.resolution_step).max(tuning.resolution_floor);
            }
            LadderRung::DisableShadows => config.shadow_quality = ShadowQuality::Off,
            LadderRung::ReduceParticles => {
                config.particle_density =
                    (config.particle_density - tuning.particle_step).max(tuning.particle_floor);
            }
        }
    }
}

impl fmt::Display for LadderRung {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentOutcome {
    Disabled,
    /// No trustworthy frame rate measurement yet.
    WarmingUp,
    CoolingDown,
    Degraded(LadderRung),
    LadderExhausted,
    HeadroomAvailable,
    Upgraded,
    Steady,
}

/// Decides what to do when measured frame rate comfortably exceeds target.
/// Returns `true` when it changed `config`.
pub trait UpgradePolicy: fmt::Debug + Send {
    fn on_headroom(
        &mut self,
        config: &mut GraphicsConfig,
        measured_fps: f32,
        target_fps: f32,
    ) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnlyUpgrade;

impl UpgradePolicy for LogOnlyUpgrade {
    fn on_headroom(
        &mut self,
        _config: &mut GraphicsConfig,
        measured_fps: f32,
        target_fps: f32,
    ) -> bool {
        debug!(measured_fps, target_fps, "quality_headroom_available");
        false
    }
}

#[derive(Debug)]
pub struct DynamicQualityController {
    tuning: QualityTuning,
    enabled: bool,
    cooldown_ticks: u32,
    upgrade_policy: Box<dyn UpgradePolicy>,
}

impl Default for DynamicQualityController {
    fn default() -> Self {
        Self::new(QualityTuning::default())
    }
}

impl DynamicQualityController {
    pub fn new(tuning: QualityTuning) -> Self {
        Self {
            tuning,
            enabled: true,
            cooldown_ticks: 0,
            upgrade_policy: Box::new(LogOnlyUpgrade),
        }
    }

    pub fn with_upgrade_policy(mut self, policy: impl UpgradePolicy + 'static) -> Self {
        self.upgrade_policy = Box::new(policy);
        self
    }

    pub fn tuning(&self) -> &QualityTuning {
        &self.tuning
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            info!(enabled, "dynamic_quality_toggled");
        }
        self.enabled = enabled;
    }

    pub fn cooldown_ticks(&self) -> u32 {
        self.cooldown_ticks
    }

    /// First rung that can still act on `config`, or `None` once every
    /// ladder field sits at its floor.
    pub fn next_rung(&self, config: &GraphicsConfig) -> Option<LadderRung> {
        LadderRung::ALL
            .into_iter()
            .find(|rung| rung.can_act(config, &self.tuning))
    }

    /// Holds off adjustments for a full window.
    pub fn restart_cooldown(&mut self) {
        self.cooldown_ticks = self.tuning.cooldown_ticks;
        debug!(cooldown = self.cooldown_ticks, "quality_cooldown_restarted");
    }

    pub fn tick(
        &mut self,
        config: &mut GraphicsConfig,
        measured_fps: f32,
        target_fps: f32,
    ) -> AdjustmentOutcome {
        if !self.enabled {
            return AdjustmentOutcome::Disabled;
        }
        if self.cooldown_ticks > 0 {
            self.cooldown_ticks -= 1;
            return AdjustmentOutcome::CoolingDown;
        }
        if !target_fps.is_finite() || target_fps <= 0.0 || !measured_fps.is_finite() {
            return AdjustmentOutcome::Steady;
        }

        if measured_fps < target_fps * self.tuning.degrade_ratio {
            return self.degrade(config, measured_fps, target_fps);
        }

        if measured_fps > target_fps * self.tuning.headroom_ratio {
            if self
                .upgrade_policy
                .on_headroom(config, measured_fps, target_fps)
            {
                self.mark_adjusted(config);
                info!(measured_fps, target_fps, "quality_upgraded");
                return AdjustmentOutcome::Upgraded;
            }
            return AdjustmentOutcome::HeadroomAvailable;
        }

        AdjustmentOutcome::Steady
    }

    fn degrade(
        &mut self,
        config: &mut GraphicsConfig,
        measured_fps: f32,
        target_fps: f32,
    ) -> AdjustmentOutcome {
        let Some(rung) = self.next_rung(config) else {
            debug!(measured_fps, target_fps, "quality_ladder_exhausted");
            return AdjustmentOutcome::LadderExhausted;
        };

        rung.act(config, &self.tuning);
        self.mark_adjusted(config);
        info!(
            rung = %rung,
            measured_fps,
            target_fps,
            resolution_scale = config.resolution_scale,
            particle_density = config.particle_density,
            "quality_degraded"
        );
        AdjustmentOutcome::Degraded(rung)
    }

    fn mark_adjusted(&mut self, config: &mut GraphicsConfig) {
        config.preset = QualityPreset::Custom;
        self.cooldown_ticks = self.tuning.cooldown_ticks;
    }
}
