use std::time::{Duration, Instant};

use tracing::debug;

use crate::adaptive::{AdjustmentOutcome, DynamicQualityController, QualityTuning};
use crate::apply::{
    ApplyContext, QualityReconciler, ReconcileReport, RenderSink, RenderWrite, SinkError,
};
use crate::lod::{LodError, LodHandle, LodLevel, LodRegistry, ObjectId, RepresentationId, Vec3};
use crate::pacing::{FpsSource, FrameRateLimiter, FrameStats};
use crate::settings::GraphicsConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub reconcile: ReconcileReport,
    pub lod_switches: usize,
    pub measured_fps: Option<f32>,
    pub adjustment: AdjustmentOutcome,
}

/// Sends frame rate limit writes to the limiter and everything else to the
/// host sink.
struct RoutedSink<'a, S: ?Sized> {
    inner: &'a mut S,
    limiter: &'a mut FrameRateLimiter,
    now: Instant,
}

impl<S: RenderSink + ?Sized> RenderSink for RoutedSink<'_, S> {
    fn write(&mut self, write: RenderWrite) -> Result<(), SinkError> {
        match write {
            RenderWrite::FrameRateLimit(cap) => {
                let fps = cap.map_or(-1, |fps| i32::try_from(fps).unwrap_or(i32::MAX));
                self.limiter.set_target_fps(fps, self.now);
                Ok(())
            }
            other => self.inner.write(other),
        }
    }

    fn set_representation_visible(
        &mut self,
        representation: RepresentationId,
        visible: bool,
    ) -> Result<(), SinkError> {
        self.inner.set_representation_visible(representation, visible)
    }
}

/// One-stop owner of the quality subsystem for a host loop.
///
/// Per tick: reconcile the host's config, update LOD for every tracked
/// object, then let the dynamic controller adjust the config for the next
/// tick. The frame rate limiter gates whether a tick happens at all.
#[derive(Debug)]
pub struct RenderQuality {
    reconciler: QualityReconciler,
    limiter: FrameRateLimiter,
    lod: LodRegistry,
    dynamic: DynamicQualityController,
    frame_stats: FrameStats,
    tuning: QualityTuning,
}

impl RenderQuality {
    pub fn new(now: Instant) -> Self {
        Self::with_tuning(QualityTuning::default(), ApplyContext::default(), now)
    }

    pub fn with_tuning(tuning: QualityTuning, context: ApplyContext, now: Instant) -> Self {
        Self {
            reconciler: QualityReconciler::new(context),
            limiter: FrameRateLimiter::new(now),
            lod: LodRegistry::new(),
            dynamic: DynamicQualityController::new(tuning),
            frame_stats: FrameStats::with_min_samples(tuning.min_fps_samples),
            tuning,
        }
    }

    pub fn with_dynamic_controller(mut self, dynamic: DynamicQualityController) -> Self {
        self.tuning = *dynamic.tuning();
        self.dynamic = dynamic;
        self
    }

    pub fn tuning(&self) -> &QualityTuning {
        &self.tuning
    }

    pub fn reconciler(&self) -> &QualityReconciler {
        &self.reconciler
    }

    pub fn set_apply_context(&mut self, context: ApplyContext) {
        self.reconciler.set_apply_context(context);
    }

    pub fn reconcile<S: RenderSink + ?Sized>(
        &mut self,
        config: &mut GraphicsConfig,
        sink: &mut S,
        now: Instant,
    ) -> ReconcileReport {
        let mut routed = RoutedSink {
            inner: sink,
            limiter: &mut self.limiter,
            now,
        };
        let report = self.reconciler.reconcile(config, &mut routed);
        if report.preset_applied().is_some() {
            self.dynamic.restart_cooldown();
        }
        report
    }

    /// Full tick using the internal frame statistics as the measured rate.
    pub fn tick<S: RenderSink + ?Sized>(
        &mut self,
        config: &mut GraphicsConfig,
        camera: Vec3,
        sink: &mut S,
        now: Instant,
    ) -> TickReport {
        let measured = self.frame_stats.smoothed_fps();
        self.tick_with_fps(config, camera, sink, now, measured)
    }

    pub fn tick_with_fps<S: RenderSink + ?Sized>(
        &mut self,
        config: &mut GraphicsConfig,
        camera: Vec3,
        sink: &mut S,
        now: Instant,
        measured_fps: Option<f32>,
    ) -> TickReport {
        let reconcile = self.reconcile(config, sink, now);
        let lod_switches = self
            .lod
            .update_all(camera, config.object_detail.lod_multiplier(), sink);

        let target = self.tuning.target_fps_for(config.frame_rate_limit.cap());
        let adjustment = match measured_fps {
            Some(fps) => self.dynamic.tick(config, fps, target),
            None if self.dynamic.is_enabled() => AdjustmentOutcome::WarmingUp,
            None => AdjustmentOutcome::Disabled,
        };
        if lod_switches > 0 {
            debug!(lod_switches, "lod_tick");
        }

        TickReport {
            reconcile,
            lod_switches,
            measured_fps,
            adjustment,
        }
    }

    pub fn register_lod(
        &mut self,
        object: ObjectId,
        position: Vec3,
        levels: Vec<LodLevel>,
    ) -> Result<LodHandle, LodError> {
        self.lod.register(object, position, levels)
    }

    pub fn unregister_lod(&mut self, handle: LodHandle) -> bool {
        self.lod.unregister(handle)
    }

    pub fn set_lod_position(&mut self, handle: LodHandle, position: Vec3) -> bool {
        self.lod.set_position(handle, position)
    }

    pub fn lod(&self) -> &LodRegistry {
        &self.lod
    }

    pub fn set_dynamic_quality_enabled(&mut self, enabled: bool) {
        self.dynamic.set_enabled(enabled);
    }

    pub fn dynamic(&self) -> &DynamicQualityController {
        &self.dynamic
    }

    pub fn limiter(&self) -> &FrameRateLimiter {
        &self.limiter
    }

    pub fn limiter_mut(&mut self) -> &mut FrameRateLimiter {
        &mut self.limiter
    }

    pub fn should_render(&mut self, now: Instant) -> bool {
        self.limiter.should_render(now)
    }

    pub fn next_frame_delay(&self, now: Instant) -> Duration {
        self.limiter.next_frame_delay(now)
    }

    pub fn record_frame(&mut self, frame_dt: Duration) {
        self.frame_stats.record_frame(frame_dt);
    }

    pub fn frame_stats(&self) -> &FrameStats {
        &self.frame_stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptive::LadderRung;
    use crate::apply::{ReconcileKind, RecordingSink};
    use crate::lod::LodEntry;
    use crate::settings::{FrameRateLimit, ObjectDetail, QualityPreset, SettingField, ShadowQuality};

    const SLOW: Option<f32> = Some(30.0);

    #[test]
    fn degradation_is_applied_by_next_tick_as_single_diff() {
        let base = Instant::now();
        let mut quality = RenderQuality::new(base);
        let mut sink = RecordingSink::new();
        let mut config = GraphicsConfig::default();

        let first = quality.tick_with_fps(&mut config, Vec3::ZERO, &mut sink, base, SLOW);
        assert_eq!(first.reconcile.kind, ReconcileKind::Initial);
        assert_eq!(
            first.adjustment,
            AdjustmentOutcome::Degraded(LadderRung::ReduceResolution)
        );
        sink.clear_log();

        let second = quality.tick_with_fps(
            &mut config,
            Vec3::ZERO,
            &mut sink,
            base + Duration::from_millis(16),
            SLOW,
        );

        assert_eq!(second.reconcile.kind, ReconcileKind::Diff);
        assert_eq!(second.reconcile.applied, vec![SettingField::ResolutionScale]);
        assert_eq!(sink.writes().len(), 1);
        assert_eq!(second.adjustment, AdjustmentOutcome::CoolingDown);
    }

    #[test]
    fn same_tick_preset_change_wins_and_rearms_cooldown() {
        let base = Instant::now();
        let mut quality = RenderQuality::new(base);
        let mut sink = RecordingSink::new();
        let mut config = GraphicsConfig::default();
        quality.tick_with_fps(&mut config, Vec3::ZERO, &mut sink, base, SLOW);
        assert_eq!(config.preset, QualityPreset::Custom);

        config.preset = QualityPreset::Low;
        let report = quality.tick_with_fps(
            &mut config,
            Vec3::ZERO,
            &mut sink,
            base + Duration::from_millis(16),
            SLOW,
        );

        assert_eq!(report.reconcile.preset_applied(), Some(QualityPreset::Low));
        assert_eq!(report.adjustment, AdjustmentOutcome::CoolingDown);
        assert_eq!(Some(config), GraphicsConfig::for_preset(QualityPreset::Low));
        assert_eq!(
            quality.dynamic().cooldown_ticks(),
            quality.tuning().cooldown_ticks - 1
        );
        assert_eq!(
            quality.dynamic().next_rung(&config),
            Some(LadderRung::ReduceResolution)
        );
    }

    #[test]
    fn hand_restored_fields_bring_an_exhausted_ladder_back() {
        let base = Instant::now();
        let tuning = QualityTuning {
            cooldown_ticks: 0,
            ..QualityTuning::default()
        };
        let mut quality = RenderQuality::with_tuning(tuning, ApplyContext::default(), base);
        let mut sink = RecordingSink::new();
        let mut config = GraphicsConfig::default();
        let slow = Some(20.0);
        for _ in 0..10 {
            quality.tick_with_fps(&mut config, Vec3::ZERO, &mut sink, base, slow);
        }
        assert_eq!(quality.dynamic().next_rung(&config), None);

        config.resolution_scale = 1.0;
        config.shadow_quality = ShadowQuality::High;
        config.particle_density = 1.0;
        let report = quality.tick_with_fps(&mut config, Vec3::ZERO, &mut sink, base, slow);

        assert_eq!(report.reconcile.kind, ReconcileKind::Diff);
        assert_eq!(
            report.adjustment,
            AdjustmentOutcome::Degraded(LadderRung::ReduceResolution)
        );
        assert_eq!(config.resolution_scale, 0.75);
        assert_eq!(config.shadow_quality, ShadowQuality::High);
        assert_eq!(config.particle_density, 1.0);
    }

    #[test]
    fn frame_rate_limit_is_routed_to_the_limiter() {
        let base = Instant::now();
        let mut quality = RenderQuality::new(base);
        let mut sink = RecordingSink::new();
        let mut config = GraphicsConfig::default();

        quality.reconcile(&mut config, &mut sink, base);
        assert_eq!(quality.limiter().target_fps(), Some(60));
        assert_eq!(sink.write_count(SettingField::FrameRateLimit), 0);

        config.frame_rate_limit = FrameRateLimit::Unlimited;
        quality.reconcile(&mut config, &mut sink, base + Duration::from_secs(1));
        assert_eq!(quality.limiter().target_fps(), None);
        assert!(quality.should_render(base + Duration::from_secs(1)));
    }

    #[test]
    fn limit_change_resets_limiter_reference_to_tick_time() {
        let base = Instant::now();
        let mut quality = RenderQuality::new(base);
        let mut sink = RecordingSink::new();
        let mut config = GraphicsConfig::default();
        quality.reconcile(&mut config, &mut sink, base);

        let later = base + Duration::from_secs(3);
        config.frame_rate_limit = FrameRateLimit::Capped(30);
        quality.reconcile(&mut config, &mut sink, later);

        assert_eq!(quality.limiter().last_frame(), later);
        assert_eq!(
            quality.next_frame_delay(later),
            Duration::from_nanos(33_333_333)
        );
    }

    #[test]
    fn lod_update_follows_object_detail_multiplier() {
        let base = Instant::now();
        let mut quality = RenderQuality::new(base);
        let mut sink = RecordingSink::new();
        let mut config = GraphicsConfig::default();
        let levels = vec![
            LodLevel::new(0.0, RepresentationId(0)),
            LodLevel::new(500.0, RepresentationId(1)),
            LodLevel::new(2000.0, RepresentationId(2)),
        ];
        let handle = quality
            .register_lod(ObjectId(9), Vec3::new(600.0, 0.0, 0.0), levels)
            .expect("valid levels");

        quality.tick_with_fps(&mut config, Vec3::ZERO, &mut sink, base, None);
        assert_eq!(quality.lod().get(handle).and_then(LodEntry::current_level), Some(0));

        config.object_detail = ObjectDetail::Low;
        let report = quality.tick_with_fps(&mut config, Vec3::ZERO, &mut sink, base, None);

        assert_eq!(report.lod_switches, 1);
        assert_eq!(quality.lod().get(handle).and_then(LodEntry::current_level), Some(1));
        assert!(sink.is_visible(RepresentationId(1)));
        assert!(!sink.is_visible(RepresentationId(0)));
    }

    #[test]
    fn tick_waits_for_enough_frame_samples() {
        let base = Instant::now();
        let mut quality = RenderQuality::new(base);
        let mut sink = RecordingSink::new();
        let mut config = GraphicsConfig::default();

        let report = quality.tick(&mut config, Vec3::ZERO, &mut sink, base);
        assert_eq!(report.adjustment, AdjustmentOutcome::WarmingUp);

        for _ in 0..quality.tuning().min_fps_samples {
            quality.record_frame(Duration::from_millis(33));
        }
        let report = quality.tick(&mut config, Vec3::ZERO, &mut sink, base);

        assert_eq!(
            report.adjustment,
            AdjustmentOutcome::Degraded(LadderRung::ReduceResolution)
        );
        assert!(report.measured_fps.is_some_and(|fps| fps < 31.0));
    }

    #[test]
    fn disabled_dynamic_quality_never_touches_config() {
        let base = Instant::now();
        let mut quality = RenderQuality::new(base);
        quality.set_dynamic_quality_enabled(false);
        let mut sink = RecordingSink::new();
        let mut config = GraphicsConfig::default();

        let warming = quality.tick(&mut config, Vec3::ZERO, &mut sink, base);
        let report = quality.tick_with_fps(&mut config, Vec3::ZERO, &mut sink, base, SLOW);

        assert_eq!(warming.adjustment, AdjustmentOutcome::Disabled);
        assert_eq!(report.adjustment, AdjustmentOutcome::Disabled);
        assert_eq!(config, GraphicsConfig::default());
    }

    #[test]
    fn unregistered_lod_is_ignored_by_ticks() {
        let base = Instant::now();
        let mut quality = RenderQuality::new(base);
        let mut sink = RecordingSink::new();
        let mut config = GraphicsConfig::default();
        let handle = quality
            .register_lod(
                ObjectId(1),
                Vec3::ZERO,
                vec![LodLevel::new(0.0, RepresentationId(5))],
            )
            .expect("valid levels");

        assert!(quality.unregister_lod(handle));
        let report = quality.tick_with_fps(&mut config, Vec3::ZERO, &mut sink, base, None);

        assert_eq!(report.lod_switches, 0);
        assert!(sink.visibility_calls().is_empty());
        assert!(!quality.set_lod_position(handle, Vec3::ZERO));
    }
}
