use std::time::{Duration, Instant};

use render_quality::{
    AdjustmentOutcome, ApplyContext, GraphicsConfig, LodError, LodHandle, LodLevel, ObjectId,
    QualityTuning, RenderQuality, RepresentationId, Vec3,
};
use thiserror::Error;
use tracing::{debug, info};

use super::cli::CliError;
use super::cost_model::frame_cost;
use super::settings_store::SettingsError;
use super::sink::TracingSink;

pub(crate) const DEFAULT_LOD_BODIES: usize = 12;
pub(crate) const DEFAULT_SUMMARY_INTERVAL_FRAMES: u64 = 300;

const BODY_RING_RADIUS: f32 = 300.0;
const CAMERA_MIN_DISTANCE: f32 = 200.0;
const CAMERA_SWING: f32 = 2_600.0;
const CAMERA_RADIANS_PER_FRAME: f32 = 0.01;
const LOD_THRESHOLDS: [f32; 3] = [0.0, 500.0, 2_000.0];
const MIN_POLL_STEP: Duration = Duration::from_micros(100);

#[derive(Debug, Error)]
pub(crate) enum SimError {
    #[error(transparent)]
    Cli(#[from] CliError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("failed to register LOD body: {0}")]
    Lod(#[from] LodError),
}

#[derive(Debug, Clone)]
pub(crate) struct SimConfig {
    pub(crate) frames: u64,
    pub(crate) dynamic_quality: bool,
    pub(crate) post_stage: bool,
    pub(crate) slow_frame: Duration,
    pub(crate) lod_bodies: usize,
    pub(crate) summary_interval_frames: u64,
    pub(crate) tuning: QualityTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            frames: 1_800,
            dynamic_quality: true,
            post_stage: true,
            slow_frame: Duration::ZERO,
            lod_bodies: DEFAULT_LOD_BODIES,
            summary_interval_frames: DEFAULT_SUMMARY_INTERVAL_FRAMES,
            tuning: QualityTuning::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SimSummary {
    pub(crate) frames_rendered: u64,
    pub(crate) polls_declined: u64,
    pub(crate) degradations: u32,
    pub(crate) lod_switches: u64,
    pub(crate) sink_writes: u64,
    pub(crate) visible_representations: usize,
    pub(crate) simulated: Duration,
    pub(crate) final_fps: f32,
}

/// Drives the quality subsystem on a virtual clock: the limiter gates each
/// poll, rendered frames advance time by their modeled cost, declined polls
/// advance it by the limiter's delay hint.
pub(crate) fn run_simulation(
    config: &mut GraphicsConfig,
    sim: &SimConfig,
) -> Result<SimSummary, SimError> {
    let start = Instant::now();
    let mut quality = RenderQuality::with_tuning(sim.tuning, ApplyContext::default(), start);
    quality.set_dynamic_quality_enabled(sim.dynamic_quality);
    let mut sink = TracingSink::new(sim.post_stage);
    let bodies = register_bodies(&mut quality, sim.lod_bodies)?;
    debug!(bodies = bodies.len(), "lod_bodies_registered");

    let mut summary = SimSummary::default();
    let mut now = start;
    let mut last_frame_at: Option<Instant> = None;
    while summary.frames_rendered < sim.frames {
        if !quality.should_render(now) {
            summary.polls_declined = summary.polls_declined.saturating_add(1);
            now += quality.next_frame_delay(now).max(MIN_POLL_STEP);
            continue;
        }

        if let Some(previous) = last_frame_at {
            quality.record_frame(now.saturating_duration_since(previous));
        }
        last_frame_at = Some(now);

        let camera = camera_position(summary.frames_rendered);
        let report = quality.tick(config, camera, &mut sink, now);
        if matches!(report.adjustment, AdjustmentOutcome::Degraded(_)) {
            summary.degradations = summary.degradations.saturating_add(1);
        }
        summary.lod_switches = summary
            .lod_switches
            .saturating_add(report.lod_switches as u64);
        summary.frames_rendered += 1;

        if sim.summary_interval_frames > 0
            && summary.frames_rendered % sim.summary_interval_frames == 0
        {
            let stats = quality.frame_stats().snapshot();
            info!(
                frame = summary.frames_rendered,
                fps = stats.fps,
                avg_ms = stats.avg_ms,
                max_ms = stats.max_ms,
                preset = %config.preset,
                resolution_scale = config.resolution_scale,
                shadows = %config.shadow_quality,
                particle_density = config.particle_density,
                "sim_progress"
            );
        }

        now += frame_cost(config, sim.slow_frame);
    }

    summary.sink_writes = sink.write_count();
    summary.visible_representations = sink.visible_count();
    summary.simulated = now.saturating_duration_since(start);
    summary.final_fps = quality.frame_stats().snapshot().fps;
    info!(
        frames = summary.frames_rendered,
        polls_declined = summary.polls_declined,
        degradations = summary.degradations,
        lod_switches = summary.lod_switches,
        sink_writes = summary.sink_writes,
        simulated_ms = summary.simulated.as_millis() as u64,
        final_fps = summary.final_fps,
        preset = %config.preset,
        "sim_finished"
    );
    Ok(summary)
}

fn register_bodies(quality: &mut RenderQuality, count: usize) -> Result<Vec<LodHandle>, LodError> {
    let mut handles = Vec::with_capacity(count);
    for body in 0..count {
        let angle = body as f32 / count.max(1) as f32 * std::f32::consts::TAU;
        let position = Vec3::new(
            angle.cos() * BODY_RING_RADIUS,
            0.0,
            angle.sin() * BODY_RING_RADIUS,
        );
        let base = body as u64 * LOD_THRESHOLDS.len() as u64;
        let levels = LOD_THRESHOLDS
            .iter()
            .enumerate()
            .map(|(level, threshold)| {
                LodLevel::new(*threshold, RepresentationId(base + level as u64))
            })
            .collect();
        handles.push(quality.register_lod(ObjectId(body as u64), position, levels)?);
    }
    Ok(handles)
}

/// Camera sweeps in and out along a slow orbit so bodies cross every level.
fn camera_position(frame: u64) -> Vec3 {
    let phase = frame as f32 * CAMERA_RADIANS_PER_FRAME;
    let distance = CAMERA_MIN_DISTANCE + CAMERA_SWING * (0.5 + 0.5 * (phase * 0.5).sin());
    Vec3::new(phase.cos() * distance, 150.0, phase.sin() * distance)
}

#[cfg(test)]
mod tests {
    use render_quality::settings::QualityPreset;

    use super::*;

    fn sim(frames: u64) -> SimConfig {
        SimConfig {
            frames,
            summary_interval_frames: 0,
            ..SimConfig::default()
        }
    }

    #[test]
    fn slow_high_tier_degrades_and_marks_custom() {
        let mut config = GraphicsConfig::default();

        let summary = run_simulation(&mut config, &sim(600)).expect("simulation");

        assert_eq!(summary.frames_rendered, 600);
        assert!(summary.degradations >= 1);
        assert!(config.resolution_scale < 1.0);
        assert_eq!(config.preset, QualityPreset::Custom);
    }

    #[test]
    fn disabled_dynamic_quality_keeps_config() {
        let mut config = GraphicsConfig::default();
        let options = SimConfig {
            dynamic_quality: false,
            ..sim(400)
        };

        let summary = run_simulation(&mut config, &options).expect("simulation");

        assert_eq!(summary.degradations, 0);
        assert_eq!(config, GraphicsConfig::default());
    }

    #[test]
    fn cheap_frames_are_paced_by_the_limiter() {
        let mut config = GraphicsConfig::for_preset(QualityPreset::Low).expect("tier");

        let summary = run_simulation(&mut config, &sim(150)).expect("simulation");

        assert!(summary.polls_declined > 0);
        assert!(
            (29.5..=30.5).contains(&summary.final_fps),
            "fps {}",
            summary.final_fps
        );
        assert_eq!(summary.degradations, 0);
    }

    #[test]
    fn every_body_shows_exactly_one_representation() {
        let mut config = GraphicsConfig::default();

        let summary = run_simulation(&mut config, &sim(200)).expect("simulation");

        assert_eq!(summary.visible_representations, DEFAULT_LOD_BODIES);
        assert!(summary.lod_switches >= DEFAULT_LOD_BODIES as u64);
    }

    #[test]
    fn missing_post_stage_does_not_stop_the_loop() {
        let mut config = GraphicsConfig::default();
        let options = SimConfig {
            post_stage: false,
            ..sim(60)
        };

        let summary = run_simulation(&mut config, &options).expect("simulation");

        assert_eq!(summary.frames_rendered, 60);
    }
}
