use std::time::{Duration, Instant};

use tracing::{debug, info};

pub const DEFAULT_DIAGNOSTICS_INTERVAL_FRAMES: u64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimiterState {
    Unlimited,
    Limited { target_fps: u32, interval: Duration },
}

/// Answers "render this tick?" for a target rate without ever sleeping.
///
/// When a frame is due, the reference timestamp advances by whole intervals
/// (`now - elapsed % interval`) so overshoot carries into the next frame
/// instead of accumulating as drift.
#[derive(Debug, Clone)]
pub struct FrameRateLimiter {
    state: LimiterState,
    last_frame: Instant,
    frame_counter: u64,
    diagnostics_interval: u64,
}

impl FrameRateLimiter {
    pub fn new(now: Instant) -> Self {
        Self {
            state: LimiterState::Unlimited,
            last_frame: now,
            frame_counter: 0,
            diagnostics_interval: DEFAULT_DIAGNOSTICS_INTERVAL_FRAMES,
        }
    }

    pub fn with_target_fps(fps: i32, now: Instant) -> Self {
        let mut limiter = Self::new(now);
        limiter.set_target_fps(fps, now);
        limiter
    }

    /// `0` disables the periodic diagnostics event.
    pub fn set_diagnostics_interval(&mut self, frames: u64) {
        self.diagnostics_interval = frames;
    }

    pub fn state(&self) -> LimiterState {
        self.state
    }

    pub fn target_fps(&self) -> Option<u32> {
        match self.state {
            LimiterState::Limited { target_fps, .. } => Some(target_fps),
            LimiterState::Unlimited => None,
        }
    }

    pub fn frame_interval(&self) -> Option<Duration> {
        match self.state {
            LimiterState::Limited { interval, .. } => Some(interval),
            LimiterState::Unlimited => None,
        }
    }

    pub fn last_frame(&self) -> Instant {
        self.last_frame
    }

    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    pub fn set_target_fps(&mut self, fps: i32, now: Instant) {
        self.state = match u32::try_from(fps) {
            Ok(target_fps) if target_fps > 0 => LimiterState::Limited {
                target_fps,
                interval: frame_interval_for(target_fps),
            },
            _ => LimiterState::Unlimited,
        };
        self.last_frame = now;
        info!(target = %format_target(self.state), "frame_limit_changed");
    }

    pub fn should_render(&mut self, now: Instant) -> bool {
        match self.state {
            LimiterState::Unlimited => {
                self.last_frame = now;
                self.count_frame();
                true
            }
            LimiterState::Limited { interval, .. } => {
                let elapsed = now.saturating_duration_since(self.last_frame);
                if elapsed < interval {
                    return false;
                }
                let overshoot = duration_rem(elapsed, interval);
                self.last_frame = now.checked_sub(overshoot).unwrap_or(now);
                self.count_frame();
                true
            }
        }
    }

    /// Hint for hosts that would rather sleep than poll.
    pub fn next_frame_delay(&self, now: Instant) -> Duration {
        match self.state {
            LimiterState::Unlimited => Duration::ZERO,
            LimiterState::Limited { interval, .. } => {
                interval.saturating_sub(now.saturating_duration_since(self.last_frame))
            }
        }
    }

    fn count_frame(&mut self) {
        self.frame_counter = self.frame_counter.wrapping_add(1);
        if self.diagnostics_interval > 0 && self.frame_counter % self.diagnostics_interval == 0 {
            debug!(
                frames = self.frame_counter,
                target = %format_target(self.state),
                "frame_limiter_diagnostics"
            );
        }
    }
}

fn frame_interval_for(target_fps: u32) -> Duration {
    Duration::from_nanos((1_000_000_000 / u64::from(target_fps)).max(1))
}

fn duration_rem(value: Duration, modulus: Duration) -> Duration {
    let modulus_nanos = modulus.as_nanos();
    if modulus_nanos == 0 {
        return Duration::ZERO;
    }
    Duration::from_nanos((value.as_nanos() % modulus_nanos) as u64)
}

fn format_target(state: LimiterState) -> String {
    match state {
        LimiterState::Limited { target_fps, .. } => target_fps.to_string(),
        LimiterState::Unlimited => "unlimited".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CALL_PERIOD: Duration = Duration::from_micros(16_600);

    fn render_times(limiter: &mut FrameRateLimiter, base: Instant, calls: u32) -> Vec<Duration> {
        let mut fired = Vec::new();
        for call in 1..=calls {
            let offset = CALL_PERIOD * call;
            if limiter.should_render(base + offset) {
                fired.push(offset);
            }
        }
        fired
    }

    #[test]
    fn unlimited_always_renders() {
        let base = Instant::now();
        let mut limiter = FrameRateLimiter::with_target_fps(-1, base);

        assert_eq!(limiter.state(), LimiterState::Unlimited);
        for _ in 0..10 {
            assert!(limiter.should_render(base));
        }
        assert!(limiter.should_render(base + Duration::from_nanos(1)));
        assert_eq!(limiter.next_frame_delay(base), Duration::ZERO);
    }

    #[test]
    fn zero_target_is_unlimited() {
        let base = Instant::now();
        let limiter = FrameRateLimiter::with_target_fps(0, base);
        assert_eq!(limiter.frame_interval(), None);
    }

    #[test]
    fn interval_for_30_fps_is_expected() {
        let base = Instant::now();
        let limiter = FrameRateLimiter::with_target_fps(30, base);
        assert_eq!(limiter.frame_interval(), Some(Duration::from_nanos(33_333_333)));
        assert_eq!(limiter.target_fps(), Some(30));
    }

    #[test]
    fn two_second_window_delivers_target_count() {
        let base = Instant::now();
        let mut limiter = FrameRateLimiter::with_target_fps(30, base);

        let fired = render_times(&mut limiter, base, 120);

        assert!(
            (59..=61).contains(&fired.len()),
            "rendered {} frames in 2s",
            fired.len()
        );
    }

    #[test]
    fn every_sliding_two_second_window_stays_within_one_frame() {
        let base = Instant::now();
        let mut limiter = FrameRateLimiter::with_target_fps(30, base);
        let fired = render_times(&mut limiter, base, 600);
        let window = Duration::from_secs(2);

        let mut start = Duration::ZERO;
        while start + window <= CALL_PERIOD * 600 {
            let count = fired
                .iter()
                .filter(|offset| **offset >= start && **offset < start + window)
                .count();
            assert!((59..=61).contains(&count), "window at {start:?} had {count}");
            start += Duration::from_millis(100);
        }
    }

    #[test]
    fn reference_timestamp_advances_by_whole_intervals() {
        let base = Instant::now();
        let mut limiter = FrameRateLimiter::with_target_fps(30, base);
        let interval = limiter.frame_interval().expect("limited");
        let gaps_ms = [5_u64, 40, 12, 70, 33, 9, 101, 16];

        let mut now = base;
        for step in 0..400 {
            now += Duration::from_millis(gaps_ms[step % gaps_ms.len()]);
            if limiter.should_render(now) {
                let since_start = limiter.last_frame().duration_since(base);
                assert_eq!(since_start.as_nanos() % interval.as_nanos(), 0);
                assert!(now.duration_since(limiter.last_frame()) < interval);
            }
        }
    }

    #[test]
    fn cumulative_drift_stays_bounded() {
        let base = Instant::now();
        let mut limiter = FrameRateLimiter::with_target_fps(30, base);
        let interval = limiter.frame_interval().expect("limited");

        let fired = render_times(&mut limiter, base, 3_000);
        let frames = fired.len() as u32;
        let last = *fired.last().expect("rendered at least once");
        let nominal = interval * frames;

        let drift = if last > nominal {
            last - nominal
        } else {
            nominal - last
        };
        assert!(drift < CALL_PERIOD, "drift grew to {drift:?}");
    }

    #[test]
    fn declined_frame_does_not_mutate_state() {
        let base = Instant::now();
        let mut limiter = FrameRateLimiter::with_target_fps(30, base);

        assert!(!limiter.should_render(base + Duration::from_millis(10)));
        assert_eq!(limiter.last_frame(), base);
        assert_eq!(limiter.frame_counter(), 0);
    }

    #[test]
    fn rate_change_resets_reference_to_now() {
        let base = Instant::now();
        let mut limiter = FrameRateLimiter::with_target_fps(30, base);
        let later = base + Duration::from_secs(5);

        limiter.set_target_fps(60, later);

        assert_eq!(limiter.last_frame(), later);
        assert!(!limiter.should_render(later + Duration::from_millis(1)));
        assert!(limiter.should_render(later + Duration::from_millis(17)));
    }

    #[test]
    fn next_frame_delay_reports_remaining_budget() {
        let base = Instant::now();
        let limiter = FrameRateLimiter::with_target_fps(50, base);

        assert_eq!(limiter.next_frame_delay(base), Duration::from_millis(20));
        assert_eq!(
            limiter.next_frame_delay(base + Duration::from_millis(5)),
            Duration::from_millis(15)
        );
        assert_eq!(
            limiter.next_frame_delay(base + Duration::from_millis(25)),
            Duration::ZERO
        );
    }

    #[test]
    fn frame_counter_wraps_without_panicking() {
        let base = Instant::now();
        let mut limiter = FrameRateLimiter::new(base);
        limiter.frame_counter = u64::MAX;

        assert!(limiter.should_render(base));
        assert_eq!(limiter.frame_counter(), 0);
    }

    #[test]
    fn duration_rem_handles_zero_modulus() {
        assert_eq!(
            duration_rem(Duration::from_millis(5), Duration::ZERO),
            Duration::ZERO
        );
        assert_eq!(
            duration_rem(Duration::from_millis(50), Duration::from_millis(20)),
            Duration::from_millis(10)
        );
    }
}
