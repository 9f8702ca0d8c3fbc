use std::time::Duration;

pub const FRAME_STATS_WINDOW_LEN: usize = 120;
pub const DEFAULT_MIN_FPS_SAMPLES: usize = 30;

/// Anything that can report a smoothed frame rate. `None` until enough
/// samples exist for the value to be meaningful.
pub trait FpsSource {
    fn smoothed_fps(&self) -> Option<f32>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTimeSnapshot {
    pub last_ms: f32,
    pub avg_ms: f32,
    pub max_ms: f32,
    pub fps: f32,
    pub samples: usize,
}

#[derive(Debug, Clone)]
pub struct FrameStats {
    samples_ms: [f32; FRAME_STATS_WINDOW_LEN],
    head: usize,
    count: usize,
    sum_ms: f32,
    last_ms: f32,
    min_samples: usize,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::with_min_samples(DEFAULT_MIN_FPS_SAMPLES)
    }
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_samples(min_samples: usize) -> Self {
        Self {
            samples_ms: [0.0; FRAME_STATS_WINDOW_LEN],
            head: 0,
            count: 0,
            sum_ms: 0.0,
            last_ms: 0.0,
            min_samples: min_samples.min(FRAME_STATS_WINDOW_LEN),
        }
    }

    pub fn record_frame(&mut self, frame_dt: Duration) {
        let value_ms = duration_to_ms(frame_dt);
        self.last_ms = value_ms;

        if self.count < FRAME_STATS_WINDOW_LEN {
            self.samples_ms[self.head] = value_ms;
            self.head = (self.head + 1) % FRAME_STATS_WINDOW_LEN;
            self.count += 1;
            self.sum_ms += value_ms;
            return;
        }

        let evicted = self.samples_ms[self.head];
        self.samples_ms[self.head] = value_ms;
        self.head = (self.head + 1) % FRAME_STATS_WINDOW_LEN;
        self.sum_ms += value_ms - evicted;
    }

    pub fn sample_count(&self) -> usize {
        self.count
    }

    pub fn is_warmed_up(&self) -> bool {
        self.count > 0 && self.count >= self.min_samples
    }

    /// Frames per second over the window; `0` when empty or no time elapsed.
    pub fn average_fps(&self) -> f32 {
        if self.count == 0 || self.sum_ms <= 0.0 {
            return 0.0;
        }
        self.count as f32 * 1000.0 / self.sum_ms
    }

    pub fn snapshot(&self) -> FrameTimeSnapshot {
        if self.count == 0 {
            return FrameTimeSnapshot::default();
        }

        let mut max_ms = self.samples_ms[0];
        for index in 1..self.count {
            let candidate = self.samples_ms[index];
            if candidate > max_ms {
                max_ms = candidate;
            }
        }

        FrameTimeSnapshot {
            last_ms: self.last_ms,
            avg_ms: self.sum_ms / self.count as f32,
            max_ms,
            fps: self.average_fps(),
            samples: self.count,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::with_min_samples(self.min_samples);
    }
}

impl FpsSource for FrameStats {
    fn smoothed_fps(&self) -> Option<f32> {
        self.is_warmed_up().then(|| self.average_fps())
    }
}

fn duration_to_ms(duration: Duration) -> f32 {
    duration.as_secs_f32() * 1000.0
}
