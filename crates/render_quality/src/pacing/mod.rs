mod frame_stats;
mod limiter;

pub use frame_stats::{
    FpsSource, FrameStats, FrameTimeSnapshot, DEFAULT_MIN_FPS_SAMPLES, FRAME_STATS_WINDOW_LEN,
};
pub use limiter::{FrameRateLimiter, LimiterState, DEFAULT_DIAGNOSTICS_INTERVAL_FRAMES};
