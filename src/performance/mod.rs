//! # Frame statistics
//!
//! Counts loop ticks against rendered frames, so the redraw-on-demand policy
//! is visible: while nothing moves, ticks keep climbing and renders do not.
//!
//! ```rust
//! use std::time::Duration;
//! use morphdeck::performance::FrameStats;
//!
//! let mut stats = FrameStats::new();
//! stats.record_tick();
//! stats.record_render(Duration::from_millis(0));
//! stats.record_render(Duration::from_millis(20));
//! assert_eq!(stats.renders(), 2);
//! assert!((stats.fps() - 50.0).abs() < 1e-3);
//! ```

use std::collections::VecDeque;
use std::time::Duration;

/// Number of recent render timestamps the rolling FPS is computed over
pub const FPS_WINDOW: usize = 120;

#[derive(Debug, Clone)]
pub struct FrameStats {
    ticks: u64,
    renders: u64,
    /// Timestamps of the most recent renders, oldest first
    render_times: VecDeque<Duration>,
    max_samples: usize,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameStats {
    pub fn new() -> Self {
        Self::with_window(FPS_WINDOW)
    }

    pub fn with_window(max_samples: usize) -> Self {
        let max_samples = max_samples.max(2);
        Self {
            ticks: 0,
            renders: 0,
            render_times: VecDeque::with_capacity(max_samples),
            max_samples,
        }
    }

    pub fn record_tick(&mut self) {
        self.ticks += 1;
    }

    /// Records a rendered frame at clock time `now`
    pub fn record_render(&mut self, now: Duration) {
        self.renders += 1;
        if self.render_times.len() == self.max_samples {
            self.render_times.pop_front();
        }
        self.render_times.push_back(now);
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }

    /// Rolling frames per second over the recorded window, 0 with fewer than two frames
    pub fn fps(&self) -> f32 {
        let (Some(first), Some(last)) = (self.render_times.front(), self.render_times.back()) else {
            return 0.0;
        };
        let span = last.saturating_sub(*first).as_secs_f32();
        if span <= 0.0 {
            return 0.0;
        }
        (self.render_times.len() - 1) as f32 / span
    }

    /// Average time between recent frames in milliseconds
    pub fn frame_time_ms(&self) -> f32 {
        let fps = self.fps();
        if fps > 0.0 {
            1000.0 / fps
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_ticks_and_renders_separately() {
        let mut stats = FrameStats::new();
        for _ in 0..10 {
            stats.record_tick();
        }
        stats.record_render(Duration::ZERO);
        assert_eq!(stats.ticks(), 10);
        assert_eq!(stats.renders(), 1);
        assert_eq!(stats.fps(), 0.0);
    }

    #[test]
    fn test_fps_over_steady_frames() {
        let mut stats = FrameStats::new();
        for i in 0..61 {
            stats.record_render(Duration::from_millis(i * 16));
        }
        let expected = 60.0 / 0.96;
        assert!((stats.fps() - expected).abs() < 1e-2);
        assert!((stats.frame_time_ms() - 16.0).abs() < 1e-2);
    }

    #[test]
    fn test_window_drops_old_frames() {
        let mut stats = FrameStats::with_window(3);
        // A slow start that falls out of the window
        stats.record_render(Duration::from_secs(0));
        stats.record_render(Duration::from_secs(10));
        stats.record_render(Duration::from_millis(10_100));
        stats.record_render(Duration::from_millis(10_200));

        assert_eq!(stats.renders(), 4);
        assert!((stats.fps() - 10.0).abs() < 1e-3);
    }
}
