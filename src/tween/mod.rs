//! # Tweening
//!
//! Explicit interpolation records advanced by a single per-frame update.
//!
//! A [`Tween`] remembers where a value started, where it is going, when it
//! started, how long it takes and which [`Easing`] curve shapes it. Nothing
//! runs on its own: the owner samples it with the current animation time.
//!
//! ```
//! use std::time::Duration;
//! use morphdeck::tween::{Easing, Tween};
//!
//! let tween = Tween::new(0.0f32, 100.0f32, Duration::ZERO, Duration::from_millis(500), Easing::Linear);
//! assert_eq!(tween.value_at(Duration::from_millis(250)), 50.0);
//! assert_eq!(tween.value_at(Duration::from_secs(3)), 100.0);
//! ```
//!
//! [`TransitionDriver`] builds on this to move a whole card wall between
//! formations.

mod driver;
mod easing;
mod lerp;

pub use driver::TransitionDriver;
pub use easing::{ease_in_out_cubic, ease_in_out_expo, ease_in_out_quad, Easing};
pub use lerp::Animatable;

use std::time::{Duration, Instant};

/// Time-based interpolation of one property
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween<T: Animatable> {
    start: T,
    end: T,
    start_time: Duration,
    duration: Duration,
    easing: Easing,
}

impl<T: Animatable> Tween<T> {
    pub fn new(start: T, end: T, start_time: Duration, duration: Duration, easing: Easing) -> Self {
        Self {
            start,
            end,
            start_time,
            duration,
            easing,
        }
    }

    pub fn start(&self) -> T {
        self.start
    }

    pub fn end(&self) -> T {
        self.end
    }

    pub fn start_time(&self) -> Duration {
        self.start_time
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn finish_time(&self) -> Duration {
        self.start_time + self.duration
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Normalized, un-eased time in `[0, 1]`
    pub fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start_time);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0) as f32
    }

    /// Value at `now`. Once finished this is exactly `end`.
    pub fn value_at(&self, now: Duration) -> T {
        let progress = self.progress(now);
        if progress >= 1.0 {
            self.end
        } else {
            self.start.lerp(&self.end, self.easing.apply(progress))
        }
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        now >= self.finish_time()
    }
}

/// Monotonic animation time measured from when the clock was created
#[derive(Debug, Clone, Copy)]
pub struct AnimationClock {
    origin: Instant,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_value_before_start_is_start() {
        let tween = Tween::new(1.0f32, 5.0, ms(1000), ms(200), Easing::ExponentialInOut);
        assert_eq!(tween.value_at(ms(0)), 1.0);
        assert_eq!(tween.progress(ms(500)), 0.0);
    }

    #[test]
    fn test_linear_midpoint() {
        let tween = Tween::new(
            Vector3::new(0.0f32, 0.0, 0.0),
            Vector3::new(10.0, -20.0, 30.0),
            ms(100),
            ms(400),
            Easing::Linear,
        );
        let mid = tween.value_at(ms(300));
        assert!((mid.x - 5.0).abs() < 1e-5);
        assert!((mid.y + 10.0).abs() < 1e-5);
        assert!((mid.z - 15.0).abs() < 1e-5);
    }

    #[test]
    fn test_finished_value_is_exact_end() {
        let end = Vector3::new(-625.0f32, 625.0, 0.0);
        let tween = Tween::new(
            Vector3::new(1234.5, -987.25, 17.0),
            end,
            ms(0),
            ms(2750),
            Easing::ExponentialInOut,
        );
        assert!(!tween.is_finished(ms(2749)));
        assert!(tween.is_finished(ms(2750)));
        assert_eq!(tween.value_at(ms(2750)), end);
        assert_eq!(tween.value_at(ms(10_000)), end);
    }

    #[test]
    fn test_zero_duration_jumps_to_end() {
        let tween = Tween::new(0.0f32, 3.0, ms(50), Duration::ZERO, Easing::Linear);
        assert_eq!(tween.value_at(ms(50)), 3.0);
        assert!(tween.is_finished(ms(50)));
    }
}
