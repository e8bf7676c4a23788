//! Easing curves mapping normalized time `[0, 1]` to progress `[0, 1]`.

/// Easing curve applied to a tween's normalized time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    QuadraticInOut,
    CubicInOut,
    /// Slow start, very fast middle, slow finish
    #[default]
    ExponentialInOut,
}

impl Easing {
    /// Evaluates the curve. Input is clamped to `[0, 1]`, and both
    /// endpoints map exactly onto themselves.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadraticInOut => ease_in_out_quad(t),
            Easing::CubicInOut => ease_in_out_cubic(t),
            Easing::ExponentialInOut => ease_in_out_expo(t),
        }
    }
}

pub fn ease_in_out_quad(t: f32) -> f32 {
    let t = t * 2.0;
    if t < 1.0 {
        0.5 * t * t
    } else {
        let t = t - 1.0;
        -0.5 * (t * (t - 2.0) - 1.0)
    }
}

pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t * 2.0;
    if t < 1.0 {
        0.5 * t * t * t
    } else {
        let t = t - 2.0;
        0.5 * (t * t * t + 2.0)
    }
}

pub fn ease_in_out_expo(t: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let t = t * 2.0;
    if t < 1.0 {
        0.5 * 1024f32.powf(t - 1.0)
    } else {
        0.5 * (2.0 - 2f32.powf(-10.0 * (t - 1.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: [Easing; 4] = [
        Easing::Linear,
        Easing::QuadraticInOut,
        Easing::CubicInOut,
        Easing::ExponentialInOut,
    ];

    #[test]
    fn test_endpoints_are_exact() {
        for easing in CURVES {
            assert_eq!(easing.apply(0.0), 0.0, "{:?}", easing);
            assert_eq!(easing.apply(1.0), 1.0, "{:?}", easing);
        }
    }

    #[test]
    fn test_out_of_range_input_is_clamped() {
        for easing in CURVES {
            assert_eq!(easing.apply(-3.0), 0.0);
            assert_eq!(easing.apply(7.5), 1.0);
        }
    }

    #[test]
    fn test_in_out_curves_pass_through_midpoint() {
        for easing in CURVES {
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-6, "{:?}", easing);
        }
    }

    #[test]
    fn test_curves_are_monotonic() {
        for easing in CURVES {
            let mut previous = 0.0;
            for step in 1..=100 {
                let value = easing.apply(step as f32 / 100.0);
                assert!(value >= previous, "{:?} dips at step {}", easing, step);
                previous = value;
            }
        }
    }

    #[test]
    fn test_exponential_is_slow_at_the_edges() {
        let easing = Easing::ExponentialInOut;
        assert!(easing.apply(0.1) < 0.01);
        assert!(easing.apply(0.9) > 0.99);
    }
}
