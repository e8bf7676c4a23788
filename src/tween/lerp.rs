use cgmath::{Euler, Rad, Vector3};

/// Values a [`Tween`](super::Tween) can interpolate between
pub trait Animatable: Copy {
    /// Linear blend, `t = 0` yields `self`, `t = 1` yields `other`
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Animatable for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        *self + (*other - *self) * t
    }
}

impl Animatable for Vector3<f32> {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        *self + (*other - *self) * t
    }
}

impl Animatable for Rad<f32> {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Rad(Animatable::lerp(&self.0, &other.0, t))
    }
}

// Angles blend component-wise, not along the shortest arc
impl Animatable for Euler<Rad<f32>> {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Euler::new(
            Animatable::lerp(&self.x, &other.x, t),
            Animatable::lerp(&self.y, &other.y, t),
            Animatable::lerp(&self.z, &other.z, t),
        )
    }
}
