//! Orientation helpers for formation targets.

use cgmath::{Euler, InnerSpace, Rad, Vector3};

/// Below this squared length a direction is treated as degenerate
const DEGENERATE_LENGTH2: f32 = 1e-10;

/// Rotation that turns an object at `eye` so its local +Z axis points at `focus`.
///
/// World up is +Y. When the view direction is (nearly) parallel to up the
/// direction is nudged slightly so the basis stays well defined, and a
/// zero-length direction falls back to +Z.
pub fn look_at(eye: Vector3<f32>, focus: Vector3<f32>) -> Euler<Rad<f32>> {
    let up = Vector3::unit_y();

    let mut z_axis = focus - eye;
    if z_axis.magnitude2() < DEGENERATE_LENGTH2 {
        z_axis = Vector3::unit_z();
    }
    z_axis = z_axis.normalize();

    let mut x_axis = up.cross(z_axis);
    if x_axis.magnitude2() < DEGENERATE_LENGTH2 {
        if up.z.abs() == 1.0 {
            z_axis.x += 1e-4;
        } else {
            z_axis.z += 1e-4;
        }
        z_axis = z_axis.normalize();
        x_axis = up.cross(z_axis);
    }
    x_axis = x_axis.normalize();

    let y_axis = z_axis.cross(x_axis);

    euler_from_basis(x_axis, y_axis, z_axis)
}

/// Decomposes an orthonormal basis (the columns of a rotation matrix) into
/// XYZ-order Euler angles, i.e. `R = Rx * Ry * Rz`.
pub fn euler_from_basis(
    x_axis: Vector3<f32>,
    y_axis: Vector3<f32>,
    z_axis: Vector3<f32>,
) -> Euler<Rad<f32>> {
    let (m11, m12, m13) = (x_axis.x, y_axis.x, z_axis.x);
    let (m22, m23) = (y_axis.y, z_axis.y);
    let (m32, m33) = (y_axis.z, z_axis.z);

    let y = m13.clamp(-1.0, 1.0).asin();

    // Gimbal lock when the Y rotation is ±90°
    let (x, z) = if m13.abs() < 0.999_999_9 {
        ((-m23).atan2(m33), (-m12).atan2(m11))
    } else {
        (m32.atan2(m22), 0.0)
    };

    Euler::new(Rad(x), Rad(y), Rad(z))
}
