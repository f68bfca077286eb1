//! Engine-space to file-space transform conversion.
//!
//! The capturing engine is left-handed and Y-up; the interchange file is right-handed and Y-up.
//! Handedness is flipped by mirroring the X axis. Rotations are written as Euler degrees in the
//! file's XYZ order (X applied first).

use glam::{EulerRot, Quat, Vec3};

/// Mirror a position across the YZ plane.
pub fn position_to_target(v: Vec3) -> Vec3 {
    Vec3::new(-v.x, v.y, v.z)
}

/// Scale is handedness-invariant.
pub fn scale_to_target(v: Vec3) -> Vec3 {
    v
}

/// Engine Euler angles (degrees, applied Z then X then Y) to a quaternion.
pub fn euler_to_quat(degrees: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        degrees.y.to_radians(),
        degrees.x.to_radians(),
        degrees.z.to_radians(),
    )
}

/// Engine rotation to file-space Euler degrees.
pub fn rotation_to_target(q: Quat) -> Vec3 {
    let len = q.length();
    let q = if len.is_finite() && len > f32::EPSILON {
        q / len
    } else {
        Quat::IDENTITY
    };
    let mirrored = Quat::from_xyzw(q.x, -q.y, -q.z, q.w);
    let (z, y, x) = mirrored.to_euler(EulerRot::ZYX);
    Vec3::new(finite_or_zero(x), finite_or_zero(y), finite_or_zero(z)) * (180.0 / std::f32::consts::PI)
}

/// Engine Euler degrees straight to file-space Euler degrees.
pub fn rotation_euler_to_target(degrees: Vec3) -> Vec3 {
    rotation_to_target(euler_to_quat(degrees))
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/coords.rs"]
mod tests;
