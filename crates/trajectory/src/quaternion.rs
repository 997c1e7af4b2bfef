//! Axis-angle helper
//!
//! Not used on the publishing path, every emitted box keeps the identity
//! orientation. Kept for consumers that want to rotate boxes themselves.

use contracts::Quaternion;
use nalgebra::{Unit, UnitQuaternion, Vector3};

/// Quaternion rotating by `angle` radians about `axis`
///
/// The axis does not need to be normalised. Returns `None` for a
/// (near-)zero axis, which has no direction.
pub fn quaternion_about_axis(angle: f64, axis: [f64; 3]) -> Option<Quaternion> {
    let axis = Unit::try_new(Vector3::new(axis[0], axis[1], axis[2]), f64::EPSILON)?;
    let q = UnitQuaternion::from_axis_angle(&axis, angle);

    Some(Quaternion {
        x: q.i,
        y: q.j,
        z: q.k,
        w: q.w,
    })
}
