//! Rigid transform (rotation + translation) in scene space.

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// A rigid transform: rotation followed by translation.
///
/// The virtual camera transform handed to the renderer, the accumulated real
/// camera transform, and the user-supplied offset are all values of this
/// type, expressed in the scene frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub rotation: UnitQuaternion<f64>,
    pub translation: Vector3<f64>,
}

impl Pose {
    pub fn new(rotation: UnitQuaternion<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self {
            rotation: UnitQuaternion::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Compose two transforms: `self` applied after `other`.
    ///
    /// `(self ∘ other)(p) = self.rotation * (other(p)) + self.translation`
    pub fn compose(&self, other: &Pose) -> Pose {
        Pose {
            rotation: self.rotation * other.rotation,
            translation: self.translation + self.rotation * other.translation,
        }
    }

    pub fn inverse(&self) -> Pose {
        let inv_rot = self.rotation.inverse();
        Pose {
            rotation: inv_rot,
            translation: -(inv_rot * self.translation),
        }
    }

    /// Advance this pose a fraction `alpha` of the way towards `target`.
    ///
    /// Position is interpolated linearly, rotation spherically. `alpha` is
    /// clamped to `[0, 1]`; antipodal rotations fall back to the target
    /// rather than an undefined slerp.
    pub fn blend_towards(&self, target: &Pose, alpha: f64) -> Pose {
        let alpha = alpha.clamp(0.0, 1.0);
        let rotation = self
            .rotation
            .try_slerp(&target.rotation, alpha, 1.0e-9)
            .unwrap_or(target.rotation);
        Pose {
            rotation,
            translation: self.translation.lerp(&target.translation, alpha),
        }
    }

    /// True when every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.translation.iter().all(|c| c.is_finite())
            && self.rotation.coords.iter().all(|c| c.is_finite())
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}
