//! Axis-convention conversion between the tracking device and the scene.
//!
//! The stereo camera reports poses in the computer-vision convention (RDF):
//!
//! ```text
//!        +Y (down)
//!         |
//!         +------ +X (right)
//!        /
//!      +Z (forward, optical axis)
//! ```
//!
//! The scene uses the FLU convention (X-forward, Y-left, Z-up). Every
//! translation delta and orientation coming off the device passes through
//! these conversions exactly once, in the pose engine.

use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};

/// Fixed rotation matrix from device frame (RDF) to scene frame (FLU).
///
/// Maps:
/// - Device +Z (forward) → Scene +X (forward)
/// - Device +X (right)   → Scene -Y (left)
/// - Device +Y (down)    → Scene -Z (up)
#[rustfmt::skip]
pub fn rotation_scene_device() -> Matrix3<f64> {
    Matrix3::new(
        0.0,  0.0, 1.0,  // Scene X = Device Z
       -1.0,  0.0, 0.0,  // Scene Y = -Device X
        0.0, -1.0, 0.0,  // Scene Z = -Device Y
    )
}

/// Fixed rotation matrix from scene frame (FLU) back to device frame (RDF).
#[rustfmt::skip]
pub fn rotation_device_scene() -> Matrix3<f64> {
    rotation_scene_device().transpose()
}

/// Transform a device-frame position or translation delta into scene frame.
pub fn device_position_to_scene(p_device: &Vector3<f64>) -> Vector3<f64> {
    rotation_scene_device() * p_device
}

/// Transform a scene-frame position back into device frame.
pub fn scene_position_to_device(p_scene: &Vector3<f64>) -> Vector3<f64> {
    rotation_device_scene() * p_scene
}

/// Transform a device-frame orientation into scene frame.
///
/// The world-to-device rotation is sandwiched between the frame conversions:
/// `q_scene = R_sd * q_device * R_sd⁻¹`.
pub fn device_rotation_to_scene(q_device: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
    let r_sd = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(
        rotation_scene_device(),
    ));
    r_sd * q_device * r_sd.inverse()
}
