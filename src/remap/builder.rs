//! Per-pixel undistortion map construction.

use thiserror::Error;

use crate::remap::profile::{lookup_profile, CameraResolution, DeviceProfile};

/// Remap construction failure. Fatal to the remap subsystem only: the pose
/// pipeline keeps operating, only the undistorted display is unavailable.
#[derive(Debug, Error, PartialEq)]
pub enum RemapError {
    #[error("unknown display device profile: {0}")]
    UnknownDeviceProfile(String),
    #[error("distortion parameter {0} outside [0, 1]")]
    DistortionOutOfRange(f64),
    #[error("no display profile configured")]
    NotConfigured,
}

/// Dense per-pixel coordinate lookup, one `f32` plane per axis.
///
/// `map_x[y * width + x]` / `map_y[y * width + x]` give the source-image
/// sample coordinate for output pixel `(x, y)`. Row-major, sized exactly to
/// the display profile's per-eye resolution, immutable after construction
/// and suitable for direct upload as filterable textures.
#[derive(Debug, Clone, PartialEq)]
pub struct RemapTable {
    width: u32,
    height: u32,
    map_x: Vec<f32>,
    map_y: Vec<f32>,
}

impl RemapTable {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn map_x(&self) -> &[f32] {
        &self.map_x
    }

    pub fn map_y(&self) -> &[f32] {
        &self.map_y
    }

    /// Source coordinate for one output pixel.
    pub fn at(&self, x: u32, y: u32) -> (f32, f32) {
        let idx = (y as usize) * (self.width as usize) + x as usize;
        (self.map_x[idx], self.map_y[idx])
    }
}

/// Build the undistortion remap for `device_name` at the camera's capture
/// resolution.
///
/// For each output pixel the undistorted source sample coordinate follows
/// from the profile's projection and a radial barrel model
/// `1 + k1·r² + k2·r⁴`, with the coefficients scaled by `distortion` in
/// `[0, 1]`. Closed-form per pixel: identical inputs yield bit-identical
/// tables, so a rebuild on configuration change is always safe. No partial
/// table is ever produced on failure.
pub fn build_remap(
    device_name: &str,
    camera_resolution: CameraResolution,
    distortion: f64,
) -> Result<RemapTable, RemapError> {
    let profile = lookup_profile(device_name)
        .ok_or_else(|| RemapError::UnknownDeviceProfile(device_name.to_string()))?;
    if !(0.0..=1.0).contains(&distortion) || !distortion.is_finite() {
        return Err(RemapError::DistortionOutOfRange(distortion));
    }
    Ok(build_for_profile(profile, camera_resolution, distortion))
}

fn build_for_profile(
    profile: &DeviceProfile,
    camera_resolution: CameraResolution,
    distortion: f64,
) -> RemapTable {
    let (out_w, out_h) = (profile.eye_width, profile.eye_height);
    let (cam_w, cam_h) = camera_resolution.dimensions();

    // Output projection: focal from the profile's horizontal FOV, principal
    // point at the eye-buffer center.
    let out_fx = (out_w as f64 / 2.0) / (profile.fov_h_deg.to_radians() / 2.0).tan();
    let out_cx = out_w as f64 / 2.0;
    let out_cy = out_h as f64 / 2.0;

    // Source camera intrinsics from the capture mode.
    let cam_fx = (cam_w as f64 / 2.0) / (camera_resolution.horizontal_fov_deg().to_radians() / 2.0).tan();
    let cam_cx = cam_w as f64 / 2.0;
    let cam_cy = cam_h as f64 / 2.0;

    let k1 = profile.k1 * distortion;
    let k2 = profile.k2 * distortion;

    let len = (out_w as usize) * (out_h as usize);
    let mut map_x = Vec::with_capacity(len);
    let mut map_y = Vec::with_capacity(len);

    for y in 0..out_h {
        for x in 0..out_w {
            // Pixel center to normalized coordinates in the output projection.
            let xn = (x as f64 + 0.5 - out_cx) / out_fx;
            let yn = (y as f64 + 0.5 - out_cy) / out_fx;

            let r2 = xn * xn + yn * yn;
            let radial = 1.0 + k1 * r2 + k2 * r2 * r2;

            // Back into source-camera pixels.
            let u = cam_cx + cam_fx * xn * radial;
            let v = cam_cy + cam_fx * yn * radial;

            map_x.push(u as f32);
            map_y.push(v as f32);
        }
    }

    RemapTable {
        width: out_w,
        height: out_h,
        map_x,
        map_y,
    }
}
