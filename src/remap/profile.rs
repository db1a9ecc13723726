//! Camera capture modes and display-device calibration profiles.

use serde::{Deserialize, Serialize};

/// Capture resolutions supported by the stereo camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraResolution {
    /// 2208×1242 side-by-side capture.
    Hd2k,
    /// 1920×1080.
    Hd1080,
    /// 1280×720.
    Hd720,
    /// 672×376.
    Vga,
}

impl CameraResolution {
    /// Per-eye capture dimensions in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            CameraResolution::Hd2k => (2208, 1242),
            CameraResolution::Hd1080 => (1920, 1080),
            CameraResolution::Hd720 => (1280, 720),
            CameraResolution::Vga => (672, 376),
        }
    }

    /// Horizontal field of view of the capture mode, in degrees.
    pub fn horizontal_fov_deg(&self) -> f64 {
        match self {
            CameraResolution::Hd2k => 76.0,
            CameraResolution::Hd1080 => 76.0,
            CameraResolution::Hd720 => 85.0,
            CameraResolution::Vga => 90.0,
        }
    }
}

/// Calibration profile of a display device the feed is remapped for.
///
/// `eye_width`/`eye_height` fix the remap table dimensions exactly;
/// `fov_h_deg` sets the output projection; `k1`/`k2` are the radial
/// coefficients at full distortion strength, scaled down linearly by the
/// caller's distortion parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    pub name: &'static str,
    pub eye_width: u32,
    pub eye_height: u32,
    pub fov_h_deg: f64,
    pub k1: f64,
    pub k2: f64,
}

static PROFILES: &[DeviceProfile] = &[
    DeviceProfile {
        name: "HTC_VIVE",
        eye_width: 1080,
        eye_height: 1200,
        fov_h_deg: 100.0,
        k1: 0.22,
        k2: 0.24,
    },
    DeviceProfile {
        name: "HTC_VIVE_PRO",
        eye_width: 1440,
        eye_height: 1600,
        fov_h_deg: 98.0,
        k1: 0.22,
        k2: 0.24,
    },
    DeviceProfile {
        name: "OCULUS_RIFT_CV1",
        eye_width: 1080,
        eye_height: 1200,
        fov_h_deg: 94.0,
        k1: 0.19,
        k2: 0.21,
    },
];

/// Look up a known display profile by its device name. Unknown names return
/// `None`; the caller decides whether that is fatal.
pub fn lookup_profile(name: &str) -> Option<&'static DeviceProfile> {
    PROFILES.iter().find(|p| p.name == name)
}
