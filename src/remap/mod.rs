//! Lens remap table construction.
//!
//! Given a known display-device profile, the camera's capture resolution and
//! a bounded distortion parameter, builds the pair of per-pixel coordinate
//! maps the renderer samples to undistort the raw camera feed onto the
//! display. Construction is pure and deterministic; tables are rebuilt whole
//! whenever any input changes, never patched.

pub mod builder;
pub mod profile;

pub use builder::{build_remap, RemapError, RemapTable};
pub use profile::{lookup_profile, CameraResolution, DeviceProfile};
