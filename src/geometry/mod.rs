//! Geometry utilities: rigid transforms and axis-convention conversion.

pub mod frames;
pub mod pose;

pub use pose::Pose;
