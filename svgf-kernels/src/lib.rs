//! Per-pixel structs and algorithms used by the denoiser.
//!
//! Everything here works on a single screen position at a time and only reads
//! from texture views, so the host is free to schedule the work however it
//! likes (see the `svgf` crate, which runs each kernel across all pixels in
//! parallel).

#![allow(clippy::too_many_arguments)]
#![allow(clippy::manual_range_contains)]

mod bilinear_filter;
mod camera;
pub mod frame_denoising;
pub mod frame_reprojection;
mod passes;
mod reprojection;
mod surface;
mod utils;

pub use self::bilinear_filter::*;
pub use self::camera::*;
pub use self::passes::*;
pub use self::reprojection::*;
pub use self::surface::*;
pub use self::utils::*;

pub mod prelude {
    pub use glam::*;

    pub use crate::*;
}

/// Guards divisions by (almost) zero.
pub const SVGF_EPSILON: f32 = 1.0e-6;

/// Upper bound for the history length; together with the configured alpha it
/// determines the effective width of the temporal averaging window.
pub const MAX_HISTORY_LENGTH: f32 = 32.0;

/// History length below which temporal moments are considered unreliable and
/// variance is estimated spatially instead.
pub const VARIANCE_HISTORY_THRESHOLD: f32 = 4.0;

/// Radius of the window used for the spatial variance estimate (7x7).
pub const VARIANCE_WINDOW_RADIUS: i32 = 3;

/// Minimum cosine between current and previous normal for a history sample to
/// be reused.
pub const REPROJECTION_NORMAL_THRESHOLD: f32 = 0.9;

/// Maximum relative difference between current and previous depth for a
/// history sample to be reused.
pub const REPROJECTION_DEPTH_THRESHOLD: f32 = 0.1;

/// Reprojected positions closer than this (in texels) to a texel's center get
/// snapped onto it, so that static cameras always hit the exact path.
pub const REPROJECTION_SNAP: f32 = 1.0e-3;
