//! Spatiotemporal variance-guided filtering (SVGF) for real-time path tracers.
//!
//! Given a noisy, low-sample-count radiance image together with a few
//! geometric attributes per pixel, [`Denoiser`] produces a temporally stable,
//! edge-preserving image every frame:
//!
//! ```no_run
//! use glam::{uvec2, Mat4, Vec3};
//! use svgf::{Camera, Denoiser, DenoiserParams, FrameInput};
//!
//! let size = uvec2(320, 240);
//! let mut denoiser = Denoiser::new(size, DenoiserParams::default()).unwrap();
//!
//! # let len = (size.x * size.y) as usize;
//! # let colors = vec![Vec3::ZERO; len];
//! # let positions = vec![Vec3::ZERO; len];
//! # let normals = vec![Vec3::Z; len];
//! # let depths = vec![1.0; len];
//! let camera = Camera::new(Mat4::IDENTITY, size);
//! let input = FrameInput::new(&colors, &positions, &normals, &depths);
//! let output = denoiser.render(camera, &input).unwrap();
//! ```
//!
//! The per-pixel algorithms live in [`kernels`]; this crate owns the buffers,
//! runs the passes (in parallel, via rayon) and carries history between
//! frames.

mod buffers;
mod denoiser;
mod error;
mod input;
mod params;
mod passes;
mod stats;

pub use svgf_kernels as kernels;
pub use svgf_kernels::Camera;

pub use self::buffers::*;
pub use self::denoiser::*;
pub use self::error::*;
pub use self::input::*;
pub use self::params::*;
pub(crate) use self::passes::*;
pub use self::stats::*;
