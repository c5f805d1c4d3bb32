mod double_buffered;
mod texture;

use glam::{UVec2, Vec3};
use log::debug;

pub use self::double_buffered::*;
pub use self::texture::*;

/// All of the per-pixel buffers the denoiser works on.
///
/// Buffers marked as double-buffered form the history record: their current
/// half is written during this frame, while the previous half holds data from
/// the previous frame; the roles get swapped at the beginning of each frame.
#[derive(Debug)]
pub struct DenoiserBuffers {
    /// Raw, noisy colors of the current frame
    pub samples: Texture,

    /// World-space positions of the current frame
    pub positions: Texture,

    /// Normals (xyz) and depths (w)
    pub surface_maps: DoubleBuffered<Texture>,

    pub reprojection_map: Texture,

    /// Integrated colors
    pub colors: DoubleBuffered<Texture>,

    /// History length (x) and the first two moments of luminance (y, z)
    pub moments: DoubleBuffered<Texture>,

    /// Color (xyz) and variance (w), ping-ponged between à-trous iterations
    pub stash: DoubleBuffered<Texture>,

    pub output: Vec<Vec3>,
}

impl DenoiserBuffers {
    pub fn new(size: UVec2) -> Self {
        debug!("Initializing denoiser buffers; size={:?}", size);

        Self {
            samples: Texture::new("samples", size),
            positions: Texture::new("positions", size),
            surface_maps: DoubleBuffered::new("surface_map", size),
            reprojection_map: Texture::new("reprojection_map", size),
            colors: DoubleBuffered::new("colors", size),
            moments: DoubleBuffered::new("moments", size),
            stash: DoubleBuffered::new("stash", size),
            output: vec![Vec3::ZERO; (size.x as usize) * (size.y as usize)],
        }
    }

    pub fn size(&self) -> UVec2 {
        self.samples.size()
    }

    /// Swaps roles of the history buffers, so that what's been written during
    /// the last frame becomes the previous data.
    pub fn begin_frame(&mut self) {
        self.surface_maps.flip();
        self.colors.flip();
        self.moments.flip();
    }

    /// Forgets integrated colors, moments and history lengths.
    pub fn reset_history(&mut self) {
        for tex in self.colors.both_mut() {
            tex.clear();
        }

        for tex in self.moments.both_mut() {
            tex.clear();
        }
    }
}
