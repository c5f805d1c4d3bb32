use glam::Vec3;

use crate::{Error, Result};

/// Per-frame buffers produced by the renderer, laid out row-by-row, starting
/// at the top-left pixel.
///
/// All of the buffers are optional: when any of the geometry buffers is
/// missing, the frame gets passed through without denoising; the color buffer
/// is required though.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput<'a> {
    /// Raw, noisy radiance
    pub colors: Option<&'a [Vec3]>,

    /// World-space positions
    pub positions: Option<&'a [Vec3]>,

    /// World-space normals
    pub normals: Option<&'a [Vec3]>,

    /// View-space linear depths; zero (or less) marks background
    pub depths: Option<&'a [f32]>,
}

impl<'a> FrameInput<'a> {
    pub fn new(
        colors: &'a [Vec3],
        positions: &'a [Vec3],
        normals: &'a [Vec3],
        depths: &'a [f32],
    ) -> Self {
        Self {
            colors: Some(colors),
            positions: Some(positions),
            normals: Some(normals),
            depths: Some(depths),
        }
    }

    /// Creates input out of tightly packed `f32` arrays (three floats per
    /// pixel for colors, positions and normals).
    pub fn from_raw(
        colors: &'a [f32],
        positions: &'a [f32],
        normals: &'a [f32],
        depths: &'a [f32],
    ) -> Result<Self> {
        fn cast<'b>(
            name: &'static str,
            data: &'b [f32],
        ) -> Result<&'b [Vec3]> {
            bytemuck::try_cast_slice(data)
                .map_err(|_| Error::MalformedInput(name))
        }

        Ok(Self::new(
            cast("colors", colors)?,
            cast("positions", positions)?,
            cast("normals", normals)?,
            depths,
        ))
    }

    pub fn with_colors(mut self, colors: &'a [Vec3]) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn with_positions(mut self, positions: &'a [Vec3]) -> Self {
        self.positions = Some(positions);
        self
    }

    pub fn with_normals(mut self, normals: &'a [Vec3]) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_depths(mut self, depths: &'a [f32]) -> Self {
        self.depths = Some(depths);
        self
    }

    pub(crate) fn colors(&self) -> Result<&'a [Vec3]> {
        self.colors.ok_or(Error::MissingInput("colors"))
    }

    /// Returns positions, normals and depths, if all of them are present.
    pub(crate) fn geometry(
        &self,
    ) -> Option<(&'a [Vec3], &'a [Vec3], &'a [f32])> {
        Some((self.positions?, self.normals?, self.depths?))
    }

    /// Returns name of the first missing geometry buffer, if any.
    pub(crate) fn missing_geometry(&self) -> Option<&'static str> {
        if self.positions.is_none() {
            Some("positions")
        } else if self.normals.is_none() {
            Some("normals")
        } else if self.depths.is_none() {
            Some("depths")
        } else {
            None
        }
    }

    /// Checks that all of the present buffers contain exactly `len` pixels.
    pub(crate) fn validate(&self, len: usize) -> Result<()> {
        let lens = [
            ("colors", self.colors.map(<[_]>::len)),
            ("positions", self.positions.map(<[_]>::len)),
            ("normals", self.normals.map(<[_]>::len)),
            ("depths", self.depths.map(<[_]>::len)),
        ];

        for (buffer, actual) in lens {
            if let Some(actual) = actual {
                if actual != len {
                    return Err(Error::InputSizeMismatch {
                        buffer,
                        expected: len,
                        actual,
                    });
                }
            }
        }

        Ok(())
    }
}
