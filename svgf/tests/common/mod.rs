#![allow(dead_code)]

use glam::{vec2, vec3, Mat4, UVec2, Vec3};
use svgf::{Camera, FrameInput};

/// A static, camera-facing plane that fills the entire screen, viewed through
/// an identity projection.
pub struct Scene {
    pub size: UVec2,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub depths: Vec<f32>,
}

impl Scene {
    pub fn new(size: UVec2) -> Self {
        Self::with_offset(size, 0.0)
    }

    /// Creates a scene shifted to the right by given number of pixels; see:
    /// [`Self::camera_with_offset()`].
    pub fn with_offset(size: UVec2, offset: f32) -> Self {
        let mut positions = Vec::new();

        for y in 0..size.y {
            for x in 0..size.x {
                let pos = vec2(x as f32 + offset, y as f32) + 0.5;
                let ndc = 2.0 * pos / size.as_vec2() - 1.0;

                positions.push(vec3(ndc.x, -ndc.y, 0.5));
            }
        }

        let len = positions.len();

        Self {
            size,
            positions,
            normals: vec![Vec3::Z; len],
            depths: vec![1.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn idx(&self, x: u32, y: u32) -> usize {
        (y * self.size.x + x) as usize
    }

    pub fn camera(&self) -> Camera {
        Camera::new(Mat4::IDENTITY, self.size)
    }

    /// Returns a camera that sees [`Self::with_offset()`] exactly the way
    /// [`Self::camera()`] sees [`Self::new()`].
    pub fn camera_with_offset(&self, offset: f32) -> Camera {
        let dx = -2.0 * offset / (self.size.x as f32);

        Camera::new(Mat4::from_translation(vec3(dx, 0.0, 0.0)), self.size)
    }

    pub fn input<'a>(&'a self, colors: &'a [Vec3]) -> FrameInput<'a> {
        FrameInput::new(colors, &self.positions, &self.normals, &self.depths)
    }
}
