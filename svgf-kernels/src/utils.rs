mod f32_ext;
mod vec3_ext;

use core::ops;

use glam::{IVec2, UVec2, Vec4};

pub use self::f32_ext::*;
pub use self::vec3_ext::*;

/// Read-only view into a two-dimensional RGBA32F texture.
#[derive(Clone, Copy, Debug)]
pub struct TexRgba32<'a> {
    data: &'a [Vec4],
    size: UVec2,
}

impl<'a> TexRgba32<'a> {
    pub fn new(data: &'a [Vec4], size: UVec2) -> Self {
        assert_eq!(data.len(), (size.x as usize) * (size.y as usize));

        Self { data, size }
    }

    /// Returns whether given point lays inside the texture.
    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.x < self.size.x as i32
            && pos.y < self.size.y as i32
    }

    pub fn read(&self, pos: UVec2) -> Vec4 {
        self.data[(pos.y * self.size.x + pos.x) as usize]
    }
}

pub fn lerp<T>(a: T, b: T, t: f32) -> T
where
    T: ops::Add<Output = T>,
    T: ops::Sub<Output = T>,
    T: ops::Mul<f32, Output = T>,
    T: Copy,
{
    a + (b - a) * t.clamp(0.0, 1.0)
}
