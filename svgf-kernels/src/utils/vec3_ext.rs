use glam::{vec3, Vec3};

pub trait Vec3Ext
where
    Self: Sized,
{
    /// Returns luminance of this color-vector.
    fn luma(self) -> f32;
}

impl Vec3Ext for Vec3 {
    fn luma(self) -> f32 {
        self.dot(vec3(0.2126, 0.7152, 0.0722))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn luma() {
        assert_eq!(0.0, Vec3::ZERO.luma());
        assert_relative_eq!(1.0, Vec3::ONE.luma(), epsilon = 1.0e-6);
        assert_relative_eq!(0.7152, vec3(0.0, 1.0, 0.0).luma());
    }
}
