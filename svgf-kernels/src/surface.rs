use glam::{ivec2, vec2, IVec2, UVec2, Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::{
    TexRgba32, REPROJECTION_DEPTH_THRESHOLD, REPROJECTION_NORMAL_THRESHOLD,
};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Surface {
    pub normal: Vec3,
    pub depth: f32,
}

impl Surface {
    pub fn serialize(&self) -> Vec4 {
        self.normal.extend(self.depth)
    }

    pub fn deserialize(d0: Vec4) -> Self {
        Self {
            normal: d0.xyz(),
            depth: d0.w,
        }
    }

    /// Returns whether this surface represents background, i.e. a pixel where
    /// nothing has been hit.
    pub fn is_sky(&self) -> bool {
        self.depth <= 0.0 || !self.depth.is_finite()
    }

    /// Returns whether `other` is similar enough to this surface to reuse its
    /// history.
    pub fn is_similar_to(&self, other: &Self) -> bool {
        if self.is_sky() || other.is_sky() {
            return false;
        }

        let normal_score = self.normal.dot(other.normal);
        let depth_diff = (self.depth - other.depth).abs();

        normal_score >= REPROJECTION_NORMAL_THRESHOLD
            && depth_diff
                <= REPROJECTION_DEPTH_THRESHOLD * self.depth.max(other.depth)
    }
}

#[derive(Clone, Copy)]
pub struct SurfaceMap<'a> {
    tex: TexRgba32<'a>,
}

impl<'a> SurfaceMap<'a> {
    pub fn new(tex: TexRgba32<'a>) -> Self {
        Self { tex }
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        self.tex.contains(pos)
    }

    pub fn get(&self, screen_pos: UVec2) -> Surface {
        Surface::deserialize(self.tex.read(screen_pos))
    }

    /// Returns screen-space gradient of the depth at given point.
    ///
    /// For each axis the smaller of forward and backward difference is picked,
    /// so that a discontinuity on one side doesn't make the whole neighbourhood
    /// look like an oblique surface.
    pub fn depth_gradient(&self, screen_pos: UVec2) -> Vec2 {
        let center = self.get(screen_pos);

        if center.is_sky() {
            return Vec2::ZERO;
        }

        let axis = |delta: IVec2| {
            let fwd = self.neighbour_depth(screen_pos, delta);
            let bwd = self.neighbour_depth(screen_pos, -delta);

            match (fwd, bwd) {
                (Some(fwd), Some(bwd)) => {
                    let fwd = fwd - center.depth;
                    let bwd = center.depth - bwd;

                    if fwd.abs() < bwd.abs() {
                        fwd
                    } else {
                        bwd
                    }
                }
                (Some(fwd), None) => fwd - center.depth,
                (None, Some(bwd)) => center.depth - bwd,
                (None, None) => 0.0,
            }
        };

        vec2(axis(ivec2(1, 0)), axis(ivec2(0, 1)))
    }

    fn neighbour_depth(&self, screen_pos: UVec2, delta: IVec2) -> Option<f32> {
        let pos = screen_pos.as_ivec2() + delta;

        if !self.contains(pos) {
            return None;
        }

        let surface = self.get(pos.as_uvec2());

        if surface.is_sky() {
            None
        } else {
            Some(surface.depth)
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec3};

    use super::*;

    fn surface(depth: f32) -> Surface {
        Surface {
            normal: vec3(0.0, 0.0, 1.0),
            depth,
        }
    }

    #[test]
    fn is_sky() {
        assert!(surface(0.0).is_sky());
        assert!(surface(-1.0).is_sky());
        assert!(surface(f32::NAN).is_sky());
        assert!(surface(f32::INFINITY).is_sky());
        assert!(!surface(0.1).is_sky());
    }

    #[test]
    fn is_similar_to() {
        assert!(surface(10.0).is_similar_to(&surface(10.5)));
        assert!(!surface(10.0).is_similar_to(&surface(12.0)));
        assert!(!surface(10.0).is_similar_to(&surface(0.0)));

        let tilted = Surface {
            normal: vec3(1.0, 0.0, 0.0),
            depth: 10.0,
        };

        assert!(!surface(10.0).is_similar_to(&tilted));
    }

    #[test]
    fn depth_gradient() {
        // A ramp along the x axis, with a discontinuity at the last column
        let data: Vec<_> = (0..4)
            .flat_map(|_| [1.0, 2.0, 3.0, 50.0])
            .map(|depth| surface(depth).serialize())
            .collect();

        let target = SurfaceMap::new(TexRgba32::new(&data, uvec2(4, 4)));

        let grad = target.depth_gradient(uvec2(1, 1));

        assert_relative_eq!(1.0, grad.x);
        assert_relative_eq!(0.0, grad.y);

        // Backward difference wins over the discontinuity
        let grad = target.depth_gradient(uvec2(2, 1));

        assert_relative_eq!(1.0, grad.x);
    }
}
