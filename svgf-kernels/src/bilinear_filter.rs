use glam::{ivec2, vec4, IVec2, UVec2, Vec2, Vec4};

use crate::Reprojection;

#[derive(Clone, Copy, Debug)]
pub struct BilinearFilter {
    /// Sample at `f(x=0, y=0)`
    pub s00: Vec4,

    /// Sample at `f(x=1, y=0)`
    pub s10: Vec4,

    /// Sample at `f(x=0, y=1)`
    pub s01: Vec4,

    /// Sample at `f(x=1, y=1)`
    pub s11: Vec4,

    /// Weights for each sample
    pub weights: Vec4,
}

impl BilinearFilter {
    /// Fetches given history at the reprojected position, honoring the
    /// reprojection's validity mask.
    pub fn reproject(
        reprojection: Reprojection,
        sample: impl Fn(UVec2) -> Vec4,
    ) -> Vec4 {
        if reprojection.is_exact() {
            sample(reprojection.prev_pos_round())
        } else {
            Self::from_reprojection(reprojection, sample)
                .eval(reprojection.prev_pos_fract())
        }
    }

    pub fn from_reprojection(
        reprojection: Reprojection,
        sample: impl Fn(UVec2) -> Vec4,
    ) -> Self {
        let mut samples = [Vec4::ZERO; 4];
        let mut weights = [0.0; 4];

        let coords =
            Self::reprojection_coords(reprojection.prev_x, reprojection.prev_y);

        for (idx, pos) in coords.into_iter().enumerate() {
            // Taps outside of the screen are never marked as valid, so the
            // cast below is safe
            if reprojection.validity & (1 << idx) > 0 {
                samples[idx] = sample(pos.as_uvec2());
                weights[idx] = 1.0;
            }
        }

        let [s00, s10, s01, s11] = samples;

        Self {
            s00,
            s10,
            s01,
            s11,
            weights: Vec4::from_array(weights),
        }
    }

    pub fn reprojection_coords(prev_x: f32, prev_y: f32) -> [IVec2; 4] {
        let p00 = ivec2(prev_x.floor() as i32, prev_y.floor() as i32);
        let p10 = p00 + ivec2(1, 0);
        let p01 = p00 + ivec2(0, 1);
        let p11 = p00 + ivec2(1, 1);

        [p00, p10, p01, p11]
    }

    /// Returns bilinear weights of the taps for given fractional position,
    /// in the same order as [`Self::reprojection_coords()`].
    pub fn tap_weights(uv: Vec2) -> Vec4 {
        vec4(
            (1.0 - uv.x) * (1.0 - uv.y),
            uv.x * (1.0 - uv.y),
            (1.0 - uv.x) * uv.y,
            uv.x * uv.y,
        )
    }

    pub fn eval(&self, uv: Vec2) -> Vec4 {
        let weights = self.weights * Self::tap_weights(uv);
        let w_sum = weights.dot(Vec4::ONE);

        if w_sum == 0.0 {
            Default::default()
        } else {
            (self.s00 * weights.x
                + self.s10 * weights.y
                + self.s01 * weights.z
                + self.s11 * weights.w)
                / w_sum
        }
    }
}
