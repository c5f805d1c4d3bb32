//! Spatiotemporal variance-guided filtering.
//!
//! The denoiser runs in three stages:
//!
//! - [`reproject()`] integrates the current, noisy sample with the history
//!   gathered during previous frames (color + first two luminance moments),
//! - [`estimate_variance()`] turns those moments into per-pixel variance,
//!   falling back to a spatial estimate for pixels with short history,
//! - [`wavelet()`] is a single iteration of the edge-stopping à-trous filter;
//!   the host runs it a couple of times with growing stride.
//!
//! Thanks to:
//!
//! - https://research.nvidia.com/publication/2017-07_spatiotemporal-variance-guided-filtering-real-time-reconstruction-path-traced
//!   (Spatiotemporal Variance-Guided Filtering by Schied et al.)
//!
//! - https://jo.dreggn.org/home/2010_atrous.pdf
//!   (Edge-Avoiding À-Trous Wavelet Transform by Dammertz et al.)

use glam::{ivec2, vec3, vec4, UVec2, Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::{
    lerp, BilinearFilter, F32Ext, ReprojectionMap, SurfaceMap,
    TemporalPassParams, TexRgba32, VarianceEstimationPassParams, Vec3Ext,
    WaveletPassParams, MAX_HISTORY_LENGTH, SVGF_EPSILON,
    VARIANCE_HISTORY_THRESHOLD, VARIANCE_WINDOW_RADIUS,
};

/// One-dimensional B3-spline kernel, indexed by distance from the center tap.
pub const WAVELET_KERNEL: [f32; 3] = [3.0 / 8.0, 1.0 / 4.0, 1.0 / 16.0];

/// Gaussian kernel used to pre-filter variance, indexed by `|dx| + |dy|`.
const VARIANCE_KERNEL: [f32; 3] = [1.0 / 4.0, 1.0 / 8.0, 1.0 / 16.0];

/// Lower bound of the depth-weight's denominator; without it a perfectly flat,
/// camera-facing surface would reject samples differing by round-off only.
const DEPTH_LEEWAY: f32 = 1.0e-2;

/// Integrates current sample with its history.
///
/// Returns `(color, moments)`, where `moments` is `(history length, first
/// luminance moment, second luminance moment, unused)`.
pub fn reproject(
    screen_pos: UVec2,
    params: &TemporalPassParams,
    reprojection_map: ReprojectionMap,
    samples: TexRgba32,
    prev_colors: TexRgba32,
    prev_moments: TexRgba32,
) -> (Vec4, Vec4) {
    let sample = samples.read(screen_pos).xyz();
    let sample_luma = sample.luma();
    let reprojection = reprojection_map.get(screen_pos);

    if reprojection.is_none() {
        return (
            sample.extend(0.0),
            vec4(1.0, sample_luma, sample_luma.sqr(), 0.0),
        );
    }

    let prev_color = BilinearFilter::reproject(reprojection, move |pos| {
        prev_colors.read(pos)
    })
    .xyz();

    let prev_moment = BilinearFilter::reproject(reprojection, move |pos| {
        prev_moments.read(pos)
    });

    let prev_history = prev_moment.x.round().max(0.0);
    let prev_m1 = prev_moment.y;
    let prev_m2 = prev_moment.z;

    let history = (prev_history + 1.0).min(MAX_HISTORY_LENGTH);

    if !params.accumulate() {
        // Keep counting history, so that re-enabling accumulation doesn't
        // start from scratch
        return (
            sample.extend(0.0),
            vec4(history, sample_luma, sample_luma.sqr(), 0.0),
        );
    }

    let alpha = params.alpha.max(1.0 / history);
    let moments_alpha = params.moments_alpha.max(1.0 / history);

    let color = lerp(prev_color, sample, alpha);
    let m1 = lerp(prev_m1, sample_luma, moments_alpha);
    let m2 = lerp(prev_m2, sample_luma.sqr(), moments_alpha);

    (color.extend(0.0), vec4(history, m1, m2, 0.0))
}

/// Estimates variance of given pixel, returning `(color, variance)`.
pub fn estimate_variance(
    screen_pos: UVec2,
    params: &VarianceEstimationPassParams,
    surface_map: SurfaceMap,
    colors: TexRgba32,
    moments: TexRgba32,
) -> Vec4 {
    let center_surface = surface_map.get(screen_pos);
    let center_color = colors.read(screen_pos).xyz();

    if center_surface.is_sky() {
        return center_color.extend(0.0);
    }

    let center_moment = moments.read(screen_pos);

    if center_moment.x >= VARIANCE_HISTORY_THRESHOLD {
        return center_color
            .extend(moments_to_variance(center_moment.y, center_moment.z));
    }

    // Our temporal history is too short to say anything meaningful about the
    // variance - let's estimate it from the neighbourhood instead
    let center_gradient = surface_map.depth_gradient(screen_pos);
    let mut sum = Vec3::ZERO;

    for dy in -VARIANCE_WINDOW_RADIUS..=VARIANCE_WINDOW_RADIUS {
        for dx in -VARIANCE_WINDOW_RADIUS..=VARIANCE_WINDOW_RADIUS {
            let offset = ivec2(dx, dy);
            let sample_pos = screen_pos.as_ivec2() + offset;

            if !surface_map.contains(sample_pos) {
                continue;
            }

            let sample_pos = sample_pos.as_uvec2();
            let sample_surface = surface_map.get(sample_pos);

            if sample_surface.is_sky() {
                continue;
            }

            let sample_weight = depth_weight(
                center_surface.depth,
                sample_surface.depth,
                center_gradient,
                offset.as_vec2(),
                params.sigma_depth,
            ) * normal_weight(
                center_surface.normal,
                sample_surface.normal,
                params.sigma_normal,
            );

            let sample_luma = colors.read(sample_pos).xyz().luma();

            sum += vec3(sample_luma, sample_luma.sqr(), 1.0) * sample_weight;
        }
    }

    let variance = if sum.z > SVGF_EPSILON {
        moments_to_variance(sum.x / sum.z, sum.y / sum.z)
    } else {
        0.0
    };

    center_color.extend(variance)
}

/// Performs a single iteration of the à-trous filter, returning `(color,
/// variance)`.
pub fn wavelet(
    screen_pos: UVec2,
    params: &WaveletPassParams,
    surface_map: SurfaceMap,
    input: TexRgba32,
) -> Vec4 {
    let center_surface = surface_map.get(screen_pos);
    let center = input.read(screen_pos);

    if center_surface.is_sky() {
        return center;
    }

    let center_color = center.xyz();
    let center_var = center.w.max(0.0);
    let center_luma = center_color.luma();
    let center_gradient = surface_map.depth_gradient(screen_pos);

    // Variance is pretty noisy itself, so it gets blurred a bit before being
    // used to drive the luminance weight
    let center_var_avg = {
        let mut sum = 0.0;
        let mut sum_weights = 0.0;

        for dy in -1..=1 {
            for dx in -1..=1 {
                let sample_pos = screen_pos.as_ivec2() + ivec2(dx, dy);

                if !input.contains(sample_pos)
                    || surface_map.get(sample_pos.as_uvec2()).is_sky()
                {
                    continue;
                }

                let weight = VARIANCE_KERNEL[(dx.abs() + dy.abs()) as usize];

                sum += input.read(sample_pos.as_uvec2()).w.max(0.0) * weight;
                sum_weights += weight;
            }
        }

        sum / sum_weights
    };

    let center_weight = WAVELET_KERNEL[0] * WAVELET_KERNEL[0];
    let mut sum_weights = center_weight;
    let mut sum_color = center_color * center_weight;
    let mut sum_var = center_var * center_weight.sqr();

    for dy in -2..=2 {
        for dx in -2..=2 {
            if dx == 0 && dy == 0 {
                continue;
            }

            let offset = ivec2(dx, dy) * (params.stride as i32);
            let sample_pos = screen_pos.as_ivec2() + offset;

            if !surface_map.contains(sample_pos) {
                continue;
            }

            let sample_pos = sample_pos.as_uvec2();
            let sample_surface = surface_map.get(sample_pos);

            if sample_surface.is_sky() {
                continue;
            }

            let sample = input.read(sample_pos);
            let sample_color = sample.xyz();

            let kernel_weight = WAVELET_KERNEL[dx.unsigned_abs() as usize]
                * WAVELET_KERNEL[dy.unsigned_abs() as usize];

            let sample_weight = kernel_weight
                * depth_weight(
                    center_surface.depth,
                    sample_surface.depth,
                    center_gradient,
                    offset.as_vec2(),
                    params.sigma_depth,
                )
                * normal_weight(
                    center_surface.normal,
                    sample_surface.normal,
                    params.sigma_normal,
                )
                * luma_weight(
                    center_luma,
                    sample_color.luma(),
                    params.sigma_luminance,
                    center_var_avg,
                );

            if sample_weight > 0.0 {
                sum_weights += sample_weight;
                sum_color += sample_color * sample_weight;
                sum_var += sample.w.max(0.0) * sample_weight.sqr();
            }
        }
    }

    // The center tap always contributes, so `sum_weights` stays positive and
    // rejecting every neighbour leaves the center sample untouched
    (sum_color / sum_weights).extend(sum_var / sum_weights.sqr())
}

/// Turns first and second moment into variance.
///
/// Round-off can make `m2` slightly smaller than `m1²`, hence the clamping.
pub fn moments_to_variance(m1: f32, m2: f32) -> f32 {
    (m2 - m1.sqr()).max(0.0)
}

/// Edge-stopping weight based on difference in depth.
///
/// `gradient` is the screen-space depth gradient at the center pixel and
/// `offset` is the screen-space distance to the sample - together they tell
/// how much of the difference is expected due to the surface being oblique.
pub fn depth_weight(
    center_depth: f32,
    sample_depth: f32,
    gradient: Vec2,
    offset: Vec2,
    sigma_depth: f32,
) -> f32 {
    let diff = (center_depth - sample_depth).abs();
    let leeway = sigma_depth * gradient.dot(offset).abs() + DEPTH_LEEWAY;

    (-diff / leeway).exp()
}

/// Edge-stopping weight based on difference in normals.
///
/// Opposing or perpendicular normals yield zero.
pub fn normal_weight(
    center_normal: Vec3,
    sample_normal: Vec3,
    sigma_normal: f32,
) -> f32 {
    center_normal.dot(sample_normal).max(0.0).powf(sigma_normal)
}

/// Edge-stopping weight based on difference in luminance, relative to the
/// local standard deviation.
pub fn luma_weight(
    center_luma: f32,
    sample_luma: f32,
    sigma_luminance: f32,
    variance: f32,
) -> f32 {
    let diff = (center_luma - sample_luma).abs();
    let leeway = sigma_luminance * variance.max(0.0).sqrt() + SVGF_EPSILON;

    (-diff / leeway).exp()
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use glam::{uvec2, vec2};

    use super::*;
    use crate::{Reprojection, Surface};

    const SIZE: UVec2 = UVec2::new(8, 8);

    fn texture(f: impl Fn(UVec2) -> Vec4) -> Vec<Vec4> {
        (0..SIZE.y)
            .flat_map(|y| (0..SIZE.x).map(move |x| uvec2(x, y)))
            .map(f)
            .collect()
    }

    fn flat_surfaces() -> Vec<Vec4> {
        texture(|_| {
            Surface {
                normal: vec3(0.0, 0.0, 1.0),
                depth: 1.0,
            }
            .serialize()
        })
    }

    fn tex(data: &[Vec4]) -> TexRgba32 {
        TexRgba32::new(data, SIZE)
    }

    fn exact_reprojections() -> Vec<Vec4> {
        texture(|pos| {
            Reprojection {
                prev_x: pos.x as f32,
                prev_y: pos.y as f32,
                confidence: 1.0,
                validity: 0b0001,
            }
            .serialize()
        })
    }

    fn temporal_params(alpha: f32, accumulate: bool) -> TemporalPassParams {
        TemporalPassParams {
            alpha,
            moments_alpha: alpha,
            accumulate: accumulate as u32,
        }
    }

    fn wavelet_params(stride: u32) -> WaveletPassParams {
        WaveletPassParams {
            stride,
            sigma_depth: 1.0,
            sigma_normal: 128.0,
            sigma_luminance: 4.0,
        }
    }

    #[test]
    fn variance_is_never_negative() {
        assert_eq!(0.0, moments_to_variance(0.0, 0.0));
        assert_eq!(0.0, moments_to_variance(1.0, 1.0));
        assert_eq!(0.0, moments_to_variance(0.1, 0.01 - f32::EPSILON));
        assert_eq!(0.0, moments_to_variance(1.0e3, 1.0e6 - 1.0));
        assert_eq!(0.0, moments_to_variance(f32::NAN, 1.0));
        assert_relative_eq!(0.25, moments_to_variance(0.5, 0.5));

        for n in 0..1000 {
            let m1 = (n as f32) * 0.37;
            let m2 = m1 * m1 * (1.0 - f32::EPSILON * (n % 3) as f32);

            assert!(moments_to_variance(m1, m2) >= 0.0);
        }
    }

    #[test]
    fn normal_weight_stops_at_edges() {
        let n = vec3(0.0, 0.0, 1.0);

        assert_eq!(1.0, normal_weight(n, n, 128.0));
        assert_eq!(0.0, normal_weight(n, vec3(1.0, 0.0, 0.0), 128.0));
        assert_eq!(0.0, normal_weight(n, -n, 128.0));

        let slightly_off = vec3(0.0, 0.1, 1.0).normalize();
        let very_off = vec3(0.0, 1.0, 1.0).normalize();

        assert!(normal_weight(n, slightly_off, 128.0) < 1.0);
        assert!(normal_weight(n, very_off, 128.0) < 1.0e-6);

        assert!(
            normal_weight(n, slightly_off, 128.0)
                < normal_weight(n, slightly_off, 16.0)
        );
    }

    #[test]
    fn depth_weight_is_monotonic() {
        let grad = vec2(0.0, 0.0);
        let offset = vec2(1.0, 0.0);

        assert_eq!(1.0, depth_weight(1.0, 1.0, grad, offset, 1.0));

        let near = depth_weight(1.0, 1.001, grad, offset, 1.0);
        let far = depth_weight(1.0, 1.1, grad, offset, 1.0);

        assert!(near > far);
        assert!(far < 1.0e-3);
    }

    #[test]
    fn depth_weight_tolerates_oblique_surfaces() {
        let grad = vec2(0.5, 0.0);

        // Sample two pixels away on a ramp climbing 0.5 per pixel
        let along = depth_weight(1.0, 2.0, grad, vec2(2.0, 0.0), 1.0);

        // Same depth difference, but perpendicular to the gradient
        let across = depth_weight(1.0, 2.0, grad, vec2(0.0, 2.0), 1.0);

        assert!(along > 0.3);
        assert!(across < 1.0e-6);
    }

    #[test]
    fn luma_weight_is_variance_guided() {
        assert_eq!(1.0, luma_weight(0.5, 0.5, 4.0, 0.0));
        assert!(luma_weight(0.5, 0.6, 4.0, 0.0) < 1.0e-6);

        let low_var = luma_weight(0.5, 0.6, 4.0, 0.001);
        let high_var = luma_weight(0.5, 0.6, 4.0, 0.1);

        assert!(low_var < high_var);
    }

    #[test]
    fn reproject_without_history() {
        let samples = texture(|_| vec4(1.0, 2.0, 3.0, 0.0));
        let reprojections = texture(|_| Reprojection::default().serialize());
        let history = texture(|_| vec4(9.0, 9.0, 9.0, 9.0));

        let (color, moment) = reproject(
            uvec2(1, 1),
            &temporal_params(0.2, true),
            ReprojectionMap::new(tex(&reprojections)),
            tex(&samples),
            tex(&history),
            tex(&history),
        );

        let luma = vec3(1.0, 2.0, 3.0).luma();

        assert_eq!(vec3(1.0, 2.0, 3.0), color.xyz());
        assert_eq!(1.0, moment.x);
        assert_eq!(luma, moment.y);
        assert_eq!(luma * luma, moment.z);
    }

    #[test]
    fn reproject_with_history() {
        let samples = texture(|_| vec4(1.0, 1.0, 1.0, 0.0));
        let reprojections = exact_reprojections();
        let prev_colors = texture(|_| Vec4::ZERO);
        let prev_moments = texture(|_| vec4(9.0, 0.0, 0.0, 0.0));

        let (color, moment) = reproject(
            uvec2(1, 1),
            &temporal_params(0.2, true),
            ReprojectionMap::new(tex(&reprojections)),
            tex(&samples),
            tex(&prev_colors),
            tex(&prev_moments),
        );

        assert_eq!(10.0, moment.x);

        // alpha = max(0.2, 1 / 10)
        assert_relative_eq!(0.2, color.x);
        assert_relative_eq!(0.2, moment.y, epsilon = 1.0e-6);
        assert_relative_eq!(0.2, moment.z, epsilon = 1.0e-6);
    }

    #[test]
    fn reproject_caps_history() {
        let samples = texture(|_| Vec4::ONE);
        let reprojections = exact_reprojections();
        let prev = texture(|_| vec4(MAX_HISTORY_LENGTH, 0.0, 0.0, 0.0));

        let (_, moment) = reproject(
            uvec2(0, 0),
            &temporal_params(0.2, true),
            ReprojectionMap::new(tex(&reprojections)),
            tex(&samples),
            tex(&prev),
            tex(&prev),
        );

        assert_eq!(MAX_HISTORY_LENGTH, moment.x);
    }

    #[test]
    fn reproject_without_accumulation() {
        let samples = texture(|_| vec4(0.5, 0.5, 0.5, 0.0));
        let reprojections = exact_reprojections();
        let prev_colors = texture(|_| Vec4::ONE);
        let prev_moments = texture(|_| vec4(3.0, 1.0, 1.0, 0.0));

        let (color, moment) = reproject(
            uvec2(2, 2),
            &temporal_params(0.2, false),
            ReprojectionMap::new(tex(&reprojections)),
            tex(&samples),
            tex(&prev_colors),
            tex(&prev_moments),
        );

        assert_eq!(vec3(0.5, 0.5, 0.5), color.xyz());
        assert_eq!(4.0, moment.x);
    }

    #[test]
    fn variance_from_moments() {
        let surfaces = flat_surfaces();
        let colors = texture(|_| Vec4::ONE);
        let moments = texture(|_| vec4(10.0, 0.5, 0.5, 0.0));

        let out = estimate_variance(
            uvec2(3, 3),
            &VarianceEstimationPassParams {
                sigma_depth: 1.0,
                sigma_normal: 128.0,
            },
            SurfaceMap::new(tex(&surfaces)),
            tex(&colors),
            tex(&moments),
        );

        assert_eq!(Vec3::ONE, out.xyz());
        assert_relative_eq!(0.25, out.w);
    }

    #[test]
    fn variance_from_neighbourhood() {
        let surfaces = flat_surfaces();

        // Checkerboard of zeros and ones
        let colors = texture(|pos| {
            if (pos.x + pos.y) % 2 == 0 {
                Vec4::ZERO
            } else {
                vec4(1.0, 1.0, 1.0, 0.0)
            }
        });

        let moments = texture(|_| vec4(1.0, 0.0, 0.0, 0.0));

        let out = estimate_variance(
            uvec2(3, 3),
            &VarianceEstimationPassParams {
                sigma_depth: 1.0,
                sigma_normal: 128.0,
            },
            SurfaceMap::new(tex(&surfaces)),
            tex(&colors),
            tex(&moments),
        );

        // 49 taps: 25 zeros and 24 ones
        let m1 = 24.0 / 49.0;

        assert_relative_eq!(m1 - m1 * m1, out.w, epsilon = 1.0e-3);
    }

    #[test]
    fn wavelet_preserves_uniform_images() {
        let surfaces = flat_surfaces();
        let input = texture(|_| vec4(0.3, 0.6, 0.9, 0.01));

        for stride in [1, 2, 4] {
            let out = wavelet(
                uvec2(3, 4),
                &wavelet_params(stride),
                SurfaceMap::new(tex(&surfaces)),
                tex(&input),
            );

            assert_relative_eq!(0.3, out.x, epsilon = 1.0e-5);
            assert_relative_eq!(0.6, out.y, epsilon = 1.0e-5);
            assert_relative_eq!(0.9, out.z, epsilon = 1.0e-5);

            // Averaging shrinks variance
            assert!(out.w < 0.01);
        }
    }

    #[test]
    fn wavelet_smooths_noise() {
        let surfaces = flat_surfaces();

        let input = texture(|pos| {
            let luma = if (pos.x + pos.y) % 2 == 0 { 0.4 } else { 0.6 };

            vec4(luma, luma, luma, 0.01)
        });

        let out = wavelet(
            uvec2(3, 3),
            &wavelet_params(1),
            SurfaceMap::new(tex(&surfaces)),
            tex(&input),
        );

        assert!(out.x > 0.4);
        assert!(out.x < 0.6);
    }

    #[test]
    fn wavelet_falls_back_to_center_when_all_taps_are_rejected() {
        // Every neighbour faces a different direction
        let surfaces = texture(|pos| {
            let normal = if pos == uvec2(3, 3) {
                vec3(0.0, 0.0, 1.0)
            } else {
                vec3(1.0, 0.0, 0.0)
            };

            Surface { normal, depth: 1.0 }.serialize()
        });

        let input = texture(|pos| {
            if pos == uvec2(3, 3) {
                vec4(0.25, 0.5, 0.75, 0.02)
            } else {
                vec4(5.0, 5.0, 5.0, 1.0)
            }
        });

        let out = wavelet(
            uvec2(3, 3),
            &wavelet_params(1),
            SurfaceMap::new(tex(&surfaces)),
            tex(&input),
        );

        assert_eq!(vec3(0.25, 0.5, 0.75), out.xyz());
        assert_abs_diff_eq!(0.02, out.w, epsilon = 1.0e-7);
    }

    #[test]
    fn wavelet_skips_sky() {
        let surfaces = texture(|_| Vec4::ZERO);
        let input = texture(|pos| Vec4::splat(pos.x as f32));

        let out = wavelet(
            uvec2(3, 3),
            &wavelet_params(1),
            SurfaceMap::new(tex(&surfaces)),
            tex(&input),
        );

        assert_eq!(Vec4::splat(3.0), out);
    }

    #[test]
    fn wavelet_ignores_variance_of_sky_neighbours() {
        // Row right above the center pixel is background
        let surfaces = texture(|pos| {
            if pos.y == 2 {
                Vec4::ZERO
            } else {
                Surface {
                    normal: vec3(0.0, 0.0, 1.0),
                    depth: 1.0,
                }
                .serialize()
            }
        });

        let input = |sky_var: f32| {
            texture(|pos| {
                if pos.y == 2 {
                    Vec3::splat(0.0).extend(sky_var)
                } else if (pos.x + pos.y) % 2 == 0 {
                    Vec3::splat(0.4).extend(0.01)
                } else {
                    Vec3::splat(0.6).extend(0.01)
                }
            })
        };

        let run = |input: &[Vec4]| {
            wavelet(
                uvec2(3, 3),
                &wavelet_params(1),
                SurfaceMap::new(tex(&surfaces)),
                tex(input),
            )
        };

        let with_zero = run(&input(0.0));
        let with_large = run(&input(100.0));

        assert_eq!(with_zero, with_large);
        assert!(with_zero.is_finite());
    }
}
