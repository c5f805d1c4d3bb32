use std::time::Duration;

use glam::Vec4Swizzles;
use log::trace;
use rayon::prelude::*;
use svgf_kernels::{frame_denoising, ReprojectionMap, SurfaceMap};

use crate::{ComputePass, DenoiserBuffers, DenoiserParams};

#[derive(Debug)]
pub struct FrameDenoisingPass {
    reproject_pass: ComputePass,
    estimate_variance_pass: ComputePass,
    wavelet_pass: ComputePass,
}

impl FrameDenoisingPass {
    pub fn new() -> Self {
        Self {
            reproject_pass: ComputePass::new("frame_denoising_reproject"),
            estimate_variance_pass: ComputePass::new(
                "frame_denoising_estimate_variance",
            ),
            wavelet_pass: ComputePass::new("frame_denoising_wavelet"),
        }
    }

    /// Integrates current samples with history, writing into the current
    /// halves of `colors` and `moments`.
    pub fn integrate(
        &self,
        buffers: &mut DenoiserBuffers,
        params: &DenoiserParams,
    ) -> Duration {
        let DenoiserBuffers {
            samples,
            reprojection_map,
            colors,
            moments,
            ..
        } = buffers;

        let params = params.temporal_pass_params();
        let samples = samples.readable();
        let reprojection_map =
            ReprojectionMap::new(reprojection_map.readable());
        let (colors, prev_colors) = colors.split_mut();
        let (moments, prev_moments) = moments.split_mut();
        let prev_colors = prev_colors.readable();
        let prev_moments = prev_moments.readable();

        self.reproject_pass.run_pair(colors, moments, |screen_pos| {
            frame_denoising::reproject(
                screen_pos,
                &params,
                reprojection_map,
                samples,
                prev_colors,
                prev_moments,
            )
        })
    }

    /// Estimates variance, writing `(color, variance)` into the stash.
    pub fn estimate_variance(
        &self,
        buffers: &mut DenoiserBuffers,
        params: &DenoiserParams,
    ) -> Duration {
        let DenoiserBuffers {
            surface_maps,
            colors,
            moments,
            stash,
            ..
        } = buffers;

        let params = params.variance_estimation_pass_params();
        let surface_map = SurfaceMap::new(surface_maps.curr().readable());
        let colors = colors.curr().readable();
        let moments = moments.curr().readable();

        self.estimate_variance_pass
            .run(stash.curr_mut(), |screen_pos| {
                frame_denoising::estimate_variance(
                    screen_pos,
                    &params,
                    surface_map,
                    colors,
                    moments,
                )
            })
    }

    /// Runs the à-trous iterations over the stash and writes the final image
    /// into `output`.
    pub fn filter(
        &self,
        buffers: &mut DenoiserBuffers,
        params: &DenoiserParams,
    ) -> Duration {
        let DenoiserBuffers {
            surface_maps,
            colors,
            stash,
            output,
            ..
        } = buffers;

        let surface_map = SurfaceMap::new(surface_maps.curr().readable());
        let feedback_iteration = params.feedback_iteration();
        let mut tt = Duration::ZERO;

        for nth in 0..params.iterations {
            let pass_params = params.wavelet_pass_params(nth);

            stash.flip();

            let (stash_out, stash_in) = stash.split_mut();
            let stash_in = stash_in.readable();

            tt += self.wavelet_pass.run(stash_out, |screen_pos| {
                frame_denoising::wavelet(
                    screen_pos,
                    &pass_params,
                    surface_map,
                    stash_in,
                )
            });

            if feedback_iteration == Some(nth) {
                trace!("Seeding history with wavelet iteration #{nth}");

                colors.curr_mut().copy_from(stash.curr());
            }
        }

        output
            .par_iter_mut()
            .zip(stash.curr().data().par_iter())
            .for_each(|(output, texel)| {
                *output = texel.xyz();
            });

        tt
    }
}
