use std::time::{Duration, Instant};

use glam::{uvec2, UVec2, Vec4};
use log::trace;
use rayon::prelude::*;

use crate::Texture;

/// Runs a kernel for every pixel of the output texture.
///
/// Rows are processed in parallel; since kernels only get read-only views of
/// their inputs, returning from [`Self::run()`] acts as a barrier between
/// passes.
#[derive(Debug)]
pub struct ComputePass {
    label: &'static str,
}

impl ComputePass {
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }

    pub fn run<F>(&self, output: &mut Texture, kernel: F) -> Duration
    where
        F: Fn(UVec2) -> Vec4 + Sync,
    {
        let tt = Instant::now();
        let width = output.size().x as usize;

        output
            .data_mut()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, texel) in row.iter_mut().enumerate() {
                    *texel = kernel(uvec2(x as u32, y as u32));
                }
            });

        self.finish(tt)
    }

    /// Same as [`Self::run()`], but for kernels producing two outputs.
    pub fn run_pair<F>(
        &self,
        output_a: &mut Texture,
        output_b: &mut Texture,
        kernel: F,
    ) -> Duration
    where
        F: Fn(UVec2) -> (Vec4, Vec4) + Sync,
    {
        assert_eq!(output_a.size(), output_b.size());

        let tt = Instant::now();
        let width = output_a.size().x as usize;

        output_a
            .data_mut()
            .par_chunks_mut(width)
            .zip(output_b.data_mut().par_chunks_mut(width))
            .enumerate()
            .for_each(|(y, (row_a, row_b))| {
                for (x, (texel_a, texel_b)) in
                    row_a.iter_mut().zip(row_b.iter_mut()).enumerate()
                {
                    (*texel_a, *texel_b) = kernel(uvec2(x as u32, y as u32));
                }
            });

        self.finish(tt)
    }

    fn finish(&self, tt: Instant) -> Duration {
        let tt = tt.elapsed();

        trace!("Pass `{}` completed; tt={:?}", self.label, tt);

        tt
    }
}
