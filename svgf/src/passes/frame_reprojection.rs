use std::time::Duration;

use svgf_kernels::{frame_reprojection, Camera, SurfaceMap};

use crate::{ComputePass, DenoiserBuffers};

#[derive(Debug)]
pub struct FrameReprojectionPass {
    pass: ComputePass,
}

impl FrameReprojectionPass {
    pub fn new() -> Self {
        Self {
            pass: ComputePass::new("frame_reprojection"),
        }
    }

    /// Fills the reprojection map; without previous camera (first frame,
    /// freshly reset history etc.) every pixel is marked as disoccluded.
    pub fn run(
        &self,
        buffers: &mut DenoiserBuffers,
        prev_camera: Option<&Camera>,
    ) -> Duration {
        let DenoiserBuffers {
            positions,
            surface_maps,
            reprojection_map,
            ..
        } = buffers;

        let Some(prev_camera) = prev_camera else {
            reprojection_map.clear();

            return Duration::ZERO;
        };

        let surface_map = SurfaceMap::new(surface_maps.curr().readable());
        let prev_surface_map = SurfaceMap::new(surface_maps.prev().readable());
        let position_map = positions.readable();

        self.pass.run(reprojection_map, |screen_pos| {
            frame_reprojection::main(
                screen_pos,
                prev_camera,
                surface_map,
                prev_surface_map,
                position_map,
            )
            .serialize()
        })
    }
}
