use std::fmt;

use glam::{UVec2, Vec3, Vec4Swizzles};
use log::{debug, info, trace, warn};
use rayon::prelude::*;
use svgf_kernels::{Camera, Reprojection};

use crate::{
    DenoiserBuffers, DenoiserParams, DenoiserPasses, Error, FrameInput,
    FrameStats, Result,
};

/// Reason why history got discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetReason {
    /// A new scene has been loaded
    SceneChanged,

    /// Camera has been teleported, so nothing from the previous frame is
    /// visible anymore
    CameraCut,

    /// Explicitly requested by the user
    UserRequest,

    /// Internal state got out of sync with the renderer (e.g. a frame has been
    /// aborted halfway through, or it's been rendered without geometry)
    StateRefreshed,

    /// Buffers have been reallocated
    Resized,
}

impl fmt::Display for ResetReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            ResetReason::SceneChanged => "scene changed",
            ResetReason::CameraCut => "camera cut",
            ResetReason::UserRequest => "user request",
            ResetReason::StateRefreshed => "state refreshed",
            ResetReason::Resized => "resized",
        };

        write!(f, "{}", reason)
    }
}

/// History of a single pixel, as integrated so far.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HistorySample {
    pub color: Vec3,

    /// First moment of luminance
    pub m1: f32,

    /// Second moment of luminance
    pub m2: f32,

    pub history_length: f32,
}

impl HistorySample {
    pub fn variance(&self) -> f32 {
        svgf_kernels::frame_denoising::moments_to_variance(self.m1, self.m2)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Idle,
    Uploaded,
    Integrated,
    VarianceEstimated,
}

/// Spatiotemporal, variance-guided denoiser.
///
/// Usually driven through [`Self::render()`], which runs the entire pipeline;
/// the separate stages ([`Self::upload()`], [`Self::integrate()`],
/// [`Self::estimate_variance()`] and [`Self::filter()`]) are exposed for
/// callers that want to inspect buffers in-between.
#[derive(Debug)]
pub struct Denoiser {
    params: DenoiserParams,
    buffers: DenoiserBuffers,
    passes: DenoiserPasses,
    camera: Camera,
    prev_camera: Option<Camera>,
    frame: u64,
    frames_accumulated: u32,
    stats: FrameStats,
    stage: Stage,
}

impl Denoiser {
    pub fn new(size: UVec2, params: DenoiserParams) -> Result<Self> {
        Self::validate_size(size)?;

        let params = params.validate()?;

        info!(
            "Creating denoiser ({}x{}, {} iteration(s))",
            size.x, size.y, params.iterations
        );

        Ok(Self {
            params,
            buffers: DenoiserBuffers::new(size),
            passes: DenoiserPasses::new(),
            camera: Camera::new(Default::default(), size),
            prev_camera: None,
            frame: 0,
            frames_accumulated: 0,
            stats: Default::default(),
            stage: Stage::Idle,
        })
    }

    /// Updates parameters; takes effect starting from the next stage that gets
    /// run.
    ///
    /// Invalid parameters are rejected, leaving the current ones intact.
    pub fn configure(&mut self, params: DenoiserParams) -> Result<()> {
        self.params = params.validate()?;

        debug!("Denoiser reconfigured: {:?}", self.params);

        Ok(())
    }

    pub fn params(&self) -> &DenoiserParams {
        &self.params
    }

    pub fn size(&self) -> UVec2 {
        self.buffers.size()
    }

    /// Returns the number of frames rendered so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Returns the number of consecutive frames integrated since the last
    /// reset.
    pub fn frames_accumulated(&self) -> u32 {
        self.frames_accumulated
    }

    /// Returns statistics of the most recent frame.
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn buffers(&self) -> &DenoiserBuffers {
        &self.buffers
    }

    /// Returns the most recently denoised image.
    pub fn output(&self) -> &[Vec3] {
        &self.buffers.output
    }

    /// Same as [`Self::output()`], but as a tightly packed array of floats.
    pub fn output_raw(&self) -> &[f32] {
        bytemuck::cast_slice(&self.buffers.output)
    }

    /// Returns the history of given pixel, or `None` if the pixel lies
    /// outside of the screen.
    pub fn history(&self, pos: UVec2) -> Option<HistorySample> {
        if !pos.cmplt(self.size()).all() {
            return None;
        }

        let color = self.buffers.colors.curr().read(pos).xyz();
        let moments = self.buffers.moments.curr().read(pos);

        Some(HistorySample {
            color,
            m1: moments.y,
            m2: moments.z,
            history_length: moments.x,
        })
    }

    /// Reallocates all of the buffers, discarding history (and the frame
    /// that's in flight, if any).
    pub fn resize(&mut self, size: UVec2) -> Result<()> {
        Self::validate_size(size)?;

        info!(
            "Resizing denoiser ({}x{} -> {}x{})",
            self.size().x,
            self.size().y,
            size.x,
            size.y
        );

        self.buffers = DenoiserBuffers::new(size);
        self.camera = Camera::new(Default::default(), size);
        self.stage = Stage::Idle;
        self.reset(ResetReason::Resized);

        Ok(())
    }

    /// Discards history, without reallocating buffers; the next frame will be
    /// integrated from scratch.
    pub fn reset(&mut self, reason: ResetReason) {
        debug!("Resetting denoiser's history ({})", reason);

        self.buffers.reset_history();
        self.prev_camera = None;
        self.frames_accumulated = 0;
    }

    /// Denoises a single frame, returning the denoised image.
    ///
    /// If the camera's screen size differs from the denoiser's, buffers get
    /// resized first (discarding history). If any of the geometry buffers is
    /// missing, the raw colors are passed through.
    pub fn render(
        &mut self,
        camera: Camera,
        input: &FrameInput,
    ) -> Result<&[Vec3]> {
        if camera.screen_size() != self.size() {
            self.resize(camera.screen_size())?;
        }

        let colors = input.colors()?;

        input.validate(self.len())?;

        if let Some(buffer) = input.missing_geometry() {
            warn!(
                "Frame #{} is missing `{}`, passing it through",
                self.frame, buffer
            );

            return Ok(self.passthrough(colors));
        }

        self.upload(camera, input)?;
        self.integrate();
        self.estimate_variance();

        Ok(self.filter())
    }

    /// Starts a new frame, uploading its buffers.
    ///
    /// Contrary to [`Self::render()`], all of the input buffers are required
    /// here and the camera must match denoiser's size.
    pub fn upload(&mut self, camera: Camera, input: &FrameInput) -> Result<()> {
        let size = camera.screen_size();

        if size != self.size() {
            return Err(Error::InvalidResolution {
                width: size.x,
                height: size.y,
            });
        }

        let colors = input.colors()?;

        input.validate(self.len())?;

        let Some((positions, normals, depths)) = input.geometry() else {
            return Err(Error::MissingInput(
                input.missing_geometry().unwrap_or_default(),
            ));
        };

        if self.stage != Stage::Idle {
            warn!(
                "Frame #{} has been aborted before completion",
                self.stats.frame
            );

            self.reset(ResetReason::StateRefreshed);
        }

        trace!("Frame #{}: uploading", self.frame);

        self.buffers.begin_frame();
        self.camera = camera;

        self.stats = FrameStats {
            frame: self.frame,
            total_pixels: self.len(),
            ..Default::default()
        };

        let DenoiserBuffers {
            samples,
            positions: position_map,
            surface_maps,
            ..
        } = &mut self.buffers;

        samples
            .data_mut()
            .par_iter_mut()
            .zip(colors.par_iter())
            .for_each(|(texel, color)| {
                *texel = color.extend(0.0);
            });

        position_map
            .data_mut()
            .par_iter_mut()
            .zip(positions.par_iter())
            .for_each(|(texel, position)| {
                *texel = position.extend(0.0);
            });

        surface_maps
            .curr_mut()
            .data_mut()
            .par_iter_mut()
            .zip(normals.par_iter().zip(depths.par_iter()))
            .for_each(|(texel, (normal, depth))| {
                // Edge-stopping and reprojection rely on unit normals
                *texel = normal.normalize_or_zero().extend(*depth);
            });

        self.stage = Stage::Uploaded;

        Ok(())
    }

    /// Reprojects the uploaded frame and integrates it with history.
    pub fn integrate(&mut self) {
        assert_eq!(Stage::Uploaded, self.stage, "frame hasn't been uploaded");

        trace!("Frame #{}: integrating", self.frame);

        self.stats.tt_reprojection = self
            .passes
            .frame_reprojection
            .run(&mut self.buffers, self.prev_camera.as_ref());

        self.stats.tt_integration = self
            .passes
            .frame_denoising
            .integrate(&mut self.buffers, &self.params);

        self.stats.reprojected_pixels = self
            .buffers
            .reprojection_map
            .data()
            .par_iter()
            .filter(|texel| Reprojection::deserialize(**texel).is_some())
            .count();

        self.stats.mean_history_length = self
            .buffers
            .moments
            .curr()
            .data()
            .par_iter()
            .map(|texel| texel.x)
            .sum::<f32>()
            / (self.len() as f32);

        self.stage = Stage::Integrated;
    }

    pub fn estimate_variance(&mut self) {
        assert_eq!(
            Stage::Integrated,
            self.stage,
            "frame hasn't been integrated"
        );

        trace!("Frame #{}: estimating variance", self.frame);

        self.stats.tt_variance_estimation = self
            .passes
            .frame_denoising
            .estimate_variance(&mut self.buffers, &self.params);

        self.stage = Stage::VarianceEstimated;
    }

    /// Runs the spatial filter and finishes the frame, returning the denoised
    /// image.
    pub fn filter(&mut self) -> &[Vec3] {
        assert_eq!(
            Stage::VarianceEstimated,
            self.stage,
            "frame's variance hasn't been estimated"
        );

        trace!("Frame #{}: filtering", self.frame);

        self.stats.tt_filtering = self
            .passes
            .frame_denoising
            .filter(&mut self.buffers, &self.params);

        self.prev_camera = Some(self.camera);
        self.stage = Stage::Idle;

        if self.params.accumulate {
            self.frames_accumulated = self.frames_accumulated.saturating_add(1);
        } else {
            self.frames_accumulated = 0;
        }

        self.finish()
    }

    fn passthrough(&mut self, colors: &[Vec3]) -> &[Vec3] {
        self.reset(ResetReason::StateRefreshed);
        self.stage = Stage::Idle;

        self.buffers.output.copy_from_slice(colors);

        self.stats = FrameStats {
            frame: self.frame,
            passthrough: true,
            total_pixels: self.len(),
            ..Default::default()
        };

        self.finish()
    }

    fn finish(&mut self) -> &[Vec3] {
        #[cfg(feature = "metrics")]
        trace!("{}", self.stats);

        self.frame += 1;

        &self.buffers.output
    }

    fn len(&self) -> usize {
        let size = self.size();

        (size.x as usize) * (size.y as usize)
    }

    fn validate_size(size: UVec2) -> Result<()> {
        if size.x == 0 || size.y == 0 {
            return Err(Error::InvalidResolution {
                width: size.x,
                height: size.y,
            });
        }

        Ok(())
    }
}

impl Drop for Denoiser {
    fn drop(&mut self) {
        info!(
            "Releasing denoiser ({}x{}, {} frame(s) rendered)",
            self.size().x,
            self.size().y,
            self.frame
        );
    }
}
