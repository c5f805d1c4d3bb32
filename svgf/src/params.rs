use svgf_kernels::{
    TemporalPassParams, VarianceEstimationPassParams, WaveletPassParams,
};

use crate::{Error, Result};

/// Maximum number of à-trous iterations; the last one samples pixels
/// `2 * 2^(MAX_ITERATIONS - 1)` away from the center.
pub const MAX_ITERATIONS: u32 = 10;

/// Decides which image becomes next frame's color history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistorySource {
    /// Output of the temporal integration, before any spatial filtering.
    Integrated,

    /// Output of given (zero-indexed) à-trous iteration; falls back to
    /// [`HistorySource::Integrated`] if fewer iterations are configured.
    ///
    /// Feeding filtered color back reduces noise further, at the expense of
    /// some temporal lag.
    Iteration(u32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DenoiserParams {
    /// Number of à-trous iterations; zero disables spatial filtering.
    pub iterations: u32,

    pub sigma_depth: f32,

    /// Exponent applied to the cosine between normals.
    pub sigma_normal: f32,

    pub sigma_luminance: f32,

    /// Lower bound of the blending factor used to integrate color; smaller
    /// values mean longer (smoother, but laggier) history.
    pub alpha: f32,

    /// Same as `alpha`, but for luminance moments.
    pub moments_alpha: f32,

    /// When disabled, the current sample is passed through as-is (history
    /// length keeps being tracked though).
    pub accumulate: bool,

    pub history_source: HistorySource,
}

impl DenoiserParams {
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_sigma_depth(mut self, sigma_depth: f32) -> Self {
        self.sigma_depth = sigma_depth;
        self
    }

    pub fn with_sigma_normal(mut self, sigma_normal: f32) -> Self {
        self.sigma_normal = sigma_normal;
        self
    }

    pub fn with_sigma_luminance(mut self, sigma_luminance: f32) -> Self {
        self.sigma_luminance = sigma_luminance;
        self
    }

    /// Sets blending factor for both color and moments.
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self.moments_alpha = alpha;
        self
    }

    pub fn with_moments_alpha(mut self, moments_alpha: f32) -> Self {
        self.moments_alpha = moments_alpha;
        self
    }

    pub fn with_accumulate(mut self, accumulate: bool) -> Self {
        self.accumulate = accumulate;
        self
    }

    pub fn with_history_source(
        mut self,
        history_source: HistorySource,
    ) -> Self {
        self.history_source = history_source;
        self
    }

    /// Checks whether all of the parameters are within their domains.
    pub fn validate(self) -> Result<Self> {
        if self.iterations > MAX_ITERATIONS {
            return Err(Error::InvalidParameter {
                name: "iterations",
                value: self.iterations as f32,
                reason: "too many iterations",
            });
        }

        for (name, value) in [
            ("sigma_depth", self.sigma_depth),
            ("sigma_normal", self.sigma_normal),
            ("sigma_luminance", self.sigma_luminance),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(Error::InvalidParameter {
                    name,
                    value,
                    reason: "must be positive and finite",
                });
            }
        }

        for (name, value) in
            [("alpha", self.alpha), ("moments_alpha", self.moments_alpha)]
        {
            if !(value > 0.0 && value <= 1.0) {
                return Err(Error::InvalidParameter {
                    name,
                    value,
                    reason: "must be within (0, 1]",
                });
            }
        }

        Ok(self)
    }

    /// Returns the à-trous iteration whose output seeds next frame's history,
    /// if any.
    pub fn feedback_iteration(&self) -> Option<u32> {
        match self.history_source {
            HistorySource::Iteration(nth) if nth < self.iterations => Some(nth),
            _ => None,
        }
    }

    pub(crate) fn temporal_pass_params(&self) -> TemporalPassParams {
        TemporalPassParams {
            alpha: self.alpha,
            moments_alpha: self.moments_alpha,
            accumulate: self.accumulate as u32,
        }
    }

    pub(crate) fn variance_estimation_pass_params(
        &self,
    ) -> VarianceEstimationPassParams {
        VarianceEstimationPassParams {
            sigma_depth: self.sigma_depth,
            sigma_normal: self.sigma_normal,
        }
    }

    pub(crate) fn wavelet_pass_params(&self, nth: u32) -> WaveletPassParams {
        WaveletPassParams {
            stride: 1 << nth,
            sigma_depth: self.sigma_depth,
            sigma_normal: self.sigma_normal,
            sigma_luminance: self.sigma_luminance,
        }
    }
}

impl Default for DenoiserParams {
    fn default() -> Self {
        Self {
            iterations: 4,
            sigma_depth: 1.0,
            sigma_normal: 128.0,
            sigma_luminance: 4.0,
            alpha: 0.2,
            moments_alpha: 0.2,
            accumulate: true,
            history_source: HistorySource::Iteration(0),
        }
    }
}
