use std::time::Duration;

/// Statistics of the most recently rendered frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Index of the frame, counting from zero since the denoiser got created
    pub frame: u64,

    /// Whether the frame has been passed through without denoising (due to
    /// missing geometry)
    pub passthrough: bool,

    /// Number of pixels with a valid reprojection
    pub reprojected_pixels: usize,

    pub total_pixels: usize,

    /// Average history length across the entire frame
    pub mean_history_length: f32,

    pub tt_reprojection: Duration,
    pub tt_integration: Duration,
    pub tt_variance_estimation: Duration,
    pub tt_filtering: Duration,
}

impl FrameStats {
    /// Returns the fraction of pixels that have been reprojected, in `0..=1`.
    pub fn reprojection_ratio(&self) -> f32 {
        if self.total_pixels == 0 {
            0.0
        } else {
            self.reprojected_pixels as f32 / self.total_pixels as f32
        }
    }

    pub fn tt_total(&self) -> Duration {
        self.tt_reprojection
            + self.tt_integration
            + self.tt_variance_estimation
            + self.tt_filtering
    }
}

#[cfg(feature = "metrics")]
impl std::fmt::Display for FrameStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use humantime::format_duration;

        write!(
            f,
            "frame #{}: reprojected={:.1}%, history={:.2}, tt={} \
             (reprojection={}, integration={}, variance={}, filtering={})",
            self.frame,
            100.0 * self.reprojection_ratio(),
            self.mean_history_length,
            format_duration(self.tt_total()),
            format_duration(self.tt_reprojection),
            format_duration(self.tt_integration),
            format_duration(self.tt_variance_estimation),
            format_duration(self.tt_filtering),
        )?;

        if self.passthrough {
            write!(f, " [passthrough]")?;
        }

        Ok(())
    }
}
