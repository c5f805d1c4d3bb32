use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TemporalPassParams {
    pub alpha: f32,
    pub moments_alpha: f32,
    pub accumulate: u32,
}

impl TemporalPassParams {
    pub fn accumulate(&self) -> bool {
        self.accumulate > 0
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct VarianceEstimationPassParams {
    pub sigma_depth: f32,
    pub sigma_normal: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct WaveletPassParams {
    pub stride: u32,
    pub sigma_depth: f32,
    pub sigma_normal: f32,
    pub sigma_luminance: f32,
}
