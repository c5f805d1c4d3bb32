use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f32,
        reason: &'static str,
    },

    #[error("invalid resolution: {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    #[error("buffer `{buffer}` has {actual} elements, expected {expected}")]
    InputSizeMismatch {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("buffer `{0}` is not a tightly packed array of its elements")]
    MalformedInput(&'static str),

    #[error("missing input buffer `{0}`")]
    MissingInput(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
