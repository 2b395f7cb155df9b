use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    #[error(
        "packing stalled after {attempts} attempts on a {width}x{height} container with {batch} charts pending"
    )]
    AttemptsExhausted {
        attempts: u32,
        width: u32,
        height: u32,
        batch: usize,
    },
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

pub type Result<T> = std::result::Result<T, PackError>;
