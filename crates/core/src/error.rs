use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovStructError {
    #[error("Dimension mismatch: expected {expected}, got {got} in {context}")]
    DimensionMismatch {
        expected: usize,
        got: usize,
        context: String,
    },

    #[error("Invalid coordinate encoding: {0}")]
    InvalidCoordinateEncoding(String),

    #[error("Invalid structure parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, CovStructError>;
