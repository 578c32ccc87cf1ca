//! Error taxonomy for the private containment retrieval core.
//!
//! Cryptographic-invariant violations are fatal (no retry); codec
//! failures drop the offending message rather than panicking.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PcrError>;

#[derive(Error, Debug)]
pub enum PcrError {
    #[error("cuckoo filter insertion exceeded max_kicks for element {index}")]
    FilterOverflow { index: usize },

    #[error("malformed wire message: {0}")]
    CodecError(String),

    #[error("curve arithmetic failure: {0}")]
    CurveError(String),

    #[error("unknown security level: {0}")]
    ConfigError(String),
}

impl PcrError {
    pub fn codec(msg: impl Into<String>) -> Self {
        PcrError::CodecError(msg.into())
    }

    pub fn curve(msg: impl Into<String>) -> Self {
        PcrError::CurveError(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        PcrError::ConfigError(msg.into())
    }
}
