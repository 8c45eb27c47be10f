//! Error types for geon-quantum.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeonError {
    #[error("site index {site} out of range for {sites}-site chain")]
    InvalidSite { site: usize, sites: usize },

    #[error("invalid subsystem: {0}")]
    InvalidSubsystem(String),

    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error("eigensolver failed to converge after {iterations} iterations")]
    NonConvergence { iterations: usize },

    #[error("dimension {dim} exceeds dense-path limit {limit}")]
    SizeLimit { dim: usize, limit: usize },

    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, GeonError>;
