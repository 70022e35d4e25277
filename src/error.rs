//! Error types for construction and sample ingestion
//!
//! Statistical undefinedness (fewer than two samples, zero variance) is never
//! an error — those queries return NaN so "unknown" can propagate through
//! downstream arithmetic. The variants here are structural precondition
//! violations surfaced to the immediate caller.

#[cfg(feature = "std")]
use std::string::String;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::string::String;

/// Error from engine construction or sample ingestion
///
/// Every failing operation is rejected before any accumulator mutation, so
/// an `Err` never leaves partial state behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    /// Sample element count does not match the configured dimension
    DimensionMismatch { expected: usize, found: usize },
    /// Supplied buffer cannot hold even a 1-dimensional accumulator
    InvalidBufferSize { minimum: usize, found: usize },
    /// Named sample refers to a field the adapter was not built with
    UnknownField(String),
}

impl core::fmt::Display for StatsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StatsError::DimensionMismatch { expected, found } => {
                write!(f, "expected {} value(s), found {}", expected, found)
            }
            StatsError::InvalidBufferSize { minimum, found } => {
                write!(
                    f,
                    "buffer too small: need at least {} slots, found {}",
                    minimum, found
                )
            }
            StatsError::UnknownField(name) => write!(f, "unknown field: {}", name),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StatsError {}
