//! # Covstats
//!
//! Incremental multivariate statistics for Rust.
//!
//! Covstats maintains running mean, variance, and covariance for every pair
//! of dimensions over a stream of fixed-width numeric samples — in a single
//! pass, with O(dim²) memory, and without storing any history. The update is
//! the multivariate generalization of Welford's numerically stable
//! recurrence.
//!
//! ## Features
//!
//! - **Single-pass statistics**: mean, variance, covariance, standard
//!   deviation, correlation, and least-squares regression from one stream
//! - **Packed state**: the whole accumulator lives in one flat buffer of
//!   (M+1)(M+2)/2 f64 slots — means, a lower-triangular co-moment matrix,
//!   and the sample count
//! - **Zero-copy transfer**: the backing buffer can be shared between engine
//!   instances or handed across a boundary without copying element-by-element
//! - **Named fields**: an adapter that keys samples by field name and tracks
//!   per-field min/max
//!
//! ## Quick start
//!
//! ```rust
//! use covstats::RunningCov;
//!
//! let mut stats = RunningCov::new(2);
//!
//! for x in -10..10 {
//!     let x = x as f64;
//!     stats.push(&[2.0 * x + 3.0, x]).unwrap();
//! }
//!
//! assert!((stats.regression_slope(0, 1) - 2.0).abs() < 1e-9);
//! assert!((stats.regression_intercept(0, 1) - 3.0).abs() < 1e-9);
//! ```
//!
//! ## State transfer
//!
//! An engine's accumulator can be wrapped by another engine with no copying.
//! Both wrappers then alias the same state, so `reset()` through one is
//! visible through the other:
//!
//! ```rust
//! use covstats::RunningCov;
//!
//! let mut source = RunningCov::new(3);
//! source.push(&[1.0, 2.0, 3.0]).unwrap();
//!
//! let view = RunningCov::from_snapshot(&source.snapshot()).unwrap();
//! assert_eq!(view.sample_count(), 1);
//!
//! source.reset();
//! assert_eq!(view.sample_count(), 0);
//! ```
//!
//! Engines sharing a buffer are not synchronized; callers serialize access.
//!
//! ## Feature flags
//!
//! - `std` (default): standard library support
//! - `serde`: enable serialization of accumulator state
//! - `libm`: math fallback for no_std builds

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod engine;
pub mod error;
pub mod keyed;
pub mod layout;

mod math;

pub mod prelude {
    pub use crate::engine::{RunningCov, Snapshot};
    pub use crate::error::StatsError;
    pub use crate::keyed::FieldStats;
}

pub use engine::{RunningCov, Snapshot};
pub use error::StatsError;
pub use keyed::FieldStats;
