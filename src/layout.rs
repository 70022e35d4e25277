//! Packed lower-triangular buffer layout
//!
//! Maps a dimension count onto a flat block of f64 slots: M mean slots, the
//! M(M+1)/2 entries of a lower-triangular co-moment matrix (diagonal
//! included), and one trailing sample-count slot — (M+1)(M+2)/2 slots total.
//! All accessors hand out borrowed views into the same storage; mutation
//! through one view is visible through every other view of the buffer.
//!
//! Row `i` of the triangle holds the pairs (i, 0)..=(i, i) and starts at slot
//! `M + i(i+1)/2`, immediately after the means region; rows are contiguous.

use crate::error::StatsError;
use crate::math;

/// Number of f64 slots needed for an accumulator over `dim` variables
///
/// The sole sizing authority: every allocator and every buffer-wrapping
/// constructor goes through this.
#[inline]
pub fn required_slots(dim: usize) -> usize {
    (dim + 1) * (dim + 2) / 2
}

/// Slot index of the sample count (always the final slot)
#[inline]
pub fn count_slot(dim: usize) -> usize {
    required_slots(dim) - 1
}

/// Slot offset of co-moment row `i`; the row has length `i + 1`
#[inline]
pub fn row_offset(dim: usize, i: usize) -> usize {
    dim + i * (i + 1) / 2
}

/// Largest dimension whose accumulator fits in `slots` f64 slots
///
/// Inverse of [`required_slots`]: solves `M = floor((sqrt(8·slots + 1) − 3) / 2)`.
/// Oversized buffers are tolerated — trailing slots beyond the computed
/// dimension's footprint are simply ignored, so a buffer can be allocated
/// generously and reused. Fails only when the buffer cannot hold a
/// 1-dimensional accumulator (3 slots).
pub fn dim_from_slots(slots: usize) -> Result<usize, StatsError> {
    if slots < required_slots(1) {
        return Err(StatsError::InvalidBufferSize {
            minimum: required_slots(1),
            found: slots,
        });
    }
    let mut dim = (math::floor((math::sqrt(8.0 * slots as f64 + 1.0) - 3.0) / 2.0)) as usize;
    // Integer verification: float sqrt can land one off near triangular bounds
    while required_slots(dim + 1) <= slots {
        dim += 1;
    }
    while required_slots(dim) > slots {
        dim -= 1;
    }
    Ok(dim)
}

/// Means region: slots `[0, dim)`
#[inline]
pub fn means(buf: &[f64], dim: usize) -> &[f64] {
    &buf[..dim]
}

/// Mutable means region
#[inline]
pub fn means_mut(buf: &mut [f64], dim: usize) -> &mut [f64] {
    &mut buf[..dim]
}

/// Co-moment row `i`: entries for the pairs (i, 0)..=(i, i)
#[inline]
pub fn row(buf: &[f64], dim: usize, i: usize) -> &[f64] {
    let start = row_offset(dim, i);
    &buf[start..start + i + 1]
}

/// Mutable co-moment row `i`
#[inline]
pub fn row_mut(buf: &mut [f64], dim: usize, i: usize) -> &mut [f64] {
    let start = row_offset(dim, i);
    &mut buf[start..start + i + 1]
}

/// Sample count stored in the final slot
///
/// Kept inside the buffer rather than alongside it so the count travels with
/// the data on snapshot transfer.
#[inline]
pub fn count(buf: &[f64], dim: usize) -> f64 {
    buf[count_slot(dim)]
}

/// Store the sample count into the final slot
#[inline]
pub fn set_count(buf: &mut [f64], dim: usize, n: f64) {
    buf[count_slot(dim)] = n;
}
