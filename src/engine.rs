//! Incremental multivariate statistics engine
//!
//! Maintains running mean, variance, and covariance for every pair of
//! dimensions over a stream of fixed-width samples, using the multivariate
//! generalization of Welford's single-pass recurrence. Memory is O(dim²)
//! regardless of stream length and no sample is ever stored.

use crate::error::StatsError;
use crate::layout;
use crate::math;

use core::cell::RefCell;

#[cfg(feature = "std")]
use std::{rc::Rc, vec::Vec};

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::{rc::Rc, vec, vec::Vec};

/// Shared handle to an engine's backing buffer
///
/// Cloning the handle is O(1) and copies nothing; every engine wrapping the
/// same handle reads and writes the same slots. This is the zero-copy
/// transfer surface: hand the snapshot to [`RunningCov::from_snapshot`] and
/// the new engine continues from the live accumulator state.
pub type Snapshot = Rc<RefCell<Vec<f64>>>;

/// Single-pass multivariate mean/variance/covariance accumulator
///
/// State lives in one flat buffer laid out by [`crate::layout`]: `dim` means,
/// the packed lower-triangular co-moment matrix, and the sample count in the
/// final slot. The co-moments are Welford-accumulated deviation products, not
/// yet normalized; queries apply the Bessel correction `n/(n−1)` on the way
/// out.
///
/// Second-order statistics are undefined below two samples and are reported
/// as NaN rather than as errors, so a consumer can propagate "unknown"
/// through arithmetic without special-casing every call site.
///
/// # Example
///
/// ```
/// use covstats::RunningCov;
///
/// let mut stats = RunningCov::new(2);
///
/// for (x, y) in [(1.0, 2.0), (2.0, 1.0)] {
///     stats.push(&[x, y]).unwrap();
/// }
///
/// assert!((stats.mean(0) - 1.5).abs() < 1e-12);
/// assert!((stats.correlation(0, 1) + 1.0).abs() < 1e-12);
/// ```
///
/// # Shared buffers
///
/// ```
/// use covstats::RunningCov;
///
/// let mut a = RunningCov::new(1);
/// a.push(&[4.0]).unwrap();
///
/// // Zero-copy view over the same accumulator
/// let b = RunningCov::from_snapshot(&a.snapshot()).unwrap();
/// assert_eq!(b.sample_count(), 1);
///
/// // reset() zeroes the shared buffer in place, so it is visible to b
/// a.reset();
/// assert_eq!(b.sample_count(), 0);
/// ```
///
/// The engine is not internally synchronized and the snapshot handle is not
/// `Send`; callers sharing a buffer between wrappers serialize access by
/// construction.
#[derive(Debug)]
pub struct RunningCov {
    /// Number of variables tracked per sample, fixed for the engine lifetime
    dim: usize,
    /// Flat accumulator state, possibly aliased by other engines
    data: Rc<RefCell<Vec<f64>>>,
    /// Per-push delta workspace, reused to keep push allocation-free
    scratch: Vec<f64>,
}

impl RunningCov {
    /// Create an engine over `dim` variables with a fresh zeroed buffer
    ///
    /// # Panics
    ///
    /// Panics if `dim` is zero.
    pub fn new(dim: usize) -> Self {
        assert!(dim >= 1, "dimension must be at least 1");

        Self {
            dim,
            data: Rc::new(RefCell::new(vec![0.0; layout::required_slots(dim)])),
            scratch: Vec::with_capacity(dim),
        }
    }

    /// Wrap an existing flat buffer, reusing whatever state it holds
    ///
    /// The dimension is recovered from the buffer length via
    /// [`layout::dim_from_slots`]; oversized buffers are accepted and the
    /// trailing slots ignored. A non-zero buffer (for example one obtained
    /// from [`to_vec`](Self::to_vec) on another engine, possibly in another
    /// process) resumes accumulation from its recorded count and moments.
    pub fn with_buffer(buf: Vec<f64>) -> Result<Self, StatsError> {
        let dim = layout::dim_from_slots(buf.len())?;
        Ok(Self {
            dim,
            data: Rc::new(RefCell::new(buf)),
            scratch: Vec::with_capacity(dim),
        })
    }

    /// Alias another engine's backing buffer without copying
    ///
    /// Both engines see every subsequent `push` and `reset` through either
    /// wrapper. Concurrent mutation through aliased wrappers is the caller's
    /// responsibility to serialize.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, StatsError> {
        let dim = layout::dim_from_slots(snapshot.borrow().len())?;
        Ok(Self {
            dim,
            data: Rc::clone(snapshot),
            scratch: Vec::with_capacity(dim),
        })
    }

    /// Number of variables tracked per sample
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of samples accumulated since construction or the last reset
    pub fn sample_count(&self) -> u64 {
        layout::count(&self.data.borrow(), self.dim) as u64
    }

    /// Check if no samples have been accumulated
    pub fn is_empty(&self) -> bool {
        self.sample_count() == 0
    }

    /// Zero-copy handle to the backing buffer
    pub fn snapshot(&self) -> Snapshot {
        Rc::clone(&self.data)
    }

    /// Deep copy of the backing buffer, for cross-boundary transfer
    pub fn to_vec(&self) -> Vec<f64> {
        self.data.borrow().clone()
    }

    /// Accumulate one sample of exactly `dim` values
    ///
    /// Returns the new sample count. A sample of the wrong width is rejected
    /// with [`StatsError::DimensionMismatch`] before any state changes.
    ///
    /// The update is the multivariate form of Welford's recurrence: with
    /// `δi = (xi − meanᵢ) / n` taken against the pre-update means,
    ///
    /// ```text
    /// meanᵢ    += δi
    /// m[i][j]  += (n − 1)·δi·δj − m[i][j] / n     for j ≤ i
    /// ```
    ///
    /// which avoids the catastrophic cancellation of naive sum-of-squares
    /// accumulation.
    pub fn push(&mut self, sample: &[f64]) -> Result<u64, StatsError> {
        if sample.len() != self.dim {
            return Err(StatsError::DimensionMismatch {
                expected: self.dim,
                found: sample.len(),
            });
        }

        let dim = self.dim;
        let mut buf = self.data.borrow_mut();
        let n = layout::count(&buf, dim) + 1.0;
        layout::set_count(&mut buf, dim, n);

        // Every delta must come from the pre-update means: updating mean i
        // before taking delta j would contaminate the (i, j) cross term.
        self.scratch.clear();
        {
            let means = layout::means(&buf, dim);
            for i in 0..dim {
                self.scratch.push((sample[i] - means[i]) / n);
            }
        }

        for (mean, delta) in layout::means_mut(&mut buf, dim).iter_mut().zip(&self.scratch) {
            *mean += *delta;
        }

        for i in 0..dim {
            let di = self.scratch[i];
            let row = layout::row_mut(&mut buf, dim, i);
            for j in 0..=i {
                row[j] += (n - 1.0) * di * self.scratch[j] - row[j] / n;
            }
        }

        Ok(n as u64)
    }

    /// Zero every slot of the backing buffer, returning to the empty state
    ///
    /// Zeroing happens in place, so it is visible through every engine
    /// aliasing this buffer via [`snapshot`](Self::snapshot). Returns `self`
    /// for chaining.
    pub fn reset(&mut self) -> &mut Self {
        for slot in self.data.borrow_mut().iter_mut() {
            *slot = 0.0;
        }
        self
    }

    /// Running mean of dimension `i` (zero for an untouched engine)
    ///
    /// # Panics
    ///
    /// Panics if `i >= dim`.
    pub fn mean(&self, i: usize) -> f64 {
        layout::means(&self.data.borrow(), self.dim)[i]
    }

    /// Bessel-corrected sample covariance between dimensions `a` and `b`
    ///
    /// Index order does not matter; the lookup canonicalizes into the lower
    /// triangle. NaN until at least two samples have been pushed.
    ///
    /// # Panics
    ///
    /// Panics if `a` or `b` is out of range.
    pub fn covariance(&self, a: usize, b: usize) -> f64 {
        assert!(
            a < self.dim && b < self.dim,
            "index out of range for {}-dimensional engine",
            self.dim
        );

        let buf = self.data.borrow();
        let n = layout::count(&buf, self.dim);
        if n < 2.0 {
            return f64::NAN;
        }
        let (hi, lo) = if a < b { (b, a) } else { (a, b) };
        n / (n - 1.0) * layout::row(&buf, self.dim, hi)[lo]
    }

    /// Sample variance of dimension `i`; NaN below two samples
    pub fn variance(&self, i: usize) -> f64 {
        self.covariance(i, i)
    }

    /// Sample standard deviation of dimension `i`; NaN below two samples
    pub fn std_deviation(&self, i: usize) -> f64 {
        math::sqrt(self.variance(i))
    }

    /// Pearson correlation between dimensions `a` and `b`
    ///
    /// NaN whenever either variance is zero or undefined — the division is
    /// allowed to propagate rather than being trapped.
    pub fn correlation(&self, a: usize, b: usize) -> f64 {
        self.covariance(a, b) / math::sqrt(self.variance(a) * self.variance(b))
    }

    /// Ordinary-least-squares slope of dimension `y` regressed on `x`
    ///
    /// Computed from the accumulated second moments; no pass over the data.
    pub fn regression_slope(&self, y: usize, x: usize) -> f64 {
        self.covariance(y, x) / self.variance(x)
    }

    /// Intercept of the least-squares line of `y` on `x`
    pub fn regression_intercept(&self, y: usize, x: usize) -> f64 {
        self.mean(y) - self.regression_slope(y, x) * self.mean(x)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RunningCov {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let data = self.data.borrow();
        let mut state = serializer.serialize_struct("RunningCov", 2)?;
        state.serialize_field("dim", &self.dim)?;
        state.serialize_field("data", &data[..])?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_sample() {
        let mut stats = RunningCov::new(1);

        assert_eq!(stats.push(&[3.0]).unwrap(), 1);
        assert_eq!(stats.mean(0), 3.0);
        assert!(stats.variance(0).is_nan());

        assert_eq!(stats.push(&[1.0]).unwrap(), 2);
        assert_eq!(stats.mean(0), 2.0);
        assert_eq!(stats.sample_count(), 2);
        assert!((stats.variance(0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_two_dimensions() {
        let mut stats = RunningCov::new(2);

        stats.push(&[1.0, 2.0]).unwrap();
        stats.push(&[2.0, 1.0]).unwrap();

        assert!((stats.mean(0) - 1.5).abs() < 1e-12);
        assert!((stats.mean(1) - 1.5).abs() < 1e-12);
        assert!((stats.variance(1) - 0.5).abs() < 1e-12);
        assert!((stats.correlation(0, 1) + 1.0).abs() < 1e-12);
        assert!((stats.correlation(0, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_three_dimensions() {
        let mut stats = RunningCov::new(3);

        stats.push(&[2.0, 1.0, 0.0]).unwrap();
        stats.push(&[1.0, 1.0, 1.0]).unwrap();
        stats.push(&[0.0, 1.0, 2.0]).unwrap();

        for i in 0..3 {
            assert!((stats.mean(i) - 1.0).abs() < 1e-12);
        }
        assert!((stats.covariance(0, 0) - 1.0).abs() < 1e-12);
        assert!(stats.covariance(1, 0).abs() < 1e-12);
        assert!(stats.covariance(1, 2).abs() < 1e-12);
    }

    #[test]
    fn test_four_dimension_stress() {
        let mut stats = RunningCov::new(4);

        for i in 1..=1000 {
            let x = i as f64;
            stats.push(&[x, -x, x / 2.0, 1.0]).unwrap();
        }

        assert_eq!(stats.sample_count(), 1000);
        assert!((stats.mean(0) - 500.5).abs() < 1e-9);
        assert!((stats.mean(1) + 500.5).abs() < 1e-9);
        assert!((stats.mean(2) - 250.25).abs() < 1e-9);
        assert!((stats.mean(3) - 1.0).abs() < 1e-9);

        assert!((stats.correlation(0, 0) - 1.0).abs() < 1e-9);
        assert!((stats.correlation(1, 0) + 1.0).abs() < 1e-9);
        assert!((stats.correlation(1, 2) + 1.0).abs() < 1e-9);
        assert!(stats.covariance(2, 3).abs() < 1e-9);
    }

    #[test]
    fn test_regression_line() {
        // y = 2x + 3, dimension 0 holds y and dimension 1 holds x
        let mut stats = RunningCov::new(2);

        for x in -10..10 {
            let x = x as f64;
            stats.push(&[2.0 * x + 3.0, x]).unwrap();
        }

        assert!((stats.regression_slope(0, 1) - 2.0).abs() < 1e-9);
        assert!((stats.regression_intercept(0, 1) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_welford_matches_two_pass() {
        let samples: Vec<[f64; 2]> = (0..100)
            .map(|i| {
                let x = i as f64 * 0.37 - 18.0;
                [x * x * 0.01 + x, 3.0 - x * 0.5]
            })
            .collect();

        let mut stats = RunningCov::new(2);
        for s in &samples {
            stats.push(s).unwrap();
        }

        let n = samples.len() as f64;
        for d in 0..2 {
            let mean: f64 = samples.iter().map(|s| s[d]).sum::<f64>() / n;
            assert!(
                (stats.mean(d) - mean).abs() < 1e-9,
                "mean({}): {} vs two-pass {}",
                d,
                stats.mean(d),
                mean
            );
        }

        let mean0: f64 = samples.iter().map(|s| s[0]).sum::<f64>() / n;
        let mean1: f64 = samples.iter().map(|s| s[1]).sum::<f64>() / n;
        let cov: f64 = samples
            .iter()
            .map(|s| (s[0] - mean0) * (s[1] - mean1))
            .sum::<f64>()
            / (n - 1.0);
        let var0: f64 = samples
            .iter()
            .map(|s| (s[0] - mean0) * (s[0] - mean0))
            .sum::<f64>()
            / (n - 1.0);

        assert!(
            (stats.covariance(0, 1) - cov).abs() < 1e-6,
            "covariance: {} vs two-pass {}",
            stats.covariance(0, 1),
            cov
        );
        assert!(
            (stats.variance(0) - var0).abs() < 1e-6,
            "variance: {} vs two-pass {}",
            stats.variance(0),
            var0
        );
    }

    #[test]
    fn test_symmetry_and_self_consistency() {
        let mut stats = RunningCov::new(3);

        stats.push(&[1.0, 4.0, 2.0]).unwrap();
        stats.push(&[2.0, 3.0, 7.0]).unwrap();
        stats.push(&[5.0, -1.0, 0.5]).unwrap();

        for a in 0..3 {
            assert_eq!(stats.covariance(a, a), stats.variance(a));
            assert!((stats.correlation(a, a) - 1.0).abs() < 1e-12);
            for b in 0..3 {
                assert_eq!(stats.covariance(a, b), stats.covariance(b, a));
            }
        }
    }

    #[test]
    fn test_dimension_mismatch_leaves_state_unmodified() {
        let mut stats = RunningCov::new(2);
        stats.push(&[1.0, 2.0]).unwrap();

        let err = stats.push(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            StatsError::DimensionMismatch {
                expected: 2,
                found: 3
            }
        );
        assert!(stats.push(&[]).is_err());

        assert_eq!(stats.sample_count(), 1);
        assert_eq!(stats.mean(0), 1.0);
        assert_eq!(stats.mean(1), 2.0);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut stats = RunningCov::new(2);
        stats.push(&[1.0, 2.0]).unwrap();
        stats.push(&[3.0, 4.0]).unwrap();

        stats.reset().reset();

        assert!(stats.is_empty());
        assert_eq!(stats.mean(0), 0.0);
        assert_eq!(stats.mean(1), 0.0);
        assert!(stats.variance(0).is_nan());

        // Accumulation restarts cleanly after a reset
        stats.push(&[5.0, 5.0]).unwrap();
        assert_eq!(stats.sample_count(), 1);
        assert_eq!(stats.mean(0), 5.0);
    }

    #[test]
    fn test_snapshot_aliases_source() {
        let mut a = RunningCov::new(2);
        a.push(&[1.0, 2.0]).unwrap();
        a.push(&[2.0, 1.0]).unwrap();

        let b = RunningCov::from_snapshot(&a.snapshot()).unwrap();
        assert_eq!(b.dim(), 2);
        assert_eq!(b.sample_count(), 2);
        assert_eq!(b.mean(0), a.mean(0));
        assert_eq!(b.covariance(0, 1), a.covariance(0, 1));

        // Shared buffer: reset through the source zeroes the derived view
        a.reset();
        assert_eq!(b.sample_count(), 0);
        assert_eq!(b.mean(0), 0.0);
    }

    #[test]
    fn test_push_through_alias_is_visible() {
        let mut a = RunningCov::new(1);
        let mut b = RunningCov::from_snapshot(&a.snapshot()).unwrap();

        a.push(&[1.0]).unwrap();
        b.push(&[3.0]).unwrap();

        assert_eq!(a.sample_count(), 2);
        assert_eq!(b.sample_count(), 2);
        assert_eq!(a.mean(0), 2.0);
    }

    #[test]
    fn test_with_buffer_resumes_live_state() {
        let mut source = RunningCov::new(2);
        source.push(&[1.0, 2.0]).unwrap();
        source.push(&[2.0, 1.0]).unwrap();

        // Deep copy crossing a boundary, then resumed by a fresh engine
        let mut resumed = RunningCov::with_buffer(source.to_vec()).unwrap();
        assert_eq!(resumed.dim(), 2);
        assert_eq!(resumed.sample_count(), 2);
        assert_eq!(resumed.mean(0), source.mean(0));
        assert_eq!(resumed.covariance(0, 1), source.covariance(0, 1));

        // The copy is independent of the source
        resumed.push(&[3.0, 3.0]).unwrap();
        assert_eq!(source.sample_count(), 2);
        assert_eq!(resumed.sample_count(), 3);
    }

    #[test]
    fn test_oversized_buffer() {
        // 8 slots holds a 2-dimensional accumulator (6 slots) plus slack
        let stats = RunningCov::with_buffer(vec![0.0; 8]).unwrap();
        assert_eq!(stats.dim(), 2);
    }

    #[test]
    fn test_undersized_buffer_rejected() {
        assert_eq!(
            RunningCov::with_buffer(vec![0.0; 2]).unwrap_err(),
            StatsError::InvalidBufferSize {
                minimum: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_zero_variance_correlation_is_nan() {
        let mut stats = RunningCov::new(2);
        stats.push(&[1.0, 1.0]).unwrap();
        stats.push(&[2.0, 1.0]).unwrap();

        // Dimension 1 is constant
        assert_eq!(stats.variance(1), 0.0);
        assert!(stats.correlation(0, 1).is_nan());
        assert!(stats.regression_slope(0, 1).is_nan());
    }

    #[test]
    fn test_numerical_stability() {
        // Large common offset; a naive sum-of-squares formula would cancel
        let base = 1e9;
        let mut stats = RunningCov::new(2);

        for i in 0..1000 {
            let x = i as f64;
            stats.push(&[base + x, base - x]).unwrap();
        }

        assert!((stats.mean(0) - (base + 499.5)).abs() < 1e-3);
        assert!((stats.correlation(0, 1) + 1.0).abs() < 1e-6);
        // Sample variance of 0..=999 is (1000² − 1)/12 · 1000/999
        assert!((stats.variance(0) - 83416.66666666667).abs() < 1e-3);
    }

    #[test]
    #[should_panic(expected = "dimension must be at least 1")]
    fn test_zero_dimension_panics() {
        let _ = RunningCov::new(0);
    }

    #[test]
    #[should_panic(expected = "index out of range")]
    fn test_out_of_range_index_panics() {
        let mut stats = RunningCov::new(2);
        stats.push(&[1.0, 2.0]).unwrap();
        stats.push(&[2.0, 1.0]).unwrap();
        let _ = stats.covariance(0, 2);
    }
}
