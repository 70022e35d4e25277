//! Named-field adapter over the positional engine
//!
//! Accepts samples keyed by field name instead of position. Each field is
//! assigned a fixed index in the order the names were given at construction,
//! and every statistical computation is delegated to an inner [`RunningCov`]
//! through that index table. The adapter additionally tracks a running
//! min/max per field, which the core engine deliberately does not.

use crate::engine::RunningCov;
use crate::error::StatsError;

#[cfg(feature = "std")]
use std::{string::String, vec::Vec};

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::{string::String, vec, vec::Vec};

/// Field-name-keyed running statistics
///
/// # Example
///
/// ```
/// use covstats::FieldStats;
///
/// let mut stats = FieldStats::new(&["price", "volume"]);
///
/// stats.push(&[("price", 10.0), ("volume", 250.0)]).unwrap();
/// stats.push(&[("volume", 150.0), ("price", 12.0)]).unwrap();
///
/// assert!((stats.mean("price") - 11.0).abs() < 1e-12);
/// assert_eq!(stats.min("volume"), Some(150.0));
/// assert_eq!(stats.max("volume"), Some(250.0));
/// ```
#[derive(Debug)]
pub struct FieldStats {
    /// Field names in index order, fixed at construction
    keys: Vec<String>,
    /// Per-field running minimum
    lows: Vec<f64>,
    /// Per-field running maximum; stored separately from `lows` and must
    /// never alias it
    highs: Vec<f64>,
    stats: RunningCov,
}

impl FieldStats {
    /// Create an adapter over the given field names
    ///
    /// Index assignment follows the order of `fields`.
    ///
    /// # Panics
    ///
    /// Panics if `fields` is empty or contains a duplicate name.
    pub fn new(fields: &[&str]) -> Self {
        assert!(!fields.is_empty(), "at least one field is required");
        let keys: Vec<String> = fields.iter().map(|f| String::from(*f)).collect();
        for (i, key) in keys.iter().enumerate() {
            assert!(!keys[..i].contains(key), "duplicate field name: {}", key);
        }

        let dim = keys.len();
        Self {
            keys,
            lows: vec![f64::INFINITY; dim],
            highs: vec![f64::NEG_INFINITY; dim],
            stats: RunningCov::new(dim),
        }
    }

    /// Field names in index order
    pub fn fields(&self) -> &[String] {
        &self.keys
    }

    /// Index assigned to `field`, if it exists
    pub fn index_of(&self, field: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == field)
    }

    fn index(&self, field: &str) -> usize {
        match self.index_of(field) {
            Some(idx) => idx,
            None => panic!("unknown field: {}", field),
        }
    }

    /// Accumulate one named sample
    ///
    /// Every configured field must appear exactly once; pair order does not
    /// matter. Returns the new sample count. On any error the accumulator
    /// and the min/max tables are left untouched.
    pub fn push(&mut self, sample: &[(&str, f64)]) -> Result<u64, StatsError> {
        if sample.len() != self.keys.len() {
            return Err(StatsError::DimensionMismatch {
                expected: self.keys.len(),
                found: sample.len(),
            });
        }

        let mut values = vec![0.0; self.keys.len()];
        let mut seen = vec![false; self.keys.len()];
        for &(name, value) in sample {
            let idx = self
                .index_of(name)
                .ok_or_else(|| StatsError::UnknownField(String::from(name)))?;
            if seen[idx] {
                // A repeated name means some other field is missing
                return Err(StatsError::DimensionMismatch {
                    expected: self.keys.len(),
                    found: sample.len(),
                });
            }
            seen[idx] = true;
            values[idx] = value;
        }

        for (i, &v) in values.iter().enumerate() {
            if v < self.lows[i] {
                self.lows[i] = v;
            }
            if v > self.highs[i] {
                self.highs[i] = v;
            }
        }
        self.stats.push(&values)
    }

    /// Zero the accumulator and the min/max tables. Returns `self` for
    /// chaining.
    pub fn reset(&mut self) -> &mut Self {
        self.stats.reset();
        for low in self.lows.iter_mut() {
            *low = f64::INFINITY;
        }
        for high in self.highs.iter_mut() {
            *high = f64::NEG_INFINITY;
        }
        self
    }

    /// Number of samples accumulated since construction or the last reset
    pub fn sample_count(&self) -> u64 {
        self.stats.sample_count()
    }

    /// Check if no samples have been accumulated
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Smallest value seen for `field`, `None` before any samples
    ///
    /// # Panics
    ///
    /// Panics on an unknown field name, as do all by-name queries.
    pub fn min(&self, field: &str) -> Option<f64> {
        let idx = self.index(field);
        if self.is_empty() {
            None
        } else {
            Some(self.lows[idx])
        }
    }

    /// Largest value seen for `field`, `None` before any samples
    ///
    /// Reads the high-water table, never the low one.
    pub fn max(&self, field: &str) -> Option<f64> {
        let idx = self.index(field);
        if self.is_empty() {
            None
        } else {
            Some(self.highs[idx])
        }
    }

    /// Running mean of `field`
    pub fn mean(&self, field: &str) -> f64 {
        self.stats.mean(self.index(field))
    }

    /// Sample variance of `field`; NaN below two samples
    pub fn variance(&self, field: &str) -> f64 {
        self.stats.variance(self.index(field))
    }

    /// Sample standard deviation of `field`; NaN below two samples
    pub fn std_deviation(&self, field: &str) -> f64 {
        self.stats.std_deviation(self.index(field))
    }

    /// Sample covariance between two fields; NaN below two samples
    pub fn covariance(&self, a: &str, b: &str) -> f64 {
        self.stats.covariance(self.index(a), self.index(b))
    }

    /// Pearson correlation between two fields
    pub fn correlation(&self, a: &str, b: &str) -> f64 {
        self.stats.correlation(self.index(a), self.index(b))
    }

    /// Least-squares slope of field `y` regressed on field `x`
    pub fn regression_slope(&self, y: &str, x: &str) -> f64 {
        self.stats.regression_slope(self.index(y), self.index(x))
    }

    /// Intercept of the least-squares line of field `y` on field `x`
    pub fn regression_intercept(&self, y: &str, x: &str) -> f64 {
        self.stats
            .regression_intercept(self.index(y), self.index(x))
    }
}
