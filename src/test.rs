//! Helpers for testing code built on the regression engine.
//!
//! # Synthetic data
//!
//! ### [`synthetic_dataset`]
//! Generates a reproducible dataset from known coefficients, optionally with
//! Gaussian noise on sales. Great for checking that a fit recovers what it should!
//! ```rust
//! # use salesfit::{test::synthetic_dataset, CoefficientSet};
//! let truth = CoefficientSet { intercept: 3.0, tv: 0.05, radio: 0.2, newspaper: 0.0 };
//! let data = synthetic_dataset(&truth, 100, 0.5, 42).unwrap();
//! assert_eq!(data.len(), 100);
//! ```
//!
//! ## Assertions
//!
//! ### [`crate::assert_close`]
//! Asserts that two floating-point values are equal within a tolerance, scaled
//! by their magnitude. `assert_eq!` equivalent for floats.
//!
//! ### [`crate::assert_all_close`]
//! Element-wise [`crate::assert_close`] for two slices of the same length.
//!
//! ### [`crate::assert_coefficients`]
//! Asserts that every field of a [`CoefficientSet`] matches an expected set.
//!
//! ### [`crate::assert_r_squared`]
//! Asserts that a model explains at least a given share of the variance in a dataset.
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::{
    dataset::{Dataset, Observation},
    error::{Error, Result},
    fit::CoefficientSet,
};


/// Tolerance used by [`crate::assert_close`] when none is given.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Spend ranges for generated observations, roughly those of real advertising data.
const TV_RANGE: std::ops::Range<f64> = 0.0..300.0;
const RADIO_RANGE: std::ops::Range<f64> = 0.0..50.0;
const NEWSPAPER_RANGE: std::ops::Range<f64> = 0.0..115.0;

/// Returns true if `a` and `b` differ by at most `tolerance · max(1, |a|, |b|)`.
#[must_use]
pub fn is_close(a: f64, b: f64, tolerance: f64) -> bool {
    #[allow(clippy::float_cmp)]
    let identical = a == b;
    identical || (a - b).abs() <= tolerance * 1f64.max(a.abs()).max(b.abs())
}

/// Generates `n` observations whose sales follow `coefficients` exactly, plus
/// Gaussian noise with standard deviation `noise`.
///
/// Spend is drawn uniformly per channel. Sales below zero are clamped to zero
/// so the observations stay valid; keep the intercept and noise such that this
/// does not happen if the exact model matters.
///
/// The same seed always produces the same dataset.
///
/// # Errors
/// - [`Error::InvalidObservation`] if `noise` is negative or not finite.
/// - [`crate::error::ParseError::NoData`] if `n` is 0.
pub fn synthetic_dataset(
    coefficients: &CoefficientSet,
    n: usize,
    noise: f64,
    seed: u64,
) -> Result<Dataset> {
    if !(noise.is_finite() && noise >= 0.0) {
        return Err(Error::InvalidObservation(format!(
            "noise must be a finite, non-negative standard deviation, got {noise}"
        )));
    }

    let mut rng = rand::rngs::SmallRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, noise)
        .map_err(|e| Error::InvalidObservation(format!("noise {noise}: {e}")))?;

    let observations = (0..n)
        .map(|_| {
            let tv = rng.random_range(TV_RANGE);
            let radio = rng.random_range(RADIO_RANGE);
            let newspaper = rng.random_range(NEWSPAPER_RANGE);

            let mut sales = coefficients.intercept
                + coefficients.tv * tv
                + coefficients.radio * radio
                + coefficients.newspaper * newspaper;
            if noise > 0.0 {
                sales += normal.sample(&mut rng);
            }

            Observation {
                tv,
                radio,
                newspaper,
                sales: sales.max(0.0),
            }
        })
        .collect();

    Dataset::new(observations)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::{
        assert_all_close, assert_close, assert_coefficients, assert_r_squared, fit, Channel,
    };

    const TRUTH: CoefficientSet = CoefficientSet {
        intercept: 3.0,
        tv: 0.05,
        radio: 0.2,
        newspaper: 0.01,
    };

    #[test]
    fn synthetic_dataset_is_reproducible() {
        let a = synthetic_dataset(&TRUTH, 25, 1.0, 99).unwrap();
        let b = synthetic_dataset(&TRUTH, 25, 1.0, 99).unwrap();
        let c = synthetic_dataset(&TRUTH, 25, 1.0, 100).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn synthetic_dataset_without_noise_is_exact() {
        let data = synthetic_dataset(&TRUTH, 10, 0.0, 1).unwrap();
        for observation in &data {
            assert_eq!(observation.sales, TRUTH.fitted(observation));
            assert!(TV_RANGE.contains(&observation.spend(Channel::Tv)));
        }
    }

    #[test]
    fn synthetic_dataset_rejects_bad_input() {
        for noise in [-1.0, -f64::MIN_POSITIVE, f64::NAN, f64::INFINITY] {
            let result = synthetic_dataset(&TRUTH, 10, noise, 1);
            assert!(
                matches!(result, Err(Error::InvalidObservation(_))),
                "noise {noise}: {result:?}"
            );
        }
        assert!(synthetic_dataset(&TRUTH, 0, 0.0, 1).is_err());
    }

    #[test]
    fn test_assert_close_macro() {
        assert_close!(1.0 + 1e-16, 1.0);
        assert_close!(1000.0, 1000.0 + 1e-8, 1e-10, "scaled by magnitude");
        assert!(!is_close(1.0, 1.1, 1e-3));
    }

    #[test]
    #[should_panic(expected = "Values not close")]
    fn test_assert_close_macro_fails() {
        assert_close!(1.0, 1.001);
    }

    #[test]
    fn test_assert_all_close_macro() {
        let a = [1.0, 2.0, 3.0];
        let b = [1.0 + 1e-16, 2.0, 3.0];
        assert_all_close!(a, b);
        assert_all_close!(a, b, 1e-12, "Vectors must match");
    }

    #[test]
    fn test_assert_coefficients_and_r_squared_macros() {
        let data = synthetic_dataset(&TRUTH, 100, 0.0, 5).unwrap();
        let coefficients = fit(&data).unwrap();
        assert_coefficients!(coefficients, TRUTH, 1e-6);
        assert_r_squared!(coefficients, &data, 0.999);

        let noisy = synthetic_dataset(&TRUTH, 100, 1.0, 5).unwrap();
        let coefficients = fit(&noisy).unwrap();
        assert_r_squared!(coefficients, &noisy);
    }
}
