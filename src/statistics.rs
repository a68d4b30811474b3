//! Functions and tools for describing a dataset and evaluating a sales model
//!
//! # Correlation
//! - [`correlate`]: Pearson correlation of each channel's spend against sales.
//! - [`pearson`]: Pearson correlation of any two columns.
//! - [`correlation_matrix`]: Pairwise correlations of all four columns.
//!
//! # Model Fit / Regression Diagnostics
//! - [`r_squared`]: Proportion of variance explained by the model. Higher is better (at most 1).
//! - [`adjusted_r_squared`]: R² adjusted for the number of predictors.
//! - [`residual_variance`]: Unbiased estimate of variance of errors after fitting.
//!
//! # Error Metrics
//! - [`mean_absolute_error`]: Average absolute difference between observed and predicted values. Lower is better.
//! - [`mean_squared_error`]: Average squared difference between observed and predicted values. Lower is better.
//! - [`root_mean_squared_error`]: Square root of MSE, giving error in same units as sales. Lower is better.
//!
//! # Descriptive Statistics
//! - [`mean`]: Arithmetic mean of a dataset.
//! - [`stddev_and_mean`]: Standard deviation and mean of a dataset.
//! - [`describe`] / [`summarize`]: Count, mean, spread and quartiles of a column.
//!
//! All functions sum in input order, so equal inputs give bit-identical outputs.
//!
//! # Examples
//!
//! ```rust
//! use salesfit::statistics::{r_squared, pearson};
//!
//! let y = vec![1.0, 2.0, 3.0];
//! let y_fit = vec![1.1, 1.9, 3.05];
//! let r2 = r_squared(y.iter().copied(), y_fit.iter().copied());
//! println!("R² = {r2}");
//!
//! let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]);
//! assert!((r - 1.0).abs() < 1e-12);
//! ```
use nalgebra::Matrix4;

use crate::{
    channel::{self, Channel},
    dataset::Dataset,
};

/// Pearson correlation of each channel's spend against sales.
///
/// Each value lies in `[-1, 1]`. A channel with zero variance has a correlation of `0`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CorrelationSet {
    /// Correlation of TV spend with sales
    pub tv: f64,

    /// Correlation of radio spend with sales
    pub radio: f64,

    /// Correlation of newspaper spend with sales
    pub newspaper: f64,
}

impl CorrelationSet {
    /// Returns the correlation for one channel.
    #[must_use]
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Tv => self.tv,
            Channel::Radio => self.radio,
            Channel::Newspaper => self.newspaper,
        }
    }

    /// Channels sorted by correlation, strongest first.
    ///
    /// Ties keep priority order (TV, Radio, Newspaper).
    #[must_use]
    pub fn ranked(&self) -> [(Channel, f64); 3] {
        let mut ranked = Channel::ALL.map(|c| (c, self.get(c)));
        channel::sort_descending(&mut ranked);
        ranked
    }
}

/// Computes the Pearson correlation of each channel against sales.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// r = cov(x, y) / (σ_x · σ_y)
///   = Σ (x_i - x̄)(y_i - ȳ) / √(Σ (x_i - x̄)² · Σ (y_i - ȳ)²)
/// ```
/// Population normalization is used throughout; it cancels out of `r`.
/// </div>
///
/// # Example
/// ```rust
/// let text = "TV,Radio,Newspaper,Sales\n1,5,3,2\n2,5,1,4\n3,5,2,6";
/// let dataset = salesfit::load(text).unwrap();
/// let correlations = salesfit::correlate(&dataset);
/// assert!((correlations.tv - 1.0).abs() < 1e-12);
/// assert_eq!(correlations.radio, 0.0); // constant column
/// ```
#[must_use]
pub fn correlate(dataset: &Dataset) -> CorrelationSet {
    let sales: Vec<f64> = dataset.sales().collect();
    let r = |channel: Channel| {
        let spend: Vec<f64> = dataset.column(channel).collect();
        pearson(&spend, &sales)
    };

    let correlations = CorrelationSet {
        tv: r(Channel::Tv),
        radio: r(Channel::Radio),
        newspaper: r(Channel::Newspaper),
    };
    tracing::debug!(?correlations, "Computed channel correlations");
    correlations
}

/// Computes the Pearson correlation coefficient between two columns.
///
/// # Behavior
/// - Only the first `min(x.len(), y.len())` pairs are used.
/// - If either column is constant (zero variance) or empty, returns `0.0`.
/// - Each column is divided by its largest magnitude first, so sums of squares
///   cannot overflow for any finite input.
/// - The result is clamped to `[-1, 1]` to absorb rounding.
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    let (x, y) = (&x[..n], &y[..n]);
    if is_constant(x) || is_constant(y) {
        return 0.0;
    }

    let x_scale = max_magnitude(x);
    let y_scale = max_magnitude(y);
    let x_mean = mean(x.iter().map(|v| v / x_scale));
    let y_mean = mean(y.iter().map(|v| v / y_scale));

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi / x_scale - x_mean;
        let dy = yi / y_scale - y_mean;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    #[allow(clippy::float_cmp)]
    let degenerate = sxx == 0.0 || syy == 0.0;
    if degenerate {
        return 0.0;
    }
    (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
}

/// Largest absolute value in a column; nonzero for non-constant columns.
fn max_magnitude(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |max, v| v.abs().max(max))
}

/// True for empty columns, and for columns where every value is identical.
///
/// Checked directly rather than through the variance, since the mean of a
/// constant column is not always exactly that constant.
#[allow(clippy::float_cmp)]
fn is_constant(values: &[f64]) -> bool {
    match values.first() {
        Some(first) => values.iter().all(|v| v == first),
        None => true,
    }
}

/// Pairwise Pearson correlations of TV, Radio, Newspaper and Sales, in that order.
///
/// The diagonal is `1` for non-constant columns and `0` for constant ones.
#[must_use]
pub fn correlation_matrix(dataset: &Dataset) -> Matrix4<f64> {
    let columns: [Vec<f64>; 4] = [
        dataset.column(Channel::Tv).collect(),
        dataset.column(Channel::Radio).collect(),
        dataset.column(Channel::Newspaper).collect(),
        dataset.sales().collect(),
    ];

    let mut matrix = Matrix4::zeros();
    for i in 0..4 {
        for j in i..4 {
            let r = if i == j && !is_constant(&columns[i]) {
                1.0
            } else {
                pearson(&columns[i], &columns[j])
            };
            matrix[(i, j)] = r;
            matrix[(j, i)] = r;
        }
    }
    matrix
}

/// Computes the arithmetic mean of a sequence of values.
///
/// Returns `NaN` if the iterator yields no elements.
///
/// # Examples
/// ```rust
/// let values = vec![1.0, 2.0, 3.0];
/// let m = salesfit::statistics::mean(values.into_iter());
/// assert_eq!(m, 2.0);
/// ```
pub fn mean(data: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0.0;
    for value in data {
        sum += value;
        count += 1.0;
    }
    sum / count
}

/// Computes the standard deviation of a sequence of values, and its mean.
/// - Uses the population formula (divides by `N`) rather than `N-1`.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// σ = sqrt( (Σ (x_i - Mean)²) / N )
/// ```
/// </div>
///
/// # Examples
/// ```rust
/// let values = vec![1.0, 2.0, 3.0];
/// let (s, _) = salesfit::statistics::stddev_and_mean(values.into_iter());
/// assert_eq!(s, 0.816496580927726); // sqrt(2/3)
/// ```
pub fn stddev_and_mean(data: impl Iterator<Item = f64>) -> (f64, f64) {
    let data: Vec<_> = data.collect();
    let mean = mean(data.iter().copied());
    let mut sum_sq_diff = 0.0;
    let mut count = 0.0;
    for value in data {
        sum_sq_diff += (value - mean).powi(2);
        count += 1.0;
    }
    let dev = (sum_sq_diff / count).sqrt();

    (dev, mean)
}

/// Descriptive statistics for one column.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Summary {
    /// Number of values
    pub count: usize,

    /// Arithmetic mean
    pub mean: f64,

    /// Sample standard deviation (divides by `N-1`); `NaN` for a single value
    pub std: f64,

    /// Smallest value
    pub min: f64,

    /// First quartile
    pub q25: f64,

    /// Median
    pub median: f64,

    /// Third quartile
    pub q75: f64,

    /// Largest value
    pub max: f64,
}

/// Summaries of all four columns of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DatasetSummary {
    /// TV spend
    pub tv: Summary,
    /// Radio spend
    pub radio: Summary,
    /// Newspaper spend
    pub newspaper: Summary,
    /// Sales
    pub sales: Summary,
}

/// Describes a column: count, mean, sample standard deviation, min, quartiles and max.
///
/// Quartiles use linear interpolation between the closest ranks.
///
/// Returns `None` if the iterator yields no elements.
///
/// # Example
/// ```rust
/// let summary = salesfit::statistics::describe([4.0, 1.0, 3.0, 2.0].into_iter()).unwrap();
/// assert_eq!(summary.median, 2.5);
/// assert_eq!(summary.q25, 1.75);
/// ```
pub fn describe(data: impl Iterator<Item = f64>) -> Option<Summary> {
    let mut sorted: Vec<f64> = data.collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let mean = mean(sorted.iter().copied());
    let sum_sq_diff: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
    let std = if count > 1 {
        (sum_sq_diff / (count - 1) as f64).sqrt()
    } else {
        f64::NAN
    };

    Some(Summary {
        count,
        mean,
        std,
        min: sorted[0],
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

/// Describes every column of a dataset. See [`describe`].
#[must_use]
pub fn summarize(dataset: &Dataset) -> DatasetSummary {
    // A dataset is never empty, so every column has a summary
    let column = |values: Vec<f64>| {
        describe(values.into_iter()).unwrap_or(Summary {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        })
    };

    DatasetSummary {
        tv: column(dataset.column(Channel::Tv).collect()),
        radio: column(dataset.column(Channel::Radio).collect()),
        newspaper: column(dataset.column(Channel::Newspaper).collect()),
        sales: column(dataset.sales().collect()),
    }
}

/// Linear-interpolated quantile of sorted, non-empty data.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Computes the residual variance of a model's predictions.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// σ² = Σ (y_i - y_fit_i)² / (n - k)
/// where
///   n = number of observations, k = number of model parameters
/// ```
/// </div>
///
/// Returns `0` when `n == k`, since a saturated model has no residual degrees of freedom.
pub fn residual_variance(
    y: impl Iterator<Item = f64>,
    y_fit: impl Iterator<Item = f64>,
    k: f64,
) -> f64 {
    let mut ss_residual = 0.0;
    let mut n = 0.0;
    for (y, y_fit) in y.zip(y_fit) {
        ss_residual += (y - y_fit).powi(2);
        n += 1.0;
    }

    if n == k {
        return 0.0;
    }
    ss_residual / (n - k)
}

/// Calculate the R-squared value for a set of predictions.
///
/// - `1` means the model explains all the variation in sales.
/// - `0` means it does no better than predicting the mean.
/// - Negative values mean it does worse than the mean.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// R² = 1 - (SS_res / SS_tot)
/// where
///   SS_res = Σ (y_i - y_fit_i)²
///   SS_tot = Σ (y_i - y_mean)²
/// ```
/// </div>
///
/// Returns `NaN` if `y` is constant.
pub fn r_squared(y: impl Iterator<Item = f64>, y_fit: impl Iterator<Item = f64>) -> f64 {
    let (r2, _) = r_squared_with_n(y, y_fit);
    r2
}

/// Computes R² adjusted for the number of predictors (excluding the intercept).
///
/// ```math
/// R²_adj = 1 - (1 - R²) (n - 1) / (n - p - 1)
/// ```
///
/// Returns `NaN` if `n <= p + 1`.
pub fn adjusted_r_squared(
    y: impl Iterator<Item = f64>,
    y_fit: impl Iterator<Item = f64>,
    predictors: usize,
) -> f64 {
    let (r2, n) = r_squared_with_n(y, y_fit);
    let p = predictors as f64;
    if n <= p + 1.0 {
        return f64::NAN;
    }
    1.0 - (1.0 - r2) * (n - 1.0) / (n - p - 1.0)
}

/// Internal implementation - returns (R², n)
fn r_squared_with_n(y: impl Iterator<Item = f64>, y_fit: impl Iterator<Item = f64>) -> (f64, f64) {
    let pairs: Vec<(f64, f64)> = y.zip(y_fit).collect();
    let n = pairs.len() as f64;

    let y_mean = mean(pairs.iter().map(|(y, _)| *y));
    if is_constant(&pairs.iter().map(|(y, _)| *y).collect::<Vec<_>>()) {
        return (f64::NAN, n);
    }

    let mut ss_total = 0.0;
    let mut ss_residual = 0.0;
    for (y, y_fit) in pairs {
        ss_total += (y - y_mean).powi(2);
        ss_residual += (y - y_fit).powi(2);
    }

    (1.0 - ss_residual / ss_total, n)
}

/// Computes the mean absolute error (MAE) between two sets of values.
///
/// ```math
/// MAE = (Σ |y_i - y_fit_i|) / N
/// ```
///
/// Returns `NaN` for empty input.
pub fn mean_absolute_error(y: impl Iterator<Item = f64>, y_fit: impl Iterator<Item = f64>) -> f64 {
    let mut total = 0.0;
    let mut n = 0.0;
    for (y, y_fit) in y.zip(y_fit) {
        total += (y - y_fit).abs();
        n += 1.0;
    }
    total / n
}

/// Computes the mean squared error (MSE) between two sets of values.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// MSE = (Σ (y_i - y_fit_i)²) / N
/// ```
/// </div>
///
/// Returns `NaN` for empty input.
///
/// # Example
/// ```
/// # use salesfit::statistics::mean_squared_error;
/// let y = vec![1.0, 2.0, 3.0];
/// let y_fit = vec![1.0, 2.0, 5.0];
/// let mse = mean_squared_error(y.into_iter(), y_fit.into_iter());
/// assert!((mse - 4.0 / 3.0).abs() < 1e-12);
/// ```
pub fn mean_squared_error(y: impl Iterator<Item = f64>, y_fit: impl Iterator<Item = f64>) -> f64 {
    let mut total = 0.0;
    let mut n = 0.0;
    for (y, y_fit) in y.zip(y_fit) {
        total += (y - y_fit).powi(2);
        n += 1.0;
    }
    total / n
}

/// Computes the root mean squared error (RMSE) between two sets of values.
///
/// RMSE is in the same units as sales.
pub fn root_mean_squared_error(
    y: impl Iterator<Item = f64>,
    y_fit: impl Iterator<Item = f64>,
) -> f64 {
    mean_squared_error(y, y_fit).sqrt()
}
