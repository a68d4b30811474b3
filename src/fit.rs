use nalgebra::{DMatrix, DVector, SVD};

use crate::{
    channel::Channel,
    dataset::{Dataset, Observation},
    error::{Error, Result},
    statistics::{self, CorrelationSet},
};

/// Number of fitted coefficients: the intercept and one slope per channel.
pub const PARAMETERS: usize = 4;

/// Number of predictors, excluding the intercept.
pub const PREDICTORS: usize = PARAMETERS - 1;

/// The fitted model `sales ≈ intercept + tv·TV + radio·Radio + newspaper·Newspaper`.
///
/// Produced by [`fit`], and never modified afterward; a refit replaces it wholesale.
/// Values are not rounded.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CoefficientSet {
    /// Expected sales with no advertising spend
    pub intercept: f64,

    /// Sales per unit of TV spend
    pub tv: f64,

    /// Sales per unit of radio spend
    pub radio: f64,

    /// Sales per unit of newspaper spend
    pub newspaper: f64,
}

impl CoefficientSet {
    /// Returns the slope for one channel.
    #[must_use]
    pub fn slope(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Tv => self.tv,
            Channel::Radio => self.radio,
            Channel::Newspaper => self.newspaper,
        }
    }

    /// The slopes, in priority order (TV, Radio, Newspaper).
    #[must_use]
    pub fn slopes(&self) -> [(Channel, f64); 3] {
        Channel::ALL.map(|c| (c, self.slope(c)))
    }

    /// Evaluates the model for a single historical observation.
    #[must_use]
    pub fn fitted(&self, observation: &Observation) -> f64 {
        self.intercept
            + self.tv * observation.tv
            + self.radio * observation.radio
            + self.newspaper * observation.newspaper
    }

    /// Evaluates the model for every observation in a dataset.
    #[must_use]
    pub fn fitted_values(&self, dataset: &Dataset) -> Vec<f64> {
        dataset.iter().map(|o| self.fitted(o)).collect()
    }

    /// Observed minus fitted sales, for every observation.
    #[must_use]
    pub fn residuals(&self, dataset: &Dataset) -> Vec<f64> {
        dataset.iter().map(|o| o.sales - self.fitted(o)).collect()
    }

    /// Sum of squared residuals over a dataset; the quantity OLS minimizes.
    #[must_use]
    pub fn residual_sum_of_squares(&self, dataset: &Dataset) -> f64 {
        self.residuals(dataset).iter().map(|r| r * r).sum()
    }

    /// Measures how well these coefficients explain a dataset.
    ///
    /// Use a held-out dataset (see [`Dataset::train_test_split`]) to measure
    /// predictive quality rather than in-sample fit.
    #[must_use]
    pub fn evaluate(&self, dataset: &Dataset) -> ModelEvaluation {
        let y = || dataset.sales();
        let y_fit = self.fitted_values(dataset);
        let y_fit = || y_fit.iter().copied();

        ModelEvaluation {
            observations: dataset.len(),
            mse: statistics::mean_squared_error(y(), y_fit()),
            rmse: statistics::root_mean_squared_error(y(), y_fit()),
            mae: statistics::mean_absolute_error(y(), y_fit()),
            r_squared: statistics::r_squared(y(), y_fit()),
            adjusted_r_squared: statistics::adjusted_r_squared(y(), y_fit(), PREDICTORS),
        }
    }
}

/// Goodness-of-fit of a [`CoefficientSet`] against a dataset.
///
/// Can be serialized to JSON or other formats.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ModelEvaluation {
    /// Number of observations evaluated
    pub observations: usize,

    /// Mean squared error
    pub mse: f64,

    /// Root mean squared error, in sales units
    pub rmse: f64,

    /// Mean absolute error
    pub mae: f64,

    /// Proportion of sales variance explained; `NaN` if sales are constant
    pub r_squared: f64,

    /// R² adjusted for the three predictors; `NaN` for 4 or fewer observations
    pub adjusted_r_squared: f64,
}

/// Options for [`RegressionFitter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Singular values below `rank_tolerance · σ_max` count as zero.
    ///
    /// If any of the four singular values of the design matrix falls below
    /// this, the fit fails with [`Error::SingularMatrix`].
    pub rank_tolerance: f64,

    /// Minimum number of observations before the `parallel` feature switches
    /// to chunked normal equations. Ignored without that feature.
    pub parallel_threshold: usize,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            rank_tolerance: 1e-10,
            parallel_threshold: 500_000,
        }
    }
}

/// Fits a [`CoefficientSet`] to a dataset by ordinary least squares.
///
/// # How it works
/// - Builds the **design matrix** `X` with shape `[n, 4]`: a column of ones,
///   then the TV, Radio and Newspaper spend columns.
/// - Forms a **column vector** `y` from the sales column.
/// - Solves `X · β = y` in the least-squares sense using the **SVD** of `X`,
///   which avoids forming `(XᵀX)⁻¹` and stays stable when channels are correlated.
///
/// # Warning
/// If the `parallel` feature is enabled, and the dataset has at least
/// [`FitOptions::parallel_threshold`] rows, `XᵀX` and `Xᵀy` are accumulated in
/// parallel chunks and the 4×4 normal equations are solved instead. Squaring the
/// condition number this way costs accuracy on badly conditioned data.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegressionFitter {
    options: FitOptions,
}

impl RegressionFitter {
    /// Creates a fitter with the given options.
    #[must_use]
    pub fn new(options: FitOptions) -> Self {
        Self { options }
    }

    /// The options in use.
    #[must_use]
    pub fn options(&self) -> &FitOptions {
        &self.options
    }

    /// Fits the model to a dataset.
    ///
    /// # Errors
    /// - [`Error::SingularMatrix`] if there are fewer than 4 observations, or
    ///   the columns of the design matrix are linearly dependent (collinear
    ///   channels, or a constant channel).
    /// - [`Error::Algebra`] if the solver fails or produces non-finite values.
    pub fn fit(&self, dataset: &Dataset) -> Result<CoefficientSet> {
        let observations = dataset.observations();
        let n = observations.len();
        if n < PARAMETERS {
            tracing::warn!(n, "Too few observations to fit");
            return Err(Error::SingularMatrix { n, k: PARAMETERS });
        }

        #[cfg(feature = "parallel")]
        {
            if n >= self.options.parallel_threshold {
                tracing::debug!(n, "Fitting with parallel normal equations");
                let (xtx, xty) = Self::parallel_normal_equations(observations);
                return self.solve_matrix(xtx, &xty, n);
            }
        }

        tracing::debug!(n, "Fitting with SVD of the design matrix");
        let (x, y) = Self::create_matrix(observations);
        self.solve_matrix(x, &y, n)
    }

    /// Turns observations into a design matrix and sales vector.
    fn create_matrix(observations: &[Observation]) -> (DMatrix<f64>, DVector<f64>) {
        let x = DMatrix::from_fn(observations.len(), PARAMETERS, |i, j| {
            design_row(&observations[i])[j]
        });
        let y = DVector::from_iterator(observations.len(), observations.iter().map(|o| o.sales));
        (x, y)
    }

    /// Builds `(XᵀX, Xᵀy)` from parallel chunks.
    #[cfg(feature = "parallel")]
    fn parallel_normal_equations(observations: &[Observation]) -> (DMatrix<f64>, DVector<f64>) {
        use rayon::prelude::*;

        // Each thread reduces its n×4 chunk to a 4×4 problem
        let threads = rayon::current_num_threads();
        let chunk_size = (observations.len() / threads).max(1);
        let mut partial_results: Vec<(DMatrix<f64>, DVector<f64>)> = observations
            .par_chunks(chunk_size)
            .map(|chunk| {
                let (x, y) = Self::create_matrix(chunk);
                let xt = x.transpose();
                (&xt * &x, &xt * &y)
            })
            .collect();

        let (mut xtx, mut xty) = partial_results.pop().unwrap_or_else(|| {
            (
                DMatrix::zeros(PARAMETERS, PARAMETERS),
                DVector::zeros(PARAMETERS),
            )
        });

        // Kahan summation keeps the accumulated error independent of chunk count
        let mut xtx_c = DMatrix::<f64>::zeros(PARAMETERS, PARAMETERS);
        let mut xty_c = DVector::<f64>::zeros(PARAMETERS);
        for (part_xtx, part_xty) in partial_results {
            for i in 0..PARAMETERS {
                let y = part_xty[i] - xty_c[i];
                let t = xty[i] + y;
                xty_c[i] = (t - xty[i]) - y;
                xty[i] = t;

                for j in 0..PARAMETERS {
                    let y = part_xtx[(i, j)] - xtx_c[(i, j)];
                    let t = xtx[(i, j)] + y;
                    xtx_c[(i, j)] = (t - xtx[(i, j)]) - y;
                    xtx[(i, j)] = t;
                }
            }
        }

        (xtx, xty)
    }

    /// Solves the least-squares system using SVD, rejecting rank-deficient matrices.
    fn solve_matrix(&self, matrix: DMatrix<f64>, b: &DVector<f64>, n: usize) -> Result<CoefficientSet> {
        let decomp = SVD::new(matrix, true, true);

        let sigma_max = decomp.singular_values.max();
        let epsilon = self.options.rank_tolerance * sigma_max;
        let rank = decomp.rank(epsilon);
        if rank < PARAMETERS {
            tracing::warn!(n, rank, "Design matrix is rank deficient");
            return Err(Error::SingularMatrix { n, k: PARAMETERS });
        }

        let solution = decomp.solve(b, epsilon).map_err(Error::Algebra)?;
        if solution.iter().any(|c| !c.is_finite()) {
            return Err(Error::Algebra("Non-finite value in coefficients"));
        }

        let coefficients = CoefficientSet {
            intercept: solution[0],
            tv: solution[1],
            radio: solution[2],
            newspaper: solution[3],
        };
        tracing::debug!(?coefficients, "Fitted coefficients");
        Ok(coefficients)
    }
}

/// One row of the design matrix: `[1, tv, radio, newspaper]`.
fn design_row(observation: &Observation) -> [f64; PARAMETERS] {
    [1.0, observation.tv, observation.radio, observation.newspaper]
}

/// Fits a [`CoefficientSet`] with the default [`FitOptions`].
///
/// # Errors
/// See [`RegressionFitter::fit`].
///
/// # Example
/// ```
/// let text = "TV,Radio,Newspaper,Sales\n\
///             10,1,5,3.75\n20,4,1,4.81\n30,2,8,4.98\n40,5,3,6.03\n50,3,9,6.19";
/// let dataset = salesfit::load(text).unwrap();
/// let coefficients = salesfit::fit(&dataset).unwrap();
/// assert!((coefficients.radio - 0.2).abs() < 1e-9);
/// ```
pub fn fit(dataset: &Dataset) -> Result<CoefficientSet> {
    RegressionFitter::default().fit(dataset)
}

/// Everything the engine derives from one dataset.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Analysis {
    /// Per-channel correlation with sales
    pub correlations: CorrelationSet,

    /// The fitted model
    pub coefficients: CoefficientSet,

    /// In-sample goodness-of-fit of the model
    pub evaluation: ModelEvaluation,
}

/// Correlates and fits a dataset in one call.
///
/// With the `parallel` feature, correlation and fitting run concurrently; both
/// only read the dataset.
///
/// # Errors
/// See [`RegressionFitter::fit`].
pub fn analyze(dataset: &Dataset) -> Result<Analysis> {
    analyze_with(dataset, &RegressionFitter::default())
}

/// [`analyze`] with a configured fitter.
///
/// # Errors
/// See [`RegressionFitter::fit`].
pub fn analyze_with(dataset: &Dataset, fitter: &RegressionFitter) -> Result<Analysis> {
    #[cfg(feature = "parallel")]
    let (correlations, coefficients) = rayon::join(
        || statistics::correlate(dataset),
        || fitter.fit(dataset),
    );

    #[cfg(not(feature = "parallel"))]
    let (correlations, coefficients) = (statistics::correlate(dataset), fitter.fit(dataset));

    let coefficients = coefficients?;
    Ok(Analysis {
        correlations,
        coefficients,
        evaluation: coefficients.evaluate(dataset),
    })
}
