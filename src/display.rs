//! Utilities for displaying fitted models
//!
//! This module turns coefficient sets and analyses into human-readable text.
//!
//! # Key Concepts
//! - **[`Term`]**: A single term of the model equation with a sign and body.
//! - **[`Sign`]**: Tracks whether a term is positive or negative.
//! - **[`ModelReport`]**: A multi-section plain-text report of an [`Analysis`].
//!
//! [`CoefficientSet`] implements [`std::fmt::Display`] through [`format_equation`]; the
//! formatter precision selects the number of decimals:
//! ```rust
//! # use salesfit::CoefficientSet;
//! let coefficients = CoefficientSet { intercept: 2.921, tv: 0.047, radio: 0.188, newspaper: -0.002 };
//! assert_eq!(
//!     format!("{coefficients:.3}"),
//!     "Sales = 2.921 + 0.047·TV + 0.188·Radio - 0.002·Newspaper"
//! );
//! ```
//!
//! # Helpers
//! - [`format_coefficient`]: Formats a numeric coefficient, skipping zeros.
//! - [`format_float`]: Fixed or scientific notation depending on magnitude.
use std::fmt::Write;

use crate::{
    channel::Channel,
    fit::{Analysis, CoefficientSet, ModelEvaluation},
    predict::{BudgetInput, PredictionResult},
};

/// Default number of decimals when the formatter does not specify one
pub const DEFAULT_PRECISION: usize = 4;

/// Spend used for the "for every N spent" interpretation lines of a [`ModelReport`]
pub const INTERPRETATION_SPEND: f64 = 1000.0;

/// Magnitudes in this range are written in fixed notation, others in scientific notation
const FIXED_RANGE: std::ops::Range<f64> = 1e-3..1e3;

/// Represents the sign of an equation term.
///
/// Used when formatting the model equation to determine how a term
/// should be connected to the rest of it (e.g., with `+` or `-`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// Positive sign (`+` when displayed).
    Positive,

    /// Negative sign (`-` when displayed).
    Negative,
}

impl Sign {
    /// Determines the sign from a numeric coefficient.
    ///
    /// # Example
    /// ```
    /// # use salesfit::display::Sign;
    /// assert_eq!(Sign::from_coef(3.0), Sign::Positive);
    /// assert_eq!(Sign::from_coef(-2.0), Sign::Negative);
    /// ```
    #[must_use]
    pub fn from_coef(coef: f64) -> Self {
        if coef.is_sign_negative() {
            Self::Negative
        } else {
            Self::Positive
        }
    }

    /// Returns the character representation of the sign.
    #[must_use]
    pub fn char(&self) -> char {
        match self {
            Sign::Positive => '+',
            Sign::Negative => '-',
        }
    }
}

/// A single term of the model equation, e.g. `0.047·TV`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    /// The sign of the term
    pub sign: Sign,

    /// The body of the term, without its sign
    pub body: String,
}

impl Term {
    /// Creates a new term with the given sign and body.
    #[must_use]
    pub fn new(sign: Sign, body: String) -> Self {
        Self { sign, body }
    }

    /// Builds the term for one coefficient, or `None` if the coefficient is zero.
    ///
    /// `channel` is `None` for the intercept.
    #[must_use]
    pub fn from_coefficient(coef: f64, channel: Option<Channel>, precision: usize) -> Option<Self> {
        let sign = Sign::from_coef(coef);
        let value = format_coefficient(coef, precision)?;
        let body = match channel {
            Some(channel) => format!("{value}·{channel}"),
            None => value,
        };
        Some(Self::new(sign, body))
    }
}

/// Formats a floating point magnitude.
///
/// Fixed notation for values in `1e-3..1e3`, scientific notation otherwise.
///
/// # Example
/// ```
/// # use salesfit::display::format_float;
/// assert_eq!(format_float(2.5, 2), "2.50");
/// assert_eq!(format_float(12345.0, 2), "1.23e4");
/// ```
#[must_use]
#[allow(clippy::float_cmp)]
pub fn format_float(n: f64, precision: usize) -> String {
    if FIXED_RANGE.contains(&n.abs()) || n == 0.0 {
        format!("{n:.precision$}")
    } else {
        format!("{n:.precision$e}")
    }
}

/// Formats the magnitude of a coefficient for display in an equation term.
///
/// - Returns `None` if the coefficient is zero or effectively zero (≤ epsilon).
/// - The sign is dropped; see [`Sign::from_coef`].
///
/// # Example
/// ```
/// # use salesfit::display::format_coefficient;
/// assert_eq!(format_coefficient(0.0, 2), None);
/// assert_eq!(format_coefficient(-2.5, 2), Some("2.50".to_string()));
/// assert_eq!(format_coefficient(1e5, 2), Some("1.00e5".to_string()));
/// ```
#[must_use]
pub fn format_coefficient(coef: f64, precision: usize) -> Option<String> {
    let abs = coef.abs();
    if abs <= f64::EPSILON {
        return None;
    }

    Some(format_float(abs, precision))
}

/// Writes the model equation, `Sales = a + b·TV + c·Radio + d·Newspaper`, into a buffer.
///
/// - Zero coefficients are skipped.
/// - The first term is written without a leading `+`.
/// - A model with no nonzero coefficients is written as `Sales = 0`.
///
/// # Errors
/// Returns an error if writing to `buffer` fails.
pub fn format_equation<B: Write>(
    buffer: &mut B,
    coefficients: &CoefficientSet,
    precision: usize,
) -> std::fmt::Result {
    let intercept = Term::from_coefficient(coefficients.intercept, None, precision);
    let slopes = coefficients
        .slopes()
        .into_iter()
        .map(|(channel, slope)| Term::from_coefficient(slope, Some(channel), precision));
    let mut terms = std::iter::once(intercept).chain(slopes).flatten();

    write!(buffer, "Sales = ")?;
    let Some(first) = terms.next() else {
        return write!(buffer, "0");
    };

    if first.sign == Sign::Negative {
        write!(buffer, "{}", first.sign.char())?;
    }
    write!(buffer, "{}", first.body)?;

    for term in terms {
        write!(buffer, " {} {}", term.sign.char(), term.body)?;
    }

    Ok(())
}

impl std::fmt::Display for CoefficientSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        format_equation(f, self, f.precision().unwrap_or(DEFAULT_PRECISION))
    }
}

/// Plain-text report of an [`Analysis`].
///
/// Sections: the equation, a coefficient table with correlations, in-sample
/// (and optionally held-out) metrics, the channel ranking, importance, the
/// marginal-return interpretation, and optionally a prediction.
///
/// ```rust
/// # use salesfit::{analyze, display::ModelReport, test::synthetic_dataset, CoefficientSet};
/// let truth = CoefficientSet { intercept: 2.9, tv: 0.05, radio: 0.19, newspaper: 0.0 };
/// let data = synthetic_dataset(&truth, 50, 0.5, 3).unwrap();
/// let analysis = analyze(&data).unwrap();
/// let report = ModelReport::new(&analysis).to_string();
/// assert!(report.contains("Sales = "));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ModelReport<'a> {
    analysis: &'a Analysis,
    holdout: Option<&'a ModelEvaluation>,
    prediction: Option<(&'a BudgetInput, &'a PredictionResult)>,
}

impl<'a> ModelReport<'a> {
    /// Creates a report of an analysis.
    #[must_use]
    pub fn new(analysis: &'a Analysis) -> Self {
        Self {
            analysis,
            holdout: None,
            prediction: None,
        }
    }

    /// Adds metrics measured on held-out data.
    #[must_use]
    pub fn with_holdout(mut self, evaluation: &'a ModelEvaluation) -> Self {
        self.holdout = Some(evaluation);
        self
    }

    /// Adds a what-if prediction.
    #[must_use]
    pub fn with_prediction(mut self, budget: &'a BudgetInput, result: &'a PredictionResult) -> Self {
        self.prediction = Some((budget, result));
        self
    }

    fn write_evaluation(
        f: &mut std::fmt::Formatter<'_>,
        title: &str,
        evaluation: &ModelEvaluation,
        precision: usize,
    ) -> std::fmt::Result {
        writeln!(f, "{title} ({} observations)", evaluation.observations)?;
        writeln!(f, "  R²           {:.precision$}", evaluation.r_squared)?;
        writeln!(f, "  Adjusted R²  {:.precision$}", evaluation.adjusted_r_squared)?;
        writeln!(f, "  RMSE         {:.precision$}", evaluation.rmse)?;
        writeln!(f, "  MAE          {:.precision$}", evaluation.mae)
    }
}

impl std::fmt::Display for ModelReport<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let precision = f.precision().unwrap_or(DEFAULT_PRECISION);
        let Analysis {
            correlations,
            coefficients,
            evaluation,
        } = self.analysis;

        writeln!(f, "Model")?;
        write!(f, "  ")?;
        format_equation(f, coefficients, precision)?;
        writeln!(f)?;
        writeln!(f)?;

        writeln!(f, "Coefficients")?;
        writeln!(f, "  {:<10} {:>12.precision$}", "Intercept", coefficients.intercept)?;
        for (channel, slope) in coefficients.slopes() {
            writeln!(
                f,
                "  {:<10} {:>12.precision$}   r = {:.precision$}",
                channel.header(),
                slope,
                correlations.get(channel)
            )?;
        }
        writeln!(f)?;

        Self::write_evaluation(f, "In-sample fit", evaluation, precision)?;
        if let Some(holdout) = self.holdout {
            writeln!(f)?;
            Self::write_evaluation(f, "Held-out fit", holdout, precision)?;
        }
        writeln!(f)?;

        writeln!(f, "Channel ranking")?;
        for (rank, (channel, slope)) in crate::predict::channel_ranking(coefficients)
            .into_iter()
            .enumerate()
        {
            writeln!(f, "  {}. {:<10} {:.precision$}", rank + 1, channel.header(), slope)?;
        }
        writeln!(f)?;

        writeln!(f, "Importance")?;
        for (channel, magnitude) in coefficients.importance() {
            writeln!(f, "  {:<10} {:.precision$}", channel.header(), magnitude)?;
        }
        writeln!(f)?;

        writeln!(f, "Interpretation")?;
        for channel in Channel::ALL {
            let change = coefficients.marginal_return(channel, INTERPRETATION_SPEND);
            let direction = if change.is_sign_negative() { "fall" } else { "rise" };
            writeln!(
                f,
                "  For every {INTERPRETATION_SPEND} spent on {channel}, sales {direction} by {:.2}",
                change.abs()
            )?;
        }

        if let Some((budget, result)) = self.prediction {
            writeln!(f)?;
            writeln!(
                f,
                "Prediction for TV = {}, Radio = {}, Newspaper = {}",
                budget.tv, budget.radio, budget.newspaper
            )?;
            writeln!(f, "  Sales = {:.precision$}", result.value)?;
            writeln!(f, "  Total budget = {}", budget.total())?;
            match result.return_on_investment(budget) {
                Some(roi) => writeln!(f, "  Return on investment = {roi:.2}%")?,
                None => writeln!(f, "  Return on investment = n/a")?,
            }
        }

        Ok(())
    }
}
