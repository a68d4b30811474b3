//! Error types for loading advertising data and fitting sales models
//!
//! This module defines the failures surfaced by the engine, along with a
//! convenient `Result` alias.
//!
//! Row-level problems found while loading are **not** errors; they are
//! defaulted or skipped and reported through [`crate::LoadReport`].
use crate::channel::Channel;

/// Errors raised while parsing a table of advertising records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The input is empty, or its first row could not be read as a header.
    #[error("Input has no readable header row")]
    NoHeader,

    /// The header row does not name one of the required columns.
    #[error("Header row is missing the `{0}` column")]
    MissingColumn(Column),

    /// The header was found, but no data row survived coercion.
    #[error("No valid data rows found")]
    NoData,
}

/// A required column of the input table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// One of the advertising spend columns
    Channel(Channel),

    /// The target column
    Sales,
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Column::Channel(channel) => write!(f, "{channel}"),
            Column::Sales => f.write_str("Sales"),
        }
    }
}

/// Errors that can occur while loading, fitting or splitting a dataset.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input table could not be turned into a dataset.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Cannot compute the regression because the design matrix is rank deficient
    ///
    /// Usually the channel columns are collinear, a column is constant, or there
    /// are fewer distinct observations than coefficients.
    #[error(
        "Design matrix is singular; the data may be insufficient or the channels collinear. [n: {n}, k: {k}]"
    )]
    SingularMatrix {
        /// Number of observations
        n: usize,
        /// Number of coefficients
        k: usize,
    },

    /// Failed to solve the algebraic system during fitting.
    #[error("Failed to solve: {0}")]
    Algebra(&'static str),

    /// A train/test split was requested with an unusable test fraction.
    #[error("Cannot split dataset with test fraction {0}; both halves must be non-empty")]
    InvalidSplit(f64),

    /// An observation supplied directly (not through the lenient loader) is invalid.
    #[error("Invalid observation: {0}")]
    InvalidObservation(String),

    /// A JSON dataset could not be decoded.
    #[error("Failed to decode JSON dataset: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the sales regression engine
pub type Result<T> = std::result::Result<T, Error>;
