//! # Salesfit
//! ## How much is a dollar of radio worth?
//!
//! Given a history of advertising spend on TV, radio and newspaper, and the sales that followed,
//! this library fits a linear model of sales against spend and uses it to answer what-if questions.
//!
//! I provide a set of tools designed to help you:
//! - Load advertising data leniently from CSV (or strictly from JSON)
//! - See how strongly each channel correlates with sales
//! - Fit an ordinary least squares model, and measure how good it is
//! - Predict sales for any budget, and rank the channels by effectiveness
//! - Write easy to understand tests against synthetic data with known coefficients
//!
//! The simplest use-case is to load a file, fit it, and ask a question:
//! ```rust
//! use salesfit::{BudgetInput, Channel};
//!
//! let csv = "TV,Radio,Newspaper,Sales\n\
//!            10,1,5,3.75\n20,4,1,4.81\n30,2,8,4.98\n40,5,3,6.03\n50,3,9,6.19";
//!
//! let dataset = salesfit::load(csv).unwrap();
//! let coefficients = salesfit::fit(&dataset).unwrap();
//!
//! let result = salesfit::predict(&coefficients, &BudgetInput::new(150.0, 30.0, 40.0));
//! assert_eq!(result.channel_ranking[0].0, Channel::Radio);
//! println!("{coefficients}"); // Sales = 3.0000 + 0.0500·TV + 0.2000·Radio + 0.0100·Newspaper
//! ```
//!
//! # Core Concepts
//! - A [`Dataset`] is a non-empty, ordered sequence of [`Observation`]s: spend per channel and the sales that followed.
//!     - [`load`] builds one from CSV text. Bad rows are skipped and bad fields become `0`; see [`load_with_report`] to find out what happened.
//! - A [`CorrelationSet`] tells you how strongly each channel moves with sales, on its own.
//!     - Correlation is not effect! Channels are often correlated with each other.
//! - A [`CoefficientSet`] is the fitted model `sales = intercept + tv·TV + radio·Radio + newspaper·Newspaper`.
//!     - Use [`fit`], or a configured [`RegressionFitter`].
//!     - It fails with [`error::Error::SingularMatrix`] when the channels cannot be told apart (too few rows, a constant or duplicated column)
//!     - [`CoefficientSet::evaluate`] measures it against any dataset; use [`Dataset::train_test_split`] for an honest score.
//! - [`predict`] evaluates the model for a [`BudgetInput`], and ranks the channels by slope.
//!     - It is pure and cheap: call it again whenever the budget changes.
//!
//! # Implementation Details
//!
//! The fit is computed with an SVD of the design matrix, through `nalgebra`.
//! With the `parallel` feature, very large datasets are reduced to the normal equations on all cores with `rayon`,
//! and [`analyze`] correlates and fits at the same time.
//!
//! The library logs through `tracing`, and never installs a subscriber.
//!
//! # Testing utilities
//!
//! This crate includes a set of testing utilities for models built on top of it. See [`test`].
//!
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::needless_range_loop)] // The worst clippy lint
#![allow(clippy::cast_precision_loss)] // I don't care about this one
#![allow(clippy::similar_names)] //       Clippy does not get to decide what names are similar
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod test;

pub mod channel;
pub mod dataset;
pub mod display;
pub mod error;
pub mod statistics;

mod fit;
mod predict;

pub use fit::*;
pub use predict::*;

pub use channel::Channel;
pub use dataset::{load, load_with_report, Dataset, LoadReport, LoaderOptions, Observation};
pub use statistics::{correlate, CorrelationSet};

pub use nalgebra;
