//! Stateless what-if predictions from a fitted model
//!
//! [`predict`] is a pure function of a [`CoefficientSet`] and a [`BudgetInput`]:
//! callers re-run it whenever either changes. Nothing is cached.
use std::ops::Add;

use crate::{
    channel::{self, Channel},
    fit::CoefficientSet,
};

/// Spend on each channel for one what-if query.
///
/// Budgets are expected to be non-negative, but this is not enforced: range
/// limits belong to the caller, and negative budgets simply extrapolate.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BudgetInput {
    /// TV spend
    pub tv: f64,

    /// Radio spend
    pub radio: f64,

    /// Newspaper spend
    pub newspaper: f64,
}

impl BudgetInput {
    /// No spend on any channel.
    pub const ZERO: BudgetInput = BudgetInput {
        tv: 0.0,
        radio: 0.0,
        newspaper: 0.0,
    };

    /// Creates a budget.
    #[must_use]
    pub const fn new(tv: f64, radio: f64, newspaper: f64) -> Self {
        Self {
            tv,
            radio,
            newspaper,
        }
    }

    /// Returns the spend on one channel.
    #[must_use]
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Tv => self.tv,
            Channel::Radio => self.radio,
            Channel::Newspaper => self.newspaper,
        }
    }

    /// Total spend across all channels.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.tv + self.radio + self.newspaper
    }
}

impl Add for BudgetInput {
    type Output = BudgetInput;

    fn add(self, rhs: Self) -> Self::Output {
        BudgetInput {
            tv: self.tv + rhs.tv,
            radio: self.radio + rhs.radio,
            newspaper: self.newspaper + rhs.newspaper,
        }
    }
}

/// Predicted sales for a budget, and the channels ranked by effectiveness.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PredictionResult {
    /// Predicted sales
    pub value: f64,

    /// Every channel exactly once, with its slope, sorted by slope descending.
    ///
    /// Equal slopes keep priority order (TV, Radio, Newspaper).
    pub channel_ranking: [(Channel, f64); 3],
}

impl PredictionResult {
    /// Predicted sales as a percentage of the total budget: `value / total · 100`.
    ///
    /// Returns `None` when the budget totals zero, since there is nothing to return on.
    ///
    /// ```rust
    /// # use salesfit::{predict, BudgetInput, CoefficientSet};
    /// let coefficients = CoefficientSet { intercept: 2.921, tv: 0.047, radio: 0.188, newspaper: 0.002 };
    /// let budget = BudgetInput::new(150.0, 30.0, 40.0);
    /// let roi = predict(&coefficients, &budget).return_on_investment(&budget).unwrap();
    /// assert!((roi - 15.691 / 220.0 * 100.0).abs() < 1e-9);
    /// ```
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn return_on_investment(&self, budget: &BudgetInput) -> Option<f64> {
        let total = budget.total();
        if total == 0.0 {
            return None;
        }
        Some(self.value / total * 100.0)
    }
}

/// Predicts sales for a budget.
///
/// ```math
/// value = intercept + tv·budget.tv + radio·budget.radio + newspaper·budget.newspaper
/// ```
///
/// The terms are summed in that order, so a zero budget returns the intercept exactly.
///
/// # Example
/// ```rust
/// use salesfit::{predict, BudgetInput, Channel, CoefficientSet};
///
/// let coefficients = CoefficientSet { intercept: 2.921, tv: 0.047, radio: 0.188, newspaper: 0.002 };
/// let result = predict(&coefficients, &BudgetInput::new(150.0, 30.0, 40.0));
/// assert!((result.value - 15.691).abs() < 1e-9);
/// assert_eq!(result.channel_ranking[0].0, Channel::Radio);
/// ```
#[must_use]
pub fn predict(coefficients: &CoefficientSet, budget: &BudgetInput) -> PredictionResult {
    let value = coefficients.intercept
        + coefficients.tv * budget.tv
        + coefficients.radio * budget.radio
        + coefficients.newspaper * budget.newspaper;

    PredictionResult {
        value,
        channel_ranking: channel_ranking(coefficients),
    }
}

/// Channels sorted by slope, highest first, ties in priority order.
#[must_use]
pub fn channel_ranking(coefficients: &CoefficientSet) -> [(Channel, f64); 3] {
    let mut ranking = coefficients.slopes();
    channel::sort_descending(&mut ranking);
    ranking
}

impl CoefficientSet {
    /// Channels ranked by the magnitude of their slope, largest first.
    ///
    /// Unlike [`channel_ranking`], a strongly negative channel ranks high here:
    /// the values are `|slope|`. Ties keep priority order.
    #[must_use]
    pub fn importance(&self) -> [(Channel, f64); 3] {
        let mut importance = self.slopes().map(|(c, slope)| (c, slope.abs()));
        channel::sort_descending(&mut importance);
        importance
    }

    /// Expected change in sales from spending `spend` more on one channel.
    ///
    /// ```rust
    /// # use salesfit::{Channel, CoefficientSet};
    /// let coefficients = CoefficientSet { intercept: 0.0, tv: 0.047, radio: 0.188, newspaper: 0.002 };
    /// // "For every 1000 spent on radio..."
    /// assert!((coefficients.marginal_return(Channel::Radio, 1000.0) - 188.0).abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn marginal_return(&self, channel: Channel, spend: f64) -> f64 {
        self.slope(channel) * spend
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::assert_close;

    const COEFFICIENTS: CoefficientSet = CoefficientSet {
        intercept: 2.921,
        tv: 0.047,
        radio: 0.188,
        newspaper: 0.002,
    };

    #[test]
    fn zero_budget_is_intercept() {
        let result = predict(&COEFFICIENTS, &BudgetInput::ZERO);
        assert_eq!(result.value, COEFFICIENTS.intercept);

        let negative = CoefficientSet {
            intercept: -1.25,
            tv: -3.0,
            radio: 1e9,
            newspaper: -0.0,
        };
        assert_eq!(predict(&negative, &BudgetInput::ZERO).value, -1.25);
    }

    #[test]
    fn predict_is_linear() {
        let a = BudgetInput::new(150.0, 30.0, 40.0);
        let b = BudgetInput::new(12.5, 7.25, 300.0);
        let zero = predict(&COEFFICIENTS, &BudgetInput::ZERO).value;

        let sum = predict(&COEFFICIENTS, &a).value + predict(&COEFFICIENTS, &b).value - zero;
        assert_close!(sum, predict(&COEFFICIENTS, &(a + b)).value, 1e-12);
    }

    #[test]
    fn predict_is_pure() {
        let budget = BudgetInput::new(200.0, 40.0, 60.0);
        let first = predict(&COEFFICIENTS, &budget);
        let second = predict(&COEFFICIENTS, &budget);
        assert_eq!(first, second);
        assert_eq!(first.value.to_bits(), second.value.to_bits());
    }

    #[test]
    fn negative_budgets_extrapolate() {
        let result = predict(&COEFFICIENTS, &BudgetInput::new(-100.0, -50.0, 0.0));
        assert_close!(result.value, 2.921 - 4.7 - 9.4, 1e-12);
        assert!(result.value < 0.0);
    }

    #[test]
    fn ranking_sorted_descending() {
        let ranking = predict(&COEFFICIENTS, &BudgetInput::ZERO).channel_ranking;
        assert_eq!(
            ranking,
            [
                (Channel::Radio, 0.188),
                (Channel::Tv, 0.047),
                (Channel::Newspaper, 0.002)
            ]
        );
    }

    #[test]
    fn ranking_ties_follow_priority() {
        let all_equal = CoefficientSet {
            intercept: 0.0,
            tv: 1.0,
            radio: 1.0,
            newspaper: 1.0,
        };
        let channels = channel_ranking(&all_equal).map(|(c, _)| c);
        assert_eq!(channels, Channel::ALL);

        let tied_low = CoefficientSet {
            intercept: 0.0,
            tv: -2.0,
            radio: 5.0,
            newspaper: -2.0,
        };
        let channels = channel_ranking(&tied_low).map(|(c, _)| c);
        assert_eq!(channels, [Channel::Radio, Channel::Tv, Channel::Newspaper]);
    }

    #[test]
    fn ranking_ties_between_signed_zeros_follow_priority() {
        let coefficients = CoefficientSet {
            intercept: 1.0,
            tv: -0.0,
            radio: 0.0,
            newspaper: -1.0,
        };
        let channels = channel_ranking(&coefficients).map(|(c, _)| c);
        assert_eq!(channels, Channel::ALL);

        let importance = CoefficientSet {
            newspaper: -0.0,
            ..coefficients
        }
        .importance();
        assert_eq!(importance.map(|(c, _)| c), Channel::ALL);
    }

    #[test]
    fn ranking_is_permutation_of_channels() {
        let cases = [
            (0.3, -0.1, 0.2),
            (-1.0, -2.0, -3.0),
            (0.0, 0.0, 1.0),
            (5.0, 5.0, -5.0),
        ];
        for (tv, radio, newspaper) in cases {
            let coefficients = CoefficientSet {
                intercept: 1.0,
                tv,
                radio,
                newspaper,
            };
            let ranking = channel_ranking(&coefficients);

            let mut channels = ranking.map(|(c, _)| c);
            channels.sort();
            assert_eq!(channels, Channel::ALL);
            assert!(ranking.windows(2).all(|w| w[0].1 >= w[1].1));
        }
    }

    #[test]
    fn importance_uses_magnitude() {
        let coefficients = CoefficientSet {
            intercept: 0.0,
            tv: 0.05,
            radio: -0.3,
            newspaper: 0.1,
        };
        let importance = coefficients.importance();
        assert_eq!(importance[0], (Channel::Radio, 0.3));
        assert_eq!(importance[1], (Channel::Newspaper, 0.1));
        assert_eq!(importance[2], (Channel::Tv, 0.05));
    }

    #[test]
    fn return_on_investment_is_percentage_of_budget() {
        let budget = BudgetInput::new(150.0, 30.0, 40.0);
        let result = predict(&COEFFICIENTS, &budget);
        let roi = result.return_on_investment(&budget).unwrap();
        assert_close!(roi, result.value / 220.0 * 100.0, 1e-12);
        assert_close!(roi, 7.132_272_727_272_727, 1e-9);

        // Small budgets return more than they cost
        let small = BudgetInput::new(10.0, 0.0, 0.0);
        assert!(predict(&COEFFICIENTS, &small).return_on_investment(&small).unwrap() > 30.0);
    }

    #[test]
    fn return_on_investment_of_zero_budget_is_none() {
        let result = predict(&COEFFICIENTS, &BudgetInput::ZERO);
        assert_eq!(result.return_on_investment(&BudgetInput::ZERO), None);

        let cancelling = BudgetInput::new(10.0, -10.0, -0.0);
        assert_eq!(result.return_on_investment(&cancelling), None);
    }

    #[test]
    fn budget_arithmetic() {
        let budget = BudgetInput::new(1.0, 2.0, 3.0) + BudgetInput::new(4.0, 5.0, 6.0);
        assert_eq!(budget, BudgetInput::new(5.0, 7.0, 9.0));
        assert_eq!(budget.total(), 21.0);
        assert_eq!(budget.get(Channel::Radio), 7.0);
    }
}
