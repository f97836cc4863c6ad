//! Threshold criteria and their three-valued evaluation.

use serde::{Deserialize, Serialize};

use crate::metrics::{MetricKey, MetricStore};

/// Direction of a threshold comparison. Both are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = ">=", alias = "at_least")]
    AtLeast,
    #[serde(rename = "<=", alias = "at_most")]
    AtMost,
}

impl Comparator {
    #[inline]
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparator::AtLeast => value >= threshold,
            Comparator::AtMost => value <= threshold,
        }
    }
}

/// Where a criterion's base threshold comes from.
///
/// In JSON a number is a literal and a string names a shared parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Fixed(f64),
    Parameter(String),
}

/// A criterion as configured: metric, comparator, threshold source and an
/// optional normalisation window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub metric: MetricKey,
    pub comparator: Comparator,
    pub threshold: Threshold,
    /// When set, the base threshold is rescaled from the reference window to
    /// this many days before comparison.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_days: Option<u32>,
}

impl Criterion {
    pub fn new(metric: MetricKey, comparator: Comparator, threshold: Threshold) -> Self {
        Self { metric, comparator, threshold, window_days: None }
    }

    pub fn at_least(metric: MetricKey, threshold: impl Into<Threshold>) -> Self {
        Self::new(metric, Comparator::AtLeast, threshold.into())
    }

    pub fn at_most(metric: MetricKey, threshold: impl Into<Threshold>) -> Self {
        Self::new(metric, Comparator::AtMost, threshold.into())
    }

    /// Normalise the threshold to a `days`-long window.
    pub fn normalized_to(mut self, days: u32) -> Self {
        self.window_days = Some(days);
        self
    }
}

impl From<f64> for Threshold {
    fn from(value: f64) -> Self {
        Threshold::Fixed(value)
    }
}

impl From<&str> for Threshold {
    fn from(name: &str) -> Self {
        Threshold::Parameter(name.to_owned())
    }
}

/// A criterion with its effective threshold already resolved and scaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedCriterion {
    pub metric: MetricKey,
    pub comparator: Comparator,
    pub threshold: f64,
}

/// Result of checking one criterion for one member/year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Pass,
    Fail,
    /// The metric value is absent; neither pass nor fail.
    Indeterminate,
}

/// Check `criterion` against the store. Pure and total.
#[inline]
pub fn evaluate(
    criterion: &ResolvedCriterion,
    year: i32,
    member: &str,
    store: &MetricStore,
) -> Outcome {
    match store.get(year, member, &criterion.metric) {
        None => Outcome::Indeterminate,
        Some(value) if criterion.comparator.holds(value, criterion.threshold) => Outcome::Pass,
        Some(_) => Outcome::Fail,
    }
}
