//! Scoring configuration: named curves over a shared set of slider-bound
//! threshold parameters.
//!
//! A [`ScoringConfig`] is an immutable value. Every slider edit produces a
//! whole new config through [`ScoringConfig::with_parameter`].

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::criteria::{Criterion, ResolvedCriterion, Threshold};
use crate::error::ConfigError;
use crate::window::{effective_threshold, REFERENCE_WINDOW_DAYS};

// ── Parameters ────────────────────────────────────────────────────────────────

/// One adjustable threshold and the range the UI offers for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdParam {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

impl ThresholdParam {
    pub fn new(value: f64) -> Self {
        Self { value, min: None, max: None, step: None }
    }

    pub fn ranged(value: f64, min: f64, max: f64, step: f64) -> Self {
        Self { value, min: Some(min), max: Some(max), step: Some(step) }
    }

    /// Caller-side helper for input widgets; the engine never clamps.
    pub fn clamp(&self, value: f64) -> f64 {
        let lo = self.min.map_or(value, |m| value.max(m));
        self.max.map_or(lo, |m| lo.min(m))
    }
}

// ── Curves ────────────────────────────────────────────────────────────────────

/// A named AND-combination of criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub name: String,
    pub criteria: Vec<Criterion>,
}

impl Curve {
    pub fn new(name: impl Into<String>, criteria: Vec<Criterion>) -> Self {
        Self { name: name.into(), criteria }
    }
}

// ── Config ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawScoringConfig {
    name: String,
    #[serde(default = "default_reference_window")]
    reference_window_days: u32,
    #[serde(default)]
    parameters: BTreeMap<String, ThresholdParam>,
    curves: Vec<Curve>,
}

fn default_reference_window() -> u32 {
    REFERENCE_WINDOW_DAYS
}

/// Validated, immutable set of curves sharing threshold parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawScoringConfig", into = "RawScoringConfig")]
pub struct ScoringConfig {
    name: String,
    reference_window_days: u32,
    parameters: BTreeMap<String, ThresholdParam>,
    curves: Vec<Curve>,
}

impl ScoringConfig {
    /// Build a config with the default 30-day reference window.
    pub fn new(
        name: impl Into<String>,
        parameters: BTreeMap<String, ThresholdParam>,
        curves: Vec<Curve>,
    ) -> Result<Self, ConfigError> {
        Self::with_reference_window(name, REFERENCE_WINDOW_DAYS, parameters, curves)
    }

    pub fn with_reference_window(
        name: impl Into<String>,
        reference_window_days: u32,
        parameters: BTreeMap<String, ThresholdParam>,
        curves: Vec<Curve>,
    ) -> Result<Self, ConfigError> {
        if reference_window_days == 0 {
            return Err(ConfigError::ZeroReferenceWindow);
        }

        let mut seen = HashSet::new();
        for curve in &curves {
            if !seen.insert(curve.name.as_str()) {
                return Err(ConfigError::DuplicateCurve(curve.name.clone()));
            }
            if curve.criteria.is_empty() {
                return Err(ConfigError::EmptyCurve(curve.name.clone()));
            }
            for criterion in &curve.criteria {
                if let Threshold::Parameter(p) = &criterion.threshold {
                    if !parameters.contains_key(p) {
                        return Err(ConfigError::UnknownParameter {
                            curve: curve.name.clone(),
                            parameter: p.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self { name: name.into(), reference_window_days, parameters, curves })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reference_window_days(&self) -> u32 {
        self.reference_window_days
    }

    pub fn parameters(&self) -> &BTreeMap<String, ThresholdParam> {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters.get(name).map(|p| p.value)
    }

    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    /// New config with one parameter value replaced. The value is taken as is.
    pub fn with_parameter(&self, name: &str, value: f64) -> Result<Self, ConfigError> {
        let mut next = self.clone();
        let param = next
            .parameters
            .get_mut(name)
            .ok_or_else(|| ConfigError::NoSuchParameter(name.to_owned()))?;
        param.value = value;
        Ok(next)
    }

    /// Effective threshold of one criterion: the base value, rescaled when the
    /// criterion carries a window. `None` only for an unknown parameter, which
    /// validation rules out.
    pub fn effective_threshold(&self, criterion: &Criterion) -> Option<f64> {
        let base = match &criterion.threshold {
            Threshold::Fixed(v) => *v,
            Threshold::Parameter(p) => self.parameter(p)?,
        };
        Some(match criterion.window_days {
            Some(days) => effective_threshold(base, days, self.reference_window_days),
            None => base,
        })
    }

    /// Resolve every criterion of `curve` against the current parameters.
    pub fn resolve(&self, curve: &Curve) -> Option<Vec<ResolvedCriterion>> {
        curve
            .criteria
            .iter()
            .map(|c| {
                Some(ResolvedCriterion {
                    metric: c.metric,
                    comparator: c.comparator,
                    threshold: self.effective_threshold(c)?,
                })
            })
            .collect()
    }
}

impl TryFrom<RawScoringConfig> for ScoringConfig {
    type Error = ConfigError;

    fn try_from(raw: RawScoringConfig) -> Result<Self, Self::Error> {
        Self::with_reference_window(raw.name, raw.reference_window_days, raw.parameters, raw.curves)
    }
}

impl From<ScoringConfig> for RawScoringConfig {
    fn from(c: ScoringConfig) -> Self {
        Self {
            name: c.name,
            reference_window_days: c.reference_window_days,
            parameters: c.parameters,
            curves: c.curves,
        }
    }
}
