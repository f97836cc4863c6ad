//! Ensemble viability aggregation.
//!
//! For every year and curve: count the members whose criteria are all
//! determinate (denominator) and, among them, those passing every criterion
//! (numerator). Years and curves are independent of each other; recomputing
//! one year never touches another.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{Curve, ScoringConfig};
use crate::criteria::{evaluate, Outcome, ResolvedCriterion};
use crate::metrics::{MetricKey, MetricStore};

// ── Output types ──────────────────────────────────────────────────────────────

/// Percentage of valid members passing one curve in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePercentage {
    pub curve: String,
    /// `None` when no member had complete data for this curve/year.
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearViability {
    pub year: i32,
    /// In config curve order.
    pub curves: Vec<CurvePercentage>,
}

impl YearViability {
    /// `None` for an unknown curve as well as for an undefined value.
    pub fn percentage(&self, curve: &str) -> Option<f64> {
        self.curves.iter().find(|c| c.curve == curve).and_then(|c| c.percentage)
    }
}

/// One record per store year, ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViabilitySeries {
    records: Vec<YearViability>,
}

impl ViabilitySeries {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, YearViability> {
        self.records.iter()
    }

    pub fn year(&self, year: i32) -> Option<&YearViability> {
        self.records
            .binary_search_by_key(&year, |r| r.year)
            .ok()
            .and_then(|i| self.records.get(i))
    }

    /// `(year, percentage)` pairs for one curve, ready for charting.
    pub fn curve_values<'a>(
        &'a self,
        curve: &'a str,
    ) -> impl Iterator<Item = (i32, Option<f64>)> + 'a {
        self.records.iter().map(move |r| (r.year, r.percentage(curve)))
    }
}

impl<'a> IntoIterator for &'a ViabilitySeries {
    type Item = &'a YearViability;
    type IntoIter = std::slice::Iter<'a, YearViability>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ── Per-year tally ────────────────────────────────────────────────────────────

/// Numerator and denominator for one curve in one year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearTally {
    pub passed: usize,
    pub valid: usize,
}

impl YearTally {
    /// `100 × passed / valid` rounded to one decimal; `None` when nothing was valid.
    pub fn percentage(self) -> Option<f64> {
        if self.valid == 0 {
            return None;
        }
        Some(round1(100.0 * self.passed as f64 / self.valid as f64))
    }
}

/// Round to one decimal place, halves away from zero.
#[inline]
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Tally every store member against already-resolved criteria.
///
/// A member with any indeterminate criterion is left out of both counts.
pub fn tally(store: &MetricStore, year: i32, criteria: &[ResolvedCriterion]) -> YearTally {
    let mut t = YearTally::default();
    'members: for member in store.members() {
        let mut all_pass = true;
        for c in criteria {
            match evaluate(c, year, member, store) {
                Outcome::Indeterminate => continue 'members,
                Outcome::Fail => all_pass = false,
                Outcome::Pass => {}
            }
        }
        t.valid += 1;
        if all_pass {
            t.passed += 1;
        }
    }
    t
}

/// Percentage for a single curve and year.
pub fn curve_percentage(
    store: &MetricStore,
    config: &ScoringConfig,
    curve: &Curve,
    year: i32,
) -> Option<f64> {
    let criteria = config.resolve(curve)?;
    tally(store, year, &criteria).percentage()
}

// ── Series ────────────────────────────────────────────────────────────────────

type Resolved<'a> = Vec<(&'a str, Option<Vec<ResolvedCriterion>>)>;

fn resolve_all(config: &ScoringConfig) -> Resolved<'_> {
    config
        .curves()
        .iter()
        .map(|c| (c.name.as_str(), config.resolve(c)))
        .collect()
}

/// First metric of `curve` that no year of the store carries.
fn missing_metric<'a>(store: &MetricStore, curve: &'a Curve) -> Option<&'a MetricKey> {
    curve.criteria.iter().map(|c| &c.metric).find(|m| !store.has_metric(m))
}

fn year_record(store: &MetricStore, resolved: &Resolved<'_>, year: i32) -> YearViability {
    let curves = resolved
        .iter()
        .map(|(name, criteria)| CurvePercentage {
            curve: (*name).to_owned(),
            percentage: criteria.as_deref().and_then(|c| tally(store, year, c).percentage()),
        })
        .collect();
    YearViability { year, curves }
}

/// Recompute one year only.
pub fn compute_year(store: &MetricStore, config: &ScoringConfig, year: i32) -> YearViability {
    year_record(store, &resolve_all(config), year)
}

/// Full series: every store year, every config curve.
pub fn compute_series(store: &MetricStore, config: &ScoringConfig) -> ViabilitySeries {
    if store.is_empty() {
        return ViabilitySeries::default();
    }

    for curve in config.curves() {
        if let Some(metric) = missing_metric(store, curve) {
            warn!(
                curve = %curve.name,
                %metric,
                "metric absent from dataset; curve is undefined for every year"
            );
        }
    }

    let resolved = resolve_all(config);

    #[cfg(feature = "threading")]
    let records: Vec<YearViability> = {
        use rayon::prelude::*;
        store
            .years()
            .par_iter()
            .map(|&y| year_record(store, &resolved, y))
            .collect()
    };
    #[cfg(not(feature = "threading"))]
    let records: Vec<YearViability> = store
        .years()
        .iter()
        .map(|&y| year_record(store, &resolved, y))
        .collect();

    debug!(
        config = config.name(),
        years = records.len(),
        members = store.members().len(),
        curves = config.curves().len(),
        "computed viability series"
    );

    ViabilitySeries { records }
}
