//! Per-year, per-member ensemble metrics.
//!
//! A [`MetricStore`] is built once per data fetch and never mutated. Lookups
//! are hash-based; `years()` and `members()` are precomputed so the engine can
//! enumerate without re-deriving them.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MalformedDatasetError;

// ── Keys ──────────────────────────────────────────────────────────────────────

/// Known metric families. Adding a family is an explicit schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFamily {
    /// Rainfall accumulated over the sowing period (mm).
    SowingRainfall,
    /// Minimum rainfall over a sliding growth-period window (mm). Windowed.
    GrowthMinRainfall,
    /// Minimum rainfall over the 15-day harvest period (mm).
    HarvestMinRainfall,
    /// Minimum rainfall over any N-day window of the season (mm). Windowed.
    WindowMinRainfall,
}

impl MetricFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricFamily::SowingRainfall => "sowing_rainfall",
            MetricFamily::GrowthMinRainfall => "growth_min_rainfall",
            MetricFamily::HarvestMinRainfall => "harvest_min_rainfall",
            MetricFamily::WindowMinRainfall => "window_min_rainfall",
        }
    }
}

/// `(family, window?)` identifier of a scalar metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetricKey {
    pub family: MetricFamily,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_days: Option<u32>,
}

impl MetricKey {
    pub const fn plain(family: MetricFamily) -> Self {
        Self { family, window_days: None }
    }

    pub const fn windowed(family: MetricFamily, days: u32) -> Self {
        Self { family, window_days: Some(days) }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.window_days {
            Some(days) => write!(f, "{}[{days}d]", self.family.as_str()),
            None => f.write_str(self.family.as_str()),
        }
    }
}

// ── Input slices ──────────────────────────────────────────────────────────────

/// Raw metrics for one year, as handed over by the data-fetch layer.
#[derive(Debug, Clone, Default)]
pub struct YearMetrics {
    pub year: i32,
    members: HashMap<String, HashMap<MetricKey, Option<f64>>>,
}

impl YearMetrics {
    pub fn new(year: i32) -> Self {
        Self { year, members: HashMap::new() }
    }

    /// Register a member with no values (every metric absent).
    pub fn add_member(&mut self, member: impl Into<String>) {
        self.members.entry(member.into()).or_default();
    }

    /// Record one value. `None` and non-finite numbers are stored as absent.
    pub fn insert(&mut self, member: impl Into<String>, key: MetricKey, value: Option<f64>) {
        self.members.entry(member.into()).or_default().insert(key, value);
    }

    /// Chainable form of [`YearMetrics::insert`].
    pub fn with(mut self, member: &str, key: MetricKey, value: Option<f64>) -> Self {
        self.insert(member, key, value);
        self
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// Immutable `year → member → metric → value` mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricStore {
    years: Vec<i32>,
    members: BTreeSet<String>,
    /// Parallel to `years`. Absent values are simply not stored.
    rows: Vec<HashMap<String, HashMap<MetricKey, f64>>>,
    row_of: HashMap<i32, usize>,
    known_keys: HashSet<MetricKey>,
}

impl MetricStore {
    /// Build a store from per-year slices given in ascending year order.
    ///
    /// Fails on the first year that does not strictly follow its predecessor,
    /// or on an empty member identifier.
    pub fn new(years: Vec<YearMetrics>) -> Result<Self, MalformedDatasetError> {
        let mut store = MetricStore::default();

        for slice in years {
            if let Some(&previous) = store.years.last() {
                if slice.year <= previous {
                    return Err(MalformedDatasetError::OutOfOrderYear {
                        year: slice.year,
                        previous,
                    });
                }
            }

            let mut row = HashMap::with_capacity(slice.members.len());
            for (member, values) in slice.members {
                if member.is_empty() {
                    return Err(MalformedDatasetError::EmptyMember { year: slice.year });
                }
                let present: HashMap<MetricKey, f64> = values
                    .into_iter()
                    .filter_map(|(k, v)| v.filter(|x| x.is_finite()).map(|x| (k, x)))
                    .collect();
                store.known_keys.extend(present.keys().copied());
                store.members.insert(member.clone());
                row.insert(member, present);
            }

            store.row_of.insert(slice.year, store.rows.len());
            store.years.push(slice.year);
            store.rows.push(row);
        }

        Ok(store)
    }

    /// Ascending, distinct years.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Union of members across all years.
    pub fn members(&self) -> &BTreeSet<String> {
        &self.members
    }

    /// `None` when the year, member or metric is missing, or the value is absent.
    #[inline]
    pub fn get(&self, year: i32, member: &str, key: &MetricKey) -> Option<f64> {
        let row = self.rows.get(*self.row_of.get(&year)?)?;
        row.get(member)?.get(key).copied()
    }

    /// Whether any member in any year has a value for `key`.
    pub fn has_metric(&self, key: &MetricKey) -> bool {
        self.known_keys.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}
