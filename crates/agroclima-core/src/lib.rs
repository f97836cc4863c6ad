//! Ensemble viability aggregation for agro-climatic projections.
//!
//! Given per-year, per-member climate metrics ([`MetricStore`]) and a set of
//! threshold curves ([`ScoringConfig`]), compute for every year the share of
//! ensemble members satisfying each curve ([`ViabilitySeries`]).

pub mod config;
pub mod criteria;
pub mod engine;
pub mod error;
pub mod memo;
pub mod metrics;
pub mod payload;
pub mod presets;
pub mod window;

pub use config::{Curve, ScoringConfig, ThresholdParam};
pub use criteria::{evaluate, Comparator, Criterion, Outcome, ResolvedCriterion, Threshold};
pub use engine::{compute_series, compute_year, curve_percentage, ViabilitySeries, YearViability};
pub use error::{ConfigError, MalformedDatasetError, PayloadError};
pub use memo::SeriesMemo;
pub use metrics::{MetricFamily, MetricKey, MetricStore, YearMetrics};
pub use window::{effective_threshold, REFERENCE_WINDOW_DAYS};
