use thiserror::Error;

/// Raised while building a [`crate::metrics::MetricStore`]. Never repaired
/// silently: the caller surfaces it as a data-loading failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedDatasetError {
    /// Years must be strictly ascending; duplicates count as out of order.
    #[error("year {year} is out of order (follows {previous})")]
    OutOfOrderYear { year: i32, previous: i32 },
    #[error("empty member identifier in year {year}")]
    EmptyMember { year: i32 },
}

/// Structural problems in a [`crate::config::ScoringConfig`].
///
/// Threshold *values* are never rejected here; out-of-range numbers are the
/// caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("curve name {0:?} is used more than once")]
    DuplicateCurve(String),
    #[error("curve {curve:?} references unknown parameter {parameter:?}")]
    UnknownParameter { curve: String, parameter: String },
    #[error("curve {0:?} has no criteria")]
    EmptyCurve(String),
    #[error("config has no parameter named {0:?}")]
    NoSuchParameter(String),
    #[error("reference window must be at least one day")]
    ZeroReferenceWindow,
    #[error("unknown preset {0:?}")]
    UnknownPreset(String),
}

/// Failures while turning a data-fetch payload into a metric store.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("invalid payload JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("data source reported an error: {0}")]
    Upstream(String),
    #[error(transparent)]
    Dataset(#[from] MalformedDatasetError),
}
