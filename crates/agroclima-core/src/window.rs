//! Window-relative threshold normalisation.
//!
//! Thresholds are expressed per month-equivalent (the reference window).
//! A criterion evaluated over a `w`-day window compares against
//! `T × w / R` instead of `T`.

/// Canonical window length, in days, for which thresholds are defined.
pub const REFERENCE_WINDOW_DAYS: u32 = 30;

/// Scale `threshold` from `reference_days` to `window_days`.
///
/// Computed fresh on every call. `reference_days` must be non-zero; configs
/// reject a zero reference window before they reach the engine.
#[inline]
pub fn effective_threshold(threshold: f64, window_days: u32, reference_days: u32) -> f64 {
    if window_days == reference_days {
        return threshold;
    }
    threshold * f64::from(window_days) / f64::from(reference_days)
}
