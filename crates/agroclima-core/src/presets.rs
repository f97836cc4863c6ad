//! Built-in scoring configs for the agronomic charts.
//!
//! Default values are the ones the chart controls start from.

use std::collections::BTreeMap;

use crate::config::{Curve, ScoringConfig, ThresholdParam};
use crate::criteria::Criterion;
use crate::error::ConfigError;
use crate::metrics::{MetricFamily, MetricKey};

pub const CORN_VIABILITY: &str = "corn_viability";
pub const COVER_CROP_FEASIBILITY: &str = "cover_crop_feasibility";

/// Window lengths (days) tracked by the cover-crop chart.
pub const COVER_CROP_WINDOWS: [u32; 2] = [21, 42];

/// Corn: sowing rainfall, growth-period minimum and a dry harvest.
///
/// Two curves differ only in the growth window (60 vs 30 days), each with
/// its own unscaled threshold.
pub fn corn_viability() -> Result<ScoringConfig, ConfigError> {
    let sowing = MetricKey::plain(MetricFamily::SowingRainfall);
    let harvest = MetricKey::plain(MetricFamily::HarvestMinRainfall);

    let parameters = BTreeMap::from([
        ("sowing".to_owned(), ThresholdParam::ranged(100.0, 0.0, 500.0, 10.0)),
        ("growth_60d".to_owned(), ThresholdParam::ranged(100.0, 0.0, 500.0, 10.0)),
        ("growth_30d".to_owned(), ThresholdParam::ranged(20.0, 0.0, 200.0, 5.0)),
        ("harvest".to_owned(), ThresholdParam::ranged(10.0, 0.0, 100.0, 1.0)),
    ]);

    let curve = |days: u32, param: &str| {
        Curve::new(
            param,
            vec![
                Criterion::at_least(sowing, "sowing"),
                Criterion::at_least(
                    MetricKey::windowed(MetricFamily::GrowthMinRainfall, days),
                    param,
                ),
                Criterion::at_most(harvest, "harvest"),
            ],
        )
    };

    ScoringConfig::new(
        CORN_VIABILITY,
        parameters,
        vec![curve(60, "growth_60d"), curve(30, "growth_30d")],
    )
}

/// Cover crops: minimum rainfall over 21- and 42-day windows against one
/// monthly threshold (25 mm / 30 days), scaled to each window.
pub fn cover_crop_feasibility() -> Result<ScoringConfig, ConfigError> {
    let parameters = BTreeMap::from([(
        "min_rainfall".to_owned(),
        ThresholdParam::ranged(25.0, 0.0, 100.0, 1.0),
    )]);

    let curves = COVER_CROP_WINDOWS
        .iter()
        .map(|&days| {
            Curve::new(
                format!("window_{days}d"),
                vec![Criterion::at_least(
                    MetricKey::windowed(MetricFamily::WindowMinRainfall, days),
                    "min_rainfall",
                )
                .normalized_to(days)],
            )
        })
        .collect();

    ScoringConfig::new(COVER_CROP_FEASIBILITY, parameters, curves)
}

pub fn by_name(name: &str) -> Result<ScoringConfig, ConfigError> {
    match name {
        CORN_VIABILITY => corn_viability(),
        COVER_CROP_FEASIBILITY => cover_crop_feasibility(),
        other => Err(ConfigError::UnknownPreset(other.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn presets_validate() {
        let corn = corn_viability().unwrap();
        let names: Vec<&str> = corn.curves().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["growth_60d", "growth_30d"]);

        let cover = cover_crop_feasibility().unwrap();
        let names: Vec<&str> = cover.curves().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["window_21d", "window_42d"]);
    }

    #[test]
    fn cover_crop_thresholds_scale_with_window() {
        let cover = cover_crop_feasibility().unwrap();
        let t: Vec<f64> = cover
            .curves()
            .iter()
            .map(|c| cover.effective_threshold(&c.criteria[0]).unwrap())
            .collect();
        assert_relative_eq!(t[0], 17.5);
        assert_relative_eq!(t[1], 35.0);
    }

    #[test]
    fn corn_growth_thresholds_are_not_scaled() {
        let corn = corn_viability().unwrap();
        let growth_30 = &corn.curves()[1].criteria[1];
        assert_relative_eq!(corn.effective_threshold(growth_30).unwrap(), 20.0);
    }

    #[test]
    fn lookup_by_name() {
        assert!(by_name(CORN_VIABILITY).is_ok());
        assert!(by_name(COVER_CROP_FEASIBILITY).is_ok());
        assert_eq!(by_name("wheat").unwrap_err(), ConfigError::UnknownPreset("wheat".into()));
    }
}
