//! Chart payloads from the data-fetch API, turned into a [`MetricStore`].
//!
//! Two shapes are accepted:
//! - corn viability: fixed per-member fields per year;
//! - cover-crop feasibility: per-window member minima per year.
//!
//! `null` values become absent metrics. Years listed in `years` without an
//! entry in `yearly_data` get every member with no values.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use tracing::debug;

use crate::error::PayloadError;
use crate::metrics::{MetricFamily, MetricKey, MetricStore, YearMetrics};

type MemberValues = HashMap<String, Option<f64>>;

// ── Corn viability ────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CornYear {
    #[serde(default)]
    pub sowing_totals: MemberValues,
    #[serde(default)]
    pub growth_minima_60d: MemberValues,
    #[serde(default)]
    pub growth_minima_30d: MemberValues,
    #[serde(default)]
    pub harvest_minima_15d: MemberValues,
}

impl CornYear {
    fn fields(self) -> [(MetricKey, MemberValues); 4] {
        [
            (MetricKey::plain(MetricFamily::SowingRainfall), self.sowing_totals),
            (MetricKey::windowed(MetricFamily::GrowthMinRainfall, 60), self.growth_minima_60d),
            (MetricKey::windowed(MetricFamily::GrowthMinRainfall, 30), self.growth_minima_30d),
            (MetricKey::plain(MetricFamily::HarvestMinRainfall), self.harvest_minima_15d),
        ]
    }
}

#[derive(Debug, Deserialize)]
pub struct CornViabilityPayload {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub years: Vec<i32>,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub yearly_data: BTreeMap<i32, CornYear>,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Cover-crop feasibility ────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CoverCropYear {
    #[serde(default)]
    pub member_minima_by_window: BTreeMap<u32, MemberValues>,
}

#[derive(Debug, Deserialize)]
pub struct CoverCropPayload {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub window_sizes: Vec<u32>,
    #[serde(default)]
    pub years: Vec<i32>,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub yearly_data: BTreeMap<i32, CoverCropYear>,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// Either payload shape, told apart by the presence of `window_sizes`.
#[derive(Debug)]
pub enum Payload {
    CoverCrop(CoverCropPayload),
    Corn(CornViabilityPayload),
}

impl Payload {
    pub fn from_json(json: &str) -> Result<Self, PayloadError> {
        // Parsed twice: integer map keys only survive a direct parse.
        let shape: serde_json::Value = serde_json::from_str(json)?;
        if shape.get("window_sizes").is_some() {
            Ok(Payload::CoverCrop(serde_json::from_str(json)?))
        } else {
            Ok(Payload::Corn(serde_json::from_str(json)?))
        }
    }

    pub fn into_store(self) -> Result<MetricStore, PayloadError> {
        match self {
            Payload::Corn(p) => p.into_store(),
            Payload::CoverCrop(p) => p.into_store(),
        }
    }
}

/// Parse either payload shape straight into a store.
pub fn store_from_json(json: &str) -> Result<MetricStore, PayloadError> {
    Payload::from_json(json)?.into_store()
}

fn base_year(year: i32, members: &[String]) -> YearMetrics {
    let mut slice = YearMetrics::new(year);
    for m in members {
        slice.add_member(m.as_str());
    }
    slice
}

fn insert_all(slice: &mut YearMetrics, key: MetricKey, values: MemberValues) {
    for (member, value) in values {
        slice.insert(member, key, value);
    }
}

impl CornViabilityPayload {
    pub fn into_store(mut self) -> Result<MetricStore, PayloadError> {
        if let Some(e) = self.error {
            return Err(PayloadError::Upstream(e));
        }
        let slices = self
            .years
            .iter()
            .map(|&year| {
                let mut slice = base_year(year, &self.members);
                if let Some(data) = self.yearly_data.remove(&year) {
                    for (key, values) in data.fields() {
                        insert_all(&mut slice, key, values);
                    }
                }
                slice
            })
            .collect();
        let store = MetricStore::new(slices)?;
        debug!(
            city = self.city.as_deref().unwrap_or("-"),
            years = store.years().len(),
            "loaded corn payload"
        );
        Ok(store)
    }
}

impl CoverCropPayload {
    pub fn into_store(mut self) -> Result<MetricStore, PayloadError> {
        if let Some(e) = self.error {
            return Err(PayloadError::Upstream(e));
        }
        let slices = self
            .years
            .iter()
            .map(|&year| {
                let mut slice = base_year(year, &self.members);
                if let Some(data) = self.yearly_data.remove(&year) {
                    for (days, values) in data.member_minima_by_window {
                        let key = MetricKey::windowed(MetricFamily::WindowMinRainfall, days);
                        insert_all(&mut slice, key, values);
                    }
                }
                slice
            })
            .collect();
        let store = MetricStore::new(slices)?;
        debug!(
            city = self.city.as_deref().unwrap_or("-"),
            years = store.years().len(),
            windows = ?self.window_sizes,
            "loaded cover-crop payload"
        );
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MalformedDatasetError;

    const CORN: &str = r#"{
        "city": "Toulouse",
        "criterion": "sowing + growth + harvest",
        "years": [2030, 2031],
        "members": ["r1", "r2", "r3"],
        "total_members": 3,
        "yearly_data": {
            "2030": {
                "sowing_totals":      { "r1": 120.0, "r2": 80.0, "r3": null },
                "growth_minima_60d":  { "r1": 150.0, "r2": 150.0 },
                "growth_minima_30d":  { "r1": 30.0,  "r2": 10.0 },
                "harvest_minima_15d": { "r1": 5.0,   "r2": 5.0 }
            }
        }
    }"#;

    const COVER: &str = r#"{
        "city": "Dijon",
        "window_sizes": [21, 42],
        "years": [2030],
        "members": ["r1", "r2"],
        "yearly_data": {
            "2030": { "member_minima_by_window": {
                "21": { "r1": 18.0, "r2": null },
                "42": { "r1": 40.0, "r2": 30.0 }
            } }
        }
    }"#;

    #[test]
    fn corn_payload_maps_fields_to_keys() {
        let store = store_from_json(CORN).unwrap();
        assert_eq!(store.years(), &[2030, 2031]);
        assert_eq!(store.members().len(), 3);
        let g30 = MetricKey::windowed(MetricFamily::GrowthMinRainfall, 30);
        assert_eq!(store.get(2030, "r1", &g30), Some(30.0));
        let sowing = MetricKey::plain(MetricFamily::SowingRainfall);
        assert_eq!(store.get(2030, "r3", &sowing), None);
        // 2031 is listed but has no data.
        assert_eq!(store.get(2031, "r1", &sowing), None);
    }

    #[test]
    fn cover_payload_maps_windows() {
        let payload = Payload::from_json(COVER).unwrap();
        assert!(matches!(payload, Payload::CoverCrop(_)));
        let store = payload.into_store().unwrap();
        let w21 = MetricKey::windowed(MetricFamily::WindowMinRainfall, 21);
        let w42 = MetricKey::windowed(MetricFamily::WindowMinRainfall, 42);
        assert_eq!(store.get(2030, "r1", &w21), Some(18.0));
        assert_eq!(store.get(2030, "r2", &w21), None);
        assert_eq!(store.get(2030, "r2", &w42), Some(30.0));
    }

    #[test]
    fn unordered_years_are_malformed() {
        let json = CORN.replace("[2030, 2031]", "[2031, 2030]");
        match store_from_json(&json) {
            Err(PayloadError::Dataset(MalformedDatasetError::OutOfOrderYear {
                year,
                previous,
            })) => {
                assert_eq!((year, previous), (2030, 2031));
            }
            other => panic!("expected out-of-order error, got {other:?}"),
        }
    }

    #[test]
    fn upstream_error_is_surfaced() {
        let json = r#"{ "years": [], "error": "no data for city" }"#;
        assert!(matches!(
            store_from_json(json),
            Err(PayloadError::Upstream(m)) if m == "no data for city"
        ));
    }

    #[test]
    fn garbage_is_a_json_error() {
        assert!(matches!(store_from_json("{ nope"), Err(PayloadError::Json(_))));
    }
}
