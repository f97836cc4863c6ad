use std::fmt::Display;
use std::sync::Arc;

use agroclima_core::payload::store_from_json;
use agroclima_core::{
    compute_series, presets, MetricStore, ScoringConfig, SeriesMemo, ViabilitySeries,
};
use anyhow::{Context, Result};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn js_err(e: impl Display) -> JsValue {
    JsValue::from_str(&format!("{e:#}"))
}

/// Maps become plain objects so the UI can read `config.parameters.sowing`
/// and `JSON.stringify` a config back into [`compute_series_js`].
/// `None` stays `undefined`.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer).map_err(js_err)
}

fn load_store(payload_json: &str) -> Result<MetricStore> {
    store_from_json(payload_json).context("invalid metrics payload")
}

fn load_config(config_json: &str) -> Result<ScoringConfig> {
    serde_json::from_str(config_json).context("invalid scoring config")
}

fn series_for(payload_json: &str, config_json: &str) -> Result<ViabilitySeries> {
    let store = load_store(payload_json)?;
    let config = load_config(config_json)?;
    Ok(compute_series(&store, &config))
}

/// One-shot computation from a chart payload and a scoring config, both JSON.
/// Undefined percentages come back as `undefined`.
#[wasm_bindgen(js_name = computeSeries)]
pub fn compute_series_js(payload_json: &str, config_json: &str) -> Result<JsValue, JsValue> {
    let series = series_for(payload_json, config_json).map_err(js_err)?;
    to_js(&series)
}

/// Built-in config by name, so the UI can bind its controls to the parameters.
#[wasm_bindgen]
pub fn preset(name: &str) -> Result<JsValue, JsValue> {
    let config = presets::by_name(name).map_err(js_err)?;
    to_js(&config)
}

/// Interactive chart state: one fetched dataset, a config edited in place by
/// the sliders, and a memo so unchanged inputs are not recomputed.
#[wasm_bindgen]
pub struct ViabilitySession {
    store: Arc<MetricStore>,
    config: ScoringConfig,
    memo: SeriesMemo,
}

impl ViabilitySession {
    fn open(payload_json: &str, preset_name: &str) -> Result<Self> {
        let store = Arc::new(load_store(payload_json)?);
        let config = presets::by_name(preset_name).context("cannot open session")?;
        Ok(Self { store, config, memo: SeriesMemo::new() })
    }

    fn set(&mut self, name: &str, value: f64) -> Result<()> {
        self.config = self.config.with_parameter(name, value)?;
        Ok(())
    }
}

#[wasm_bindgen]
impl ViabilitySession {
    #[wasm_bindgen(constructor)]
    pub fn new(payload_json: &str, preset_name: &str) -> Result<ViabilitySession, JsValue> {
        Self::open(payload_json, preset_name).map_err(js_err)
    }

    #[wasm_bindgen(js_name = setParameter)]
    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), JsValue> {
        self.set(name, value).map_err(js_err)
    }

    pub fn config(&self) -> Result<JsValue, JsValue> {
        to_js(&self.config)
    }

    pub fn series(&mut self) -> Result<JsValue, JsValue> {
        let series = self.memo.compute(&self.store, &self.config);
        to_js(series)
    }
}
