#![cfg(target_arch = "wasm32")]

use agroclima_wasm::{compute_series_js, preset, ViabilitySession};
use js_sys::{Array, Reflect, JSON};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

const COVER: &str = r#"{
    "window_sizes": [21, 42],
    "years": [2030],
    "members": ["r1", "r2"],
    "yearly_data": { "2030": { "member_minima_by_window": {
        "21": { "r1": 18.0, "r2": 10.0 },
        "42": { "r1": 40.0, "r2": 30.0 }
    } } }
}"#;

const CORN: &str = r#"{
    "years": [2030],
    "members": ["r1", "r2"],
    "yearly_data": { "2030": {
        "sowing_totals":      { "r1": 120.0, "r2": 80.0 },
        "growth_minima_60d":  { "r1": 120.0, "r2": 120.0 },
        "growth_minima_30d":  { "r1": 30.0,  "r2": 30.0 },
        "harvest_minima_15d": { "r1": 5.0,   "r2": 5.0 }
    } }
}"#;

#[wasm_bindgen_test]
fn presets_are_exposed() {
    assert!(preset("corn_viability").is_ok());
    assert!(preset("wheat").is_err());
}

#[wasm_bindgen_test]
fn session_round_trip() {
    let mut session = ViabilitySession::new(CORN, "corn_viability").unwrap();
    assert!(session.series().is_ok());
    session.set_parameter("sowing", 50.0).unwrap();
    assert!(session.series().is_ok());
    assert!(session.set_parameter("nope", 1.0).is_err());
}

#[wasm_bindgen_test]
fn malformed_config_is_rejected() {
    assert!(compute_series_js(CORN, "{}").is_err());
}

#[wasm_bindgen_test]
fn preset_parameters_are_plain_object_fields() {
    let config = preset("cover_crop_feasibility").unwrap();
    let params = Reflect::get(&config, &JsValue::from_str("parameters")).unwrap();
    let min = Reflect::get(&params, &JsValue::from_str("min_rainfall")).unwrap();
    let value = Reflect::get(&min, &JsValue::from_str("value")).unwrap();
    assert_eq!(value.as_f64(), Some(25.0));
}

#[wasm_bindgen_test]
fn stringified_preset_feeds_compute_series() {
    let config = preset("cover_crop_feasibility").unwrap();
    let json: String = JSON::stringify(&config).unwrap().into();
    let series = Array::from(&compute_series_js(COVER, &json).unwrap());
    assert_eq!(series.length(), 1);

    let curves = Reflect::get(&series.get(0), &JsValue::from_str("curves")).unwrap();
    let curves = Array::from(&curves);
    let w21 = Reflect::get(&curves.get(0), &JsValue::from_str("percentage")).unwrap();
    assert_eq!(w21.as_f64(), Some(50.0));
}

#[wasm_bindgen_test]
fn undefined_percentage_stays_undefined() {
    let config = preset("cover_crop_feasibility").unwrap();
    let config: String = JSON::stringify(&config).unwrap().into();
    let empty_year = COVER.replace(r#""42": { "r1": 40.0, "r2": 30.0 }"#, r#""42": {}"#);
    let series = Array::from(&compute_series_js(&empty_year, &config).unwrap());
    let curves = Reflect::get(&series.get(0), &JsValue::from_str("curves")).unwrap();
    let curves = Array::from(&curves);
    let w42 = Reflect::get(&curves.get(1), &JsValue::from_str("percentage")).unwrap();
    assert!(w42.is_undefined());
}
