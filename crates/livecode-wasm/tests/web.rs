//! Browser tests for the `JsValue` entry points. Run with
//! `wasm-pack test --headless --firefox crates/livecode-wasm`.

#![cfg(target_arch = "wasm32")]

use livecode_wasm::{execute_with_scope, version};
use serde::Serialize;
use serde_json::{json, Value};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_scope_object_is_accepted() {
    let scope = json!({ "who": "web" })
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap();
    let out = execute_with_scope("<p>{who}</p>", scope).unwrap();
    let out: Value = serde_wasm_bindgen::from_value(out).unwrap();
    assert_eq!(out["result"]["markup"], json!("<p>web</p>"));
}

#[wasm_bindgen_test]
fn test_null_scope() {
    let out = execute_with_scope("'plain text'", wasm_bindgen::JsValue::NULL).unwrap();
    let out: Value = serde_wasm_bindgen::from_value(out).unwrap();
    assert_eq!(out["result"], Value::Null);
    assert!(!version().is_empty());
}
