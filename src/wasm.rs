//! WebAssembly bindings for pegcomb
//!
//! Exposes the bundled example grammars to JavaScript.
//! Only compiled when targeting wasm32.

#![cfg(target_arch = "wasm32")]

use crate::capture::{render_captures, CaptureList};
use crate::grammars::Example;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// Set panic hook for better error messages in browser
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

// Use smaller allocator for WASM
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Result of a run, as handed to JavaScript
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    success: bool,
    position: usize,
    captures: &'a CaptureList,
    dump: String,
}

fn example(name: &str) -> Result<Example, JsValue> {
    name.parse::<Example>()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Run one of the example grammars (`"url"` or `"config"`) against `input`
///
/// Returns `{ success, position, captures, dump }`.
#[wasm_bindgen]
pub fn run_example(name: &str, input: &str) -> Result<JsValue, JsValue> {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    let built = example(name)?
        .get()
        .map_err(|e| JsValue::from_str(&format!("Grammar error: {}", e)))?;
    let outcome = built
        .run(input)
        .map_err(|e| JsValue::from_str(&format!("Match aborted: {}", e)))?;

    let report = RunReport {
        success: outcome.success,
        position: outcome.position,
        captures: &outcome.captures,
        dump: render_captures(&outcome.captures, input),
    };
    serde_wasm_bindgen::to_value(&report).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Rule listing of one of the example grammars
#[wasm_bindgen]
pub fn render_example(name: &str) -> Result<String, JsValue> {
    let built = example(name)?
        .get()
        .map_err(|e| JsValue::from_str(&format!("Grammar error: {}", e)))?;
    Ok(built.render())
}

/// Names of the bundled grammars
#[wasm_bindgen]
pub fn example_names() -> Vec<String> {
    Example::ALL.iter().map(|e| e.name().to_string()).collect()
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
