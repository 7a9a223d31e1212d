//! Plotly.js bindings.

use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::types::{AppError, AppResult};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = Plotly, js_name = react)]
    fn plotly_react(element_id: &str, data: &JsValue, layout: &JsValue, config: &JsValue) -> js_sys::Promise;

    #[wasm_bindgen(js_namespace = Plotly, js_name = purge)]
    fn plotly_purge(element_id: &str);
}

/// Draw (or redraw in place) a `{data, layout}` figure into the element.
pub async fn draw_figure(element_id: &str, figure: &Value) -> AppResult<()> {
    let data = to_js(&figure["data"])?;
    let layout = to_js(&figure["layout"])?;
    let config = to_js(&serde_json::json!({ "responsive": true }))?;

    JsFuture::from(plotly_react(element_id, &data, &layout, &config))
        .await
        .map_err(|e| AppError::Render(format!("{:?}", e)))?;

    Ok(())
}

/// Remove the plot from the element.
pub fn clear_figure(element_id: &str) {
    plotly_purge(element_id);
}

// objects must arrive as plain JS objects, not Maps
fn to_js(value: &Value) -> AppResult<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| AppError::Render(e.to_string()))
}
