use geo_label_renderer::{GeoBBox, RenderOptions, draw_list_json, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapDrawOptions {
    theme: Option<String>,
    /// `[minLng, minLat, maxLng, maxLat]`
    bbox: Option<[f64; 4]>,
    width: Option<f32>,
    height: Option<f32>,
    font_family: Option<String>,
    center_label: Option<String>,
    fast_text: Option<bool>,
    route_lines: Option<bool>,
}

fn build_render_options(options: MapDrawOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("modern") {
        RenderOptions::modern()
    } else {
        RenderOptions::classic()
    };

    if let Some([min_lng, min_lat, max_lng, max_lat]) = options.bbox {
        render_options = render_options.with_bbox(GeoBBox::new(min_lng, min_lat, max_lng, max_lat));
    }
    if let Some(width) = options.width {
        render_options.width = width;
    }
    if let Some(height) = options.height {
        render_options.height = height;
    }
    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    render_options.layout.placement.center_label = options.center_label;
    // No system fonts to query in the browser.
    render_options.layout.fast_text_metrics = options.fast_text.unwrap_or(true);
    if let Some(route) = options.route_lines {
        render_options.layout.routing.enabled = route;
    }

    render_options
}

fn parse_options(options_json: Option<String>) -> Result<MapDrawOptions, JsValue> {
    match options_json {
        Some(raw) => serde_json::from_str(&raw).map_err(|error| JsValue::from_str(&error.to_string())),
        None => Ok(MapDrawOptions::default()),
    }
}

/// Runs one redraw pass and returns the ordered draw list as JSON.
#[wasm_bindgen]
pub fn compute_draw_list(geojson: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = build_render_options(parse_options(options_json)?);
    draw_list_json(geojson, &options).map_err(|error| JsValue::from_str(&format!("{error:#}")))
}

#[wasm_bindgen]
pub fn render_map_svg(geojson: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = build_render_options(parse_options(options_json)?);
    render_with_options(geojson, options).map_err(|error| JsValue::from_str(&format!("{error:#}")))
}
