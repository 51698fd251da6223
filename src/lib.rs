#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;

pub use config::{Config, LayoutConfig};
pub use ir::{Feature, GeoBBox, Geometry, LngLat};
pub use layout::{DrawInstruction, Layout, compute_layout};
pub use theme::Theme;

use anyhow::Result;

/// Everything one redraw needs besides the GeoJSON itself.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    /// Viewport; the extent of the input when `None`.
    pub bbox: Option<GeoBBox>,
    pub width: f32,
    pub height: f32,
}

impl RenderOptions {
    pub fn classic() -> Self {
        let config = Config::default();
        Self {
            theme: config.theme,
            layout: config.layout,
            bbox: None,
            width: config.render.width,
            height: config.render.height,
        }
    }

    pub fn modern() -> Self {
        Self {
            theme: Theme::modern(),
            ..Self::classic()
        }
    }

    pub fn with_bbox(mut self, bbox: GeoBBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn with_view(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::classic()
    }
}

/// Parses `input` and runs one layout pass with `options`.
pub fn layout_geojson(input: &str, options: &RenderOptions) -> Result<Layout> {
    let parsed = parser::parse_geojson(input)?;
    let bbox = options
        .bbox
        .or_else(|| layout::projection::global_bbox(&parsed.features));
    let measurer = layout::text::measurer_for(&options.theme, &options.layout);
    Ok(compute_layout(
        &parsed.features,
        bbox,
        (options.width, options.height),
        &options.theme,
        &options.layout,
        measurer.as_ref(),
    ))
}

pub fn render_with_options(input: &str, options: RenderOptions) -> Result<String> {
    let layout = layout_geojson(input, &options)?;
    Ok(render::render_svg(&layout, &options.theme))
}

/// The ordered draw list and placement diagnostics as JSON.
pub fn draw_list_json(input: &str, options: &RenderOptions) -> Result<String> {
    layout_dump::layout_json(&layout_geojson(input, options)?)
}
