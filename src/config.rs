use crate::theme::Theme;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Processing order for point labels. Placement is greedy, so the order
/// decides who wins a contested spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelOrder {
    /// Ascending Euclidean distance from the view center; ties keep input order.
    #[default]
    CenterDistance,
    Input,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementConfig {
    pub cell_size: f32,
    pub label_pad_x: f32,
    pub label_height: f32,
    pub min_view_size: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub max_attempts: usize,
    pub max_radius: f32,
    pub base_angle_deg: f32,
    pub angle_step_deg: f32,
    pub min_radius: f32,
    pub min_radial_step: f32,
    /// Text pinned at the view center before any other label.
    pub center_label: Option<String>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            cell_size: 32.0,
            label_pad_x: 8.0,
            label_height: 16.0,
            min_view_size: 300.0,
            min_scale: 0.5,
            max_scale: 1.0,
            max_attempts: 200,
            max_radius: 1000.0,
            base_angle_deg: 45.0,
            angle_step_deg: 30.0,
            min_radius: 5.0,
            min_radial_step: 2.0,
            center_label: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub enabled: bool,
    pub sample_step: f32,
    pub label_padding: f32,
    pub gap: f32,
    pub grid_cell: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_step: 6.0,
            label_padding: 2.0,
            gap: 0.0,
            grid_cell: 120.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifyConfig {
    pub enabled: bool,
    pub tolerance_ratio: f32,
    pub min_tolerance: f32,
    pub max_tolerance: f32,
    pub smooth_iterations: usize,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tolerance_ratio: 0.8,
            min_tolerance: 0.5,
            max_tolerance: 6.0,
            smooth_iterations: 1,
        }
    }
}

impl SimplifyConfig {
    pub fn tolerance_for(&self, sample_step: f32) -> f32 {
        (sample_step * self.tolerance_ratio)
            .max(self.min_tolerance)
            .min(self.max_tolerance)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub placement: PlacementConfig,
    pub routing: RoutingConfig,
    pub simplify: SimplifyConfig,
    pub label_order: LabelOrder,
    pub polygon_labels: bool,
    pub line_labels: bool,
    /// Skip system font lookup and use the built-in width table.
    pub fast_text_metrics: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            placement: PlacementConfig::default(),
            routing: RoutingConfig::default(),
            simplify: SimplifyConfig::default(),
            label_order: LabelOrder::default(),
            polygon_labels: true,
            line_labels: true,
            fast_text_metrics: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    background: Option<String>,
    polygon_fill: Option<String>,
    polygon_stroke: Option<String>,
    line_color: Option<String>,
    line_width: Option<f32>,
    multi_line_width: Option<f32>,
    point_label_color: Option<String>,
    feature_label_color: Option<String>,
    center_label_color: Option<String>,
    point_font_size: Option<f32>,
    multi_point_font_size: Option<f32>,
    polygon_label_font_size: Option<f32>,
    line_label_font_size: Option<f32>,
    center_font_size: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlacementConfigFile {
    cell_size: Option<f32>,
    label_pad_x: Option<f32>,
    label_height: Option<f32>,
    min_view_size: Option<f32>,
    max_attempts: Option<usize>,
    max_radius: Option<f32>,
    angle_step_deg: Option<f32>,
    center_label: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoutingConfigFile {
    enabled: Option<bool>,
    sample_step: Option<f32>,
    label_padding: Option<f32>,
    gap: Option<f32>,
    grid_cell: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimplifyConfigFile {
    enabled: Option<bool>,
    tolerance_ratio: Option<f32>,
    min_tolerance: Option<f32>,
    max_tolerance: Option<f32>,
    smooth_iterations: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    placement: Option<PlacementConfigFile>,
    routing: Option<RoutingConfigFile>,
    simplify: Option<SimplifyConfigFile>,
    label_order: Option<LabelOrder>,
    polygon_labels: Option<bool>,
    line_labels: Option<bool>,
    fast_text_metrics: Option<bool>,
    width: Option<f32>,
    height: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("invalid config {}", path.display()))
}

/// Strict JSON first, then JSON5 for hand-edited files with comments.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents).map_err(|_| json_err)?,
    };
    Ok(apply_config_file(Config::default(), parsed))
}

fn apply_config_file(mut config: Config, parsed: ConfigFile) -> Config {
    match parsed.theme.as_deref() {
        Some("modern") => config.theme = Theme::modern(),
        Some("classic") | Some("default") => config.theme = Theme::classic(),
        Some(other) => tracing::warn!(theme = other, "unknown theme, keeping default"),
        None => {}
    }

    if let Some(vars) = parsed.theme_variables {
        let theme = &mut config.theme;
        if let Some(v) = vars.font_family {
            theme.font_family = v;
        }
        if let Some(v) = vars.background {
            theme.background = v;
        }
        if let Some(v) = vars.polygon_fill {
            theme.polygon_fill = v;
        }
        if let Some(v) = vars.polygon_stroke {
            theme.polygon_stroke = v;
        }
        if let Some(v) = vars.line_color {
            theme.line_color = v;
        }
        if let Some(v) = vars.line_width {
            theme.line_width = v;
        }
        if let Some(v) = vars.multi_line_width {
            theme.multi_line_width = v;
        }
        if let Some(v) = vars.point_label_color {
            theme.point_label_color = v;
        }
        if let Some(v) = vars.feature_label_color {
            theme.feature_label_color = v;
        }
        if let Some(v) = vars.center_label_color {
            theme.center_label_color = v;
        }
        if let Some(v) = vars.point_font_size {
            theme.point_font_size = v;
        }
        if let Some(v) = vars.multi_point_font_size {
            theme.multi_point_font_size = v;
        }
        if let Some(v) = vars.polygon_label_font_size {
            theme.polygon_label_font_size = v;
        }
        if let Some(v) = vars.line_label_font_size {
            theme.line_label_font_size = v;
        }
        if let Some(v) = vars.center_font_size {
            theme.center_font_size = v;
        }
    }
    config.render.background = config.theme.background.clone();

    if let Some(p) = parsed.placement {
        let placement = &mut config.layout.placement;
        if let Some(v) = p.cell_size {
            placement.cell_size = v;
        }
        if let Some(v) = p.label_pad_x {
            placement.label_pad_x = v;
        }
        if let Some(v) = p.label_height {
            placement.label_height = v;
        }
        if let Some(v) = p.min_view_size {
            placement.min_view_size = v;
        }
        if let Some(v) = p.max_attempts {
            placement.max_attempts = v;
        }
        if let Some(v) = p.max_radius {
            placement.max_radius = v;
        }
        if let Some(v) = p.angle_step_deg {
            placement.angle_step_deg = v;
        }
        if p.center_label.is_some() {
            placement.center_label = p.center_label;
        }
    }

    if let Some(r) = parsed.routing {
        let routing = &mut config.layout.routing;
        if let Some(v) = r.enabled {
            routing.enabled = v;
        }
        if let Some(v) = r.sample_step {
            routing.sample_step = v;
        }
        if let Some(v) = r.label_padding {
            routing.label_padding = v;
        }
        if let Some(v) = r.gap {
            routing.gap = v;
        }
        if let Some(v) = r.grid_cell {
            routing.grid_cell = v;
        }
    }

    if let Some(s) = parsed.simplify {
        let simplify = &mut config.layout.simplify;
        if let Some(v) = s.enabled {
            simplify.enabled = v;
        }
        if let Some(v) = s.tolerance_ratio {
            simplify.tolerance_ratio = v;
        }
        if let Some(v) = s.min_tolerance {
            simplify.min_tolerance = v;
        }
        if let Some(v) = s.max_tolerance {
            simplify.max_tolerance = v;
        }
        if let Some(v) = s.smooth_iterations {
            simplify.smooth_iterations = v;
        }
    }

    if let Some(v) = parsed.label_order {
        config.layout.label_order = v;
    }
    if let Some(v) = parsed.polygon_labels {
        config.layout.polygon_labels = v;
    }
    if let Some(v) = parsed.line_labels {
        config.layout.line_labels = v;
    }
    if let Some(v) = parsed.fast_text_metrics {
        config.layout.fast_text_metrics = v;
    }
    if let Some(v) = parsed.width {
        config.render.width = v;
    }
    if let Some(v) = parsed.height {
        config.render.height = v;
    }

    config
}
