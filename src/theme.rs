use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub background: String,
    pub polygon_fill: String,
    pub polygon_stroke: String,
    pub polygon_stroke_width: f32,
    pub line_color: String,
    pub line_width: f32,
    pub multi_line_width: f32,
    pub point_label_color: String,
    pub feature_label_color: String,
    pub center_label_color: String,
    pub point_font_size: f32,
    pub multi_point_font_size: f32,
    pub polygon_label_font_size: f32,
    pub line_label_font_size: f32,
    pub center_font_size: f32,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "\"Microsoft YaHei\", \"PingFang SC\", Arial, sans-serif".to_string(),
            background: "#FFFFFF".to_string(),
            polygon_fill: "#3388ff33".to_string(),
            polygon_stroke: "#3388ff".to_string(),
            polygon_stroke_width: 1.0,
            line_color: "#0000FF".to_string(),
            line_width: 2.0,
            multi_line_width: 1.0,
            point_label_color: "#ff3333".to_string(),
            feature_label_color: "#000000".to_string(),
            center_label_color: "#000000".to_string(),
            point_font_size: 16.0,
            multi_point_font_size: 12.0,
            polygon_label_font_size: 14.0,
            line_label_font_size: 13.0,
            center_font_size: 18.0,
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            background: "#F8FAFC".to_string(),
            polygon_fill: "#60A5FA2E".to_string(),
            polygon_stroke: "#3B82F6".to_string(),
            polygon_stroke_width: 1.0,
            line_color: "#2563EB".to_string(),
            line_width: 2.0,
            multi_line_width: 1.2,
            point_label_color: "#DC2626".to_string(),
            feature_label_color: "#1C2430".to_string(),
            center_label_color: "#111827".to_string(),
            point_font_size: 15.0,
            multi_point_font_size: 12.0,
            polygon_label_font_size: 13.0,
            line_label_font_size: 12.0,
            center_font_size: 17.0,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
