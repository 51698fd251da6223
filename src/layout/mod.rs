pub mod geometry;
pub mod grid;
pub mod label_placement;
pub mod obstacles;
pub mod projection;
pub mod routing;
pub mod simplify;
pub mod text;
pub(crate) mod types;
pub use types::*;

use crate::config::LayoutConfig;
use crate::ir::{Feature, GeoBBox, Geometry};
use crate::theme::Theme;

use geometry::{path_length, polygon_centroid, polyline_midpoint, ring_area};
use grid::ObstacleGrid;
use label_placement::{place_labels, placement_scale, seed_center_label};
use obstacles::GeometryObstacles;
use projection::Projector;
use routing::{RouteObstacles, route_line};
use simplify::simplify_route;
use text::TextMeasure;

/// Routed lines shorter than this are not drawn.
const MIN_DRAWN_LINE_LENGTH: f32 = 1.0;

/// Collision state for one layout pass: committed label boxes indexed by a
/// grid, plus the static line and polygon obstacles.
#[derive(Debug, Clone)]
pub struct PlacementContext {
    grid: ObstacleGrid,
    boxes: Vec<Rect>,
    geometry: GeometryObstacles,
}

impl PlacementContext {
    pub fn new(cell_size: f32, geometry: GeometryObstacles) -> Self {
        Self {
            grid: ObstacleGrid::new(cell_size),
            boxes: Vec::new(),
            geometry,
        }
    }

    /// No committed label overlaps `rect`, no line crosses it and no polygon
    /// covers it.
    pub fn is_free(&self, rect: &Rect) -> bool {
        !self.grid.query_overlap(rect, &self.boxes) && !self.geometry.blocks(rect)
    }

    pub fn commit(&mut self, rect: Rect) {
        self.grid.insert(self.boxes.len(), &rect);
        self.boxes.push(rect);
    }

    pub fn label_boxes(&self) -> &[Rect] {
        &self.boxes
    }

    pub fn obstacles(&self) -> Vec<Obstacle> {
        self.boxes
            .iter()
            .map(|b| Obstacle::new(ObstacleKind::Label, *b))
            .chain(self.geometry.envelopes().copied())
            .collect()
    }
}

struct ProjectedRing {
    feature: usize,
    points: Vec<Point>,
}

struct ProjectedLine {
    feature: usize,
    points: Vec<Point>,
    width: f32,
}

/// One redraw pass: project every feature into a `width` x `height` view of
/// `bbox`, place point labels, route lines around them and emit the paint list.
pub fn compute_layout(
    features: &[Feature],
    bbox: Option<GeoBBox>,
    view: (f32, f32),
    theme: &Theme,
    config: &LayoutConfig,
    measurer: &dyn TextMeasure,
) -> Layout {
    let projector = Projector::new(bbox, view.0, view.1);
    let mut skipped = Vec::new();

    let mut rings: Vec<ProjectedRing> = Vec::new();
    let mut lines: Vec<ProjectedLine> = Vec::new();
    for (idx, feature) in features.iter().enumerate() {
        for ring in feature.geometry.polygon_rings() {
            if ring.len() < 3 {
                skipped.push(skip(feature, idx, "polygon ring has fewer than 3 points"));
                continue;
            }
            rings.push(ProjectedRing {
                feature: idx,
                points: projector.path(ring),
            });
        }
        let width = if feature.geometry.is_multi() {
            theme.multi_line_width
        } else {
            theme.line_width
        };
        for part in feature.geometry.line_parts() {
            if part.len() < 2 {
                skipped.push(skip(feature, idx, "line has fewer than 2 points"));
                continue;
            }
            lines.push(ProjectedLine {
                feature: idx,
                points: projector.path(part),
                width,
            });
        }
    }

    let line_paths: Vec<Vec<Point>> = lines.iter().map(|l| l.points.clone()).collect();
    let ring_paths: Vec<Vec<Point>> = rings.iter().map(|r| r.points.clone()).collect();
    let mut ctx = PlacementContext::new(
        config.placement.cell_size,
        GeometryObstacles::collect(&line_paths, &ring_paths),
    );

    let center = config.placement.center_label.as_deref().map(|text| {
        seed_center_label(text, theme.center_font_size, &mut ctx, measurer, &config.placement, view)
    });
    let labels = point_labels(features, &projector, theme);
    let placed = place_labels(labels, &mut ctx, measurer, &config.placement, config.label_order, view);

    let mut draws = Vec::new();
    for ring in &rings {
        draws.push(DrawInstruction::Polygon {
            ring: ring.points.clone(),
            fill: theme.polygon_fill.clone(),
            stroke: theme.polygon_stroke.clone(),
            stroke_width: theme.polygon_stroke_width,
        });
    }
    if config.polygon_labels {
        polygon_label_draws(features, &rings, theme, &mut draws);
    }

    let route_obstacles = RouteObstacles::from_label_boxes(ctx.label_boxes(), &config.routing);
    for line in &lines {
        let routed = route_line(&line.points, &route_obstacles, &config.routing);
        if routed.len() < 2 {
            skipped.push(skip(
                &features[line.feature],
                line.feature,
                "routed line has fewer than 2 points",
            ));
            continue;
        }
        let smoothed = simplify_route(&routed, config.routing.sample_step, &config.simplify);
        if path_length(&smoothed) <= MIN_DRAWN_LINE_LENGTH {
            continue;
        }
        draws.push(DrawInstruction::Line {
            points: smoothed,
            stroke: theme.line_color.clone(),
            width: line.width,
        });
    }
    if config.line_labels {
        line_label_draws(features, &lines, theme, &mut draws);
    }

    for p in &placed {
        draws.push(DrawInstruction::Text {
            position: p.position,
            content: p.label.text.clone(),
            style: TextStyle {
                fill: theme.point_label_color.clone(),
                font_size: p.draw_font_size,
                bold: true,
            },
        });
    }
    if let Some(center) = &center {
        draws.push(DrawInstruction::Text {
            position: center.position,
            content: center.label.text.clone(),
            style: TextStyle {
                fill: theme.center_label_color.clone(),
                font_size: center.draw_font_size,
                bold: true,
            },
        });
    }

    let mut placed_labels = Vec::with_capacity(placed.len() + 1);
    placed_labels.extend(center);
    placed_labels.extend(placed);

    tracing::debug!(
        features = features.len(),
        polygons = rings.len(),
        lines = lines.len(),
        labels = placed_labels.len(),
        draws = draws.len(),
        skipped = skipped.len(),
        "layout pass complete"
    );

    Layout {
        width: view.0,
        height: view.1,
        scale: placement_scale(view.0, view.1, &config.placement),
        draws,
        placed_labels,
        obstacles: ctx.obstacles(),
        skipped,
    }
}

fn skip(feature: &Feature, position: usize, reason: &str) -> SkippedItem {
    SkippedItem {
        feature: feature.source_index.unwrap_or(position),
        reason: reason.to_string(),
    }
}

/// Point and multipoint labels whose coordinate lies inside the view.
fn point_labels(features: &[Feature], projector: &Projector, theme: &Theme) -> Vec<Label> {
    let mut labels = Vec::new();
    for feature in features {
        match &feature.geometry {
            Geometry::Point(coord) => {
                if !projector.in_view(*coord) {
                    continue;
                }
                if let Some(text) = feature.label() {
                    labels.push(Label {
                        anchor: projector.point(*coord),
                        text,
                        font_size: theme.point_font_size,
                        order: labels.len(),
                    });
                }
            }
            Geometry::MultiPoint(coords) => {
                for (i, coord) in coords.iter().enumerate() {
                    if !projector.in_view(*coord) {
                        continue;
                    }
                    if let Some(text) = feature.label_at(i) {
                        labels.push(Label {
                            anchor: projector.point(*coord),
                            text,
                            font_size: theme.multi_point_font_size,
                            order: labels.len(),
                        });
                    }
                }
            }
            _ => {}
        }
    }
    labels
}

/// One label per named polygon feature, at the centroid of its largest ring.
fn polygon_label_draws(features: &[Feature], rings: &[ProjectedRing], theme: &Theme, draws: &mut Vec<DrawInstruction>) {
    for (idx, feature) in features.iter().enumerate() {
        let Some(text) = feature.label() else {
            continue;
        };
        let largest = rings
            .iter()
            .filter(|r| r.feature == idx)
            .max_by(|a, b| ring_area(&a.points).total_cmp(&ring_area(&b.points)));
        let Some(position) = largest.and_then(|r| polygon_centroid(&r.points)) else {
            continue;
        };
        draws.push(feature_text(position, text, theme.polygon_label_font_size, theme));
    }
}

/// One label per named line feature, halfway along its longest part.
fn line_label_draws(features: &[Feature], lines: &[ProjectedLine], theme: &Theme, draws: &mut Vec<DrawInstruction>) {
    for (idx, feature) in features.iter().enumerate() {
        let Some(text) = feature.label() else {
            continue;
        };
        let longest = lines
            .iter()
            .filter(|l| l.feature == idx)
            .max_by(|a, b| path_length(&a.points).total_cmp(&path_length(&b.points)));
        let Some(position) = longest.and_then(|l| polyline_midpoint(&l.points)) else {
            continue;
        };
        draws.push(feature_text(position, text, theme.line_label_font_size, theme));
    }
}

fn feature_text(position: Point, content: String, font_size: f32, theme: &Theme) -> DrawInstruction {
    DrawInstruction::Text {
        position,
        content,
        style: TextStyle {
            fill: theme.feature_label_color.clone(),
            font_size,
            bold: true,
        },
    }
}
