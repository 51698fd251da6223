// Greedy point-label placement: try the anchor, then walk an outward
// spiral of candidate centers until one clears every obstacle.

use std::cmp::Ordering;

use crate::config::{LabelOrder, PlacementConfig};

use super::geometry::{distance, rect_center};
use super::text::TextMeasure;
use super::{Label, PlacedLabel, PlacementContext, PlacementState, Point, Rect};

/// Viewport-derived label scale, `min(w, h) / min_view_size` clamped to the
/// configured range so labels shrink on small views.
pub fn placement_scale(view_width: f32, view_height: f32, config: &PlacementConfig) -> f32 {
    (view_width.min(view_height) / config.min_view_size)
        .max(config.min_scale)
        .min(config.max_scale)
}

pub fn centered_box(center: Point, width: f32, height: f32) -> Rect {
    (center.0 - width / 2.0, center.1 - height / 2.0, width, height)
}

/// Stable ascending order by distance from `center`.
pub fn center_distance_order(center: Point) -> impl FnMut(&Label, &Label) -> Ordering {
    move |a, b| distance(a.anchor, center).total_cmp(&distance(b.anchor, center))
}

pub fn input_order(a: &Label, b: &Label) -> Ordering {
    a.order.cmp(&b.order)
}

/// Places `labels` in the configured order. Every placed box, fallback
/// included, is committed to `ctx` before the next label is considered.
pub fn place_labels(
    labels: Vec<Label>,
    ctx: &mut PlacementContext,
    measurer: &dyn TextMeasure,
    config: &PlacementConfig,
    order: LabelOrder,
    view: (f32, f32),
) -> Vec<PlacedLabel> {
    match order {
        LabelOrder::CenterDistance => {
            let center = rect_center(&(0.0, 0.0, view.0, view.1));
            place_labels_by(labels, ctx, measurer, config, view, center_distance_order(center))
        }
        LabelOrder::Input => place_labels_by(labels, ctx, measurer, config, view, input_order),
    }
}

/// Like [`place_labels`] with a caller-supplied priority comparator.
pub fn place_labels_by<F>(
    mut labels: Vec<Label>,
    ctx: &mut PlacementContext,
    measurer: &dyn TextMeasure,
    config: &PlacementConfig,
    view: (f32, f32),
    cmp: F,
) -> Vec<PlacedLabel>
where
    F: FnMut(&Label, &Label) -> Ordering,
{
    labels.sort_by(cmp);
    let scale = placement_scale(view.0, view.1, config);
    let placed: Vec<PlacedLabel> = labels
        .into_iter()
        .map(|label| place_label(label, ctx, measurer, config, scale))
        .collect();
    tracing::debug!(
        labels = placed.len(),
        spiral = placed
            .iter()
            .filter(|p| matches!(p.state, PlacementState::Spiral { .. }))
            .count(),
        fallback = placed
            .iter()
            .filter(|p| p.state == PlacementState::Fallback)
            .count(),
        scale,
        "placed point labels"
    );
    placed
}

pub fn place_label(
    label: Label,
    ctx: &mut PlacementContext,
    measurer: &dyn TextMeasure,
    config: &PlacementConfig,
    scale: f32,
) -> PlacedLabel {
    let draw_font_size = label.font_size * scale;
    let width = measurer.text_width(&label.text, draw_font_size, true) + config.label_pad_x;
    let height = config.label_height * scale;

    let (position, state) = if ctx.is_free(&centered_box(label.anchor, width, height)) {
        (label.anchor, PlacementState::Anchor)
    } else if let Some((center, probes)) = spiral_search(label.anchor, width, height, scale, config, ctx) {
        (center, PlacementState::Spiral { probes })
    } else {
        tracing::debug!(text = %label.text, "no free spot, label kept at anchor");
        (label.anchor, PlacementState::Fallback)
    };

    let bbox = centered_box(position, width, height);
    ctx.commit(bbox);
    PlacedLabel {
        label,
        position,
        bbox,
        draw_font_size,
        state,
    }
}

/// Pins `text` at the view center and seeds its box before any other label.
/// Sized at `font_size` without viewport scaling.
pub fn seed_center_label(
    text: &str,
    font_size: f32,
    ctx: &mut PlacementContext,
    measurer: &dyn TextMeasure,
    config: &PlacementConfig,
    view: (f32, f32),
) -> PlacedLabel {
    let center = rect_center(&(0.0, 0.0, view.0, view.1));
    let width = measurer.text_width(text, font_size, true) + config.label_pad_x;
    let bbox = centered_box(center, width, config.label_height);
    ctx.commit(bbox);
    PlacedLabel {
        label: Label {
            anchor: center,
            text: text.to_string(),
            font_size,
            order: 0,
        },
        position: center,
        bbox,
        draw_font_size: font_size,
        state: PlacementState::Center,
    }
}

fn spiral_angles(config: &PlacementConfig) -> Vec<f32> {
    let step = config.angle_step_deg;
    let count = if step > 0.0 {
        ((360.0 / step).ceil() as usize).max(1)
    } else {
        1
    };
    (0..count)
        .map(|k| (config.base_angle_deg + k as f32 * step.max(0.0)).to_radians())
        .collect()
}

/// Returns the first free center and the number of probes it took. The
/// attempt cap is counted per probe, so at most `max_attempts` boxes are
/// tested regardless of how many angles a ring has.
fn spiral_search(
    anchor: Point,
    width: f32,
    height: f32,
    scale: f32,
    config: &PlacementConfig,
    ctx: &PlacementContext,
) -> Option<(Point, usize)> {
    let angles = spiral_angles(config);
    let radial_step = (width / 4.0).floor().max(config.min_radial_step);
    let max_radius = config.max_radius * scale;
    let mut radius = (width * 0.5 * scale).max(config.min_radius);
    let mut probes = 0usize;

    while radius <= max_radius {
        for theta in &angles {
            if probes >= config.max_attempts {
                return None;
            }
            probes += 1;
            let center = (anchor.0 + radius * theta.cos(), anchor.1 + radius * theta.sin());
            if ctx.is_free(&centered_box(center, width, height)) {
                return Some((center, probes));
            }
        }
        radius += radial_step;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::geometry::rects_overlap;
    use crate::layout::obstacles::GeometryObstacles;
    use crate::layout::text::FastMeasure;

    fn label(order: usize, anchor: Point, text: &str) -> Label {
        Label {
            anchor,
            text: text.to_string(),
            font_size: 16.0,
            order,
        }
    }

    fn empty_ctx() -> PlacementContext {
        PlacementContext::new(32.0, GeometryObstacles::default())
    }

    fn assert_pairwise_disjoint(placed: &[PlacedLabel]) {
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                assert!(
                    !rects_overlap(&a.bbox, &b.bbox),
                    "{:?} overlaps {:?}",
                    a.label.text,
                    b.label.text
                );
            }
        }
    }

    #[test]
    fn scale_is_clamped() {
        let config = PlacementConfig::default();
        assert_eq!(placement_scale(100.0, 900.0, &config), 0.5);
        assert_eq!(placement_scale(1200.0, 800.0, &config), 1.0);
        assert!((placement_scale(240.0, 800.0, &config) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn lone_label_stays_at_anchor() {
        let mut ctx = empty_ctx();
        let config = PlacementConfig::default();
        let placed = place_label(label(0, (300.0, 200.0), "Harbor"), &mut ctx, &FastMeasure, &config, 1.0);
        assert_eq!(placed.state, PlacementState::Anchor);
        assert_eq!(placed.position, (300.0, 200.0));
        assert_eq!(placed.offset(), (0.0, 0.0));
        assert_eq!(ctx.label_boxes(), &[placed.bbox]);
    }

    #[test]
    fn label_box_is_padded_and_centered() {
        let mut ctx = empty_ctx();
        let config = PlacementConfig::default();
        let placed = place_label(label(0, (100.0, 100.0), "ab"), &mut ctx, &FastMeasure, &config, 0.5);
        let expected_w = FastMeasure.text_width("ab", 8.0, true) + 8.0;
        assert!((placed.bbox.2 - expected_w).abs() < 1e-4);
        assert_eq!(placed.bbox.3, 8.0);
        assert_eq!(placed.bbox.1, 96.0);
        assert_eq!(placed.draw_font_size, 8.0);
    }

    #[test]
    fn separated_anchors_all_place_at_anchor() {
        let mut ctx = empty_ctx();
        let config = PlacementConfig::default();
        let labels = vec![
            label(0, (100.0, 100.0), "North"),
            label(1, (500.0, 100.0), "East"),
            label(2, (100.0, 500.0), "West"),
            label(3, (500.0, 500.0), "South"),
        ];
        let placed = place_labels(labels, &mut ctx, &FastMeasure, &config, LabelOrder::CenterDistance, (600.0, 600.0));
        assert!(placed.iter().all(|p| p.state == PlacementState::Anchor));
        assert_pairwise_disjoint(&placed);
    }

    #[test]
    fn crowded_anchors_spiral_apart() {
        let mut ctx = empty_ctx();
        let config = PlacementConfig::default();
        let labels: Vec<Label> = (0..6).map(|i| label(i, (300.0, 300.0), &format!("Stop {i}"))).collect();
        let placed = place_labels(labels, &mut ctx, &FastMeasure, &config, LabelOrder::Input, (600.0, 600.0));
        assert_eq!(placed[0].state, PlacementState::Anchor);
        for p in &placed[1..] {
            assert!(matches!(p.state, PlacementState::Spiral { .. }), "{:?}", p.state);
        }
        assert_pairwise_disjoint(&placed);
    }

    #[test]
    fn first_spiral_probe_uses_base_angle() {
        let mut ctx = empty_ctx();
        let config = PlacementConfig::default();
        let first = place_label(label(0, (300.0, 300.0), "Same"), &mut ctx, &FastMeasure, &config, 1.0);
        let second = place_label(label(1, (300.0, 300.0), "Same"), &mut ctx, &FastMeasure, &config, 1.0);
        let PlacementState::Spiral { probes } = second.state else {
            panic!("expected spiral, got {:?}", second.state);
        };
        assert!(probes >= 1 && probes <= config.max_attempts);
        // Every probe moves along a 45° + k·30° ray.
        let (dx, dy) = second.offset();
        let angle = dy.atan2(dx).to_degrees().rem_euclid(360.0);
        let k = (angle - 45.0).rem_euclid(360.0) / 30.0;
        assert!((k - k.round()).abs() < 1e-3, "angle {angle}");
        assert!(!rects_overlap(&first.bbox, &second.bbox));
    }

    #[test]
    fn blocked_everywhere_falls_back_to_anchor() {
        let huge = vec![(-5000.0, -5000.0), (5000.0, -5000.0), (5000.0, 5000.0), (-5000.0, 5000.0)];
        let mut ctx = PlacementContext::new(32.0, GeometryObstacles::collect(&[], &[huge]));
        let config = PlacementConfig::default();
        let placed = place_label(label(0, (50.0, 50.0), "Lost"), &mut ctx, &FastMeasure, &config, 1.0);
        assert_eq!(placed.state, PlacementState::Fallback);
        assert_eq!(placed.position, (50.0, 50.0));
        assert_eq!(ctx.label_boxes().len(), 1, "fallback boxes are still committed");
    }

    #[test]
    fn zero_attempts_skips_the_spiral() {
        let mut ctx = empty_ctx();
        let config = PlacementConfig {
            max_attempts: 0,
            ..PlacementConfig::default()
        };
        place_label(label(0, (50.0, 50.0), "A"), &mut ctx, &FastMeasure, &config, 1.0);
        let second = place_label(label(1, (50.0, 50.0), "A"), &mut ctx, &FastMeasure, &config, 1.0);
        assert_eq!(second.state, PlacementState::Fallback);
    }

    #[test]
    fn labels_avoid_line_strokes() {
        let line = vec![(0.0, 100.0), (400.0, 100.0)];
        let mut ctx = PlacementContext::new(32.0, GeometryObstacles::collect(&[line.clone()], &[]));
        let config = PlacementConfig::default();
        let placed = place_label(label(0, (200.0, 100.0), "Bridge"), &mut ctx, &FastMeasure, &config, 1.0);
        assert!(matches!(placed.state, PlacementState::Spiral { .. }));
        let (x, y, w, h) = placed.bbox;
        assert!(y + h <= 100.0 || y >= 100.0 || x + w <= 0.0 || x >= 400.0);
    }

    #[test]
    fn center_label_is_seeded_first_and_never_moves() {
        let mut ctx = empty_ctx();
        let config = PlacementConfig::default();
        let center = seed_center_label("Center", 18.0, &mut ctx, &FastMeasure, &config, (600.0, 400.0));
        assert_eq!(center.position, (300.0, 200.0));
        assert_eq!(center.state, PlacementState::Center);
        assert_eq!(center.bbox.3, 16.0);

        let placed = place_label(label(0, (300.0, 200.0), "Crowd"), &mut ctx, &FastMeasure, &config, 1.0);
        assert_ne!(placed.state, PlacementState::Anchor);
        assert!(!rects_overlap(&center.bbox, &placed.bbox));
        assert_eq!(ctx.label_boxes()[0], center.bbox);
    }

    #[test]
    fn center_distance_order_is_stable() {
        let mut labels = vec![
            label(0, (0.0, 0.0), "far"),
            label(1, (60.0, 50.0), "tie-a"),
            label(2, (40.0, 50.0), "tie-b"),
            label(3, (50.0, 50.0), "center"),
        ];
        labels.sort_by(center_distance_order((50.0, 50.0)));
        let names: Vec<&str> = labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(names, vec!["center", "tie-a", "tie-b", "far"]);
    }

    #[test]
    fn custom_comparator_controls_priority() {
        let config = PlacementConfig::default();
        let labels = vec![label(0, (300.0, 300.0), "low"), label(1, (300.0, 300.0), "high")];
        let mut ctx = empty_ctx();
        let placed = place_labels_by(labels, &mut ctx, &FastMeasure, &config, (600.0, 600.0), |a, b| {
            b.order.cmp(&a.order)
        });
        assert_eq!(placed[0].label.text, "high");
        assert_eq!(placed[0].state, PlacementState::Anchor);
    }

    #[test]
    fn placement_is_deterministic() {
        let config = PlacementConfig::default();
        let labels: Vec<Label> = (0..12)
            .map(|i| label(i, (200.0 + (i % 3) as f32 * 10.0, 200.0), &format!("L{i}")))
            .collect();
        let run = |labels: Vec<Label>| {
            let mut ctx = empty_ctx();
            place_labels(labels, &mut ctx, &FastMeasure, &config, LabelOrder::CenterDistance, (400.0, 400.0))
        };
        assert_eq!(run(labels.clone()), run(labels));
    }
}
