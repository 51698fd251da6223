use crate::config::RoutingConfig;

use super::geometry::{inflate_rect, path_length, point_in_rect, rect_corners, segments_cross};
use super::grid::ObstacleGrid;
use super::{Point, Rect};

// ── Sampling ─────────────────────────────────────────────────────────
/// Consecutive samples closer than this on both axes are merged.
const SAMPLE_DEDUP_EPS: f32 = 1e-6;

// ── Boundary projection ─────────────────────────────────────────────
/// Tolerance for "clamped point sits on this edge".
const EDGE_EPS: f32 = 1e-8;
/// Tolerance for edge detection when measuring perimeter position.
const PERIMETER_EDGE_EPS: f32 = 1e-6;
/// Corners this close to a walk's start or end are not inserted.
const CORNER_ORDER_EPS: f32 = 1e-7;

// ── Path assembly ───────────────────────────────────────────────────
/// Join points closer than this are emitted once.
const JOIN_EPS: f32 = 1e-6;
/// Segments meeting within this distance are treated as connected, not crossing.
const SHARED_ENDPOINT_EPS: f32 = 1e-8;

/// Label rectangles a line must walk around, indexed by point lookup.
#[derive(Debug, Clone)]
pub struct RouteObstacles {
    rects: Vec<Rect>,
    grid: ObstacleGrid,
}

impl RouteObstacles {
    pub fn new(rects: Vec<Rect>, cell: f32) -> Self {
        let grid = ObstacleGrid::from_rects(cell, &rects);
        Self { rects, grid }
    }

    /// Inflates each placed label box by the routing padding.
    pub fn from_label_boxes(boxes: &[Rect], config: &RoutingConfig) -> Self {
        let rects = boxes
            .iter()
            .map(|b| inflate_rect(b, config.label_padding))
            .collect();
        Self::new(rects, config.grid_cell)
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// First rectangle, in neighborhood scan order, containing `pt`.
    pub fn containing(&self, pt: Point) -> Option<usize> {
        self.grid
            .candidates_near_point(pt)
            .into_iter()
            .find(|idx| self.rects.get(*idx).is_some_and(|r| point_in_rect(pt, r)))
    }
}

fn near(a: Point, b: Point, eps: f32) -> bool {
    (a.0 - b.0).abs() < eps && (a.1 - b.1).abs() < eps
}

/// Resamples a polyline at roughly `step` pixel spacing. Every original
/// vertex is kept and the exact last vertex always ends the result.
pub fn sample_line(points: &[Point], step: f32) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::new();
    let Some(&last) = points.last() else {
        return out;
    };
    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let dist = dx.hypot(dy);
        let steps = if step > 0.0 {
            ((dist / step).ceil() as usize).max(1)
        } else {
            1
        };
        for s in 0..=steps {
            let p = if s == steps {
                b
            } else {
                let t = s as f32 / steps as f32;
                (a.0 + dx * t, a.1 + dy * t)
            };
            if out.last().is_some_and(|prev| near(*prev, p, SAMPLE_DEDUP_EPS)) {
                continue;
            }
            out.push(p);
        }
    }
    match out.last_mut() {
        Some(prev) if near(*prev, last, SAMPLE_DEDUP_EPS) => *prev = last,
        _ => out.push(last),
    }
    out
}

/// Moves `pt` onto the rectangle boundary, then `gap` further outward.
/// A point already on a single edge keeps that edge; corners and interior
/// points go to the nearest edge, ties resolved left, right, top, bottom.
pub fn project_to_rect_boundary(pt: Point, rect: &Rect, gap: f32) -> Point {
    let (x, y, w, h) = *rect;
    let cx = pt.0.clamp(x, x + w);
    let cy = pt.1.clamp(y, y + h);
    let on_left = (cx - x).abs() < EDGE_EPS;
    let on_right = (cx - (x + w)).abs() < EDGE_EPS;
    let on_top = (cy - y).abs() < EDGE_EPS;
    let on_bottom = (cy - (y + h)).abs() < EDGE_EPS;

    if on_top && !on_left && !on_right {
        return (cx, y - gap);
    }
    if on_bottom && !on_left && !on_right {
        return (cx, y + h + gap);
    }
    if on_left && !on_top && !on_bottom {
        return (x - gap, cy);
    }
    if on_right && !on_top && !on_bottom {
        return (x + w + gap, cy);
    }

    let dl = (pt.0 - x).abs();
    let dr = (pt.0 - (x + w)).abs();
    let dt = (pt.1 - y).abs();
    let db = (pt.1 - (y + h)).abs();
    let nearest = dl.min(dr).min(dt).min(db);
    let clamp_y = pt.1.clamp(y - gap, y + h + gap);
    let clamp_x = pt.0.clamp(x - gap, x + w + gap);
    if nearest == dl {
        (x - gap, clamp_y)
    } else if nearest == dr {
        (x + w + gap, clamp_y)
    } else if nearest == dt {
        (clamp_x, y - gap)
    } else {
        (clamp_x, y + h + gap)
    }
}

/// Clockwise arc length from the top-left corner to `pt`, after clamping
/// `pt` onto the rectangle.
pub fn perimeter_position(pt: Point, rect: &Rect) -> f32 {
    let (x, y, w, h) = *rect;
    let px = pt.0.clamp(x, x + w);
    let py = pt.1.clamp(y, y + h);
    if (py - y).abs() < PERIMETER_EDGE_EPS {
        px - x
    } else if (px - (x + w)).abs() < PERIMETER_EDGE_EPS {
        w + (py - y)
    } else if (py - (y + h)).abs() < PERIMETER_EDGE_EPS {
        w + h + (x + w - px)
    } else {
        2.0 * w + h + (y + h - py)
    }
}

/// The clockwise and counter-clockwise walks from `a` to `b` along the
/// rectangle, each starting at `a` and ending at `b`.
pub fn boundary_paths_between(rect: &Rect, a: Point, b: Point) -> (Vec<Point>, Vec<Point>) {
    let pos_a = perimeter_position(a, rect);
    let pos_b = perimeter_position(b, rect);
    if (pos_a - pos_b).abs() <= CORNER_ORDER_EPS {
        return (vec![a, b], vec![a, b]);
    }
    let perimeter = 2.0 * (rect.2 + rect.3);
    let corners = rect_corners(rect);
    let corner_pos = corners.map(|c| perimeter_position(c, rect));

    let cw = walk_clockwise(a, pos_a, b, pos_b, &corners, &corner_pos, perimeter);
    let mut ccw = walk_clockwise(b, pos_b, a, pos_a, &corners, &corner_pos, perimeter);
    ccw.reverse();
    (cw, ccw)
}

fn walk_clockwise(
    start: Point,
    start_pos: f32,
    end: Point,
    end_pos: f32,
    corners: &[Point; 4],
    corner_pos: &[f32; 4],
    perimeter: f32,
) -> Vec<Point> {
    let end_adj = if end_pos <= start_pos + CORNER_ORDER_EPS {
        end_pos + perimeter
    } else {
        end_pos
    };
    let mut between: Vec<(f32, Point)> = corners
        .iter()
        .zip(corner_pos)
        .filter_map(|(corner, pos)| {
            let adj = if *pos <= start_pos + CORNER_ORDER_EPS {
                pos + perimeter
            } else {
                *pos
            };
            (adj > start_pos + CORNER_ORDER_EPS && adj < end_adj - CORNER_ORDER_EPS)
                .then_some((adj, *corner))
        })
        .collect();
    between.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut path = Vec::with_capacity(between.len() + 2);
    path.push(start);
    path.extend(between.into_iter().map(|(_, corner)| corner));
    path.push(end);
    path
}

/// Whether any segment of `path` crosses any segment of `existing`.
/// Segments that meet at a shared point are allowed.
fn path_crosses(path: &[Point], existing: &[Point]) -> bool {
    if path.len() < 2 || existing.len() < 2 {
        return false;
    }
    path.windows(2).any(|p| {
        existing.windows(2).any(|q| {
            let touching = near(p[0], q[0], SHARED_ENDPOINT_EPS)
                || near(p[0], q[1], SHARED_ENDPOINT_EPS)
                || near(p[1], q[0], SHARED_ENDPOINT_EPS)
                || near(p[1], q[1], SHARED_ENDPOINT_EPS);
            !touching && segments_cross(p[0], p[1], q[0], q[1])
        })
    })
}

/// Picks the boundary walk for one obstacle run. Both clear: the shorter,
/// clockwise on ties. One clear: that one. Neither: the straight chord,
/// which may still cross earlier output.
fn choose_detour(rect: &Rect, a: Point, b: Point, routed: &[Point]) -> Vec<Point> {
    let (cw, ccw) = boundary_paths_between(rect, a, b);
    let cw_clear = !path_crosses(&cw, routed);
    let ccw_clear = !path_crosses(&ccw, routed);
    match (cw_clear, ccw_clear) {
        (true, true) => {
            if path_length(&cw) <= path_length(&ccw) {
                cw
            } else {
                ccw
            }
        }
        (true, false) => cw,
        (false, true) => ccw,
        (false, false) => vec![a, b],
    }
}

fn append_path(out: &mut Vec<Point>, path: &[Point]) {
    for p in path {
        if out.last().is_some_and(|last| near(*last, *p, JOIN_EPS)) {
            continue;
        }
        out.push(*p);
    }
}

/// Replaces every run of samples inside one obstacle with a walk along that
/// obstacle's boundary. The first and last points always equal the first
/// and last samples.
pub fn route_around_obstacles(sampled: &[Point], obstacles: &RouteObstacles, gap: f32) -> Vec<Point> {
    if sampled.len() < 2 || obstacles.is_empty() {
        return sampled.to_vec();
    }
    let hits: Vec<Option<usize>> = sampled.iter().map(|p| obstacles.containing(*p)).collect();

    let mut out: Vec<Point> = Vec::with_capacity(sampled.len());
    let mut detours = 0usize;
    let mut i = 0;
    while i < sampled.len() {
        let Some(rect_idx) = hits[i] else {
            out.push(sampled[i]);
            i += 1;
            continue;
        };
        let mut end = i;
        while end + 1 < sampled.len() && hits[end + 1] == Some(rect_idx) {
            end += 1;
        }
        let rect = obstacles.rects[rect_idx];
        let a = project_to_rect_boundary(sampled[i], &rect, gap);
        let b = project_to_rect_boundary(sampled[end], &rect, gap);
        let detour = choose_detour(&rect, a, b, &out);
        append_path(&mut out, &detour);
        detours += 1;
        i = end + 1;
    }

    // A run whose ends project to one boundary point collapses to a single
    // point; keep both endpoints.
    if out.len() < 2 {
        out.push(sampled[sampled.len() - 1]);
    }
    if let Some(first) = out.first_mut() {
        *first = sampled[0];
    }
    if let Some(last) = out.last_mut() {
        *last = sampled[sampled.len() - 1];
    }
    if detours > 0 {
        tracing::trace!(detours, points = out.len(), "routed line around labels");
    }
    out
}

/// Samples `points` and, when routing is enabled, detours around `obstacles`.
pub fn route_line(points: &[Point], obstacles: &RouteObstacles, config: &RoutingConfig) -> Vec<Point> {
    let sampled = sample_line(points, config.sample_step);
    if !config.enabled {
        return sampled;
    }
    route_around_obstacles(&sampled, obstacles, config.gap)
}
