// Collision predicates and polyline helpers shared by placement and routing.
// All inputs are projected view-space coordinates.

use super::{Point, Rect};

/// Added to the edge slope denominator in the ray cast so horizontal edges
/// never divide by zero.
const RAY_CAST_EPS: f32 = 1e-10;

pub fn distance(a: Point, b: Point) -> f32 {
    (b.0 - a.0).hypot(b.1 - a.1)
}

pub fn path_length(points: &[Point]) -> f32 {
    points.windows(2).map(|w| distance(w[0], w[1])).sum()
}

/// Inclusive on all edges.
pub fn point_in_rect(pt: Point, rect: &Rect) -> bool {
    pt.0 >= rect.0 && pt.0 <= rect.0 + rect.2 && pt.1 >= rect.1 && pt.1 <= rect.1 + rect.3
}

/// Half-open overlap: boxes that only share an edge do not overlap.
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    !(a.0 + a.2 <= b.0 || a.0 >= b.0 + b.2 || a.1 + a.3 <= b.1 || a.1 >= b.1 + b.3)
}

/// Closed-interval variant of [`rects_overlap`], used for prefilters where
/// a zero-thickness envelope must still count.
pub fn rects_touch(a: &Rect, b: &Rect) -> bool {
    !(a.0 + a.2 < b.0 || a.0 > b.0 + b.2 || a.1 + a.3 < b.1 || a.1 > b.1 + b.3)
}

pub fn inflate_rect(rect: &Rect, pad: f32) -> Rect {
    (rect.0 - pad, rect.1 - pad, rect.2 + pad * 2.0, rect.3 + pad * 2.0)
}

pub fn rect_center(rect: &Rect) -> Point {
    (rect.0 + rect.2 / 2.0, rect.1 + rect.3 / 2.0)
}

pub fn bounding_rect(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.0, first.1, first.0, first.1);
    for p in &points[1..] {
        min_x = min_x.min(p.0);
        min_y = min_y.min(p.1);
        max_x = max_x.max(p.0);
        max_y = max_y.max(p.1);
    }
    Some((min_x, min_y, max_x - min_x, max_y - min_y))
}

/// Even-odd ray cast. Points exactly on an edge may land on either side.
pub fn point_in_polygon(pt: Point, ring: &[Point]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let (px, py) = pt;
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi + RAY_CAST_EPS) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Approximate rectangle/polygon overlap: true when a rectangle corner lies
/// inside the ring or a ring vertex lies inside the rectangle. A polygon edge
/// crossing the rectangle without either condition is not detected.
pub fn rect_polygon_overlap(rect: &Rect, ring: &[Point]) -> bool {
    let Some((min_x, min_y, w, h)) = bounding_rect(ring) else {
        return false;
    };
    let (max_x, max_y) = (min_x + w, min_y + h);
    if rect.0 + rect.2 <= min_x || rect.0 >= max_x || rect.1 + rect.3 <= min_y || rect.1 >= max_y {
        return false;
    }
    let corners = rect_corners(rect);
    if corners.iter().any(|c| point_in_polygon(*c, ring)) {
        return true;
    }
    ring.iter().any(|p| point_in_rect(*p, rect))
}

/// Clockwise from the top-left corner.
pub fn rect_corners(rect: &Rect) -> [Point; 4] {
    let (x, y, w, h) = *rect;
    [(x, y), (x + w, y), (x + w, y + h), (x, y + h)]
}

fn ccw(a: Point, b: Point, c: Point) -> bool {
    (c.1 - a.1) * (b.0 - a.0) > (b.1 - a.1) * (c.0 - a.0)
}

/// Proper-crossing test by orientation alternation. Collinear touches are
/// not reported.
pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    ccw(a, c, d) != ccw(b, c, d) && ccw(a, b, c) != ccw(a, b, d)
}

/// True when segment `a`-`b` crosses one of the rectangle's four edges.
/// A segment lying wholly inside the rectangle crosses no edge.
pub fn rect_segment_intersect(rect: &Rect, a: Point, b: Point) -> bool {
    let corners = rect_corners(rect);
    (0..4).any(|i| segments_intersect(a, b, corners[i], corners[(i + 1) % 4]))
}

fn cross(p: Point, q: Point, r: Point) -> f32 {
    (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
}

/// Router crossing test. Segments that share an exact endpoint never cross;
/// otherwise touching and collinear overlap both count.
pub fn segments_cross(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    if a1 == b1 || a1 == b2 || a2 == b1 || a2 == b2 {
        return false;
    }
    if a1.0.max(a2.0) < b1.0.min(b2.0)
        || b1.0.max(b2.0) < a1.0.min(a2.0)
        || a1.1.max(a2.1) < b1.1.min(b2.1)
        || b1.1.max(b2.1) < a1.1.min(a2.1)
    {
        return false;
    }
    let c1 = cross(a1, a2, b1);
    let c2 = cross(a1, a2, b2);
    let c3 = cross(b1, b2, a1);
    let c4 = cross(b1, b2, a2);
    c1 * c2 <= 0.0 && c3 * c4 <= 0.0
}

/// Unsigned shoelace area of an implicitly closed ring.
pub fn ring_area(ring: &[Point]) -> f32 {
    if ring.len() < 3 {
        return 0.0;
    }
    let twice: f32 = ring
        .iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| a.0 * b.1 - b.0 * a.1)
        .sum();
    twice.abs() / 2.0
}

/// Area centroid of a closed ring; `None` for fewer than three vertices or
/// zero signed area.
pub fn polygon_centroid(ring: &[Point]) -> Option<Point> {
    let n = ring.len();
    if n < 3 {
        return None;
    }
    let mut area = 0.0f64;
    let mut cx = 0.0f64;
    let mut cy = 0.0f64;
    for i in 0..n {
        let (x0, y0) = (ring[i].0 as f64, ring[i].1 as f64);
        let (x1, y1) = (ring[(i + 1) % n].0 as f64, ring[(i + 1) % n].1 as f64);
        let f = x0 * y1 - x1 * y0;
        area += f;
        cx += (x0 + x1) * f;
        cy += (y0 + y1) * f;
    }
    area *= 0.5;
    if area == 0.0 {
        return None;
    }
    Some(((cx / (6.0 * area)) as f32, (cy / (6.0 * area)) as f32))
}

/// Point halfway along the polyline by arc length.
pub fn polyline_midpoint(points: &[Point]) -> Option<Point> {
    let first = *points.first()?;
    let half = path_length(points) / 2.0;
    if half <= 0.0 {
        return Some(first);
    }
    let mut walked = 0.0;
    for w in points.windows(2) {
        let seg = distance(w[0], w[1]);
        if walked + seg >= half && seg > 0.0 {
            let t = (half - walked) / seg;
            return Some((w[0].0 + (w[1].0 - w[0].0) * t, w[0].1 + (w[1].1 - w[0].1) * t));
        }
        walked += seg;
    }
    points.last().copied()
}
