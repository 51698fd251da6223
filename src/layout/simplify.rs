use crate::config::SimplifyConfig;

use super::Point;

/// Distance from `p` to the infinite line through `a` and `b`, or to `a`
/// when the chord has zero length.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len = dx.hypot(dy);
    if len == 0.0 {
        return (p.0 - a.0).hypot(p.1 - a.1);
    }
    (dy * p.0 - dx * p.1 + b.0 * a.1 - b.1 * a.0).abs() / len
}

/// Douglas-Peucker. The result is an order-preserving subset of `points`
/// that keeps both endpoints, and every dropped vertex lies within
/// `tolerance` of the kept chord spanning it.
pub fn simplify_douglas_peucker(points: &[Point], tolerance: f32) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let tolerance = tolerance.max(0.0);
    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0usize, last)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let (mut split, mut max_dist) = (start, 0.0f32);
        for i in start + 1..end {
            let d = perpendicular_distance(points[i], points[start], points[end]);
            if d > max_dist {
                max_dist = d;
                split = i;
            }
        }
        if max_dist > tolerance {
            keep[split] = true;
            stack.push((start, split));
            stack.push((split, end));
        }
    }

    points
        .iter()
        .zip(&keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Chaikin corner cutting. Endpoints are preserved; each pass replaces the
/// interior with quarter points of every edge.
pub fn chaikin_smooth(points: &[Point], iterations: usize) -> Vec<Point> {
    let mut current = points.to_vec();
    for _ in 0..iterations {
        if current.len() < 3 {
            break;
        }
        let mut next = Vec::with_capacity(current.len() * 2);
        next.push(current[0]);
        for w in current.windows(2) {
            let (p, q) = (w[0], w[1]);
            next.push((0.75 * p.0 + 0.25 * q.0, 0.75 * p.1 + 0.25 * q.1));
            next.push((0.25 * p.0 + 0.75 * q.0, 0.25 * p.1 + 0.75 * q.1));
        }
        next.push(current[current.len() - 1]);
        current = next;
    }
    current
}

/// Simplifies then smooths a routed line with the tolerance derived from
/// the sampling step.
pub fn simplify_route(points: &[Point], sample_step: f32, config: &SimplifyConfig) -> Vec<Point> {
    if !config.enabled {
        return points.to_vec();
    }
    let simplified = simplify_douglas_peucker(points, config.tolerance_for(sample_step));
    chaikin_smooth(&simplified, config.smooth_iterations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collinear_points_collapse_to_endpoints() {
        let line: Vec<Point> = (0..10).map(|i| (i as f32 * 5.0, 2.0)).collect();
        assert_eq!(simplify_douglas_peucker(&line, 0.5), vec![(0.0, 2.0), (45.0, 2.0)]);
    }

    #[test]
    fn short_inputs_are_copied() {
        assert!(simplify_douglas_peucker(&[], 1.0).is_empty());
        let two = [(0.0, 0.0), (3.0, 4.0)];
        assert_eq!(simplify_douglas_peucker(&two, 1.0), two.to_vec());
    }

    #[test]
    fn significant_corner_survives() {
        let line = vec![(0.0, 0.0), (5.0, 0.2), (10.0, 0.0), (10.0, 10.0)];
        let out = simplify_douglas_peucker(&line, 1.0);
        assert_eq!(out, vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
    }

    #[test]
    fn result_is_subset_within_tolerance() {
        let line: Vec<Point> = (0..40)
            .map(|i| {
                let x = i as f32 * 3.0;
                (x, (x * 0.2).sin() * 8.0)
            })
            .collect();
        let tolerance = 1.5;
        let out = simplify_douglas_peucker(&line, tolerance);
        assert_eq!(out.first(), line.first());
        assert_eq!(out.last(), line.last());

        let indices: Vec<usize> = out
            .iter()
            .map(|p| line.iter().position(|q| q == p).expect("kept point comes from input"))
            .collect();
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
        for w in indices.windows(2) {
            for i in w[0] + 1..w[1] {
                let d = perpendicular_distance(line[i], line[w[0]], line[w[1]]);
                assert!(d <= tolerance + 1e-4, "vertex {i} is {d} from its chord");
            }
        }
    }

    #[test]
    fn zero_length_chord_uses_point_distance() {
        assert_eq!(perpendicular_distance((3.0, 4.0), (0.0, 0.0), (0.0, 0.0)), 5.0);
        let loop_back = vec![(0.0, 0.0), (0.0, 9.0), (0.0, 0.0)];
        assert_eq!(simplify_douglas_peucker(&loop_back, 1.0).len(), 3);
    }

    #[test]
    fn chaikin_quarter_points() {
        let out = chaikin_smooth(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0)], 1);
        assert_eq!(
            out,
            vec![(0.0, 0.0), (1.0, 0.0), (3.0, 0.0), (4.0, 1.0), (4.0, 3.0), (4.0, 4.0)]
        );
    }

    #[test]
    fn chaikin_leaves_short_lines_alone() {
        let two = [(0.0, 0.0), (4.0, 0.0)];
        assert_eq!(chaikin_smooth(&two, 3), two.to_vec());
        let three = [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0)];
        assert_eq!(chaikin_smooth(&three, 0), three.to_vec());
    }

    #[test]
    fn simplify_route_respects_disabled_flag() {
        let line = vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)];
        let config = SimplifyConfig {
            enabled: false,
            ..SimplifyConfig::default()
        };
        assert_eq!(simplify_route(&line, 6.0, &config), line);
        assert_eq!(simplify_route(&line, 6.0, &SimplifyConfig::default()), vec![(0.0, 0.0), (2.0, 0.0)]);
    }
}
