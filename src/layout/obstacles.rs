use super::geometry::{bounding_rect, rect_polygon_overlap, rect_segment_intersect, rects_touch};
use super::{Obstacle, ObstacleKind, Point, Rect};

/// A projected polyline or ring kept as a collision obstacle, with its
/// bounding envelope for cheap rejection.
#[derive(Debug, Clone)]
pub struct GeometryObstacle {
    pub envelope: Obstacle,
    pub points: Vec<Point>,
}

/// Line strokes and polygon fills that labels must not cover. Built once per
/// pass from projected geometry and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct GeometryObstacles {
    lines: Vec<GeometryObstacle>,
    polygons: Vec<GeometryObstacle>,
}

impl GeometryObstacles {
    /// `lines` are open polylines; `rings` are implicitly closed polygon
    /// rings. Ring edges, closing edge included, also count as strokes.
    pub fn collect(lines: &[Vec<Point>], rings: &[Vec<Point>]) -> Self {
        let mut out = Self::default();
        for line in lines {
            out.push_line(line.clone());
        }
        for ring in rings {
            let mut closed = ring.clone();
            if ring.len() > 2 {
                closed.push(ring[0]);
            }
            out.push_line(closed);
            if let Some(envelope) = bounding_rect(ring) {
                out.polygons.push(GeometryObstacle {
                    envelope: Obstacle::new(ObstacleKind::PolygonRing, envelope),
                    points: ring.clone(),
                });
            }
        }
        out
    }

    fn push_line(&mut self, points: Vec<Point>) {
        if points.len() < 2 {
            return;
        }
        if let Some(envelope) = bounding_rect(&points) {
            self.lines.push(GeometryObstacle {
                envelope: Obstacle::new(ObstacleKind::LineEnvelope, envelope),
                points,
            });
        }
    }

    pub fn segment_count(&self) -> usize {
        self.lines.iter().map(|l| l.points.len() - 1).sum()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    pub fn envelopes(&self) -> impl Iterator<Item = &Obstacle> + '_ {
        self.lines
            .iter()
            .chain(self.polygons.iter())
            .map(|item| &item.envelope)
    }

    pub fn crosses_line(&self, rect: &Rect) -> bool {
        self.lines.iter().any(|line| {
            rects_touch(&line.envelope.rect(), rect)
                && line
                    .points
                    .windows(2)
                    .any(|w| rect_segment_intersect(rect, w[0], w[1]))
        })
    }

    pub fn overlaps_polygon(&self, rect: &Rect) -> bool {
        self.polygons
            .iter()
            .any(|poly| rect_polygon_overlap(rect, &poly.points))
    }

    pub fn blocks(&self, rect: &Rect) -> bool {
        self.crosses_line(rect) || self.overlaps_polygon(rect)
    }
}
