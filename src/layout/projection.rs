use crate::ir::{Feature, GeoBBox, LngLat};

use super::Point;

/// Linear lng/lat to view-space mapping. Latitude grows upward, so `y`
/// decreases as latitude increases. A degenerate axis maps to 0 instead of
/// dividing by zero, and a missing bbox maps everything to the origin.
pub fn project(lng: f64, lat: f64, bbox: Option<&GeoBBox>, width: f32, height: f32) -> Point {
    let Some(bbox) = bbox else {
        return (0.0, 0.0);
    };
    let lng_span = bbox.lng_span();
    let lat_span = bbox.lat_span();
    let x = if lng_span == 0.0 {
        0.0
    } else {
        (lng - bbox.min_lng) / lng_span * width as f64
    };
    let y = if lat_span == 0.0 {
        0.0
    } else {
        (bbox.max_lat - lat) / lat_span * height as f64
    };
    (x as f32, y as f32)
}

#[derive(Debug, Clone, Copy)]
pub struct Projector {
    pub bbox: Option<GeoBBox>,
    pub width: f32,
    pub height: f32,
}

impl Projector {
    pub fn new(bbox: Option<GeoBBox>, width: f32, height: f32) -> Self {
        Self {
            bbox,
            width,
            height,
        }
    }

    pub fn point(&self, coord: LngLat) -> Point {
        project(coord.lng, coord.lat, self.bbox.as_ref(), self.width, self.height)
    }

    pub fn path(&self, coords: &[LngLat]) -> Vec<Point> {
        coords.iter().map(|c| self.point(*c)).collect()
    }

    /// Whether a coordinate falls inside the viewport. Nothing is in view
    /// without a bbox.
    pub fn in_view(&self, coord: LngLat) -> bool {
        self.bbox.is_some_and(|bbox| bbox.contains(coord))
    }
}

/// Extent of every polygon ring across `features`, falling back to all
/// coordinates when there are no polygons. Used as the initial view.
pub fn global_bbox(features: &[Feature]) -> Option<GeoBBox> {
    let ring_coords = features
        .iter()
        .flat_map(|f| f.geometry.polygon_rings())
        .flat_map(|ring| ring.iter());
    if let Some(bbox) = GeoBBox::from_coords(ring_coords) {
        return Some(bbox);
    }
    GeoBBox::from_coords(features.iter().flat_map(|f| all_coords(&f.geometry)))
}

fn all_coords(geometry: &crate::ir::Geometry) -> Vec<&LngLat> {
    use crate::ir::Geometry;
    match geometry {
        Geometry::Point(p) => vec![p],
        Geometry::MultiPoint(points) | Geometry::LineString(points) => points.iter().collect(),
        Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
            lines.iter().flatten().collect()
        }
        Geometry::MultiPolygon(polygons) => polygons.iter().flatten().flatten().collect(),
    }
}
