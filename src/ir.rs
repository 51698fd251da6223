use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Feature properties as they arrive from GeoJSON.
pub type Properties = Map<String, Value>;

/// Property keys consulted for a label, in priority order.
pub const LABEL_KEYS: [&str; 2] = ["name", "NAME"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// Geographic viewport. Zero width or height is allowed and handled by the projector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoBBox {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl GeoBBox {
    pub fn new(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Self {
        Self {
            min_lng,
            min_lat,
            max_lng,
            max_lat,
        }
    }

    /// Smallest box covering every coordinate, or `None` for an empty iterator.
    pub fn from_coords<'a>(coords: impl IntoIterator<Item = &'a LngLat>) -> Option<Self> {
        let mut iter = coords.into_iter();
        let first = iter.next()?;
        let mut bbox = Self::new(first.lng, first.lat, first.lng, first.lat);
        for coord in iter {
            bbox.extend(*coord);
        }
        Some(bbox)
    }

    pub fn extend(&mut self, coord: LngLat) {
        self.min_lng = self.min_lng.min(coord.lng);
        self.min_lat = self.min_lat.min(coord.lat);
        self.max_lng = self.max_lng.max(coord.lng);
        self.max_lat = self.max_lat.max(coord.lat);
    }

    /// Inclusive on every side.
    pub fn contains(&self, coord: LngLat) -> bool {
        coord.lng >= self.min_lng
            && coord.lng <= self.max_lng
            && coord.lat >= self.min_lat
            && coord.lat <= self.max_lat
    }

    pub fn lng_span(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

impl FromStr for GeoBBox {
    type Err = String;

    /// Parses `minLng,minLat,maxLng,maxLat`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|err| format!("invalid bbox `{s}`: {err}"))?;
        let [min_lng, min_lat, max_lng, max_lat] = parts[..] else {
            return Err(format!(
                "invalid bbox `{s}`: expected minLng,minLat,maxLng,maxLat"
            ));
        };
        if min_lng > max_lng || min_lat > max_lat {
            return Err(format!("invalid bbox `{s}`: min exceeds max"));
        }
        Ok(Self::new(min_lng, min_lat, max_lng, max_lat))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(LngLat),
    MultiPoint(Vec<LngLat>),
    LineString(Vec<LngLat>),
    MultiLineString(Vec<Vec<LngLat>>),
    /// Rings; the first is the exterior.
    Polygon(Vec<Vec<LngLat>>),
    MultiPolygon(Vec<Vec<Vec<LngLat>>>),
}

impl Geometry {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Rings that act as polygon obstacles and fills: the exterior ring of a
    /// `Polygon`, and every ring of every member of a `MultiPolygon`.
    pub fn polygon_rings(&self) -> Vec<&[LngLat]> {
        match self {
            Geometry::Polygon(rings) => rings.first().map(|r| r.as_slice()).into_iter().collect(),
            Geometry::MultiPolygon(polygons) => polygons
                .iter()
                .flat_map(|rings| rings.iter().map(|r| r.as_slice()))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn line_parts(&self) -> Vec<&[LngLat]> {
        match self {
            Geometry::LineString(line) => vec![line.as_slice()],
            Geometry::MultiLineString(lines) => lines.iter().map(|l| l.as_slice()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(
            self,
            Geometry::MultiPoint(_) | Geometry::MultiLineString(_) | Geometry::MultiPolygon(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: Properties,
    /// Position in the source document, when parsed from one.
    pub source_index: Option<usize>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            properties: Properties::new(),
            source_index: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.properties
            .insert("name".to_string(), Value::String(name.into()));
        self
    }

    pub fn label(&self) -> Option<String> {
        resolve_label(&self.properties)
    }

    pub fn label_at(&self, index: usize) -> Option<String> {
        resolve_label_at(&self.properties, index)
    }
}

/// First non-empty scalar under [`LABEL_KEYS`].
pub fn resolve_label(properties: &Properties) -> Option<String> {
    LABEL_KEYS
        .iter()
        .find_map(|key| properties.get(*key).and_then(scalar_label))
}

/// Label for the `index`-th member of a multi-geometry. An array under a
/// label key is read positionally; otherwise the scalar label is shared.
pub fn resolve_label_at(properties: &Properties, index: usize) -> Option<String> {
    for key in LABEL_KEYS {
        if let Some(Value::Array(items)) = properties.get(key) {
            return items.get(index).and_then(scalar_label);
        }
    }
    resolve_label(properties)
}

fn scalar_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
