use anyhow::{Context, Result};
use geojson::{GeoJson, Position, Value};
use thiserror::Error;

use crate::ir::{Feature, Geometry, LngLat, Properties};

/// Why a single feature was left out of the model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("feature has no geometry")]
    MissingGeometry,
    #[error("unsupported geometry type `{0}`")]
    UnsupportedGeometry(String),
    #[error("{0} has no coordinates")]
    EmptyCoordinates(&'static str),
    #[error("position needs two finite numbers")]
    InvalidPosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFeature {
    /// Position of the feature in the input document.
    pub index: usize,
    pub error: FeatureError,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedFeatures {
    pub features: Vec<Feature>,
    pub skipped: Vec<SkippedFeature>,
}

impl ParsedFeatures {
    /// Appends another document's features; source and skipped indices are
    /// offset so they stay unique across the merged input.
    pub fn merge(&mut self, other: ParsedFeatures, index_offset: usize) {
        self.features.extend(other.features.into_iter().map(|mut f| {
            f.source_index = f.source_index.map(|i| i + index_offset);
            f
        }));
        self.skipped.extend(other.skipped.into_iter().map(|mut s| {
            s.index += index_offset;
            s
        }));
    }
}

/// Parses a FeatureCollection, a single Feature or a bare Geometry. Only a
/// malformed document is an error; bad features are skipped and reported.
pub fn parse_geojson(input: &str) -> Result<ParsedFeatures> {
    let doc: GeoJson = input.parse().context("invalid GeoJSON document")?;
    let raw: Vec<(Option<geojson::Geometry>, Properties)> = match doc {
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .map(|f| (f.geometry, f.properties.unwrap_or_default()))
            .collect(),
        GeoJson::Feature(f) => vec![(f.geometry, f.properties.unwrap_or_default())],
        GeoJson::Geometry(g) => vec![(Some(g), Properties::new())],
    };

    let mut out = ParsedFeatures::default();
    for (index, (geometry, properties)) in raw.into_iter().enumerate() {
        match geometry.ok_or(FeatureError::MissingGeometry).and_then(|g| convert_geometry(&g.value)) {
            Ok(geometry) => out.features.push(Feature {
                geometry,
                properties,
                source_index: Some(index),
            }),
            Err(error) => {
                tracing::warn!(index, %error, "skipping feature");
                out.skipped.push(SkippedFeature { index, error });
            }
        }
    }
    Ok(out)
}

fn convert_geometry(value: &Value) -> Result<Geometry, FeatureError> {
    let geometry = match value {
        Value::Point(p) => Geometry::Point(lnglat(p)?),
        Value::MultiPoint(points) => Geometry::MultiPoint(non_empty(path(points)?, "MultiPoint")?),
        Value::LineString(line) => Geometry::LineString(non_empty(path(line)?, "LineString")?),
        Value::MultiLineString(lines) => {
            let lines = lines.iter().map(|l| path(l)).collect::<Result<Vec<_>, _>>()?;
            Geometry::MultiLineString(non_empty(lines, "MultiLineString")?)
        }
        Value::Polygon(rings) => Geometry::Polygon(non_empty(polygon(rings)?, "Polygon")?),
        Value::MultiPolygon(polygons) => {
            let polygons = polygons
                .iter()
                .map(|rings| polygon(rings))
                .collect::<Result<Vec<_>, _>>()?;
            Geometry::MultiPolygon(non_empty(polygons, "MultiPolygon")?)
        }
        Value::GeometryCollection(_) => {
            return Err(FeatureError::UnsupportedGeometry("GeometryCollection".to_string()));
        }
    };
    Ok(geometry)
}

fn lnglat(position: &Position) -> Result<LngLat, FeatureError> {
    match position.as_slice() {
        [lng, lat, ..] if lng.is_finite() && lat.is_finite() => Ok(LngLat::new(*lng, *lat)),
        _ => Err(FeatureError::InvalidPosition),
    }
}

fn path(positions: &[Position]) -> Result<Vec<LngLat>, FeatureError> {
    positions.iter().map(lnglat).collect()
}

fn polygon(rings: &[Vec<Position>]) -> Result<Vec<Vec<LngLat>>, FeatureError> {
    rings.iter().map(|r| path(r)).collect()
}

fn non_empty<T>(items: Vec<T>, kind: &'static str) -> Result<Vec<T>, FeatureError> {
    if items.is_empty() {
        Err(FeatureError::EmptyCoordinates(kind))
    } else {
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_feature_collection() {
        let input = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"name": "Pier"},
                 "geometry": {"type": "Point", "coordinates": [121.5, 31.2]}},
                {"type": "Feature", "properties": null,
                 "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}},
                {"type": "Feature", "properties": {"NAME": "Park"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]], [[0.2,0.2],[0.4,0.2],[0.4,0.4],[0.2,0.2]]]}}
            ]
        }"#;
        let parsed = parse_geojson(input).unwrap();
        assert!(parsed.skipped.is_empty());
        assert_eq!(parsed.features.len(), 3);
        assert_eq!(parsed.features[0].geometry, Geometry::Point(LngLat::new(121.5, 31.2)));
        assert_eq!(parsed.features[0].label().as_deref(), Some("Pier"));
        assert!(parsed.features[1].properties.is_empty());
        let Geometry::Polygon(rings) = &parsed.features[2].geometry else {
            panic!("expected polygon");
        };
        assert_eq!(rings.len(), 2);
        assert_eq!(parsed.features[2].geometry.polygon_rings().len(), 1);
    }

    #[test]
    fn bad_features_are_skipped_without_affecting_others() {
        let input = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": null},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "GeometryCollection", "geometries": []}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "LineString", "coordinates": []}},
                {"type": "Feature", "properties": {"name": "ok"},
                 "geometry": {"type": "Point", "coordinates": [1, 2]}}
            ]
        }"#;
        let parsed = parse_geojson(input).unwrap();
        assert_eq!(parsed.features.len(), 1);
        assert_eq!(parsed.features[0].label().as_deref(), Some("ok"));
        let errors: Vec<(usize, FeatureError)> =
            parsed.skipped.into_iter().map(|s| (s.index, s.error)).collect();
        assert_eq!(
            errors,
            vec![
                (0, FeatureError::MissingGeometry),
                (1, FeatureError::UnsupportedGeometry("GeometryCollection".to_string())),
                (2, FeatureError::EmptyCoordinates("LineString")),
            ]
        );
    }

    #[test]
    fn bare_geometry_and_single_feature() {
        let parsed = parse_geojson(r#"{"type": "MultiPoint", "coordinates": [[1, 2], [3, 4]]}"#).unwrap();
        assert_eq!(parsed.features.len(), 1);
        assert!(parsed.features[0].geometry.is_multi());

        let parsed = parse_geojson(
            r#"{"type": "Feature", "properties": {"name": ["a", "b"]},
                "geometry": {"type": "MultiPoint", "coordinates": [[1, 2], [3, 4]]}}"#,
        )
        .unwrap();
        assert_eq!(parsed.features[0].label_at(1).as_deref(), Some("b"));
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(parse_geojson("{ not json").is_err());
        assert!(parse_geojson(r#"{"type": "Nope"}"#).is_err());
    }

    #[test]
    fn merge_offsets_skipped_indices() {
        let mut all = parse_geojson(r#"{"type": "Point", "coordinates": [1, 2]}"#).unwrap();
        let second = parse_geojson(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {}, "geometry": null}]}"#,
        )
        .unwrap();
        all.merge(second, 1);
        assert_eq!(all.features.len(), 1);
        assert_eq!(all.skipped[0].index, 1);
    }

    #[test]
    fn features_remember_their_document_index() {
        let mut all = parse_geojson(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {}, "geometry": null},
                {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [1, 2]}}]}"#,
        )
        .unwrap();
        assert_eq!(all.features[0].source_index, Some(1));

        let second = parse_geojson(r#"{"type": "Point", "coordinates": [3, 4]}"#).unwrap();
        all.merge(second, 2);
        let indices: Vec<Option<usize>> = all.features.iter().map(|f| f.source_index).collect();
        assert_eq!(indices, vec![Some(1), Some(2)]);
    }
}
