use std::path::Path;

use geo_label_renderer::layout::geometry::rects_overlap;
use geo_label_renderer::layout::projection::{Projector, global_bbox};
use geo_label_renderer::layout::text::FastMeasure;
use geo_label_renderer::layout::{DrawInstruction, Layout, PlacementState};
use geo_label_renderer::parser::{FeatureError, ParsedFeatures, parse_geojson};
use geo_label_renderer::render::render_svg;
use geo_label_renderer::{Geometry, LayoutConfig, Theme, compute_layout};

const VIEW: (f32, f32) = (800.0, 600.0);

fn load_fixture(rel: &str) -> ParsedFeatures {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(rel);
    assert!(path.exists(), "fixture missing: {rel}");
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    parse_geojson(&input).expect("parse failed")
}

fn layout_fixture(parsed: &ParsedFeatures) -> Layout {
    compute_layout(
        &parsed.features,
        global_bbox(&parsed.features),
        VIEW,
        &Theme::classic(),
        &LayoutConfig::default(),
        &FastMeasure,
    )
}

fn assert_labels_disjoint(layout: &Layout, fixture: &str) {
    let settled: Vec<_> = layout
        .placed_labels
        .iter()
        .filter(|p| p.state != PlacementState::Fallback)
        .collect();
    for (i, a) in settled.iter().enumerate() {
        for b in &settled[i + 1..] {
            assert!(
                !rects_overlap(&a.bbox, &b.bbox),
                "{fixture}: {:?} overlaps {:?}",
                a.label.text,
                b.label.text
            );
        }
    }
}

#[test]
fn render_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let fixtures = ["harbor.geojson", "islands.geojson", "transit.geojson"];

    for rel in fixtures {
        let parsed = load_fixture(rel);
        let layout = layout_fixture(&parsed);
        assert_labels_disjoint(&layout, rel);
        let svg = render_svg(&layout, &Theme::classic());
        assert!(svg.contains("<svg"), "{rel}: missing <svg tag");
        assert!(svg.contains("</svg>"), "{rel}: missing </svg tag");
    }
}

#[test]
fn harbor_lines_keep_their_endpoints() {
    let parsed = load_fixture("harbor.geojson");
    let layout = layout_fixture(&parsed);
    let projector = Projector::new(global_bbox(&parsed.features), VIEW.0, VIEW.1);

    let ferry = parsed
        .features
        .iter()
        .find_map(|f| match &f.geometry {
            Geometry::LineString(coords) => Some(projector.path(coords)),
            _ => None,
        })
        .expect("fixture has a ferry line");
    let line = layout.lines().next().expect("ferry line is drawn");
    assert_eq!(line.first(), ferry.first());
    assert_eq!(line.last(), ferry.last());
}

#[test]
fn harbor_buoys_use_multipoint_names_and_size() {
    let parsed = load_fixture("harbor.geojson");
    let layout = layout_fixture(&parsed);
    let mut buoys: Vec<&str> = layout
        .placed_labels
        .iter()
        .filter(|p| p.label.font_size == 12.0)
        .map(|p| p.label.text.as_str())
        .collect();
    buoys.sort_unstable();
    assert_eq!(buoys, vec!["Buoy A", "Buoy B", "Buoy C"]);
}

#[test]
fn islands_skip_bad_features_and_draw_every_ring() {
    let parsed = load_fixture("islands.geojson");
    let errors: Vec<(usize, &FeatureError)> = parsed.skipped.iter().map(|s| (s.index, &s.error)).collect();
    assert_eq!(
        errors,
        vec![
            (2, &FeatureError::UnsupportedGeometry("GeometryCollection".to_string())),
            (3, &FeatureError::EmptyCoordinates("MultiPoint")),
        ]
    );

    let layout = layout_fixture(&parsed);
    let polygons = layout
        .draws
        .iter()
        .filter(|d| matches!(d, DrawInstruction::Polygon { .. }))
        .count();
    assert_eq!(polygons, 3);
    let texts: Vec<&str> = layout.texts().map(|(_, t)| t).collect();
    assert_eq!(texts, vec!["Twin Isles", "Lighthouse"]);
}

#[test]
fn transit_layout_is_deterministic() {
    let parsed = load_fixture("transit.geojson");
    let first = layout_fixture(&parsed);
    let second = layout_fixture(&parsed);
    assert_eq!(first.draws, second.draws);
    assert_eq!(first.placed_labels, second.placed_labels);

    let texts: Vec<&str> = first.texts().map(|(_, t)| t).collect();
    assert!(texts.contains(&"Line 1"));
    assert!(texts.contains(&"7"));
    assert_eq!(first.lines().count(), 2);
}
