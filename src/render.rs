use crate::layout::{DrawInstruction, Layout, Point, TextStyle};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

#[cfg(feature = "png")]
use crate::config::RenderConfig;

/// Paints the draw list in order onto an SVG document the size of the view.
pub fn render_svg(layout: &Layout, theme: &Theme) -> String {
    let width = layout.width.max(1.0);
    let height = layout.height.max(1.0);
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    for draw in &layout.draws {
        match draw {
            DrawInstruction::Polygon {
                ring,
                fill,
                stroke,
                stroke_width,
            } => {
                svg.push_str(&format!(
                    "<path d=\"{} Z\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{:.2}\"/>",
                    points_to_path(ring),
                    escape_xml(fill),
                    escape_xml(stroke),
                    stroke_width
                ));
            }
            DrawInstruction::Line {
                points,
                stroke,
                width,
            } => {
                svg.push_str(&format!(
                    "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\" stroke-linejoin=\"round\" stroke-linecap=\"round\"/>",
                    points_to_path(points),
                    escape_xml(stroke),
                    width
                ));
            }
            DrawInstruction::Text {
                position,
                content,
                style,
            } => svg.push_str(&text_svg(*position, content, style, theme)),
        }
    }

    svg.push_str("</svg>");
    svg
}

fn points_to_path(points: &[Point]) -> String {
    let Some(first) = points.first() else {
        return String::new();
    };
    let mut d = format!("M {:.2} {:.2}", first.0, first.1);
    for point in &points[1..] {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}

fn text_svg(position: Point, content: &str, style: &TextStyle, theme: &Theme) -> String {
    let weight = if style.bold { " font-weight=\"bold\"" } else { "" };
    format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{:.2}\"{} fill=\"{}\">{}</text>",
        position.0,
        position.1,
        escape_xml(&theme.font_family),
        style.font_size,
        weight,
        escape_xml(&style.fill),
        escape_xml(content)
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("failed to allocate {}x{} pixmap", size.width(), size.height()))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::{Feature, GeoBBox, Geometry, LngLat};
    use crate::layout::compute_layout;
    use crate::layout::text::FastMeasure;

    #[test]
    fn render_svg_paints_every_draw_kind() {
        let features = vec![
            Feature::new(Geometry::Polygon(vec![vec![
                LngLat::new(0.0, 0.0),
                LngLat::new(5.0, 0.0),
                LngLat::new(5.0, 5.0),
            ]])),
            Feature::new(Geometry::LineString(vec![LngLat::new(0.0, 8.0), LngLat::new(10.0, 8.0)])),
            Feature::new(Geometry::Point(LngLat::new(7.0, 3.0))).with_name("Fish & Chips"),
        ];
        let theme = Theme::classic();
        let layout = compute_layout(
            &features,
            Some(GeoBBox::new(0.0, 0.0, 10.0, 10.0)),
            (300.0, 300.0),
            &theme,
            &LayoutConfig::default(),
            &FastMeasure,
        );
        let svg = render_svg(&layout, &theme);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(" Z\" fill=\"#3388ff33\""));
        assert!(svg.contains("fill=\"none\" stroke=\"#0000FF\" stroke-width=\"2.00\""));
        assert!(svg.contains("Fish &amp; Chips"));
        assert!(svg.contains("font-weight=\"bold\""));
    }

    #[test]
    fn path_data_formats_points() {
        assert_eq!(points_to_path(&[(1.0, 2.0), (3.5, 4.25)]), "M 1.00 2.00 L 3.50 4.25");
        assert_eq!(points_to_path(&[]), "");
    }

    #[test]
    fn escape_xml_handles_markup() {
        assert_eq!(escape_xml("<a href='x'>"), "&lt;a href=&apos;x&apos;&gt;");
    }
}
