use crate::layout::{DrawInstruction, Layout, Obstacle, PlacementState, Point, Rect, SkippedItem};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// JSON form of one layout pass: the ordered draw list for an external
/// canvas plus the placement diagnostics behind it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump<'a> {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub draws: &'a [DrawInstruction],
    pub labels: Vec<LabelDump<'a>>,
    pub obstacles: &'a [Obstacle],
    pub skipped: &'a [SkippedItem],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDump<'a> {
    pub text: &'a str,
    pub anchor: Point,
    pub position: Point,
    pub offset: Point,
    pub bbox: Rect,
    pub font_size: f32,
    #[serde(flatten)]
    pub state: PlacementState,
}

impl<'a> LayoutDump<'a> {
    pub fn from_layout(layout: &'a Layout) -> Self {
        let labels = layout
            .placed_labels
            .iter()
            .map(|placed| LabelDump {
                text: &placed.label.text,
                anchor: placed.label.anchor,
                position: placed.position,
                offset: placed.offset(),
                bbox: placed.bbox,
                font_size: placed.draw_font_size,
                state: placed.state,
            })
            .collect();
        Self {
            width: layout.width,
            height: layout.height,
            scale: layout.scale,
            draws: &layout.draws,
            labels,
            obstacles: &layout.obstacles,
            skipped: &layout.skipped,
        }
    }
}

pub fn layout_json(layout: &Layout) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&LayoutDump::from_layout(layout))?)
}

pub fn write_layout_dump(path: &Path, layout: &Layout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &LayoutDump::from_layout(layout))?;
    Ok(())
}
