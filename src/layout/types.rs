use serde::Serialize;

/// Projected view-space coordinate.
pub type Point = (f32, f32);

/// `(x, y, width, height)` with `(x, y)` the top-left corner.
pub type Rect = (f32, f32, f32, f32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObstacleKind {
    Label,
    LineEnvelope,
    PolygonRing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, rect: Rect) -> Self {
        Self {
            kind,
            x: rect.0,
            y: rect.1,
            width: rect.2,
            height: rect.3,
        }
    }

    pub fn rect(&self) -> Rect {
        (self.x, self.y, self.width, self.height)
    }
}

/// A point label waiting for placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub anchor: Point,
    pub text: String,
    pub font_size: f32,
    /// Input sequence number; also the tie-breaker for equal sort keys.
    pub order: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum PlacementState {
    /// Accepted at its anchor with zero offset.
    Anchor,
    /// Found by the spiral search after `probes` candidate positions.
    Spiral { probes: usize },
    /// Search exhausted; placed at the anchor and may overlap.
    Fallback,
    /// Pinned at the view center before all other labels.
    Center,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLabel {
    pub label: Label,
    /// Center of the drawn text.
    pub position: Point,
    pub bbox: Rect,
    /// Font size actually drawn, after viewport scaling.
    pub draw_font_size: f32,
    pub state: PlacementState,
}

impl PlacedLabel {
    pub fn offset(&self) -> Point {
        (
            self.position.0 - self.label.anchor.0,
            self.position.1 - self.label.anchor.1,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyle {
    pub fill: String,
    pub font_size: f32,
    pub bold: bool,
}

/// Backend-neutral paint command. The list order is the paint order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DrawInstruction {
    Polygon {
        ring: Vec<Point>,
        fill: String,
        stroke: String,
        stroke_width: f32,
    },
    Line {
        points: Vec<Point>,
        stroke: String,
        width: f32,
    },
    Text {
        position: Point,
        content: String,
        style: TextStyle,
    },
}

/// A feature, or part of one, that produced no drawing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedItem {
    /// The feature's source document index, or its position in the layout
    /// input when it was not parsed from a document.
    pub feature: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub draws: Vec<DrawInstruction>,
    pub placed_labels: Vec<PlacedLabel>,
    /// Placement obstacles as they stood after the last label: committed
    /// label boxes followed by line and polygon envelopes.
    pub obstacles: Vec<Obstacle>,
    pub skipped: Vec<SkippedItem>,
}

impl Layout {
    pub fn texts(&self) -> impl Iterator<Item = (&Point, &str)> + '_ {
        self.draws.iter().filter_map(|draw| match draw {
            DrawInstruction::Text {
                position, content, ..
            } => Some((position, content.as_str())),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &[Point]> + '_ {
        self.draws.iter().filter_map(|draw| match draw {
            DrawInstruction::Line { points, .. } => Some(points.as_slice()),
            _ => None,
        })
    }
}
