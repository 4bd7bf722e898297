//! Backend-neutral drawing target. The pipeline speaks in semantic paints;
//! the host maps them to real colours.

use crate::geometry::{Point, Rect};

/// What a primitive depicts. Hosts pick colours per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Paint {
    GridLine,
    WeekendShade,
    TodayShade,
    SummaryBar,
    SummaryProgress,
    SummaryMarker,
    BarPlanned,
    BarProgress,
    BarDelay,
    ParentCap,
    DependencyIndicator,
    Connector,
    LinkDraft,
    Selection,
    ProgressLine,
    TodayLine,
    Label,
    SummaryLabel,
}

/// Z-ordered groups of a frame, in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Grid,
    TodayMarker,
    Summaries,
    Bars,
    DependencyIndicators,
    Connectors,
    Selection,
    ProgressLine,
    TodayLine,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f64,
    pub paint: Paint,
}

impl Stroke {
    pub const fn new(width: f64, paint: Paint) -> Self {
        Self { width, paint }
    }
}

pub trait Surface {
    /// Called before the primitives of each layer.
    fn begin_layer(&mut self, _layer: Layer) {}

    fn fill_rect(&mut self, rect: Rect, paint: Paint);

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke, dashed: bool);

    fn line(&mut self, from: Point, to: Point, stroke: Stroke, dashed: bool);

    fn polyline(&mut self, points: &[Point], stroke: Stroke);

    fn polygon(&mut self, points: &[Point], paint: Paint);

    fn text(&mut self, pos: Point, text: &str, paint: Paint);

    /// Diagonal hatching clipped to `rect`.
    fn hatch_rect(&mut self, rect: Rect, stroke: Stroke, spacing: f64) {
        if rect.width <= 0.0 || rect.height <= 0.0 || spacing <= 0.0 {
            return;
        }
        let h = rect.height;
        let mut x = rect.left() - h;
        while x < rect.right() {
            let mut from = Point::new(x, rect.bottom());
            let mut to = Point::new(x + h, rect.top());
            if from.x < rect.left() {
                let cut = rect.left() - from.x;
                from = Point::new(rect.left(), rect.bottom() - cut);
            }
            if to.x > rect.right() {
                let cut = to.x - rect.right();
                to = Point::new(rect.right(), rect.top() + cut);
            }
            if to.x > from.x {
                self.line(from, to, stroke, false);
            }
            x += spacing;
        }
    }
}

/// One recorded primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Fill(Rect, Paint),
    StrokeRect(Rect, Stroke, bool),
    Line(Point, Point, Stroke, bool),
    Polyline(Vec<Point>, Stroke),
    Polygon(Vec<Point>, Paint),
    Text(Point, String, Paint),
}

impl DrawOp {
    pub fn paint(&self) -> Paint {
        match self {
            DrawOp::Fill(_, p) | DrawOp::Polygon(_, p) | DrawOp::Text(_, _, p) => *p,
            DrawOp::StrokeRect(_, s, _) | DrawOp::Line(_, _, s, _) | DrawOp::Polyline(_, s) => s.paint,
        }
    }
}

/// Surface that keeps every call, for headless rendering and tests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub layers: Vec<Layer>,
    pub ops: Vec<(Layer, DrawOp)>,
    current: Option<Layer>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops_in(&self, layer: Layer) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(move |(l, _)| *l == layer)
            .map(|(_, op)| op)
    }

    pub fn count(&self, paint: Paint) -> usize {
        self.ops.iter().filter(|(_, op)| op.paint() == paint).count()
    }

    fn push(&mut self, op: DrawOp) {
        let layer = self.current.unwrap_or(Layer::Grid);
        self.ops.push((layer, op));
    }
}

impl Surface for RecordingSurface {
    fn begin_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
        self.current = Some(layer);
    }

    fn fill_rect(&mut self, rect: Rect, paint: Paint) {
        self.push(DrawOp::Fill(rect, paint));
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke, dashed: bool) {
        self.push(DrawOp::StrokeRect(rect, stroke, dashed));
    }

    fn line(&mut self, from: Point, to: Point, stroke: Stroke, dashed: bool) {
        self.push(DrawOp::Line(from, to, stroke, dashed));
    }

    fn polyline(&mut self, points: &[Point], stroke: Stroke) {
        self.push(DrawOp::Polyline(points.to_vec(), stroke));
    }

    fn polygon(&mut self, points: &[Point], paint: Paint) {
        self.push(DrawOp::Polygon(points.to_vec(), paint));
    }

    fn text(&mut self, pos: Point, text: &str, paint: Paint) {
        self.push(DrawOp::Text(pos, text.to_owned(), paint));
    }
}
