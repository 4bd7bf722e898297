use egui::{Align2, Painter, Pos2, Shape};
use gantt_timeline::geometry::{Point, Rect};
use gantt_timeline::render::{Paint, Stroke, Surface};

use crate::ui::theme;

/// Draws chart primitives with an egui painter. Chart coordinates are
/// relative to `origin`.
pub struct EguiSurface<'a> {
    painter: &'a Painter,
    origin: Pos2,
}

impl<'a> EguiSurface<'a> {
    pub fn new(painter: &'a Painter, origin: Pos2) -> Self {
        Self { painter, origin }
    }

    fn pos(&self, p: Point) -> Pos2 {
        Pos2::new(self.origin.x + p.x as f32, self.origin.y + p.y as f32)
    }

    fn rect(&self, r: Rect) -> egui::Rect {
        egui::Rect::from_min_max(
            self.pos(Point::new(r.left(), r.top())),
            self.pos(Point::new(r.right(), r.bottom())),
        )
    }

    fn stroke(stroke: Stroke) -> egui::Stroke {
        egui::Stroke::new(stroke.width as f32, theme::paint_color(stroke.paint))
    }

    fn path(&self, points: &[Pos2], stroke: Stroke, dashed: bool) {
        let stroke = Self::stroke(stroke);
        if dashed {
            self.painter
                .extend(Shape::dashed_line(points, stroke, theme::DASH, theme::DASH_GAP));
        } else {
            self.painter.add(Shape::line(points.to_vec(), stroke));
        }
    }
}

impl Surface for EguiSurface<'_> {
    fn fill_rect(&mut self, rect: Rect, paint: Paint) {
        self.painter
            .rect_filled(self.rect(rect), 0.0, theme::paint_color(paint));
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke, dashed: bool) {
        let r = self.rect(rect);
        if dashed {
            let corners = [r.left_top(), r.right_top(), r.right_bottom(), r.left_bottom(), r.left_top()];
            self.path(&corners, stroke, true);
        } else {
            self.painter.rect_stroke(r, 0.0, Self::stroke(stroke));
        }
    }

    fn line(&mut self, from: Point, to: Point, stroke: Stroke, dashed: bool) {
        let (a, b) = (self.pos(from), self.pos(to));
        if dashed {
            self.path(&[a, b], stroke, true);
        } else {
            self.painter.line_segment([a, b], Self::stroke(stroke));
        }
    }

    fn polyline(&mut self, points: &[Point], stroke: Stroke) {
        let points: Vec<Pos2> = points.iter().map(|p| self.pos(*p)).collect();
        self.path(&points, stroke, false);
    }

    fn polygon(&mut self, points: &[Point], paint: Paint) {
        let points: Vec<Pos2> = points.iter().map(|p| self.pos(*p)).collect();
        self.painter.add(Shape::convex_polygon(
            points,
            theme::paint_color(paint),
            egui::Stroke::NONE,
        ));
    }

    fn text(&mut self, pos: Point, text: &str, paint: Paint) {
        self.painter.text(
            self.pos(pos),
            Align2::LEFT_CENTER,
            text,
            theme::paint_font(paint),
            theme::paint_color(paint),
        );
    }
}
