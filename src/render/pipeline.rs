//! Per-frame drawing in a fixed z-order.
//!
//! Only rows inside the viewport are drawn; connectors use a wider buffered
//! range so links whose endpoints sit just offscreen still show.

use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;

use crate::geometry::{Point, Rect};
use crate::layout::coords::{bar_bounds, progress_x, row_to_y, time_to_screen_x};
use crate::layout::snap::{is_weekend, SnapUnit, TimeGrid};
use crate::model::{LayoutRow, Relation, Task, TaskId, Viewport, ZoomLevel, DAY_MS};
use crate::render::router::{arrow_head, ConnectorCache, RouteParams};
use crate::render::surface::{Layer, Paint, Stroke, Surface};
use crate::render::virtualize::{buffered_row_range, slice_for, visible_row_range};

const GRID_LINE_LIMIT: usize = 600;
const MARKER_SIZE: f64 = 5.0;
const CAP_WIDTH: f64 = 3.0;
const CAP_OVERHANG: f64 = 3.0;
const INDICATOR_SIZE: f64 = 4.0;
const ARROW_SIZE: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOptions {
    pub connector_buffer_rows: usize,
    pub show_today: bool,
    pub show_progress_line: bool,
    pub show_labels: bool,
    pub route: RouteParams,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            connector_buffer_rows: 10,
            show_today: true,
            show_progress_line: true,
            show_labels: true,
            route: RouteParams::default(),
        }
    }
}

/// Everything one frame needs. `tasks` and `rows` must be in ascending
/// row order, as produced by the layout builder.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub tasks: &'a [Task],
    pub rows: &'a [LayoutRow],
    pub relations: &'a [Relation],
    pub viewport: &'a Viewport,
    pub zoom: ZoomLevel,
    pub grid: TimeGrid,
    pub today: Option<i64>,
    pub selected: Option<TaskId>,
    /// Rubber band of an in-progress link gesture, in screen space.
    pub link_draft: Option<(Point, Point)>,
    pub options: FrameOptions,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    pub visible_rows: Option<RangeInclusive<usize>>,
    pub bars: usize,
    pub connectors: usize,
}

pub fn render_frame(surface: &mut dyn Surface, input: &FrameInput<'_>, cache: &mut ConnectorCache) -> FrameStats {
    cache.begin_frame();
    let vp = input.viewport;
    let row_count = input
        .rows
        .len()
        .max(input.tasks.last().map_or(0, |t| t.row_index + 1));
    let visible = visible_row_range(vp, row_count);
    let visible_tasks = slice_for(input.tasks, visible.as_ref());
    let mut stats = FrameStats {
        visible_rows: visible.clone(),
        ..Default::default()
    };

    surface.begin_layer(Layer::Grid);
    draw_grid(surface, input);

    let today = input.today.filter(|_| input.options.show_today);
    if let Some(today) = today {
        surface.begin_layer(Layer::TodayMarker);
        let day = TimeGrid::new(SnapUnit::Day, input.grid.offset).floor(today);
        let x = time_to_screen_x(day as f64, vp);
        let w = time_to_screen_x((day + DAY_MS) as f64, vp) - x;
        surface.fill_rect(Rect::new(x, 0.0, w, vp.height), Paint::TodayShade);
    }

    surface.begin_layer(Layer::Summaries);
    if let Some(range) = &visible {
        for row in slice_rows(input.rows, *range.start(), *range.end()) {
            draw_summary_row(surface, row, input);
        }
    }

    surface.begin_layer(Layer::Bars);
    for task in visible_tasks {
        let bar = bar_bounds(task, vp, &input.grid);
        if bar.right() < 0.0 || bar.left() > vp.width {
            continue;
        }
        draw_bar(surface, task, bar, today, vp, input.options.show_labels);
        stats.bars += 1;
    }

    if input.zoom.shows_dependency_indicators() {
        surface.begin_layer(Layer::DependencyIndicators);
        draw_dependency_indicators(surface, visible_tasks, input);
    }

    surface.begin_layer(Layer::Connectors);
    let buffered = buffered_row_range(vp, row_count, input.options.connector_buffer_rows);
    stats.connectors = draw_connectors(surface, slice_for(input.tasks, buffered.as_ref()), input, cache);
    if let Some((from, to)) = input.link_draft {
        surface.line(from, to, Stroke::new(1.5, Paint::LinkDraft), true);
    }

    surface.begin_layer(Layer::Selection);
    if let Some(task) = input
        .selected
        .and_then(|id| visible_tasks.iter().find(|t| t.id == id))
    {
        let outline = bar_bounds(task, vp, &input.grid).expand(2.0);
        surface.stroke_rect(outline, Stroke::new(1.5, Paint::Selection), true);
    }

    if input.options.show_progress_line {
        surface.begin_layer(Layer::ProgressLine);
        let points: Vec<Point> = visible_tasks
            .iter()
            .map(|t| {
                let bar = bar_bounds(t, vp, &input.grid);
                Point::new(progress_x(&bar, t.ratio_done), bar.center().y)
            })
            .collect();
        if points.len() >= 2 {
            surface.polyline(&points, Stroke::new(1.5, Paint::ProgressLine));
        }
    }

    if let Some(today) = today {
        surface.begin_layer(Layer::TodayLine);
        let x = time_to_screen_x(today as f64, vp);
        surface.line(
            Point::new(x, 0.0),
            Point::new(x, vp.height),
            Stroke::new(2.0, Paint::TodayLine),
            false,
        );
    }

    stats
}

/// Rows with `first <= row_index <= last`, found by binary search.
fn slice_rows(rows: &[LayoutRow], first: usize, last: usize) -> &[LayoutRow] {
    if last < first {
        return &[];
    }
    let lo = rows.partition_point(|r| r.row_index() < first);
    let len = rows[lo..]
        .iter()
        .take_while(|r| r.row_index() <= last)
        .count();
    &rows[lo..lo + len]
}

fn draw_grid(surface: &mut dyn Surface, input: &FrameInput<'_>) {
    let vp = input.viewport;
    let from = vp.visible_start().floor() as i64;
    let to = vp.visible_end().ceil() as i64;

    if matches!(input.zoom, ZoomLevel::Week | ZoomLevel::Day | ZoomLevel::Hour) {
        let days = TimeGrid::new(SnapUnit::Day, input.grid.offset);
        let marks = days.boundaries(from, to, GRID_LINE_LIMIT);
        for day in marks.iter().copied().filter(|d| is_weekend(*d, input.grid.offset)) {
            let x = time_to_screen_x(day as f64, vp);
            let w = time_to_screen_x((day + DAY_MS) as f64, vp) - x;
            surface.fill_rect(Rect::new(x, 0.0, w, vp.height), Paint::WeekendShade);
        }
    }

    for mark in input.grid.boundaries(from, to, GRID_LINE_LIMIT) {
        let x = time_to_screen_x(mark as f64, vp);
        surface.line(
            Point::new(x, 0.0),
            Point::new(x, vp.height),
            Stroke::new(1.0, Paint::GridLine),
            false,
        );
    }
}

fn draw_summary_row(surface: &mut dyn Surface, row: &LayoutRow, input: &FrameInput<'_>) {
    let vp = input.viewport;
    let day_grid = TimeGrid::new(SnapUnit::Day, input.grid.offset);
    let (start, due, ratio, name, row_index) = match row {
        LayoutRow::Header {
            start_date: Some(start),
            due_date: Some(due),
            project_name,
            row_index,
            ..
        } => (*start, *due, None, project_name, *row_index),
        LayoutRow::Version {
            start_date,
            due_date,
            ratio_done,
            name,
            row_index,
            ..
        } => (*start_date, *due_date, Some(*ratio_done), name, *row_index),
        _ => return,
    };

    let x1 = time_to_screen_x(day_grid.floor(start) as f64, vp);
    let x2 = time_to_screen_x((day_grid.floor(due) + DAY_MS) as f64, vp).max(x1);
    let cy = row_to_y(row_index, vp) + vp.row_height / 2.0;

    surface.line(
        Point::new(x1, cy),
        Point::new(x2, cy),
        Stroke::new(2.0, Paint::SummaryBar),
        true,
    );
    if let Some(ratio) = ratio {
        let done = x1 + (x2 - x1) * ratio.clamp(0.0, 100.0) / 100.0;
        if done > x1 {
            surface.line(
                Point::new(x1, cy),
                Point::new(done, cy),
                Stroke::new(3.0, Paint::SummaryProgress),
                false,
            );
        }
    }
    surface.polygon(&diamond(Point::new(x1, cy), MARKER_SIZE), Paint::SummaryMarker);
    surface.polygon(&diamond(Point::new(x2, cy), MARKER_SIZE), Paint::SummaryMarker);
    if input.options.show_labels {
        surface.text(Point::new(x2 + MARKER_SIZE + 4.0, cy), name, Paint::SummaryLabel);
    }
}

fn diamond(c: Point, r: f64) -> [Point; 4] {
    [
        Point::new(c.x, c.y - r),
        Point::new(c.x + r, c.y),
        Point::new(c.x, c.y + r),
        Point::new(c.x - r, c.y),
    ]
}

fn draw_bar(
    surface: &mut dyn Surface,
    task: &Task,
    bar: Rect,
    today: Option<i64>,
    vp: &Viewport,
    show_label: bool,
) {
    surface.fill_rect(bar, Paint::BarPlanned);

    let done_x = progress_x(&bar, task.ratio_done);
    if done_x > bar.x {
        surface.fill_rect(Rect::new(bar.x, bar.y, done_x - bar.x, bar.height), Paint::BarProgress);
    }

    if let Some(today) = today {
        let delay_end = time_to_screen_x(today as f64, vp).min(bar.right());
        if delay_end > done_x {
            surface.hatch_rect(
                Rect::new(done_x, bar.y, delay_end - done_x, bar.height),
                Stroke::new(1.0, Paint::BarDelay),
                4.0,
            );
        }
    }

    if task.has_children {
        let cap_h = bar.height + 2.0 * CAP_OVERHANG;
        let y = bar.y - CAP_OVERHANG;
        surface.fill_rect(Rect::new(bar.left(), y, CAP_WIDTH, cap_h), Paint::ParentCap);
        surface.fill_rect(Rect::new(bar.right() - CAP_WIDTH, y, CAP_WIDTH, cap_h), Paint::ParentCap);
    }

    if show_label {
        surface.text(Point::new(bar.right() + 4.0, bar.center().y), &task.subject, Paint::Label);
    }
}

fn draw_dependency_indicators(surface: &mut dyn Surface, tasks: &[Task], input: &FrameInput<'_>) {
    let mut outgoing: HashSet<TaskId> = HashSet::new();
    let mut incoming: HashSet<TaskId> = HashSet::new();
    for (pred, succ) in input.relations.iter().filter_map(Relation::directed) {
        outgoing.insert(pred);
        incoming.insert(succ);
    }
    let s = INDICATOR_SIZE;
    for task in tasks {
        let bar = bar_bounds(task, input.viewport, &input.grid);
        let cy = bar.center().y;
        if outgoing.contains(&task.id) {
            let r = bar.right();
            surface.polygon(
                &[Point::new(r, cy - s), Point::new(r + s, cy), Point::new(r, cy + s)],
                Paint::DependencyIndicator,
            );
        }
        if incoming.contains(&task.id) {
            let l = bar.left();
            surface.polygon(
                &[Point::new(l - s, cy - s), Point::new(l, cy), Point::new(l - s, cy + s)],
                Paint::DependencyIndicator,
            );
        }
    }
}

fn draw_connectors(
    surface: &mut dyn Surface,
    tasks: &[Task],
    input: &FrameInput<'_>,
    cache: &mut ConnectorCache,
) -> usize {
    let bars: HashMap<TaskId, Rect> = tasks
        .iter()
        .map(|t| (t.id, bar_bounds(t, input.viewport, &input.grid)))
        .collect();
    let obstacles: Vec<Rect> = tasks
        .iter()
        .filter_map(|t| bars.get(&t.id).copied())
        .collect();
    let stroke = Stroke::new(1.5, Paint::Connector);

    let mut drawn = 0;
    for (pred, succ) in input.relations.iter().filter_map(Relation::directed) {
        let (Some(from), Some(to)) = (bars.get(&pred), bars.get(&succ)) else {
            continue;
        };
        let points = cache.route(from, to, &obstacles, &input.options.route);
        surface.polyline(&points, stroke);
        if let Some(head) = arrow_head(&points, ARROW_SIZE) {
            surface.polygon(&head, Paint::Connector);
        }
        drawn += 1;
    }
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProjectId, RelationType, VersionId};
    use crate::render::surface::{DrawOp, RecordingSurface};

    fn vp() -> Viewport {
        Viewport {
            start_date: 0.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            scale: ZoomLevel::Day.default_scale(),
            width: 800.0,
            height: 90.0,
            row_height: 30.0,
        }
    }

    fn laid_out(count: usize) -> (Vec<Task>, Vec<LayoutRow>) {
        let tasks: Vec<Task> = (0..count)
            .map(|i| {
                let mut t = Task::new(i as i64 + 1, format!("t{i}"), DAY_MS, 4 * DAY_MS);
                t.row_index = i;
                t
            })
            .collect();
        let rows = tasks
            .iter()
            .map(|t| LayoutRow::Task {
                task_id: t.id,
                row_index: t.row_index,
            })
            .collect();
        (tasks, rows)
    }

    fn input<'a>(
        tasks: &'a [Task],
        rows: &'a [LayoutRow],
        relations: &'a [Relation],
        viewport: &'a Viewport,
        zoom: ZoomLevel,
    ) -> FrameInput<'a> {
        FrameInput {
            tasks,
            rows,
            relations,
            viewport,
            zoom,
            grid: TimeGrid::utc(zoom.snap_unit()),
            today: Some(10 * DAY_MS),
            selected: None,
            link_draft: None,
            options: FrameOptions::default(),
        }
    }

    #[test]
    fn test_layer_order() {
        let (tasks, rows) = laid_out(3);
        let viewport = vp();
        let mut surface = RecordingSurface::new();
        let mut cache = ConnectorCache::new(64, 4);
        render_frame(&mut surface, &input(&tasks, &rows, &[], &viewport, ZoomLevel::Week), &mut cache);
        assert_eq!(
            surface.layers,
            vec![
                Layer::Grid,
                Layer::TodayMarker,
                Layer::Summaries,
                Layer::Bars,
                Layer::DependencyIndicators,
                Layer::Connectors,
                Layer::Selection,
                Layer::ProgressLine,
                Layer::TodayLine,
            ]
        );
    }

    #[test]
    fn test_only_visible_rows_are_drawn() {
        let (tasks, rows) = laid_out(100);
        let viewport = vp();
        let mut surface = RecordingSurface::new();
        let mut cache = ConnectorCache::new(64, 4);
        let stats = render_frame(&mut surface, &input(&tasks, &rows, &[], &viewport, ZoomLevel::Day), &mut cache);
        assert_eq!(stats.visible_rows, Some(0..=3));
        assert_eq!(stats.bars, 4);
        assert_eq!(surface.count(Paint::BarPlanned), 4);
        assert!(!surface.layers.contains(&Layer::DependencyIndicators));
    }

    #[test]
    fn test_connector_to_buffered_row() {
        let (tasks, rows) = laid_out(20);
        let relations = vec![Relation::new(1, TaskId(1), TaskId(7), RelationType::Precedes)];
        let viewport = vp();
        let mut cache = ConnectorCache::new(64, 4);

        let mut surface = RecordingSurface::new();
        let stats = render_frame(
            &mut surface,
            &input(&tasks, &rows, &relations, &viewport, ZoomLevel::Day),
            &mut cache,
        );
        assert_eq!(stats.connectors, 1);

        let mut narrow = input(&tasks, &rows, &relations, &viewport, ZoomLevel::Day);
        narrow.options.connector_buffer_rows = 0;
        let stats = render_frame(&mut RecordingSurface::new(), &narrow, &mut cache);
        assert_eq!(stats.connectors, 0);
    }

    #[test]
    fn test_delay_hatch_until_today() {
        let (mut tasks, rows) = laid_out(2);
        tasks[1].ratio_done = 100;
        let viewport = vp();
        let mut surface = RecordingSurface::new();
        let mut cache = ConnectorCache::new(64, 4);
        render_frame(&mut surface, &input(&tasks, &rows, &[], &viewport, ZoomLevel::Day), &mut cache);

        let second_row_y = (30.0, 60.0);
        let delay: Vec<&DrawOp> = surface
            .ops_in(Layer::Bars)
            .filter(|op| op.paint() == Paint::BarDelay)
            .collect();
        assert!(!delay.is_empty());
        for op in delay {
            let DrawOp::Line(a, _, _, _) = op else {
                panic!("unexpected delay op {op:?}");
            };
            assert!(a.y < second_row_y.0 || a.y > second_row_y.1);
        }
    }

    #[test]
    fn test_parent_caps_and_selection() {
        let (mut tasks, rows) = laid_out(2);
        tasks[0].has_children = true;
        let viewport = vp();
        let mut frame = input(&tasks, &rows, &[], &viewport, ZoomLevel::Day);
        frame.selected = Some(TaskId(2));
        let mut surface = RecordingSurface::new();
        render_frame(&mut surface, &frame, &mut ConnectorCache::new(8, 1));
        assert_eq!(surface.count(Paint::ParentCap), 2);
        assert!(matches!(
            surface.ops_in(Layer::Selection).next(),
            Some(DrawOp::StrokeRect(_, _, true))
        ));
    }

    #[test]
    fn test_version_summary_progress() {
        let rows = vec![
            LayoutRow::Header {
                project_id: ProjectId(1),
                project_name: "Core".into(),
                row_index: 0,
                start_date: Some(DAY_MS),
                due_date: Some(5 * DAY_MS),
            },
            LayoutRow::Version {
                id: VersionId(3),
                name: "1.0".into(),
                row_index: 1,
                start_date: DAY_MS,
                due_date: 5 * DAY_MS,
                ratio_done: 50.0,
                project_id: ProjectId(1),
            },
        ];
        let viewport = vp();
        let mut surface = RecordingSurface::new();
        render_frame(
            &mut surface,
            &input(&[], &rows, &[], &viewport, ZoomLevel::Day),
            &mut ConnectorCache::new(8, 1),
        );
        assert_eq!(surface.count(Paint::SummaryMarker), 4);
        assert_eq!(surface.count(Paint::SummaryProgress), 1);
        assert_eq!(surface.count(Paint::SummaryBar), 2);
    }
}
