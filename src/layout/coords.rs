//! Pure mappings between time, rows and pixels for a given [`Viewport`].
//!
//! `time_to_x` is timeline-relative; screen x is obtained by subtracting
//! `scroll_x`. `row_to_y` already yields screen y. Task bounds come in two
//! kinds: [`BoundsKind::Hit`] spans the whole row and is the only geometry
//! pointer handling may use, [`BoundsKind::Bar`] is the thinner drawn bar.

use crate::geometry::Rect;
use crate::layout::snap::{floor_to, SnapUnit, TimeGrid};
use crate::model::{Task, Viewport, DAY_MS};

/// Drawn bar height as a fraction of the row height.
pub const BAR_HEIGHT_RATIO: f64 = 0.4;
/// Zero-length tasks still get a bar this wide so they can be clicked.
pub const MIN_BAR_WIDTH: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsKind {
    Hit,
    Bar,
}

pub fn time_to_x(t: f64, viewport: &Viewport) -> f64 {
    (t - viewport.start_date) * viewport.scale
}

pub fn x_to_time(x: f64, viewport: &Viewport) -> f64 {
    x / viewport.scale + viewport.start_date
}

/// Screen x of an instant.
pub fn time_to_screen_x(t: f64, viewport: &Viewport) -> f64 {
    time_to_x(t, viewport) - viewport.scroll_x
}

/// Instant under a screen x.
pub fn screen_x_to_time(x: f64, viewport: &Viewport) -> f64 {
    x_to_time(x + viewport.scroll_x, viewport)
}

pub fn row_to_y(row_index: usize, viewport: &Viewport) -> f64 {
    row_index as f64 * viewport.row_height - viewport.scroll_y
}

/// Row under a screen y, if any row can sit there.
pub fn y_to_row(y: f64, viewport: &Viewport) -> Option<usize> {
    let row = ((y + viewport.scroll_y) / viewport.row_height).floor();
    (row.is_finite() && row >= 0.0).then_some(row as usize)
}

/// Drawn extent of a task in time: start snapped down to the grid, the
/// inclusive due day rounded up to the grid.
pub fn bar_span(task: &Task, grid: &TimeGrid) -> (i64, i64) {
    let start = grid.floor(task.start_date);
    let due_day_end = floor_to(task.due_date, SnapUnit::Day, grid.offset) + DAY_MS;
    let end = grid.ceil(due_day_end).max(start);
    (start, end)
}

pub fn bar_height(viewport: &Viewport) -> f64 {
    (viewport.row_height * BAR_HEIGHT_RATIO).round()
}

/// Screen-space bounds of a task of the requested kind.
pub fn task_bounds(task: &Task, viewport: &Viewport, kind: BoundsKind, grid: &TimeGrid) -> Rect {
    let (start, end) = bar_span(task, grid);
    let x = time_to_screen_x(start as f64, viewport);
    let width = (time_to_screen_x(end as f64, viewport) - x).max(MIN_BAR_WIDTH);
    let row_top = row_to_y(task.row_index, viewport);
    match kind {
        BoundsKind::Hit => Rect::new(x, row_top, width, viewport.row_height),
        BoundsKind::Bar => {
            let height = bar_height(viewport);
            Rect::new(x, row_top + (viewport.row_height - height) / 2.0, width, height)
        }
    }
}

pub fn hit_bounds(task: &Task, viewport: &Viewport, grid: &TimeGrid) -> Rect {
    task_bounds(task, viewport, BoundsKind::Hit, grid)
}

pub fn bar_bounds(task: &Task, viewport: &Viewport, grid: &TimeGrid) -> Rect {
    task_bounds(task, viewport, BoundsKind::Bar, grid)
}

/// Screen x where the done part of a bar ends.
pub fn progress_x(bar: &Rect, ratio_done: u8) -> f64 {
    bar.x + bar.width * f64::from(ratio_done.min(100)) / 100.0
}
