use crate::layout::snap::TimeGrid;
use crate::model::{TaskId, DAY_MS};
use crate::store::TaskSnapshot;

use super::hit_test::HitRegion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Move,
    ResizeStart,
    ResizeEnd,
}

impl From<HitRegion> for EditMode {
    fn from(region: HitRegion) -> Self {
        match region {
            HitRegion::Start => EditMode::ResizeStart,
            HitRegion::Body => EditMode::Move,
            HitRegion::End => EditMode::ResizeEnd,
        }
    }
}

/// A bar being moved or resized. Dates are measured from where the
/// gesture began, so rounding never accumulates across pointer moves.
#[derive(Debug, Clone)]
pub struct EditGesture {
    pub mode: EditMode,
    pub task_id: TaskId,
    pub origin_x: f64,
    pub start_date: i64,
    pub due_date: i64,
    /// Dates most recently pushed to the store.
    pub last: (i64, i64),
    pub snapshot: TaskSnapshot,
}

impl EditGesture {
    pub fn new(
        mode: EditMode,
        task_id: TaskId,
        origin_x: f64,
        (start_date, due_date): (i64, i64),
        snapshot: TaskSnapshot,
    ) -> Self {
        Self {
            mode,
            task_id,
            origin_x,
            start_date,
            due_date,
            last: (start_date, due_date),
            snapshot,
        }
    }

    /// Snapped `(start, due)` for the pointer at screen `x`, or `None` when
    /// the edit would leave the task with no length.
    pub fn dates_at(&self, x: f64, scale: f64, grid: &TimeGrid) -> Option<(i64, i64)> {
        let dt = (x - self.origin_x) / scale;
        if !dt.is_finite() {
            return None;
        }
        let dt = dt.round() as i64;
        match self.mode {
            EditMode::Move => {
                let start = snap_from(grid, self.start_date, dt);
                Some((start, start + (self.due_date - self.start_date)))
            }
            EditMode::ResizeStart => {
                let start = snap_from(grid, self.start_date, dt);
                (start < self.due_date).then_some((start, self.due_date))
            }
            EditMode::ResizeEnd => {
                // The drawn end is the day after the due day; snap that edge.
                let due = snap_from(grid, self.due_date + DAY_MS, dt) - DAY_MS;
                (due > self.start_date).then_some((self.start_date, due))
            }
        }
    }

    pub fn changed(&self) -> bool {
        self.last != (self.start_date, self.due_date)
    }
}

/// `origin + dt` snapped to the grid, or `origin` itself while the pointer
/// has not left the boundary `origin` snaps to. Off-grid dates stay put
/// until a drag actually crosses a grid line.
fn snap_from(grid: &TimeGrid, origin: i64, dt: i64) -> i64 {
    let snapped = grid.snap(origin + dt);
    if snapped == grid.snap(origin) {
        origin
    } else {
        snapped
    }
}
