use crate::geometry::{Point, Rect};
use crate::layout::coords::{hit_bounds, y_to_row};
use crate::layout::snap::TimeGrid;
use crate::model::{Task, TaskId, Viewport};
use crate::render::virtualize::{slice_tasks_in_row_range, visible_row_range};

/// Part of a bar under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitRegion {
    Start,
    Body,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskHit {
    pub task_id: TaskId,
    pub region: HitRegion,
    pub bounds: Rect,
}

/// Edge zones are `edge_px` wide but never more than a third of the bar,
/// so narrow bars keep a body to grab.
pub fn region_for(bounds: &Rect, x: f64, edge_px: f64) -> HitRegion {
    let edge = edge_px.min(bounds.width / 3.0);
    if x - bounds.left() <= edge {
        HitRegion::Start
    } else if bounds.right() - x <= edge {
        HitRegion::End
    } else {
        HitRegion::Body
    }
}

/// Task under a screen point. Only rows inside the viewport are considered
/// and only `Hit` bounds are used.
pub fn task_at(
    tasks: &[Task],
    viewport: &Viewport,
    grid: &TimeGrid,
    point: Point,
    edge_px: f64,
) -> Option<TaskHit> {
    if point.y < 0.0 || point.y > viewport.height {
        return None;
    }
    let row = y_to_row(point.y, viewport)?;
    let row_count = tasks.last().map_or(0, |t| t.row_index + 1);
    let visible = visible_row_range(viewport, row_count)?;
    if !visible.contains(&row) {
        return None;
    }
    slice_tasks_in_row_range(tasks, row, row).iter().find_map(|task| {
        let bounds = hit_bounds(task, viewport, grid);
        bounds.contains(point).then(|| TaskHit {
            task_id: task.id,
            region: region_for(&bounds, point.x, edge_px),
            bounds,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::snap::SnapUnit;
    use crate::model::{ZoomLevel, DAY_MS};

    fn vp() -> Viewport {
        Viewport {
            start_date: 0.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            scale: ZoomLevel::Day.default_scale(),
            width: 800.0,
            height: 64.0,
            row_height: 32.0,
        }
    }

    fn tasks() -> Vec<Task> {
        // Row 0: days 2..=4 -> x 80..200. Row 1 is empty. Row 5 is offscreen.
        let mut a = Task::new(1, "a", 2 * DAY_MS, 4 * DAY_MS);
        a.row_index = 0;
        let mut b = Task::new(2, "b", 2 * DAY_MS, 4 * DAY_MS);
        b.row_index = 5;
        vec![a, b]
    }

    fn hit(x: f64, y: f64) -> Option<TaskHit> {
        task_at(&tasks(), &vp(), &TimeGrid::utc(SnapUnit::Day), Point::new(x, y), 8.0)
    }

    #[test]
    fn test_regions_split_at_edges() {
        assert_eq!(hit(83.0, 5.0).map(|h| h.region), Some(HitRegion::Start));
        assert_eq!(hit(88.0, 5.0).map(|h| h.region), Some(HitRegion::Start));
        assert_eq!(hit(140.0, 5.0).map(|h| h.region), Some(HitRegion::Body));
        assert_eq!(hit(195.0, 31.0).map(|h| h.region), Some(HitRegion::End));
    }

    #[test]
    fn test_full_row_height_is_hittable() {
        // The drawn bar is only 40% tall; the hit box spans the row.
        assert_eq!(hit(140.0, 1.0).map(|h| h.task_id), Some(TaskId(1)));
    }

    #[test]
    fn test_misses() {
        assert!(hit(20.0, 5.0).is_none());
        assert!(hit(140.0, 40.0).is_none());
        assert!(hit(140.0, -1.0).is_none());
    }

    #[test]
    fn test_offscreen_rows_ignored() {
        let viewport = Viewport {
            scroll_y: 160.0,
            ..vp()
        };
        let grid = TimeGrid::utc(SnapUnit::Day);
        let found = task_at(&tasks(), &viewport, &grid, Point::new(140.0, 5.0), 8.0);
        assert_eq!(found.map(|h| h.task_id), Some(TaskId(2)));
    }

    #[test]
    fn test_narrow_bar_keeps_a_body() {
        let bounds = Rect::new(0.0, 0.0, 12.0, 30.0);
        assert_eq!(region_for(&bounds, 6.0, 8.0), HitRegion::Body);
        assert_eq!(region_for(&bounds, 3.0, 8.0), HitRegion::Start);
        assert_eq!(region_for(&bounds, 10.0, 8.0), HitRegion::End);
    }
}
