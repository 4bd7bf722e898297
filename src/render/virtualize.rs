//! Row-range virtualization: only rows intersecting the viewport (plus a
//! buffer for connectors) are drawn or hit-tested.

use std::ops::RangeInclusive;

use crate::model::{Task, Viewport};

/// Rows intersecting the viewport, clamped to the content. `None` when the
/// layout has no rows.
pub fn visible_row_range(viewport: &Viewport, row_count: usize) -> Option<RangeInclusive<usize>> {
    if row_count == 0 || viewport.row_height <= 0.0 {
        return None;
    }
    let last = row_count - 1;
    let first = (viewport.scroll_y / viewport.row_height).floor().max(0.0) as usize;
    let end = ((viewport.scroll_y + viewport.height) / viewport.row_height)
        .ceil()
        .max(0.0) as usize;
    Some(first.min(last)..=end.min(last))
}

/// Visible range widened by `buffer` rows on each side.
pub fn buffered_row_range(
    viewport: &Viewport,
    row_count: usize,
    buffer: usize,
) -> Option<RangeInclusive<usize>> {
    let range = visible_row_range(viewport, row_count)?;
    let first = range.start().saturating_sub(buffer);
    let last = range.end().saturating_add(buffer).min(row_count - 1);
    Some(first..=last)
}

/// Tasks with `first <= row_index <= last`. `tasks` must be sorted by
/// `row_index` ascending, which the layout builder guarantees.
pub fn slice_tasks_in_row_range(tasks: &[Task], first: usize, last: usize) -> &[Task] {
    if last < first {
        return &[];
    }
    let lo = tasks.partition_point(|t| t.row_index < first);
    let len = tasks[lo..]
        .iter()
        .take_while(|t| t.row_index <= last)
        .count();
    &tasks[lo..lo + len]
}

/// Slice for an optional range; empty when there is nothing visible.
pub fn slice_for<'a>(tasks: &'a [Task], range: Option<&RangeInclusive<usize>>) -> &'a [Task] {
    match range {
        Some(r) => slice_tasks_in_row_range(tasks, *r.start(), *r.end()),
        None => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vp(scroll_y: f64, height: f64) -> Viewport {
        Viewport {
            start_date: 0.0,
            scroll_x: 0.0,
            scroll_y,
            scale: 1.0,
            width: 100.0,
            height,
            row_height: 20.0,
        }
    }

    fn rows(indices: &[usize]) -> Vec<Task> {
        indices
            .iter()
            .enumerate()
            .map(|(i, &row)| {
                let mut t = Task::new(i as i64 + 1, "t", 0, 0);
                t.row_index = row;
                t
            })
            .collect()
    }

    #[test]
    fn test_visible_range_floor_and_ceil() {
        assert_eq!(visible_row_range(&vp(30.0, 50.0), 100), Some(1..=4));
        assert_eq!(visible_row_range(&vp(0.0, 1000.0), 10), Some(0..=9));
        assert_eq!(visible_row_range(&vp(0.0, 100.0), 0), None);
    }

    #[test]
    fn test_buffered_range_clamps() {
        assert_eq!(buffered_row_range(&vp(0.0, 40.0), 10, 5), Some(0..=7));
        assert_eq!(buffered_row_range(&vp(100.0, 40.0), 8, 5), Some(0..=7));
    }

    #[test]
    fn test_empty_when_reversed() {
        let tasks = rows(&[0, 1, 2]);
        assert!(slice_tasks_in_row_range(&tasks, 2, 1).is_empty());
        assert!(slice_for(&tasks, None).is_empty());
    }

    #[test]
    fn test_slice_for_outlives_its_range() {
        let tasks = rows(&[0, 2, 3, 7]);
        let slice = {
            let range = visible_row_range(&vp(40.0, 40.0), 10);
            slice_for(&tasks, range.as_ref())
        };
        let got: Vec<usize> = slice.iter().map(|t| t.row_index).collect();
        assert_eq!(got, vec![2, 3]);
    }

    proptest! {
        #[test]
        fn prop_slice_matches_filter(
            mut indices in proptest::collection::vec(0usize..200, 0..60),
            a in 0usize..220,
            b in 0usize..220,
        ) {
            indices.sort_unstable();
            let tasks = rows(&indices);
            let got: Vec<usize> = slice_tasks_in_row_range(&tasks, a, b)
                .iter()
                .map(|t| t.row_index)
                .collect();
            let want: Vec<usize> = indices
                .iter()
                .copied()
                .filter(|&r| a <= r && r <= b)
                .collect();
            prop_assert_eq!(got, want);
        }
    }
}
