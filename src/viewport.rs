//! Scroll clamping and anchor-preserving zoom for the [`Viewport`].

use crate::layout::coords::time_to_x;
use crate::model::{Viewport, ViewportPatch, DAY_MS};

/// Scale limits for manual rescaling, in pixels per millisecond.
pub const MIN_SCALE: f64 = 0.5 / DAY_MS as f64;
pub const MAX_SCALE: f64 = 200.0 * 24.0 / DAY_MS as f64;

/// How far right the user may scroll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollLimits {
    /// Furthest due date among the tasks, if any.
    pub max_due: Option<i64>,
    /// Extra time shown after `max_due`.
    pub padding_ms: f64,
}

impl ScrollLimits {
    pub fn unbounded() -> Self {
        Self {
            max_due: None,
            padding_ms: 0.0,
        }
    }
}

/// Largest `scroll_x` that keeps content plus padding reachable.
pub fn max_scroll_x(viewport: &Viewport, limits: &ScrollLimits) -> Option<f64> {
    limits
        .max_due
        .map(|due| (time_to_x(due as f64 + limits.padding_ms, viewport) - viewport.width).max(0.0))
}

/// Bring a viewport back inside its limits.
///
/// Negative `scroll_x` moves `start_date` earlier by the overflow so the
/// timeline origin travels instead of showing "negative" time.
pub fn clamp_viewport(viewport: &mut Viewport, row_count: usize, limits: &ScrollLimits) {
    if !viewport.scroll_x.is_finite() {
        viewport.scroll_x = 0.0;
    }
    if viewport.scroll_x < 0.0 {
        viewport.start_date += viewport.scroll_x / viewport.scale;
        viewport.scroll_x = 0.0;
    }
    if let Some(max) = max_scroll_x(viewport, limits) {
        viewport.scroll_x = viewport.scroll_x.min(max);
    }

    let max_y = viewport.max_scroll_y(row_count);
    viewport.scroll_y = if viewport.scroll_y.is_finite() {
        viewport.scroll_y.clamp(0.0, max_y)
    } else {
        0.0
    };
}

/// Clamp a freshly rescaled viewport without moving what is on screen.
///
/// Zooming out near the right limit can leave `scroll_x` past a limit that
/// no origin satisfies; the origin is then rebased onto the left edge.
pub fn clamp_rescaled(viewport: &mut Viewport, row_count: usize, limits: &ScrollLimits) {
    if max_scroll_x(viewport, limits).is_some_and(|max| viewport.scroll_x > max) {
        viewport.start_date = viewport.visible_start();
        viewport.scroll_x = 0.0;
    }
    clamp_viewport(viewport, row_count, limits);
}

/// Apply a partial update and clamp the result.
pub fn update_viewport(
    viewport: &Viewport,
    patch: &ViewportPatch,
    row_count: usize,
    limits: &ScrollLimits,
) -> Viewport {
    let mut next = *viewport;
    patch.apply_raw(&mut next);
    clamp_viewport(&mut next, row_count, limits);
    next
}

/// Change the scale keeping the instant under screen x `anchor_px` in place.
/// If that needs a negative scroll, the origin moves earlier by the shortfall
/// plus `safety_ms`.
pub fn rescale_around(viewport: &Viewport, new_scale: f64, anchor_px: f64, safety_ms: f64) -> Viewport {
    if !(new_scale.is_finite() && new_scale > 0.0) {
        return *viewport;
    }
    let anchor_time = viewport.start_date + (viewport.scroll_x + anchor_px) / viewport.scale;
    let mut next = *viewport;
    next.scale = new_scale;
    next.scroll_x = (anchor_time - next.start_date) * new_scale - anchor_px;
    if next.scroll_x < 0.0 {
        next.start_date -= -next.scroll_x / new_scale + safety_ms;
        next.scroll_x = (anchor_time - next.start_date) * new_scale - anchor_px;
    }
    next
}

/// Zoom keeping the centred instant fixed.
pub fn rescale_centered(viewport: &Viewport, new_scale: f64, safety_ms: f64) -> Viewport {
    rescale_around(viewport, new_scale, viewport.width / 2.0, safety_ms)
}

/// Zoom keeping the left screen edge fixed.
pub fn rescale_left_anchored(viewport: &Viewport, new_scale: f64, safety_ms: f64) -> Viewport {
    rescale_around(viewport, new_scale, 0.0, safety_ms)
}

/// Where a task should land when the user jumps to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTarget {
    pub start_date: i64,
    pub due_date: i64,
    pub row_index: Option<usize>,
}

/// Centre a task horizontally (and vertically when it has a row). When the
/// task begins before the visible window the origin first moves `buffer_ms`
/// before it.
pub fn scroll_to_task(
    viewport: &Viewport,
    target: &ScrollTarget,
    buffer_ms: f64,
    row_count: usize,
    limits: &ScrollLimits,
) -> Viewport {
    let mut next = *viewport;
    let start = target.start_date as f64;
    if start < next.visible_start() {
        next.start_date = next.start_date.min(start) - buffer_ms;
    }
    let mid = (start + target.due_date as f64) / 2.0;
    next.scroll_x = time_to_x(mid, &next) - next.width / 2.0;
    if let Some(row) = target.row_index {
        next.scroll_y = row as f64 * next.row_height - (next.height - next.row_height) / 2.0;
    }
    clamp_viewport(&mut next, row_count, limits);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vp() -> Viewport {
        Viewport {
            start_date: 1000.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            scale: 1.0,
            width: 400.0,
            height: 300.0,
            row_height: 30.0,
        }
    }

    #[test]
    fn test_overscroll_moves_origin() {
        let next = update_viewport(
            &vp(),
            &ViewportPatch {
                scroll_x: Some(-50.0),
                ..Default::default()
            },
            0,
            &ScrollLimits::unbounded(),
        );
        assert_eq!(next.scroll_x, 0.0);
        assert_eq!(next.start_date, 950.0);
    }

    #[test]
    fn test_overscroll_respects_scale() {
        let start = Viewport { scale: 0.5, ..vp() };
        let next = update_viewport(
            &start,
            &ViewportPatch {
                scroll_x: Some(-10.0),
                ..Default::default()
            },
            0,
            &ScrollLimits::unbounded(),
        );
        assert_eq!(next.start_date, 980.0);
    }

    #[test]
    fn test_scroll_y_clamped_to_content() {
        let patch = ViewportPatch {
            scroll_y: Some(1.0e9),
            ..Default::default()
        };
        let next = update_viewport(&vp(), &patch, 100, &ScrollLimits::unbounded());
        assert_eq!(next.scroll_y, 100.0 * 30.0 - 300.0);

        let few = update_viewport(&vp(), &patch, 3, &ScrollLimits::unbounded());
        assert_eq!(few.scroll_y, 0.0);

        let negative = ViewportPatch {
            scroll_y: Some(-5.0),
            ..Default::default()
        };
        assert_eq!(update_viewport(&vp(), &negative, 100, &ScrollLimits::unbounded()).scroll_y, 0.0);
    }

    #[test]
    fn test_scroll_x_capped_past_last_due() {
        let limits = ScrollLimits {
            max_due: Some(2000),
            padding_ms: 500.0,
        };
        let patch = ViewportPatch {
            scroll_x: Some(10_000.0),
            ..Default::default()
        };
        let next = update_viewport(&vp(), &patch, 0, &limits);
        // (2000 + 500 - 1000) * 1.0 - 400
        assert_eq!(next.scroll_x, 1100.0);
    }

    #[test]
    fn test_rescaled_clamp_keeps_left_edge_past_right_limit() {
        let limits = ScrollLimits {
            max_due: Some(2000),
            padding_ms: 500.0,
        };
        let start = Viewport { scroll_x: 1100.0, ..vp() };
        let mut zoomed = rescale_left_anchored(&start, 0.1, 0.0);
        assert!(zoomed.scroll_x > max_scroll_x(&zoomed, &limits).unwrap());

        clamp_rescaled(&mut zoomed, 0, &limits);
        assert_eq!(zoomed.scroll_x, 0.0);
        assert!((zoomed.visible_start() - start.visible_start()).abs() < 1e-9);

        // A later plain clamp leaves it alone.
        let again = update_viewport(&zoomed, &ViewportPatch::size(400.0, 300.0), 0, &limits);
        assert_eq!(again, zoomed);
    }

    #[test]
    fn test_center_preserved_on_rescale() {
        let start = Viewport { scroll_x: 600.0, ..vp() };
        let center_before = start.start_date + (start.scroll_x + start.width / 2.0) / start.scale;
        let next = rescale_centered(&start, 4.0, 0.0);
        let center_after = next.start_date + (next.scroll_x + next.width / 2.0) / next.scale;
        assert!((center_before - center_after).abs() < 1e-9);
    }

    #[test]
    fn test_left_edge_preserved_with_origin_shift() {
        let start = Viewport { scroll_x: 10.0, ..vp() };
        let next = rescale_left_anchored(&start, 0.01, 5.0);
        assert!(next.scroll_x >= 0.0);
        assert!((start.visible_start() - next.visible_start()).abs() < 1e-6);

        // Zooming out around the centre needs time left of the origin.
        let centered = rescale_centered(&start, 0.01, 5.0);
        assert!(centered.start_date < start.start_date);
        assert!(centered.scroll_x >= 0.0);
    }

    #[test]
    fn test_scroll_to_earlier_task_moves_origin() {
        let target = ScrollTarget {
            start_date: 200,
            due_date: 400,
            row_index: Some(20),
        };
        let next = scroll_to_task(&vp(), &target, 100.0, 50, &ScrollLimits::unbounded());
        assert!(next.start_date <= 100.0);
        let center_time = next.start_date + (next.scroll_x + next.width / 2.0) / next.scale;
        assert!((center_time - 300.0).abs() < 1e-9 || next.scroll_x == 0.0);
        assert_eq!(next.scroll_y, 20.0 * 30.0 - (300.0 - 30.0) / 2.0);
    }

    proptest! {
        #[test]
        fn prop_rescale_keeps_anchor_and_non_negative_scroll(
            scroll_x in 0.0f64..5_000.0,
            scale in 1.0e-6f64..1.0,
            new_scale in 1.0e-6f64..1.0,
            anchor in 0.0f64..400.0,
        ) {
            let start = Viewport { scroll_x, scale, ..vp() };
            let before = start.start_date + (start.scroll_x + anchor) / start.scale;
            let next = rescale_around(&start, new_scale, anchor, 5.0);
            let after = next.start_date + (next.scroll_x + anchor) / next.scale;
            prop_assert!(next.scroll_x >= -1e-6);
            prop_assert!((before - after).abs() <= 1e-6 * before.abs().max(1.0));
        }
    }
}
