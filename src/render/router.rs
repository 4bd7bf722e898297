//! Orthogonal connector routing between task bars, plus a memo of routed
//! paths.
//!
//! A connector leaves the predecessor's right edge and enters the
//! successor's left edge. A handful of axis-aligned candidates are built
//! (a direct elbow and detours through the gaps above or below either bar)
//! and the one crossing the fewest other bars wins, then fewest bends, then
//! shortest.

use std::collections::HashMap;

use crate::geometry::{Point, Rect};

const EPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteParams {
    /// Horizontal run out of the source and into the target.
    pub stub: f64,
    /// Distance between a bar edge and a detour channel.
    pub clearance: f64,
    /// Layout revision the obstacles belong to.
    pub revision: u64,
}

impl Default for RouteParams {
    fn default() -> Self {
        Self {
            stub: 8.0,
            clearance: 4.0,
            revision: 0,
        }
    }
}

/// Route from `from` to `to` avoiding `obstacles` where possible. The
/// endpoints' own rects are never counted as obstacles.
pub fn route_connector(from: &Rect, to: &Rect, obstacles: &[Rect], params: &RouteParams) -> Vec<Point> {
    let start = Point::new(from.right(), from.center().y);
    let end = Point::new(to.left(), to.center().y);
    let exit = start.x + params.stub;
    let entry = end.x - params.stub;

    let mut candidates: Vec<Vec<Point>> = Vec::new();
    if entry >= exit {
        for mid in [(exit + entry) / 2.0, exit, entry] {
            candidates.push(vec![
                start,
                Point::new(mid, start.y),
                Point::new(mid, end.y),
                end,
            ]);
        }
    }
    let channels = [
        from.bottom() + params.clearance,
        from.top() - params.clearance,
        to.top() - params.clearance,
        to.bottom() + params.clearance,
    ];
    for y in channels {
        candidates.push(vec![
            start,
            Point::new(exit, start.y),
            Point::new(exit, y),
            Point::new(entry, y),
            Point::new(entry, end.y),
            end,
        ]);
    }

    let blocking: Vec<&Rect> = obstacles
        .iter()
        .filter(|r| *r != from && *r != to)
        .collect();

    candidates
        .into_iter()
        .map(|c| compress_path(&c))
        .min_by(|a, b| {
            let ka = (crossings(a, &blocking), bend_count(a));
            let kb = (crossings(b, &blocking), bend_count(b));
            ka.cmp(&kb)
                .then_with(|| path_length(a).total_cmp(&path_length(b)))
        })
        .unwrap_or_else(|| vec![start, end])
}

/// Drop repeated points and merge collinear runs.
pub fn compress_path(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if let Some(last) = out.last() {
            if (last.x - p.x).abs() <= EPS && (last.y - p.y).abs() <= EPS {
                continue;
            }
        }
        if out.len() >= 2 {
            let a = out[out.len() - 2];
            let b = out[out.len() - 1];
            let vertical = (a.x - b.x).abs() <= EPS && (b.x - p.x).abs() <= EPS;
            let horizontal = (a.y - b.y).abs() <= EPS && (b.y - p.y).abs() <= EPS;
            if vertical || horizontal {
                out.pop();
            }
        }
        out.push(p);
    }
    out
}

fn crossings(points: &[Point], obstacles: &[&Rect]) -> usize {
    points
        .windows(2)
        .map(|seg| {
            obstacles
                .iter()
                .filter(|r| r.intersects_segment(seg[0], seg[1]))
                .count()
        })
        .sum()
}

fn bend_count(points: &[Point]) -> usize {
    points.len().saturating_sub(2)
}

fn path_length(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|seg| (seg[1].x - seg[0].x).abs() + (seg[1].y - seg[0].y).abs())
        .sum()
}

/// Arrow head pointing along the last segment of `points`.
pub fn arrow_head(points: &[Point], size: f64) -> Option<[Point; 3]> {
    let [.., a, b] = points else {
        return None;
    };
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len = (dx * dx + dy * dy).sqrt();
    if len <= EPS {
        return None;
    }
    let (ux, uy) = (dx / len, dy / len);
    let base = Point::new(b.x - ux * size, b.y - uy * size);
    let half = size / 2.0;
    Some([
        *b,
        Point::new(base.x - uy * half, base.y + ux * half),
        Point::new(base.x + uy * half, base.y - ux * half),
    ])
}

struct CacheEntry {
    points: Vec<Point>,
    last_used: u64,
}

/// Memo of routed connectors keyed by endpoint geometry and parameters.
///
/// Entries unused for more than `max_age` frames are dropped at the start
/// of a frame; inserting into a full cache evicts the least recently used.
pub struct ConnectorCache {
    entries: HashMap<String, CacheEntry>,
    generation: u64,
    capacity: usize,
    max_age: u64,
    hits: u64,
    misses: u64,
}

impl ConnectorCache {
    pub fn new(capacity: usize, max_age: u64) -> Self {
        Self {
            entries: HashMap::new(),
            generation: 0,
            capacity: capacity.max(1),
            max_age,
            hits: 0,
            misses: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Advance the frame counter and evict stale entries.
    pub fn begin_frame(&mut self) {
        self.generation += 1;
        let (now, max_age) = (self.generation, self.max_age);
        let before = self.entries.len();
        self.entries
            .retain(|_, e| now.saturating_sub(e.last_used) <= max_age);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            tracing::trace!(evicted, remaining = self.entries.len(), "connector cache aged out");
        }
    }

    pub fn route(&mut self, from: &Rect, to: &Rect, obstacles: &[Rect], params: &RouteParams) -> Vec<Point> {
        let key = cache_key(from, to, params);
        let now = self.generation;
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.last_used = now;
            self.hits += 1;
            return entry.points.clone();
        }
        self.misses += 1;

        let points = route_connector(from, to, obstacles, params);
        if self.entries.len() >= self.capacity {
            self.evict_lru();
        }
        self.entries.insert(
            key,
            CacheEntry {
                points: points.clone(),
                last_used: now,
            },
        );
        points
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.last_used)
            .map(|(k, _)| k.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

fn cache_key(from: &Rect, to: &Rect, params: &RouteParams) -> String {
    format!(
        "{:.1},{:.1},{:.1},{:.1}>{:.1},{:.1},{:.1},{:.1}|{:.1},{:.1},{}",
        from.x,
        from.y,
        from.width,
        from.height,
        to.x,
        to.y,
        to.width,
        to.height,
        params.stub,
        params.clearance,
        params.revision
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bar(x: f64, row: usize, width: f64) -> Rect {
        Rect::new(x, row as f64 * 30.0 + 9.0, width, 12.0)
    }

    fn assert_orthogonal(points: &[Point]) {
        for seg in points.windows(2) {
            let (a, b) = (seg[0], seg[1]);
            assert!(
                (a.x - b.x).abs() <= EPS || (a.y - b.y).abs() <= EPS,
                "diagonal segment {a:?} -> {b:?}"
            );
        }
    }

    #[test]
    fn test_forward_elbow() {
        let from = bar(0.0, 0, 50.0);
        let to = bar(100.0, 2, 40.0);
        let path = route_connector(&from, &to, &[], &RouteParams::default());
        assert_orthogonal(&path);
        assert_eq!(path.first().copied(), Some(Point::new(50.0, 15.0)));
        assert_eq!(path.last().copied(), Some(Point::new(100.0, 75.0)));
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn test_avoids_intervening_bar() {
        let from = bar(0.0, 0, 50.0);
        let to = bar(100.0, 2, 40.0);
        // Sits under the midpoint elbow on the middle row.
        let blocker = bar(70.0, 1, 50.0);
        let path = route_connector(&from, &to, &[from, blocker, to], &RouteParams::default());
        assert_orthogonal(&path);
        let hits = path
            .windows(2)
            .filter(|s| blocker.intersects_segment(s[0], s[1]))
            .count();
        assert_eq!(hits, 0);
        assert_eq!(path[1].x, 58.0);
    }

    #[test]
    fn test_backward_link_uses_channel() {
        let from = bar(200.0, 0, 50.0);
        let to = bar(20.0, 3, 40.0);
        let path = route_connector(&from, &to, &[], &RouteParams::default());
        assert_orthogonal(&path);
        assert!(path.len() >= 5);
        assert_eq!(path.last().copied(), Some(Point::new(20.0, 105.0)));
    }

    #[test]
    fn test_arrow_head_points_right() {
        let head = arrow_head(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0)], 4.0);
        let Some([tip, a, b]) = head else {
            panic!("no arrow head");
        };
        assert_eq!(tip, Point::new(10.0, 0.0));
        assert!((a.x - 6.0).abs() < 1e-9 && (b.x - 6.0).abs() < 1e-9);
        assert!(arrow_head(&[Point::new(1.0, 1.0)], 4.0).is_none());
    }

    #[test]
    fn test_cache_hits_and_ages_out() {
        let mut cache = ConnectorCache::new(16, 2);
        let (a, b) = (bar(0.0, 0, 10.0), bar(50.0, 1, 10.0));
        let params = RouteParams::default();
        cache.begin_frame();
        let first = cache.route(&a, &b, &[], &params);
        let second = cache.route(&a, &b, &[], &params);
        assert_eq!(first, second);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));

        for _ in 0..3 {
            cache.begin_frame();
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_capacity_evicts_least_recent() {
        let mut cache = ConnectorCache::new(2, 100);
        let params = RouteParams::default();
        let target = bar(500.0, 5, 10.0);
        cache.begin_frame();
        cache.route(&bar(0.0, 0, 10.0), &target, &[], &params);
        cache.begin_frame();
        cache.route(&bar(0.0, 1, 10.0), &target, &[], &params);
        cache.begin_frame();
        cache.route(&bar(0.0, 2, 10.0), &target, &[], &params);
        assert_eq!(cache.len(), 2);
        // The first route was evicted, so asking again misses.
        cache.route(&bar(0.0, 0, 10.0), &target, &[], &params);
        assert_eq!(cache.misses(), 4);
    }

    #[test]
    fn test_revision_changes_key() {
        let mut cache = ConnectorCache::new(8, 10);
        let (a, b) = (bar(0.0, 0, 10.0), bar(50.0, 1, 10.0));
        cache.route(&a, &b, &[], &RouteParams::default());
        cache.route(
            &a,
            &b,
            &[],
            &RouteParams {
                revision: 1,
                ..RouteParams::default()
            },
        );
        assert_eq!(cache.misses(), 2);
    }

    proptest! {
        #[test]
        fn prop_routes_are_orthogonal(
            fx in -500.0f64..500.0, fw in 2.0f64..200.0, frow in 0usize..20,
            tx in -500.0f64..500.0, tw in 2.0f64..200.0, trow in 0usize..20,
            ox in -500.0f64..500.0, orow in 0usize..20,
        ) {
            let from = bar(fx, frow, fw);
            let to = bar(tx, trow, tw);
            let obstacle = bar(ox, orow, 60.0);
            let path = route_connector(&from, &to, &[obstacle], &RouteParams::default());
            prop_assert!(path.len() >= 2);
            for seg in path.windows(2) {
                prop_assert!((seg[0].x - seg[1].x).abs() <= EPS || (seg[0].y - seg[1].y).abs() <= EPS);
            }
            prop_assert_eq!(path[0], Point::new(from.right(), from.center().y));
            prop_assert_eq!(path[path.len() - 1], Point::new(to.left(), to.center().y));
        }
    }
}
