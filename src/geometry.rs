//! Plain pixel geometry shared by the coordinate model, the connector router
//! and drawing surfaces. Screen space, y grows downwards.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    pub fn expand(&self, by: f64) -> Rect {
        Rect::new(
            self.x - by,
            self.y - by,
            self.width + 2.0 * by,
            self.height + 2.0 * by,
        )
    }

    /// Does the axis-aligned segment `a`-`b` cross the interior of this rect.
    pub fn intersects_segment(&self, a: Point, b: Point) -> bool {
        let (min_x, max_x) = (a.x.min(b.x), a.x.max(b.x));
        let (min_y, max_y) = (a.y.min(b.y), a.y.max(b.y));
        min_x < self.right() && max_x > self.left() && min_y < self.bottom() && max_y > self.top()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_intersection_is_strict() {
        let r = Rect::new(10.0, 10.0, 20.0, 10.0);
        assert!(r.intersects_segment(Point::new(0.0, 15.0), Point::new(50.0, 15.0)));
        // Running along the top border does not cross the interior.
        assert!(!r.intersects_segment(Point::new(0.0, 10.0), Point::new(50.0, 10.0)));
        assert!(!r.intersects_segment(Point::new(5.0, 0.0), Point::new(5.0, 40.0)));
    }
}
