//! Drag-to-link: pull a line from a bar's end hotspot onto another bar.

use crate::backend::RelationRequest;
use crate::geometry::{Point, Rect};
use crate::layout::coords::bar_bounds;
use crate::layout::snap::TimeGrid;
use crate::model::{Relation, RelationType, Task, TaskId, Viewport};

/// Which end of the source bar the draft was pulled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEnd {
    Start,
    End,
}

/// Hotspot centres just outside each end of a drawn bar.
pub fn hotspots(bar: &Rect, radius: f64) -> [(LinkEnd, Point); 2] {
    let y = bar.center().y;
    [
        (LinkEnd::Start, Point::new(bar.left() - radius - 2.0, y)),
        (LinkEnd::End, Point::new(bar.right() + radius + 2.0, y)),
    ]
}

pub fn hotspot_at(
    task: &Task,
    viewport: &Viewport,
    grid: &TimeGrid,
    point: Point,
    radius: f64,
) -> Option<(LinkEnd, Point)> {
    let bar = bar_bounds(task, viewport, grid);
    hotspots(&bar, radius).into_iter().find(|(_, centre)| {
        let (dx, dy) = (point.x - centre.x, point.y - centre.y);
        dx * dx + dy * dy <= radius * radius
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkDraft {
    pub source: TaskId,
    pub end: LinkEnd,
    pub anchor: Point,
    pub cursor: Point,
    pub target: Option<TaskId>,
}

impl LinkDraft {
    pub fn new(source: TaskId, end: LinkEnd, anchor: Point) -> Self {
        Self {
            source,
            end,
            anchor,
            cursor: anchor,
            target: None,
        }
    }

    pub fn line(&self) -> (Point, Point) {
        (self.anchor, self.cursor)
    }

    /// The relation to ask the backend for, if the draft landed on a task
    /// that is not already related to the source.
    ///
    /// Pulling from the end of a bar makes the source the predecessor;
    /// pulling from the start makes it the successor.
    pub fn request(&self, relations: &[Relation]) -> Option<RelationRequest> {
        let target = self.target.filter(|t| *t != self.source)?;
        if relations.iter().any(|r| r.links(self.source, target)) {
            tracing::debug!(source = %self.source, %target, "tasks already related");
            return None;
        }
        let (from, to) = match self.end {
            LinkEnd::End => (self.source, target),
            LinkEnd::Start => (target, self.source),
        };
        Some(RelationRequest {
            from,
            to,
            relation_type: RelationType::Precedes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(end: LinkEnd, target: Option<i64>) -> LinkDraft {
        LinkDraft {
            target: target.map(TaskId),
            ..LinkDraft::new(TaskId(1), end, Point::default())
        }
    }

    #[test]
    fn test_hotspots_sit_outside_the_bar() {
        let bar = Rect::new(100.0, 10.0, 50.0, 12.0);
        let [(start, left), (end, right)] = hotspots(&bar, 6.0);
        assert_eq!((start, end), (LinkEnd::Start, LinkEnd::End));
        assert_eq!(left, Point::new(92.0, 16.0));
        assert_eq!(right, Point::new(158.0, 16.0));
    }

    #[test]
    fn test_direction_follows_pulled_end() {
        let forward = draft(LinkEnd::End, Some(2)).request(&[]).unwrap();
        assert_eq!((forward.from, forward.to), (TaskId(1), TaskId(2)));
        let backward = draft(LinkEnd::Start, Some(2)).request(&[]).unwrap();
        assert_eq!((backward.from, backward.to), (TaskId(2), TaskId(1)));
        assert_eq!(backward.relation_type, RelationType::Precedes);
    }

    #[test]
    fn test_rejected_drafts() {
        assert!(draft(LinkEnd::End, None).request(&[]).is_none());
        assert!(draft(LinkEnd::End, Some(1)).request(&[]).is_none());
        let existing = Relation::new(1, TaskId(2), TaskId(1), RelationType::Relates);
        assert!(draft(LinkEnd::End, Some(2)).request(&[existing]).is_none());
    }
}
