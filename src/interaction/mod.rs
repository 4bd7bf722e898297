//! Pointer and keyboard gestures on the chart.
//!
//! [`Interaction`] turns raw input into store actions. A gesture in flight
//! only touches local state; the backend is asked once, when the pointer is
//! released, through the [`GestureOutcome`] handed back to the host.

pub mod drag;
pub mod hit_test;
pub mod keyboard;
pub mod link;

pub use drag::{EditGesture, EditMode};
pub use hit_test::{task_at, HitRegion, TaskHit};
pub use keyboard::Key;
pub use link::{LinkDraft, LinkEnd};

use crate::backend::RelationRequest;
use crate::config::GanttConfig;
use crate::geometry::Point;
use crate::model::{TaskId, TaskPatch};
use crate::notification::{NoticeKind, Notification};
use crate::store::{GanttState, GanttStore, PendingSave};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionSettings {
    pub edge_hit_px: f64,
    pub link_hotspot_radius: f64,
    pub pan_step_px: f64,
}

impl InteractionSettings {
    pub fn from_config(config: &GanttConfig) -> Self {
        Self {
            edge_hit_px: config.edge_hit_px,
            link_hotspot_radius: config.link_hotspot_radius,
            pan_step_px: config.pan_step_px,
        }
    }
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self::from_config(&GanttConfig::default())
    }
}

#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Pan {
        last: Point,
    },
    Edit(EditGesture),
    Link(LinkDraft),
}

/// What a released gesture asks the host to persist.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    Save(PendingSave),
    Link(RelationRequest),
}

#[derive(Debug, Clone, Default)]
pub struct Interaction {
    gesture: Gesture,
    settings: InteractionSettings,
}

impl Interaction {
    pub fn new(settings: InteractionSettings) -> Self {
        Self {
            gesture: Gesture::Idle,
            settings,
        }
    }

    pub fn from_config(config: &GanttConfig) -> Self {
        Self::new(InteractionSettings::from_config(config))
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.gesture, Gesture::Idle)
    }

    /// Line of the link being drawn, for the renderer.
    pub fn link_line(&self) -> Option<(Point, Point)> {
        match &self.gesture {
            Gesture::Link(draft) => Some(draft.line()),
            _ => None,
        }
    }

    fn task_under(&self, state: &GanttState, pos: Point) -> Option<TaskHit> {
        task_under(&self.settings, state, pos)
    }

    pub fn pointer_down(&mut self, store: &mut GanttStore, pos: Point) {
        if !self.is_idle() {
            return;
        }
        let state = store.state();

        if let Some((source, end, centre)) = hotspot_under(&self.settings, &state, pos) {
            tracing::debug!(task = %source, ?end, "link draft started");
            self.gesture = Gesture::Link(LinkDraft::new(source, end, centre));
            return;
        }

        let Some(hit) = self.task_under(&state, pos) else {
            store.select_task(None);
            self.gesture = Gesture::Pan { last: pos };
            return;
        };
        store.select_task(Some(hit.task_id));
        let Some(task) = state.task(hit.task_id) else {
            return;
        };
        if task.has_children {
            store.notify(Notification::warning(NoticeKind::ParentNotEditable(task.id)));
            return;
        }
        if !task.editable {
            store.notify(Notification::warning(NoticeKind::ReadOnly(task.id)));
            return;
        }
        let mode = EditMode::from(hit.region);
        tracing::debug!(task = %task.id, ?mode, "edit started");
        self.gesture = Gesture::Edit(EditGesture::new(
            mode,
            task.id,
            pos.x,
            (task.start_date, task.due_date),
            store.snapshot(),
        ));
    }

    pub fn pointer_move(&mut self, store: &mut GanttStore, pos: Point) {
        let state = store.state();
        let settings = self.settings;
        match &mut self.gesture {
            Gesture::Idle => {
                let over = task_under(&settings, &state, pos).map(|h| h.task_id);
                // Keep the hover while the pointer is on a link hotspot,
                // which lies just outside the bar.
                let hovered = over.or_else(|| hotspot_under(&settings, &state, pos).map(|(id, ..)| id));
                store.set_hovered_task(hovered);
            }
            Gesture::Pan { last } => {
                let (dx, dy) = (pos.x - last.x, pos.y - last.y);
                *last = pos;
                store.scroll_by(-dx, -dy);
            }
            Gesture::Edit(edit) => {
                let Some(dates) = edit.dates_at(pos.x, state.viewport.scale, &state.grid) else {
                    return;
                };
                if dates != edit.last {
                    edit.last = dates;
                    store.update_task(edit.task_id, &TaskPatch::dates(dates.0, dates.1));
                }
            }
            Gesture::Link(draft) => {
                draft.cursor = pos;
                draft.target = task_under(&settings, &state, pos)
                    .map(|h| h.task_id)
                    .filter(|id| *id != draft.source);
            }
        }
    }

    /// Finish the current gesture. A release with nothing in flight is a
    /// no-op.
    pub fn pointer_up(&mut self, store: &mut GanttStore, pos: Point) -> Option<GestureOutcome> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle | Gesture::Pan { .. } => None,
            Gesture::Edit(edit) => {
                if !edit.changed() {
                    return None;
                }
                let task = store.current().source_task(edit.task_id)?.clone();
                Some(GestureOutcome::Save(PendingSave {
                    task,
                    snapshot: edit.snapshot,
                }))
            }
            Gesture::Link(mut draft) => {
                let state = store.state();
                draft.cursor = pos;
                draft.target = self
                    .task_under(&state, pos)
                    .map(|h| h.task_id)
                    .filter(|id| *id != draft.source);
                draft.request(&state.relations).map(GestureOutcome::Link)
            }
        }
    }

    /// Pointer left the chart.
    pub fn pointer_leave(&mut self, store: &mut GanttStore) {
        if self.is_idle() {
            store.set_hovered_task(None);
        }
    }

    /// Abandon the current gesture, undoing any live edit.
    pub fn cancel(&mut self, store: &mut GanttStore) {
        if let Gesture::Edit(edit) = std::mem::take(&mut self.gesture) {
            if edit.changed() {
                store.restore_snapshot(edit.snapshot);
            }
        }
    }

    pub fn key(&mut self, store: &mut GanttStore, key: Key) {
        match key {
            Key::Escape => {
                self.cancel(store);
                store.select_task(None);
            }
            Key::ArrowUp => keyboard::move_selection(store, -1),
            Key::ArrowDown => keyboard::move_selection(store, 1),
            Key::ArrowLeft => store.scroll_by(-self.settings.pan_step_px, 0.0),
            Key::ArrowRight => store.scroll_by(self.settings.pan_step_px, 0.0),
        }
    }
}

fn task_under(settings: &InteractionSettings, state: &GanttState, pos: Point) -> Option<TaskHit> {
    task_at(&state.tasks, &state.viewport, &state.grid, pos, settings.edge_hit_px)
}

/// Hotspot of the hovered task under `pos`, if any.
fn hotspot_under(
    settings: &InteractionSettings,
    state: &GanttState,
    pos: Point,
) -> Option<(TaskId, LinkEnd, Point)> {
    let task = state.hovered_task_id.and_then(|id| state.task(id))?;
    link::hotspot_at(task, &state.viewport, &state.grid, pos, settings.link_hotspot_radius)
        .map(|(end, centre)| (task.id, end, centre))
}
