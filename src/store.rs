//! The single owner of timeline state.
//!
//! Every action builds a complete new [`GanttState`] (filter, layout and
//! viewport clamp included) and swaps it in atomically, so a renderer never
//! sees a half-updated snapshot. Listeners run after each swap. Task lists
//! are shared through `Arc`, which makes a drag's rollback snapshot a
//! pointer copy; the first edit afterwards clones the list once.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::backend::{GanttBackend, RelationRequest};
use crate::config::GanttConfig;
use crate::error::{BackendError, SaveError};
use crate::layout::builder::{build_layout, LayoutInput, ViewOptions};
use crate::layout::filter::{filter_tasks, AssigneeFilter, FilterOptions};
use crate::layout::snap::TimeGrid;
use crate::layout::sort::{SortConfig, SortField};
use crate::model::schedule::{propagate_dependencies, recalculate_parent_dates};
use crate::model::{
    Dataset, LayoutRow, ProjectId, Relation, RelationId, Task, TaskId, TaskPatch, Version, VersionId,
    Viewport, ViewportPatch, ZoomLevel,
};
use crate::notification::{NoticeKind, NoticeLevel, Notification};
use crate::viewport::{
    clamp_rescaled, clamp_viewport, rescale_around, rescale_centered, rescale_left_anchored, scroll_to_task,
    update_viewport, ScrollLimits, ScrollTarget, MAX_SCALE, MIN_SCALE,
};

/// Task list captured when a gesture starts.
pub type TaskSnapshot = Arc<Vec<Task>>;

/// A finished edit gesture waiting for the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSave {
    /// The task as it should be persisted, carrying the lock version the
    /// client last saw.
    pub task: Task,
    pub snapshot: TaskSnapshot,
}

#[derive(Debug, Clone)]
pub struct GanttState {
    /// Every task, unfiltered, in load order.
    pub all_tasks: Arc<Vec<Task>>,
    pub relations: Arc<Vec<Relation>>,
    pub versions: Arc<Vec<Version>>,
    /// Filtered and laid-out tasks in row order.
    pub tasks: Arc<Vec<Task>>,
    pub layout_rows: Arc<Vec<LayoutRow>>,
    pub row_count: usize,
    pub viewport: Viewport,
    pub zoom: ZoomLevel,
    /// Scales the user chose by hand, per zoom level.
    pub zoom_overrides: HashMap<ZoomLevel, f64>,
    pub grid: TimeGrid,
    pub filter: FilterOptions,
    pub view: ViewOptions,
    pub selected_task_id: Option<TaskId>,
    pub hovered_task_id: Option<TaskId>,
    pub revision: u64,
    /// Bumped only when tasks or relations are laid out again; cached
    /// connector routes are keyed on it.
    pub layout_generation: u64,
}

impl GanttState {
    /// A laid-out (visible) task.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Any known task, visible or not.
    pub fn source_task(&self, id: TaskId) -> Option<&Task> {
        self.all_tasks.iter().find(|t| t.id == id)
    }

    pub fn max_due_date(&self) -> Option<i64> {
        self.all_tasks.iter().map(|t| t.due_date).max()
    }

    /// Ids of tasks that have at least one child.
    pub fn parent_ids(&self) -> HashSet<TaskId> {
        let known: HashSet<TaskId> = self.all_tasks.iter().map(|t| t.id).collect();
        self.all_tasks
            .iter()
            .filter_map(|t| t.parent_id)
            .filter(|p| known.contains(p))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// How much of the derived state an action invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refresh {
    /// Filter and lay out again.
    Layout,
    /// Only re-clamp the viewport.
    Viewport,
    /// Re-clamp without the right-edge limit so the zoom anchor holds.
    Zoom,
}

type Listener = Box<dyn FnMut(&GanttState)>;

pub struct GanttStore {
    state: Arc<GanttState>,
    config: GanttConfig,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    notifications: VecDeque<Notification>,
}

impl GanttStore {
    pub fn new(config: GanttConfig) -> Self {
        let zoom = config.default_zoom;
        let state = GanttState {
            all_tasks: Arc::default(),
            relations: Arc::default(),
            versions: Arc::default(),
            tasks: Arc::default(),
            layout_rows: Arc::default(),
            row_count: 0,
            viewport: Viewport::new(0.0, zoom, 800.0, 600.0, config.row_height),
            zoom,
            zoom_overrides: HashMap::new(),
            grid: TimeGrid::new(zoom.snap_unit(), config.display_offset()),
            filter: FilterOptions::default(),
            view: ViewOptions::default(),
            selected_task_id: None,
            hovered_task_id: None,
            revision: 0,
            layout_generation: 0,
        };
        Self {
            state: Arc::new(state),
            config,
            listeners: Vec::new(),
            next_listener: 0,
            notifications: VecDeque::new(),
        }
    }

    pub fn with_dataset(config: GanttConfig, dataset: Dataset) -> Self {
        let mut store = Self::new(config);
        store.load(dataset);
        store
    }

    pub fn state(&self) -> Arc<GanttState> {
        Arc::clone(&self.state)
    }

    pub fn current(&self) -> &GanttState {
        &self.state
    }

    pub fn config(&self) -> &GanttConfig {
        &self.config
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GanttState) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    pub fn notify(&mut self, notification: Notification) {
        match notification.level {
            NoticeLevel::Warning | NoticeLevel::Error => {
                tracing::warn!(notice = %notification, "user notification")
            }
            NoticeLevel::Info | NoticeLevel::Success => {
                tracing::info!(notice = %notification, "user notification")
            }
        }
        self.notifications.push_back(notification);
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    fn update(&mut self, refresh: Refresh, f: impl FnOnce(&mut GanttState)) {
        let mut next = (*self.state).clone();
        f(&mut next);
        match refresh {
            Refresh::Layout => {
                Self::rebuild(&self.config, &mut next);
                next.layout_generation += 1;
            }
            Refresh::Viewport => Self::clamp(&self.config, &mut next),
            Refresh::Zoom => {
                let limits = Self::limits(&self.config, &next);
                clamp_rescaled(&mut next.viewport, next.row_count, &limits);
            }
        }
        next.revision = self.state.revision + 1;
        self.state = Arc::new(next);
        for (_, listener) in &mut self.listeners {
            listener(&self.state);
        }
    }

    fn limits(config: &GanttConfig, state: &GanttState) -> ScrollLimits {
        ScrollLimits {
            max_due: state.max_due_date(),
            padding_ms: config.scroll_padding_ms(),
        }
    }

    fn clamp(config: &GanttConfig, next: &mut GanttState) {
        let limits = Self::limits(config, next);
        clamp_viewport(&mut next.viewport, next.row_count, &limits);
    }

    fn rebuild(config: &GanttConfig, next: &mut GanttState) {
        let layout = {
            let filtered = filter_tasks(&next.all_tasks, &next.filter, config.current_project_id);
            build_layout(LayoutInput {
                tasks: &filtered,
                all_tasks: &next.all_tasks,
                relations: &next.relations,
                versions: &next.versions,
                options: &next.view,
            })
        };
        next.row_count = layout.rows.len();
        next.tasks = Arc::new(layout.tasks);
        next.layout_rows = Arc::new(layout.rows);
        Self::clamp(config, next);
    }

    // ---- data ----------------------------------------------------------

    /// Replace everything with a freshly fetched dataset.
    pub fn load(&mut self, dataset: Dataset) {
        let first_start = dataset.tasks.iter().map(|t| t.start_date).min();
        let buffer = self.config.scroll_to_task_buffer_ms();
        tracing::info!(
            tasks = dataset.tasks.len(),
            relations = dataset.relations.len(),
            versions = dataset.versions.len(),
            "dataset loaded"
        );
        self.update(Refresh::Layout, move |next| {
            next.all_tasks = Arc::new(dataset.tasks);
            next.relations = Arc::new(dataset.relations);
            next.versions = Arc::new(dataset.versions);
            if let Some(start) = first_start {
                next.viewport.start_date = start as f64 - buffer;
                next.viewport.scroll_x = 0.0;
            }
            next.viewport.scroll_y = 0.0;
            let known = |id: &TaskId| next.all_tasks.iter().any(|t| t.id == *id);
            next.selected_task_id = next.selected_task_id.filter(known);
            next.hovered_task_id = next.hovered_task_id.filter(known);
        });
    }

    pub fn reload(&mut self, backend: &mut dyn GanttBackend) {
        match backend.fetch_all() {
            Ok(dataset) => self.load(dataset),
            Err(err) => self.notify(Notification::new(
                NoticeLevel::Error,
                NoticeKind::LoadFailed(err.to_string()),
            )),
        }
    }

    /// Apply an edit, then push dependent successors and re-span parents.
    pub fn update_task(&mut self, id: TaskId, patch: &TaskPatch) {
        let Some(old_parent) = self.state.source_task(id).map(|t| t.parent_id) else {
            tracing::debug!(task = %id, "update for unknown task ignored");
            return;
        };
        self.update(Refresh::Layout, |next| {
            let relations = Arc::clone(&next.relations);
            let tasks = Arc::make_mut(&mut next.all_tasks);
            let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
                return;
            };
            patch.apply(task);
            if !patch.touches_schedule() {
                return;
            }
            let mut changed = vec![id];
            changed.extend(propagate_dependencies(tasks, &relations, &[id]));
            // A re-parented task leaves its old parent to be re-spanned.
            if let Some(old) = old_parent.filter(|_| patch.parent_id.is_some()) {
                if let Some(sibling) = tasks.iter().find(|t| t.parent_id == Some(old)) {
                    changed.push(sibling.id);
                }
            }
            recalculate_parent_dates(tasks, &changed);
        });
    }

    /// Drop a task, its descendants and every relation touching them.
    pub fn remove_task(&mut self, id: TaskId) {
        let Some(parent) = self.state.source_task(id).map(|t| t.parent_id) else {
            return;
        };
        self.update(Refresh::Layout, |next| {
            let mut doomed: HashSet<TaskId> = HashSet::from([id]);
            loop {
                let before = doomed.len();
                for t in next.all_tasks.iter() {
                    if t.parent_id.is_some_and(|p| doomed.contains(&p)) {
                        doomed.insert(t.id);
                    }
                }
                if doomed.len() == before {
                    break;
                }
            }
            let tasks = Arc::make_mut(&mut next.all_tasks);
            tasks.retain(|t| !doomed.contains(&t.id));
            let sibling = parent.and_then(|p| {
                tasks
                    .iter()
                    .find(|t| t.parent_id == Some(p))
                    .map(|t| t.id)
            });
            if let Some(sibling) = sibling {
                recalculate_parent_dates(tasks, &[sibling]);
            }
            Arc::make_mut(&mut next.relations)
                .retain(|r| !doomed.contains(&r.from) && !doomed.contains(&r.to));
            if next.selected_task_id.is_some_and(|s| doomed.contains(&s)) {
                next.selected_task_id = None;
            }
            if next.hovered_task_id.is_some_and(|h| doomed.contains(&h)) {
                next.hovered_task_id = None;
            }
            tracing::debug!(removed = doomed.len(), "tasks removed");
        });
    }

    /// Pointer to the current task list, for rollback.
    pub fn snapshot(&self) -> TaskSnapshot {
        Arc::clone(&self.state.all_tasks)
    }

    pub fn restore_snapshot(&mut self, snapshot: TaskSnapshot) {
        self.update(Refresh::Layout, move |next| next.all_tasks = snapshot);
    }

    /// Merge the backend's answer for a finished gesture. Any failure puts
    /// every task back the way it was when the gesture began.
    pub fn resolve_save(&mut self, pending: PendingSave, result: Result<i64, SaveError>) {
        let id = pending.task.id;
        match result {
            Ok(lock_version) => {
                tracing::info!(task = %id, lock_version, "save confirmed");
                self.update(Refresh::Layout, |next| {
                    if let Some(task) = Arc::make_mut(&mut next.all_tasks)
                        .iter_mut()
                        .find(|t| t.id == id)
                    {
                        task.lock_version = lock_version;
                    }
                });
            }
            Err(err) => {
                let kind = match err {
                    SaveError::Conflict => NoticeKind::SaveConflict(id),
                    SaveError::Failed(reason) => NoticeKind::SaveFailed { task: id, reason },
                };
                self.restore_snapshot(pending.snapshot);
                self.notify(Notification::warning(kind));
            }
        }
    }

    /// Send a finished gesture to `backend` and merge the answer.
    pub fn commit_save(&mut self, pending: PendingSave, backend: &mut dyn GanttBackend) {
        let result = backend.update_task(&pending.task).map_err(SaveError::from);
        self.resolve_save(pending, result);
    }

    pub fn resolve_relation_created(
        &mut self,
        request: RelationRequest,
        result: Result<Relation, BackendError>,
    ) {
        match result {
            Ok(relation) => {
                self.update(Refresh::Layout, |next| {
                    let relations = Arc::make_mut(&mut next.relations);
                    if !relations.iter().any(|r| r.id == relation.id) {
                        relations.push(relation);
                    }
                });
                self.notify(Notification::new(
                    NoticeLevel::Success,
                    NoticeKind::RelationCreated {
                        from: request.from,
                        to: request.to,
                    },
                ));
            }
            Err(err) => self.notify(Notification::new(
                NoticeLevel::Error,
                NoticeKind::RelationFailed(err.to_string()),
            )),
        }
    }

    pub fn create_relation(&mut self, request: RelationRequest, backend: &mut dyn GanttBackend) {
        let result = backend.create_relation(request.from, request.to, request.relation_type);
        self.resolve_relation_created(request, result);
    }

    pub fn delete_relation(&mut self, id: RelationId, backend: &mut dyn GanttBackend) {
        match backend.delete_relation(id) {
            Ok(()) => {
                self.update(Refresh::Layout, |next| {
                    Arc::make_mut(&mut next.relations).retain(|r| r.id != id);
                });
                self.notify(Notification::new(NoticeLevel::Info, NoticeKind::RelationDeleted(id)));
            }
            Err(err) => self.notify(Notification::new(
                NoticeLevel::Error,
                NoticeKind::RelationDeleteFailed {
                    id,
                    reason: err.to_string(),
                },
            )),
        }
    }

    // ---- filters -------------------------------------------------------

    /// Replace the filter. Swapping one inactive filter for another skips
    /// the rebuild, so typing blanks into an empty search box is free.
    pub fn set_filter(&mut self, filter: FilterOptions) {
        if filter == self.state.filter {
            return;
        }
        let current_project = self.config.current_project_id;
        let refresh = if filter.is_active(current_project) || self.state.filter.is_active(current_project) {
            Refresh::Layout
        } else {
            Refresh::Viewport
        };
        self.update(refresh, move |next| next.filter = filter);
    }

    fn edit_filter(&mut self, f: impl FnOnce(&mut FilterOptions)) {
        let mut filter = self.state.filter.clone();
        f(&mut filter);
        self.set_filter(filter);
    }

    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.edit_filter(move |f| f.text = text);
    }

    pub fn set_assignee_filter(&mut self, assignees: BTreeSet<AssigneeFilter>) {
        self.edit_filter(move |f| f.assignees = assignees);
    }

    pub fn toggle_assignee_filter(&mut self, assignee: AssigneeFilter) {
        self.edit_filter(move |f| {
            if !f.assignees.remove(&assignee) {
                f.assignees.insert(assignee);
            }
        });
    }

    pub fn set_project_filter(&mut self, projects: BTreeSet<ProjectId>) {
        self.edit_filter(move |f| f.projects = projects);
    }

    pub fn set_version_filter(&mut self, versions: BTreeSet<VersionId>) {
        self.edit_filter(move |f| f.versions = versions);
    }

    pub fn set_only_current_project(&mut self, only: bool) {
        self.edit_filter(move |f| f.only_current_project = only);
    }

    pub fn clear_filters(&mut self) {
        self.set_filter(FilterOptions::default());
    }

    // ---- view options --------------------------------------------------

    fn edit_view(&mut self, f: impl FnOnce(&mut ViewOptions)) {
        let mut view = self.state.view.clone();
        f(&mut view);
        if view != self.state.view {
            self.update(Refresh::Layout, move |next| next.view = view);
        }
    }

    pub fn set_group_by_project(&mut self, on: bool) {
        self.edit_view(|v| v.group_by_project = on);
    }

    pub fn set_show_versions(&mut self, on: bool) {
        self.edit_view(|v| v.show_versions = on);
    }

    pub fn set_organize_by_dependency(&mut self, on: bool) {
        self.edit_view(|v| v.organize_by_dependency = on);
    }

    pub fn set_sort(&mut self, sort: Option<SortConfig>) {
        self.edit_view(|v| v.sort = sort);
    }

    /// Ascending, then descending, then unsorted.
    pub fn toggle_sort(&mut self, field: SortField) {
        self.edit_view(|v| v.sort = SortConfig::toggle(v.sort, field));
    }

    pub fn set_task_expanded(&mut self, id: TaskId, expanded: bool) {
        self.edit_view(|v| v.tasks.set(id, expanded));
    }

    pub fn toggle_task_expanded(&mut self, id: TaskId) {
        self.edit_view(|v| v.tasks.toggle(id));
    }

    pub fn toggle_project_expanded(&mut self, id: ProjectId) {
        self.edit_view(|v| v.projects.toggle(id));
    }

    pub fn toggle_version_expanded(&mut self, id: VersionId) {
        self.edit_view(|v| v.versions.toggle(id));
    }

    pub fn expand_all(&mut self) {
        self.edit_view(|v| {
            v.tasks.expand_all();
            v.projects.expand_all();
            v.versions.expand_all();
        });
    }

    /// Collapse every parent task; groups stay open.
    pub fn collapse_all(&mut self) {
        let parents = self.state.parent_ids();
        self.edit_view(move |v| v.tasks.collapse_all(parents));
    }

    /// Collapse everything if any parent is open, otherwise expand all.
    pub fn toggle_all(&mut self) {
        let any_open = self
            .state
            .parent_ids()
            .into_iter()
            .any(|p| self.state.view.tasks.is_expanded(p));
        if any_open {
            self.collapse_all();
        } else {
            self.expand_all();
        }
    }

    // ---- selection -----------------------------------------------------

    pub fn select_task(&mut self, id: Option<TaskId>) {
        if self.state.selected_task_id != id {
            self.update(Refresh::Viewport, move |next| next.selected_task_id = id);
        }
    }

    pub fn set_hovered_task(&mut self, id: Option<TaskId>) {
        if self.state.hovered_task_id != id {
            self.update(Refresh::Viewport, move |next| next.hovered_task_id = id);
        }
    }

    // ---- viewport ------------------------------------------------------

    pub fn update_viewport(&mut self, patch: ViewportPatch) {
        let limits = Self::limits(&self.config, &self.state);
        let vp = update_viewport(&self.state.viewport, &patch, self.state.row_count, &limits);
        if vp != self.state.viewport {
            self.update(Refresh::Viewport, move |next| next.viewport = vp);
        }
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.update_viewport(ViewportPatch::size(width, height));
    }

    /// Scroll by a pixel delta; positive `dx` reveals later time.
    pub fn scroll_by(&mut self, dx: f64, dy: f64) {
        let vp = self.state.viewport;
        self.update_viewport(ViewportPatch::scroll(vp.scroll_x + dx, vp.scroll_y + dy));
    }

    fn scale_for(&self, level: ZoomLevel) -> f64 {
        self.state
            .zoom_overrides
            .get(&level)
            .copied()
            .unwrap_or_else(|| level.default_scale())
    }

    fn switch_zoom(&mut self, level: ZoomLevel, viewport: Viewport) {
        let grid = TimeGrid::new(level.snap_unit(), self.config.display_offset());
        self.update(Refresh::Zoom, move |next| {
            next.zoom = level;
            next.grid = grid;
            next.viewport = viewport;
        });
    }

    /// Change zoom keeping the centred instant in place.
    pub fn set_zoom_level(&mut self, level: ZoomLevel) {
        let vp = rescale_centered(
            &self.state.viewport,
            self.scale_for(level),
            self.config.zoom_safety_buffer_ms,
        );
        self.switch_zoom(level, vp);
    }

    /// Change zoom keeping the left screen edge in place.
    pub fn set_view_mode(&mut self, level: ZoomLevel) {
        let vp = rescale_left_anchored(
            &self.state.viewport,
            self.scale_for(level),
            self.config.zoom_safety_buffer_ms,
        );
        self.switch_zoom(level, vp);
    }

    /// Manual rescale around screen x `anchor_px`, remembered for the
    /// current zoom level.
    pub fn zoom_by(&mut self, factor: f64, anchor_px: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        let vp = self.state.viewport;
        let scale = (vp.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let next_vp = rescale_around(&vp, scale, anchor_px, self.config.zoom_safety_buffer_ms);
        let level = self.state.zoom;
        self.update(Refresh::Zoom, move |next| {
            next.viewport = next_vp;
            next.zoom_overrides.insert(level, scale);
        });
    }

    pub fn reset_zoom_override(&mut self) {
        let level = self.state.zoom;
        let vp = rescale_centered(
            &self.state.viewport,
            level.default_scale(),
            self.config.zoom_safety_buffer_ms,
        );
        self.update(Refresh::Zoom, move |next| {
            next.zoom_overrides.remove(&level);
            next.viewport = vp;
        });
    }

    pub fn scroll_to_task(&mut self, id: TaskId) {
        let state = &self.state;
        let target = match (state.task(id), state.source_task(id)) {
            (Some(t), _) => ScrollTarget {
                start_date: t.start_date,
                due_date: t.due_date,
                row_index: Some(t.row_index),
            },
            (None, Some(t)) => ScrollTarget {
                start_date: t.start_date,
                due_date: t.due_date,
                row_index: None,
            },
            (None, None) => return,
        };
        let limits = Self::limits(&self.config, state);
        let vp = scroll_to_task(
            &state.viewport,
            &target,
            self.config.scroll_to_task_buffer_ms(),
            state.row_count,
            &limits,
        );
        self.update(Refresh::Viewport, move |next| next.viewport = vp);
    }

    /// Adjust `scroll_y` just enough to show `row`.
    pub fn scroll_row_into_view(&mut self, row: usize) {
        let vp = self.state.viewport;
        let top = row as f64 * vp.row_height;
        let bottom = top + vp.row_height;
        let scroll_y = if top < vp.scroll_y {
            top
        } else if bottom > vp.scroll_y + vp.height {
            bottom - vp.height
        } else {
            return;
        };
        self.update_viewport(ViewportPatch {
            scroll_y: Some(scroll_y),
            ..Default::default()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RelationType, DAY_MS};
    use std::cell::Cell;
    use std::rc::Rc;

    fn day(n: i64) -> i64 {
        n * DAY_MS
    }

    fn dataset() -> Dataset {
        let parent = Task::new(1, "Release", day(1), day(6));
        let mut a = Task::new(2, "Build", day(1), day(3));
        a.parent_id = Some(TaskId(1));
        let mut b = Task::new(3, "Ship", day(4), day(6));
        b.parent_id = Some(TaskId(1));
        let mut c = Task::new(4, "Announce", day(8), day(9));
        c.assigned_to_id = Some(crate::model::UserId(5));
        Dataset::new(
            vec![parent, a, b, c],
            vec![Relation::new(1, TaskId(2), TaskId(3), RelationType::Precedes)],
            vec![],
        )
    }

    fn store() -> GanttStore {
        GanttStore::with_dataset(GanttConfig::default(), dataset())
    }

    fn assert_consistent(state: &GanttState) {
        assert_eq!(state.row_count, state.layout_rows.len());
        assert!(state.tasks.windows(2).all(|w| w[0].row_index < w[1].row_index));
        for task in state.tasks.iter() {
            assert_eq!(state.layout_rows[task.row_index].task_id(), Some(task.id));
        }
    }

    #[test]
    fn test_load_builds_layout() {
        let s = store();
        assert_consistent(s.current());
        assert_eq!(s.current().row_count, 4);
        assert!(s.current().task(TaskId(1)).is_some_and(|t| t.has_children));
    }

    #[test]
    fn test_listeners_see_each_snapshot() {
        let mut s = store();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let id = s.subscribe(move |state| {
            assert_eq!(state.row_count, state.layout_rows.len());
            seen.set(seen.get() + 1);
        });
        s.set_task_expanded(TaskId(1), false);
        assert_eq!(calls.get(), 1);
        assert_eq!(s.current().row_count, 2);
        assert!(s.unsubscribe(id));
        s.expand_all();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_update_task_cascades() {
        let mut s = store();
        s.update_task(TaskId(2), &TaskPatch::dates(day(2), day(5)));
        let state = s.current();
        let ship = state.source_task(TaskId(3)).unwrap();
        assert_eq!(ship.start_date, day(6));
        assert_eq!(ship.duration(), day(2));
        let release = state.source_task(TaskId(1)).unwrap();
        assert_eq!((release.start_date, release.due_date), (day(2), day(8)));
        assert_consistent(state);
    }

    #[test]
    fn test_failed_save_rolls_back_everything() {
        let mut s = store();
        let snapshot = s.snapshot();
        s.update_task(TaskId(2), &TaskPatch::dates(day(2), day(5)));
        let task = s.current().source_task(TaskId(2)).unwrap().clone();
        s.resolve_save(
            PendingSave {
                task,
                snapshot: Arc::clone(&snapshot),
            },
            Err(SaveError::Conflict),
        );
        assert_eq!(*s.current().all_tasks, *snapshot);
        let notes = s.drain_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NoticeKind::SaveConflict(TaskId(2)));
        assert_eq!(notes[0].level, NoticeLevel::Warning);
    }

    #[test]
    fn test_successful_save_merges_lock_version() {
        let mut s = store();
        let snapshot = s.snapshot();
        let task = s.current().source_task(TaskId(4)).unwrap().clone();
        s.resolve_save(PendingSave { task, snapshot }, Ok(7));
        assert_eq!(s.current().source_task(TaskId(4)).unwrap().lock_version, 7);
        assert!(s.drain_notifications().is_empty());
    }

    #[test]
    fn test_toggle_all_heuristic() {
        let mut s = store();
        s.toggle_all();
        assert!(!s.current().view.tasks.is_expanded(TaskId(1)));
        s.toggle_all();
        assert!(s.current().view.tasks.is_expanded(TaskId(1)));
    }

    #[test]
    fn test_inactive_filter_change_skips_rebuild() {
        let mut s = store();
        let before = s.state();
        s.set_filter_text("   ");
        assert!(Arc::ptr_eq(&before.tasks, &s.current().tasks));
        s.set_filter_text("ship");
        let ids: Vec<TaskId> = s.current().tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TaskId(1), TaskId(3)]);
    }

    #[test]
    fn test_remove_task_takes_subtree_and_relations() {
        let mut s = store();
        s.select_task(Some(TaskId(3)));
        s.remove_task(TaskId(1));
        let state = s.current();
        assert_eq!(state.all_tasks.len(), 1);
        assert!(state.relations.is_empty());
        assert_eq!(state.selected_task_id, None);
    }

    #[test]
    fn test_zoom_switches_preserve_anchors() {
        let mut s = store();
        s.set_viewport_size(1000.0, 400.0);
        s.update_viewport(ViewportPatch::scroll(300.0, 0.0));

        let vp = s.current().viewport;
        let left = vp.visible_start();
        s.set_view_mode(ZoomLevel::Day);
        let after = s.current().viewport;
        assert!((after.visible_start() - left).abs() < 1.0);
        assert_eq!(s.current().zoom, ZoomLevel::Day);

        let center = after.start_date + (after.scroll_x + after.width / 2.0) / after.scale;
        s.set_zoom_level(ZoomLevel::Month);
        let zoomed = s.current().viewport;
        let center_after = zoomed.start_date + (zoomed.scroll_x + zoomed.width / 2.0) / zoomed.scale;
        assert!((center - center_after).abs() < 1.0);
    }

    #[test]
    fn test_zoom_out_at_right_limit_survives_next_frame() {
        let mut s = store();
        s.set_view_mode(ZoomLevel::Hour);
        s.set_viewport_size(1000.0, 400.0);
        s.update_viewport(ViewportPatch::scroll(1.0e12, 0.0));
        let left = s.current().viewport.visible_start();

        s.set_view_mode(ZoomLevel::Month);
        let zoomed = s.current().viewport;
        assert!((zoomed.visible_start() - left).abs() < 1.0);

        // The host re-sends its size every frame.
        s.set_viewport_size(1000.0, 400.0);
        let next_frame = s.current().viewport;
        assert_eq!(next_frame, zoomed);
        assert!((next_frame.visible_start() - left).abs() < 1.0);
    }

    #[test]
    fn test_layout_generation_ignores_pointer_and_scroll() {
        let mut s = store();
        let generation = s.current().layout_generation;
        s.set_hovered_task(Some(TaskId(2)));
        s.select_task(Some(TaskId(3)));
        s.scroll_by(40.0, 0.0);
        assert_eq!(s.current().layout_generation, generation);
        assert!(s.current().revision > 0);

        s.update_task(TaskId(4), &TaskPatch::dates(day(9), day(10)));
        assert_eq!(s.current().layout_generation, generation + 1);
    }

    #[test]
    fn test_zoom_by_records_override() {
        let mut s = store();
        let level = s.current().zoom;
        s.zoom_by(2.0, 100.0);
        let expected = level.default_scale() * 2.0;
        assert!((s.current().zoom_overrides[&level] - expected).abs() < 1e-15);
        s.reset_zoom_override();
        assert!(s.current().zoom_overrides.is_empty());
        assert_eq!(s.current().viewport.scale, level.default_scale());
    }

    #[test]
    fn test_relation_created_only_after_backend() {
        let mut s = store();
        let request = RelationRequest {
            from: TaskId(3),
            to: TaskId(4),
            relation_type: RelationType::Precedes,
        };
        s.resolve_relation_created(request, Err(BackendError::InvalidRelation("nope".into())));
        assert_eq!(s.current().relations.len(), 1);
        assert_eq!(s.drain_notifications()[0].level, NoticeLevel::Error);

        let created = Relation::new(9, TaskId(3), TaskId(4), RelationType::Precedes);
        s.resolve_relation_created(request, Ok(created));
        assert_eq!(s.current().relations.len(), 2);
    }
}
