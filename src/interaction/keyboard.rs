use crate::model::{Task, TaskId};
use crate::store::GanttStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

/// Neighbour of `selected` in row order, `step` rows away and clamped to
/// the list. With nothing selected, moving down picks the first task and
/// moving up the last.
pub fn adjacent_task(tasks: &[Task], selected: Option<TaskId>, step: isize) -> Option<&Task> {
    let position = selected.and_then(|id| tasks.iter().position(|t| t.id == id));
    let index = match position {
        Some(i) => i.saturating_add_signed(step).min(tasks.len().saturating_sub(1)),
        None if step >= 0 => 0,
        None => tasks.len().checked_sub(1)?,
    };
    tasks.get(index)
}

pub fn move_selection(store: &mut GanttStore, step: isize) {
    let state = store.state();
    let Some(task) = adjacent_task(&state.tasks, state.selected_task_id, step) else {
        return;
    };
    store.select_task(Some(task.id));
    store.scroll_row_into_view(task.row_index);
}
