use super::task::{ProjectId, TaskId, VersionId};

/// One occupied row of the timeline.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutRow {
    Task {
        task_id: TaskId,
        row_index: usize,
    },
    /// Project group header with the summary range of all the project's tasks.
    Header {
        project_id: ProjectId,
        project_name: String,
        row_index: usize,
        start_date: Option<i64>,
        due_date: Option<i64>,
    },
    Version {
        id: VersionId,
        name: String,
        row_index: usize,
        start_date: i64,
        due_date: i64,
        ratio_done: f64,
        project_id: ProjectId,
    },
}

impl LayoutRow {
    pub fn row_index(&self) -> usize {
        match self {
            LayoutRow::Task { row_index, .. }
            | LayoutRow::Header { row_index, .. }
            | LayoutRow::Version { row_index, .. } => *row_index,
        }
    }

    pub fn task_id(&self) -> Option<TaskId> {
        match self {
            LayoutRow::Task { task_id, .. } => Some(*task_id),
            _ => None,
        }
    }
}
