use serde::{Deserialize, Serialize};
use std::fmt;

/// One day in epoch milliseconds.
pub const DAY_MS: i64 = 86_400_000;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Stable identity of a task, assigned by the remote tracker.
    TaskId
);
id_type!(ProjectId);
id_type!(VersionId);
id_type!(RelationId);
id_type!(UserId);

impl ProjectId {
    /// Bucket for tasks that arrive without a project.
    pub const NONE: ProjectId = ProjectId(0);
}

/// A scheduled task on the timeline.
///
/// Dates are epoch milliseconds. `due_date >= start_date` is enforced at
/// ingestion; the due instant is treated as inclusive when drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub subject: String,
    pub start_date: i64,
    pub due_date: i64,
    /// Progress in percent, 0..=100.
    pub ratio_done: u8,
    pub status_id: i64,
    pub assigned_to_id: Option<UserId>,
    pub assigned_to_name: Option<String>,
    pub project_id: Option<ProjectId>,
    pub project_name: Option<String>,
    pub parent_id: Option<TaskId>,
    pub fixed_version_id: Option<VersionId>,
    pub priority_id: Option<i64>,
    pub display_order: i64,
    /// Optimistic-concurrency token echoed back to the server on update.
    pub lock_version: i64,
    pub editable: bool,

    #[serde(skip)]
    pub row_index: usize,
    #[serde(skip)]
    pub indent_level: usize,
    #[serde(skip)]
    pub has_children: bool,
    /// Per ancestor depth: does that ancestor still have siblings after it.
    #[serde(skip)]
    pub tree_level_guides: Vec<bool>,
    #[serde(skip)]
    pub is_last_child: bool,
}

impl Task {
    /// Create an editable task with no relations to anything else.
    pub fn new(id: i64, subject: impl Into<String>, start_date: i64, due_date: i64) -> Self {
        Self {
            id: TaskId(id),
            subject: subject.into(),
            start_date,
            due_date: due_date.max(start_date),
            ratio_done: 0,
            status_id: 1,
            assigned_to_id: None,
            assigned_to_name: None,
            project_id: None,
            project_name: None,
            parent_id: None,
            fixed_version_id: None,
            priority_id: None,
            display_order: id,
            lock_version: 0,
            editable: true,
            row_index: 0,
            indent_level: 0,
            has_children: false,
            tree_level_guides: Vec::new(),
            is_last_child: false,
        }
    }

    /// Project bucket used for grouping; missing projects share a sentinel.
    pub fn project_key(&self) -> ProjectId {
        self.project_id.unwrap_or(ProjectId::NONE)
    }

    pub fn duration(&self) -> i64 {
        self.due_date - self.start_date
    }
}

/// Fields an edit may change. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub subject: Option<String>,
    pub start_date: Option<i64>,
    pub due_date: Option<i64>,
    pub ratio_done: Option<u8>,
    pub status_id: Option<i64>,
    pub assigned_to_id: Option<Option<UserId>>,
    pub parent_id: Option<Option<TaskId>>,
    pub fixed_version_id: Option<Option<VersionId>>,
    pub lock_version: Option<i64>,
}

impl TaskPatch {
    pub fn dates(start_date: i64, due_date: i64) -> Self {
        Self {
            start_date: Some(start_date),
            due_date: Some(due_date),
            ..Default::default()
        }
    }

    /// True if applying this patch can move a bar on the timeline.
    pub fn touches_schedule(&self) -> bool {
        self.start_date.is_some() || self.due_date.is_some() || self.parent_id.is_some()
    }

    pub fn apply(&self, task: &mut Task) {
        if let Some(subject) = &self.subject {
            task.subject = subject.clone();
        }
        if let Some(start) = self.start_date {
            task.start_date = start;
        }
        if let Some(due) = self.due_date {
            task.due_date = due;
        }
        if task.due_date < task.start_date {
            task.due_date = task.start_date;
        }
        if let Some(ratio) = self.ratio_done {
            task.ratio_done = ratio.min(100);
        }
        if let Some(status) = self.status_id {
            task.status_id = status;
        }
        if let Some(assignee) = self.assigned_to_id {
            task.assigned_to_id = assignee;
        }
        if let Some(parent) = self.parent_id {
            // A task is never its own parent.
            task.parent_id = parent.filter(|p| *p != task.id);
        }
        if let Some(version) = self.fixed_version_id {
            task.fixed_version_id = version;
        }
        if let Some(lock) = self.lock_version {
            task.lock_version = lock;
        }
    }
}
