use std::fmt;

use crate::model::{RelationId, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// What happened, independent of how the host words or styles it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeKind {
    ParentNotEditable(TaskId),
    ReadOnly(TaskId),
    SaveConflict(TaskId),
    SaveFailed { task: TaskId, reason: String },
    RelationCreated { from: TaskId, to: TaskId },
    RelationFailed(String),
    RelationDeleted(RelationId),
    RelationDeleteFailed { id: RelationId, reason: String },
    LoadFailed(String),
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeKind::ParentNotEditable(id) => {
                write!(f, "Task #{id} has subtasks; its dates follow them")
            }
            NoticeKind::ReadOnly(id) => write!(f, "Task #{id} is read-only"),
            NoticeKind::SaveConflict(id) => {
                write!(f, "Task #{id} was changed elsewhere; your change was reverted")
            }
            NoticeKind::SaveFailed { task, reason } => {
                write!(f, "Saving task #{task} failed ({reason}); your change was reverted")
            }
            NoticeKind::RelationCreated { from, to } => write!(f, "Linked #{from} to #{to}"),
            NoticeKind::RelationFailed(reason) => write!(f, "Could not create relation: {reason}"),
            NoticeKind::RelationDeleted(id) => write!(f, "Relation #{id} removed"),
            NoticeKind::RelationDeleteFailed { id, reason } => {
                write!(f, "Could not remove relation #{id}: {reason}")
            }
            NoticeKind::LoadFailed(reason) => write!(f, "Loading failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NoticeLevel,
    pub kind: NoticeKind,
}

impl Notification {
    pub fn new(level: NoticeLevel, kind: NoticeKind) -> Self {
        Self { level, kind }
    }

    pub fn warning(kind: NoticeKind) -> Self {
        Self::new(NoticeLevel::Warning, kind)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}
