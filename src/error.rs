use thiserror::Error;

use crate::model::{RelationId, TaskId};

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Task #{0} not found")]
    TaskNotFound(TaskId),
    #[error("Relation #{0} not found")]
    RelationNotFound(RelationId),
    #[error("Task #{id} is stale: lock version {sent}, server has {current}")]
    Conflict { id: TaskId, sent: i64, current: i64 },
    #[error("Invalid relation: {0}")]
    InvalidRelation(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outcome of a failed task save, as far as the store cares.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    #[error("the task was changed by someone else")]
    Conflict,
    #[error("{0}")]
    Failed(String),
}

impl From<BackendError> for SaveError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Conflict { .. } => SaveError::Conflict,
            other => SaveError::Failed(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum GanttError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Dataset I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Dataset parse error: {0}")]
    Json(#[from] serde_json::Error),
}
