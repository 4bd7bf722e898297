use serde::{Deserialize, Serialize};

use super::relation::Relation;
use super::task::Task;
use super::version::Version;

/// Everything the timeline shows: tasks, the links between them, and versions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub versions: Vec<Version>,
}

impl Dataset {
    pub fn new(tasks: Vec<Task>, relations: Vec<Relation>, versions: Vec<Version>) -> Self {
        Self {
            tasks,
            relations,
            versions,
        }
    }

    /// Latest finite due date across all tasks.
    pub fn max_due_date(&self) -> Option<i64> {
        self.tasks.iter().map(|t| t.due_date).max()
    }
}
