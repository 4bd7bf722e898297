use serde::{Deserialize, Serialize};

use super::task::{ProjectId, VersionId};

/// A release milestone that tasks can be targeted at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub id: VersionId,
    pub name: String,
    /// Due date of the version in epoch milliseconds.
    pub effective_date: i64,
    #[serde(default)]
    pub start_date: Option<i64>,
    #[serde(default)]
    pub ratio_done: Option<f64>,
    pub project_id: ProjectId,
    #[serde(default)]
    pub status: String,
}
