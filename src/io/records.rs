//! Wire shapes of a dataset file and their conversion into the model.
//!
//! Dates arrive as epoch milliseconds or as date strings and may be missing
//! or garbage. Nothing here fails on bad dates: they are coerced and logged.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::layout::snap::start_of_utc_day;
use crate::model::{
    Dataset, ProjectId, Relation, Task, TaskId, UserId, Version, VersionId,
};

/// A date as found in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Millis(f64),
    Text(String),
}

impl DateValue {
    /// Epoch milliseconds, if the value names a real instant.
    pub fn millis(&self) -> Option<i64> {
        match self {
            DateValue::Millis(ms) if ms.is_finite() => Some(ms.round() as i64),
            DateValue::Millis(_) => None,
            DateValue::Text(text) => parse_date(text),
        }
    }
}

/// Try parsing a date string with the formats trackers commonly emit.
fn parse_date(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for fmt in &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis());
        }
    }
    None
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub start_date: Option<DateValue>,
    #[serde(default)]
    pub due_date: Option<DateValue>,
    #[serde(default)]
    pub ratio_done: Option<f64>,
    #[serde(default)]
    pub status_id: Option<i64>,
    #[serde(default)]
    pub assigned_to_id: Option<UserId>,
    #[serde(default)]
    pub assigned_to_name: Option<String>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub parent_id: Option<TaskId>,
    #[serde(default)]
    pub fixed_version_id: Option<VersionId>,
    #[serde(default)]
    pub priority_id: Option<i64>,
    #[serde(default)]
    pub display_order: Option<i64>,
    #[serde(default)]
    pub lock_version: i64,
    #[serde(default)]
    pub editable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub id: VersionId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub effective_date: Option<DateValue>,
    #[serde(default)]
    pub start_date: Option<DateValue>,
    #[serde(default)]
    pub ratio_done: Option<f64>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub versions: Vec<VersionRecord>,
}

/// Midnight UTC of the current day.
pub fn today() -> i64 {
    start_of_utc_day(Utc::now().timestamp_millis())
}

/// Resolve a task's dates: a missing bound copies the other one, both
/// missing means `today`, and an inverted pair collapses onto the start.
pub fn coerce_dates(start: Option<i64>, due: Option<i64>, today: i64) -> (i64, i64) {
    match (start, due) {
        (Some(start), Some(due)) => (start, due.max(start)),
        (Some(start), None) => (start, start),
        (None, Some(due)) => (due, due),
        (None, None) => (today, today),
    }
}

impl TaskRecord {
    pub fn into_task(self, today: i64) -> Task {
        let raw_start = self.start_date.as_ref().and_then(DateValue::millis);
        let raw_due = self.due_date.as_ref().and_then(DateValue::millis);
        let (start, due) = coerce_dates(raw_start, raw_due, today);
        if raw_start != Some(start) || raw_due != Some(due) {
            tracing::warn!(task = %self.id, ?raw_start, ?raw_due, start, due, "task dates coerced");
        }

        let mut task = Task::new(self.id.0, self.subject, start, due);
        task.ratio_done = self
            .ratio_done
            .filter(|r| r.is_finite())
            .map_or(0, |r| r.clamp(0.0, 100.0).round() as u8);
        task.status_id = self.status_id.unwrap_or(task.status_id);
        task.assigned_to_id = self.assigned_to_id;
        task.assigned_to_name = self.assigned_to_name;
        task.project_id = self.project_id;
        task.project_name = self.project_name;
        task.parent_id = self.parent_id;
        task.fixed_version_id = self.fixed_version_id;
        task.priority_id = self.priority_id;
        task.display_order = self.display_order.unwrap_or(task.display_order);
        task.lock_version = self.lock_version;
        task.editable = self.editable.unwrap_or(true);
        task
    }
}

impl VersionRecord {
    /// `None` for versions with no usable effective date.
    pub fn into_version(self) -> Option<Version> {
        let Some(effective_date) = self.effective_date.as_ref().and_then(DateValue::millis) else {
            tracing::warn!(version = %self.id, name = %self.name, "version without effective date dropped");
            return None;
        };
        Some(Version {
            id: self.id,
            name: self.name,
            effective_date,
            start_date: self.start_date.as_ref().and_then(DateValue::millis),
            ratio_done: self.ratio_done.filter(|r| r.is_finite()).map(|r| r.clamp(0.0, 100.0)),
            project_id: self.project_id.unwrap_or(ProjectId::NONE),
            status: self.status,
        })
    }
}

/// Turn a parsed file into a dataset, coercing what has to be coerced.
pub fn ingest(record: DatasetRecord, today: i64) -> Dataset {
    let tasks: Vec<Task> = record.tasks.into_iter().map(|t| t.into_task(today)).collect();
    let versions: Vec<Version> = record
        .versions
        .into_iter()
        .filter_map(VersionRecord::into_version)
        .collect();
    tracing::debug!(
        tasks = tasks.len(),
        relations = record.relations.len(),
        versions = versions.len(),
        "dataset ingested"
    );
    Dataset::new(tasks, record.relations, versions)
}
