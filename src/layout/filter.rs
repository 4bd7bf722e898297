use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::{ProjectId, Task, TaskId, UserId, VersionId};

/// One entry of the assignee selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssigneeFilter {
    Unassigned,
    User(UserId),
}

/// Independent predicates; an empty selection never excludes anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub text: String,
    pub assignees: BTreeSet<AssigneeFilter>,
    pub projects: BTreeSet<ProjectId>,
    pub versions: BTreeSet<VersionId>,
    /// Hide tasks of subprojects, keeping only the current project's.
    pub only_current_project: bool,
}

impl FilterOptions {
    pub fn is_active(&self, current_project: Option<ProjectId>) -> bool {
        !self.text.trim().is_empty()
            || !self.assignees.is_empty()
            || !self.projects.is_empty()
            || !self.versions.is_empty()
            || (self.only_current_project && current_project.is_some())
    }

    fn matches(&self, task: &Task, needle: &str, current_project: Option<ProjectId>) -> bool {
        if !needle.is_empty() && !task.subject.to_lowercase().contains(needle) {
            return false;
        }
        if !self.assignees.is_empty() {
            let key = match task.assigned_to_id {
                Some(user) => AssigneeFilter::User(user),
                None => AssigneeFilter::Unassigned,
            };
            if !self.assignees.contains(&key) {
                return false;
            }
        }
        if !self.projects.is_empty() && !self.projects.contains(&task.project_key()) {
            return false;
        }
        if !self.versions.is_empty()
            && !task
                .fixed_version_id
                .is_some_and(|v| self.versions.contains(&v))
        {
            return false;
        }
        if self.only_current_project {
            if let Some(current) = current_project {
                if task.project_id != Some(current) {
                    return false;
                }
            }
        }
        true
    }
}

/// Apply `filter` to the full task set. Ancestors of every match are kept
/// so a matching leaf never loses its parents. Inactive filters hand the
/// input back untouched.
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    filter: &FilterOptions,
    current_project: Option<ProjectId>,
) -> Cow<'a, [Task]> {
    if !filter.is_active(current_project) {
        return Cow::Borrowed(tasks);
    }

    let needle = filter.text.trim().to_lowercase();
    let matched: Vec<&Task> = tasks
        .iter()
        .filter(|t| filter.matches(t, &needle, current_project))
        .collect();
    if matched.is_empty() {
        return Cow::Owned(Vec::new());
    }

    let parents: HashMap<TaskId, Option<TaskId>> =
        tasks.iter().map(|t| (t.id, t.parent_id)).collect();
    let mut keep: HashSet<TaskId> = HashSet::with_capacity(matched.len());
    for task in matched {
        let mut current = Some(task.id);
        while let Some(id) = current {
            // Stop at ids we already walked; also guards against parent cycles.
            if !keep.insert(id) {
                break;
            }
            current = parents.get(&id).copied().flatten();
        }
    }

    Cow::Owned(
        tasks
            .iter()
            .filter(|t| keep.contains(&t.id))
            .cloned()
            .collect(),
    )
}
