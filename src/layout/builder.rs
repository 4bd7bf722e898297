//! Turns tasks, relations and versions plus the user's view options into the
//! linear row order the timeline draws.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::layout::cluster::{cluster_roots, dependency_components};
use crate::layout::sort::{sort_tasks, SortConfig};
use crate::model::{LayoutRow, ProjectId, Relation, Task, TaskId, Version, VersionId};

/// Collapsed keys; anything not listed is expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandMap<K: Eq + Hash> {
    collapsed: HashSet<K>,
}

impl<K: Eq + Hash> Default for ExpandMap<K> {
    fn default() -> Self {
        Self {
            collapsed: HashSet::new(),
        }
    }
}

impl<K: Eq + Hash + Copy> ExpandMap<K> {
    pub fn is_expanded(&self, key: K) -> bool {
        !self.collapsed.contains(&key)
    }

    pub fn set(&mut self, key: K, expanded: bool) {
        if expanded {
            self.collapsed.remove(&key);
        } else {
            self.collapsed.insert(key);
        }
    }

    pub fn toggle(&mut self, key: K) {
        let expanded = self.is_expanded(key);
        self.set(key, !expanded);
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    pub fn collapse_all(&mut self, keys: impl IntoIterator<Item = K>) {
        self.collapsed.extend(keys);
    }
}

/// User-controlled grouping, ordering and expansion state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewOptions {
    pub group_by_project: bool,
    pub show_versions: bool,
    pub organize_by_dependency: bool,
    pub projects: ExpandMap<ProjectId>,
    pub versions: ExpandMap<VersionId>,
    pub tasks: ExpandMap<TaskId>,
    pub sort: Option<SortConfig>,
}

/// Everything the builder reads.
#[derive(Debug, Clone, Copy)]
pub struct LayoutInput<'a> {
    /// Tasks that survived filtering; these are the ones laid out.
    pub tasks: &'a [Task],
    /// The unfiltered set, used for summaries and `has_children`.
    pub all_tasks: &'a [Task],
    pub relations: &'a [Relation],
    pub versions: &'a [Version],
    pub options: &'a ViewOptions,
}

/// Result of one build: laid-out tasks and every row, both in row order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub tasks: Vec<Task>,
    pub rows: Vec<LayoutRow>,
}

impl Layout {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

struct Builder<'a> {
    options: &'a ViewOptions,
    children: HashMap<TaskId, Vec<&'a Task>>,
    parents_in_full_set: HashSet<TaskId>,
    visited: HashSet<TaskId>,
    layout: Layout,
}

impl<'a> Builder<'a> {
    fn next_row(&self) -> usize {
        self.layout.rows.len()
    }

    fn emit_forest(&mut self, roots: &[&'a Task], visible: bool) {
        let mut guides = Vec::new();
        for (i, root) in roots.iter().enumerate() {
            self.visit(root, 0, &mut guides, i + 1 == roots.len(), visible);
        }
    }

    fn visit(&mut self, node: &'a Task, depth: usize, guides: &mut Vec<bool>, is_last: bool, visible: bool) {
        if !self.visited.insert(node.id) {
            tracing::warn!(task = %node.id, "task reached twice while laying out, parent cycle?");
            return;
        }

        if visible {
            let row_index = self.next_row();
            let mut task = node.clone();
            task.row_index = row_index;
            task.indent_level = depth;
            task.has_children = self.parents_in_full_set.contains(&node.id);
            task.tree_level_guides = guides.clone();
            task.is_last_child = is_last;
            self.layout.rows.push(LayoutRow::Task {
                task_id: node.id,
                row_index,
            });
            self.layout.tasks.push(task);
        }

        let kids = self.children.get(&node.id).cloned().unwrap_or_default();
        if kids.is_empty() {
            return;
        }
        // Hidden subtrees are still walked so every id is claimed exactly once.
        let kids_visible = visible && self.options.tasks.is_expanded(node.id);
        guides.push(!is_last);
        for (i, kid) in kids.iter().enumerate() {
            self.visit(kid, depth + 1, guides, i + 1 == kids.len(), kids_visible);
        }
        guides.pop();
    }
}

fn project_name(project: ProjectId, all_tasks: &[Task]) -> String {
    all_tasks
        .iter()
        .filter(|t| t.project_key() == project)
        .find_map(|t| t.project_name.clone())
        .unwrap_or_else(|| {
            if project == ProjectId::NONE {
                "No project".to_string()
            } else {
                format!("Project #{project}")
            }
        })
}

fn date_range<'t>(tasks: impl Iterator<Item = &'t Task>) -> (Option<i64>, Option<i64>) {
    tasks.fold((None, None), |(start, due), t| {
        (
            Some(start.map_or(t.start_date, |s: i64| s.min(t.start_date))),
            Some(due.map_or(t.due_date, |d: i64| d.max(t.due_date))),
        )
    })
}

/// Build the row layout. Row indices are contiguous from 0 and reassigned on
/// every call.
pub fn build_layout(input: LayoutInput<'_>) -> Layout {
    let options = input.options;
    let present: HashSet<TaskId> = input.tasks.iter().map(|t| t.id).collect();
    let parents_in_full_set: HashSet<TaskId> =
        input.all_tasks.iter().filter_map(|t| t.parent_id).collect();

    let mut children: HashMap<TaskId, Vec<&Task>> = HashMap::new();
    let mut buckets: Vec<(ProjectId, Vec<&Task>)> = Vec::new();
    for task in input.tasks {
        match task.parent_id.filter(|p| *p != task.id && present.contains(p)) {
            Some(parent) => children.entry(parent).or_default().push(task),
            None => {
                let project = if options.group_by_project {
                    task.project_key()
                } else {
                    ProjectId::NONE
                };
                match buckets.iter_mut().find(|(p, _)| *p == project) {
                    Some((_, roots)) => roots.push(task),
                    None => buckets.push((project, vec![task])),
                }
            }
        }
    }

    let sort = options.sort.as_ref();
    for kids in children.values_mut() {
        sort_tasks(kids, sort);
    }
    for (_, roots) in buckets.iter_mut() {
        sort_tasks(roots, sort);
    }

    if options.organize_by_dependency {
        let components = dependency_components(input.tasks, input.relations);
        for (_, roots) in buckets.iter_mut() {
            *roots = cluster_roots(roots, &components);
        }
    }

    let mut builder = Builder {
        options,
        children,
        parents_in_full_set,
        visited: HashSet::with_capacity(input.tasks.len()),
        layout: Layout {
            tasks: Vec::with_capacity(input.tasks.len()),
            rows: Vec::with_capacity(input.tasks.len()),
        },
    };

    let versions_by_id: HashMap<VersionId, &Version> =
        input.versions.iter().map(|v| (v.id, v)).collect();

    for (project, roots) in &buckets {
        if !options.group_by_project {
            builder.emit_forest(roots, true);
            continue;
        }

        let (start_date, due_date) =
            date_range(input.all_tasks.iter().filter(|t| t.project_key() == *project));
        let row_index = builder.next_row();
        builder.layout.rows.push(LayoutRow::Header {
            project_id: *project,
            project_name: project_name(*project, input.all_tasks),
            row_index,
            start_date,
            due_date,
        });
        let visible = options.projects.is_expanded(*project);

        if !options.show_versions {
            builder.emit_forest(roots, visible);
            continue;
        }

        let mut grouped: Vec<(&Version, Vec<&Task>)> = Vec::new();
        let mut unversioned: Vec<&Task> = Vec::new();
        for &root in roots {
            match root.fixed_version_id.and_then(|v| versions_by_id.get(&v)) {
                Some(&version) => match grouped.iter_mut().find(|(v, _)| v.id == version.id) {
                    Some((_, list)) => list.push(root),
                    None => grouped.push((version, vec![root])),
                },
                None => unversioned.push(root),
            }
        }
        grouped.sort_by_key(|(v, _)| (v.effective_date, v.id));

        for (version, list) in &grouped {
            if visible {
                let tasks_start = input
                    .all_tasks
                    .iter()
                    .filter(|t| t.fixed_version_id == Some(version.id))
                    .map(|t| t.start_date)
                    .min();
                let row_index = builder.next_row();
                builder.layout.rows.push(LayoutRow::Version {
                    id: version.id,
                    name: version.name.clone(),
                    row_index,
                    start_date: version
                        .start_date
                        .or(tasks_start)
                        .unwrap_or(version.effective_date),
                    due_date: version.effective_date,
                    ratio_done: version.ratio_done.unwrap_or(0.0),
                    project_id: *project,
                });
            }
            builder.emit_forest(list, visible && options.versions.is_expanded(version.id));
        }
        builder.emit_forest(&unversioned, visible);
    }

    // Members of a pure parent cycle have no root; lay them out flat at the end.
    let stranded: Vec<&Task> = input
        .tasks
        .iter()
        .filter(|t| !builder.visited.contains(&t.id))
        .collect();
    if !stranded.is_empty() {
        tracing::warn!(count = stranded.len(), "tasks unreachable from any root, laying out as roots");
        for task in stranded {
            if !builder.visited.contains(&task.id) {
                builder.emit_forest(&[task], true);
            }
        }
    }

    tracing::debug!(
        rows = builder.layout.rows.len(),
        tasks = builder.layout.tasks.len(),
        "layout rebuilt"
    );
    builder.layout
}
