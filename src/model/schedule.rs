//! Date propagation that follows an edit: successors of scheduling relations
//! are pushed past their predecessors, and parents span their children.

use std::collections::{HashMap, HashSet, VecDeque};

use super::relation::Relation;
use super::task::{Task, TaskId, DAY_MS};

/// Push successors forward so each starts the day after its predecessor is due
/// (plus the relation delay). Durations are kept. Returns ids that moved.
pub fn propagate_dependencies(
    tasks: &mut [Task],
    relations: &[Relation],
    changed: &[TaskId],
) -> Vec<TaskId> {
    let index: HashMap<TaskId, usize> = tasks.iter().enumerate().map(|(i, t)| (t.id, i)).collect();

    let mut successors: HashMap<TaskId, Vec<(TaskId, i64)>> = HashMap::new();
    for rel in relations.iter().filter(|r| r.relation_type.is_scheduling()) {
        let Some((pred, succ)) = rel.directed() else {
            continue;
        };
        if index.contains_key(&pred) && index.contains_key(&succ) {
            successors
                .entry(pred)
                .or_default()
                .push((succ, rel.delay.unwrap_or(0)));
        }
    }

    let mut moved = Vec::new();
    let mut visited: HashSet<TaskId> = HashSet::new();
    let mut queue: VecDeque<TaskId> = changed.iter().copied().collect();

    while let Some(pred_id) = queue.pop_front() {
        if !visited.insert(pred_id) {
            continue;
        }
        let Some(&pred_idx) = index.get(&pred_id) else {
            continue;
        };
        let earliest_base = tasks[pred_idx].due_date + DAY_MS;
        for &(succ_id, delay_days) in successors.get(&pred_id).into_iter().flatten() {
            let Some(&succ_idx) = index.get(&succ_id) else {
                continue;
            };
            let earliest = earliest_base + delay_days * DAY_MS;
            let succ = &mut tasks[succ_idx];
            if succ.start_date < earliest {
                let duration = succ.duration();
                succ.start_date = earliest;
                succ.due_date = earliest + duration;
                moved.push(succ_id);
                queue.push_back(succ_id);
            }
        }
    }

    if !moved.is_empty() {
        tracing::debug!(count = moved.len(), "dependency propagation moved successors");
    }
    moved
}

/// Recompute start/due of every ancestor of `changed` from its children.
pub fn recalculate_parent_dates(tasks: &mut [Task], changed: &[TaskId]) {
    let index: HashMap<TaskId, usize> = tasks.iter().enumerate().map(|(i, t)| (t.id, i)).collect();
    let mut children: HashMap<TaskId, Vec<usize>> = HashMap::new();
    for (i, task) in tasks.iter().enumerate() {
        if let Some(parent) = task.parent_id.filter(|p| index.contains_key(p)) {
            children.entry(parent).or_default().push(i);
        }
    }

    let mut visited: HashSet<TaskId> = HashSet::new();
    for &id in changed {
        let mut current = index.get(&id).and_then(|&i| tasks[i].parent_id);
        while let Some(parent_id) = current {
            if !visited.insert(parent_id) {
                break;
            }
            let Some(&parent_idx) = index.get(&parent_id) else {
                break;
            };
            let Some(kids) = children.get(&parent_id) else {
                break;
            };
            let start = kids.iter().map(|&k| tasks[k].start_date).min();
            let due = kids.iter().map(|&k| tasks[k].due_date).max();
            if let (Some(start), Some(due)) = (start, due) {
                let parent = &mut tasks[parent_idx];
                parent.start_date = start;
                parent.due_date = due.max(start);
            }
            current = tasks[parent_idx].parent_id;
        }
    }
}
