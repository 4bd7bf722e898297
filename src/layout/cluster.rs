//! Groups tasks linked by relations or parentage so they can be laid out as
//! contiguous runs.

use std::collections::HashMap;

use crate::model::{Relation, Task, TaskId};

/// Disjoint sets over arena indices, with path compression and union by rank.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    pub fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] = self.rank[ra].saturating_add(1);
            }
        }
    }
}

/// Component representative for every task. Relations with a missing
/// endpoint and unresolved parents are skipped.
pub fn dependency_components(tasks: &[Task], relations: &[Relation]) -> HashMap<TaskId, usize> {
    let index: HashMap<TaskId, usize> = tasks.iter().enumerate().map(|(i, t)| (t.id, i)).collect();
    let mut sets = UnionFind::new(tasks.len());

    for rel in relations {
        if let (Some(&a), Some(&b)) = (index.get(&rel.from), index.get(&rel.to)) {
            sets.union(a, b);
        }
    }
    for (i, task) in tasks.iter().enumerate() {
        if let Some(&p) = task.parent_id.and_then(|p| index.get(&p)) {
            sets.union(i, p);
        }
    }

    tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id, sets.find(i)))
        .collect()
}

/// Reorder roots so members of a component sit together. Components appear
/// in the order their first root appears; roots keep their relative order.
pub fn cluster_roots<'a>(roots: &[&'a Task], components: &HashMap<TaskId, usize>) -> Vec<&'a Task> {
    let mut order: Vec<usize> = Vec::new();
    let mut groups: HashMap<usize, Vec<&'a Task>> = HashMap::new();
    for (pos, &root) in roots.iter().enumerate() {
        // Tasks unknown to the component map stay in a group of their own.
        let key = components
            .get(&root.id)
            .copied()
            .unwrap_or(usize::MAX - pos);
        let group = groups.entry(key).or_default();
        if group.is_empty() {
            order.push(key);
        }
        group.push(root);
    }
    order
        .into_iter()
        .flat_map(|key| groups.remove(&key).unwrap_or_default())
        .collect()
}
