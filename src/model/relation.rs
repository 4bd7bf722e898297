use serde::{Deserialize, Serialize};

use super::task::{RelationId, TaskId};

/// Vocabulary of relation kinds the tracker knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    Precedes,
    Follows,
    Blocks,
    Blocked,
    Relates,
    Duplicates,
    Duplicated,
    CopiedTo,
    CopiedFrom,
}

impl RelationType {
    /// Only these kinds draw connectors and take part in scheduling.
    pub fn is_dependency(self) -> bool {
        matches!(
            self,
            RelationType::Precedes
                | RelationType::Follows
                | RelationType::Blocks
                | RelationType::Blocked
        )
    }

    /// Kinds that shift the successor's dates when the predecessor moves.
    pub fn is_scheduling(self) -> bool {
        matches!(self, RelationType::Precedes | RelationType::Follows)
    }

    /// True when the arrow runs `to -> from` rather than `from -> to`.
    pub fn is_reversed(self) -> bool {
        matches!(self, RelationType::Follows | RelationType::Blocked)
    }
}

/// A typed link between two tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub id: RelationId,
    pub from: TaskId,
    pub to: TaskId,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    /// Extra gap in days between predecessor and successor.
    #[serde(default)]
    pub delay: Option<i64>,
}

impl Relation {
    pub fn new(id: i64, from: TaskId, to: TaskId, relation_type: RelationType) -> Self {
        Self {
            id: RelationId(id),
            from,
            to,
            relation_type,
            delay: None,
        }
    }

    /// `(predecessor, successor)` for dependency kinds, in arrow direction.
    pub fn directed(&self) -> Option<(TaskId, TaskId)> {
        if !self.relation_type.is_dependency() {
            return None;
        }
        if self.relation_type.is_reversed() {
            Some((self.to, self.from))
        } else {
            Some((self.from, self.to))
        }
    }

    /// Does this relation link the two tasks, in either direction.
    pub fn links(&self, a: TaskId, b: TaskId) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directed_follows_is_reversed() {
        let rel = Relation::new(1, TaskId(1), TaskId(2), RelationType::Follows);
        assert_eq!(rel.directed(), Some((TaskId(2), TaskId(1))));
        let rel = Relation::new(2, TaskId(1), TaskId(2), RelationType::Relates);
        assert_eq!(rel.directed(), None);
    }

    #[test]
    fn test_relation_type_wire_names() {
        let json = serde_json::to_string(&RelationType::CopiedTo).unwrap();
        assert_eq!(json, "\"copied_to\"");
    }
}
