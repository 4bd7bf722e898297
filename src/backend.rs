//! Persistence collaborator the store talks to at the end of a gesture.

use std::io;

use crate::error::BackendError;
use crate::model::{Dataset, Relation, RelationId, RelationType, Task, TaskId};

/// A relation the user asked for; nothing is inserted locally until the
/// backend answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationRequest {
    pub from: TaskId,
    pub to: TaskId,
    pub relation_type: RelationType,
}

pub trait GanttBackend {
    fn fetch_all(&mut self) -> Result<Dataset, BackendError>;

    /// Persist `task`, returning the new lock version. A stale
    /// `task.lock_version` yields [`BackendError::Conflict`].
    fn update_task(&mut self, task: &Task) -> Result<i64, BackendError>;

    fn create_relation(
        &mut self,
        from: TaskId,
        to: TaskId,
        relation_type: RelationType,
    ) -> Result<Relation, BackendError>;

    fn delete_relation(&mut self, id: RelationId) -> Result<(), BackendError>;
}

/// Backend holding the dataset in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    data: Dataset,
    offline: bool,
}

impl MemoryBackend {
    pub fn new(data: Dataset) -> Self {
        Self {
            data,
            offline: false,
        }
    }

    pub fn data(&self) -> &Dataset {
        &self.data
    }

    /// Make every call fail as if the server were unreachable.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Simulate another client saving `id`, which makes our copy stale.
    pub fn touch(&mut self, id: TaskId) -> Result<i64, BackendError> {
        let task = self.find_task_mut(id)?;
        task.lock_version += 1;
        Ok(task.lock_version)
    }

    fn check_online(&self) -> Result<(), BackendError> {
        if self.offline {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "backend offline").into());
        }
        Ok(())
    }

    fn find_task_mut(&mut self, id: TaskId) -> Result<&mut Task, BackendError> {
        self.data
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(BackendError::TaskNotFound(id))
    }

    fn next_relation_id(&self) -> RelationId {
        let max = self.data.relations.iter().map(|r| r.id.0).max().unwrap_or(0);
        RelationId(max + 1)
    }
}

impl GanttBackend for MemoryBackend {
    fn fetch_all(&mut self) -> Result<Dataset, BackendError> {
        self.check_online()?;
        Ok(self.data.clone())
    }

    fn update_task(&mut self, task: &Task) -> Result<i64, BackendError> {
        self.check_online()?;
        let stored = self.find_task_mut(task.id)?;
        if stored.lock_version != task.lock_version {
            return Err(BackendError::Conflict {
                id: task.id,
                sent: task.lock_version,
                current: stored.lock_version,
            });
        }
        *stored = task.clone();
        stored.lock_version += 1;
        tracing::info!(task = %task.id, lock_version = stored.lock_version, "task saved");
        Ok(stored.lock_version)
    }

    fn create_relation(
        &mut self,
        from: TaskId,
        to: TaskId,
        relation_type: RelationType,
    ) -> Result<Relation, BackendError> {
        self.check_online()?;
        if from == to {
            return Err(BackendError::InvalidRelation(format!(
                "task #{from} cannot relate to itself"
            )));
        }
        for id in [from, to] {
            if !self.data.tasks.iter().any(|t| t.id == id) {
                return Err(BackendError::TaskNotFound(id));
            }
        }
        if self.data.relations.iter().any(|r| r.links(from, to)) {
            return Err(BackendError::InvalidRelation(format!(
                "#{from} and #{to} are already related"
            )));
        }
        let relation = Relation {
            id: self.next_relation_id(),
            from,
            to,
            relation_type,
            delay: None,
        };
        self.data.relations.push(relation.clone());
        tracing::info!(relation = %relation.id, %from, %to, "relation created");
        Ok(relation)
    }

    fn delete_relation(&mut self, id: RelationId) -> Result<(), BackendError> {
        self.check_online()?;
        let before = self.data.relations.len();
        self.data.relations.retain(|r| r.id != id);
        if self.data.relations.len() == before {
            return Err(BackendError::RelationNotFound(id));
        }
        Ok(())
    }
}
