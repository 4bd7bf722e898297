use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::{GanttBackend, MemoryBackend};
use crate::error::{BackendError, GanttError};
use crate::model::{Dataset, Relation, RelationId, RelationType, Task, TaskId};

use super::records::{ingest, today, DatasetRecord};

fn read_dataset(path: &Path) -> Result<Dataset, BackendError> {
    let json = fs::read_to_string(path)?;
    let record: DatasetRecord = serde_json::from_str(&json)?;
    Ok(ingest(record, today()))
}

fn write_dataset(dataset: &Dataset, path: &Path) -> Result<(), BackendError> {
    let json = serde_json::to_string_pretty(dataset)?;
    fs::write(path, json)?;
    Ok(())
}

/// Load a dataset from a JSON file.
pub fn load_dataset(path: &Path) -> Result<Dataset, GanttError> {
    Ok(read_dataset(path)?)
}

/// Save a dataset to a JSON file.
pub fn save_dataset(dataset: &Dataset, path: &Path) -> Result<(), GanttError> {
    Ok(write_dataset(dataset, path)?)
}

/// A backend over one dataset file. Every successful mutation is written
/// straight back to disk.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    inner: MemoryBackend,
}

impl JsonFileBackend {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, GanttError> {
        let path = path.into();
        let dataset = read_dataset(&path)?;
        tracing::info!(path = %path.display(), tasks = dataset.tasks.len(), "dataset file opened");
        Ok(Self {
            path,
            inner: MemoryBackend::new(dataset),
        })
    }

    /// Write `dataset` to `path` and serve it from there.
    pub fn create(path: impl Into<PathBuf>, dataset: Dataset) -> Result<Self, GanttError> {
        let path = path.into();
        write_dataset(&dataset, &path)?;
        Ok(Self {
            path,
            inner: MemoryBackend::new(dataset),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `op` to a copy of the served data, which replaces it only once
    /// the copy is on disk. A failed write leaves memory matching the file.
    fn transact<T>(
        &mut self,
        op: impl FnOnce(&mut MemoryBackend) -> Result<T, BackendError>,
    ) -> Result<T, BackendError> {
        let mut next = self.inner.clone();
        let out = op(&mut next)?;
        write_dataset(next.data(), &self.path)?;
        tracing::debug!(path = %self.path.display(), "dataset written");
        self.inner = next;
        Ok(out)
    }
}

impl GanttBackend for JsonFileBackend {
    fn fetch_all(&mut self) -> Result<Dataset, BackendError> {
        let dataset = read_dataset(&self.path)?;
        self.inner = MemoryBackend::new(dataset.clone());
        Ok(dataset)
    }

    fn update_task(&mut self, task: &Task) -> Result<i64, BackendError> {
        self.transact(|data| data.update_task(task))
    }

    fn create_relation(
        &mut self,
        from: TaskId,
        to: TaskId,
        relation_type: RelationType,
    ) -> Result<Relation, BackendError> {
        self.transact(|data| data.create_relation(from, to, relation_type))
    }

    fn delete_relation(&mut self, id: RelationId) -> Result<(), BackendError> {
        self.transact(|data| data.delete_relation(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DAY_MS;
    use tempfile::tempdir;

    fn dataset() -> Dataset {
        Dataset::new(
            vec![
                Task::new(1, "Plan", 0, DAY_MS),
                Task::new(2, "Build", 2 * DAY_MS, 5 * DAY_MS),
            ],
            vec![],
            vec![],
        )
    }

    #[test]
    fn test_mutations_are_written_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        let mut backend = JsonFileBackend::create(&path, dataset()).unwrap();

        let mut task = backend.fetch_all().unwrap().tasks[1].clone();
        task.due_date = 6 * DAY_MS;
        assert_eq!(backend.update_task(&task).unwrap(), 1);
        let rel = backend
            .create_relation(TaskId(1), TaskId(2), RelationType::Precedes)
            .unwrap();

        let reopened = load_dataset(&path).unwrap();
        assert_eq!(reopened.tasks[1].due_date, 6 * DAY_MS);
        assert_eq!(reopened.tasks[1].lock_version, 1);
        assert_eq!(reopened.relations, vec![rel.clone()]);

        backend.delete_relation(rel.id).unwrap();
        assert!(load_dataset(&path).unwrap().relations.is_empty());
    }

    #[test]
    fn test_stale_save_is_a_conflict_and_not_written() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        let mut backend = JsonFileBackend::create(&path, dataset()).unwrap();
        let mut stale = backend.fetch_all().unwrap().tasks[0].clone();
        stale.lock_version = 3;
        stale.subject = "Replan".into();
        assert!(matches!(
            backend.update_task(&stale),
            Err(BackendError::Conflict { .. })
        ));
        assert_eq!(load_dataset(&path).unwrap().tasks[0].subject, "Plan");
    }

    #[test]
    fn test_failed_write_does_not_advance_lock_version() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("project");
        fs::create_dir(&folder).unwrap();
        let path = folder.join("data.json");
        let mut backend = JsonFileBackend::create(&path, dataset()).unwrap();

        let mut task = backend.fetch_all().unwrap().tasks[0].clone();
        task.subject = "Replan".into();
        fs::remove_dir_all(&folder).unwrap();
        assert!(matches!(backend.update_task(&task), Err(BackendError::Io(_))));
        assert!(matches!(
            backend.create_relation(TaskId(1), TaskId(2), RelationType::Precedes),
            Err(BackendError::Io(_))
        ));

        // Once the disk is back the same client copy saves cleanly.
        fs::create_dir(&folder).unwrap();
        assert_eq!(backend.update_task(&task).unwrap(), 1);
        let rel = backend
            .create_relation(TaskId(1), TaskId(2), RelationType::Precedes)
            .unwrap();
        assert_eq!(rel.id, RelationId(1));
        let saved = load_dataset(&path).unwrap();
        assert_eq!((saved.tasks[0].subject.as_str(), saved.tasks[0].lock_version), ("Replan", 1));
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            JsonFileBackend::open(dir.path().join("nope.json")),
            Err(GanttError::Backend(BackendError::Io(_)))
        ));
        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(
            load_dataset(&bad),
            Err(GanttError::Backend(BackendError::Json(_)))
        ));
    }
}
