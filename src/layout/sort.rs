use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortField {
    Id,
    Subject,
    StartDate,
    DueDate,
    RatioDone,
    Status,
    Priority,
    Assignee,
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn ascending(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    /// Next state when the user clicks a sort key: a new field sorts
    /// ascending, the same field flips to descending, then clears.
    pub fn toggle(current: Option<SortConfig>, field: SortField) -> Option<SortConfig> {
        match current {
            Some(cfg) if cfg.field == field => match cfg.direction {
                SortDirection::Ascending => Some(SortConfig {
                    field,
                    direction: SortDirection::Descending,
                }),
                SortDirection::Descending => None,
            },
            _ => Some(SortConfig::ascending(field)),
        }
    }

    /// Compare two tasks; missing values sort last in either direction.
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let ord = match self.field {
            SortField::Id => Some(a.id.cmp(&b.id)),
            SortField::Subject => Some(a.subject.to_lowercase().cmp(&b.subject.to_lowercase())),
            SortField::StartDate => Some(a.start_date.cmp(&b.start_date)),
            SortField::DueDate => Some(a.due_date.cmp(&b.due_date)),
            SortField::RatioDone => Some(a.ratio_done.cmp(&b.ratio_done)),
            SortField::Status => Some(a.status_id.cmp(&b.status_id)),
            SortField::Priority => return self.nulls_last(a.priority_id, b.priority_id),
            SortField::Assignee => {
                return self.nulls_last(
                    a.assigned_to_name.as_deref().map(str::to_lowercase),
                    b.assigned_to_name.as_deref().map(str::to_lowercase),
                )
            }
            SortField::Version => return self.nulls_last(a.fixed_version_id, b.fixed_version_id),
        };
        ord.map(|o| self.directed(o)).unwrap_or(Ordering::Equal)
    }

    fn directed(&self, ord: Ordering) -> Ordering {
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }

    fn nulls_last<T: Ord>(&self, a: Option<T>, b: Option<T>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => self.directed(a.cmp(&b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Stable in-place sort by `config`, or by `display_order` when unset.
pub fn sort_tasks(tasks: &mut [&Task], config: Option<&SortConfig>) {
    match config {
        Some(cfg) => tasks.sort_by(|a, b| cfg.compare(a, b)),
        None => tasks.sort_by_key(|t| t.display_order),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TaskId, DAY_MS};

    fn ids(tasks: &[&Task]) -> Vec<TaskId> {
        tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_toggle_cycle() {
        let first = SortConfig::toggle(None, SortField::DueDate);
        assert_eq!(first, Some(SortConfig::ascending(SortField::DueDate)));
        let second = SortConfig::toggle(first, SortField::DueDate);
        assert_eq!(second.map(|c| c.direction), Some(SortDirection::Descending));
        assert_eq!(SortConfig::toggle(second, SortField::DueDate), None);
        assert_eq!(
            SortConfig::toggle(second, SortField::Subject),
            Some(SortConfig::ascending(SortField::Subject))
        );
    }

    #[test]
    fn test_nulls_last_both_directions() {
        let mut a = Task::new(1, "a", 0, DAY_MS);
        a.priority_id = Some(2);
        let b = Task::new(2, "b", 0, DAY_MS);
        let mut c = Task::new(3, "c", 0, DAY_MS);
        c.priority_id = Some(5);

        let mut list = vec![&b, &a, &c];
        sort_tasks(&mut list, Some(&SortConfig::ascending(SortField::Priority)));
        assert_eq!(ids(&list), vec![TaskId(1), TaskId(3), TaskId(2)]);

        let desc = SortConfig {
            field: SortField::Priority,
            direction: SortDirection::Descending,
        };
        sort_tasks(&mut list, Some(&desc));
        assert_eq!(ids(&list), vec![TaskId(3), TaskId(1), TaskId(2)]);
    }

    #[test]
    fn test_display_order_default_is_stable() {
        let mut a = Task::new(1, "a", 0, DAY_MS);
        a.display_order = 5;
        let mut b = Task::new(2, "b", 0, DAY_MS);
        b.display_order = 1;
        let mut c = Task::new(3, "c", 0, DAY_MS);
        c.display_order = 5;
        let mut list = vec![&a, &b, &c];
        sort_tasks(&mut list, None);
        assert_eq!(ids(&list), vec![TaskId(2), TaskId(1), TaskId(3)]);
    }
}
