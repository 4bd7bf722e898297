pub mod dataset;
pub mod layout_row;
pub mod relation;
pub mod schedule;
pub mod task;
pub mod version;
pub mod viewport;

pub use dataset::Dataset;
pub use layout_row::LayoutRow;
pub use relation::{Relation, RelationType};
pub use task::{ProjectId, RelationId, Task, TaskId, TaskPatch, UserId, VersionId, DAY_MS};
pub use version::Version;
pub use viewport::{Viewport, ViewportPatch, ZoomLevel};
