//! Timeline core for a Gantt view over issue-tracker tasks.
//!
//! The crate turns tasks, relations and versions into an ordered row layout,
//! maps time and rows to pixels, draws only what is visible through a
//! [`render::Surface`], and turns pointer and keyboard input into edits on a
//! [`store::GanttStore`]. Nothing here depends on a GUI toolkit; the binary
//! in this package is one host for it.

pub mod backend;
pub mod config;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod io;
pub mod layout;
pub mod model;
pub mod notification;
pub mod render;
pub mod store;
pub mod viewport;

pub use backend::{GanttBackend, MemoryBackend, RelationRequest};
pub use config::GanttConfig;
pub use error::{BackendError, ConfigError, GanttError, SaveError};
pub use geometry::{Point, Rect};
pub use interaction::{GestureOutcome, Interaction, Key};
pub use model::{
    Dataset, LayoutRow, Relation, RelationType, Task, TaskId, TaskPatch, Version, Viewport,
    ViewportPatch, ZoomLevel, DAY_MS,
};
pub use notification::{NoticeKind, NoticeLevel, Notification};
pub use store::{GanttState, GanttStore, PendingSave};
