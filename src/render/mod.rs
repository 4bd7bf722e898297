pub mod pipeline;
pub mod router;
pub mod surface;
pub mod virtualize;

pub use pipeline::{render_frame, FrameInput, FrameOptions, FrameStats};
pub use router::{route_connector, ConnectorCache, RouteParams};
pub use surface::{Layer, Paint, RecordingSurface, Stroke, Surface};
pub use virtualize::{buffered_row_range, slice_tasks_in_row_range, visible_row_range};
