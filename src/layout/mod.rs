pub mod builder;
pub mod cluster;
pub mod coords;
pub mod filter;
pub mod snap;
pub mod sort;

pub use builder::{build_layout, ExpandMap, Layout, LayoutInput, ViewOptions};
pub use coords::{bar_bounds, hit_bounds, time_to_x, x_to_time, BoundsKind};
pub use filter::{filter_tasks, AssigneeFilter, FilterOptions};
pub use snap::{SnapUnit, TimeGrid};
pub use sort::{SortConfig, SortDirection, SortField};
