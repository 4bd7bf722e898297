pub mod gantt_chart;
pub mod surface;
pub mod theme;
pub mod toolbar;
