use serde::{Deserialize, Serialize};

use super::task::DAY_MS;
use crate::layout::snap::SnapUnit;

/// Discrete granularity of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoomLevel {
    Month,
    Week,
    Day,
    Hour,
}

impl ZoomLevel {
    pub const ALL: [ZoomLevel; 4] = [
        ZoomLevel::Month,
        ZoomLevel::Week,
        ZoomLevel::Day,
        ZoomLevel::Hour,
    ];

    /// Pixels per day this level draws at unless the user rescaled it.
    pub fn pixels_per_day(self) -> f64 {
        match self {
            ZoomLevel::Month => 4.0,
            ZoomLevel::Week => 14.0,
            ZoomLevel::Day => 40.0,
            ZoomLevel::Hour => 40.0 * 24.0,
        }
    }

    /// Fixed scale in pixels per millisecond.
    pub fn default_scale(self) -> f64 {
        self.pixels_per_day() / DAY_MS as f64
    }

    /// Grid that bars and drags snap to at this level.
    pub fn snap_unit(self) -> SnapUnit {
        match self {
            ZoomLevel::Month => SnapUnit::Month,
            ZoomLevel::Week => SnapUnit::Week,
            ZoomLevel::Day | ZoomLevel::Hour => SnapUnit::Day,
        }
    }

    /// Edge arrows clutter the fine levels, so only coarse ones show them.
    pub fn shows_dependency_indicators(self) -> bool {
        matches!(self, ZoomLevel::Month | ZoomLevel::Week)
    }

    pub fn label(self) -> &'static str {
        match self {
            ZoomLevel::Month => "Month",
            ZoomLevel::Week => "Week",
            ZoomLevel::Day => "Day",
            ZoomLevel::Hour => "Hour",
        }
    }
}

/// Scroll and zoom state of the visible timeline window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Epoch ms at timeline pixel x = 0 (not screen x = 0).
    pub start_date: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
    /// Pixels per millisecond.
    pub scale: f64,
    pub width: f64,
    pub height: f64,
    pub row_height: f64,
}

impl Viewport {
    pub fn new(start_date: f64, zoom: ZoomLevel, width: f64, height: f64, row_height: f64) -> Self {
        Self {
            start_date,
            scroll_x: 0.0,
            scroll_y: 0.0,
            scale: zoom.default_scale(),
            width,
            height,
            row_height,
        }
    }

    /// Instant at the left screen edge.
    pub fn visible_start(&self) -> f64 {
        self.start_date + self.scroll_x / self.scale
    }

    /// Instant at the right screen edge.
    pub fn visible_end(&self) -> f64 {
        self.start_date + (self.scroll_x + self.width) / self.scale
    }

    /// Largest vertical scroll that still shows content.
    pub fn max_scroll_y(&self, row_count: usize) -> f64 {
        (row_count as f64 * self.row_height - self.height).max(0.0)
    }
}

/// Partial update for [`Viewport`]; `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportPatch {
    pub start_date: Option<f64>,
    pub scroll_x: Option<f64>,
    pub scroll_y: Option<f64>,
    pub scale: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub row_height: Option<f64>,
}

impl ViewportPatch {
    pub fn scroll(scroll_x: f64, scroll_y: f64) -> Self {
        Self {
            scroll_x: Some(scroll_x),
            scroll_y: Some(scroll_y),
            ..Default::default()
        }
    }

    pub fn size(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }

    pub(crate) fn apply_raw(&self, viewport: &mut Viewport) {
        if let Some(v) = self.start_date {
            viewport.start_date = v;
        }
        if let Some(v) = self.scroll_x {
            viewport.scroll_x = v;
        }
        if let Some(v) = self.scroll_y {
            viewport.scroll_y = v;
        }
        if let Some(v) = self.scale.filter(|s| s.is_finite() && *s > 0.0) {
            viewport.scale = v;
        }
        if let Some(v) = self.width {
            viewport.width = v.max(0.0);
        }
        if let Some(v) = self.height {
            viewport.height = v.max(0.0);
        }
        if let Some(v) = self.row_height.filter(|h| *h > 0.0) {
            viewport.row_height = v;
        }
    }
}
