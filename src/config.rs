use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::layout::snap::offset_from_minutes;
use crate::model::{ProjectId, ZoomLevel, DAY_MS};

/// Runtime tuning. Every field has a default, so partial files are fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GanttConfig {
    pub row_height: f64,
    pub default_zoom: ZoomLevel,
    /// Width of the resize zone at each end of a bar.
    pub edge_hit_px: f64,
    pub link_hotspot_radius: f64,
    /// Horizontal pan per arrow key press.
    pub pan_step_px: f64,
    pub connector_buffer_rows: usize,
    /// Scrollable time after the last due date.
    pub scroll_padding_days: f64,
    pub scroll_to_task_buffer_days: f64,
    pub zoom_safety_buffer_ms: f64,
    pub connector_cache_capacity: usize,
    /// Frames an unused connector route stays cached.
    pub connector_cache_max_age: u64,
    /// Display time zone used for day, week and month snapping.
    pub utc_offset_minutes: i32,
    pub current_project_id: Option<ProjectId>,
}

impl Default for GanttConfig {
    fn default() -> Self {
        Self {
            row_height: 32.0,
            default_zoom: ZoomLevel::Week,
            edge_hit_px: 8.0,
            link_hotspot_radius: 6.0,
            pan_step_px: 40.0,
            connector_buffer_rows: 10,
            scroll_padding_days: 30.0,
            scroll_to_task_buffer_days: 7.0,
            zoom_safety_buffer_ms: DAY_MS as f64,
            connector_cache_capacity: 2048,
            connector_cache_max_age: 120,
            utc_offset_minutes: 0,
            current_project_id: None,
        }
    }
}

impl GanttConfig {
    pub fn config_path() -> PathBuf {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "RustGanttTimeline") {
            proj_dirs.config_dir().join("config.json")
        } else {
            PathBuf::from(".").join("config.json")
        }
    }

    /// Load from the per-user config location.
    pub fn load() -> Self {
        Self::load_or_default(&Self::config_path())
    }

    /// A missing file yields defaults silently; an unreadable one with a warning.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn display_offset(&self) -> FixedOffset {
        offset_from_minutes(self.utc_offset_minutes)
    }

    pub fn scroll_padding_ms(&self) -> f64 {
        self.scroll_padding_days * DAY_MS as f64
    }

    pub fn scroll_to_task_buffer_ms(&self) -> f64 {
        self.scroll_to_task_buffer_days * DAY_MS as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg: GanttConfig = serde_json::from_str(r#"{ "row_height": 24.0 }"#).unwrap();
        assert_eq!(cfg.row_height, 24.0);
        assert_eq!(cfg.edge_hit_px, 8.0);
        assert_eq!(cfg.default_zoom, ZoomLevel::Week);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let cfg = GanttConfig {
            utc_offset_minutes: 120,
            current_project_id: Some(ProjectId(3)),
            ..Default::default()
        };
        cfg.save_to(&path).unwrap();
        assert_eq!(GanttConfig::load_from(&path).unwrap(), cfg);
        assert_eq!(cfg.display_offset().local_minus_utc(), 7200);
    }

    #[test]
    fn test_malformed_or_missing_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert_eq!(GanttConfig::load_or_default(&path), GanttConfig::default());

        std::fs::write(&path, "{ not json").unwrap();
        assert!(GanttConfig::load_from(&path).is_err());
        assert_eq!(GanttConfig::load_or_default(&path), GanttConfig::default());
    }
}
