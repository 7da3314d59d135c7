//! Editor configuration.

use crate::region::SerializableColor;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for an editor instance.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Canvas width in content pixels.
    pub width: u32,
    /// Canvas height in content pixels.
    pub height: u32,
    /// Hit radius of vertices placed by single clicks.
    pub vertex_radius: f64,
    /// Color of vertices placed by single clicks.
    pub vertex_color: SerializableColor,
    /// Hit radius of vertices placed while long-pressing.
    pub lasso_vertex_radius: f64,
    /// Color of vertices placed while long-pressing.
    pub lasso_vertex_color: SerializableColor,
    /// Color of synthesized curve control vertices.
    pub control_color: SerializableColor,
    /// Maximum number of snapshots kept for undo.
    pub history_capacity: usize,
    /// Delay before a drag snapshot is committed, in milliseconds.
    pub debounce_ms: u64,
    /// Samples per cubic segment when approximating curves as polygons.
    pub curve_samples: usize,
    /// Scale change per wheel notch.
    pub zoom_step: f64,
    /// Upper scale bound.
    pub max_scale: f64,
    /// Minimap width in device pixels.
    pub minimap_width: f64,
    /// Minimap height in device pixels.
    pub minimap_height: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 500,
            vertex_radius: 5.0,
            vertex_color: SerializableColor::black(),
            lasso_vertex_radius: 2.0,
            lasso_vertex_color: SerializableColor::transparent(),
            control_color: SerializableColor::new(128, 128, 128, 255),
            history_capacity: crate::history::DEFAULT_HISTORY_CAPACITY,
            debounce_ms: 200,
            curve_samples: crate::geometry::DEFAULT_CURVE_SAMPLES,
            zoom_step: 0.1,
            max_scale: 10.0,
            minimap_width: 200.0,
            minimap_height: 125.0,
        }
    }
}

impl EditorConfig {
    /// Debounce delay as a `Duration`.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
