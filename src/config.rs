//! Interaction tunables for the canvas controller.
//!
//! Node sizing is deliberately *not* configurable here: the default width and
//! the per-type height estimates live in [`hit_test`](crate::hit_test) so that
//! rendering, hit testing, snapping and grouping all read the same numbers.

use crate::error::CanvasError;
use serde::{Deserialize, Serialize};

/// Tunable constants used by [`CanvasController`](crate::CanvasController).
///
/// Screen-space values (suffix "px" below) are divided by the current zoom
/// before being compared against canvas coordinates, so they feel the same at
/// every zoom level. Canvas-space values are applied as-is.
///
/// Every field has a default, so a TOML document only needs the keys it wants
/// to override:
///
/// ```
/// use workflow_canvas::CanvasConfig;
///
/// let config = CanvasConfig::from_toml_str("snap_threshold = 12.0").unwrap();
/// assert_eq!(config.snap_threshold, 12.0);
/// assert_eq!(config.history_capacity, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Magnetic snap tolerance in px.
    pub snap_threshold: f32,
    /// Gap left between two nodes after a collision nudge, in canvas units.
    /// Not scaled by zoom.
    pub collision_padding: f32,
    /// Lower zoom bound.
    pub min_zoom: f32,
    /// Upper zoom bound.
    pub max_zoom: f32,
    /// Exponential zoom factor per unit of wheel delta.
    pub zoom_sensitivity: f32,
    /// Number of snapshots kept by the history ring.
    pub history_capacity: usize,
    /// Smallest width a resize gesture may produce, in canvas units.
    pub min_node_width: f32,
    /// Smallest height a resize gesture may produce, in canvas units.
    pub min_node_height: f32,
    /// A marquee must be wider and taller than this (px) to create a group.
    pub marquee_min_size: f32,
    /// Space added around the tight bounds of grouped nodes, in canvas units.
    pub group_padding: f32,
    /// Radius around a port centre that counts as a hit, in px.
    pub port_hit_radius: f32,
    /// Side of the square resize handle at a node's bottom-right corner, in px.
    pub resize_handle_size: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            snap_threshold: 8.0,
            collision_padding: 20.0,
            min_zoom: 0.2,
            max_zoom: 3.0,
            zoom_sensitivity: 0.0015,
            history_capacity: 50,
            min_node_width: 360.0,
            min_node_height: 240.0,
            marquee_min_size: 10.0,
            group_padding: 40.0,
            port_hit_radius: 16.0,
            resize_handle_size: 24.0,
        }
    }
}

impl CanvasConfig {
    /// Parse a (possibly partial) TOML document over the defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, CanvasError> {
        let config: Self = toml::from_str(source)?;
        Ok(config.normalized())
    }

    /// Repair values that would make the controller misbehave: inverted or
    /// non-positive zoom bounds and a zero-capacity history.
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.min_zoom.is_finite() && self.min_zoom > 0.0) {
            self.min_zoom = defaults.min_zoom;
        }
        if !(self.max_zoom.is_finite() && self.max_zoom > 0.0) {
            self.max_zoom = defaults.max_zoom;
        }
        if self.min_zoom > self.max_zoom {
            std::mem::swap(&mut self.min_zoom, &mut self.max_zoom);
        }
        if self.history_capacity == 0 {
            self.history_capacity = 1;
        }
        self
    }
}
