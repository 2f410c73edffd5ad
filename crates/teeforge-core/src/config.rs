//! Designer configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default fraction of the print area a fresh upload occupies.
pub const DEFAULT_FILL_RATIO: f64 = 0.8;

/// Default id of the element tagging a template's print area.
pub const DEFAULT_PRINT_AREA_ID: &str = "print-area";

/// Tunables for placement, interaction and layout settling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerConfig {
    /// Fraction of the print-area bounds a new layer occupies.
    pub fill_ratio: f64,
    /// Smallest width or height a resize may produce.
    pub min_layer_size: f64,
    /// Preserve aspect ratio while resizing.
    pub lock_aspect_ratio: bool,
    /// Snap increment for the rotation handle, in degrees (0 disables).
    pub rotation_snap_degrees: f64,
    /// Handle hit radius in pixels.
    pub handle_hit_tolerance: f64,
    /// Distance from the top edge to the rotation handle.
    pub rotate_handle_offset: f64,
    /// Fixed-delay fallback before reading geometry after a render.
    pub settle_delay_ms: u64,
    /// Element id marking the print area in templates.
    pub print_area_id: String,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            fill_ratio: DEFAULT_FILL_RATIO,
            min_layer_size: 10.0,
            lock_aspect_ratio: true,
            rotation_snap_degrees: 15.0,
            handle_hit_tolerance: 12.0,
            rotate_handle_offset: 25.0,
            settle_delay_ms: 100,
            print_area_id: DEFAULT_PRINT_AREA_ID.to_string(),
        }
    }
}

impl DesignerConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_fill_ratio(mut self, ratio: f64) -> Self {
        self.fill_ratio = ratio.clamp(0.05, 1.0);
        self
    }

    pub fn with_aspect_lock(mut self, locked: bool) -> Self {
        self.lock_aspect_ratio = locked;
        self
    }

    pub fn with_min_layer_size(mut self, size: f64) -> Self {
        self.min_layer_size = size.max(1.0);
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_print_area_id(mut self, id: impl Into<String>) -> Self {
        self.print_area_id = id.into();
        self
    }

    /// Settle delay as a duration.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DesignerConfig::new();
        assert!((config.fill_ratio - 0.8).abs() < f64::EPSILON);
        assert!(config.lock_aspect_ratio);
        assert_eq!(config.print_area_id, "print-area");
        assert_eq!(config.settle_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{"lock_aspect_ratio": false, "settle_delay_ms": 250}"#;
        let config = DesignerConfig::from_json(json).unwrap();
        assert!(!config.lock_aspect_ratio);
        assert_eq!(config.settle_delay_ms, 250);
        assert!((config.min_layer_size - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_builder_clamps_ratio() {
        let config = DesignerConfig::new().with_fill_ratio(3.0);
        assert!((config.fill_ratio - 1.0).abs() < f64::EPSILON);
    }
}
