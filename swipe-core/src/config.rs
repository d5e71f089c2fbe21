//! Tunables for the swipe-to-dismiss interaction.

use serde::{Deserialize, Serialize};

use crate::error::{SwipeError, SwipeResult};

/// Distances, ratios and timings for swipe-to-dismiss.
///
/// All distances are in CSS pixels. `snap_position` is negative because items
/// only ever slide left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeConfig {
    /// Movement (per axis) required before a touch is classified.
    pub dead_zone: f32,
    /// Resting offset of an open item, revealing the delete button.
    pub snap_position: f32,
    /// Magnitude of the auto-delete threshold.
    pub auto_delete_distance: f32,
    /// Fraction of `auto_delete_distance` at which release deletes.
    pub auto_delete_ratio: f32,
    /// Fraction of the snap distance at which release snaps open.
    pub open_ratio: f32,
    /// Damping applied to drag beyond the snap position.
    pub resistance: f32,
    /// Duration of the exit animation before the deletion callback fires.
    pub exit_duration_ms: u64,
    /// Width of the viewport; dismissed items slide this far left.
    pub viewport_width: f32,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            dead_zone: 8.0,
            snap_position: -80.0,
            auto_delete_distance: 140.0,
            auto_delete_ratio: 0.75,
            open_ratio: 0.5,
            resistance: 0.3,
            exit_duration_ms: 300,
            viewport_width: 390.0,
        }
    }
}

impl SwipeConfig {
    /// Parse and validate a configuration from JSON.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`SwipeError::Serialization`] for malformed JSON and
    /// [`SwipeError::InvalidConfig`] if validation fails.
    pub fn from_json(json: &str) -> SwipeResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Same configuration with a different viewport width.
    #[must_use]
    pub fn with_viewport_width(mut self, viewport_width: f32) -> Self {
        self.viewport_width = viewport_width;
        self
    }

    /// Offset at or beyond which a release snaps open (−40 by default).
    #[must_use]
    pub fn open_threshold(&self) -> f32 {
        self.snap_position * self.open_ratio
    }

    /// Offset at or beyond which a release deletes (−105 by default).
    #[must_use]
    pub fn delete_threshold(&self) -> f32 {
        -(self.auto_delete_distance * self.auto_delete_ratio)
    }

    /// Offset that moves a card fully off-screen.
    #[must_use]
    pub fn exit_offset(&self) -> f32 {
        -self.viewport_width
    }

    /// Check the configuration for values the controller cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`SwipeError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> SwipeResult<()> {
        let finite = [
            self.dead_zone,
            self.snap_position,
            self.auto_delete_distance,
            self.auto_delete_ratio,
            self.open_ratio,
            self.resistance,
            self.viewport_width,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(SwipeError::InvalidConfig(
                "values must be finite".to_string(),
            ));
        }
        if self.dead_zone <= 0.0 {
            return Err(SwipeError::InvalidConfig(format!(
                "dead_zone must be positive, got {}",
                self.dead_zone
            )));
        }
        if self.snap_position >= 0.0 {
            return Err(SwipeError::InvalidConfig(format!(
                "snap_position must be negative, got {}",
                self.snap_position
            )));
        }
        for (name, ratio) in [
            ("auto_delete_ratio", self.auto_delete_ratio),
            ("open_ratio", self.open_ratio),
            ("resistance", self.resistance),
        ] {
            if ratio <= 0.0 || ratio > 1.0 {
                return Err(SwipeError::InvalidConfig(format!(
                    "{name} must be in (0, 1], got {ratio}"
                )));
            }
        }
        if self.delete_threshold() >= self.snap_position {
            return Err(SwipeError::InvalidConfig(format!(
                "delete threshold {} must lie beyond snap position {}",
                self.delete_threshold(),
                self.snap_position
            )));
        }
        if self.viewport_width <= 0.0 {
            return Err(SwipeError::InvalidConfig(format!(
                "viewport_width must be positive, got {}",
                self.viewport_width
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds() {
        let config = SwipeConfig::default();
        assert!((config.open_threshold() - -40.0).abs() < f32::EPSILON);
        assert!((config.delete_threshold() - -105.0).abs() < f32::EPSILON);
        assert!((config.exit_offset() - -390.0).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn from_json_fills_defaults() {
        let config = SwipeConfig::from_json(r#"{"viewport_width": 1024.0}"#).expect("config");
        assert!((config.viewport_width - 1024.0).abs() < f32::EPSILON);
        assert_eq!(config.exit_duration_ms, 300);
    }

    #[test]
    fn from_json_rejects_garbage() {
        let err = SwipeConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, SwipeError::Serialization(_)));
    }

    #[test]
    fn rejects_positive_snap() {
        let config = SwipeConfig {
            snap_position: 80.0,
            ..SwipeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SwipeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_resistance_out_of_range() {
        let config = SwipeConfig {
            resistance: 1.5,
            ..SwipeConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("resistance"));
    }

    #[test]
    fn rejects_delete_threshold_inside_snap() {
        let config = SwipeConfig {
            auto_delete_distance: 90.0,
            ..SwipeConfig::default()
        };
        // 90 * 0.75 = 67.5, closer than the snap position
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_nan() {
        let config = SwipeConfig {
            dead_zone: f32::NAN,
            ..SwipeConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
