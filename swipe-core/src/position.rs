//! Horizontal offset of a swiped card.

use crate::SwipeConfig;

/// Damp the part of `raw` that lies beyond `snap_position`.
///
/// Positive offsets clamp to zero; offsets past the snap position keep only
/// `resistance` of the excess.
#[must_use]
pub fn rubber_band(raw: f32, snap_position: f32, resistance: f32) -> f32 {
    if raw > 0.0 {
        0.0
    } else if raw < snap_position {
        snap_position + (raw - snap_position) * resistance
    } else {
        raw
    }
}

/// Live offset of one item card.
///
/// The offset is never positive: items only slide left.
#[derive(Debug, Clone)]
pub struct SwipePosition {
    snap_position: f32,
    resistance: f32,
    baseline: f32,
    offset: f32,
}

impl SwipePosition {
    /// Create a closed position model.
    #[must_use]
    pub fn new(config: &SwipeConfig) -> Self {
        Self {
            snap_position: config.snap_position,
            resistance: config.resistance,
            baseline: 0.0,
            offset: 0.0,
        }
    }

    /// Fix the drag baseline for a new touch sequence.
    pub fn begin(&mut self, open: bool) {
        self.baseline = if open { self.snap_position } else { 0.0 };
    }

    /// Apply horizontal distance `dx` from the touch start.
    pub fn drag(&mut self, dx: f32) -> f32 {
        self.offset = rubber_band(self.baseline + dx, self.snap_position, self.resistance);
        self.offset
    }

    /// Jump to an offset chosen by snapping or the exit animation.
    pub fn set(&mut self, offset: f32) {
        self.offset = offset.min(0.0);
    }

    /// Move to the open snap position.
    pub fn snap_open(&mut self) {
        self.offset = self.snap_position;
    }

    /// Move back to rest.
    pub fn close(&mut self) {
        self.offset = 0.0;
    }

    /// Current offset.
    #[must_use]
    pub const fn offset(&self) -> f32 {
        self.offset
    }

    /// Baseline of the current sequence.
    #[must_use]
    pub const fn baseline(&self) -> f32 {
        self.baseline
    }

    /// How far the delete button is revealed, from 0 to 1.
    #[must_use]
    pub fn reveal_progress(&self) -> f32 {
        (self.offset.abs() / self.snap_position.abs()).min(1.0)
    }
}
