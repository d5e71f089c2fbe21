//! Raw touch input delivered to list items.

use serde::{Deserialize, Serialize};

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    /// Touch started (finger down).
    Start,
    /// Touch moved (finger dragging).
    Move,
    /// Touch ended (finger up).
    End,
    /// Touch cancelled by the platform.
    Cancel,
}

/// A single touch point in viewport (client) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Touch identifier (for multi-touch).
    pub id: u32,
    /// X position in pixels.
    pub x: f32,
    /// Y position in pixels.
    pub y: f32,
}

impl TouchPoint {
    /// Create the primary touch point at the given position.
    #[must_use]
    pub const fn primary(x: f32, y: f32) -> Self {
        Self { id: 0, x, y }
    }
}

/// A touch event with the touches still on the surface.
///
/// End and cancel events usually carry no touches; only the phase and the
/// timestamp matter for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    /// Phase of this touch event.
    pub phase: TouchPhase,
    /// All current touch points.
    #[serde(default)]
    pub touches: Vec<TouchPoint>,
    /// Monotonic timestamp in milliseconds.
    pub timestamp_ms: u64,
}

impl TouchEvent {
    /// Create a new touch event.
    #[must_use]
    pub fn new(phase: TouchPhase, touches: Vec<TouchPoint>, timestamp_ms: u64) -> Self {
        Self {
            phase,
            touches,
            timestamp_ms,
        }
    }

    /// Single-finger touch start.
    #[must_use]
    pub fn start(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self::new(TouchPhase::Start, vec![TouchPoint::primary(x, y)], timestamp_ms)
    }

    /// Single-finger move.
    #[must_use]
    pub fn moved(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self::new(TouchPhase::Move, vec![TouchPoint::primary(x, y)], timestamp_ms)
    }

    /// Finger lifted.
    #[must_use]
    pub fn end(timestamp_ms: u64) -> Self {
        Self::new(TouchPhase::End, Vec::new(), timestamp_ms)
    }

    /// Sequence cancelled by the platform.
    #[must_use]
    pub fn cancel(timestamp_ms: u64) -> Self {
        Self::new(TouchPhase::Cancel, Vec::new(), timestamp_ms)
    }

    /// Get the primary (first) touch point.
    #[must_use]
    pub fn primary_touch(&self) -> Option<&TouchPoint> {
        self.touches.first()
    }

    /// Check if this is a multi-touch event.
    #[must_use]
    pub fn is_multi_touch(&self) -> bool {
        self.touches.len() > 1
    }
}
