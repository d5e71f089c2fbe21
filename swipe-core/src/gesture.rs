//! # Gesture Classification
//!
//! Decides, once per touch sequence, whether a finger is swiping an item
//! sideways or scrolling the list.
//!
//! ```text
//! start ──► Undecided ──(|dx| ≥ 8 or |dy| ≥ 8)──► Horizontal  (|dx| > |dy|)
//!              │                               └► Vertical    (otherwise)
//!              └──(end inside dead-zone)──────► tap / non-event
//! ```
//!
//! The verdict is final: a sequence that starts scrolling never becomes a
//! swipe, and a swipe never hands control back to the scroller.

use serde::{Deserialize, Serialize};

/// Axis verdict for the current touch sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureState {
    /// Movement has stayed inside the dead-zone.
    #[default]
    Undecided,
    /// Sideways swipe; the item tracks the finger.
    Horizontal,
    /// Vertical scroll; the item ignores the sequence.
    Vertical,
}

/// What a move sample means for the item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveVerdict {
    /// No touch sequence is active.
    Inactive,
    /// Still inside the dead-zone.
    Ignored,
    /// This sample classified the sequence as a swipe.
    BeganHorizontal {
        /// Horizontal distance from the start point.
        dx: f32,
    },
    /// A continuing swipe.
    Horizontal {
        /// Horizontal distance from the start point.
        dx: f32,
    },
    /// The sequence is a scroll.
    Vertical,
}

/// Start point of the active sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TouchTrack {
    start_x: f32,
    start_y: f32,
}

/// Dead-zone plus axis-dominance classifier for one list item.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    dead_zone: f32,
    track: Option<TouchTrack>,
    state: GestureState,
}

impl GestureClassifier {
    /// Create a classifier with the given dead-zone in pixels.
    #[must_use]
    pub fn new(dead_zone: f32) -> Self {
        Self {
            dead_zone,
            track: None,
            state: GestureState::Undecided,
        }
    }

    /// Begin a new touch sequence at `(x, y)`.
    pub fn begin(&mut self, x: f32, y: f32) {
        self.track = Some(TouchTrack {
            start_x: x,
            start_y: y,
        });
        self.state = GestureState::Undecided;
    }

    /// Feed a move sample.
    pub fn observe(&mut self, x: f32, y: f32) -> MoveVerdict {
        let Some(track) = self.track else {
            return MoveVerdict::Inactive;
        };
        let dx = x - track.start_x;
        let dy = y - track.start_y;

        match self.state {
            GestureState::Horizontal => MoveVerdict::Horizontal { dx },
            GestureState::Vertical => MoveVerdict::Vertical,
            GestureState::Undecided => {
                if dx.abs() < self.dead_zone && dy.abs() < self.dead_zone {
                    return MoveVerdict::Ignored;
                }
                if dx.abs() > dy.abs() {
                    self.state = GestureState::Horizontal;
                    tracing::debug!(dx, dy, "gesture classified horizontal");
                    MoveVerdict::BeganHorizontal { dx }
                } else {
                    self.state = GestureState::Vertical;
                    tracing::debug!(dx, dy, "gesture classified vertical");
                    MoveVerdict::Vertical
                }
            }
        }
    }

    /// End the sequence, returning its final verdict.
    pub fn finish(&mut self) -> GestureState {
        self.track = None;
        std::mem::take(&mut self.state)
    }

    /// Current verdict.
    #[must_use]
    pub const fn state(&self) -> GestureState {
        self.state
    }

    /// Whether a touch sequence is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.track.is_some()
    }
}
