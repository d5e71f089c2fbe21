//! Release and tap decisions for swipeable items.

use serde::{Deserialize, Serialize};

use crate::SwipeConfig;

/// Outcome of releasing a horizontal swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Release {
    /// Far enough to delete without confirmation.
    Dismiss,
    /// Rest at the snap position with the delete button revealed.
    SnapOpen,
    /// Return to rest.
    SnapClosed,
}

/// Where a tap landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TapTarget {
    /// The card body.
    Card,
    /// The delete button behind the card.
    DeleteButton,
}

/// Outcome of a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TapOutcome {
    /// Close the open item; the primary action is suppressed.
    Close,
    /// Run the item's primary action (open the editor).
    PrimaryAction,
    /// Delete the item.
    Delete,
    /// Nothing happens.
    Ignored,
}

/// Threshold-based resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolver {
    open_at: f32,
    delete_at: f32,
}

impl Resolver {
    /// Build a resolver from the configured thresholds.
    #[must_use]
    pub fn new(config: &SwipeConfig) -> Self {
        Self {
            open_at: config.open_threshold(),
            delete_at: config.delete_threshold(),
        }
    }

    /// Decide what a release at `offset` does. Both thresholds are inclusive.
    #[must_use]
    pub fn release(&self, offset: f32) -> Release {
        let release = if offset <= self.delete_at {
            Release::Dismiss
        } else if offset <= self.open_at {
            Release::SnapOpen
        } else {
            Release::SnapClosed
        };
        tracing::debug!(offset, ?release, "swipe released");
        release
    }

    /// Decide what a tap does given the item's state.
    #[must_use]
    pub const fn tap(target: TapTarget, open: bool, dismissing: bool) -> TapOutcome {
        if dismissing {
            return TapOutcome::Ignored;
        }
        match (target, open) {
            (TapTarget::DeleteButton, true) => TapOutcome::Delete,
            (TapTarget::DeleteButton, false) => TapOutcome::Ignored,
            (TapTarget::Card, true) => TapOutcome::Close,
            (TapTarget::Card, false) => TapOutcome::PrimaryAction,
        }
    }
}
