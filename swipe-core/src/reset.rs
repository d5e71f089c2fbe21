//! "Only one item open" coordination.
//!
//! The owning list publishes a [`ResetToken`] whenever an item begins a
//! delete gesture or snaps open. Items remember the last version they saw;
//! a new version closes every item except the one that caused it.

use serde::{Deserialize, Serialize};

use crate::ItemId;

/// A reset broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetToken {
    /// Monotonic broadcast version.
    pub version: u64,
    /// Item that triggered the broadcast; `None` closes everything.
    pub origin: Option<ItemId>,
}

impl ResetToken {
    /// Whether an item with `id` should close in response to this token.
    #[must_use]
    pub fn closes(&self, id: ItemId) -> bool {
        self.origin != Some(id)
    }
}

/// The list-side broadcaster.
#[derive(Debug, Clone, Default)]
pub struct ResetSignal {
    current: ResetToken,
}

impl ResetSignal {
    /// Create a broadcaster at version 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a reset caused by `origin`.
    pub fn bump(&mut self, origin: ItemId) -> ResetToken {
        self.publish(Some(origin))
    }

    /// Publish a reset that closes every item.
    pub fn close_all(&mut self) -> ResetToken {
        self.publish(None)
    }

    /// The latest token.
    #[must_use]
    pub const fn current(&self) -> ResetToken {
        self.current
    }

    fn publish(&mut self, origin: Option<ItemId>) -> ResetToken {
        self.current = ResetToken {
            version: self.current.version.wrapping_add(1),
            origin,
        };
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_increments_version() {
        let mut signal = ResetSignal::new();
        let id = ItemId::new();
        let first = signal.bump(id);
        let second = signal.bump(id);
        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);
        assert_eq!(signal.current(), second);
    }

    #[test]
    fn origin_is_spared() {
        let mut signal = ResetSignal::new();
        let origin = ItemId::new();
        let other = ItemId::new();
        let token = signal.bump(origin);
        assert!(!token.closes(origin));
        assert!(token.closes(other));
    }

    #[test]
    fn close_all_spares_nobody() {
        let mut signal = ResetSignal::new();
        let token = signal.close_all();
        assert!(token.closes(ItemId::new()));
    }
}
