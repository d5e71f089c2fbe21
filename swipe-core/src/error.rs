//! Error types for swipe controller operations.

use thiserror::Error;

use crate::ItemId;

/// Result type for swipe controller operations.
pub type SwipeResult<T> = Result<T, SwipeError>;

/// Errors that can occur while configuring or managing swipeable lists.
///
/// Gesture handling itself never fails: ambiguous input is resolved by the
/// dead-zone rule and input for unknown items is ignored.
#[derive(Debug, Error)]
pub enum SwipeError {
    /// Swipe configuration failed validation.
    #[error("Invalid swipe configuration: {0}")]
    InvalidConfig(String),

    /// An item with this ID is already mounted in the list.
    #[error("Item already mounted: {0}")]
    DuplicateItem(ItemId),

    /// No item with this ID is mounted in the list.
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// Configuration serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
