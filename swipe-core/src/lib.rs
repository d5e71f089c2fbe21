//! # Swipe Core
//!
//! Swipe-to-dismiss interaction for the household planner's list items
//! (tasks on the week calendar, entries on the wishlist).
//! Compiles to WASM so the PWA and native tools share one implementation.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              swipe-core.wasm                │
//! ├─────────────────────────────────────────────┤
//! │  SwipeList          │  SwipeController      │
//! │  - Reset broadcast  │  - Gesture classifier │
//! │  - Pending deletes  │  - Position model     │
//! │  - Presentation     │  - Snap/dismiss       │
//! │                     │  - Dismiss animator   │
//! ├─────────────────────────────────────────────┤
//! │  Frame coalescer    │  Config & errors      │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod controller;
pub mod dismiss;
pub mod error;
pub mod event;
pub mod frame;
pub mod gesture;
pub mod item;
pub mod list;
pub mod position;
pub mod reset;
pub mod resolver;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::SwipeConfig;
pub use controller::{RenderState, SwipeController, SwipeSignal, Transition};
pub use dismiss::{DeleteCallback, DismissAnimator, DismissPhase};
pub use error::{SwipeError, SwipeResult};
pub use event::{TouchEvent, TouchPhase, TouchPoint};
pub use frame::{FrameCoalescer, FrameRequest, FrameToken};
pub use gesture::{GestureClassifier, GestureState, MoveVerdict};
pub use item::{ItemId, ItemKind};
pub use list::{ItemSignal, PendingDeletion, SwipeList};
pub use position::{rubber_band, SwipePosition};
pub use reset::{ResetSignal, ResetToken};
pub use resolver::{Release, Resolver, TapOutcome, TapTarget};

/// Swipe core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
