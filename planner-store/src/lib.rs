//! # Planner Store
//!
//! Household records (members, tasks, meals, wishes), the Monday-based week
//! calendar, and the [`DataStore`] seam with a REST and an in-memory
//! implementation. [`DeletionReconciler`] persists the deletions a swipe
//! list collects and reloads the list when a delete fails.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   PendingDeletion   ┌────────────────────┐
//! │  SwipeList   │ ──────────────────► │ DeletionReconciler │
//! │ (swipe-core) │ ◄────────────────── │                    │
//! └──────────────┘    sync_items       └─────────┬──────────┘
//!                                                │ DataStore
//!                                   ┌────────────┴────────────┐
//!                                   │                         │
//!                            ┌──────▼──────┐          ┌───────▼───────┐
//!                            │  RestStore  │          │ InMemoryStore │
//!                            │ (/rest/v1)  │          │  (RwLock)     │
//!                            └─────────────┘          └───────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod model;
pub mod reconcile;
pub mod rest;
pub mod store;
pub mod week;

pub use error::{StoreError, StoreResult};
pub use model::{
    group_active_by_category, CompletedTask, Meal, MealType, MealUpdate, NewCompletion, NewMeal,
    NewPushSubscription, NewTask, NewWish, PushSubscription, Swipeable, Task, TaskDraft, User,
    UserUpdate, Wish, WishDraft, DEFAULT_CATEGORY,
};
pub use reconcile::{DeletionReconciler, ReconcileError, ReconcileOutcome, ReloadedItems};
pub use rest::{RestStore, RetryConfig, StoreConfig};
pub use store::{DataStore, InMemoryStore, LoginOutcome};
pub use week::{
    day_index, is_completed, tasks_for_day, week_dates, week_number, TaskFilter, Week, WeekKey,
};

/// Planner store version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
