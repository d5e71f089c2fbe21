//! Persisting swipe deletions.
//!
//! A dismissed item leaves the rendered list as soon as its exit animation
//! finishes. The delete request goes out afterwards; if it fails, the
//! authoritative list is reloaded so the item reappears.

use std::sync::Arc;

use swipe_core::{ItemId, ItemKind, PendingDeletion, SwipeList};
use tracing::{info, warn};

use crate::error::{StoreError, StoreResult};
use crate::model::{Swipeable, Task, Wish};
use crate::store::DataStore;

/// Authoritative records reloaded after a failed delete.
#[derive(Debug, Clone, PartialEq)]
pub enum ReloadedItems {
    /// All tasks, newest first.
    Tasks(Vec<Task>),
    /// All wishes, newest first.
    Wishes(Vec<Wish>),
}

impl ReloadedItems {
    /// Swipe identities in record order.
    #[must_use]
    pub fn item_ids(&self) -> Vec<(ItemId, ItemKind)> {
        fn ids<T: Swipeable>(records: &[T]) -> Vec<(ItemId, ItemKind)> {
            records.iter().map(|r| (r.item_id(), r.kind())).collect()
        }
        match self {
            Self::Tasks(tasks) => ids(tasks),
            Self::Wishes(wishes) => ids(wishes),
        }
    }

    /// Whether the reload still contains `item`.
    #[must_use]
    pub fn contains(&self, item: ItemId) -> bool {
        self.item_ids().iter().any(|(id, _)| *id == item)
    }
}

/// Outcome of persisting one deletion.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// The store confirmed the delete.
    Deleted(PendingDeletion),
    /// The delete failed; the list must be rebuilt from `items`.
    Reloaded {
        /// Deletion that did not persist.
        deletion: PendingDeletion,
        /// Error reported by the store.
        error: String,
        /// Fresh records of the same kind.
        items: ReloadedItems,
    },
}

impl ReconcileOutcome {
    /// The deletion this outcome is about.
    #[must_use]
    pub const fn deletion(&self) -> PendingDeletion {
        match self {
            Self::Deleted(deletion) | Self::Reloaded { deletion, .. } => *deletion,
        }
    }

    /// Whether the delete persisted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted(_))
    }
}

/// A batch of deletions stopped because a reload failed.
///
/// Nothing is lost: `outcomes` holds the deletions that were settled before
/// the failure and `unprocessed` the ones that were not, starting with the
/// deletion whose reload failed.
#[derive(Debug, thiserror::Error)]
#[error("reconciliation stopped with {} deletions unprocessed: {source}", .unprocessed.len())]
pub struct ReconcileError {
    /// Error from the failed reload.
    #[source]
    pub source: StoreError,
    /// Deletions settled before the failure.
    pub outcomes: Vec<ReconcileOutcome>,
    /// Deletions still to persist, in their original order.
    pub unprocessed: Vec<PendingDeletion>,
}

impl ReconcileError {
    /// Whether retrying the unprocessed deletions later may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.source.is_retryable()
    }
}

/// Applies finished dismissals to a [`DataStore`].
#[derive(Debug)]
pub struct DeletionReconciler<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for DeletionReconciler<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> DeletionReconciler<S>
where
    S: DataStore + ?Sized,
{
    /// Create a reconciler over `store`.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Delete the entity behind `deletion`.
    ///
    /// A failed delete is not an error: it yields
    /// [`ReconcileOutcome::Reloaded`] with the current records.
    ///
    /// # Errors
    ///
    /// Returns the store error if the reload after a failed delete also fails.
    pub async fn apply(&self, deletion: PendingDeletion) -> StoreResult<ReconcileOutcome> {
        let id = deletion.item.as_uuid();
        let result = match deletion.kind {
            ItemKind::Task => self.store.delete_task(id).await,
            ItemKind::Wish => self.store.delete_wish(id).await,
        };

        match result {
            Ok(()) => {
                info!("Deleted {} {}", deletion.kind, deletion.item);
                Ok(ReconcileOutcome::Deleted(deletion))
            }
            Err(error) => {
                warn!(
                    "Deleting {} {} failed, reloading: {}",
                    deletion.kind, deletion.item, error
                );
                let items = self.reload(deletion.kind).await?;
                Ok(ReconcileOutcome::Reloaded {
                    deletion,
                    error: error.to_string(),
                    items,
                })
            }
        }
    }

    /// Apply every deletion in order.
    ///
    /// # Errors
    ///
    /// Stops at the first reload failure and returns a [`ReconcileError`]
    /// carrying the settled outcomes and the deletions not yet persisted.
    pub async fn apply_all(
        &self,
        deletions: impl IntoIterator<Item = PendingDeletion>,
    ) -> Result<Vec<ReconcileOutcome>, ReconcileError> {
        let deletions: Vec<_> = deletions.into_iter().collect();
        let mut outcomes = Vec::with_capacity(deletions.len());
        for (index, deletion) in deletions.iter().enumerate() {
            match self.apply(*deletion).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(source) => {
                    return Err(ReconcileError {
                        source,
                        outcomes,
                        unprocessed: deletions[index..].to_vec(),
                    });
                }
            }
        }
        Ok(outcomes)
    }

    /// Drain `list`'s finished dismissals, persist them, and rebuild the
    /// list from any reload.
    ///
    /// `visible` picks which reloaded records the list renders, e.g. the
    /// tasks of one weekday.
    ///
    /// # Errors
    ///
    /// Returns a [`ReconcileError`] if a reload fails. The deletions that
    /// were not persisted go back into `list`'s queue so a later call
    /// retries them, and any reload obtained before the failure is still
    /// applied to the list.
    pub async fn reconcile_list<F>(
        &self,
        list: &mut SwipeList,
        visible: F,
    ) -> Result<Vec<ReconcileOutcome>, ReconcileError>
    where
        F: Fn(&ReloadedItems) -> Vec<(ItemId, ItemKind)>,
    {
        match self.apply_all(list.take_deletions()).await {
            Ok(outcomes) => {
                sync_from_reload(list, &outcomes, &visible);
                Ok(outcomes)
            }
            Err(err) => {
                warn!(
                    "Requeueing {} deletions after failed reload: {}",
                    err.unprocessed.len(),
                    err.source
                );
                sync_from_reload(list, &err.outcomes, &visible);
                list.requeue_deletions(err.unprocessed.iter().copied());
                Err(err)
            }
        }
    }

    /// Current records of `kind`.
    ///
    /// # Errors
    ///
    /// Returns the store error if the listing fails.
    pub async fn reload(&self, kind: ItemKind) -> StoreResult<ReloadedItems> {
        Ok(match kind {
            ItemKind::Task => ReloadedItems::Tasks(self.store.list_tasks().await?),
            ItemKind::Wish => ReloadedItems::Wishes(self.store.list_wishes().await?),
        })
    }
}

fn sync_from_reload<F>(list: &mut SwipeList, outcomes: &[ReconcileOutcome], visible: &F)
where
    F: Fn(&ReloadedItems) -> Vec<(ItemId, ItemKind)>,
{
    let latest = outcomes.iter().rev().find_map(|o| match o {
        ReconcileOutcome::Reloaded { items, .. } => Some(items),
        ReconcileOutcome::Deleted(_) => None,
    });
    if let Some(items) = latest {
        list.sync_items(visible(items));
    }
}
