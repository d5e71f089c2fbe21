//! The owning list of swipeable items.
//!
//! Routes input to item controllers, keeps at most one item open by
//! broadcasting [`ResetToken`]s, and collects finished dismissals as
//! [`PendingDeletion`]s for the data-store layer to carry out.

use serde::{Deserialize, Serialize};

use crate::controller::{RenderState, SwipeController, SwipeSignal};
use crate::error::{SwipeError, SwipeResult};
use crate::event::TouchEvent;
use crate::frame::FrameToken;
use crate::reset::{ResetSignal, ResetToken};
use crate::resolver::TapTarget;
use crate::{ItemId, ItemKind, SwipeConfig};

/// A signal emitted by one item of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSignal {
    /// Item that emitted the signal.
    pub item: ItemId,
    /// The signal itself.
    #[serde(flatten)]
    pub signal: SwipeSignal,
}

/// An item whose exit animation finished and whose entity must be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDeletion {
    /// Deleted item.
    pub item: ItemId,
    /// Kind of entity behind the item.
    pub kind: ItemKind,
}

#[derive(Debug)]
struct Entry {
    kind: ItemKind,
    controller: SwipeController,
}

/// A rendered list of swipeable items.
#[derive(Debug)]
pub struct SwipeList {
    config: SwipeConfig,
    entries: Vec<Entry>,
    reset: ResetSignal,
    presentation: bool,
    deletions: Vec<PendingDeletion>,
}

impl SwipeList {
    /// Create an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`SwipeError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: SwipeConfig) -> SwipeResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            entries: Vec::new(),
            reset: ResetSignal::new(),
            presentation: false,
            deletions: Vec::new(),
        })
    }

    /// The list's swipe configuration.
    #[must_use]
    pub const fn config(&self) -> &SwipeConfig {
        &self.config
    }

    /// Append an item.
    ///
    /// # Errors
    ///
    /// Returns [`SwipeError::DuplicateItem`] if `id` is already mounted.
    pub fn mount(&mut self, id: ItemId, kind: ItemKind) -> SwipeResult<()> {
        if self.contains(id) {
            return Err(SwipeError::DuplicateItem(id));
        }
        self.entries.push(self.new_entry(id, kind));
        Ok(())
    }

    /// Remove an item without deleting its entity.
    ///
    /// # Errors
    ///
    /// Returns [`SwipeError::ItemNotFound`] if `id` is not mounted.
    pub fn unmount(&mut self, id: ItemId) -> SwipeResult<()> {
        let index = self.index_of(id).ok_or(SwipeError::ItemNotFound(id))?;
        self.entries.remove(index);
        Ok(())
    }

    /// Replace the rendered items with `items`, in order.
    ///
    /// Items that stay keep their swipe state; new items start closed; items
    /// no longer present are dropped. Used after reloading from the store.
    pub fn sync_items(&mut self, items: impl IntoIterator<Item = (ItemId, ItemKind)>) {
        let mut previous = std::mem::take(&mut self.entries);
        for (id, kind) in items {
            if self.index_of(id).is_some() {
                continue;
            }
            let entry = match previous.iter().position(|e| e.controller.id() == id) {
                Some(index) => {
                    let mut entry = previous.swap_remove(index);
                    entry.kind = kind;
                    entry
                }
                None => self.new_entry(id, kind),
            };
            self.entries.push(entry);
        }
        tracing::debug!(
            items = self.entries.len(),
            dropped = previous.len(),
            "list items synced"
        );
    }

    /// Switch presentation mode for every item.
    pub fn set_presentation_mode(&mut self, enabled: bool) -> Vec<ItemSignal> {
        self.presentation = enabled;
        let mut out = Vec::new();
        for entry in &mut self.entries {
            let id = entry.controller.id();
            out.extend(tag(id, entry.controller.set_presentation_mode(enabled)));
        }
        out
    }

    /// Whether presentation mode is on.
    #[must_use]
    pub const fn presentation_mode(&self) -> bool {
        self.presentation
    }

    /// Deliver a touch event to item `id`. Unknown items are ignored.
    pub fn handle_touch(&mut self, id: ItemId, event: &TouchEvent) -> Vec<ItemSignal> {
        let Some(controller) = self.controller_mut(id) else {
            return Vec::new();
        };
        let signals = controller.handle_touch(event);
        self.route(id, signals)
    }

    /// Deliver a tap to item `id`. Unknown items are ignored.
    pub fn tap(&mut self, id: ItemId, target: TapTarget, now_ms: u64) -> Vec<ItemSignal> {
        let Some(controller) = self.controller_mut(id) else {
            return Vec::new();
        };
        let signals = controller.tap(target, now_ms);
        self.route(id, signals)
    }

    /// Advance every item's timers. Items whose exit finished are removed
    /// and queued as pending deletions.
    pub fn tick(&mut self, now_ms: u64) -> Vec<ItemSignal> {
        let mut out = Vec::new();
        let mut finished = Vec::new();
        for entry in &mut self.entries {
            let id = entry.controller.id();
            let signals = entry.controller.tick(now_ms);
            if signals.contains(&SwipeSignal::Deleted) {
                finished.push(PendingDeletion {
                    item: id,
                    kind: entry.kind,
                });
            }
            out.extend(tag(id, signals));
        }
        if !finished.is_empty() {
            self.entries
                .retain(|e| !finished.iter().any(|f| f.item == e.controller.id()));
            for deletion in &finished {
                tracing::info!(item = %deletion.item, kind = %deletion.kind, "queued deletion");
            }
            self.deletions.extend(finished);
        }
        out
    }

    /// Deliver an animation frame to item `id`.
    pub fn animation_frame(&mut self, id: ItemId, token: FrameToken) -> bool {
        self.controller_mut(id)
            .is_some_and(|controller| controller.animation_frame(token))
    }

    /// Apply all pending frames immediately.
    pub fn flush_frames(&mut self) {
        for entry in &mut self.entries {
            entry.controller.flush_frame();
        }
    }

    /// Close every open item.
    pub fn close_all(&mut self) -> Vec<ItemSignal> {
        let token = self.reset.close_all();
        self.broadcast(token)
    }

    /// Take the deletions collected so far.
    pub fn take_deletions(&mut self) -> Vec<PendingDeletion> {
        std::mem::take(&mut self.deletions)
    }

    /// Put deletions back in the queue, ahead of any collected since they
    /// were taken. Used when the data store could not process them.
    pub fn requeue_deletions(&mut self, deletions: impl IntoIterator<Item = PendingDeletion>) {
        let mut queued: Vec<_> = deletions.into_iter().collect();
        if queued.is_empty() {
            return;
        }
        tracing::warn!(count = queued.len(), "requeued deletions");
        queued.append(&mut self.deletions);
        self.deletions = queued;
    }

    /// Number of deletions waiting to be taken.
    #[must_use]
    pub fn pending_deletions(&self) -> usize {
        self.deletions.len()
    }

    /// The item currently revealing its delete button, if any.
    #[must_use]
    pub fn open_item(&self) -> Option<ItemId> {
        self.entries
            .iter()
            .find(|e| e.controller.is_open())
            .map(|e| e.controller.id())
    }

    /// Render snapshot of item `id`.
    #[must_use]
    pub fn render_state(&self, id: ItemId) -> Option<RenderState> {
        self.controller(id).map(SwipeController::render_state)
    }

    /// Controller of item `id`.
    #[must_use]
    pub fn controller(&self, id: ItemId) -> Option<&SwipeController> {
        self.entries
            .iter()
            .find(|e| e.controller.id() == id)
            .map(|e| &e.controller)
    }

    /// Rendered item IDs in order.
    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.entries.iter().map(|e| e.controller.id())
    }

    /// Whether item `id` is mounted.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.index_of(id).is_some()
    }

    /// Number of rendered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The latest reset broadcast.
    #[must_use]
    pub const fn reset_token(&self) -> ResetToken {
        self.reset.current()
    }

    fn new_entry(&self, id: ItemId, kind: ItemKind) -> Entry {
        let mut controller = SwipeController::new(id, &self.config);
        if self.presentation {
            controller.set_presentation_mode(true);
        }
        controller.observe_reset(self.reset.current());
        Entry { kind, controller }
    }

    fn index_of(&self, id: ItemId) -> Option<usize> {
        self.entries.iter().position(|e| e.controller.id() == id)
    }

    fn controller_mut(&mut self, id: ItemId) -> Option<&mut SwipeController> {
        self.entries
            .iter_mut()
            .find(|e| e.controller.id() == id)
            .map(|e| &mut e.controller)
    }

    fn route(&mut self, id: ItemId, signals: Vec<SwipeSignal>) -> Vec<ItemSignal> {
        let coordinate = signals
            .iter()
            .any(|s| matches!(s, SwipeSignal::DeleteAttempt | SwipeSignal::RevealOpened));
        let mut out: Vec<_> = tag(id, signals).collect();
        if coordinate {
            let token = self.reset.bump(id);
            out.extend(self.broadcast(token));
        }
        out
    }

    fn broadcast(&mut self, token: ResetToken) -> Vec<ItemSignal> {
        let mut out = Vec::new();
        for entry in &mut self.entries {
            let id = entry.controller.id();
            out.extend(tag(id, entry.controller.observe_reset(token)));
        }
        out
    }
}

fn tag(item: ItemId, signals: Vec<SwipeSignal>) -> impl Iterator<Item = ItemSignal> {
    signals
        .into_iter()
        .map(move |signal| ItemSignal { item, signal })
}
