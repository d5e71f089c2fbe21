//! # Swipe Controller
//!
//! Per-item swipe-to-dismiss state machine.
//!
//! ```text
//! touch start ─► classifier.begin, position.begin(open)
//! touch move  ─► classifier.observe ─► Horizontal? ─► position.drag ─► frame
//! touch end   ─► resolver.release ─► SnapClosed | SnapOpen | Dismiss
//! tick        ─► animator.poll ─► Deleted (once)
//! ```
//!
//! The controller performs no I/O. Everything the host has to do (prevent
//! native scrolling, schedule a frame, tell the list, run the editor) comes
//! back as [`SwipeSignal`]s.

use serde::{Deserialize, Serialize};

use crate::dismiss::{DeleteCallback, DismissAnimator, DismissPhase};
use crate::event::{TouchEvent, TouchPhase};
use crate::frame::{FrameCoalescer, FrameToken};
use crate::gesture::{GestureClassifier, GestureState, MoveVerdict};
use crate::position::SwipePosition;
use crate::reset::ResetToken;
use crate::resolver::{Release, Resolver, TapOutcome, TapTarget};
use crate::{ItemId, SwipeConfig};

/// Something the host or the owning list must react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum SwipeSignal {
    /// A horizontal gesture was classified; other open items should close.
    DeleteAttempt,
    /// Suppress the platform's default scroll for this move.
    PreventDefault,
    /// The item snapped open, revealing the delete button.
    RevealOpened,
    /// The item closed.
    Closed,
    /// Run the item's primary action (open the editor).
    PrimaryAction,
    /// Deletion is committed; the exit animation started.
    DismissStarted,
    /// The exit animation finished and the deletion callback ran.
    Deleted,
    /// Schedule an animation frame for this token.
    RequestFrame {
        /// Token to hand back via `animation_frame`.
        token: FrameToken,
    },
    /// Cancel a previously requested animation frame.
    CancelFrame {
        /// Token of the superseded frame.
        token: FrameToken,
    },
}

/// How the card should animate to its offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Track the finger exactly.
    None,
    /// Eased snap to rest or open.
    Snap,
    /// Exit slide and collapse.
    Exit,
}

/// Everything needed to draw one item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderState {
    /// Horizontal translation of the card in pixels.
    pub offset: f32,
    /// Delete button revealed.
    pub open: bool,
    /// Exit animation running or finished.
    pub dismissing: bool,
    /// Finger is dragging the card.
    pub dragging: bool,
    /// Delete button visibility, 0 to 1.
    pub reveal_progress: f32,
    /// Animation to apply.
    pub transition: Transition,
    /// Static presentation view; gestures disabled.
    pub presentation: bool,
}

/// Swipe-to-dismiss controller for one list item.
#[derive(Debug)]
pub struct SwipeController {
    id: ItemId,
    config: SwipeConfig,
    classifier: GestureClassifier,
    position: SwipePosition,
    resolver: Resolver,
    animator: DismissAnimator,
    frames: FrameCoalescer<f32>,
    rendered_offset: f32,
    open: bool,
    dragging: bool,
    presentation: bool,
    seen_reset: u64,
}

impl SwipeController {
    /// Create a closed controller for item `id`.
    #[must_use]
    pub fn new(id: ItemId, config: &SwipeConfig) -> Self {
        Self {
            id,
            config: *config,
            classifier: GestureClassifier::new(config.dead_zone),
            position: SwipePosition::new(config),
            resolver: Resolver::new(config),
            animator: DismissAnimator::new(config),
            frames: FrameCoalescer::new(),
            rendered_offset: 0.0,
            open: false,
            dragging: false,
            presentation: false,
            seen_reset: 0,
        }
    }

    /// Install the deletion callback.
    #[must_use]
    pub fn with_on_delete(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.set_on_delete(Box::new(callback));
        self
    }

    /// Install or replace the deletion callback.
    pub fn set_on_delete(&mut self, callback: DeleteCallback) {
        self.animator.set_on_delete(callback);
    }

    /// Switch the static presentation view on or off.
    ///
    /// Enabling it abandons any touch sequence and closes the item.
    pub fn set_presentation_mode(&mut self, enabled: bool) -> Vec<SwipeSignal> {
        self.presentation = enabled;
        if !enabled || self.animator.is_dismissing() {
            return Vec::new();
        }
        self.classifier.finish();
        self.dragging = false;
        if self.open {
            self.close()
        } else {
            self.cancel_frame().into_iter().collect()
        }
    }

    /// Dispatch a raw touch event by phase.
    pub fn handle_touch(&mut self, event: &TouchEvent) -> Vec<SwipeSignal> {
        match event.phase {
            TouchPhase::Start => event
                .primary_touch()
                .map(|touch| self.touch_start(touch.x, touch.y))
                .unwrap_or_default(),
            TouchPhase::Move => event
                .primary_touch()
                .map(|touch| self.touch_move(touch.x, touch.y))
                .unwrap_or_default(),
            TouchPhase::End | TouchPhase::Cancel => self.touch_end(event.timestamp_ms),
        }
    }

    /// Finger down at `(x, y)`.
    pub fn touch_start(&mut self, x: f32, y: f32) -> Vec<SwipeSignal> {
        if !self.accepts_input() {
            return Vec::new();
        }
        self.classifier.begin(x, y);
        self.position.begin(self.open);
        self.dragging = false;
        self.cancel_frame().into_iter().collect()
    }

    /// Finger moved to `(x, y)`.
    pub fn touch_move(&mut self, x: f32, y: f32) -> Vec<SwipeSignal> {
        if !self.accepts_input() {
            return Vec::new();
        }
        let mut signals = Vec::new();
        let dx = match self.classifier.observe(x, y) {
            MoveVerdict::BeganHorizontal { dx } => {
                self.dragging = true;
                signals.push(SwipeSignal::DeleteAttempt);
                dx
            }
            MoveVerdict::Horizontal { dx } => dx,
            MoveVerdict::Inactive | MoveVerdict::Ignored | MoveVerdict::Vertical => {
                return signals;
            }
        };
        signals.push(SwipeSignal::PreventDefault);

        let offset = self.position.drag(dx);
        let request = self.frames.request(offset);
        if let Some(token) = request.superseded {
            signals.push(SwipeSignal::CancelFrame { token });
        }
        signals.push(SwipeSignal::RequestFrame {
            token: request.token,
        });
        signals
    }

    /// Finger lifted (or the sequence was cancelled) at `now_ms`.
    ///
    /// Sequences that never left the dead-zone, and vertical ones, change
    /// nothing. Taps arrive separately through [`Self::tap`].
    pub fn touch_end(&mut self, now_ms: u64) -> Vec<SwipeSignal> {
        if !self.accepts_input() || !self.classifier.is_active() {
            return Vec::new();
        }
        let verdict = self.classifier.finish();
        self.dragging = false;
        if verdict != GestureState::Horizontal {
            return Vec::new();
        }

        match self.resolver.release(self.position.offset()) {
            Release::Dismiss => self.dismiss(now_ms),
            Release::SnapOpen => {
                let mut signals: Vec<_> = self.cancel_frame().into_iter().collect();
                self.position.snap_open();
                self.rendered_offset = self.position.offset();
                self.open = true;
                signals.push(SwipeSignal::RevealOpened);
                signals
            }
            Release::SnapClosed => {
                let was_open = self.open;
                let mut signals = self.close();
                if !was_open {
                    signals.retain(|s| *s != SwipeSignal::Closed);
                }
                signals
            }
        }
    }

    /// A tap (click without movement) on `target`.
    pub fn tap(&mut self, target: TapTarget, now_ms: u64) -> Vec<SwipeSignal> {
        if self.presentation {
            return match target {
                TapTarget::Card => vec![SwipeSignal::PrimaryAction],
                TapTarget::DeleteButton => Vec::new(),
            };
        }
        match Resolver::tap(target, self.open, self.animator.is_dismissing()) {
            TapOutcome::Close => self.close(),
            TapOutcome::PrimaryAction => vec![SwipeSignal::PrimaryAction],
            TapOutcome::Delete => self.dismiss(now_ms),
            TapOutcome::Ignored => Vec::new(),
        }
    }

    /// Commit to deletion. A second call is a silent no-op.
    pub fn dismiss(&mut self, now_ms: u64) -> Vec<SwipeSignal> {
        let Some(exit_offset) = self.animator.trigger(now_ms) else {
            return Vec::new();
        };
        let mut signals: Vec<_> = self.cancel_frame().into_iter().collect();
        self.classifier.finish();
        self.dragging = false;
        self.open = false;
        self.position.set(exit_offset);
        self.rendered_offset = exit_offset;
        tracing::info!(item = %self.id, "dismissing item");
        signals.push(SwipeSignal::DismissStarted);
        signals
    }

    /// Advance timers to `now_ms`.
    pub fn tick(&mut self, now_ms: u64) -> Vec<SwipeSignal> {
        if self.animator.poll(now_ms) {
            tracing::info!(item = %self.id, "item deleted");
            vec![SwipeSignal::Deleted]
        } else {
            Vec::new()
        }
    }

    /// React to a reset broadcast from the owning list.
    pub fn observe_reset(&mut self, token: ResetToken) -> Vec<SwipeSignal> {
        if token.version == self.seen_reset {
            return Vec::new();
        }
        self.seen_reset = token.version;
        if !token.closes(self.id) || !self.open || self.animator.is_dismissing() {
            return Vec::new();
        }
        tracing::debug!(item = %self.id, "closing after reset broadcast");
        self.close()
    }

    /// The animation frame for `token` arrived.
    ///
    /// Returns `true` if the rendered offset changed.
    pub fn animation_frame(&mut self, token: FrameToken) -> bool {
        match self.frames.fire(token) {
            Some(offset) => {
                self.rendered_offset = offset;
                true
            }
            None => false,
        }
    }

    /// Apply any pending frame immediately.
    pub fn flush_frame(&mut self) -> bool {
        match self.frames.flush() {
            Some(offset) => {
                self.rendered_offset = offset;
                true
            }
            None => false,
        }
    }

    /// Item identifier.
    #[must_use]
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// Live offset used for release decisions.
    #[must_use]
    pub const fn offset(&self) -> f32 {
        self.position.offset()
    }

    /// Offset as last drawn.
    #[must_use]
    pub const fn rendered_offset(&self) -> f32 {
        self.rendered_offset
    }

    /// Whether the delete button is revealed.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Whether deletion has been committed.
    #[must_use]
    pub fn is_dismissing(&self) -> bool {
        self.animator.is_dismissing()
    }

    /// Whether the dismissal has fully completed.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.animator.phase() == DismissPhase::Done
    }

    /// Whether the finger is dragging the card.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Axis verdict of the current sequence.
    #[must_use]
    pub const fn gesture_state(&self) -> GestureState {
        self.classifier.state()
    }

    /// Snapshot for rendering.
    #[must_use]
    pub fn render_state(&self) -> RenderState {
        let offset = if self.presentation {
            0.0
        } else {
            self.rendered_offset
        };
        let transition = if self.animator.is_dismissing() {
            Transition::Exit
        } else if self.dragging {
            Transition::None
        } else {
            Transition::Snap
        };
        RenderState {
            offset,
            open: self.open,
            dismissing: self.animator.is_dismissing(),
            dragging: self.dragging,
            reveal_progress: (offset.abs() / self.config.snap_position.abs()).min(1.0),
            transition,
            presentation: self.presentation,
        }
    }

    fn accepts_input(&self) -> bool {
        !self.presentation && !self.animator.is_dismissing()
    }

    fn cancel_frame(&mut self) -> Option<SwipeSignal> {
        self.frames
            .cancel()
            .map(|token| SwipeSignal::CancelFrame { token })
    }

    fn close(&mut self) -> Vec<SwipeSignal> {
        let mut signals: Vec<_> = self.cancel_frame().into_iter().collect();
        self.position.close();
        self.rendered_offset = 0.0;
        self.open = false;
        signals.push(SwipeSignal::Closed);
        signals
    }
}
