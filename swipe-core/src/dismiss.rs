//! # Dismiss Animation
//!
//! Once an item commits to deletion it slides off-screen, and after the exit
//! transition the deletion callback runs. The callback is an `FnOnce` taken
//! out of the animator when it fires, so it can run at most once no matter
//! how often dismissal is triggered or the timer is polled.
//!
//! A failed delete is not rolled back here; the owning list reloads the
//! authoritative data instead.

use crate::SwipeConfig;

/// Callback invoked once the exit animation has finished.
pub type DeleteCallback = Box<dyn FnOnce()>;

/// Where the animator is in the dismissal sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissPhase {
    /// Not dismissing.
    Idle,
    /// Sliding out; the callback fires at `deadline_ms`.
    Exiting {
        /// Time at which the deletion callback fires.
        deadline_ms: u64,
    },
    /// The deletion callback has fired.
    Done,
}

/// Drives the exit of one item.
pub struct DismissAnimator {
    phase: DismissPhase,
    exit_duration_ms: u64,
    exit_offset: f32,
    on_delete: Option<DeleteCallback>,
}

impl std::fmt::Debug for DismissAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DismissAnimator")
            .field("phase", &self.phase)
            .field("exit_duration_ms", &self.exit_duration_ms)
            .field("exit_offset", &self.exit_offset)
            .field("has_callback", &self.on_delete.is_some())
            .finish()
    }
}

impl DismissAnimator {
    /// Create an idle animator.
    #[must_use]
    pub fn new(config: &SwipeConfig) -> Self {
        Self {
            phase: DismissPhase::Idle,
            exit_duration_ms: config.exit_duration_ms,
            exit_offset: config.exit_offset(),
            on_delete: None,
        }
    }

    /// Install the deletion callback, replacing any previous one.
    pub fn set_on_delete(&mut self, callback: DeleteCallback) {
        self.on_delete = Some(callback);
    }

    /// Commit to deletion at `now_ms`.
    ///
    /// Returns the off-screen offset to animate to, or `None` if dismissal
    /// was already under way.
    pub fn trigger(&mut self, now_ms: u64) -> Option<f32> {
        if self.phase != DismissPhase::Idle {
            return None;
        }
        self.phase = DismissPhase::Exiting {
            deadline_ms: now_ms.saturating_add(self.exit_duration_ms),
        };
        Some(self.exit_offset)
    }

    /// Advance the timer. Returns `true` exactly once, when the exit has
    /// finished and the deletion callback has been invoked.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.phase {
            DismissPhase::Exiting { deadline_ms } if now_ms >= deadline_ms => {
                self.phase = DismissPhase::Done;
                if let Some(callback) = self.on_delete.take() {
                    callback();
                }
                true
            }
            _ => false,
        }
    }

    /// Whether deletion has been committed.
    #[must_use]
    pub fn is_dismissing(&self) -> bool {
        self.phase != DismissPhase::Idle
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> DismissPhase {
        self.phase
    }

    /// Milliseconds until the callback fires, if exiting.
    #[must_use]
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        match self.phase {
            DismissPhase::Exiting { deadline_ms } => Some(deadline_ms.saturating_sub(now_ms)),
            DismissPhase::Idle | DismissPhase::Done => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_animator() -> (DismissAnimator, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let mut animator = DismissAnimator::new(&SwipeConfig::default());
        let counter = Rc::clone(&calls);
        animator.set_on_delete(Box::new(move || counter.set(counter.get() + 1)));
        (animator, calls)
    }

    #[test]
    fn trigger_slides_off_screen() {
        let (mut animator, _) = counting_animator();
        let offset = animator.trigger(1_000).expect("first trigger");
        assert!((offset - -390.0).abs() < f32::EPSILON);
        assert!(animator.is_dismissing());
        assert_eq!(animator.remaining_ms(1_100), Some(200));
    }

    #[test]
    fn second_trigger_is_noop() {
        let (mut animator, _) = counting_animator();
        assert!(animator.trigger(1_000).is_some());
        assert!(animator.trigger(1_050).is_none());
        // The first deadline stands
        assert_eq!(
            animator.phase(),
            DismissPhase::Exiting { deadline_ms: 1_300 }
        );
    }

    #[test]
    fn callback_waits_for_exit_duration() {
        let (mut animator, calls) = counting_animator();
        animator.trigger(0);
        assert!(!animator.poll(299));
        assert_eq!(calls.get(), 0);
        assert!(animator.poll(300));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn callback_fires_exactly_once() {
        let (mut animator, calls) = counting_animator();
        animator.trigger(0);
        animator.trigger(10);
        assert!(animator.poll(400));
        assert!(!animator.poll(500));
        assert!(animator.trigger(600).is_none());
        assert!(!animator.poll(1_000));
        assert_eq!(calls.get(), 1);
        assert_eq!(animator.phase(), DismissPhase::Done);
    }

    #[test]
    fn idle_poll_does_nothing() {
        let (mut animator, calls) = counting_animator();
        assert!(!animator.poll(10_000));
        assert!(!animator.is_dismissing());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn works_without_callback() {
        let mut animator = DismissAnimator::new(&SwipeConfig::default());
        animator.trigger(0);
        assert!(animator.poll(300));
    }
}
