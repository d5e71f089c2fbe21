//! Single-flight render scheduling.
//!
//! Touch moves can arrive faster than the display refreshes. Each item keeps
//! at most one pending frame: a new request supersedes the pending one, and
//! the host cancels the superseded animation-frame callback.

use serde::{Deserialize, Serialize};

/// Handle for a requested animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameToken(u64);

impl FrameToken {
    /// Raw token value, as handed to the host.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Rebuild a token from its raw value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Result of requesting a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest {
    /// Token of the new pending frame.
    pub token: FrameToken,
    /// Pending frame that was superseded and should be cancelled.
    pub superseded: Option<FrameToken>,
}

/// Holds the one pending value waiting for the next frame.
#[derive(Debug, Clone)]
pub struct FrameCoalescer<T> {
    next: u64,
    pending: Option<(FrameToken, T)>,
}

impl<T> Default for FrameCoalescer<T> {
    fn default() -> Self {
        Self {
            next: 1,
            pending: None,
        }
    }
}

impl<T> FrameCoalescer<T> {
    /// Create an empty coalescer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `value` for the next frame, replacing any pending value.
    pub fn request(&mut self, value: T) -> FrameRequest {
        let token = FrameToken(self.next);
        self.next = self.next.wrapping_add(1);
        let superseded = self.pending.replace((token, value)).map(|(old, _)| old);
        FrameRequest { token, superseded }
    }

    /// The frame for `token` arrived. Returns the value if `token` is still
    /// the pending one; stale tokens yield nothing.
    pub fn fire(&mut self, token: FrameToken) -> Option<T> {
        match &self.pending {
            Some((pending, _)) if *pending == token => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    /// Drop the pending frame, returning its token for cancellation.
    pub fn cancel(&mut self) -> Option<FrameToken> {
        self.pending.take().map(|(token, _)| token)
    }

    /// Take the pending value immediately (hosts without a frame clock).
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(_, v)| v)
    }

    /// Whether a frame is pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_supersedes_nothing() {
        let mut frames = FrameCoalescer::new();
        let request = frames.request(1.0_f32);
        assert!(request.superseded.is_none());
        assert!(frames.is_pending());
    }

    #[test]
    fn later_request_supersedes_pending() {
        let mut frames = FrameCoalescer::new();
        let first = frames.request(-10.0_f32);
        let second = frames.request(-20.0_f32);
        assert_eq!(second.superseded, Some(first.token));
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn stale_token_yields_nothing() {
        let mut frames = FrameCoalescer::new();
        let first = frames.request(-10.0_f32);
        let second = frames.request(-20.0_f32);
        assert_eq!(frames.fire(first.token), None);
        assert_eq!(frames.fire(second.token), Some(-20.0));
        assert!(!frames.is_pending());
        assert_eq!(frames.fire(second.token), None);
    }

    #[test]
    fn cancel_returns_pending_token() {
        let mut frames = FrameCoalescer::new();
        let request = frames.request("x");
        assert_eq!(frames.cancel(), Some(request.token));
        assert_eq!(frames.cancel(), None);
        assert_eq!(frames.flush(), None);
    }

    #[test]
    fn flush_takes_latest_value() {
        let mut frames = FrameCoalescer::new();
        frames.request(1);
        frames.request(2);
        assert_eq!(frames.flush(), Some(2));
    }
}
