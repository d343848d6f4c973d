//! Common types used throughout the editor.

use std::time::{Duration, Instant};

/// Cursor position.
///
/// - `cy`: row index (0-based); may equal the row count (the empty line past the end)
/// - `cx`: byte column in the row; may equal the row length
/// - `rx`: the render column of `cx` after tab expansion, recomputed before every redraw
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    pub cx: usize,
    pub cy: usize,
    pub rx: usize,
}

/// Short-lived message shown in the message bar.
#[derive(Clone, Debug)]
pub struct StatusMsg {
    pub text: String,
    pub set_at: Instant,
}

impl StatusMsg {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            set_at: Instant::now(),
        }
    }

    /// Whether the message is still within `timeout` of being set.
    pub fn is_fresh(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.set_at) < timeout
    }
}

/// Counts down the Ctrl-Q presses still needed to abandon unsaved changes.
#[derive(Debug, Clone)]
pub struct QuitGuard {
    max: u32,
    remaining: u32,
}

impl QuitGuard {
    pub fn new(max: u32) -> Self {
        Self {
            max,
            remaining: max,
        }
    }

    /// Register one quit press. Returns `true` once enough consecutive presses were seen.
    pub fn press(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Any other key starts the count over.
    pub fn reset(&mut self) {
        self.remaining = self.max;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_guard_counts_down_and_resets() {
        let mut g = QuitGuard::new(3);
        assert!(!g.press());
        assert_eq!(g.remaining(), 2);
        g.reset();
        assert_eq!(g.remaining(), 3);
        assert!(!g.press());
        assert!(!g.press());
        assert!(g.press());
    }

    #[test]
    fn quit_guard_of_zero_or_one_quits_at_once() {
        assert!(QuitGuard::new(0).press());
        assert!(QuitGuard::new(1).press());
    }

    #[test]
    fn status_expires() {
        let msg = StatusMsg::new("hi");
        let timeout = Duration::from_secs(5);
        assert!(msg.is_fresh(msg.set_at, timeout));
        assert!(msg.is_fresh(msg.set_at + Duration::from_secs(4), timeout));
        assert!(!msg.is_fresh(msg.set_at + Duration::from_secs(5), timeout));
    }
}
