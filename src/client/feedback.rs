//! Transient user-facing messages that disappear after a fixed interval.

use std::time::Duration;

use tokio::time::Instant;

/// Default lifetime of a feedback message.
pub const DEFAULT_FEEDBACK_TTL: Duration = Duration::from_secs(4);

/// Where a message is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackTarget {
    /// Next to the add-player form.
    AddPlayer,
    /// Board-wide area used by score, delete and reset actions.
    Board,
}

/// Whether the message reports a success or an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    /// Operation succeeded.
    Success,
    /// Operation failed or was refused.
    Error,
}

/// A message currently displayed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    /// Message text.
    pub message: String,
    /// Success or error styling.
    pub kind: FeedbackKind,
}

#[derive(Debug, Clone)]
struct Slot {
    feedback: Feedback,
    shown_at: Instant,
}

/// One slot per [`FeedbackTarget`]. A new message replaces the previous one and restarts
/// its lifetime.
#[derive(Debug, Clone)]
pub struct FeedbackBoard {
    ttl: Duration,
    add_player: Option<Slot>,
    board: Option<Slot>,
}

impl Default for FeedbackBoard {
    fn default() -> Self {
        Self::new(DEFAULT_FEEDBACK_TTL)
    }
}

impl FeedbackBoard {
    /// Create an empty board whose messages live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            add_player: None,
            board: None,
        }
    }

    fn slot_mut(&mut self, target: FeedbackTarget) -> &mut Option<Slot> {
        match target {
            FeedbackTarget::AddPlayer => &mut self.add_player,
            FeedbackTarget::Board => &mut self.board,
        }
    }

    /// Show `message` on `target`.
    pub fn show(&mut self, target: FeedbackTarget, message: impl Into<String>, kind: FeedbackKind) {
        *self.slot_mut(target) = Some(Slot {
            feedback: Feedback {
                message: message.into(),
                kind,
            },
            shown_at: Instant::now(),
        });
    }

    /// Remove whatever `target` displays.
    pub fn clear(&mut self, target: FeedbackTarget) {
        self.slot_mut(target).take();
    }

    /// Message still visible on `target` at `now`.
    pub fn visible(&self, target: FeedbackTarget, now: Instant) -> Option<&Feedback> {
        let slot = match target {
            FeedbackTarget::AddPlayer => self.add_player.as_ref(),
            FeedbackTarget::Board => self.board.as_ref(),
        }?;
        (now.duration_since(slot.shown_at) < self.ttl).then_some(&slot.feedback)
    }

    /// Message visible on `target` right now.
    pub fn current(&self, target: FeedbackTarget) -> Option<&Feedback> {
        self.visible(target, Instant::now())
    }
}
