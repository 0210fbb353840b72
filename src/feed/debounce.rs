use std::time::Duration;
use tokio::time::Instant;

/// Delay used for "load more" triggers unless configured otherwise.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Trailing-edge debouncer driven by the event loop tick.
///
/// Each [`trigger`](Self::trigger) pushes the deadline out by `delay`; only
/// after a quiet period does [`fire_if_due`](Self::fire_if_due) return true,
/// once, for the whole burst.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule (or reschedule) the action `delay` from now.
    pub fn trigger(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True exactly once when the quiet period has elapsed since the last trigger.
    pub fn fire_if_due(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
