// Host container offset: where the editor container sits in the viewport,
// adjusted for the host's scroll position, plus the one-shot timer that
// re-measures it after a sidebar transition.

use std::ops::Sub;
use std::time::{Duration, Instant};

/// A `{top, left}` pixel offset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerOffset {
    /// Vertical offset in pixels.
    pub top: f64,
    /// Horizontal offset in pixels.
    pub left: f64,
}

impl ContainerOffset {
    pub const fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }
}

impl Sub for ContainerOffset {
    type Output = ContainerOffset;

    fn sub(self, rhs: Self) -> Self::Output {
        ContainerOffset::new(self.top - rhs.top, self.left - rhs.left)
    }
}

/// Tracks the measured container offset and the host scroll position.
#[derive(Debug, Clone, Default)]
pub struct OffsetTracker {
    measured: Option<ContainerOffset>,
    scroll: ContainerOffset,
}

impl OffsetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_measured(&mut self, offset: Option<ContainerOffset>) {
        self.measured = offset;
    }

    pub fn set_scroll_position(&mut self, scroll: ContainerOffset) {
        self.scroll = scroll;
    }

    /// Measured offset minus scroll; unset until the container is measured.
    pub fn combined(&self) -> Option<ContainerOffset> {
        self.measured.map(|m| m - self.scroll)
    }
}

/// One-shot deadline. Scheduling again replaces the pending deadline.
#[derive(Debug, Clone)]
pub struct RemeasureTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl RemeasureTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once when the deadline has passed; the timer is then disarmed.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
