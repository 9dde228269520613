use std::time::{Duration, Instant};

/// Pick waiting for its highlight delay before the next level is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingAdvance {
    pub(crate) level: usize,
    pub(crate) row: usize,
    pub(crate) due: Instant,
}

/// Holds at most one pending advance. A new pick replaces the old one and
/// dismissal cancels it.
#[derive(Debug, Clone)]
pub(crate) struct AdvanceTimer {
    delay: Duration,
    pending: Option<PendingAdvance>,
}

impl AdvanceTimer {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub(crate) fn is_immediate(&self) -> bool {
        self.delay.is_zero()
    }

    pub(crate) fn schedule(&mut self, level: usize, row: usize, now: Instant) {
        if self.pending.is_some() {
            log::trace!("replacing pending advance");
        }
        self.pending = Some(PendingAdvance {
            level,
            row,
            due: now + self.delay,
        });
    }

    pub(crate) fn cancel(&mut self) {
        if self.pending.take().is_some() {
            log::trace!("pending advance cancelled");
        }
    }

    pub(crate) fn pending(&self) -> Option<&PendingAdvance> {
        self.pending.as_ref()
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.pending.map(|pending| pending.due)
    }

    /// Take the pending advance once `now` has reached its deadline.
    pub(crate) fn take_due(&mut self, now: Instant) -> Option<PendingAdvance> {
        let pending = self.pending?;
        if now < pending.due {
            return None;
        }
        self.pending = None;
        Some(pending)
    }
}
