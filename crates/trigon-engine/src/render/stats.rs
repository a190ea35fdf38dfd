use std::sync::atomic::{AtomicU64, Ordering};

/// Frame counters, updated by the render loop and readable from any thread.
#[derive(Debug, Default)]
pub struct FrameStats {
    drawn: AtomicU64,
    cleared: AtomicU64,
    skipped: AtomicU64,
}

/// Point-in-time copy of [`FrameStats`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStatsSnapshot {
    pub drawn: u64,
    pub cleared: u64,
    pub skipped: u64,
}

impl FrameStatsSnapshot {
    /// Frames submitted and presented.
    pub fn presented(&self) -> u64 {
        self.drawn + self.cleared
    }
}

impl FrameStats {
    pub(crate) fn record_drawn(&self) {
        self.drawn.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cleared(&self) {
        self.cleared.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FrameStatsSnapshot {
        FrameStatsSnapshot {
            drawn: self.drawn.load(Ordering::Relaxed),
            cleared: self.cleared.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}
