use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use trigon_engine::driver::{DriverError, FireCallback, TimerHandle, VsyncSource};

/// Vsync source backed by one dedicated timing thread per timer.
///
/// Fires are paced to the monitor refresh interval. Presentation itself is
/// FIFO, so the GPU still waits for the real vertical blank; the thread only
/// keeps requests at display cadence.
#[derive(Debug, Clone)]
pub struct ThreadVsync {
    interval: Duration,
}

impl ThreadVsync {
    /// `refresh_millihertz` comes from the monitor; `None` or 0 uses `fallback_hz`.
    pub fn new(refresh_millihertz: Option<u32>, fallback_hz: u32) -> Self {
        let interval = match refresh_millihertz {
            Some(mhz) if mhz > 0 => Duration::from_secs_f64(1000.0 / f64::from(mhz)),
            _ => Duration::from_secs_f64(1.0 / f64::from(fallback_hz.max(1))),
        };
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl VsyncSource for ThreadVsync {
    type Handle = ThreadTimer;

    fn create_timer(&self, on_fire: FireCallback) -> Result<ThreadTimer, DriverError> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let interval = self.interval;

        std::thread::Builder::new()
            .name("trigon-vsync".to_string())
            .spawn(move || {
                let mut pacer = FramePacer::new(interval, Instant::now());
                while flag.load(Ordering::Acquire) {
                    if let Some(delay) = pacer.advance(Instant::now()) {
                        std::thread::sleep(delay);
                    }
                    if !flag.load(Ordering::Acquire) {
                        break;
                    }
                    on_fire();
                }
                log::debug!("vsync thread exiting, {} intervals missed", pacer.missed());
            })?;

        log::debug!("vsync thread started at {interval:?} per frame");
        Ok(ThreadTimer { running })
    }
}

/// Handle to a running timing thread. Stopping (or dropping) it ends the thread
/// after any fire in progress.
pub struct ThreadTimer {
    running: Arc<AtomicBool>,
}

impl TimerHandle for ThreadTimer {
    fn stop(self) {
        drop(self);
    }
}

impl Drop for ThreadTimer {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Fixed-interval deadline tracker.
///
/// When the thread falls more than one interval behind (a long frame, the
/// process was suspended), the schedule resyncs to `now` instead of firing a
/// burst of catch-up frames.
#[derive(Debug, Clone)]
struct FramePacer {
    interval: Duration,
    next: Instant,
    missed: u64,
}

impl FramePacer {
    fn new(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            next: start + interval,
            missed: 0,
        }
    }

    /// Returns how long to sleep until the next fire, then schedules the one after.
    fn advance(&mut self, now: Instant) -> Option<Duration> {
        if self.next > now {
            let delay = self.next - now;
            self.next += self.interval;
            return Some(delay);
        }

        let behind = now - self.next;
        if behind > self.interval {
            self.missed += (behind.as_nanos() / self.interval.as_nanos().max(1)) as u64;
            self.next = now + self.interval;
        } else {
            self.next += self.interval;
        }
        None
    }

    fn missed(&self) -> u64 {
        self.missed
    }
}
