use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::{DriverError, FireCallback, FrameTarget, TimerHandle, VsyncSource};

/// Attachment signal from the hosting view.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Attachment {
    /// The view is on a live, on-screen display surface.
    Attached,
    /// The view left its window, or the surface is no longer live.
    Detached,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DriverState {
    Idle,
    Driving,
}

struct Active<H> {
    handle: H,
    generation: u64,
}

struct Slot<H> {
    active: Option<Active<H>>,
    issued: u64,
}

/// Idle/Driving state machine owning at most one vsync timer.
///
/// Transitions happen under one lock, so concurrent attach/detach calls are
/// idempotent. Each timer is tagged with a generation; its callback only reaches
/// the target while that generation is live, so once [`stop`](Self::stop)
/// returns no new fire can start a frame. A fire that already passed the check
/// completes against a target it holds strongly for the duration of the call.
pub struct FrameDriver<V: VsyncSource> {
    source: V,

    /// Non-owning back-reference to the render loop.
    target: Weak<dyn FrameTarget>,

    slot: Mutex<Slot<V::Handle>>,

    /// Generation allowed to fire; 0 while idle.
    live: Arc<AtomicU64>,
}

impl<V: VsyncSource> FrameDriver<V> {
    pub fn new(source: V, target: Weak<dyn FrameTarget>) -> Self {
        Self {
            source,
            target,
            slot: Mutex::new(Slot {
                active: None,
                issued: 0,
            }),
            live: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Applies the host's attachment signal.
    ///
    /// Returns `true` if the driver changed state.
    pub fn on_attachment(&self, attachment: Attachment) -> bool {
        match attachment {
            Attachment::Attached => match self.start() {
                Ok(started) => started,
                Err(err) => {
                    log::error!("frame driver could not start: {err}");
                    false
                }
            },
            Attachment::Detached => self.stop(),
        }
    }

    /// Idle -> Driving. A no-op returning `Ok(false)` when already driving.
    pub fn start(&self) -> Result<bool, DriverError> {
        let mut slot = self.slot.lock();
        if slot.active.is_some() {
            log::trace!("frame driver already driving");
            return Ok(false);
        }

        slot.issued += 1;
        let generation = slot.issued;

        let live = Arc::clone(&self.live);
        let target = self.target.clone();
        let on_fire: FireCallback = Arc::new(move || {
            if live.load(Ordering::Acquire) != generation {
                return;
            }
            if let Some(target) = target.upgrade() {
                target.on_vsync();
            }
        });

        // Live before the timer exists so its first fire is not dropped.
        self.live.store(generation, Ordering::Release);
        let handle = match self.source.create_timer(on_fire) {
            Ok(handle) => handle,
            Err(err) => {
                self.live.store(0, Ordering::Release);
                return Err(err);
            }
        };

        slot.active = Some(Active { handle, generation });
        log::info!("frame driver started (timer #{generation})");
        Ok(true)
    }

    /// Driving -> Idle. A no-op returning `false` when already idle.
    pub fn stop(&self) -> bool {
        let mut slot = self.slot.lock();
        let Some(active) = slot.active.take() else {
            log::trace!("frame driver already idle");
            return false;
        };

        self.live.store(0, Ordering::Release);
        active.handle.stop();
        log::info!("frame driver stopped (timer #{})", active.generation);
        true
    }

    pub fn state(&self) -> DriverState {
        if self.slot.lock().active.is_some() {
            DriverState::Driving
        } else {
            DriverState::Idle
        }
    }

    pub fn is_driving(&self) -> bool {
        self.state() == DriverState::Driving
    }
}

impl<V: VsyncSource> Drop for FrameDriver<V> {
    fn drop(&mut self) {
        self.stop();
    }
}
