use std::sync::Arc;

use thiserror::Error;

/// Callback a timer invokes on every vertical sync.
pub type FireCallback = Arc<dyn Fn() + Send + Sync>;

/// Receiver of vsync fires.
pub trait FrameTarget: Send + Sync {
    fn on_vsync(&self);
}

/// An active platform timer.
pub trait TimerHandle: Send {
    /// Stops scheduling new fires. A fire already running may still finish.
    fn stop(self);
}

/// Platform capability that paces callbacks to the display refresh.
pub trait VsyncSource: Send + Sync {
    type Handle: TimerHandle;

    /// Starts a timer that calls `on_fire` once per refresh, on a thread the
    /// platform owns.
    fn create_timer(&self, on_fire: FireCallback) -> Result<Self::Handle, DriverError>;
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to spawn vsync timing thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("vsync source unavailable: {0}")]
    Unavailable(String),
}
