//! Frame loop driver.
//!
//! Bridges a platform vertical-sync timer into per-frame callbacks:
//! - [`VsyncSource`] creates timers; the platform owns the timing thread
//! - [`FrameDriver`] tracks Idle/Driving and owns at most one active timer
//! - [`FrameTarget`] is what each fire invokes (the render loop)
//!
//! Fires arrive on the platform's timing thread, never assume main-thread affinity.

mod frame_driver;
mod source;

pub use frame_driver::{Attachment, DriverState, FrameDriver};
pub use source::{DriverError, FireCallback, FrameTarget, TimerHandle, VsyncSource};
