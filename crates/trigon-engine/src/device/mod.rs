//! GPU device + surface management.
//!
//! This module is responsible for:
//! - the device seam used by the render loop ([`GpuDevice`], [`SurfaceProvider`])
//! - the GPU context that owns the device and its queue
//! - the wgpu implementation: adapter/device/queue creation and the surface chain

mod backend;
mod context;
mod frame;
mod gpu;
mod init;
mod surface;

pub use backend::{GpuDevice, SurfaceProvider};
pub use context::GpuContext;
pub use frame::SurfaceImage;
pub use gpu::WgpuDevice;
pub use init::GpuInit;
pub use surface::WgpuSurface;
