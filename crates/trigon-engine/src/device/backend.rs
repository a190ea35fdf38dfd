use crate::error::{AcquireError, ConfigError, EncodeError, SetupError};
use crate::pipeline::PipelineDescriptor;
use crate::render::RenderPassPlan;

/// Device-side operations the render loop is built on.
///
/// An implementation owns the logical device and its command queue. Every method
/// takes `&self` because frames are encoded on the vsync thread while the host
/// keeps its own references on the main thread.
pub trait GpuDevice: Send + Sync + Sized + 'static {
    /// Immutable GPU-resident vertex data.
    type Buffer: Send + Sync + 'static;

    /// Compiled render pipeline.
    type Pipeline: Send + Sync + 'static;

    /// Presentable image borrowed from the surface chain for a single frame.
    ///
    /// Dropping it without submitting hands it back to the chain unpresented.
    type Image: Send;

    /// Finished command buffer, ready for submission.
    type CommandBuffer: Send;

    /// Copies `contents` into a write-once vertex buffer.
    fn create_vertex_buffer(&self, label: &str, contents: &[u8]) -> Self::Buffer;

    /// Creates a render pipeline from resolved shader entry points.
    fn create_render_pipeline(
        &self,
        desc: &PipelineDescriptor<'_>,
    ) -> Result<Self::Pipeline, ConfigError>;

    /// Records `pass` against `target` into a new command buffer.
    fn encode(
        &self,
        target: &Self::Image,
        pass: &RenderPassPlan<'_, Self>,
    ) -> Result<Self::CommandBuffer, EncodeError>;

    /// Submits `commands` to the queue and presents `present` once they complete.
    ///
    /// Submissions execute in call order.
    fn submit(&self, commands: Self::CommandBuffer, present: Self::Image);
}

/// Bounded chain of presentable images owned by the platform layer.
pub trait SurfaceProvider<D: GpuDevice>: Send + Sync + 'static {
    /// Binds the chain to `device` with the given pixel format.
    fn configure(&self, device: &D, format: wgpu::TextureFormat) -> Result<(), SetupError>;

    /// Borrows the next presentable image, waiting at most the platform's bound.
    fn acquire_next_image(&self) -> Result<D::Image, AcquireError>;
}
