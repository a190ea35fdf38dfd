use std::ops::Range;

use crate::device::GpuDevice;
use crate::geometry::AttributeSlot;

/// A vertex buffer bound at its attribute slot.
pub struct VertexBinding<'a, D: GpuDevice> {
    pub slot: AttributeSlot,
    pub buffer: &'a D::Buffer,
}

/// The single draw of a frame.
pub struct DrawCall<'a, D: GpuDevice> {
    pub pipeline: &'a D::Pipeline,
    pub vertex_buffers: [VertexBinding<'a, D>; 2],
    pub vertices: Range<u32>,
    pub instances: Range<u32>,
}

/// One render pass targeting the acquired image as its sole color attachment.
///
/// Load is always clear-to-color and store is always store, so the cleared
/// (and drawn) content survives to presentation.
pub struct RenderPassPlan<'a, D: GpuDevice> {
    pub label: &'a str,
    pub color_ops: wgpu::Operations<wgpu::Color>,
    /// `None` records a clear-only pass.
    pub draw: Option<DrawCall<'a, D>>,
}

impl<'a, D: GpuDevice> RenderPassPlan<'a, D> {
    pub fn new(clear_color: wgpu::Color, draw: Option<DrawCall<'a, D>>) -> Self {
        Self {
            label: if draw.is_some() {
                "trigon draw pass"
            } else {
                "trigon clear pass"
            },
            color_ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear_color),
                store: wgpu::StoreOp::Store,
            },
            draw,
        }
    }
}
