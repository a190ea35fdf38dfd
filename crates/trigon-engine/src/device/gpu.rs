use super::{GpuDevice, SurfaceImage};
use crate::error::{ConfigError, EncodeError};
use crate::pipeline::PipelineDescriptor;
use crate::render::RenderPassPlan;

/// wgpu-backed [`GpuDevice`].
///
/// Owns the selected adapter, the logical device and its queue. Created through
/// [`GpuContext::initialize`](super::GpuContext::initialize).
pub struct WgpuDevice {
    /// Selected adapter; queried for format capabilities.
    adapter: wgpu::Adapter,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,
}

impl WgpuDevice {
    pub(crate) fn new(adapter: wgpu::Adapter, device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            adapter,
            device,
            queue,
        }
    }

    /// Returns a reference to the logical device.
    pub fn raw(&self) -> &wgpu::Device {
        &self.device
    }

    fn check_color_target(&self, format: wgpu::TextureFormat) -> Result<(), ConfigError> {
        if format.is_depth_stencil_format() {
            return Err(ConfigError::PipelineCreation {
                format,
                reason: "depth/stencil formats cannot be a color target".to_string(),
            });
        }

        let features = self.adapter.get_texture_format_features(format);
        if !features
            .allowed_usages
            .contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
        {
            return Err(ConfigError::PipelineCreation {
                format,
                reason: "format is not renderable on this device".to_string(),
            });
        }

        Ok(())
    }
}

impl GpuDevice for WgpuDevice {
    type Buffer = wgpu::Buffer;
    type Pipeline = wgpu::RenderPipeline;
    type Image = SurfaceImage;
    type CommandBuffer = wgpu::CommandBuffer;

    fn create_vertex_buffer(&self, label: &str, contents: &[u8]) -> wgpu::Buffer {
        use wgpu::util::DeviceExt;

        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::VERTEX,
            })
    }

    fn create_render_pipeline(
        &self,
        desc: &PipelineDescriptor<'_>,
    ) -> Result<wgpu::RenderPipeline, ConfigError> {
        self.check_color_target(desc.format)?;

        // Anything the pre-checks missed is caught here instead of reaching the
        // uncaptured-error handler.
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(desc.library.label()),
                source: wgpu::ShaderSource::Wgsl(desc.library.source().into()),
            });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(desc.label),
                bind_group_layouts: &[],
                immediate_size: 0,
            });

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(desc.label),
                layout: Some(&pipeline_layout),

                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some(desc.vertex_entry),
                    compilation_options: Default::default(),
                    buffers: desc.vertex_buffers,
                },

                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(desc.fragment_entry),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: desc.format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: desc.topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(ConfigError::PipelineCreation {
                format: desc.format,
                reason: err.to_string(),
            });
        }

        Ok(pipeline)
    }

    fn encode(
        &self,
        target: &SurfaceImage,
        pass: &RenderPassPlan<'_, Self>,
    ) -> Result<wgpu::CommandBuffer, EncodeError> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("trigon frame encoder"),
            });

        // Render pass borrows the encoder; dropped before finish().
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(pass.label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: pass.color_ops,
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(draw) = &pass.draw {
                rpass.set_pipeline(draw.pipeline);
                for binding in &draw.vertex_buffers {
                    rpass.set_vertex_buffer(binding.slot.index(), binding.buffer.slice(..));
                }
                rpass.draw(draw.vertices.clone(), draw.instances.clone());
            }
        }

        Ok(encoder.finish())
    }

    fn submit(&self, commands: wgpu::CommandBuffer, present: SurfaceImage) {
        self.queue.submit(std::iter::once(commands));
        present.present();
    }
}
