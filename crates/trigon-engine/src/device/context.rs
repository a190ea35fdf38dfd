use super::{GpuDevice, GpuInit, WgpuDevice, WgpuSurface};
use crate::error::SetupError;

/// Sole owner of the logical device and its command queue.
///
/// Pipelines and buffers are created through [`GpuContext::device`] and never
/// hold the context themselves.
pub struct GpuContext<D: GpuDevice> {
    device: D,
}

impl<D: GpuDevice> GpuContext<D> {
    /// Wraps an already-created device.
    pub fn new(device: D) -> Self {
        Self { device }
    }

    /// Returns the device handle.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Enqueues `commands` and schedules `present` after them.
    ///
    /// Calls from one thread execute in call order. No synchronization is
    /// implied between separate command buffers beyond that order.
    pub fn submit(&self, commands: D::CommandBuffer, present: D::Image) {
        self.device.submit(commands, present);
    }
}

impl GpuContext<WgpuDevice> {
    /// Selects the default GPU for `target` and creates its device, queue and surface.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu. The surface is
    /// returned unconfigured; the render loop configures it during setup.
    pub async fn initialize(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        init: GpuInit,
    ) -> Result<(Self, WgpuSurface), SetupError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });

        let surface = instance.create_surface(target)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|err| SetupError::NoDevice(err.to_string()))?;

        let info = adapter.get_info();
        log::info!(
            "selected GPU adapter: {} ({:?}, {:?})",
            info.name,
            info.backend,
            info.device_type
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("trigon device"),
                required_features: init.required_features.clone(),
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface = WgpuSurface::new(surface, &adapter, &init);
        let device = WgpuDevice::new(adapter, device, queue);

        Ok((Self::new(device), surface))
    }

    /// Blocking form of [`GpuContext::initialize`] for hosts without an executor.
    pub fn initialize_blocking(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        init: GpuInit,
    ) -> Result<(Self, WgpuSurface), SetupError> {
        pollster::block_on(Self::initialize(target, init))
    }
}
