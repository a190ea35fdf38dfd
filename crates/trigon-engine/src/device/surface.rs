use parking_lot::Mutex;

use super::{GpuDevice, GpuInit, SurfaceImage, SurfaceProvider, WgpuDevice};
use crate::error::{AcquireError, SetupError};

/// wgpu surface chain bound to a host window.
///
/// Configuration lives behind a mutex: the render loop acquires images on the
/// vsync thread while the host reports resizes from the main thread. Resizes are
/// recorded and applied on the next acquisition so the chain is never
/// reconfigured while one of its images is in flight.
pub struct WgpuSurface {
    surface: wgpu::Surface<'static>,
    caps: wgpu::SurfaceCapabilities,
    present_mode: wgpu::PresentMode,
    alpha_mode: Option<wgpu::CompositeAlphaMode>,
    frame_latency: u32,
    state: Mutex<SurfaceState>,
}

#[derive(Default)]
struct SurfaceState {
    device: Option<wgpu::Device>,
    config: Option<wgpu::SurfaceConfiguration>,
    extent: Extent,
}

/// Drawable size bookkeeping, separate from the wgpu objects it drives.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
struct Extent {
    size: (u32, u32),
    pending: Option<(u32, u32)>,
    configured: bool,
}

impl Extent {
    /// Before configuration the size is taken as-is; afterwards it waits for
    /// the next acquisition.
    fn resize(&mut self, size: (u32, u32)) {
        if self.configured {
            self.pending = Some(size);
        } else {
            self.size = size;
        }
    }

    /// Marks the chain configured. Returns the size to configure with, if drawable.
    fn configure(&mut self) -> Option<(u32, u32)> {
        self.configured = true;
        self.drawable()
    }

    /// Applies a recorded resize. Returns the new size when the chain must be
    /// reconfigured.
    fn apply_pending(&mut self) -> Option<(u32, u32)> {
        self.size = self.pending.take()?;
        self.drawable()
    }

    /// `None` while unconfigured or zero-sized.
    fn drawable(&self) -> Option<(u32, u32)> {
        let (width, height) = self.size;
        (self.configured && width > 0 && height > 0).then_some(self.size)
    }
}

impl WgpuSurface {
    pub(crate) fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        init: &GpuInit,
    ) -> Self {
        let caps = surface.get_capabilities(adapter);
        log::debug!("surface formats: {:?}", caps.formats);

        Self {
            surface,
            caps,
            present_mode: init.present_mode,
            alpha_mode: init.alpha_mode,
            frame_latency: init.desired_maximum_frame_latency,
            state: Mutex::new(SurfaceState::default()),
        }
    }

    /// Pixel formats the surface can present.
    pub fn supported_formats(&self) -> &[wgpu::TextureFormat] {
        &self.caps.formats
    }

    /// Returns the configured pixel format, if any.
    pub fn format(&self) -> Option<wgpu::TextureFormat> {
        self.state.lock().config.as_ref().map(|c| c.format)
    }

    /// Picks the pixel format to configure for `requested`.
    ///
    /// Returns `requested` when the surface supports it, otherwise the closest
    /// supported 4-channel 8-bit format. `None` only for a surface that reports
    /// no formats at all.
    pub fn pick_format(&self, requested: wgpu::TextureFormat) -> Option<wgpu::TextureFormat> {
        choose_surface_format(&self.caps.formats, requested)
    }

    /// Records a new drawable size in physical pixels.
    ///
    /// Applied on the next acquisition. wgpu cannot configure a 0x0 surface; in
    /// that case acquisition reports [`AcquireError::NotConfigured`] until a
    /// non-zero size arrives.
    pub fn resize(&self, width: u32, height: u32) {
        self.state.lock().extent.resize((width, height));
    }
}

impl SurfaceProvider<WgpuDevice> for WgpuSurface {
    fn configure(
        &self,
        device: &WgpuDevice,
        format: wgpu::TextureFormat,
    ) -> Result<(), SetupError> {
        if !self.caps.formats.contains(&format) {
            return Err(SetupError::SurfaceConfiguration {
                format,
                reason: format!("supported formats are {:?}", self.caps.formats),
            });
        }

        let present_mode = choose_present_mode(&self.caps, self.present_mode);
        let mut state = self.state.lock();
        let (width, height) = state.extent.size;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode,
            alpha_mode: choose_alpha_mode(&self.caps, self.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: self.frame_latency,
        };

        if state.extent.configure().is_some() {
            self.surface.configure(device.raw(), &config);
        }
        log::info!("surface configured: {format:?} {width}x{height} {present_mode:?}");

        state.device = Some(device.raw().clone());
        state.config = Some(config);
        Ok(())
    }

    fn acquire_next_image(&self) -> Result<<WgpuDevice as GpuDevice>::Image, AcquireError> {
        // The lock covers resize bookkeeping only; the acquisition wait runs
        // without it so the host can keep recording resizes.
        let (device, config) = {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            if let Some((width, height)) = state.extent.apply_pending() {
                if let (Some(device), Some(config)) = (&state.device, state.config.as_mut()) {
                    config.width = width;
                    config.height = height;
                    self.surface.configure(device, config);
                    log::debug!("surface resized to {width}x{height}");
                }
            }

            match (state.extent.drawable(), &state.device, &state.config) {
                (Some(_), Some(device), Some(config)) => (device.clone(), config.clone()),
                _ => return Err(AcquireError::NotConfigured),
            }
        };

        self.surface
            .get_current_texture()
            .map(SurfaceImage::new)
            .map_err(|err| recover_from(&self.surface, &device, &config, err))
    }
}

fn choose_present_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: wgpu::PresentMode,
) -> wgpu::PresentMode {
    if caps.present_modes.contains(&requested) {
        requested
    } else {
        // FIFO is the one mode every surface must support.
        wgpu::PresentMode::Fifo
    }
}

fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

fn choose_surface_format(
    supported: &[wgpu::TextureFormat],
    requested: wgpu::TextureFormat,
) -> Option<wgpu::TextureFormat> {
    if supported.contains(&requested) {
        return Some(requested);
    }

    let fallbacks = [
        wgpu::TextureFormat::Rgba8Unorm,
        wgpu::TextureFormat::Bgra8Unorm,
        wgpu::TextureFormat::Rgba8UnormSrgb,
        wgpu::TextureFormat::Bgra8UnormSrgb,
    ];
    fallbacks
        .into_iter()
        .find(|f| supported.contains(f))
        .or_else(|| supported.first().copied())
}

fn recover_from(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    err: wgpu::SurfaceError,
) -> AcquireError {
    match err {
        wgpu::SurfaceError::Lost => {
            surface.configure(device, config);
            AcquireError::Lost
        }
        wgpu::SurfaceError::Outdated => {
            surface.configure(device, config);
            AcquireError::Outdated
        }
        wgpu::SurfaceError::OutOfMemory => AcquireError::OutOfMemory,
        wgpu::SurfaceError::Timeout => AcquireError::Timeout,
        wgpu::SurfaceError::Other => AcquireError::Other,
    }
}
