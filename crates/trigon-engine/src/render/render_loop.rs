use parking_lot::Mutex;

use crate::device::{GpuContext, GpuDevice, SurfaceProvider};
use crate::driver::FrameTarget;
use crate::error::{AcquireError, ConfigError, EncodeError, SetupError};
use crate::geometry::{Geometry, GeometryBuffers};
use crate::pipeline::{PipelineState, ShaderLibrary};

use super::{DrawCall, FrameStats, RenderConfig, RenderPassPlan};

/// Result of one [`RenderLoop::render_frame`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Cleared, drew the geometry, and presented.
    Drawn { frame: u64 },
    /// Draw resources are not ready; cleared and presented.
    Cleared { frame: u64 },
    /// Nothing was submitted or presented this tick.
    Skipped(SkipReason),
}

/// Why a frame was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    SurfaceUnavailable(AcquireError),
    EncoderUnavailable(EncodeError),
}

/// Pipeline and geometry, present only when both were built.
struct DrawResources<D: GpuDevice> {
    pipeline: PipelineState<D>,
    geometry: GeometryBuffers<D>,
}

/// The render loop: acquire, encode one pass, submit and present.
///
/// All GPU resources are created in [`RenderLoop::setup`] and are read-only
/// afterwards, so frames need no locking around them. The only lock is the frame
/// lock serializing acquire-to-submit, which keeps submissions in the order
/// frames were requested when more than one thread renders.
pub struct RenderLoop<D: GpuDevice, S: SurfaceProvider<D>> {
    context: GpuContext<D>,
    surface: S,
    config: RenderConfig,

    resources: Option<DrawResources<D>>,
    setup_error: Option<ConfigError>,

    /// Index of the next frame to submit.
    next_frame: Mutex<u64>,
    stats: FrameStats,
}

impl<D: GpuDevice, S: SurfaceProvider<D>> RenderLoop<D, S> {
    /// Configures the surface and builds the draw resources.
    ///
    /// Only surface configuration is fatal. Shader, pipeline and geometry
    /// problems are logged, kept in [`setup_error`](Self::setup_error), and
    /// leave the loop rendering clear-only frames.
    pub fn setup(
        context: GpuContext<D>,
        surface: S,
        config: RenderConfig,
        shaders: &ShaderLibrary,
        geometry: Geometry<'_>,
    ) -> Result<Self, SetupError> {
        surface.configure(context.device(), config.pixel_format)?;

        let (resources, setup_error) =
            match prepare_resources(context.device(), &config, shaders, geometry) {
                Ok(resources) => (Some(resources), None),
                Err(err) => {
                    log::error!("draw resources unavailable, frames will be clear-only: {err}");
                    (None, Some(err))
                }
            };

        Ok(Self {
            context,
            surface,
            config,
            resources,
            setup_error,
            next_frame: Mutex::new(0),
            stats: FrameStats::default(),
        })
    }

    /// Renders one frame.
    ///
    /// Safe to call from the vsync thread. A missing surface image or encoder
    /// skips the frame; missing draw resources degrade it to clear-only.
    pub fn render_frame(&self) -> FrameOutcome {
        let mut next_frame = self.next_frame.lock();
        let frame = *next_frame;

        let image = match self.surface.acquire_next_image() {
            Ok(image) => image,
            Err(err) => {
                if err.is_expected() {
                    log::debug!("frame {frame} skipped: {err}");
                } else {
                    log::warn!("frame {frame} skipped: {err}");
                }
                self.stats.record_skipped();
                return FrameOutcome::Skipped(SkipReason::SurfaceUnavailable(err));
            }
        };

        let pass = self.plan_pass();
        let drew = pass.draw.is_some();

        let commands = match self.context.device().encode(&image, &pass) {
            Ok(commands) => commands,
            Err(err) => {
                log::warn!("frame {frame} skipped: {err}");
                self.stats.record_skipped();
                return FrameOutcome::Skipped(SkipReason::EncoderUnavailable(err));
            }
        };

        self.context.submit(commands, image);
        *next_frame += 1;

        if drew {
            self.stats.record_drawn();
            log::trace!("frame {frame} presented");
            FrameOutcome::Drawn { frame }
        } else {
            self.stats.record_cleared();
            log::trace!("frame {frame} presented (clear only)");
            FrameOutcome::Cleared { frame }
        }
    }

    fn plan_pass(&self) -> RenderPassPlan<'_, D> {
        let draw = self.resources.as_ref().map(|res| DrawCall {
            pipeline: res.pipeline.raw(),
            vertex_buffers: res.geometry.bindings(),
            vertices: 0..res.geometry.vertex_count(),
            instances: 0..1,
        });
        RenderPassPlan::new(self.config.clear_color, draw)
    }

    /// `true` when pipeline and geometry were both built.
    pub fn is_ready_to_draw(&self) -> bool {
        self.resources.is_some()
    }

    /// Configuration error recorded during setup, if any.
    pub fn setup_error(&self) -> Option<&ConfigError> {
        self.setup_error.as_ref()
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn context(&self) -> &GpuContext<D> {
        &self.context
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }
}

impl<D: GpuDevice, S: SurfaceProvider<D>> FrameTarget for RenderLoop<D, S> {
    fn on_vsync(&self) {
        self.render_frame();
    }
}

fn prepare_resources<D: GpuDevice>(
    device: &D,
    config: &RenderConfig,
    shaders: &ShaderLibrary,
    geometry: Geometry<'_>,
) -> Result<DrawResources<D>, ConfigError> {
    // Validate first so a size mismatch leaves the pipeline unbuilt as well.
    geometry.validate(config.vertex_count)?;

    let pipeline = PipelineState::build(
        device,
        shaders,
        &config.vertex_entry,
        &config.fragment_entry,
        config.pixel_format,
    )?;
    let geometry = GeometryBuffers::upload(device, geometry, config.vertex_count)?;

    Ok(DrawResources { pipeline, geometry })
}
