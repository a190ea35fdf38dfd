use std::sync::{Arc, Weak};

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use trigon_engine::device::{GpuContext, GpuInit, WgpuDevice, WgpuSurface};
use trigon_engine::driver::{Attachment, FrameDriver, FrameTarget};
use trigon_engine::geometry::Geometry;
use trigon_engine::pipeline::ShaderLibrary;
use trigon_engine::render::{FrameOutcome, RenderConfig, RenderLoop};

use crate::vsync::ThreadVsync;

type StudioLoop = RenderLoop<WgpuDevice, WgpuSurface>;

/// Window and renderer configuration for the studio host.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,

    /// Frame rate used when the monitor does not report its refresh rate.
    pub fallback_refresh_hz: u32,

    pub gpu: GpuInit,
    pub render: RenderConfig,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            title: "trigon".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
            fallback_refresh_hz: 60,
            gpu: GpuInit::default(),
            render: RenderConfig::default(),
        }
    }
}

/// Entry point for the studio host.
pub struct Studio;

impl Studio {
    /// Runs the event loop until the window closes.
    ///
    /// A setup failure ends the loop and is returned here.
    pub fn run(config: StudioConfig) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = StudioState::new(config);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// One window with its render loop. Fields drop in order: the driver stops its
/// timer before the loop and window go away.
struct View {
    driver: FrameDriver<ThreadVsync>,
    render_loop: Arc<StudioLoop>,
    window: Arc<Window>,
}

impl View {
    fn render_now(&self) {
        if let FrameOutcome::Skipped(reason) = self.render_loop.render_frame() {
            log::debug!("immediate redraw skipped: {reason:?}");
        }
    }

    fn log_stats(&self) {
        let stats = self.render_loop.stats().snapshot();
        log::info!(
            "presented {} frames ({} drawn, {} cleared), {} skipped",
            stats.presented(),
            stats.drawn,
            stats.cleared,
            stats.skipped
        );
    }
}

struct StudioState {
    config: StudioConfig,
    view: Option<View>,
    fatal: Option<anyhow::Error>,
}

impl StudioState {
    fn new(config: StudioConfig) -> Self {
        Self {
            config,
            view: None,
            fatal: None,
        }
    }

    fn create_view(&self, event_loop: &ActiveEventLoop) -> Result<View> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let (context, surface) =
            GpuContext::initialize_blocking(Arc::clone(&window), self.config.gpu.clone())
                .context("GPU initialization failed for window")?;

        let size = window.inner_size();
        surface.resize(size.width, size.height);

        let shaders = ShaderLibrary::triangle().unwrap_or_else(|err| {
            log::error!("built-in shader library rejected: {err}");
            ShaderLibrary::unavailable("triangle.wgsl", err.to_string())
        });

        let mut render = self.config.render.clone();
        match surface.pick_format(render.pixel_format) {
            Some(format) if format != render.pixel_format => {
                log::warn!(
                    "surface cannot present {:?} (supports {:?}), using {format:?}",
                    render.pixel_format,
                    surface.supported_formats()
                );
                render.pixel_format = format;
            }
            _ => {}
        }

        let render_loop =
            RenderLoop::setup(context, surface, render, &shaders, Geometry::triangle())
                .context("render loop setup failed")?;
        let render_loop = Arc::new(render_loop);
        log::info!(
            "render loop ready: format {:?}, drawing: {}",
            render_loop.surface().format(),
            render_loop.is_ready_to_draw()
        );

        let refresh = window
            .current_monitor()
            .and_then(|monitor| monitor.refresh_rate_millihertz());
        let vsync = ThreadVsync::new(refresh, self.config.fallback_refresh_hz);
        log::info!("pacing frames every {:?}", vsync.interval());

        let weak: Weak<StudioLoop> = Arc::downgrade(&render_loop);
        let target: Weak<dyn FrameTarget> = weak;
        let driver = FrameDriver::new(vsync, target);

        Ok(View {
            driver,
            render_loop,
            window,
        })
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(view) = self.view.take() {
            view.driver.on_attachment(Attachment::Detached);
            view.log_stats();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for StudioState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(view) = &self.view {
            view.driver.on_attachment(Attachment::Attached);
            return;
        }

        match self.create_view(event_loop) {
            Ok(view) => {
                // First frame without waiting for the first vsync.
                view.render_now();
                view.driver.on_attachment(Attachment::Attached);
                self.view = Some(view);
            }
            Err(err) => {
                log::error!("studio setup failed: {err:#}");
                self.fatal = Some(err);
                event_loop.exit();
            }
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(view) = &self.view {
            view.driver.on_attachment(Attachment::Detached);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(view) = &self.view else {
            return;
        };
        if view.window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => self.close(event_loop),
            WindowEvent::Resized(size) => {
                view.render_loop.surface().resize(size.width, size.height);
            }
            WindowEvent::Occluded(occluded) => {
                let attachment = if occluded {
                    Attachment::Detached
                } else {
                    Attachment::Attached
                };
                view.driver.on_attachment(attachment);
            }
            WindowEvent::RedrawRequested => {
                // The timer owns redraws while driving.
                if !view.driver.is_driving() {
                    view.render_now();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
    }
}
