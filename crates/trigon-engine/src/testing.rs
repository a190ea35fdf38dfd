//! In-crate fakes for the device, surface chain and vsync seams.
//!
//! The fake device records every command buffer it is asked to encode, so tests
//! can assert on the exact pass/bind/draw sequence of each frame.

use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::device::{GpuDevice, SurfaceProvider};
use crate::driver::{DriverError, FireCallback, TimerHandle, VsyncSource};
use crate::error::{AcquireError, ConfigError, EncodeError, SetupError};
use crate::geometry::AttributeSlot;
use crate::pipeline::PipelineDescriptor;
use crate::render::RenderPassPlan;

// ── device ────────────────────────────────────────────────────────────────

pub(crate) struct FakeBuffer {
    pub label: String,
    pub bytes: Vec<u8>,
}

pub(crate) struct FakePipeline {
    pub id: u64,
    pub vertex_buffer_count: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedDraw {
    pub pipeline: u64,
    pub bindings: Vec<(AttributeSlot, usize)>,
    pub bound_labels: Vec<String>,
    pub vertices: Range<u32>,
    pub instances: Range<u32>,
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedPass {
    pub color_ops: wgpu::Operations<wgpu::Color>,
    pub target_slot: usize,
    pub draws: Vec<RecordedDraw>,
}

#[derive(Debug, Clone)]
pub(crate) struct Submission {
    pub sequence: u64,
    pub pass: RecordedPass,
    pub presented_slot: usize,
}

#[derive(Default)]
pub(crate) struct FakeDevice {
    next_id: AtomicU64,
    buffers: AtomicUsize,
    pipelines: AtomicUsize,
    encode_failures: AtomicUsize,
    submissions: Mutex<Vec<Submission>>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffers_created(&self) -> usize {
        self.buffers.load(Ordering::SeqCst)
    }

    pub fn pipelines_created(&self) -> usize {
        self.pipelines.load(Ordering::SeqCst)
    }

    pub fn fail_next_encodes(&self, count: usize) {
        self.encode_failures.store(count, Ordering::SeqCst);
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().clone()
    }
}

impl GpuDevice for FakeDevice {
    type Buffer = FakeBuffer;
    type Pipeline = FakePipeline;
    type Image = FakeImage;
    type CommandBuffer = RecordedPass;

    fn create_vertex_buffer(&self, label: &str, contents: &[u8]) -> FakeBuffer {
        self.buffers.fetch_add(1, Ordering::SeqCst);
        FakeBuffer {
            label: label.to_string(),
            bytes: contents.to_vec(),
        }
    }

    fn create_render_pipeline(
        &self,
        desc: &PipelineDescriptor<'_>,
    ) -> Result<FakePipeline, ConfigError> {
        if desc.format.is_depth_stencil_format() {
            return Err(ConfigError::PipelineCreation {
                format: desc.format,
                reason: "not a color format".to_string(),
            });
        }
        self.pipelines.fetch_add(1, Ordering::SeqCst);
        Ok(FakePipeline {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            vertex_buffer_count: desc.vertex_buffers.len(),
        })
    }

    fn encode(
        &self,
        target: &FakeImage,
        pass: &RenderPassPlan<'_, Self>,
    ) -> Result<RecordedPass, EncodeError> {
        let fail = self
            .encode_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if fail {
            return Err(EncodeError("fake encoder exhausted".to_string()));
        }

        let draws = pass
            .draw
            .iter()
            .map(|draw| RecordedDraw {
                pipeline: draw.pipeline.id,
                bindings: draw
                    .vertex_buffers
                    .iter()
                    .map(|b| (b.slot, b.buffer.bytes.len()))
                    .collect(),
                bound_labels: draw
                    .vertex_buffers
                    .iter()
                    .map(|b| b.buffer.label.clone())
                    .collect(),
                vertices: draw.vertices.clone(),
                instances: draw.instances.clone(),
            })
            .collect();

        Ok(RecordedPass {
            color_ops: pass.color_ops,
            target_slot: target.slot,
            draws,
        })
    }

    fn submit(&self, commands: RecordedPass, present: FakeImage) {
        let mut subs = self.submissions.lock();
        let sequence = subs.len() as u64;
        subs.push(Submission {
            sequence,
            pass: commands,
            presented_slot: present.slot,
        });
        present.chain.presented.fetch_add(1, Ordering::SeqCst);
    }
}

// ── surface chain ─────────────────────────────────────────────────────────

#[derive(Default)]
struct Chain {
    busy: Mutex<Vec<bool>>,
    presented: AtomicUsize,
}

/// Presentable image; returns its slot to the chain when dropped.
pub(crate) struct FakeImage {
    slot: usize,
    chain: Arc<Chain>,
}

impl Drop for FakeImage {
    fn drop(&mut self) {
        self.chain.busy.lock()[self.slot] = false;
    }
}

pub(crate) struct FakeSurface {
    chain: Arc<Chain>,
    timeouts: AtomicUsize,
    configured: Mutex<Option<wgpu::TextureFormat>>,
    supported: Vec<wgpu::TextureFormat>,
}

impl FakeSurface {
    /// A chain of `capacity` images supporting the common 8-bit formats.
    pub fn new(capacity: usize) -> Self {
        Self {
            chain: Arc::new(Chain {
                busy: Mutex::new(vec![false; capacity]),
                presented: AtomicUsize::new(0),
            }),
            timeouts: AtomicUsize::new(0),
            configured: Mutex::new(None),
            supported: vec![
                wgpu::TextureFormat::Bgra8Unorm,
                wgpu::TextureFormat::Bgra8UnormSrgb,
                wgpu::TextureFormat::Rgba8Unorm,
            ],
        }
    }

    /// Makes the next `count` acquisitions time out.
    pub fn time_out_next(&self, count: usize) {
        self.timeouts.store(count, Ordering::SeqCst);
    }

    pub fn in_flight(&self) -> usize {
        self.chain.busy.lock().iter().filter(|b| **b).count()
    }

    pub fn presented(&self) -> usize {
        self.chain.presented.load(Ordering::SeqCst)
    }
}

impl SurfaceProvider<FakeDevice> for FakeSurface {
    fn configure(&self, _device: &FakeDevice, format: wgpu::TextureFormat) -> Result<(), SetupError> {
        if !self.supported.contains(&format) {
            return Err(SetupError::SurfaceConfiguration {
                format,
                reason: "unsupported by fake surface".to_string(),
            });
        }
        *self.configured.lock() = Some(format);
        Ok(())
    }

    fn acquire_next_image(&self) -> Result<FakeImage, AcquireError> {
        if self.configured.lock().is_none() {
            return Err(AcquireError::NotConfigured);
        }

        let scripted = self
            .timeouts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if scripted {
            return Err(AcquireError::Timeout);
        }

        let mut busy = self.chain.busy.lock();
        let slot = busy.iter().position(|b| !*b).ok_or(AcquireError::Timeout)?;
        busy[slot] = true;

        Ok(FakeImage {
            slot,
            chain: Arc::clone(&self.chain),
        })
    }
}

// ── vsync ─────────────────────────────────────────────────────────────────

struct Registered {
    stopped: Arc<AtomicBool>,
    callback: FireCallback,
}

/// Vsync source fired by hand. Clones share state.
#[derive(Clone, Default)]
pub(crate) struct ManualVsync {
    timers: Arc<Mutex<Vec<Registered>>>,
    created: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
    fail_next: Arc<AtomicBool>,
}

pub(crate) struct ManualTimer {
    stopped: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
}

impl TimerHandle for ManualTimer {
    fn stop(self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ManualVsync {
    /// Fires every running timer once.
    pub fn fire(&self) {
        for cb in self.callbacks(false) {
            cb();
        }
    }

    /// Fires stopped timers too, as a platform fire already in flight would.
    pub fn fire_including_stopped(&self) {
        for cb in self.callbacks(true) {
            cb();
        }
    }

    pub fn active_timers(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn timers_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn fail_next_create(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn callbacks(&self, include_stopped: bool) -> Vec<FireCallback> {
        self.timers
            .lock()
            .iter()
            .filter(|t| include_stopped || !t.stopped.load(Ordering::SeqCst))
            .map(|t| Arc::clone(&t.callback))
            .collect()
    }
}

impl VsyncSource for ManualVsync {
    type Handle = ManualTimer;

    fn create_timer(&self, on_fire: FireCallback) -> Result<ManualTimer, DriverError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(DriverError::Unavailable("scripted failure".to_string()));
        }

        let stopped = Arc::new(AtomicBool::new(false));
        self.timers.lock().push(Registered {
            stopped: Arc::clone(&stopped),
            callback: on_fire,
        });
        self.created.fetch_add(1, Ordering::SeqCst);
        self.active.fetch_add(1, Ordering::SeqCst);

        Ok(ManualTimer {
            stopped,
            active: Arc::clone(&self.active),
        })
    }
}
