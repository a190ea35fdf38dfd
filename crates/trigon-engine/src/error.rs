//! Error types shared by the engine subsystems.
//!
//! Errors fall into three groups:
//! - [`SetupError`]: the view cannot function at all (no GPU, no surface).
//! - [`ConfigError`]: a setup resource is misconfigured; the render loop keeps
//!   running and degrades to clear-only frames.
//! - [`AcquireError`] / [`EncodeError`]: per-frame transients; the frame is skipped.

use thiserror::Error;

use crate::geometry::AttributeSlot;

/// Fatal setup failure. Surfaced to the host; nothing can be drawn.
#[derive(Debug, Error)]
pub enum SetupError {
    /// No adapter matched the request (or the platform exposes no GPU at all).
    #[error("no GPU device available: {0}")]
    NoDevice(String),

    #[error("failed to create GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("failed to create presentable surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    /// The surface chain rejected the requested pixel format.
    #[error("surface cannot present {format:?}: {reason}")]
    SurfaceConfiguration {
        format: wgpu::TextureFormat,
        reason: String,
    },
}

/// A setup resource could not be built from its configuration.
///
/// The affected resource is left unset. Rendering continues without it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Shader library failed to compile, or a named entry point is missing.
    #[error("shader compilation failed in `{library}`: {reason}")]
    ShaderCompilation {
        library: String,
        /// Entry point being resolved, if the failure is specific to one.
        entry_point: Option<String>,
        reason: String,
    },

    /// The device rejected the fixed-function configuration.
    #[error("pipeline creation failed for {format:?}: {reason}")]
    PipelineCreation {
        format: wgpu::TextureFormat,
        reason: String,
    },

    #[error(
        "geometry buffer size mismatch: {positions} positions, {colors} colors, draw expects {vertex_count} vertices"
    )]
    BufferSizeMismatch {
        positions: usize,
        colors: usize,
        vertex_count: u32,
    },

    /// Attribute data is not a whole number of 4-component vertices.
    #[error("{attribute:?} data holds {len} floats, not a multiple of 4")]
    MalformedAttributeData { attribute: AttributeSlot, len: usize },
}

/// Why no presentable image could be acquired for this frame.
#[derive(Debug, Copy, Clone, Error, PartialEq, Eq)]
pub enum AcquireError {
    /// The surface chain stayed exhausted for the whole bounded wait.
    #[error("timed out waiting for a presentable image")]
    Timeout,

    /// Surface was reconfigured; an image will be available next frame.
    #[error("surface was outdated and has been reconfigured")]
    Outdated,

    /// Surface was lost and has been reconfigured.
    #[error("surface was lost and has been reconfigured")]
    Lost,

    /// Surface is not configured yet, or has a zero-sized extent.
    #[error("surface is not configured")]
    NotConfigured,

    #[error("out of memory while acquiring a presentable image")]
    OutOfMemory,

    #[error("presentable image unavailable")]
    Other,
}

impl AcquireError {
    /// Returns `true` for the conditions expected during normal operation
    /// (startup, chain momentarily exhausted).
    pub fn is_expected(self) -> bool {
        matches!(self, Self::Timeout | Self::NotConfigured)
    }
}

/// The device could not provide a command encoder for this frame.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("command encoder unavailable: {0}")]
pub struct EncodeError(pub String);
