//! Per-frame rendering.
//!
//! The render loop acquires a presentable image, describes one render pass
//! against it (clear, then an optional single draw), and submits + presents.
//! Passes are described backend-neutrally by [`RenderPassPlan`] and recorded
//! by the device.

mod config;
mod pass;
mod render_loop;
mod stats;

pub use config::RenderConfig;
pub use pass::{DrawCall, RenderPassPlan, VertexBinding};
pub use render_loop::{FrameOutcome, RenderLoop, SkipReason};
pub use stats::{FrameStats, FrameStatsSnapshot};
