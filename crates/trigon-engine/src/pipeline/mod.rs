//! Shader library and pipeline state.
//!
//! Pipeline state is built once at setup from the shipped WGSL library and is
//! immutable afterwards. A pixel-format change requires a new [`PipelineState`].

mod shader;
mod state;

pub use shader::{EntryPoint, ShaderLibrary, ShaderStage};
pub use state::{PipelineDescriptor, PipelineState};
