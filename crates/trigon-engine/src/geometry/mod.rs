//! Write-once vertex attribute buffers.
//!
//! Each attribute lives in its own buffer of tightly packed 4-component floats.
//! Counts are validated against the draw's vertex count before anything is
//! uploaded.

mod buffers;

pub use buffers::{
    AttributeSlot, COMPONENTS_PER_VERTEX, Geometry, GeometryBuffers, VertexBuffer, upload,
    vertex_layouts,
};
