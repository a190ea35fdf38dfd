/// Render loop configuration.
///
/// Fixed at setup; changing the pixel format means building a new render loop.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Color every frame is cleared to before drawing.
    pub clear_color: wgpu::Color,

    /// Surface and pipeline color format.
    pub pixel_format: wgpu::TextureFormat,

    /// Vertices per draw; both attribute buffers must hold exactly this many.
    pub vertex_count: u32,

    /// Vertex entry point in the shader library.
    pub vertex_entry: String,

    /// Fragment entry point in the shader library.
    pub fragment_entry: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: wgpu::Color {
                r: 0.5,
                g: 0.5,
                b: 0.5,
                a: 1.0,
            },
            pixel_format: wgpu::TextureFormat::Bgra8Unorm,
            vertex_count: 3,
            vertex_entry: "vertex_main".to_string(),
            fragment_entry: "fragment_main".to_string(),
        }
    }
}
