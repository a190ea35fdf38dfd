use crate::device::GpuDevice;
use crate::error::ConfigError;
use crate::geometry;

use super::{EntryPoint, ShaderLibrary, ShaderStage};

/// Everything a device needs to compile the render pipeline.
pub struct PipelineDescriptor<'a> {
    pub label: &'a str,
    pub library: &'a ShaderLibrary,
    pub vertex_entry: &'a str,
    pub fragment_entry: &'a str,
    /// Color target format; must match the surface chain.
    pub format: wgpu::TextureFormat,
    pub vertex_buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub topology: wgpu::PrimitiveTopology,
}

/// Compiled, immutable render pipeline bound to one pixel format.
pub struct PipelineState<D: GpuDevice> {
    raw: D::Pipeline,
    format: wgpu::TextureFormat,
    vertex_entry: String,
    fragment_entry: String,
}

impl<D: GpuDevice> PipelineState<D> {
    /// Resolves both entry points from `library` and compiles the pipeline.
    ///
    /// The vertex layout is fixed: position at slot 0, color at slot 1, both
    /// 4-component floats, drawn as a triangle list.
    pub fn build(
        device: &D,
        library: &ShaderLibrary,
        vertex_entry: &str,
        fragment_entry: &str,
        format: wgpu::TextureFormat,
    ) -> Result<Self, ConfigError> {
        let vertex = library.resolve(vertex_entry, ShaderStage::Vertex)?;
        let fragment = library.resolve(fragment_entry, ShaderStage::Fragment)?;

        let layouts = geometry::vertex_layouts();
        check_vertex_inputs(vertex, &layouts, format)?;

        let raw = device.create_render_pipeline(&PipelineDescriptor {
            label: "trigon pipeline",
            library,
            vertex_entry: &vertex.name,
            fragment_entry: &fragment.name,
            format,
            vertex_buffers: &layouts,
            topology: wgpu::PrimitiveTopology::TriangleList,
        })?;

        log::info!(
            "pipeline built: {}/{} from `{}` for {format:?}",
            vertex.name,
            fragment.name,
            library.label()
        );

        Ok(Self {
            raw,
            format,
            vertex_entry: vertex.name.clone(),
            fragment_entry: fragment.name.clone(),
        })
    }

    /// Returns the device pipeline object.
    pub fn raw(&self) -> &D::Pipeline {
        &self.raw
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// `false` means the pipeline must be rebuilt (never mutated) for `format`.
    pub fn is_compatible_with(&self, format: wgpu::TextureFormat) -> bool {
        self.format == format
    }

    pub fn entry_points(&self) -> (&str, &str) {
        (&self.vertex_entry, &self.fragment_entry)
    }
}

/// Every `@location` the vertex stage reads must be fed by a buffer attribute.
fn check_vertex_inputs(
    entry: &EntryPoint,
    layouts: &[wgpu::VertexBufferLayout<'_>],
    format: wgpu::TextureFormat,
) -> Result<(), ConfigError> {
    let provided = |location: u32| {
        layouts
            .iter()
            .flat_map(|layout| layout.attributes)
            .any(|attr| attr.shader_location == location)
    };

    match entry.inputs.iter().find(|location| !provided(**location)) {
        Some(location) => Err(ConfigError::PipelineCreation {
            format,
            reason: format!(
                "`{}` reads @location({location}), which no vertex buffer provides",
                entry.name
            ),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDevice;

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8Unorm;

    #[test]
    fn builds_with_valid_names_and_format() {
        let device = FakeDevice::new();
        let lib = ShaderLibrary::triangle().unwrap();

        let state = PipelineState::build(&device, &lib, "vertex_main", "fragment_main", FORMAT)
            .unwrap();

        assert_eq!(state.format(), FORMAT);
        assert_eq!(state.entry_points(), ("vertex_main", "fragment_main"));
        assert_eq!(state.raw().vertex_buffer_count, 2);
        assert_eq!(device.pipelines_created(), 1);
    }

    #[test]
    fn missing_entry_point_never_reaches_the_device() {
        let device = FakeDevice::new();
        let lib = ShaderLibrary::triangle().unwrap();

        let err = PipelineState::build(&device, &lib, "vertex_main", "fragmnt_main", FORMAT)
            .err()
            .unwrap();

        assert!(matches!(
            err,
            ConfigError::ShaderCompilation { entry_point: Some(ref name), .. } if name == "fragmnt_main"
        ));
        assert_eq!(device.pipelines_created(), 0);
    }

    #[test]
    fn rejected_format_is_a_pipeline_creation_error() {
        let device = FakeDevice::new();
        let lib = ShaderLibrary::triangle().unwrap();

        let err = PipelineState::build(
            &device,
            &lib,
            "vertex_main",
            "fragment_main",
            wgpu::TextureFormat::Depth32Float,
        )
        .err()
        .unwrap();

        assert!(matches!(err, ConfigError::PipelineCreation { .. }));
    }

    #[test]
    fn unfed_vertex_input_never_reaches_the_device() {
        let device = FakeDevice::new();
        let src = r#"
            @vertex
            fn vertex_main(@location(5) a: vec4<f32>) -> @builtin(position) vec4<f32> {
                return a;
            }

            @fragment
            fn fragment_main() -> @location(0) vec4<f32> {
                return vec4<f32>(1.0, 1.0, 1.0, 1.0);
            }
        "#;
        let lib = ShaderLibrary::from_wgsl("unfed.wgsl", src).unwrap();

        let err = PipelineState::build(&device, &lib, "vertex_main", "fragment_main", FORMAT)
            .err()
            .unwrap();

        match err {
            ConfigError::PipelineCreation { format, reason } => {
                assert_eq!(format, FORMAT);
                assert!(reason.contains("@location(5)"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(device.pipelines_created(), 0);
    }

    #[test]
    fn format_change_requires_rebuild() {
        let device = FakeDevice::new();
        let lib = ShaderLibrary::triangle().unwrap();
        let state = PipelineState::build(&device, &lib, "vertex_main", "fragment_main", FORMAT)
            .unwrap();

        assert!(state.is_compatible_with(FORMAT));
        assert!(!state.is_compatible_with(wgpu::TextureFormat::Rgba8Unorm));
    }
}
