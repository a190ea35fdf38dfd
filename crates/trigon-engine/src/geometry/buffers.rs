use crate::device::GpuDevice;
use crate::error::ConfigError;
use crate::render::VertexBinding;

/// Floats per vertex for every attribute (xyzw / rgba).
pub const COMPONENTS_PER_VERTEX: usize = 4;

const ATTRIBUTE_STRIDE: u64 = (COMPONENTS_PER_VERTEX * std::mem::size_of::<f32>()) as u64;

/// Fixed vertex-buffer slot of each attribute.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AttributeSlot {
    Position = 0,
    Color = 1,
}

impl AttributeSlot {
    pub const ALL: [AttributeSlot; 2] = [AttributeSlot::Position, AttributeSlot::Color];

    /// Buffer slot and shader location.
    #[inline]
    pub const fn index(self) -> u32 {
        self as u32
    }

    pub const fn label(self) -> &'static str {
        match self {
            AttributeSlot::Position => "trigon position vbo",
            AttributeSlot::Color => "trigon color vbo",
        }
    }
}

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x4];
const COLOR_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x4];

/// Vertex buffer layouts in slot order.
pub fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
    [
        wgpu::VertexBufferLayout {
            array_stride: ATTRIBUTE_STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &POSITION_ATTRS,
        },
        wgpu::VertexBufferLayout {
            array_stride: ATTRIBUTE_STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &COLOR_ATTRS,
        },
    ]
}

/// Host-side attribute data for one draw.
#[derive(Debug, Copy, Clone)]
pub struct Geometry<'a> {
    pub positions: &'a [f32],
    pub colors: &'a [f32],
}

const TRIANGLE_POSITIONS: [f32; 12] = [
    -1.0, -1.0, 0.0, 1.0, //
    1.0, -1.0, 0.0, 1.0, //
    0.0, 1.0, 0.0, 1.0,
];

const TRIANGLE_COLORS: [f32; 12] = [
    1.0, 0.0, 0.0, 1.0, //
    0.0, 1.0, 0.0, 1.0, //
    0.0, 0.0, 1.0, 1.0,
];

impl Geometry<'static> {
    /// Full-viewport triangle with red, green and blue corners.
    pub fn triangle() -> Self {
        Self {
            positions: &TRIANGLE_POSITIONS,
            colors: &TRIANGLE_COLORS,
        }
    }
}

impl Geometry<'_> {
    /// Checks both attributes hold exactly `vertex_count` whole vertices.
    pub fn validate(&self, vertex_count: u32) -> Result<(), ConfigError> {
        let positions = vertices_in(AttributeSlot::Position, self.positions)?;
        let colors = vertices_in(AttributeSlot::Color, self.colors)?;

        if positions != colors || positions != vertex_count as usize {
            return Err(ConfigError::BufferSizeMismatch {
                positions,
                colors,
                vertex_count,
            });
        }
        Ok(())
    }
}

fn vertices_in(attribute: AttributeSlot, data: &[f32]) -> Result<usize, ConfigError> {
    if data.len() % COMPONENTS_PER_VERTEX != 0 {
        return Err(ConfigError::MalformedAttributeData {
            attribute,
            len: data.len(),
        });
    }
    Ok(data.len() / COMPONENTS_PER_VERTEX)
}

/// Immutable GPU-resident float data.
pub struct VertexBuffer<D: GpuDevice> {
    raw: D::Buffer,
    len_bytes: u64,
}

impl<D: GpuDevice> VertexBuffer<D> {
    pub fn raw(&self) -> &D::Buffer {
        &self.raw
    }

    /// Byte length: element count x 4.
    pub fn len_bytes(&self) -> u64 {
        self.len_bytes
    }
}

/// Copies `data` into a new write-once buffer.
pub fn upload<D: GpuDevice>(device: &D, label: &str, data: &[f32]) -> VertexBuffer<D> {
    let bytes: &[u8] = bytemuck::cast_slice(data);
    VertexBuffer {
        raw: device.create_vertex_buffer(label, bytes),
        len_bytes: bytes.len() as u64,
    }
}

/// Position and color buffers for a single draw of `vertex_count` vertices.
pub struct GeometryBuffers<D: GpuDevice> {
    positions: VertexBuffer<D>,
    colors: VertexBuffer<D>,
    vertex_count: u32,
}

impl<D: GpuDevice> GeometryBuffers<D> {
    /// Validates `geometry` against `vertex_count`, then uploads both attributes.
    ///
    /// Nothing is uploaded when validation fails.
    pub fn upload(device: &D, geometry: Geometry<'_>, vertex_count: u32) -> Result<Self, ConfigError> {
        geometry.validate(vertex_count)?;

        let positions = upload(device, AttributeSlot::Position.label(), geometry.positions);
        let colors = upload(device, AttributeSlot::Color.label(), geometry.colors);
        log::debug!(
            "geometry uploaded: {vertex_count} vertices, {} + {} bytes",
            positions.len_bytes(),
            colors.len_bytes()
        );

        Ok(Self {
            positions,
            colors,
            vertex_count,
        })
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn buffer(&self, slot: AttributeSlot) -> &VertexBuffer<D> {
        match slot {
            AttributeSlot::Position => &self.positions,
            AttributeSlot::Color => &self.colors,
        }
    }

    /// Buffer bindings in slot order.
    pub fn bindings(&self) -> [VertexBinding<'_, D>; 2] {
        AttributeSlot::ALL.map(|slot| VertexBinding {
            slot,
            buffer: self.buffer(slot).raw(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDevice;

    #[test]
    fn triangle_matches_three_vertices() {
        assert!(Geometry::triangle().validate(3).is_ok());
    }

    #[test]
    fn byte_length_is_four_bytes_per_float() {
        let device = FakeDevice::new();
        let vbo = upload(&device, "test", &[0.0; 12]);
        assert_eq!(vbo.len_bytes(), 48);
        assert_eq!(vbo.raw().bytes.len(), 48);
    }

    #[test]
    fn uploads_each_attribute_at_its_slot() {
        let device = FakeDevice::new();
        let buffers = GeometryBuffers::upload(&device, Geometry::triangle(), 3).unwrap();

        assert_eq!(buffers.vertex_count(), 3);
        let bindings = buffers.bindings();
        assert_eq!(bindings[0].slot, AttributeSlot::Position);
        assert_eq!(bindings[1].slot, AttributeSlot::Color);
        assert_eq!(
            bindings[1].buffer.bytes,
            bytemuck::cast_slice::<f32, u8>(&TRIANGLE_COLORS)
        );
    }

    #[test]
    fn any_vertex_count_with_matching_buffers_succeeds() {
        let device = FakeDevice::new();
        for n in [1usize, 3, 6, 64] {
            let data = vec![0.5; n * COMPONENTS_PER_VERTEX];
            let geometry = Geometry {
                positions: &data,
                colors: &data,
            };
            let buffers = GeometryBuffers::upload(&device, geometry, n as u32).unwrap();
            assert_eq!(buffers.vertex_count() as usize, n);
        }
    }

    #[test]
    fn position_color_mismatch_uploads_nothing() {
        let device = FakeDevice::new();
        let colors = [1.0; 8];
        let geometry = Geometry {
            positions: &TRIANGLE_POSITIONS,
            colors: &colors,
        };

        let err = GeometryBuffers::upload(&device, geometry, 3).err().unwrap();

        assert_eq!(
            err,
            ConfigError::BufferSizeMismatch {
                positions: 3,
                colors: 2,
                vertex_count: 3
            }
        );
        assert_eq!(device.buffers_created(), 0);
    }

    #[test]
    fn draw_count_mismatch_is_rejected() {
        let err = Geometry::triangle().validate(4).unwrap_err();
        assert!(matches!(err, ConfigError::BufferSizeMismatch { vertex_count: 4, .. }));
    }

    #[test]
    fn partial_vertex_is_malformed() {
        let positions = [0.0; 10];
        let geometry = Geometry {
            positions: &positions,
            colors: &TRIANGLE_COLORS,
        };
        assert_eq!(
            geometry.validate(3),
            Err(ConfigError::MalformedAttributeData {
                attribute: AttributeSlot::Position,
                len: 10
            })
        );
    }
}
