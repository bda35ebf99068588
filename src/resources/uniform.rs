//! Uniform buffers
//!
//! A uniform buffer carries a field layout computed with WebGPU's alignment
//! rules: every field is placed at the next offset aligned to its type,
//! 3-component types are padded to 16 bytes (the vec4 rule), and the final
//! buffer size is rounded up to the 256-byte uniform-offset granularity.
//!
//! The layout is append-only until the buffer is first built; afterwards it
//! is frozen. Field values are written into a CPU-side byte block and
//! flushed to the GPU with [`UniformBufferResource::upload`].

use glam::{IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, UVec2, UVec3, UVec4, Vec2, Vec3, Vec4};

use crate::context::WgpuContext;
use crate::errors::{CinderError, Result};
use crate::resources::{BindingShape, GpuResource, ResourceState};

/// Uniform buffers are bound at 256-byte granularity.
pub const UNIFORM_ALIGNMENT: u64 = 256;

// ============================================================================
// Field types
// ============================================================================

/// Scalar/vector/matrix type of a uniform field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformType {
    Float,
    Float2,
    Float3,
    Float4,
    Int,
    Int2,
    Int3,
    Int4,
    Uint,
    Uint2,
    Uint3,
    Uint4,
    Mat2,
    Mat3,
    Mat4,
    Bool,
}

impl UniformType {
    /// Payload size in bytes.
    #[must_use]
    pub fn size(self) -> u64 {
        match self {
            Self::Float | Self::Int | Self::Uint | Self::Bool => 4,
            Self::Float2 | Self::Int2 | Self::Uint2 => 8,
            Self::Float3 | Self::Int3 | Self::Uint3 => 12,
            Self::Float4 | Self::Int4 | Self::Uint4 | Self::Mat2 => 16,
            Self::Mat3 => 36,
            Self::Mat4 => 64,
        }
    }

    /// Alignment in bytes. Every 3-component type (vec3s and mat3) takes
    /// 16-byte alignment regardless of its payload size.
    #[must_use]
    pub fn alignment(self) -> u64 {
        match self {
            Self::Float3 | Self::Int3 | Self::Uint3 | Self::Mat3 => 16,
            other => other.size(),
        }
    }
}

/// A typed value writable into a uniform field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Float2(Vec2),
    Float3(Vec3),
    Float4(Vec4),
    Int(i32),
    Int2(IVec2),
    Int3(IVec3),
    Int4(IVec4),
    Uint(u32),
    Uint2(UVec2),
    Uint3(UVec3),
    Uint4(UVec4),
    Mat2(Mat2),
    Mat3(Mat3),
    Mat4(Mat4),
    Bool(bool),
}

impl UniformValue {
    /// The [`UniformType`] this value satisfies.
    #[must_use]
    pub fn ty(&self) -> UniformType {
        match self {
            Self::Float(_) => UniformType::Float,
            Self::Float2(_) => UniformType::Float2,
            Self::Float3(_) => UniformType::Float3,
            Self::Float4(_) => UniformType::Float4,
            Self::Int(_) => UniformType::Int,
            Self::Int2(_) => UniformType::Int2,
            Self::Int3(_) => UniformType::Int3,
            Self::Int4(_) => UniformType::Int4,
            Self::Uint(_) => UniformType::Uint,
            Self::Uint2(_) => UniformType::Uint2,
            Self::Uint3(_) => UniformType::Uint3,
            Self::Uint4(_) => UniformType::Uint4,
            Self::Mat2(_) => UniformType::Mat2,
            Self::Mat3(_) => UniformType::Mat3,
            Self::Mat4(_) => UniformType::Mat4,
            Self::Bool(_) => UniformType::Bool,
        }
    }

    fn write_to(&self, out: &mut [u8]) {
        match self {
            Self::Float(v) => out.copy_from_slice(bytemuck::bytes_of(v)),
            Self::Float2(v) => out.copy_from_slice(bytemuck::bytes_of(v)),
            Self::Float3(v) => out.copy_from_slice(bytemuck::bytes_of(v)),
            Self::Float4(v) => out.copy_from_slice(bytemuck::bytes_of(v)),
            Self::Int(v) => out.copy_from_slice(bytemuck::bytes_of(v)),
            Self::Int2(v) => out.copy_from_slice(bytemuck::bytes_of(v)),
            Self::Int3(v) => out.copy_from_slice(bytemuck::bytes_of(v)),
            Self::Int4(v) => out.copy_from_slice(bytemuck::bytes_of(v)),
            Self::Uint(v) => out.copy_from_slice(bytemuck::bytes_of(v)),
            Self::Uint2(v) => out.copy_from_slice(bytemuck::bytes_of(v)),
            Self::Uint3(v) => out.copy_from_slice(bytemuck::bytes_of(v)),
            Self::Uint4(v) => out.copy_from_slice(bytemuck::bytes_of(v)),
            Self::Mat2(v) => out.copy_from_slice(bytemuck::bytes_of(v)),
            Self::Mat3(v) => out.copy_from_slice(bytemuck::bytes_of(v)),
            Self::Mat4(v) => out.copy_from_slice(bytemuck::bytes_of(v)),
            Self::Bool(v) => out.copy_from_slice(bytemuck::bytes_of(&i32::from(*v))),
        }
    }
}

// ============================================================================
// Layout
// ============================================================================

/// One entry in a uniform layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniformField {
    /// Field name, unique within the buffer
    pub name: String,
    /// Field type
    pub ty: UniformType,
    /// Byte offset, always a multiple of the field's alignment
    pub offset: u64,
    /// Payload size in bytes
    pub size: u64,
    /// Alignment the offset was computed with
    pub alignment: u64,
}

/// An aligned uniform field layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UniformLayout {
    fields: Vec<UniformField>,
    total_size: u64,
}

impl UniformLayout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field.
    ///
    /// `offset = ceil(total / alignment) * alignment`, then the running
    /// total grows to at least `offset + size`. Duplicate names are
    /// rejected.
    pub fn add(&mut self, name: impl Into<String>, ty: UniformType) -> Result<&mut Self> {
        let name = name.into();
        if name.is_empty() || self.field(&name).is_some() {
            return Err(CinderError::InvalidDescriptor {
                name,
                reason: "uniform field names must be unique and non-empty".to_string(),
            });
        }

        let size = ty.size();
        let alignment = ty.alignment();
        let offset = self.total_size.div_ceil(alignment) * alignment;

        self.fields.push(UniformField {
            name,
            ty,
            offset,
            size,
            alignment,
        });
        self.total_size = self.total_size.max(offset + size);
        Ok(self)
    }

    /// Looks a field up by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All fields, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[UniformField] {
        &self.fields
    }

    /// Sum-derived size before padding.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Final buffer size: the smallest multiple of 256 that holds the
    /// layout. An empty layout still occupies one 256-byte block.
    #[must_use]
    pub fn padded_size(&self) -> u64 {
        self.total_size.div_ceil(UNIFORM_ALIGNMENT).max(1) * UNIFORM_ALIGNMENT
    }

    // ── Preset layouts ───────────────────────────────────────────────────────

    /// Model/view/projection matrix block.
    #[must_use]
    pub fn transform() -> Self {
        let mut layout = Self::new();
        layout
            .add("model_matrix", UniformType::Mat4)
            .and_then(|l| l.add("view_matrix", UniformType::Mat4))
            .and_then(|l| l.add("projection_matrix", UniformType::Mat4))
            .expect("preset field names are unique");
        layout
    }

    /// Standard material parameter block.
    #[must_use]
    pub fn material_params() -> Self {
        let mut layout = Self::new();
        layout
            .add("base_color", UniformType::Float4)
            .and_then(|l| l.add("metallic", UniformType::Float))
            .and_then(|l| l.add("roughness", UniformType::Float))
            .and_then(|l| l.add("emissive", UniformType::Float3))
            .expect("preset field names are unique");
        layout
    }
}

// ============================================================================
// Resource
// ============================================================================

/// A uniform buffer resource: layout + CPU byte block + native handle.
pub struct UniformBufferResource {
    layout: UniformLayout,
    /// CPU copy, allocated at build time to the padded size
    data: Vec<u8>,
    frozen: bool,
    state: ResourceState,
    handle: Option<wgpu::Buffer>,
}

impl UniformBufferResource {
    /// Wraps a prepared layout. The layout stays appendable until the
    /// buffer is first built.
    #[must_use]
    pub fn new(layout: UniformLayout) -> Self {
        Self {
            layout,
            data: Vec::new(),
            frozen: false,
            state: ResourceState::default(),
            handle: None,
        }
    }

    /// The field layout.
    #[must_use]
    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    /// The native handle, if built.
    #[must_use]
    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.handle.as_ref()
    }

    /// The CPU-side byte block (empty until a value is staged or the
    /// buffer is built).
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Appends a field to the layout. Fails once the buffer has been built:
    /// the layout is frozen from that point on.
    pub fn add_field(&mut self, name: &str, ty: UniformType) -> Result<()> {
        if self.frozen {
            return Err(CinderError::InvalidDescriptor {
                name: name.to_string(),
                reason: "uniform layout is frozen after the buffer is built".to_string(),
            });
        }
        self.layout.add(name, ty)?;
        Ok(())
    }

    /// Writes a field value into the CPU block.
    ///
    /// The value type must match the field's declared type. Field offsets
    /// never move once appended, so values can be staged before the buffer
    /// is built; nothing touches the GPU until [`Self::upload`] runs (the
    /// first build also flushes the staged block).
    pub fn set_value(&mut self, buffer_name: &str, field: &str, value: UniformValue) -> Result<()> {
        let entry = self
            .layout
            .field(field)
            .ok_or_else(|| CinderError::FieldNotFound {
                buffer: buffer_name.to_string(),
                field: field.to_string(),
            })?;
        if value.ty() != entry.ty {
            return Err(CinderError::InvalidDescriptor {
                name: buffer_name.to_string(),
                reason: format!(
                    "field \"{field}\" is {:?}, got {:?}",
                    entry.ty,
                    value.ty()
                ),
            });
        }
        let start = entry.offset as usize;
        let end = start + entry.size as usize;
        if self.data.len() < end {
            self.data.resize(self.layout.padded_size() as usize, 0);
        }
        value.write_to(&mut self.data[start..end]);
        Ok(())
    }

    /// Flushes the CPU block to the GPU buffer.
    pub fn upload(&self, ctx: &WgpuContext, buffer_name: &str) -> Result<()> {
        let buffer = self.handle.as_ref().ok_or_else(|| CinderError::NotBuilt {
            name: buffer_name.to_string(),
        })?;
        ctx.queue.write_buffer(buffer, 0, &self.data);
        Ok(())
    }
}

impl GpuResource for UniformBufferResource {
    fn validate(&self) -> std::result::Result<(), String> {
        for field in self.layout.fields() {
            if field.offset % field.alignment != 0 {
                return Err(format!(
                    "field \"{}\" offset {} is not {}-aligned",
                    field.name, field.offset, field.alignment
                ));
            }
        }
        Ok(())
    }

    fn build(&mut self, ctx: &WgpuContext, label: &str) {
        let size = self.layout.padded_size();
        self.frozen = true;
        self.data.resize(size as usize, 0);
        let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        // Flush values staged before the buffer existed.
        ctx.queue.write_buffer(&buffer, 0, &self.data);
        self.handle = Some(buffer);
    }

    fn destroy(&mut self) {
        if let Some(buffer) = self.handle.take() {
            buffer.destroy();
        }
    }

    fn is_built(&self) -> bool {
        self.handle.is_some()
    }

    fn binding_shape(&self) -> Option<BindingShape> {
        Some(BindingShape::Buffer)
    }

    fn version(&self) -> u64 {
        self.state.version()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec3_fields_take_vec4_alignment() {
        let mut layout = UniformLayout::new();
        layout.add("a", UniformType::Float).unwrap();
        layout.add("b", UniformType::Float3).unwrap();

        let b = layout.field("b").unwrap();
        assert_eq!(b.alignment, 16);
        assert_eq!(b.offset, 16);
        assert_eq!(b.size, 12);
    }

    #[test]
    fn mat3_takes_vec4_alignment() {
        let mut layout = UniformLayout::new();
        layout.add("pad", UniformType::Float).unwrap();
        layout.add("m", UniformType::Mat3).unwrap();

        let m = layout.field("m").unwrap();
        assert_eq!(m.alignment, 16);
        assert_eq!(m.offset, 16);
        assert_eq!(m.size, 36);
    }

    #[test]
    fn padded_size_rounds_to_256() {
        let mut layout = UniformLayout::new();
        layout.add("m", UniformType::Mat4).unwrap();
        assert_eq!(layout.total_size(), 64);
        assert_eq!(layout.padded_size(), 256);

        let transform = UniformLayout::transform();
        assert_eq!(transform.total_size(), 192);
        assert_eq!(transform.padded_size(), 256);
    }

    #[test]
    fn duplicate_field_name_rejected() {
        let mut layout = UniformLayout::new();
        layout.add("x", UniformType::Float).unwrap();
        assert!(layout.add("x", UniformType::Float2).is_err());
    }
}
