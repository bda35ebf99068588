//! Vertex buffers
//!
//! Vertex attributes are packed tightly in insertion order: each attribute
//! starts exactly where the previous one ended and the stride is the sum of
//! all attribute sizes. Removing an attribute recompacts the layout.

use crate::context::WgpuContext;
use crate::errors::{CinderError, Result};
use crate::resources::{BindingShape, GpuResource, ResourceState};

/// One vertex attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Attribute name, unique within the layout
    pub name: String,
    /// Data format; its size determines the packing
    pub format: wgpu::VertexFormat,
    /// Byte offset — the cumulative size of all preceding attributes
    pub offset: u64,
    /// `@location(N)` the attribute feeds in the vertex shader
    pub shader_location: u32,
}

/// A tightly packed vertex attribute layout.
#[derive(Debug, Clone, Default)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
    stride: u64,
    /// Mirror of `attributes` in wgpu's own type, kept in sync so
    /// [`VertexLayout::as_wgpu`] can hand out a borrowing descriptor.
    wgpu_attributes: Vec<wgpu::VertexAttribute>,
}

impl VertexLayout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an attribute immediately after the previous one.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        format: wgpu::VertexFormat,
        shader_location: u32,
    ) -> Result<&mut Self> {
        let name = name.into();
        if name.is_empty() || self.attribute(&name).is_some() {
            return Err(CinderError::InvalidDescriptor {
                name,
                reason: "vertex attribute names must be unique and non-empty".to_string(),
            });
        }
        self.attributes.push(VertexAttribute {
            name,
            format,
            offset: self.stride,
            shader_location,
        });
        self.recompute();
        Ok(self)
    }

    /// Removes an attribute by name; later attributes slide down.
    pub fn remove(&mut self, name: &str) {
        self.attributes.retain(|a| a.name != name);
        self.recompute();
    }

    fn recompute(&mut self) {
        let mut offset = 0;
        for attribute in &mut self.attributes {
            attribute.offset = offset;
            offset += attribute.format.size();
        }
        self.stride = offset;
        self.wgpu_attributes = self
            .attributes
            .iter()
            .map(|a| wgpu::VertexAttribute {
                format: a.format,
                offset: a.offset,
                shader_location: a.shader_location,
            })
            .collect();
    }

    /// Looks an attribute up by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// All attributes, in insertion order.
    #[must_use]
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Bytes per vertex — the exact sum of attribute format sizes.
    #[must_use]
    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// The wgpu descriptor borrowing this layout.
    #[must_use]
    pub fn as_wgpu(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.wgpu_attributes,
        }
    }

    // ── Preset layouts ───────────────────────────────────────────────────────

    /// Static mesh layout: position/normal/tangent + four UV sets.
    #[must_use]
    pub fn static_mesh() -> Self {
        let mut layout = Self::new();
        layout
            .add("position", wgpu::VertexFormat::Float32x3, 0)
            .and_then(|l| l.add("normal", wgpu::VertexFormat::Float32x3, 1))
            .and_then(|l| l.add("tangent", wgpu::VertexFormat::Float32x3, 2))
            .and_then(|l| l.add("uv0", wgpu::VertexFormat::Float32x2, 3))
            .and_then(|l| l.add("uv1", wgpu::VertexFormat::Float32x2, 4))
            .and_then(|l| l.add("uv2", wgpu::VertexFormat::Float32x2, 5))
            .and_then(|l| l.add("uv3", wgpu::VertexFormat::Float32x2, 6))
            .expect("preset attribute names are unique");
        layout
    }

    /// Skeletal mesh layout: the static set plus joint indices and weights.
    #[must_use]
    pub fn skeletal_mesh() -> Self {
        let mut layout = Self::static_mesh();
        layout
            .add("joints", wgpu::VertexFormat::Uint8x4, 7)
            .and_then(|l| l.add("weights", wgpu::VertexFormat::Float32x4, 8))
            .expect("preset attribute names are unique");
        layout
    }
}

impl PartialEq for VertexLayout {
    fn eq(&self, other: &Self) -> bool {
        self.attributes == other.attributes
    }
}

impl Eq for VertexLayout {}

impl std::hash::Hash for VertexLayout {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.attributes.hash(state);
    }
}

/// A vertex buffer resource.
pub struct VertexBufferResource {
    layout: VertexLayout,
    size: u64,
    state: ResourceState,
    handle: Option<wgpu::Buffer>,
}

impl VertexBufferResource {
    #[must_use]
    pub fn new(size: u64, layout: VertexLayout) -> Self {
        Self {
            layout,
            size,
            state: ResourceState::default(),
            handle: None,
        }
    }

    /// The attribute layout.
    #[must_use]
    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    /// Buffer size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The native handle, if built.
    #[must_use]
    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.handle.as_ref()
    }

    /// Replaces the attribute layout. Pipelines consuming this buffer see
    /// the change through the version counter.
    pub fn set_layout(&mut self, layout: VertexLayout) {
        self.layout = layout;
        self.destroy();
        self.state.invalidated();
    }

    /// Writes vertex data at `offset`, bounds-checked against the size.
    pub fn write(&self, ctx: &WgpuContext, name: &str, data: &[u8], offset: u64) -> Result<()> {
        if offset + data.len() as u64 > self.size {
            return Err(CinderError::InvalidDescriptor {
                name: name.to_string(),
                reason: format!(
                    "write of {} bytes at offset {offset} exceeds buffer size {}",
                    data.len(),
                    self.size
                ),
            });
        }
        let buffer = self.handle.as_ref().ok_or_else(|| CinderError::NotBuilt {
            name: name.to_string(),
        })?;
        ctx.queue.write_buffer(buffer, offset, data);
        Ok(())
    }
}

impl GpuResource for VertexBufferResource {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.size == 0 {
            return Err("vertex buffer size must be greater than zero".to_string());
        }
        Ok(())
    }

    fn build(&mut self, ctx: &WgpuContext, label: &str) {
        self.handle = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: self.size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_pack_tightly() {
        let mut layout = VertexLayout::new();
        layout.add("position", wgpu::VertexFormat::Float32x3, 0).unwrap();
        layout.add("uv", wgpu::VertexFormat::Float32x2, 1).unwrap();

        assert_eq!(layout.attribute("position").unwrap().offset, 0);
        assert_eq!(layout.attribute("uv").unwrap().offset, 12);
        assert_eq!(layout.stride(), 20);
    }

    #[test]
    fn removal_recompacts_offsets() {
        let mut layout = VertexLayout::new();
        layout.add("position", wgpu::VertexFormat::Float32x3, 0).unwrap();
        layout.add("normal", wgpu::VertexFormat::Float32x3, 1).unwrap();
        layout.add("uv", wgpu::VertexFormat::Float32x2, 2).unwrap();

        layout.remove("normal");
        assert_eq!(layout.attribute("uv").unwrap().offset, 12);
        assert_eq!(layout.stride(), 20);
    }

    #[test]
    fn static_mesh_preset_stride() {
        // 3 × Float32x3 + 4 × Float32x2
        assert_eq!(VertexLayout::static_mesh().stride(), 68);
    }
}
