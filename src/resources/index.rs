//! Index buffers
//!
//! The index format (16- or 32-bit) is fixed at creation. Supplying index
//! data with a different element width fails with a format mismatch rather
//! than silently reinterpreting bytes.
//!
//! Index data stages CPU-side: [`IndexBufferResource::set_indices`] never
//! touches the GPU, so format violations surface before any device work.
//! The staged bytes flush when the buffer is built (or explicitly through
//! [`IndexBufferResource::upload`]).

use crate::context::WgpuContext;
use crate::errors::{CinderError, Result};
use crate::resources::{BindingShape, GpuResource, ResourceState};

/// Typed index data for upload.
#[derive(Debug, Clone, Copy)]
pub enum IndexData<'a> {
    Uint16(&'a [u16]),
    Uint32(&'a [u32]),
}

impl IndexData<'_> {
    /// The wgpu format of this data's element width.
    #[must_use]
    pub fn format(&self) -> wgpu::IndexFormat {
        match self {
            Self::Uint16(_) => wgpu::IndexFormat::Uint16,
            Self::Uint32(_) => wgpu::IndexFormat::Uint32,
        }
    }

    /// Number of indices.
    #[must_use]
    pub fn len(&self) -> u32 {
        match self {
            Self::Uint16(data) => data.len() as u32,
            Self::Uint32(data) => data.len() as u32,
        }
    }

    /// Whether the slice is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bytes(&self) -> &[u8] {
        match self {
            Self::Uint16(data) => bytemuck::cast_slice(data),
            Self::Uint32(data) => bytemuck::cast_slice(data),
        }
    }
}

/// An index buffer resource.
pub struct IndexBufferResource {
    format: wgpu::IndexFormat,
    size: u64,
    index_count: u32,
    /// CPU-staged index bytes, flushed at build/upload time
    data: Vec<u8>,
    state: ResourceState,
    handle: Option<wgpu::Buffer>,
}

impl IndexBufferResource {
    #[must_use]
    pub fn new(size: u64, format: wgpu::IndexFormat) -> Self {
        Self {
            format,
            size,
            index_count: 0,
            data: Vec::new(),
            state: ResourceState::default(),
            handle: None,
        }
    }

    /// The format fixed at creation.
    #[must_use]
    pub fn format(&self) -> wgpu::IndexFormat {
        self.format
    }

    /// Buffer size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of indices last staged.
    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// The native handle, if built.
    #[must_use]
    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.handle.as_ref()
    }

    /// Stages index data.
    ///
    /// Fails with [`CinderError::FormatMismatch`] when the element width
    /// disagrees with the declared format, and bounds-checks the payload.
    /// An already-built buffer receives the bytes on the next
    /// [`Self::upload`].
    pub fn set_indices(&mut self, name: &str, data: IndexData<'_>) -> Result<()> {
        if data.format() != self.format {
            return Err(CinderError::FormatMismatch {
                expected: self.format,
                supplied: data.format(),
            });
        }
        let bytes = data.bytes();
        if bytes.len() as u64 > self.size {
            return Err(CinderError::InvalidDescriptor {
                name: name.to_string(),
                reason: format!(
                    "index data of {} bytes exceeds buffer size {}",
                    bytes.len(),
                    self.size
                ),
            });
        }
        self.data.clear();
        self.data.extend_from_slice(bytes);
        self.index_count = data.len();
        Ok(())
    }

    /// Flushes the staged bytes to the GPU buffer.
    pub fn upload(&self, ctx: &WgpuContext, name: &str) -> Result<()> {
        let buffer = self.handle.as_ref().ok_or_else(|| CinderError::NotBuilt {
            name: name.to_string(),
        })?;
        if !self.data.is_empty() {
            ctx.queue.write_buffer(buffer, 0, &self.data);
        }
        Ok(())
    }
}

impl GpuResource for IndexBufferResource {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.size == 0 {
            return Err("index buffer size must be greater than zero".to_string());
        }
        Ok(())
    }

    fn build(&mut self, ctx: &WgpuContext, label: &str) {
        let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: self.size,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        if !self.data.is_empty() {
            ctx.queue.write_buffer(&buffer, 0, &self.data);
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_width_is_rejected() {
        let mut buffer = IndexBufferResource::new(64, wgpu::IndexFormat::Uint16);
        let wide: [u32; 3] = [0, 1, 2];
        let err = buffer.set_indices("quad_indices", IndexData::Uint32(&wide));
        assert!(matches!(err, Err(CinderError::FormatMismatch { .. })));
        assert_eq!(buffer.index_count(), 0);
    }

    #[test]
    fn matching_width_is_staged() {
        let mut buffer = IndexBufferResource::new(64, wgpu::IndexFormat::Uint16);
        let narrow: [u16; 6] = [0, 1, 2, 2, 1, 3];
        buffer.set_indices("quad_indices", IndexData::Uint16(&narrow)).unwrap();
        assert_eq!(buffer.index_count(), 6);
    }
}
