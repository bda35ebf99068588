//! Raw GPU buffers
//!
//! [`BufferResource`] is the plain byte buffer kind: explicit size, explicit
//! usage flags, optionally CPU-mappable. Storage buffers, staging buffers
//! and other untyped allocations all go through it; the vertex / index /
//! uniform kinds layer their layout logic on top of the same build contract.

use crate::context::WgpuContext;
use crate::errors::{CinderError, Result};
use crate::resources::{BindingShape, GpuResource, ResourceState};

/// A raw byte buffer with explicit usage.
pub struct BufferResource {
    size: u64,
    usage: wgpu::BufferUsages,
    mappable: bool,
    state: ResourceState,
    handle: Option<wgpu::Buffer>,
}

impl BufferResource {
    /// Creates a buffer descriptor in the dirty state.
    ///
    /// `mappable` buffers get `MAP_READ | MAP_WRITE` added to their usage so
    /// the map-based transfer paths work without further flags.
    #[must_use]
    pub fn new(size: u64, usage: wgpu::BufferUsages, mappable: bool) -> Self {
        let usage = if mappable {
            usage | wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::MAP_WRITE
        } else {
            usage
        };
        Self {
            size,
            usage,
            mappable,
            state: ResourceState::default(),
            handle: None,
        }
    }

    /// Storage buffer preset: `STORAGE | COPY_DST`.
    #[must_use]
    pub fn storage(size: u64) -> Self {
        Self::new(
            size,
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            false,
        )
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Usage flags.
    #[must_use]
    pub fn usage(&self) -> wgpu::BufferUsages {
        self.usage
    }

    /// Whether the buffer supports CPU mapping.
    #[must_use]
    pub fn mappable(&self) -> bool {
        self.mappable
    }

    /// The native handle, if built.
    #[must_use]
    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.handle.as_ref()
    }

    /// Changes the buffer size. Drops the native handle: the old allocation
    /// cannot be grown in place.
    pub fn set_size(&mut self, size: u64) {
        if size == self.size {
            return;
        }
        self.size = size;
        self.destroy();
        self.state.invalidated();
    }

    /// Writes `data` at `offset` through the queue.
    ///
    /// The payload must fit inside the declared size and the buffer must be
    /// built (`name` is only used for error reporting).
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

    /// Reads `size` bytes starting at `offset` back to the CPU.
    ///
    /// Mappable buffers are mapped directly; otherwise the range is copied
    /// through a transient staging buffer. Blocks until the map completes —
    /// the async point the caller must not cross with the range still
    /// outstanding.
    pub fn read(&self, ctx: &WgpuContext, name: &str, offset: u64, size: u64) -> Result<Vec<u8>> {
        let buffer = self.handle.as_ref().ok_or_else(|| CinderError::NotBuilt {
            name: name.to_string(),
        })?;
        if offset + size > self.size {
            return Err(CinderError::InvalidDescriptor {
                name: name.to_string(),
                reason: format!(
                    "read of {size} bytes at offset {offset} exceeds buffer size {}",
                    self.size
                ),
            });
        }

        if self.mappable {
            return map_and_copy(ctx, buffer, offset, size);
        }

        let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Staging"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_buffer_to_buffer(buffer, offset, &staging, 0, size);
        ctx.queue.submit(std::iter::once(encoder.finish()));

        let data = map_and_copy(ctx, &staging, 0, size)?;
        staging.destroy();
        Ok(data)
    }
}

/// Maps `buffer[offset..offset+size]` for reading and copies it out.
fn map_and_copy(ctx: &WgpuContext, buffer: &wgpu::Buffer, offset: u64, size: u64) -> Result<Vec<u8>> {
    let slice = buffer.slice(offset..offset + size);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    ctx.device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| CinderError::BufferMapFailed(e.to_string()))?;
    rx.recv()
        .map_err(|_| CinderError::BufferMapFailed("map callback dropped".to_string()))?
        .map_err(|e| CinderError::BufferMapFailed(e.to_string()))?;

    let data = slice.get_mapped_range().to_vec();
    buffer.unmap();
    Ok(data)
}

impl GpuResource for BufferResource {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.size == 0 {
            return Err("buffer size must be greater than zero".to_string());
        }
        if self.usage.is_empty() {
            return Err("buffer usage flags must not be empty".to_string());
        }
        Ok(())
    }

    fn build(&mut self, ctx: &WgpuContext, label: &str) {
        self.handle = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: self.size,
            usage: self.usage,
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
