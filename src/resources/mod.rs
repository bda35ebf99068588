//! GPU Resource Kinds
//!
//! Every named GPU-side object is a [`Resource`]: a thin wrapper pairing a
//! registry name with a [`ResourcePayload`] — a tagged variant over the
//! concrete kinds (buffers, textures, samplers, shaders). Kind structs
//! implement the [`GpuResource`] trait for the shared lazy-build contract:
//!
//! 1. created dirty (no native handle),
//! 2. validated and materialized on first [`Resource::ensure_built`],
//! 3. destroyed explicitly (idempotent).
//!
//! Mutations that change a resource's GPU identity drop the native handle
//! and advance the resource's version counter. Composites (bind groups,
//! pipelines) record the versions they last built from and rebuild when any
//! tracked version has advanced — invalidation is never fanned out by hand.

pub mod buffer;
pub mod index;
pub mod pipeline;
pub mod sampler;
pub mod shader;
pub mod texture;
pub mod uniform;
pub mod vertex;

pub use buffer::BufferResource;
pub use index::{IndexBufferResource, IndexData};
pub use pipeline::{
    BlendComponentDesc, BlendStateDesc, ColorTargetDesc, DepthStencilDesc, PipelineResource,
    PrimitiveDesc, RenderPipelineDesc,
};
pub use sampler::{SamplerDesc, SamplerResource};
pub use shader::{ShaderLibrary, ShaderResource, ShaderSource};
pub use texture::{TextureDesc, TextureResource};
pub use uniform::{UniformBufferResource, UniformLayout, UniformType, UniformValue};
pub use vertex::{VertexAttribute, VertexBufferResource, VertexLayout};

use crate::context::WgpuContext;
use crate::errors::{CinderError, Result};

// ============================================================================
// Shared resource state
// ============================================================================

/// Binding-compatibility classification of a resource.
///
/// Bind group validation only cares about this coarse shape: buffer-kind
/// bindings accept buffer-shaped resources, texture-kind bindings accept
/// texture-shaped resources, sampler bindings accept samplers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingShape {
    /// Any buffer resource (raw, vertex, index, uniform)
    Buffer,
    /// A texture resource
    Texture,
    /// A sampler resource
    Sampler,
}

impl std::fmt::Display for BindingShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buffer => write!(f, "buffer"),
            Self::Texture => write!(f, "texture"),
            Self::Sampler => write!(f, "sampler"),
        }
    }
}

/// Per-resource invalidation state: a monotonic version counter.
///
/// Each kind struct embeds one and calls [`ResourceState::invalidated`]
/// from every mutator that changes GPU identity, right where the handle is
/// dropped. Composites compare recorded versions against the current one to
/// detect staleness lazily.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceState {
    version: u64,
}

impl ResourceState {
    /// Current version number.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Marks the resource's GPU identity as changed.
    pub fn invalidated(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

// ============================================================================
// The uniform lazy-build contract
// ============================================================================

/// Shared contract implemented by every resource kind.
pub trait GpuResource {
    /// Checks the descriptor. Returns the rejection reason on failure; the
    /// [`Resource`] wrapper attaches the registry name.
    fn validate(&self) -> std::result::Result<(), String>;

    /// Materializes the native handle. Callers must validate first; this is
    /// only reached through [`Resource::ensure_built`].
    fn build(&mut self, ctx: &WgpuContext, label: &str);

    /// Releases the native handle. Safe to call repeatedly.
    fn destroy(&mut self);

    /// Whether a native handle currently exists.
    fn is_built(&self) -> bool;

    /// Coarse binding compatibility; `None` for kinds that cannot be bound
    /// into a bind group (shaders).
    fn binding_shape(&self) -> Option<BindingShape>;

    /// Current identity version.
    fn version(&self) -> u64;
}

// ============================================================================
// Tagged-variant payload
// ============================================================================

/// The concrete kind of a [`Resource`].
pub enum ResourcePayload {
    /// Raw byte buffer (storage, staging, anything with explicit usage)
    Buffer(BufferResource),
    /// Vertex buffer with a tightly packed attribute layout
    VertexBuffer(VertexBufferResource),
    /// Index buffer with a format fixed at creation
    IndexBuffer(IndexBufferResource),
    /// Uniform buffer with an aligned field layout
    UniformBuffer(UniformBufferResource),
    /// Texture (render target or sampled)
    Texture(TextureResource),
    /// Sampler
    Sampler(SamplerResource),
    /// WGSL shader module
    Shader(ShaderResource),
}

macro_rules! for_each_payload {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            ResourcePayload::Buffer($inner) => $body,
            ResourcePayload::VertexBuffer($inner) => $body,
            ResourcePayload::IndexBuffer($inner) => $body,
            ResourcePayload::UniformBuffer($inner) => $body,
            ResourcePayload::Texture($inner) => $body,
            ResourcePayload::Sampler($inner) => $body,
            ResourcePayload::Shader($inner) => $body,
        }
    };
}

impl GpuResource for ResourcePayload {
    fn validate(&self) -> std::result::Result<(), String> {
        for_each_payload!(self, r => r.validate())
    }

    fn build(&mut self, ctx: &WgpuContext, label: &str) {
        for_each_payload!(self, r => r.build(ctx, label));
    }

    fn destroy(&mut self) {
        for_each_payload!(self, r => r.destroy());
    }

    fn is_built(&self) -> bool {
        for_each_payload!(self, r => r.is_built())
    }

    fn binding_shape(&self) -> Option<BindingShape> {
        for_each_payload!(self, r => r.binding_shape())
    }

    fn version(&self) -> u64 {
        for_each_payload!(self, r => r.version())
    }
}

impl ResourcePayload {
    /// Human-readable kind tag, used in log lines and error reasons.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Buffer(_) => "buffer",
            Self::VertexBuffer(_) => "vertex buffer",
            Self::IndexBuffer(_) => "index buffer",
            Self::UniformBuffer(_) => "uniform buffer",
            Self::Texture(_) => "texture",
            Self::Sampler(_) => "sampler",
            Self::Shader(_) => "shader",
        }
    }
}

// ============================================================================
// Resource wrapper
// ============================================================================

/// A named, lazily materialized GPU object.
pub struct Resource {
    name: String,
    payload: ResourcePayload,
}

impl Resource {
    pub(crate) fn new(name: impl Into<String>, payload: ResourcePayload) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Registry name, unique within the resource category.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current identity version.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.payload.version()
    }

    /// Whether the native handle currently exists.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.payload.is_built()
    }

    /// Coarse binding compatibility of this resource.
    #[must_use]
    pub fn binding_shape(&self) -> Option<BindingShape> {
        self.payload.binding_shape()
    }

    /// The concrete kind payload.
    #[must_use]
    pub fn payload(&self) -> &ResourcePayload {
        &self.payload
    }

    /// Mutable access to the concrete kind payload.
    ///
    /// Kind mutators keep their own invalidation state consistent, so no
    /// guard object is needed here.
    pub fn payload_mut(&mut self) -> &mut ResourcePayload {
        &mut self.payload
    }

    /// Validates and materializes the native handle if it does not exist.
    ///
    /// This is the only path by which a native handle comes into existence;
    /// resources are never built eagerly.
    pub fn ensure_built(&mut self, ctx: &WgpuContext) -> Result<()> {
        if self.payload.is_built() {
            return Ok(());
        }
        self.payload
            .validate()
            .map_err(|reason| CinderError::InvalidDescriptor {
                name: self.name.clone(),
                reason,
            })?;
        self.payload.build(ctx, &self.name);
        log::debug!("built {} \"{}\"", self.payload.kind_name(), self.name);
        Ok(())
    }

    /// Releases the native handle. A second call is a no-op.
    pub fn destroy(&mut self) {
        self.payload.destroy();
    }

    /// Forwards a canvas resize to kinds that define one.
    ///
    /// Textures rebuild at the new dimensions; every other kind ignores the
    /// notification.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let ResourcePayload::Texture(texture) = &mut self.payload {
            texture.resize(width, height);
        }
    }

    // ── Typed accessors ──────────────────────────────────────────────────────

    /// The native buffer handle, for any buffer-shaped kind.
    #[must_use]
    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        match &self.payload {
            ResourcePayload::Buffer(b) => b.buffer(),
            ResourcePayload::VertexBuffer(b) => b.buffer(),
            ResourcePayload::IndexBuffer(b) => b.buffer(),
            ResourcePayload::UniformBuffer(b) => b.buffer(),
            _ => None,
        }
    }

    /// The default texture view, if this is a built texture.
    #[must_use]
    pub fn texture_view(&self) -> Option<&wgpu::TextureView> {
        match &self.payload {
            ResourcePayload::Texture(t) => t.view(),
            _ => None,
        }
    }

    /// The native sampler handle, if this is a built sampler.
    #[must_use]
    pub fn sampler(&self) -> Option<&wgpu::Sampler> {
        match &self.payload {
            ResourcePayload::Sampler(s) => s.handle(),
            _ => None,
        }
    }

    /// The compiled shader module, if this is a built shader.
    #[must_use]
    pub fn shader_module(&self) -> Option<&wgpu::ShaderModule> {
        match &self.payload {
            ResourcePayload::Shader(s) => s.module(),
            _ => None,
        }
    }
}
