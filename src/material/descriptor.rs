//! Material descriptors
//!
//! A [`MaterialDescriptor`] is the plain-data wire format between authored
//! materials and the cache. Only the GPU-affecting parts — shader source,
//! pipeline state, binding layout and binding entries — participate in
//! material identity. Instance parameters ([`MaterialAttributes`]: base
//! color, metallic, roughness, …) never cause a cache miss because they do
//! not influence which GPU objects get created.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::binding::BindingKind;
use crate::resources::{ColorTargetDesc, DepthStencilDesc, PrimitiveDesc, ShaderSource, VertexLayout};

/// Fx-hash of any hashable key, used for cache bucketing.
#[must_use]
pub fn fx_hash_key<T: Hash>(key: &T) -> u64 {
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}

/// The pipeline-state part of a material.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaterialPipelineDesc {
    pub vertex_entry: String,
    pub fragment_entry: String,
    pub vertex_layouts: Vec<VertexLayout>,
    pub targets: Vec<ColorTargetDesc>,
    pub primitive: PrimitiveDesc,
    pub depth_stencil: Option<DepthStencilDesc>,
    pub sample_count: u32,
}

impl MaterialPipelineDesc {
    /// Conventional entry points, one opaque target, default primitive.
    #[must_use]
    pub fn surface(format: wgpu::TextureFormat) -> Self {
        Self {
            vertex_entry: "vs_main".to_string(),
            fragment_entry: "fs_main".to_string(),
            vertex_layouts: Vec::new(),
            targets: vec![ColorTargetDesc::opaque(format)],
            primitive: PrimitiveDesc::default(),
            depth_stencil: None,
            sample_count: 1,
        }
    }
}

/// One entry of the material's bind-group layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialBindingLayout {
    pub binding: u32,
    pub visibility: wgpu::ShaderStages,
    pub kind: BindingKind,
}

impl Hash for MaterialBindingLayout {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.binding.hash(state);
        self.visibility.bits().hash(state);
        self.kind.hash(state);
    }
}

/// One slot→resource entry of the material's bind group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaterialBindingEntry {
    pub binding: u32,
    pub resource: String,
}

/// Material instance parameters. Free to vary between equivalent materials.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialAttributes {
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: [f32; 3],
    /// Author-defined extras, uninterpreted by the cache
    pub extra: Vec<(String, f32)>,
}

impl Default for MaterialAttributes {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            metallic: 0.0,
            roughness: 1.0,
            emissive: [0.0, 0.0, 0.0],
            extra: Vec::new(),
        }
    }
}

/// A complete authored material.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDescriptor {
    pub shader_source: ShaderSource,
    pub pipeline: MaterialPipelineDesc,
    /// Bind-group layout entries, in binding order
    pub layout: Vec<MaterialBindingLayout>,
    /// Bind-group resource entries, matching `layout` by binding index
    pub bindings: Vec<MaterialBindingEntry>,
    /// Instance parameters — excluded from identity
    pub attributes: MaterialAttributes,
}

impl MaterialDescriptor {
    #[must_use]
    pub fn new(shader_source: ShaderSource, pipeline: MaterialPipelineDesc) -> Self {
        Self {
            shader_source,
            pipeline,
            layout: Vec::new(),
            bindings: Vec::new(),
            attributes: MaterialAttributes::default(),
        }
    }

    /// The GPU-affecting identity of this descriptor.
    #[must_use]
    pub fn gpu_identity(&self) -> MaterialIdentity<'_> {
        MaterialIdentity {
            shader_source: &self.shader_source,
            pipeline: &self.pipeline,
            layout: &self.layout,
            bindings: &self.bindings,
        }
    }

    /// The structural-equivalence predicate: true when the two descriptors
    /// would produce identical GPU objects, ignoring instance attributes.
    #[must_use]
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.gpu_identity() == other.gpu_identity()
    }

    /// Hash of the GPU-affecting identity, the cache bucket key.
    #[must_use]
    pub fn identity_hash(&self) -> u64 {
        fx_hash_key(&self.gpu_identity())
    }
}

/// Borrowed view over the identity-relevant fields of a descriptor.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct MaterialIdentity<'a> {
    shader_source: &'a ShaderSource,
    pipeline: &'a MaterialPipelineDesc,
    layout: &'a [MaterialBindingLayout],
    bindings: &'a [MaterialBindingEntry],
}
