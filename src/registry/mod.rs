//! Resource Registry
//!
//! The [`ResourceRegistry`] is the sole owner of all named GPU-side objects:
//! resources (buffers, textures, samplers, shaders), bind groups, pipelines
//! and canvases. Names are unique within their category and are the only
//! coupling surface to the UI layer and to pass-authoring code.
//!
//! Internally each category is a slotmap arena with a string name → key
//! index layered on top, so hot paths work on generation-checked keys while
//! the boundary stays string-addressed. The registry is the only mutator of
//! the name→resource maps; other components look resources up by name and
//! never cache raw wgpu handles across an invalidation boundary.

mod canvas;

pub use canvas::{Canvas, CanvasCallback, CanvasDesc};

use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use crate::binding::{BindGroup, BindingKind};
use crate::context::WgpuContext;
use crate::errors::{CinderError, Result};
use crate::resources::{
    BufferResource, IndexBufferResource, IndexData, PipelineResource,
    RenderPipelineDesc, Resource, ResourcePayload, SamplerDesc, SamplerResource, ShaderLibrary,
    ShaderResource, ShaderSource, TextureDesc, TextureResource, UniformBufferResource,
    UniformLayout, UniformType, UniformValue, VertexBufferResource, VertexLayout,
};

new_key_type! {
    /// Key into the resource arena.
    pub struct ResourceKey;
    /// Key into the bind group arena.
    pub struct BindGroupKey;
    /// Key into the pipeline arena.
    pub struct PipelineKey;
}

// ============================================================================
// Categories and stats
// ============================================================================

/// The name categories the registry manages. Names are unique per category,
/// never globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceCategory {
    Resource,
    BindGroup,
    Pipeline,
    Canvas,
    Material,
    /// A slot inside one bind group
    BindingSlot,
    /// A path in the shader library
    ShaderSource,
}

impl std::fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resource => write!(f, "resource"),
            Self::BindGroup => write!(f, "bind group"),
            Self::Pipeline => write!(f, "pipeline"),
            Self::Canvas => write!(f, "canvas"),
            Self::Material => write!(f, "material"),
            Self::BindingSlot => write!(f, "binding slot"),
            Self::ShaderSource => write!(f, "shader source"),
        }
    }
}

/// Lifetime counters for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryStats {
    pub live: usize,
    pub created: u64,
    pub destroyed: u64,
}

/// Snapshot of registry bookkeeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryStats {
    pub resources: CategoryStats,
    pub bind_groups: CategoryStats,
    pub pipelines: CategoryStats,
    pub canvases: usize,
}

// ============================================================================
// Named arenas
// ============================================================================

/// A slotmap arena with a string name index — the internal storage for one
/// registry category.
pub struct NamedArena<K: slotmap::Key, V> {
    category: ResourceCategory,
    items: SlotMap<K, V>,
    index: FxHashMap<String, K>,
    created: u64,
    destroyed: u64,
}

impl<K: slotmap::Key, V> NamedArena<K, V> {
    fn new(category: ResourceCategory) -> Self {
        Self {
            category,
            items: SlotMap::with_key(),
            index: FxHashMap::default(),
            created: 0,
            destroyed: 0,
        }
    }

    fn insert(&mut self, name: &str, value: V) -> Result<K> {
        if self.index.contains_key(name) {
            return Err(CinderError::DuplicateName {
                category: self.category,
                name: name.to_string(),
            });
        }
        let key = self.items.insert(value);
        self.index.insert(name.to_string(), key);
        self.created += 1;
        Ok(key)
    }

    /// Looks an item up by name.
    pub fn get(&self, name: &str) -> Result<&V> {
        self.try_get(name).ok_or_else(|| CinderError::NotFound {
            category: self.category,
            name: name.to_string(),
        })
    }

    /// Mutable lookup by name.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut V> {
        let category = self.category;
        match self.index.get(name).copied() {
            Some(key) => self.items.get_mut(key).ok_or_else(|| CinderError::NotFound {
                category,
                name: name.to_string(),
            }),
            None => Err(CinderError::NotFound {
                category,
                name: name.to_string(),
            }),
        }
    }

    /// Lookup without the error plumbing.
    #[must_use]
    pub fn try_get(&self, name: &str) -> Option<&V> {
        self.index.get(name).and_then(|key| self.items.get(*key))
    }

    /// Mutable lookup without the error plumbing.
    pub fn try_get_mut(&mut self, name: &str) -> Option<&mut V> {
        match self.index.get(name).copied() {
            Some(key) => self.items.get_mut(key),
            None => None,
        }
    }

    fn remove(&mut self, name: &str) -> Option<V> {
        let removed = self.index.remove(name).and_then(|key| self.items.remove(key));
        if removed.is_some() {
            self.destroyed += 1;
        }
        removed
    }

    /// Whether a name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of live items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Registered names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    fn clear_with(&mut self, mut destroy: impl FnMut(&mut V)) {
        for value in self.items.values_mut() {
            destroy(value);
        }
        self.destroyed += self.items.len() as u64;
        self.items.clear();
        self.index.clear();
    }

    fn stats(&self) -> CategoryStats {
        CategoryStats {
            live: self.items.len(),
            created: self.created,
            destroyed: self.destroyed,
        }
    }
}

/// The arena holding leaf resources; bind groups validate against it.
pub type ResourceArena = NamedArena<ResourceKey, Resource>;

// ============================================================================
// Registry
// ============================================================================

/// The single authority over named GPU-side objects.
pub struct ResourceRegistry {
    resources: ResourceArena,
    bind_groups: NamedArena<BindGroupKey, BindGroup>,
    pipelines: NamedArena<PipelineKey, PipelineResource>,
    canvases: FxHashMap<String, Canvas>,
    /// canvas name → dependent resource names (deduplicated)
    resize_dependents: FxHashMap<String, Vec<String>>,
    shader_library: ShaderLibrary,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            resources: ResourceArena::new(ResourceCategory::Resource),
            bind_groups: NamedArena::new(ResourceCategory::BindGroup),
            pipelines: NamedArena::new(ResourceCategory::Pipeline),
            canvases: FxHashMap::default(),
            resize_dependents: FxHashMap::default(),
            shader_library: ShaderLibrary::new(),
        }
    }

    // ── Resource creation ────────────────────────────────────────────────────

    fn create(&mut self, name: &str, payload: ResourcePayload) -> Result<()> {
        log::trace!("create {} \"{name}\"", payload.kind_name());
        self.resources.insert(name, Resource::new(name, payload))?;
        Ok(())
    }

    /// Registers a raw byte buffer.
    pub fn create_buffer(
        &mut self,
        name: &str,
        size: u64,
        usage: wgpu::BufferUsages,
        mappable: bool,
    ) -> Result<()> {
        self.create(name, ResourcePayload::Buffer(BufferResource::new(size, usage, mappable)))
    }

    /// Registers a storage buffer.
    pub fn create_storage_buffer(&mut self, name: &str, size: u64) -> Result<()> {
        self.create(name, ResourcePayload::Buffer(BufferResource::storage(size)))
    }

    /// Registers a vertex buffer with its attribute layout.
    pub fn create_vertex_buffer(&mut self, name: &str, size: u64, layout: VertexLayout) -> Result<()> {
        self.create(
            name,
            ResourcePayload::VertexBuffer(VertexBufferResource::new(size, layout)),
        )
    }

    /// Registers an index buffer; the format is fixed for its lifetime.
    pub fn create_index_buffer(&mut self, name: &str, size: u64, format: wgpu::IndexFormat) -> Result<()> {
        self.create(
            name,
            ResourcePayload::IndexBuffer(IndexBufferResource::new(size, format)),
        )
    }

    /// Registers a uniform buffer around a field layout. The layout stays
    /// appendable until the buffer is first built.
    pub fn create_uniform_buffer(&mut self, name: &str, layout: UniformLayout) -> Result<()> {
        self.create(
            name,
            ResourcePayload::UniformBuffer(UniformBufferResource::new(layout)),
        )
    }

    /// Registers a texture.
    pub fn create_texture(&mut self, name: &str, desc: TextureDesc) -> Result<()> {
        self.create(name, ResourcePayload::Texture(TextureResource::new(desc)))
    }

    /// Registers a sampler.
    pub fn create_sampler(&mut self, name: &str, desc: SamplerDesc) -> Result<()> {
        self.create(name, ResourcePayload::Sampler(SamplerResource::new(desc)))
    }

    /// Registers a shader, resolving its source (and `#include`s) through
    /// the shader library immediately.
    pub fn create_shader(&mut self, name: &str, source: ShaderSource) -> Result<()> {
        let code = self.shader_library.resolve(&source)?;
        self.create(name, ResourcePayload::Shader(ShaderResource::new(source, code)))
    }

    // ── Resource access ──────────────────────────────────────────────────────

    /// Looks a resource up by name.
    pub fn get_resource(&self, name: &str) -> Result<&Resource> {
        self.resources.get(name)
    }

    /// Mutable resource lookup.
    pub fn get_resource_mut(&mut self, name: &str) -> Result<&mut Resource> {
        self.resources.get_mut(name)
    }

    /// Whether a resource name is registered.
    #[must_use]
    pub fn has_resource(&self, name: &str) -> bool {
        self.resources.contains(name)
    }

    /// The resource arena, for components that validate against it.
    #[must_use]
    pub fn resources(&self) -> &ResourceArena {
        &self.resources
    }

    /// Validates and materializes a resource's native handle.
    pub fn build_resource(&mut self, ctx: &WgpuContext, name: &str) -> Result<()> {
        self.resources.get_mut(name)?.ensure_built(ctx)
    }

    /// Destroys a resource and removes its entry. Removing a name that is
    /// not registered is a no-op, not an error.
    pub fn remove_resource(&mut self, name: &str) {
        if let Some(mut resource) = self.resources.remove(name) {
            resource.destroy();
            log::trace!("removed resource \"{name}\"");
        }
    }

    // ── Resource data paths ──────────────────────────────────────────────────

    /// Writes raw bytes into a buffer-shaped resource, building it first.
    pub fn write_buffer(&mut self, ctx: &WgpuContext, name: &str, data: &[u8], offset: u64) -> Result<()> {
        let resource = self.resources.get_mut(name)?;
        resource.ensure_built(ctx)?;
        match resource.payload() {
            ResourcePayload::Buffer(b) => b.write(ctx, name, data, offset),
            ResourcePayload::VertexBuffer(b) => b.write(ctx, name, data, offset),
            _ => Err(CinderError::InvalidDescriptor {
                name: name.to_string(),
                reason: format!(
                    "{} does not accept raw writes",
                    resource.payload().kind_name()
                ),
            }),
        }
    }

    /// Reads bytes back from a raw buffer (blocking on the map).
    pub fn read_buffer(&mut self, ctx: &WgpuContext, name: &str, offset: u64, size: u64) -> Result<Vec<u8>> {
        let resource = self.resources.get_mut(name)?;
        resource.ensure_built(ctx)?;
        match resource.payload() {
            ResourcePayload::Buffer(b) => b.read(ctx, name, offset, size),
            _ => Err(CinderError::InvalidDescriptor {
                name: name.to_string(),
                reason: "readback is only supported for raw buffers".to_string(),
            }),
        }
    }

    /// Stages typed index data, enforcing the declared format. The bytes
    /// reach the GPU when the buffer builds (or via
    /// [`ResourceRegistry::upload_index_data`]).
    pub fn set_index_data(&mut self, name: &str, data: IndexData<'_>) -> Result<()> {
        let resource = self.resources.get_mut(name)?;
        match resource.payload_mut() {
            ResourcePayload::IndexBuffer(b) => b.set_indices(name, data),
            other => Err(CinderError::InvalidDescriptor {
                name: name.to_string(),
                reason: format!("{} is not an index buffer", other.kind_name()),
            }),
        }
    }

    /// Builds an index buffer if needed and flushes its staged bytes.
    pub fn upload_index_data(&mut self, ctx: &WgpuContext, name: &str) -> Result<()> {
        let resource = self.resources.get_mut(name)?;
        resource.ensure_built(ctx)?;
        match resource.payload() {
            ResourcePayload::IndexBuffer(b) => b.upload(ctx, name),
            other => Err(CinderError::InvalidDescriptor {
                name: name.to_string(),
                reason: format!("{} is not an index buffer", other.kind_name()),
            }),
        }
    }

    /// Appends a field to an unbuilt uniform buffer's layout.
    pub fn add_uniform_field(&mut self, name: &str, field: &str, ty: UniformType) -> Result<()> {
        let resource = self.resources.get_mut(name)?;
        match resource.payload_mut() {
            ResourcePayload::UniformBuffer(u) => u.add_field(field, ty),
            other => Err(CinderError::InvalidDescriptor {
                name: name.to_string(),
                reason: format!("{} is not a uniform buffer", other.kind_name()),
            }),
        }
    }

    /// Writes a uniform field value into the CPU block.
    pub fn set_uniform(&mut self, name: &str, field: &str, value: UniformValue) -> Result<()> {
        let resource = self.resources.get_mut(name)?;
        match resource.payload_mut() {
            ResourcePayload::UniformBuffer(u) => u.set_value(name, field, value),
            other => Err(CinderError::InvalidDescriptor {
                name: name.to_string(),
                reason: format!("{} is not a uniform buffer", other.kind_name()),
            }),
        }
    }

    /// Flushes a uniform buffer's CPU block to the GPU.
    pub fn upload_uniform(&mut self, ctx: &WgpuContext, name: &str) -> Result<()> {
        let resource = self.resources.get_mut(name)?;
        resource.ensure_built(ctx)?;
        match resource.payload() {
            ResourcePayload::UniformBuffer(u) => u.upload(ctx, name),
            other => Err(CinderError::InvalidDescriptor {
                name: name.to_string(),
                reason: format!("{} is not a uniform buffer", other.kind_name()),
            }),
        }
    }

    // ── Bind groups ──────────────────────────────────────────────────────────

    /// Registers an empty bind group.
    pub fn create_bind_group(&mut self, name: &str, visibility: wgpu::ShaderStages) -> Result<()> {
        self.bind_groups.insert(name, BindGroup::new(name, visibility))?;
        Ok(())
    }

    /// Looks a bind group up by name.
    pub fn get_bind_group(&self, name: &str) -> Result<&BindGroup> {
        self.bind_groups.get(name)
    }

    /// Whether a bind group name is registered.
    #[must_use]
    pub fn has_bind_group(&self, name: &str) -> bool {
        self.bind_groups.contains(name)
    }

    /// Adds a kind-checked binding to a group.
    pub fn add_binding(&mut self, group: &str, slot: u32, kind: BindingKind, resource: &str) -> Result<()> {
        let bind_group = self.bind_groups.get_mut(group)?;
        bind_group.add_binding(slot, kind, resource, &self.resources)
    }

    /// Removes the binding at `slot` from a group.
    pub fn remove_binding(&mut self, group: &str, slot: u32) -> Result<()> {
        self.bind_groups.get_mut(group)?.remove_binding(slot);
        Ok(())
    }

    /// Re-points an occupied slot at another resource of the same kind.
    pub fn update_binding_resource(&mut self, group: &str, slot: u32, resource: &str) -> Result<()> {
        let bind_group = self.bind_groups.get_mut(group)?;
        bind_group.update_resource(slot, resource, &self.resources)
    }

    /// Builds a bind group (and every resource it references).
    pub fn build_bind_group(&mut self, ctx: &WgpuContext, name: &str) -> Result<()> {
        let bind_group = self.bind_groups.get_mut(name)?;
        bind_group.ensure_built(ctx, &mut self.resources)
    }

    /// The built native handle of a bind group.
    pub fn bind_group_handle(&self, name: &str) -> Result<&wgpu::BindGroup> {
        self.bind_groups
            .get(name)?
            .handle()
            .ok_or_else(|| CinderError::NotBuilt {
                name: name.to_string(),
            })
    }

    /// Destroys a bind group and removes its entry; idempotent.
    pub fn remove_bind_group(&mut self, name: &str) {
        if let Some(mut bind_group) = self.bind_groups.remove(name) {
            bind_group.destroy();
            log::trace!("removed bind group \"{name}\"");
        }
    }

    // ── Pipelines ────────────────────────────────────────────────────────────

    /// Registers a render pipeline description.
    pub fn create_pipeline(&mut self, name: &str, desc: RenderPipelineDesc) -> Result<()> {
        self.pipelines.insert(name, PipelineResource::new(desc))?;
        Ok(())
    }

    /// Looks a pipeline up by name.
    pub fn get_pipeline(&self, name: &str) -> Result<&PipelineResource> {
        self.pipelines.get(name)
    }

    /// Whether a pipeline name is registered.
    #[must_use]
    pub fn has_pipeline(&self, name: &str) -> bool {
        self.pipelines.contains(name)
    }

    /// Builds a pipeline: shader module first, then every bind-group layout,
    /// then the pipeline itself. A pipeline whose recorded dependency
    /// versions still match is left untouched.
    pub fn build_pipeline(&mut self, ctx: &WgpuContext, name: &str) -> Result<()> {
        let desc = self.pipelines.get(name)?.desc().clone();

        {
            let shader = self.resources.get(&desc.shader)?;
            if !matches!(shader.payload(), ResourcePayload::Shader(_)) {
                return Err(CinderError::InvalidDescriptor {
                    name: name.to_string(),
                    reason: format!("\"{}\" is not a shader resource", desc.shader),
                });
            }
        }

        // Dependencies first: the pipeline handle must never exist before
        // its shader module and bind-group layouts do.
        self.resources.get_mut(&desc.shader)?.ensure_built(ctx)?;
        for group in &desc.bind_groups {
            self.bind_groups
                .get_mut(group)?
                .ensure_built(ctx, &mut self.resources)?;
        }

        let mut dep_versions = Vec::with_capacity(1 + desc.bind_groups.len());
        dep_versions.push((desc.shader.clone(), self.resources.get(&desc.shader)?.version()));
        for group in &desc.bind_groups {
            dep_versions.push((group.clone(), self.bind_groups.get(group)?.layout_version()));
        }

        {
            let pipeline = self.pipelines.get(name)?;
            if pipeline.is_built() && pipeline.built_deps() == dep_versions.as_slice() {
                return Ok(());
            }
        }

        let module = self
            .resources
            .get(&desc.shader)?
            .shader_module()
            .ok_or_else(|| CinderError::NotBuilt {
                name: desc.shader.clone(),
            })?;
        let mut layouts = Vec::with_capacity(desc.bind_groups.len());
        for group in &desc.bind_groups {
            layouts.push(self.bind_groups.get(group)?.layout().ok_or_else(|| {
                CinderError::NotBuilt {
                    name: group.clone(),
                }
            })?);
        }

        let pipeline = self.pipelines.get_mut(name)?;
        pipeline.build_with(ctx, name, module, &layouts, dep_versions);
        log::debug!("built pipeline \"{name}\"");
        Ok(())
    }

    /// The built native handle of a pipeline. Accessing it before
    /// [`ResourceRegistry::build_pipeline`] has run is a contract violation.
    pub fn pipeline_handle(&self, name: &str) -> Result<&wgpu::RenderPipeline> {
        self.pipelines
            .get(name)?
            .handle()
            .ok_or_else(|| CinderError::NotBuilt {
                name: name.to_string(),
            })
    }

    /// Destroys a pipeline and removes its entry; idempotent.
    pub fn remove_pipeline(&mut self, name: &str) {
        if let Some(mut pipeline) = self.pipelines.remove(name) {
            pipeline.destroy();
            log::trace!("removed pipeline \"{name}\"");
        }
    }

    // ── Canvases and resize fan-out ──────────────────────────────────────────

    /// Registers a presentation surface under `name`, firing its `on_ready`
    /// callback with the initial dimensions.
    pub fn add_canvas(&mut self, name: &str, desc: CanvasDesc) -> Result<()> {
        if self.canvases.contains_key(name) {
            return Err(CinderError::DuplicateName {
                category: ResourceCategory::Canvas,
                name: name.to_string(),
            });
        }
        let CanvasDesc {
            width,
            height,
            format,
            mut on_ready,
            on_resize,
        } = desc;
        if let Some(ready) = on_ready.as_mut() {
            ready(width, height);
        }
        self.canvases
            .insert(name.to_string(), Canvas::new(width, height, format, on_resize));
        self.resize_dependents.insert(name.to_string(), Vec::new());
        Ok(())
    }

    /// Removes a canvas and its dependency edges; idempotent.
    pub fn remove_canvas(&mut self, name: &str) {
        self.canvases.remove(name);
        self.resize_dependents.remove(name);
    }

    /// Whether a canvas name is registered.
    #[must_use]
    pub fn has_canvas(&self, name: &str) -> bool {
        self.canvases.contains_key(name)
    }

    /// Current device-pixel dimensions of a canvas.
    pub fn canvas_size(&self, name: &str) -> Result<(u32, u32)> {
        self.canvases
            .get(name)
            .map(Canvas::size)
            .ok_or_else(|| CinderError::NotFound {
                category: ResourceCategory::Canvas,
                name: name.to_string(),
            })
    }

    /// Registers that `resource` must be notified when `canvas` changes
    /// size. Duplicate registrations collapse, so each dependent is
    /// notified exactly once per resize.
    pub fn add_resize_dependent(&mut self, canvas: &str, resource: &str) -> Result<()> {
        let dependents = self
            .resize_dependents
            .get_mut(canvas)
            .ok_or_else(|| CinderError::NotFound {
                category: ResourceCategory::Canvas,
                name: canvas.to_string(),
            })?;
        if !dependents.iter().any(|d| d == resource) {
            dependents.push(resource.to_string());
        }
        Ok(())
    }

    /// Unregisters a resize dependency; idempotent.
    pub fn remove_resize_dependent(&mut self, canvas: &str, resource: &str) {
        if let Some(dependents) = self.resize_dependents.get_mut(canvas) {
            dependents.retain(|d| d != resource);
        }
    }

    /// Delivers new surface dimensions: updates the canvas, fires its
    /// resize callback, then notifies every registered dependent once.
    pub fn resize_canvas(&mut self, name: &str, width: u32, height: u32) -> Result<()> {
        let canvas = self
            .canvases
            .get_mut(name)
            .ok_or_else(|| CinderError::NotFound {
                category: ResourceCategory::Canvas,
                name: name.to_string(),
            })?;
        canvas.resized(width, height);

        if let Some(dependents) = self.resize_dependents.get(name) {
            for dependent in dependents {
                match self.resources.try_get_mut(dependent) {
                    Some(resource) => resource.resize(width, height),
                    None => log::warn!(
                        "resize dependent \"{dependent}\" of canvas \"{name}\" is not registered"
                    ),
                }
            }
        }
        Ok(())
    }

    // ── Whole-registry operations ────────────────────────────────────────────

    /// Whether `name` resolves in `category`. Pass validation goes through
    /// this without caring about the concrete kind.
    #[must_use]
    pub fn contains(&self, category: ResourceCategory, name: &str) -> bool {
        match category {
            ResourceCategory::Resource => self.resources.contains(name),
            ResourceCategory::BindGroup => self.bind_groups.contains(name),
            ResourceCategory::Pipeline => self.pipelines.contains(name),
            ResourceCategory::Canvas => self.canvases.contains_key(name),
            _ => false,
        }
    }

    /// Destroys everything, in dependency order: pipelines may reference
    /// bind groups, which reference resources, so pipelines go first, then
    /// bind groups, then resources, then canvas bindings.
    pub fn remove_all(&mut self) {
        self.pipelines.clear_with(PipelineResource::destroy);
        self.bind_groups.clear_with(BindGroup::destroy);
        self.resources.clear_with(Resource::destroy);
        self.canvases.clear();
        self.resize_dependents.clear();
        log::debug!("registry cleared");
    }

    /// Snapshot of the lifetime counters.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            resources: self.resources.stats(),
            bind_groups: self.bind_groups.stats(),
            pipelines: self.pipelines.stats(),
            canvases: self.canvases.len(),
        }
    }

    // ── Shader library ───────────────────────────────────────────────────────

    /// The in-memory WGSL source store.
    #[must_use]
    pub fn shader_library(&self) -> &ShaderLibrary {
        &self.shader_library
    }

    /// Mutable access to the WGSL source store.
    pub fn shader_library_mut(&mut self) -> &mut ShaderLibrary {
        &mut self.shader_library
    }

    // ── Placeholders ─────────────────────────────────────────────────────────

    /// Seeds the conventional fallback resources bind groups can point at
    /// before real content exists.
    pub fn register_placeholders(&mut self) -> Result<()> {
        self.create_texture(
            "placeholder_texture",
            TextureDesc::d2(
                1,
                1,
                wgpu::TextureFormat::Rgba8Unorm,
                wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            ),
        )?;
        self.create_buffer(
            "placeholder_uniform",
            16,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            false,
        )?;
        self.create_storage_buffer("placeholder_storage", 16)?;
        self.create_sampler("placeholder_sampler", SamplerDesc::nearest())?;
        Ok(())
    }
}
