//! Bind Groups
//!
//! A [`BindGroup`] is a fixed set of slot→resource bindings consumed by a
//! pipeline. Every mutation is kind-checked against the registry's resource
//! arena: buffer-kind bindings only accept buffer-shaped resources with the
//! matching usage, texture kinds only textures, sampler kinds only samplers.
//!
//! The derived `wgpu::BindGroupLayout` carries the group's shader-visibility
//! mask plus a kind-specific layout fragment per binding. Handles rebuild
//! lazily: the group records the version of every referenced resource at
//! build time and re-derives itself once any of them has advanced. A bind
//! group handle is never created before all of its resources are built.

use std::collections::BTreeMap;

use crate::context::WgpuContext;
use crate::errors::{CinderError, Result};
use crate::registry::{ResourceArena, ResourceCategory};
use crate::resources::{BindingShape, Resource, ResourcePayload};

/// The binding kinds a slot can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    UniformBuffer,
    StorageBuffer,
    SampledTexture,
    StorageTexture,
    Sampler,
}

impl BindingKind {
    /// The resource shape this kind accepts.
    #[must_use]
    pub fn required_shape(self) -> BindingShape {
        match self {
            Self::UniformBuffer | Self::StorageBuffer => BindingShape::Buffer,
            Self::SampledTexture | Self::StorageTexture => BindingShape::Texture,
            Self::Sampler => BindingShape::Sampler,
        }
    }
}

/// One slot→resource binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingEntry {
    pub kind: BindingKind,
    pub resource: String,
}

/// A named collection of slot→resource bindings.
pub struct BindGroup {
    name: String,
    visibility: wgpu::ShaderStages,
    entries: BTreeMap<u32, BindingEntry>,
    /// Advanced whenever the derived layout shape changes (add/remove/
    /// visibility); pipelines track this
    layout_version: u64,
    layout: Option<wgpu::BindGroupLayout>,
    handle: Option<wgpu::BindGroup>,
    /// `(slot, resource version)` at the last handle build
    built_versions: Vec<(u32, u64)>,
}

impl BindGroup {
    #[must_use]
    pub fn new(name: impl Into<String>, visibility: wgpu::ShaderStages) -> Self {
        Self {
            name: name.into(),
            visibility,
            entries: BTreeMap::new(),
            layout_version: 0,
            layout: None,
            handle: None,
            built_versions: Vec::new(),
        }
    }

    /// Group name, unique within the bind group category.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shader stages every binding in this group is visible to.
    #[must_use]
    pub fn visibility(&self) -> wgpu::ShaderStages {
        self.visibility
    }

    /// Version of the derived layout shape.
    #[must_use]
    pub fn layout_version(&self) -> u64 {
        self.layout_version
    }

    /// Bindings in slot order.
    pub fn entries(&self) -> impl Iterator<Item = (u32, &BindingEntry)> {
        self.entries.iter().map(|(slot, entry)| (*slot, entry))
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the group has no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The derived layout, if built.
    #[must_use]
    pub fn layout(&self) -> Option<&wgpu::BindGroupLayout> {
        self.layout.as_ref()
    }

    /// The native handle, if built.
    #[must_use]
    pub fn handle(&self) -> Option<&wgpu::BindGroup> {
        self.handle.as_ref()
    }

    /// Changes the visibility mask, invalidating the derived layout.
    pub fn set_visibility(&mut self, visibility: wgpu::ShaderStages) {
        if visibility != self.visibility {
            self.visibility = visibility;
            self.invalidate_layout();
        }
    }

    /// Adds a binding at `slot`.
    ///
    /// Fails with [`CinderError::InvalidSlot`] when the slot is occupied
    /// and [`CinderError::InvalidResource`] when the resource is missing or
    /// kind-incompatible. Invalidates the derived layout and handle.
    pub fn add_binding(
        &mut self,
        slot: u32,
        kind: BindingKind,
        resource: impl Into<String>,
        resources: &ResourceArena,
    ) -> Result<()> {
        if self.entries.contains_key(&slot) {
            return Err(CinderError::InvalidSlot {
                slot,
                reason: format!("slot already occupied in bind group \"{}\"", self.name),
            });
        }
        let resource = resource.into();
        check_binding(kind, &resource, resources)?;

        self.entries.insert(slot, BindingEntry { kind, resource });
        self.invalidate_layout();
        Ok(())
    }

    /// Removes the binding at `slot` if present; invalidates the layout.
    pub fn remove_binding(&mut self, slot: u32) {
        if self.entries.remove(&slot).is_some() {
            self.invalidate_layout();
        }
    }

    /// Points an occupied slot at another resource of the same kind.
    ///
    /// The layout is unaffected — the kind cannot change here (that takes a
    /// remove + add) — so only the native handle is invalidated.
    pub fn update_resource(
        &mut self,
        slot: u32,
        resource: impl Into<String>,
        resources: &ResourceArena,
    ) -> Result<()> {
        let resource = resource.into();
        let Some(entry) = self.entries.get_mut(&slot) else {
            return Err(CinderError::NotFound {
                category: ResourceCategory::BindingSlot,
                name: slot.to_string(),
            });
        };
        check_binding(entry.kind, &resource, resources)?;
        entry.resource = resource;
        self.handle = None;
        self.built_versions.clear();
        Ok(())
    }

    fn invalidate_layout(&mut self) {
        self.layout = None;
        self.handle = None;
        self.built_versions.clear();
        self.layout_version = self.layout_version.wrapping_add(1);
    }

    /// Whether the current handle still matches the referenced resources.
    #[must_use]
    pub fn is_current(&self, resources: &ResourceArena) -> bool {
        if self.handle.is_none() {
            return false;
        }
        self.built_versions.iter().all(|(slot, version)| {
            self.entries.get(slot).is_some_and(|entry| {
                resources
                    .try_get(&entry.resource)
                    .is_some_and(|r| r.version() == *version)
            })
        })
    }

    /// Builds (or rebuilds) the layout and native handle.
    ///
    /// Every referenced resource is built first — the ordering guarantee —
    /// then the layout is derived and the bind group created. A current
    /// handle short-circuits.
    pub fn ensure_built(&mut self, ctx: &WgpuContext, resources: &mut ResourceArena) -> Result<()> {
        if self.is_current(resources) {
            return Ok(());
        }

        // Dependencies first.
        let mut versions = Vec::with_capacity(self.entries.len());
        for (slot, entry) in &self.entries {
            let resource = resources.get_mut(&entry.resource)?;
            resource.ensure_built(ctx)?;
            versions.push((*slot, resource.version()));
        }

        let layout_entries = self.layout_entries(resources)?;
        let layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&self.name),
                entries: &layout_entries,
            });

        let mut group_entries = Vec::with_capacity(self.entries.len());
        for (slot, entry) in &self.entries {
            let resource = resources.get(&entry.resource)?;
            group_entries.push(wgpu::BindGroupEntry {
                binding: *slot,
                resource: binding_resource(entry.kind, resource)?,
            });
        }

        self.handle = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&self.name),
            layout: &layout,
            entries: &group_entries,
        }));
        self.layout = Some(layout);
        self.built_versions = versions;
        log::debug!("built bind group \"{}\"", self.name);
        Ok(())
    }

    /// Derives one layout entry per binding.
    pub fn layout_entries(&self, resources: &ResourceArena) -> Result<Vec<wgpu::BindGroupLayoutEntry>> {
        let mut entries = Vec::with_capacity(self.entries.len());
        for (slot, entry) in &self.entries {
            let resource = resources.get(&entry.resource)?;
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: *slot,
                visibility: self.visibility,
                ty: binding_type(entry.kind, resource)?,
                count: None,
            });
        }
        Ok(entries)
    }

    /// Drops the derived layout and handle.
    pub fn destroy(&mut self) {
        self.layout = None;
        self.handle = None;
        self.built_versions.clear();
    }
}

// ============================================================================
// Kind compatibility
// ============================================================================

/// Validates that `resource` can sit behind a binding of `kind`.
fn check_binding(kind: BindingKind, name: &str, resources: &ResourceArena) -> Result<()> {
    let Some(resource) = resources.try_get(name) else {
        return Err(CinderError::InvalidResource {
            name: name.to_string(),
            reason: "no such resource".to_string(),
        });
    };

    let Some(shape) = resource.binding_shape() else {
        return Err(CinderError::InvalidResource {
            name: name.to_string(),
            reason: format!("{} cannot be bound", resource.payload().kind_name()),
        });
    };
    let required = kind.required_shape();
    if shape != required {
        return Err(CinderError::InvalidResource {
            name: name.to_string(),
            reason: format!("{kind:?} binding requires a {required} resource, found {shape}"),
        });
    }

    // Buffer and texture kinds also need the matching usage bit.
    match kind {
        BindingKind::UniformBuffer => {
            if !buffer_usage(resource).is_some_and(|u| u.contains(wgpu::BufferUsages::UNIFORM)) {
                return Err(CinderError::InvalidResource {
                    name: name.to_string(),
                    reason: "buffer lacks UNIFORM usage".to_string(),
                });
            }
        }
        BindingKind::StorageBuffer => {
            if !buffer_usage(resource).is_some_and(|u| u.contains(wgpu::BufferUsages::STORAGE)) {
                return Err(CinderError::InvalidResource {
                    name: name.to_string(),
                    reason: "buffer lacks STORAGE usage".to_string(),
                });
            }
        }
        BindingKind::SampledTexture => {
            if !texture_usage(resource)
                .is_some_and(|u| u.contains(wgpu::TextureUsages::TEXTURE_BINDING))
            {
                return Err(CinderError::InvalidResource {
                    name: name.to_string(),
                    reason: "texture lacks TEXTURE_BINDING usage".to_string(),
                });
            }
        }
        BindingKind::StorageTexture => {
            if !texture_usage(resource)
                .is_some_and(|u| u.contains(wgpu::TextureUsages::STORAGE_BINDING))
            {
                return Err(CinderError::InvalidResource {
                    name: name.to_string(),
                    reason: "texture lacks STORAGE_BINDING usage".to_string(),
                });
            }
        }
        BindingKind::Sampler => {}
    }
    Ok(())
}

fn buffer_usage(resource: &Resource) -> Option<wgpu::BufferUsages> {
    match resource.payload() {
        ResourcePayload::Buffer(b) => Some(b.usage()),
        ResourcePayload::VertexBuffer(_) => {
            Some(wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST)
        }
        ResourcePayload::IndexBuffer(_) => {
            Some(wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST)
        }
        ResourcePayload::UniformBuffer(_) => {
            Some(wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST)
        }
        _ => None,
    }
}

fn texture_usage(resource: &Resource) -> Option<wgpu::TextureUsages> {
    match resource.payload() {
        ResourcePayload::Texture(t) => Some(t.desc().usage),
        _ => None,
    }
}

/// The kind-specific layout fragment for one binding.
fn binding_type(kind: BindingKind, resource: &Resource) -> Result<wgpu::BindingType> {
    let ty = match (kind, resource.payload()) {
        (BindingKind::UniformBuffer, _) => wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        (BindingKind::StorageBuffer, _) => wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: false },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        (BindingKind::SampledTexture, ResourcePayload::Texture(t)) => wgpu::BindingType::Texture {
            sample_type: t.desc().sample_type(),
            view_dimension: t.desc().view_dimension,
            multisampled: t.desc().sample_count > 1,
        },
        (BindingKind::StorageTexture, ResourcePayload::Texture(t)) => {
            wgpu::BindingType::StorageTexture {
                access: wgpu::StorageTextureAccess::WriteOnly,
                format: t.desc().format,
                view_dimension: t.desc().view_dimension,
            }
        }
        (BindingKind::Sampler, ResourcePayload::Sampler(s)) => {
            wgpu::BindingType::Sampler(s.desc().binding_type())
        }
        _ => {
            return Err(CinderError::InvalidResource {
                name: resource.name().to_string(),
                reason: format!("{kind:?} binding is incompatible with this resource"),
            });
        }
    };
    Ok(ty)
}

/// The concrete wgpu binding resource for one entry. Callers guarantee the
/// resource is built.
fn binding_resource(kind: BindingKind, resource: &Resource) -> Result<wgpu::BindingResource<'_>> {
    let not_built = || CinderError::NotBuilt {
        name: resource.name().to_string(),
    };
    match kind {
        BindingKind::UniformBuffer | BindingKind::StorageBuffer => Ok(wgpu::BindingResource::Buffer(
            resource.buffer().ok_or_else(not_built)?.as_entire_buffer_binding(),
        )),
        BindingKind::SampledTexture | BindingKind::StorageTexture => Ok(
            wgpu::BindingResource::TextureView(resource.texture_view().ok_or_else(not_built)?),
        ),
        BindingKind::Sampler => Ok(wgpu::BindingResource::Sampler(
            resource.sampler().ok_or_else(not_built)?,
        )),
    }
}
