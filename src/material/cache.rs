//! Material cache
//!
//! Content-addressed deduplication of compiled material GPU state. Lookup
//! is two-level: an fx-hash of the descriptor's GPU identity selects a
//! bucket, then deep structural equality picks the entry — so equivalence
//! never degenerates into a scan over all cached materials, and hash
//! collisions stay correct.
//!
//! Each entry exclusively owns three registry resources named
//! `material_{serial}_shader`, `…_pipeline` and `…_bind_group`; they are
//! registered dirty and materialize lazily like every other resource, and
//! they are only ever released through [`MaterialCache::dispose_material`].

use slotmap::{SlotMap, new_key_type};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::errors::Result;
use crate::material::descriptor::MaterialDescriptor;
use crate::registry::ResourceRegistry;
use crate::resources::RenderPipelineDesc;

new_key_type! {
    /// Stable identifier of a cached material.
    pub struct MaterialId;
}

/// A cached material: descriptor plus the registry names of its GPU state.
pub struct MaterialEntry {
    descriptor: MaterialDescriptor,
    serial: u64,
    shader_name: String,
    pipeline_name: String,
    bind_group_name: Option<String>,
}

impl MaterialEntry {
    /// The full descriptor this entry was created from.
    #[must_use]
    pub fn descriptor(&self) -> &MaterialDescriptor {
        &self.descriptor
    }

    /// Registry name of the material's shader resource.
    #[must_use]
    pub fn shader_name(&self) -> &str {
        &self.shader_name
    }

    /// Registry name of the material's pipeline.
    #[must_use]
    pub fn pipeline_name(&self) -> &str {
        &self.pipeline_name
    }

    /// Registry name of the material's bind group, when it declares one.
    #[must_use]
    pub fn bind_group_name(&self) -> Option<&str> {
        self.bind_group_name.as_deref()
    }

    /// Serial used in the resource names, unique per created entry.
    #[must_use]
    pub fn serial(&self) -> u64 {
        self.serial
    }
}

/// Content-addressed cache of material GPU state.
pub struct MaterialCache {
    entries: SlotMap<MaterialId, MaterialEntry>,
    /// identity hash → entries in that bucket
    lookup: FxHashMap<u64, SmallVec<[MaterialId; 2]>>,
    next_serial: u64,
}

impl Default for MaterialCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            lookup: FxHashMap::default(),
            next_serial: 0,
        }
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks a cached entry up by id.
    #[must_use]
    pub fn get(&self, id: MaterialId) -> Option<&MaterialEntry> {
        self.entries.get(id)
    }

    /// Whether an id is still live (disposal invalidates it).
    #[must_use]
    pub fn contains(&self, id: MaterialId) -> bool {
        self.entries.contains_key(id)
    }

    /// Creates a material, or returns the existing entry when `descriptor`
    /// is structurally equivalent to a cached one.
    ///
    /// On a hit no GPU objects are created — descriptors that differ only
    /// in instance attributes resolve to the same id. On a miss the entry's
    /// shader, pipeline and bind group are registered (dirty, built
    /// lazily) and a fresh id is returned.
    pub fn create_material(
        &mut self,
        registry: &mut ResourceRegistry,
        descriptor: MaterialDescriptor,
    ) -> Result<MaterialId> {
        let hash = descriptor.identity_hash();
        if let Some(bucket) = self.lookup.get(&hash) {
            for &id in bucket {
                if self.entries[id].descriptor.is_equivalent(&descriptor) {
                    log::debug!("material cache hit (serial {})", self.entries[id].serial);
                    return Ok(id);
                }
            }
        }

        let entry = self.instantiate(registry, descriptor)?;
        let id = self.entries.insert(entry);
        self.lookup.entry(hash).or_default().push(id);
        Ok(id)
    }

    /// Rebuilds a material from a new descriptor.
    ///
    /// The old entry is removed and its GPU objects destroyed; the new
    /// state is registered under a fresh id (and fresh resource names).
    pub fn update_material(
        &mut self,
        registry: &mut ResourceRegistry,
        id: MaterialId,
        descriptor: MaterialDescriptor,
    ) -> Result<MaterialId> {
        self.dispose_material(registry, id);

        let hash = descriptor.identity_hash();
        let entry = self.instantiate(registry, descriptor)?;
        let new_id = self.entries.insert(entry);
        self.lookup.entry(hash).or_default().push(new_id);
        Ok(new_id)
    }

    /// Removes an entry and destroys its GPU objects. Disposing an id that
    /// was already disposed is a no-op.
    pub fn dispose_material(&mut self, registry: &mut ResourceRegistry, id: MaterialId) {
        let Some(entry) = self.entries.remove(id) else {
            return;
        };
        let hash = entry.descriptor.identity_hash();
        if let Some(bucket) = self.lookup.get_mut(&hash) {
            bucket.retain(|e| *e != id);
            if bucket.is_empty() {
                self.lookup.remove(&hash);
            }
        }

        registry.remove_pipeline(&entry.pipeline_name);
        if let Some(bind_group) = &entry.bind_group_name {
            registry.remove_bind_group(bind_group);
        }
        registry.remove_resource(&entry.shader_name);
        log::debug!("disposed material (serial {})", entry.serial);
    }

    /// Registers the GPU state for a new entry. Partially created state is
    /// rolled back on failure so a rejected descriptor leaves no orphans.
    fn instantiate(
        &mut self,
        registry: &mut ResourceRegistry,
        descriptor: MaterialDescriptor,
    ) -> Result<MaterialEntry> {
        let serial = self.next_serial;
        self.next_serial += 1;

        match Self::register_state(registry, serial, &descriptor) {
            Ok((shader_name, pipeline_name, bind_group_name)) => {
                log::debug!("material created (serial {serial})");
                Ok(MaterialEntry {
                    descriptor,
                    serial,
                    shader_name,
                    pipeline_name,
                    bind_group_name,
                })
            }
            Err(e) => {
                registry.remove_pipeline(&format!("material_{serial}_pipeline"));
                registry.remove_bind_group(&format!("material_{serial}_bind_group"));
                registry.remove_resource(&format!("material_{serial}_shader"));
                Err(e)
            }
        }
    }

    fn register_state(
        registry: &mut ResourceRegistry,
        serial: u64,
        descriptor: &MaterialDescriptor,
    ) -> Result<(String, String, Option<String>)> {
        let shader_name = format!("material_{serial}_shader");
        let pipeline_name = format!("material_{serial}_pipeline");

        registry.create_shader(&shader_name, descriptor.shader_source.clone())?;

        let bind_group_name = if descriptor.layout.is_empty() {
            None
        } else {
            let name = format!("material_{serial}_bind_group");
            // The realized group carries one visibility mask: the union of
            // the declared per-binding masks.
            let visibility = descriptor
                .layout
                .iter()
                .fold(wgpu::ShaderStages::empty(), |acc, l| acc | l.visibility);
            registry.create_bind_group(&name, visibility)?;
            for layout_entry in &descriptor.layout {
                let resource = descriptor
                    .bindings
                    .iter()
                    .find(|b| b.binding == layout_entry.binding)
                    .map(|b| b.resource.as_str());
                if let Some(resource) = resource {
                    registry.add_binding(&name, layout_entry.binding, layout_entry.kind, resource)?;
                }
            }
            Some(name)
        };

        registry.create_pipeline(
            &pipeline_name,
            RenderPipelineDesc {
                shader: shader_name.clone(),
                vertex_entry: descriptor.pipeline.vertex_entry.clone(),
                fragment_entry: Some(descriptor.pipeline.fragment_entry.clone()),
                vertex_layouts: descriptor.pipeline.vertex_layouts.clone(),
                bind_groups: bind_group_name.iter().cloned().collect(),
                targets: descriptor.pipeline.targets.clone(),
                primitive: descriptor.pipeline.primitive,
                depth_stencil: descriptor.pipeline.depth_stencil,
                sample_count: descriptor.pipeline.sample_count,
            },
        )?;

        Ok((shader_name, pipeline_name, bind_group_name))
    }
}
