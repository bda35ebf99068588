//! Material Cache Tests
//!
//! Tests for:
//! - Content-addressed deduplication (attributes never miss the cache)
//! - Distinct GPU-affecting descriptors yielding distinct entries
//! - Create/update/dispose lifecycles and registry resource ownership

use cinder::binding::BindingKind;
use cinder::material::{
    MaterialBindingEntry, MaterialBindingLayout, MaterialCache, MaterialDescriptor,
    MaterialPipelineDesc,
};
use cinder::resources::{SamplerDesc, TextureDesc, UniformLayout};
use cinder::{ResourceRegistry, ShaderSource};

const SURFACE_WGSL: &str = r"
@vertex fn vs_main(@location(0) position: vec3f) -> @builtin(position) vec4f {
    return vec4f(position, 1.0);
}
@fragment fn fs_main() -> @location(0) vec4f {
    return vec4f(1.0);
}
";

fn registry_with_material_resources() -> ResourceRegistry {
    let mut registry = ResourceRegistry::new();
    registry
        .create_uniform_buffer("material_params", UniformLayout::material_params())
        .unwrap();
    registry
        .create_texture(
            "albedo",
            TextureDesc::d2(
                256,
                256,
                wgpu::TextureFormat::Rgba8Unorm,
                wgpu::TextureUsages::TEXTURE_BINDING,
            ),
        )
        .unwrap();
    registry.create_sampler("linear", SamplerDesc::default()).unwrap();
    registry
}

fn surface_descriptor(format: wgpu::TextureFormat) -> MaterialDescriptor {
    let mut descriptor = MaterialDescriptor::new(
        ShaderSource::Code(SURFACE_WGSL.to_string()),
        MaterialPipelineDesc::surface(format),
    );
    descriptor.layout = vec![
        MaterialBindingLayout {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            kind: BindingKind::UniformBuffer,
        },
        MaterialBindingLayout {
            binding: 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            kind: BindingKind::SampledTexture,
        },
        MaterialBindingLayout {
            binding: 2,
            visibility: wgpu::ShaderStages::FRAGMENT,
            kind: BindingKind::Sampler,
        },
    ];
    descriptor.bindings = vec![
        MaterialBindingEntry {
            binding: 0,
            resource: "material_params".to_string(),
        },
        MaterialBindingEntry {
            binding: 1,
            resource: "albedo".to_string(),
        },
        MaterialBindingEntry {
            binding: 2,
            resource: "linear".to_string(),
        },
    ];
    descriptor
}

// ============================================================================
// Deduplication
// ============================================================================

#[test]
fn attributes_never_cause_a_cache_miss() {
    let mut registry = registry_with_material_resources();
    let mut cache = MaterialCache::new();

    let red = {
        let mut d = surface_descriptor(wgpu::TextureFormat::Rgba8Unorm);
        d.attributes.base_color = [1.0, 0.0, 0.0, 1.0];
        d.attributes.metallic = 0.9;
        d
    };
    let blue = {
        let mut d = surface_descriptor(wgpu::TextureFormat::Rgba8Unorm);
        d.attributes.base_color = [0.0, 0.0, 1.0, 1.0];
        d.attributes.roughness = 0.1;
        d
    };
    assert!(red.is_equivalent(&blue));

    let first = cache.create_material(&mut registry, red).unwrap();
    let second = cache.create_material(&mut registry, blue).unwrap();
    assert_eq!(first, second);
    assert_eq!(cache.len(), 1);

    // One shader + one pipeline + one bind group, not two of each.
    let stats = registry.stats();
    assert_eq!(stats.resources.created, 4); // 3 bound resources + 1 material shader
    assert_eq!(stats.pipelines.created, 1);
    assert_eq!(stats.bind_groups.created, 1);
}

#[test]
fn different_target_format_is_a_distinct_material() {
    let mut registry = registry_with_material_resources();
    let mut cache = MaterialCache::new();

    let srgb = cache
        .create_material(&mut registry, surface_descriptor(wgpu::TextureFormat::Rgba8UnormSrgb))
        .unwrap();
    let linear = cache
        .create_material(&mut registry, surface_descriptor(wgpu::TextureFormat::Rgba8Unorm))
        .unwrap();

    assert_ne!(srgb, linear);
    assert_eq!(cache.len(), 2);
}

#[test]
fn different_shader_source_is_a_distinct_material() {
    let mut registry = registry_with_material_resources();
    let mut cache = MaterialCache::new();

    let a = cache
        .create_material(&mut registry, surface_descriptor(wgpu::TextureFormat::Rgba8Unorm))
        .unwrap();

    let mut other = surface_descriptor(wgpu::TextureFormat::Rgba8Unorm);
    other.shader_source = ShaderSource::Code(format!("{SURFACE_WGSL}\n// variant"));
    let b = cache.create_material(&mut registry, other).unwrap();

    assert_ne!(a, b);
}

#[test]
fn binding_visibility_participates_in_identity() {
    let mut registry = registry_with_material_resources();
    let mut cache = MaterialCache::new();

    let fragment_only = cache
        .create_material(&mut registry, surface_descriptor(wgpu::TextureFormat::Rgba8Unorm))
        .unwrap();

    let mut both_stages = surface_descriptor(wgpu::TextureFormat::Rgba8Unorm);
    both_stages.layout[0].visibility = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
    let widened = cache.create_material(&mut registry, both_stages).unwrap();

    assert_ne!(fragment_only, widened);
}

// ============================================================================
// Lifecycles
// ============================================================================

#[test]
fn entries_own_registry_resources() {
    let mut registry = registry_with_material_resources();
    let mut cache = MaterialCache::new();

    let id = cache
        .create_material(&mut registry, surface_descriptor(wgpu::TextureFormat::Rgba8Unorm))
        .unwrap();
    let entry = cache.get(id).unwrap();
    assert!(registry.has_resource(entry.shader_name()));
    assert!(registry.has_pipeline(entry.pipeline_name()));
    assert!(registry.has_bind_group(entry.bind_group_name().unwrap()));
}

#[test]
fn update_rekeys_and_destroys_old_state() {
    let mut registry = registry_with_material_resources();
    let mut cache = MaterialCache::new();

    let id = cache
        .create_material(&mut registry, surface_descriptor(wgpu::TextureFormat::Rgba8Unorm))
        .unwrap();
    let old_shader = cache.get(id).unwrap().shader_name().to_string();
    let old_pipeline = cache.get(id).unwrap().pipeline_name().to_string();

    let new_id = cache
        .update_material(
            &mut registry,
            id,
            surface_descriptor(wgpu::TextureFormat::Rgba16Float),
        )
        .unwrap();

    assert_ne!(id, new_id);
    assert!(!cache.contains(id));
    assert!(!registry.has_resource(&old_shader));
    assert!(!registry.has_pipeline(&old_pipeline));

    let entry = cache.get(new_id).unwrap();
    assert!(registry.has_pipeline(entry.pipeline_name()));
}

#[test]
fn double_dispose_is_a_no_op() {
    let mut registry = registry_with_material_resources();
    let mut cache = MaterialCache::new();

    let id = cache
        .create_material(&mut registry, surface_descriptor(wgpu::TextureFormat::Rgba8Unorm))
        .unwrap();
    let shader = cache.get(id).unwrap().shader_name().to_string();

    cache.dispose_material(&mut registry, id);
    assert!(!cache.contains(id));
    assert!(!registry.has_resource(&shader));

    // Second dispose of the same id must be quiet.
    cache.dispose_material(&mut registry, id);
    assert!(cache.is_empty());
}

#[test]
fn disposed_identity_can_be_recreated() {
    let mut registry = registry_with_material_resources();
    let mut cache = MaterialCache::new();

    let descriptor = surface_descriptor(wgpu::TextureFormat::Rgba8Unorm);
    let id = cache.create_material(&mut registry, descriptor.clone()).unwrap();
    cache.dispose_material(&mut registry, id);

    let revived = cache.create_material(&mut registry, descriptor).unwrap();
    assert_ne!(id, revived);
    assert_eq!(cache.len(), 1);
}
