//! Bind Group Tests
//!
//! Tests for:
//! - Slot uniqueness and kind-compatibility validation
//! - Layout invalidation on add/remove, handle-only invalidation on update
//! - Usage-flag checks behind the coarse shape check

use cinder::binding::BindingKind;
use cinder::resources::{SamplerDesc, TextureDesc, UniformLayout};
use cinder::{CinderError, ResourceRegistry};

fn registry_with_resources() -> ResourceRegistry {
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
                wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            ),
        )
        .unwrap();
    registry.create_sampler("linear", SamplerDesc::default()).unwrap();
    registry.create_storage_buffer("lights", 4096).unwrap();
    registry
        .create_bind_group("material", wgpu::ShaderStages::FRAGMENT)
        .unwrap();
    registry
}

#[test]
fn occupied_slot_is_invalid() {
    let mut registry = registry_with_resources();
    registry
        .add_binding("material", 0, BindingKind::UniformBuffer, "material_params")
        .unwrap();

    let err = registry.add_binding("material", 0, BindingKind::SampledTexture, "albedo");
    assert!(matches!(err, Err(CinderError::InvalidSlot { slot: 0, .. })));
    assert_eq!(registry.get_bind_group("material").unwrap().len(), 1);
}

#[test]
fn sampler_under_buffer_kind_is_invalid() {
    let mut registry = registry_with_resources();
    let err = registry.add_binding("material", 0, BindingKind::UniformBuffer, "linear");
    assert!(matches!(err, Err(CinderError::InvalidResource { .. })));
}

#[test]
fn texture_under_sampler_kind_is_invalid() {
    let mut registry = registry_with_resources();
    let err = registry.add_binding("material", 0, BindingKind::Sampler, "albedo");
    assert!(matches!(err, Err(CinderError::InvalidResource { .. })));
}

#[test]
fn missing_resource_is_invalid() {
    let mut registry = registry_with_resources();
    let err = registry.add_binding("material", 0, BindingKind::SampledTexture, "ghost");
    assert!(matches!(err, Err(CinderError::InvalidResource { .. })));
}

#[test]
fn storage_kind_requires_storage_usage() {
    let mut registry = registry_with_resources();
    // A uniform buffer is buffer-shaped but lacks STORAGE usage.
    let err = registry.add_binding("material", 0, BindingKind::StorageBuffer, "material_params");
    assert!(matches!(err, Err(CinderError::InvalidResource { .. })));

    registry
        .add_binding("material", 0, BindingKind::StorageBuffer, "lights")
        .unwrap();
}

#[test]
fn storage_texture_requires_storage_binding_usage() {
    let mut registry = registry_with_resources();
    let err = registry.add_binding("material", 0, BindingKind::StorageTexture, "albedo");
    assert!(matches!(err, Err(CinderError::InvalidResource { .. })));
}

#[test]
fn full_material_group_assembles() {
    let mut registry = registry_with_resources();
    registry
        .add_binding("material", 0, BindingKind::UniformBuffer, "material_params")
        .unwrap();
    registry
        .add_binding("material", 1, BindingKind::SampledTexture, "albedo")
        .unwrap();
    registry
        .add_binding("material", 2, BindingKind::Sampler, "linear")
        .unwrap();

    let group = registry.get_bind_group("material").unwrap();
    assert_eq!(group.len(), 3);
    let slots: Vec<u32> = group.entries().map(|(slot, _)| slot).collect();
    assert_eq!(slots, vec![0, 1, 2]);
}

#[test]
fn add_and_remove_advance_the_layout_version() {
    let mut registry = registry_with_resources();
    let v0 = registry.get_bind_group("material").unwrap().layout_version();

    registry
        .add_binding("material", 0, BindingKind::SampledTexture, "albedo")
        .unwrap();
    let v1 = registry.get_bind_group("material").unwrap().layout_version();
    assert_ne!(v0, v1);

    registry.remove_binding("material", 0).unwrap();
    let v2 = registry.get_bind_group("material").unwrap().layout_version();
    assert_ne!(v1, v2);

    // Removing an empty slot changes nothing.
    registry.remove_binding("material", 7).unwrap();
    assert_eq!(registry.get_bind_group("material").unwrap().layout_version(), v2);
}

#[test]
fn update_resource_keeps_the_layout() {
    let mut registry = registry_with_resources();
    registry
        .create_texture(
            "albedo_hd",
            TextureDesc::d2(
                1024,
                1024,
                wgpu::TextureFormat::Rgba8Unorm,
                wgpu::TextureUsages::TEXTURE_BINDING,
            ),
        )
        .unwrap();
    registry
        .add_binding("material", 1, BindingKind::SampledTexture, "albedo")
        .unwrap();
    let layout_version = registry.get_bind_group("material").unwrap().layout_version();

    registry
        .update_binding_resource("material", 1, "albedo_hd")
        .unwrap();
    let group = registry.get_bind_group("material").unwrap();
    assert_eq!(group.layout_version(), layout_version);

    let (_, entry) = group.entries().next().unwrap();
    assert_eq!(entry.resource, "albedo_hd");
}

#[test]
fn update_resource_on_empty_slot_is_not_found() {
    let mut registry = registry_with_resources();
    let err = registry.update_binding_resource("material", 4, "albedo");
    assert!(matches!(err, Err(CinderError::NotFound { .. })));
}

#[test]
fn update_resource_revalidates_kind() {
    let mut registry = registry_with_resources();
    registry
        .add_binding("material", 1, BindingKind::SampledTexture, "albedo")
        .unwrap();
    let err = registry.update_binding_resource("material", 1, "linear");
    assert!(matches!(err, Err(CinderError::InvalidResource { .. })));
}
