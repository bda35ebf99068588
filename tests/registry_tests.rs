//! Registry Tests
//!
//! Tests for:
//! - Name uniqueness per category, NotFound on missed lookups
//! - Idempotent removal, remove_all bookkeeping
//! - Canvas registration, resize dependents, exactly-once delivery
//! - Placeholder seeding and registry stats

use std::cell::Cell;
use std::rc::Rc;

use cinder::registry::ResourceCategory;
use cinder::resources::{SamplerDesc, TextureDesc, UniformLayout, VertexLayout};
use cinder::{CanvasDesc, CinderError, ResourceRegistry};

fn test_registry() -> ResourceRegistry {
    let mut registry = ResourceRegistry::new();
    registry
        .create_texture(
            "albedo",
            TextureDesc::render_target(512, 512, wgpu::TextureFormat::Rgba8Unorm),
        )
        .unwrap();
    registry
        .create_uniform_buffer("camera", UniformLayout::transform())
        .unwrap();
    registry
        .create_vertex_buffer("quad", 1024, VertexLayout::static_mesh())
        .unwrap();
    registry
}

// ============================================================================
// Names and lifecycle
// ============================================================================

#[test]
fn duplicate_resource_name_is_rejected() {
    let mut registry = test_registry();
    let err = registry.create_storage_buffer("albedo", 64);
    assert!(matches!(err, Err(CinderError::DuplicateName { .. })));
}

#[test]
fn names_are_scoped_per_category() {
    let mut registry = test_registry();
    // A bind group may share a name with a resource.
    registry
        .create_bind_group("albedo", wgpu::ShaderStages::FRAGMENT)
        .unwrap();
    assert!(registry.has_resource("albedo"));
    assert!(registry.has_bind_group("albedo"));
}

#[test]
fn missing_lookup_is_not_found() {
    let registry = ResourceRegistry::new();
    let err = registry.get_resource("ghost");
    assert!(matches!(err, Err(CinderError::NotFound { .. })));
}

#[test]
fn remove_is_idempotent_and_lookup_fails_afterwards() {
    let mut registry = test_registry();
    registry.remove_resource("albedo");
    // Second removal of the same name must not panic or error.
    registry.remove_resource("albedo");

    let err = registry.get_resource("albedo");
    assert!(matches!(err, Err(CinderError::NotFound { .. })));
}

#[test]
fn resources_are_created_dirty() {
    let registry = test_registry();
    assert!(!registry.get_resource("albedo").unwrap().is_built());
    assert!(!registry.get_resource("camera").unwrap().is_built());
}

#[test]
fn remove_all_clears_every_category() {
    let mut registry = test_registry();
    registry.create_bind_group("frame", wgpu::ShaderStages::VERTEX).unwrap();
    registry.add_canvas("viewport", CanvasDesc::new(640, 480)).unwrap();

    registry.remove_all();

    assert!(!registry.has_resource("albedo"));
    assert!(!registry.has_bind_group("frame"));
    assert!(!registry.has_canvas("viewport"));

    let stats = registry.stats();
    assert_eq!(stats.resources.live, 0);
    assert_eq!(stats.resources.created, 3);
    assert_eq!(stats.resources.destroyed, 3);
    assert_eq!(stats.canvases, 0);
}

#[test]
fn stats_track_creation_and_destruction() {
    let mut registry = test_registry();
    registry.remove_resource("quad");

    let stats = registry.stats();
    assert_eq!(stats.resources.live, 2);
    assert_eq!(stats.resources.created, 3);
    assert_eq!(stats.resources.destroyed, 1);
}

#[test]
fn placeholders_register_once() {
    let mut registry = ResourceRegistry::new();
    registry.register_placeholders().unwrap();
    assert!(registry.has_resource("placeholder_texture"));
    assert!(registry.has_resource("placeholder_uniform"));
    assert!(registry.has_resource("placeholder_storage"));
    assert!(registry.has_resource("placeholder_sampler"));

    // Seeding twice collides on the reserved names.
    assert!(registry.register_placeholders().is_err());
}

#[test]
fn contains_answers_per_category() {
    let registry = test_registry();
    assert!(registry.contains(ResourceCategory::Resource, "albedo"));
    assert!(!registry.contains(ResourceCategory::BindGroup, "albedo"));
    assert!(!registry.contains(ResourceCategory::Pipeline, "albedo"));
}

// ============================================================================
// Canvases and resize fan-out
// ============================================================================

#[test]
fn duplicate_canvas_is_rejected() {
    let mut registry = ResourceRegistry::new();
    registry.add_canvas("viewport", CanvasDesc::new(640, 480)).unwrap();
    let err = registry.add_canvas("viewport", CanvasDesc::new(640, 480));
    assert!(matches!(err, Err(CinderError::DuplicateName { .. })));
}

#[test]
fn on_ready_fires_with_initial_dimensions() {
    let seen = Rc::new(Cell::new((0u32, 0u32)));
    let seen_cb = Rc::clone(&seen);

    let mut registry = ResourceRegistry::new();
    registry
        .add_canvas(
            "viewport",
            CanvasDesc::new(1280, 720).on_ready(move |w, h| seen_cb.set((w, h))),
        )
        .unwrap();
    assert_eq!(seen.get(), (1280, 720));
}

#[test]
fn resize_dependent_requires_known_canvas() {
    let mut registry = test_registry();
    let err = registry.add_resize_dependent("ghost_canvas", "albedo");
    assert!(matches!(
        err,
        Err(CinderError::NotFound {
            category: ResourceCategory::Canvas,
            ..
        })
    ));
}

#[test]
fn canvas_resize_notifies_dependent_texture_exactly_once() {
    let mut registry = test_registry();
    registry.add_canvas("viewport", CanvasDesc::new(640, 480)).unwrap();
    registry.add_resize_dependent("viewport", "albedo").unwrap();
    // Duplicate registration must collapse.
    registry.add_resize_dependent("viewport", "albedo").unwrap();

    let version_before = registry.get_resource("albedo").unwrap().version();
    registry.resize_canvas("viewport", 800, 600).unwrap();

    let resource = registry.get_resource("albedo").unwrap();
    // Exactly one invalidation, carrying the new dimensions.
    assert_eq!(resource.version(), version_before + 1);
    match resource.payload() {
        cinder::resources::ResourcePayload::Texture(texture) => {
            assert_eq!(texture.size(), (800, 600));
        }
        _ => unreachable!("albedo is a texture"),
    }
    assert_eq!(registry.canvas_size("viewport").unwrap(), (800, 600));
}

#[test]
fn resize_callback_fires_before_dependents() {
    let calls = Rc::new(Cell::new(0u32));
    let calls_cb = Rc::clone(&calls);

    let mut registry = test_registry();
    registry
        .add_canvas(
            "viewport",
            CanvasDesc::new(640, 480).on_resize(move |_, _| calls_cb.set(calls_cb.get() + 1)),
        )
        .unwrap();
    registry.add_resize_dependent("viewport", "albedo").unwrap();

    registry.resize_canvas("viewport", 320, 240).unwrap();
    registry.resize_canvas("viewport", 800, 600).unwrap();
    assert_eq!(calls.get(), 2);
}

#[test]
fn non_resizable_dependents_are_tolerated() {
    let mut registry = test_registry();
    registry.add_canvas("viewport", CanvasDesc::new(640, 480)).unwrap();
    // A uniform buffer defines no resize operation; delivery must not fail.
    registry.add_resize_dependent("viewport", "camera").unwrap();

    let version_before = registry.get_resource("camera").unwrap().version();
    registry.resize_canvas("viewport", 100, 100).unwrap();
    assert_eq!(registry.get_resource("camera").unwrap().version(), version_before);
}

#[test]
fn sampler_and_texture_categories_validate_bindings() {
    let mut registry = test_registry();
    registry.create_sampler("linear", SamplerDesc::default()).unwrap();
    assert!(registry.has_resource("linear"));
}
