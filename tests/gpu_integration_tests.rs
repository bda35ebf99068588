//! GPU Integration Tests
//!
//! End-to-end tests exercising real device work: lazy materialization,
//! bind group and pipeline builds, frame graph execution and buffer
//! readback. These require a GPU adapter and are marked `#[ignore]`.
//!
//! Run with: `cargo test --test gpu_integration_tests -- --ignored`

use cinder::binding::BindingKind;
use cinder::deferred::{self, DepthPrepass, GeometryPass};
use cinder::resources::{RenderPipelineDesc, UniformLayout, UniformValue};
use cinder::{
    CanvasDesc, FrameGraph, GpuSettings, ResourceRegistry, ShaderSource, WgpuContext,
};
use glam::Mat4;

const FLAT_WGSL: &str = r"
struct Transform {
    model_matrix: mat4x4f,
    view_matrix: mat4x4f,
    projection_matrix: mat4x4f,
}
@group(0) @binding(0) var<uniform> transform: Transform;

@vertex fn vs_main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4f {
    var positions = array<vec2f, 3>(vec2f(-1.0, -1.0), vec2f(3.0, -1.0), vec2f(-1.0, 3.0));
    return transform.model_matrix * vec4f(positions[index], 0.0, 1.0);
}
@fragment fn fs_main() -> @location(0) vec4f {
    return vec4f(0.25, 0.5, 0.75, 1.0);
}
";

fn request_context() -> WgpuContext {
    WgpuContext::request_blocking(&GpuSettings::default()).expect("test GPU adapter")
}

#[test]
#[ignore] // Requires GPU
fn lazy_build_materializes_on_first_access() {
    let ctx = request_context();
    let mut registry = ResourceRegistry::new();
    registry
        .create_uniform_buffer("camera", UniformLayout::transform())
        .unwrap();

    assert!(!registry.get_resource("camera").unwrap().is_built());
    registry.build_resource(&ctx, "camera").unwrap();
    assert!(registry.get_resource("camera").unwrap().is_built());

    // Second build is a no-op on a clean resource.
    registry.build_resource(&ctx, "camera").unwrap();
}

#[test]
#[ignore] // Requires GPU
fn staged_uniform_values_reach_the_gpu_block() {
    let ctx = request_context();
    let mut registry = ResourceRegistry::new();
    registry
        .create_uniform_buffer("camera", UniformLayout::transform())
        .unwrap();
    registry
        .set_uniform("camera", "model_matrix", UniformValue::Mat4(Mat4::IDENTITY))
        .unwrap();
    registry.build_resource(&ctx, "camera").unwrap();
    registry.upload_uniform(&ctx, "camera").unwrap();
}

#[test]
#[ignore] // Requires GPU
fn buffer_roundtrip_through_staging() {
    let ctx = request_context();
    let mut registry = ResourceRegistry::new();
    registry
        .create_buffer(
            "scratch",
            256,
            wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC,
            false,
        )
        .unwrap();

    let payload: Vec<u8> = (0..64).collect();
    registry.write_buffer(&ctx, "scratch", &payload, 0).unwrap();
    let read = registry.read_buffer(&ctx, "scratch", 0, 64).unwrap();
    assert_eq!(read, payload);
}

#[test]
#[ignore] // Requires GPU
fn pipeline_builds_after_its_dependencies() {
    let ctx = request_context();
    let mut registry = ResourceRegistry::new();
    registry
        .create_uniform_buffer("camera", UniformLayout::transform())
        .unwrap();
    registry
        .create_shader("flat", ShaderSource::Code(FLAT_WGSL.to_string()))
        .unwrap();
    registry
        .create_bind_group("frame", wgpu::ShaderStages::VERTEX)
        .unwrap();
    registry
        .add_binding("frame", 0, BindingKind::UniformBuffer, "camera")
        .unwrap();

    let mut desc = RenderPipelineDesc::new("flat");
    desc.bind_groups = vec!["frame".to_string()];
    desc.targets = vec![cinder::resources::ColorTargetDesc::opaque(
        wgpu::TextureFormat::Rgba8Unorm,
    )];
    registry.create_pipeline("flat_pipeline", desc).unwrap();

    assert!(registry.pipeline_handle("flat_pipeline").is_err());
    registry.build_pipeline(&ctx, "flat_pipeline").unwrap();
    assert!(registry.pipeline_handle("flat_pipeline").is_ok());
    // The dependency chain materialized on the way.
    assert!(registry.get_resource("camera").unwrap().is_built());
    assert!(registry.get_resource("flat").unwrap().is_built());
    assert!(registry.bind_group_handle("frame").is_ok());
}

#[test]
#[ignore] // Requires GPU
fn stale_bind_group_rebuilds_after_resize() {
    let ctx = request_context();
    let mut registry = ResourceRegistry::new();
    registry.add_canvas("viewport", CanvasDesc::new(640, 480)).unwrap();
    deferred::register_gbuffer(&mut registry, "viewport").unwrap();
    registry
        .create_bind_group("lighting_inputs", wgpu::ShaderStages::FRAGMENT)
        .unwrap();
    registry
        .add_binding(
            "lighting_inputs",
            0,
            BindingKind::SampledTexture,
            deferred::GBUFFER_BASE_COLOR,
        )
        .unwrap();

    registry.build_bind_group(&ctx, "lighting_inputs").unwrap();

    registry.resize_canvas("viewport", 800, 600).unwrap();
    // The referenced texture version advanced; the next build re-derives.
    registry.build_bind_group(&ctx, "lighting_inputs").unwrap();
    assert!(registry.bind_group_handle("lighting_inputs").is_ok());
}

#[test]
#[ignore] // Requires GPU
fn frame_graph_executes_resolvable_passes() {
    let ctx = request_context();
    let mut registry = ResourceRegistry::new();
    registry.add_canvas("viewport", CanvasDesc::new(320, 240)).unwrap();
    deferred::register_gbuffer(&mut registry, "viewport").unwrap();

    let mut graph = FrameGraph::new();
    graph.add_pass(Box::new(DepthPrepass::new()));
    graph.add_pass(Box::new(GeometryPass::new()));
    graph.execute(&ctx, &mut registry).unwrap();
}
