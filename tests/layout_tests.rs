//! Layout Computation Tests
//!
//! Tests for:
//! - UniformLayout: alignment rules, offset computation, 256-byte padding
//! - VertexLayout: tight packing, cumulative offsets, stride, presets
//! - UniformBufferResource: staged field writes, frozen-layout contract

use cinder::resources::{UniformBufferResource, UniformLayout, UniformType, UniformValue, VertexLayout};
use cinder::CinderError;
use glam::{Mat4, Vec3, Vec4};

// ============================================================================
// Uniform layout
// ============================================================================

#[test]
fn uniform_offsets_are_aligned_in_any_declaration_order() {
    let orders: [&[(&str, UniformType)]; 3] = [
        &[
            ("a", UniformType::Float),
            ("b", UniformType::Float3),
            ("c", UniformType::Float2),
            ("d", UniformType::Mat4),
        ],
        &[
            ("a", UniformType::Float3),
            ("b", UniformType::Float),
            ("c", UniformType::Mat4),
            ("d", UniformType::Float2),
        ],
        &[
            ("a", UniformType::Mat4),
            ("b", UniformType::Float2),
            ("c", UniformType::Float3),
            ("d", UniformType::Bool),
        ],
    ];

    for fields in orders {
        let mut layout = UniformLayout::new();
        for (name, ty) in fields {
            layout.add(*name, *ty).unwrap();
        }
        for field in layout.fields() {
            assert_eq!(
                field.offset % field.alignment,
                0,
                "field {} misaligned",
                field.name
            );
            if matches!(
                field.ty,
                UniformType::Float3 | UniformType::Int3 | UniformType::Uint3
            ) {
                assert_eq!(field.alignment, 16, "vec3 field {} not padded", field.name);
            }
        }
    }
}

#[test]
fn uniform_total_grows_monotonically() {
    let mut layout = UniformLayout::new();
    let mut last = 0;
    for (name, ty) in [
        ("a", UniformType::Float),
        ("b", UniformType::Float3),
        ("c", UniformType::Float),
        ("d", UniformType::Mat3),
        ("e", UniformType::Float4),
    ] {
        layout.add(name, ty).unwrap();
        let field = layout.field(name).unwrap();
        assert!(field.offset >= last);
        last = field.offset + field.size;
        assert_eq!(layout.total_size(), last);
    }
}

#[test]
fn padded_size_is_smallest_multiple_of_256() {
    let mut small = UniformLayout::new();
    small.add("x", UniformType::Float).unwrap();
    assert_eq!(small.padded_size(), 256);

    let mut exact = UniformLayout::new();
    for i in 0..4 {
        exact.add(format!("m{i}"), UniformType::Mat4).unwrap();
    }
    assert_eq!(exact.total_size(), 256);
    assert_eq!(exact.padded_size(), 256);

    exact.add("overflow", UniformType::Float).unwrap();
    assert_eq!(exact.padded_size(), 512);
}

#[test]
fn material_params_preset_matches_reference_layout() {
    let layout = UniformLayout::material_params();
    assert_eq!(layout.field("base_color").unwrap().offset, 0);
    assert_eq!(layout.field("metallic").unwrap().offset, 16);
    assert_eq!(layout.field("roughness").unwrap().offset, 20);
    // vec3 after two packed floats jumps to the next 16-byte boundary
    assert_eq!(layout.field("emissive").unwrap().offset, 32);
    assert_eq!(layout.padded_size(), 256);
}

// ============================================================================
// Uniform buffer staging
// ============================================================================

#[test]
fn staged_values_land_at_field_offsets() {
    let mut buffer = UniformBufferResource::new(UniformLayout::material_params());
    buffer
        .set_value("mat", "base_color", UniformValue::Float4(Vec4::new(1.0, 0.5, 0.25, 1.0)))
        .unwrap();
    buffer
        .set_value("mat", "emissive", UniformValue::Float3(Vec3::new(0.1, 0.2, 0.3)))
        .unwrap();

    let bytes = buffer.bytes();
    let red = f32::from_le_bytes(bytes[0..4].try_into().unwrap());
    assert!((red - 1.0).abs() < f32::EPSILON);
    let em_x = f32::from_le_bytes(bytes[32..36].try_into().unwrap());
    assert!((em_x - 0.1).abs() < f32::EPSILON);
}

#[test]
fn wrong_value_type_is_rejected() {
    let mut buffer = UniformBufferResource::new(UniformLayout::transform());
    let err = buffer.set_value("transform", "model_matrix", UniformValue::Float(1.0));
    assert!(matches!(err, Err(CinderError::InvalidDescriptor { .. })));

    buffer
        .set_value("transform", "model_matrix", UniformValue::Mat4(Mat4::IDENTITY))
        .unwrap();
}

#[test]
fn unknown_field_is_reported() {
    let mut buffer = UniformBufferResource::new(UniformLayout::transform());
    let err = buffer.set_value("transform", "bones", UniformValue::Mat4(Mat4::IDENTITY));
    assert!(matches!(err, Err(CinderError::FieldNotFound { .. })));
}

// ============================================================================
// Vertex layout
// ============================================================================

#[test]
fn vertex_offsets_are_cumulative_sums() {
    let mut layout = VertexLayout::new();
    layout.add("position", wgpu::VertexFormat::Float32x3, 0).unwrap();
    layout.add("normal", wgpu::VertexFormat::Float32x3, 1).unwrap();
    layout.add("uv", wgpu::VertexFormat::Float32x2, 2).unwrap();
    layout.add("color", wgpu::VertexFormat::Unorm8x4, 3).unwrap();

    let mut expected_offset = 0;
    for attribute in layout.attributes() {
        assert_eq!(attribute.offset, expected_offset, "gap before {}", attribute.name);
        expected_offset += attribute.format.size();
    }
    assert_eq!(layout.stride(), expected_offset);
    assert_eq!(layout.stride(), 12 + 12 + 8 + 4);
}

#[test]
fn duplicate_attribute_is_rejected() {
    let mut layout = VertexLayout::new();
    layout.add("position", wgpu::VertexFormat::Float32x3, 0).unwrap();
    assert!(layout.add("position", wgpu::VertexFormat::Float32x2, 1).is_err());
}

#[test]
fn presets_pack_tightly() {
    let static_mesh = VertexLayout::static_mesh();
    assert_eq!(static_mesh.stride(), 68);
    assert_eq!(static_mesh.attribute("uv0").unwrap().offset, 36);

    let skeletal = VertexLayout::skeletal_mesh();
    assert_eq!(skeletal.attribute("joints").unwrap().offset, 68);
    assert_eq!(skeletal.attribute("weights").unwrap().offset, 72);
    assert_eq!(skeletal.stride(), 88);
}

#[test]
fn wgpu_layout_mirrors_attributes() {
    let layout = VertexLayout::static_mesh();
    let wgpu_layout = layout.as_wgpu();
    assert_eq!(wgpu_layout.array_stride, layout.stride());
    assert_eq!(wgpu_layout.attributes.len(), layout.attributes().len());
    assert_eq!(wgpu_layout.attributes[3].offset, 36);
}
