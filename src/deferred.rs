//! Deferred-rendering resource configuration
//!
//! The canonical resource set a deferred pipeline assembles out of the
//! registry: G-Buffer attachments sized to a canvas and kept in sync with
//! it through resize dependencies, plus the front of the pass chain (depth
//! prepass, G-Buffer clear) with their dependencies declared.

use crate::context::WgpuContext;
use crate::errors::{CinderError, Result};
use crate::graph::{DependencyDirection, PassDependencies, RenderPass};
use crate::registry::{ResourceCategory, ResourceRegistry};
use crate::resources::TextureDesc;

/// G-Buffer attachment: RGBA base color.
pub const GBUFFER_BASE_COLOR: &str = "gbuffer_base_color";
/// G-Buffer attachment: world-space normals.
pub const GBUFFER_NORMAL: &str = "gbuffer_normal";
/// G-Buffer attachment: material parameters (metallic/roughness/ao).
pub const GBUFFER_MATERIAL: &str = "gbuffer_material";
/// Scene depth, written by the depth prepass.
pub const SCENE_DEPTH: &str = "scene_depth";

/// The G-Buffer attachment names, in attachment order.
pub const GBUFFER_COLOR_TARGETS: [&str; 3] =
    [GBUFFER_BASE_COLOR, GBUFFER_NORMAL, GBUFFER_MATERIAL];

/// Depth format used by the prepass.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Registers the G-Buffer resources sized to `canvas` and wires each of
/// them as a resize dependent, so surface resizes propagate automatically.
pub fn register_gbuffer(registry: &mut ResourceRegistry, canvas: &str) -> Result<()> {
    let (width, height) = registry.canvas_size(canvas)?;

    registry.create_texture(
        GBUFFER_BASE_COLOR,
        TextureDesc::render_target(width, height, wgpu::TextureFormat::Rgba8Unorm),
    )?;
    registry.create_texture(
        GBUFFER_NORMAL,
        TextureDesc::render_target(width, height, wgpu::TextureFormat::Rgba16Float),
    )?;
    registry.create_texture(
        GBUFFER_MATERIAL,
        TextureDesc::render_target(width, height, wgpu::TextureFormat::Rgba8Unorm),
    )?;
    registry.create_texture(
        SCENE_DEPTH,
        TextureDesc::render_target(width, height, DEPTH_FORMAT),
    )?;

    for name in GBUFFER_COLOR_TARGETS {
        registry.add_resize_dependent(canvas, name)?;
    }
    registry.add_resize_dependent(canvas, SCENE_DEPTH)?;

    log::debug!("G-Buffer registered at {width}x{height} for canvas \"{canvas}\"");
    Ok(())
}

// ============================================================================
// Passes
// ============================================================================

/// Depth-only prepass: owns the scene depth texture and clears it at the
/// start of the frame.
pub struct DepthPrepass {
    dependencies: PassDependencies,
}

impl Default for DepthPrepass {
    fn default() -> Self {
        Self::new()
    }
}

impl DepthPrepass {
    #[must_use]
    pub fn new() -> Self {
        let mut dependencies = PassDependencies::new();
        dependencies.add_with_metadata(
            SCENE_DEPTH,
            ResourceCategory::Resource,
            DependencyDirection::Output,
            "depth attachment",
        );
        Self { dependencies }
    }
}

impl RenderPass for DepthPrepass {
    fn name(&self) -> &str {
        "DepthPrepass"
    }

    fn dependencies(&self) -> &PassDependencies {
        &self.dependencies
    }

    fn execute(
        &mut self,
        registry: &mut ResourceRegistry,
        ctx: &WgpuContext,
        encoder: &mut wgpu::CommandEncoder,
    ) -> Result<()> {
        registry.build_resource(ctx, SCENE_DEPTH)?;
        let depth_view = registry
            .get_resource(SCENE_DEPTH)?
            .texture_view()
            .ok_or_else(|| CinderError::NotBuilt {
                name: SCENE_DEPTH.to_string(),
            })?;

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Depth Prepass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        Ok(())
    }
}

/// Geometry pass front-end: clears the G-Buffer attachments and binds the
/// prepass depth for testing.
pub struct GeometryPass {
    dependencies: PassDependencies,
}

impl Default for GeometryPass {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryPass {
    #[must_use]
    pub fn new() -> Self {
        let mut dependencies = PassDependencies::new();
        for target in GBUFFER_COLOR_TARGETS {
            dependencies.add_with_metadata(
                target,
                ResourceCategory::Resource,
                DependencyDirection::Output,
                "color attachment",
            );
        }
        dependencies.add_with_metadata(
            SCENE_DEPTH,
            ResourceCategory::Resource,
            DependencyDirection::Input,
            "depth test",
        );
        Self { dependencies }
    }
}

impl RenderPass for GeometryPass {
    fn name(&self) -> &str {
        "GeometryPass"
    }

    fn dependencies(&self) -> &PassDependencies {
        &self.dependencies
    }

    fn execute(
        &mut self,
        registry: &mut ResourceRegistry,
        ctx: &WgpuContext,
        encoder: &mut wgpu::CommandEncoder,
    ) -> Result<()> {
        for name in GBUFFER_COLOR_TARGETS {
            registry.build_resource(ctx, name)?;
        }
        registry.build_resource(ctx, SCENE_DEPTH)?;

        let not_built = |name: &str| CinderError::NotBuilt {
            name: name.to_string(),
        };
        let color_attachments: Vec<Option<wgpu::RenderPassColorAttachment<'_>>> =
            GBUFFER_COLOR_TARGETS
                .iter()
                .map(|name| {
                    let view = registry
                        .get_resource(name)?
                        .texture_view()
                        .ok_or_else(|| not_built(name))?;
                    Ok(Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    }))
                })
                .collect::<Result<_>>()?;
        let depth_view = registry
            .get_resource(SCENE_DEPTH)?
            .texture_view()
            .ok_or_else(|| not_built(SCENE_DEPTH))?;

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Geometry Pass"),
            color_attachments: &color_attachments,
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    // Depth was laid down by the prepass; keep it.
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        Ok(())
    }
}
