//! Render pipelines
//!
//! [`RenderPipelineDesc`] describes a pipeline with hashable mirror types:
//! `wgpu` descriptor structs (`ColorTargetState`, `DepthStencilState`, …) do
//! not implement `Hash`/`Eq`, so the fields relevant for pipeline identity
//! are extracted into plain structs that derive the right impls. The same
//! mirrors double as the GPU-affecting part of material identity.
//!
//! A pipeline's native handle is only created by an explicit build step —
//! the registry resolves the shader module and every bind-group layout
//! first, so a pipeline handle can never exist before its dependencies do.

use crate::context::WgpuContext;
use crate::resources::vertex::VertexLayout;

// ============================================================================
// Hashable mirror types
// ============================================================================

/// Hashable mirror of `wgpu::BlendComponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendComponentDesc {
    pub src_factor: wgpu::BlendFactor,
    pub dst_factor: wgpu::BlendFactor,
    pub operation: wgpu::BlendOperation,
}

impl From<wgpu::BlendComponent> for BlendComponentDesc {
    fn from(b: wgpu::BlendComponent) -> Self {
        Self {
            src_factor: b.src_factor,
            dst_factor: b.dst_factor,
            operation: b.operation,
        }
    }
}

impl BlendComponentDesc {
    fn as_wgpu(self) -> wgpu::BlendComponent {
        wgpu::BlendComponent {
            src_factor: self.src_factor,
            dst_factor: self.dst_factor,
            operation: self.operation,
        }
    }
}

/// Hashable mirror of `wgpu::BlendState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendStateDesc {
    pub color: BlendComponentDesc,
    pub alpha: BlendComponentDesc,
}

impl From<wgpu::BlendState> for BlendStateDesc {
    fn from(b: wgpu::BlendState) -> Self {
        Self {
            color: b.color.into(),
            alpha: b.alpha.into(),
        }
    }
}

impl BlendStateDesc {
    /// Standard alpha blending.
    #[must_use]
    pub fn alpha_blending() -> Self {
        wgpu::BlendState::ALPHA_BLENDING.into()
    }

    fn as_wgpu(self) -> wgpu::BlendState {
        wgpu::BlendState {
            color: self.color.as_wgpu(),
            alpha: self.alpha.as_wgpu(),
        }
    }
}

/// Hashable mirror of `wgpu::ColorTargetState`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorTargetDesc {
    pub format: wgpu::TextureFormat,
    pub blend: Option<BlendStateDesc>,
    /// `wgpu::ColorWrites` bits
    pub write_mask: u32,
}

impl ColorTargetDesc {
    /// An opaque target writing all channels.
    #[must_use]
    pub fn opaque(format: wgpu::TextureFormat) -> Self {
        Self {
            format,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL.bits(),
        }
    }

    fn as_wgpu(&self) -> wgpu::ColorTargetState {
        wgpu::ColorTargetState {
            format: self.format,
            blend: self.blend.map(BlendStateDesc::as_wgpu),
            write_mask: wgpu::ColorWrites::from_bits_truncate(self.write_mask),
        }
    }
}

/// Hashable mirror of the depth/stencil subset the crate drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilDesc {
    pub format: wgpu::TextureFormat,
    pub depth_write_enabled: bool,
    pub depth_compare: wgpu::CompareFunction,
}

impl DepthStencilDesc {
    /// Standard less-equal depth testing with writes.
    #[must_use]
    pub fn standard(format: wgpu::TextureFormat) -> Self {
        Self {
            format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
        }
    }

    fn as_wgpu(self) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: self.format,
            depth_write_enabled: Some(self.depth_write_enabled),
            depth_compare: Some(self.depth_compare),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

/// Hashable mirror of `wgpu::PrimitiveState`'s identity-relevant fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveDesc {
    pub topology: wgpu::PrimitiveTopology,
    pub front_face: wgpu::FrontFace,
    pub cull_mode: Option<wgpu::Face>,
}

impl Default for PrimitiveDesc {
    fn default() -> Self {
        Self {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
        }
    }
}

// ============================================================================
// Pipeline descriptor
// ============================================================================

/// Full description of a render pipeline, referencing its shader and bind
/// groups by registry name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderPipelineDesc {
    /// Shader resource name
    pub shader: String,
    pub vertex_entry: String,
    /// `None` for depth-only pipelines
    pub fragment_entry: Option<String>,
    pub vertex_layouts: Vec<VertexLayout>,
    /// Bind group names, in `@group(N)` order
    pub bind_groups: Vec<String>,
    pub targets: Vec<ColorTargetDesc>,
    pub primitive: PrimitiveDesc,
    pub depth_stencil: Option<DepthStencilDesc>,
    pub sample_count: u32,
}

impl RenderPipelineDesc {
    /// A minimal descriptor with the conventional entry points.
    #[must_use]
    pub fn new(shader: impl Into<String>) -> Self {
        Self {
            shader: shader.into(),
            vertex_entry: "vs_main".to_string(),
            fragment_entry: Some("fs_main".to_string()),
            vertex_layouts: Vec::new(),
            bind_groups: Vec::new(),
            targets: Vec::new(),
            primitive: PrimitiveDesc::default(),
            depth_stencil: None,
            sample_count: 1,
        }
    }
}

// ============================================================================
// Pipeline resource
// ============================================================================

/// A render pipeline owned by the registry.
///
/// Unlike leaf resources, pipelines have no self-contained build: the
/// registry assembles shader module and bind-group layouts and calls
/// [`PipelineResource::build_with`]. Accessing the handle before that step
/// has run is a `NotBuilt` contract violation, surfaced by the registry.
pub struct PipelineResource {
    desc: RenderPipelineDesc,
    /// `(dependency name, version)` recorded at build time; the registry
    /// rebuilds when any tracked version has advanced
    built_deps: Vec<(String, u64)>,
    handle: Option<wgpu::RenderPipeline>,
}

impl PipelineResource {
    #[must_use]
    pub fn new(desc: RenderPipelineDesc) -> Self {
        Self {
            desc,
            built_deps: Vec::new(),
            handle: None,
        }
    }

    /// The descriptor.
    #[must_use]
    pub fn desc(&self) -> &RenderPipelineDesc {
        &self.desc
    }

    /// The native handle, if built.
    #[must_use]
    pub fn handle(&self) -> Option<&wgpu::RenderPipeline> {
        self.handle.as_ref()
    }

    /// Whether the pipeline has been built.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.handle.is_some()
    }

    /// Dependency versions recorded at the last build.
    #[must_use]
    pub fn built_deps(&self) -> &[(String, u64)] {
        &self.built_deps
    }

    /// Drops the native handle.
    pub fn destroy(&mut self) {
        self.handle = None;
        self.built_deps.clear();
    }

    /// Creates the native pipeline from pre-resolved dependencies.
    ///
    /// `dep_versions` are the dependency versions observed by the caller
    /// while resolving `module` and `layouts`; they drive staleness checks.
    pub fn build_with(
        &mut self,
        ctx: &WgpuContext,
        label: &str,
        module: &wgpu::ShaderModule,
        layouts: &[&wgpu::BindGroupLayout],
        dep_versions: Vec<(String, u64)>,
    ) {
        let bind_group_layouts: Vec<Option<&wgpu::BindGroupLayout>> =
            layouts.iter().copied().map(Some).collect();
        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: &bind_group_layouts,
                immediate_size: 0,
            });

        let vertex_buffers: Vec<_> = self.desc.vertex_layouts.iter().map(VertexLayout::as_wgpu).collect();
        let targets: Vec<Option<wgpu::ColorTargetState>> = self
            .desc
            .targets
            .iter()
            .map(|t| Some(t.as_wgpu()))
            .collect();

        let fragment = self
            .desc
            .fragment_entry
            .as_deref()
            .map(|entry| wgpu::FragmentState {
                module,
                entry_point: Some(entry),
                targets: &targets,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            });

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module,
                    entry_point: Some(&self.desc.vertex_entry),
                    buffers: &vertex_buffers,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment,
                primitive: wgpu::PrimitiveState {
                    topology: self.desc.primitive.topology,
                    front_face: self.desc.primitive.front_face,
                    cull_mode: self.desc.primitive.cull_mode,
                    ..Default::default()
                },
                depth_stencil: self.desc.depth_stencil.map(DepthStencilDesc::as_wgpu),
                multisample: wgpu::MultisampleState {
                    count: self.desc.sample_count,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview_mask: None,
                cache: None,
            });

        self.handle = Some(pipeline);
        self.built_deps = dep_versions;
    }
}
