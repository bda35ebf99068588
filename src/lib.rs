//! # cinder
//!
//! A WebGPU resource lifecycle and render-pass dependency core:
//!
//! - [`ResourceRegistry`] — the single authority owning all named GPU-side
//!   objects (buffers, textures, samplers, shaders, bind groups, pipelines)
//!   plus canvas/resize dependency edges.
//! - Lazily built resource kinds with version-counter invalidation.
//! - [`MaterialCache`] — content-addressed deduplication of (shader,
//!   pipeline, bind-group-layout) state.
//! - [`FrameGraph`] — per-pass dependency declaration, validated against
//!   the registry right before each pass executes.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod binding;
pub mod context;
pub mod deferred;
pub mod errors;
pub mod graph;
pub mod material;
pub mod registry;
pub mod resources;

pub use binding::{BindGroup, BindingEntry, BindingKind};
pub use context::{GpuSettings, WgpuContext};
pub use errors::{CinderError, Result};
pub use graph::{DependencyDirection, FrameGraph, PassDependencies, RenderPass};
pub use material::{MaterialCache, MaterialDescriptor, MaterialId, MaterialPipelineDesc};
pub use registry::{CanvasDesc, ResourceCategory, ResourceRegistry};
pub use resources::{
    IndexData, RenderPipelineDesc, Resource, SamplerDesc, ShaderSource, TextureDesc,
    UniformLayout, UniformType, UniformValue, VertexLayout,
};
