//! Samplers

use crate::context::WgpuContext;
use crate::resources::{BindingShape, GpuResource, ResourceState};

/// Sampler descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerDesc {
    pub mag_filter: wgpu::FilterMode,
    pub min_filter: wgpu::FilterMode,
    pub mipmap_filter: wgpu::FilterMode,
    pub address_mode: wgpu::AddressMode,
    /// Depth-comparison mode; turns the sampler into a comparison sampler
    pub compare: Option<wgpu::CompareFunction>,
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self {
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            address_mode: wgpu::AddressMode::ClampToEdge,
            compare: None,
        }
    }
}

impl SamplerDesc {
    /// Nearest-neighbor preset, used for the placeholder sampler.
    #[must_use]
    pub fn nearest() -> Self {
        Self {
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            address_mode: wgpu::AddressMode::ClampToEdge,
            compare: None,
        }
    }

    /// The binding type bind-group layouts observe for this sampler.
    #[must_use]
    pub fn binding_type(&self) -> wgpu::SamplerBindingType {
        if self.compare.is_some() {
            wgpu::SamplerBindingType::Comparison
        } else if self.mag_filter == wgpu::FilterMode::Nearest
            && self.min_filter == wgpu::FilterMode::Nearest
        {
            wgpu::SamplerBindingType::NonFiltering
        } else {
            wgpu::SamplerBindingType::Filtering
        }
    }
}

/// A sampler resource.
pub struct SamplerResource {
    desc: SamplerDesc,
    state: ResourceState,
    handle: Option<wgpu::Sampler>,
}

impl SamplerResource {
    #[must_use]
    pub fn new(desc: SamplerDesc) -> Self {
        Self {
            desc,
            state: ResourceState::default(),
            handle: None,
        }
    }

    /// The descriptor.
    #[must_use]
    pub fn desc(&self) -> &SamplerDesc {
        &self.desc
    }

    /// The native handle, if built.
    #[must_use]
    pub fn handle(&self) -> Option<&wgpu::Sampler> {
        self.handle.as_ref()
    }
}

impl GpuResource for SamplerResource {
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }

    fn build(&mut self, ctx: &WgpuContext, label: &str) {
        self.handle = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: self.desc.address_mode,
            address_mode_v: self.desc.address_mode,
            address_mode_w: self.desc.address_mode,
            mag_filter: self.desc.mag_filter,
            min_filter: self.desc.min_filter,
            mipmap_filter: match self.desc.mipmap_filter {
                wgpu::FilterMode::Nearest => wgpu::MipmapFilterMode::Nearest,
                wgpu::FilterMode::Linear => wgpu::MipmapFilterMode::Linear,
            },
            compare: self.desc.compare,
            ..Default::default()
        }));
    }

    fn destroy(&mut self) {
        self.handle = None;
    }

    fn is_built(&self) -> bool {
        self.handle.is_some()
    }

    fn binding_shape(&self) -> Option<BindingShape> {
        Some(BindingShape::Sampler)
    }

    fn version(&self) -> u64 {
        self.state.version()
    }
}
