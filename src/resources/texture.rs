//! Textures
//!
//! A texture resource owns its native texture plus a default view created
//! alongside it. Resizing drops both and advances the version counter so
//! bind groups re-derive their handle from the new texture on next build.

use crate::context::WgpuContext;
use crate::errors::{CinderError, Result};
use crate::resources::{BindingShape, GpuResource, ResourceState};

/// Texture descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    pub format: wgpu::TextureFormat,
    pub dimension: wgpu::TextureDimension,
    /// View dimension bindings observe (`D2`, `Cube`, …)
    pub view_dimension: wgpu::TextureViewDimension,
    pub width: u32,
    pub height: u32,
    pub depth_or_array_layers: u32,
    pub mip_level_count: u32,
    pub sample_count: u32,
    pub usage: wgpu::TextureUsages,
}

impl TextureDesc {
    /// A 2D texture with a single mip level.
    #[must_use]
    pub fn d2(width: u32, height: u32, format: wgpu::TextureFormat, usage: wgpu::TextureUsages) -> Self {
        Self {
            format,
            dimension: wgpu::TextureDimension::D2,
            view_dimension: wgpu::TextureViewDimension::D2,
            width,
            height,
            depth_or_array_layers: 1,
            mip_level_count: 1,
            sample_count: 1,
            usage,
        }
    }

    /// A render-attachment + sampled 2D target.
    #[must_use]
    pub fn render_target(width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        Self::d2(
            width,
            height,
            format,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        )
    }

    /// The sample type bindings observe for this format.
    #[must_use]
    pub fn sample_type(&self) -> wgpu::TextureSampleType {
        match self.format {
            wgpu::TextureFormat::Depth16Unorm
            | wgpu::TextureFormat::Depth24Plus
            | wgpu::TextureFormat::Depth24PlusStencil8
            | wgpu::TextureFormat::Depth32Float
            | wgpu::TextureFormat::Depth32FloatStencil8 => wgpu::TextureSampleType::Depth,
            wgpu::TextureFormat::R8Uint
            | wgpu::TextureFormat::R16Uint
            | wgpu::TextureFormat::R32Uint
            | wgpu::TextureFormat::Rg8Uint
            | wgpu::TextureFormat::Rg16Uint
            | wgpu::TextureFormat::Rg32Uint
            | wgpu::TextureFormat::Rgba8Uint
            | wgpu::TextureFormat::Rgba16Uint
            | wgpu::TextureFormat::Rgba32Uint => wgpu::TextureSampleType::Uint,
            wgpu::TextureFormat::R8Sint
            | wgpu::TextureFormat::R16Sint
            | wgpu::TextureFormat::R32Sint
            | wgpu::TextureFormat::Rg8Sint
            | wgpu::TextureFormat::Rg16Sint
            | wgpu::TextureFormat::Rg32Sint
            | wgpu::TextureFormat::Rgba8Sint
            | wgpu::TextureFormat::Rgba16Sint
            | wgpu::TextureFormat::Rgba32Sint => wgpu::TextureSampleType::Sint,
            _ => wgpu::TextureSampleType::Float { filterable: true },
        }
    }
}

/// A texture resource.
pub struct TextureResource {
    desc: TextureDesc,
    state: ResourceState,
    handle: Option<wgpu::Texture>,
    default_view: Option<wgpu::TextureView>,
}

impl TextureResource {
    #[must_use]
    pub fn new(desc: TextureDesc) -> Self {
        Self {
            desc,
            state: ResourceState::default(),
            handle: None,
            default_view: None,
        }
    }

    /// The descriptor.
    #[must_use]
    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    /// Current dimensions.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.desc.width, self.desc.height)
    }

    /// The native handle, if built.
    #[must_use]
    pub fn texture(&self) -> Option<&wgpu::Texture> {
        self.handle.as_ref()
    }

    /// The default view, if built.
    #[must_use]
    pub fn view(&self) -> Option<&wgpu::TextureView> {
        self.default_view.as_ref()
    }

    /// Rebuilds at new surface dimensions.
    ///
    /// A resize to the current dimensions is a no-op, so one canvas resize
    /// produces exactly one version advance per dependent texture.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.desc.width && height == self.desc.height {
            return;
        }
        self.desc.width = width;
        self.desc.height = height;
        self.destroy();
        self.state.invalidated();
    }

    /// Changes the texture format, dropping the native handle.
    pub fn set_format(&mut self, format: wgpu::TextureFormat) {
        if format == self.desc.format {
            return;
        }
        self.desc.format = format;
        self.destroy();
        self.state.invalidated();
    }

    /// Uploads pixel data for mip level 0.
    pub fn write(&self, ctx: &WgpuContext, name: &str, data: &[u8], bytes_per_row: u32) -> Result<()> {
        let texture = self.handle.as_ref().ok_or_else(|| CinderError::NotBuilt {
            name: name.to_string(),
        })?;
        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(self.desc.height),
            },
            wgpu::Extent3d {
                width: self.desc.width,
                height: self.desc.height,
                depth_or_array_layers: self.desc.depth_or_array_layers,
            },
        );
        Ok(())
    }
}

impl GpuResource for TextureResource {
    fn validate(&self) -> std::result::Result<(), String> {
        let d = &self.desc;
        if d.width == 0 || d.height == 0 || d.depth_or_array_layers == 0 {
            return Err(format!(
                "texture dimensions must be non-zero (got {}x{}x{})",
                d.width, d.height, d.depth_or_array_layers
            ));
        }
        if d.mip_level_count == 0 {
            return Err("mip level count must be at least 1".to_string());
        }
        if d.sample_count == 0 {
            return Err("sample count must be at least 1".to_string());
        }
        if d.usage.is_empty() {
            return Err("texture usage flags must not be empty".to_string());
        }
        Ok(())
    }

    fn build(&mut self, ctx: &WgpuContext, label: &str) {
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: self.desc.width,
                height: self.desc.height,
                depth_or_array_layers: self.desc.depth_or_array_layers,
            },
            mip_level_count: self.desc.mip_level_count,
            sample_count: self.desc.sample_count,
            dimension: self.desc.dimension,
            format: self.desc.format,
            usage: self.desc.usage,
            view_formats: &[],
        });
        self.default_view = Some(texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(self.desc.view_dimension),
            ..Default::default()
        }));
        self.handle = Some(texture);
    }

    fn destroy(&mut self) {
        self.default_view = None;
        if let Some(texture) = self.handle.take() {
            texture.destroy();
        }
    }

    fn is_built(&self) -> bool {
        self.handle.is_some()
    }

    fn binding_shape(&self) -> Option<BindingShape> {
        Some(BindingShape::Texture)
    }

    fn version(&self) -> u64 {
        self.state.version()
    }
}
