//! wgpu Context
//!
//! The [`WgpuContext`] holds the core GPU handles: device and queue. It is
//! constructed once and passed by reference into every component that needs
//! to materialize GPU objects — there is no global device singleton.
//!
//! The context is presentation-agnostic: surfaces and swapchains belong to
//! the embedding UI layer, which talks to the registry through the canvas
//! contract (names and device-pixel sizes only).

use crate::errors::{CinderError, Result};

/// GPU bootstrap settings.
#[derive(Debug, Clone)]
pub struct GpuSettings {
    /// Adapter selection preference
    pub power_preference: wgpu::PowerPreference,
    /// Features the device must support
    pub required_features: wgpu::Features,
    /// Limits the device must support
    pub required_limits: wgpu::Limits,
}

impl Default for GpuSettings {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}

/// Core wgpu context holding GPU handles.
///
/// This struct owns the fundamental wgpu resources needed by the registry:
/// - `device`: GPU device for resource creation
/// - `queue`: Command submission queue
pub struct WgpuContext {
    /// The wgpu device for GPU operations
    pub device: wgpu::Device,
    /// The command queue for submitting work
    pub queue: wgpu::Queue,
    /// Information about the selected adapter
    pub adapter_info: wgpu::AdapterInfo,
}

impl WgpuContext {
    /// Requests an adapter and device matching `settings`.
    pub async fn request(settings: &GpuSettings) -> Result<Self> {
        let instance = wgpu::Instance::default();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| CinderError::AdapterRequestFailed(e.to_string()))?;

        let adapter_info = adapter.get_info();
        log::info!(
            "GPU adapter: {} ({:?})",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Cinder Device"),
                required_features: settings.required_features,
                required_limits: settings.required_limits.clone(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        Ok(Self {
            device,
            queue,
            adapter_info,
        })
    }

    /// Blocking wrapper around [`WgpuContext::request`] for non-async
    /// entry points (tests, CLI tools).
    pub fn request_blocking(settings: &GpuSettings) -> Result<Self> {
        pollster::block_on(Self::request(settings))
    }
}
