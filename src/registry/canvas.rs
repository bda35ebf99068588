//! Canvas bindings
//!
//! A canvas is a named presentation surface owned by the embedding UI
//! layer. The registry never touches swapchains directly — the UI supplies
//! device-pixel dimensions through the resize contract and the registry
//! fans the notification out to dependent resources.

/// Callback invoked with device-pixel dimensions.
pub type CanvasCallback = Box<dyn FnMut(u32, u32)>;

/// Descriptor for registering a canvas.
pub struct CanvasDesc {
    pub width: u32,
    pub height: u32,
    /// Preferred surface format
    pub format: wgpu::TextureFormat,
    /// Invoked once, when the canvas is registered
    pub on_ready: Option<CanvasCallback>,
    /// Invoked on every resize, before dependents are notified
    pub on_resize: Option<CanvasCallback>,
}

impl CanvasDesc {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: wgpu::TextureFormat::Bgra8UnormSrgb,
            on_ready: None,
            on_resize: None,
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn on_ready(mut self, callback: impl FnMut(u32, u32) + 'static) -> Self {
        self.on_ready = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_resize(mut self, callback: impl FnMut(u32, u32) + 'static) -> Self {
        self.on_resize = Some(Box::new(callback));
        self
    }
}

/// A registered canvas.
pub struct Canvas {
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    on_resize: Option<CanvasCallback>,
}

impl Canvas {
    pub(crate) fn new(width: u32, height: u32, format: wgpu::TextureFormat, on_resize: Option<CanvasCallback>) -> Self {
        Self {
            width,
            height,
            format,
            on_resize,
        }
    }

    /// Current device-pixel dimensions.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Preferred surface format.
    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Records new dimensions and fires the resize callback.
    pub(crate) fn resized(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        if let Some(callback) = &mut self.on_resize {
            callback(width, height);
        }
    }
}
