//! Graphics context acquisition and the offscreen render target.

use std::sync::Arc;

/// Errors that can occur while acquiring a graphics context.
#[derive(Debug)]
pub enum ContextError {
    /// No suitable GPU adapter was found.
    AdapterNotFound,
    /// The adapter refused to create a device.
    DeviceRequestFailed {
        /// Description of the driver error.
        message: String,
    },
}

impl std::fmt::Display for ContextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextError::AdapterNotFound => {
                write!(f, "No suitable GPU adapter found")
            }
            ContextError::DeviceRequestFailed { message } => {
                write!(f, "Failed to create device: {}", message)
            }
        }
    }
}

impl std::error::Error for ContextError {}

/// A shared graphics context.
///
/// Uses `Arc` for shared ownership: creation returns `Arc<Self>` so the
/// context can be cheaply cloned into the device backend and any resource
/// that outlives a single frame.
pub struct GraphicsContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

/// Descriptor for configuring graphics context creation.
pub struct GraphicsContextDescriptor {
    /// GPU backends to use.
    pub backends: wgpu::Backends,
    /// Power preference for adapter selection.
    pub power_preference: wgpu::PowerPreference,
    /// Whether to force the fallback adapter.
    pub force_fallback_adapter: bool,
    /// Required device limits.
    pub limits: wgpu::Limits,
    /// Optional label for debugging.
    pub label: Option<&'static str>,
}

impl Default for GraphicsContextDescriptor {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            limits: wgpu::Limits::default(),
            label: None,
        }
    }
}

impl GraphicsContextDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the power preference.
    pub fn power_preference(mut self, preference: wgpu::PowerPreference) -> Self {
        self.power_preference = preference;
        self
    }

    /// Set the backends to use.
    pub fn backends(mut self, backends: wgpu::Backends) -> Self {
        self.backends = backends;
        self
    }

    /// Set the device limits.
    pub fn limits(mut self, limits: wgpu::Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the debug label.
    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }
}

impl GraphicsContext {
    /// Creates a new graphics context asynchronously.
    ///
    /// Returns `Err` when no adapter or device can be acquired; callers are
    /// expected to treat that as the recoverable context-unavailable
    /// condition rather than a fatal error.
    pub async fn new_owned() -> Result<Arc<Self>, ContextError> {
        Self::new_owned_with_descriptor(GraphicsContextDescriptor::default()).await
    }

    /// Creates a new graphics context synchronously.
    ///
    /// This blocks the current thread until the context is created.
    pub fn new_owned_sync() -> Result<Arc<Self>, ContextError> {
        pollster::block_on(Self::new_owned())
    }

    /// Creates a new graphics context with a custom descriptor.
    pub async fn new_owned_with_descriptor(
        descriptor: GraphicsContextDescriptor,
    ) -> Result<Arc<Self>, ContextError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: descriptor.backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: descriptor.power_preference,
                compatible_surface: None,
                force_fallback_adapter: descriptor.force_fallback_adapter,
            })
            .await
            .map_err(|_| ContextError::AdapterNotFound)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: descriptor.limits.clone(),
                label: descriptor.label,
                ..Default::default()
            })
            .await
            .map_err(|err| ContextError::DeviceRequestFailed {
                message: err.to_string(),
            })?;

        tracing::info!("Created graphics context: {}", adapter.get_info().name);

        Ok(Arc::new(Self {
            instance,
            adapter,
            device,
            queue,
        }))
    }

    /// Get device info.
    pub fn info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Get the device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Get the queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

/// An offscreen color target the frame is rendered into.
#[derive(Debug)]
pub struct RenderTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
}

impl RenderTarget {
    /// Default color format for render targets.
    pub const DEFAULT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    /// Create a render target of the given pixel size.
    pub fn new(context: &GraphicsContext, width: u32, height: u32) -> Self {
        Self::with_format(context, width, height, Self::DEFAULT_FORMAT)
    }

    /// Create a render target with an explicit color format.
    pub fn with_format(
        context: &GraphicsContext,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = context.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("Render Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            width,
            height,
            format,
        }
    }

    /// Get the color texture.
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// Get the color texture view.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Get the target width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the target height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the color format.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }
}
