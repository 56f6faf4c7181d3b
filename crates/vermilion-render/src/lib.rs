//! Batched 2D immediate-mode renderer.
//!
//! Client code issues per-frame drawing calls - circles, rectangles, lines,
//! polygons, textured sprites - without touching GPU buffer management. The
//! renderer accumulates the geometry into batches, minimizes draw
//! submissions, and drains everything in a deterministic order once per
//! frame:
//!
//! ```ignore
//! use vermilion_render::*;
//! use glam::Vec3;
//! use vermilion_core::Color;
//!
//! let context = GraphicsContext::new_owned_sync()?;
//! let device = std::sync::Arc::new(WgpuDevice::new(context, 800, 600));
//! let mut renderer = Renderer2D::new(device, 800, 600);
//!
//! renderer.begin();
//! renderer.draw_circle(Vec3::ZERO, 1.0, Color::RED);
//! renderer.draw_rect(Vec3::new(2.0, 0.0, 0.0), 1.0, 1.0, Color::GREEN);
//! let draw_calls = renderer.flush();
//! ```
//!
//! Two batching strategies cover the drawing surface: loose triangles and
//! line segments accumulate into [`PolygonBatch`]es (one for fills, one for
//! strokes), while textured quads accumulate into a [`SpriteBatch`] grouped
//! by texture identity and drawn with GPU instancing. The device itself is
//! consumed through the narrow [`vermilion_device::RenderDevice`] surface,
//! so every piece of this crate can be driven by the mock device in tests.

pub mod buffer;
pub mod camera;
pub mod context;
pub mod device_impl;
pub mod polygon_batch;
pub mod pool;
pub mod renderable;
pub mod renderer;
pub mod shaders;
pub mod sprite_batch;
pub mod texture;

pub use buffer::{BufferElement, BufferLayout, ElementKind, IndexBuffer, VertexBuffer};
pub use camera::OrthographicCamera;
pub use context::{ContextError, GraphicsContext, GraphicsContextDescriptor, RenderTarget};
pub use device_impl::WgpuDevice;
pub use polygon_batch::PolygonBatch;
pub use pool::{PoolToken, ResourceKind, ResourcePool};
pub use renderable::{MAIN_BUFFER, Renderable};
pub use renderer::{
    COLORS_BUFFER, CROPS_BUFFER, DrawStyle, Renderer2D, RendererSettings, TRANSFORMS_BUFFER,
};
pub use shaders::ShaderLibrary;
pub use sprite_batch::{SpriteBatch, SpriteInstance};
pub use texture::Texture;
