//! Graphics device capability surface for Vermilion.
//!
//! This crate defines the narrow interface the renderer consumes from the
//! GPU driver, plus the infrastructure to test against it without a GPU:
//!
//! - [`RenderDevice`] - trait abstracting buffer/texture/program creation
//!   and draw submission
//! - Handle wrappers ([`DeviceBuffer`], [`DeviceTexture`], [`DeviceProgram`])
//!   that can be real or mock
//! - `MockDevice` - recording implementation for tests (requires the `mock`
//!   feature)
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use vermilion_device::{BufferDescriptor, BufferKind, BufferUsage, MockDevice, RenderDevice};
//!
//! let mock = MockDevice::new();
//!
//! let buffer = mock.create_buffer(&BufferDescriptor {
//!     label: Some("test_buffer"),
//!     size: 1024,
//!     kind: BufferKind::Vertex,
//!     usage: BufferUsage::Stream,
//! });
//! mock.write_buffer(&buffer, 0, &[0u8; 16]);
//!
//! assert_eq!(mock.count_buffer_creates(), 1);
//! assert!(buffer.is_mock());
//! # }
//! ```
//!
//! # Design Philosophy
//!
//! All handle types are owned and reference counted internally, so no
//! lifetime parameters propagate through the renderer. Trait methods take
//! `&self`; implementations that need to mutate state (the mock's call log,
//! the wgpu backend's in-flight frame) use interior mutability. The trait is
//! object-safe so the renderer can hold an `Arc<dyn RenderDevice>` and be
//! driven by either backend.

pub mod device;
pub mod handles;
#[cfg(feature = "mock")]
pub mod mock_device;

pub use device::*;
pub use handles::*;
#[cfg(feature = "mock")]
pub use mock_device::*;
