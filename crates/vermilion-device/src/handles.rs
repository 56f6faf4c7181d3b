//! GPU resource handle wrappers that can be real or mock.
//!
//! These types hide whether they contain live wgpu resources or mock ids,
//! so the renderer is oblivious to which backend is driving it.

use std::sync::Arc;

use crate::device::Topology;

/// Wrapper around a GPU buffer that can be real or mock.
///
/// Users hold owned `DeviceBuffer`s; cloning is cheap (wgpu buffers are
/// reference counted internally, mocks are plain ids).
#[derive(Clone, Debug)]
pub struct DeviceBuffer {
    inner: DeviceBufferInner,
}

#[derive(Clone, Debug)]
enum DeviceBufferInner {
    Real(wgpu::Buffer),
    #[cfg(feature = "mock")]
    Mock { id: usize, size: u64 },
}

impl DeviceBuffer {
    /// Create from a real wgpu buffer.
    pub fn from_wgpu(buffer: wgpu::Buffer) -> Self {
        Self {
            inner: DeviceBufferInner::Real(buffer),
        }
    }

    /// Create a mock buffer (for testing).
    #[cfg(feature = "mock")]
    pub fn mock(id: usize, size: u64) -> Self {
        Self {
            inner: DeviceBufferInner::Mock { id, size },
        }
    }

    /// Capacity of the buffer in bytes.
    pub fn size(&self) -> u64 {
        match &self.inner {
            DeviceBufferInner::Real(buffer) => buffer.size(),
            #[cfg(feature = "mock")]
            DeviceBufferInner::Mock { size, .. } => *size,
        }
    }

    /// Get the underlying `wgpu::Buffer`.
    ///
    /// # Panics
    /// Panics if this is a mock buffer (test code should never call this).
    pub fn as_wgpu(&self) -> &wgpu::Buffer {
        match &self.inner {
            DeviceBufferInner::Real(buffer) => buffer,
            #[cfg(feature = "mock")]
            DeviceBufferInner::Mock { .. } => {
                panic!("Attempted to get wgpu::Buffer from mock buffer")
            }
        }
    }

    /// Check if this is a mock (useful in tests).
    #[cfg(feature = "mock")]
    pub fn is_mock(&self) -> bool {
        matches!(self.inner, DeviceBufferInner::Mock { .. })
    }

    /// Get the mock id (for test assertions).
    #[cfg(feature = "mock")]
    pub fn mock_id(&self) -> Option<usize> {
        match &self.inner {
            DeviceBufferInner::Mock { id, .. } => Some(*id),
            _ => None,
        }
    }
}

/// Wrapper around a GPU texture that can be real or mock.
///
/// Every texture carries a stable `id` assigned at creation. The id is the
/// texture's identity for batching purposes: sprite instances are grouped by
/// it, and bind groups are cached against it.
#[derive(Clone, Debug)]
pub struct DeviceTexture {
    id: u64,
    inner: DeviceTextureInner,
}

#[derive(Clone, Debug)]
enum DeviceTextureInner {
    Real {
        texture: wgpu::Texture,
        view: Arc<wgpu::TextureView>,
    },
    #[cfg(feature = "mock")]
    Mock { width: u32, height: u32 },
}

impl DeviceTexture {
    /// Create from a real wgpu texture and its default view.
    pub fn from_wgpu(id: u64, texture: wgpu::Texture, view: wgpu::TextureView) -> Self {
        Self {
            id,
            inner: DeviceTextureInner::Real {
                texture,
                view: Arc::new(view),
            },
        }
    }

    /// Create a mock texture (for testing).
    #[cfg(feature = "mock")]
    pub fn mock(id: u64, width: u32, height: u32) -> Self {
        Self {
            id,
            inner: DeviceTextureInner::Mock { width, height },
        }
    }

    /// Stable identity id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Texture width in pixels.
    pub fn width(&self) -> u32 {
        match &self.inner {
            DeviceTextureInner::Real { texture, .. } => texture.width(),
            #[cfg(feature = "mock")]
            DeviceTextureInner::Mock { width, .. } => *width,
        }
    }

    /// Texture height in pixels.
    pub fn height(&self) -> u32 {
        match &self.inner {
            DeviceTextureInner::Real { texture, .. } => texture.height(),
            #[cfg(feature = "mock")]
            DeviceTextureInner::Mock { height, .. } => *height,
        }
    }

    /// Get the underlying `wgpu::Texture`.
    ///
    /// # Panics
    /// Panics if this is a mock texture.
    pub fn as_wgpu(&self) -> &wgpu::Texture {
        match &self.inner {
            DeviceTextureInner::Real { texture, .. } => texture,
            #[cfg(feature = "mock")]
            DeviceTextureInner::Mock { .. } => {
                panic!("Attempted to get wgpu::Texture from mock texture")
            }
        }
    }

    /// Get the texture's default view.
    ///
    /// # Panics
    /// Panics if this is a mock texture.
    pub fn view(&self) -> &wgpu::TextureView {
        match &self.inner {
            DeviceTextureInner::Real { view, .. } => view,
            #[cfg(feature = "mock")]
            DeviceTextureInner::Mock { .. } => {
                panic!("Attempted to get wgpu::TextureView from mock texture")
            }
        }
    }

    /// Check if this is a mock.
    #[cfg(feature = "mock")]
    pub fn is_mock(&self) -> bool {
        matches!(self.inner, DeviceTextureInner::Mock { .. })
    }
}

/// The live resources behind a compiled program on the wgpu backend.
///
/// One pipeline exists per topology the program was created for, plus the
/// view-projection uniform buffer with its bind group, and (for texturing
/// programs) the bind group layout used to bind textures at group 1.
#[derive(Debug)]
pub struct ProgramData {
    pub pipelines: Vec<(Topology, wgpu::RenderPipeline)>,
    pub uniform_buffer: wgpu::Buffer,
    pub uniform_bind_group: wgpu::BindGroup,
    pub texture_layout: Option<wgpu::BindGroupLayout>,
}

impl ProgramData {
    /// The pipeline built for `topology`, if the program declared it.
    pub fn pipeline_for(&self, topology: Topology) -> Option<&wgpu::RenderPipeline> {
        self.pipelines
            .iter()
            .find(|(t, _)| *t == topology)
            .map(|(_, p)| p)
    }
}

/// Wrapper around a compiled shader program that can be real or mock.
#[derive(Clone, Debug)]
pub struct DeviceProgram {
    inner: DeviceProgramInner,
}

#[derive(Clone, Debug)]
enum DeviceProgramInner {
    Real(Arc<ProgramData>),
    #[cfg(feature = "mock")]
    Mock { id: usize },
}

impl DeviceProgram {
    /// Create from compiled wgpu program resources.
    pub fn from_wgpu(data: ProgramData) -> Self {
        Self {
            inner: DeviceProgramInner::Real(Arc::new(data)),
        }
    }

    /// Create a mock program (for testing).
    #[cfg(feature = "mock")]
    pub fn mock(id: usize) -> Self {
        Self {
            inner: DeviceProgramInner::Mock { id },
        }
    }

    /// Get the underlying program resources.
    ///
    /// # Panics
    /// Panics if this is a mock program.
    pub fn as_wgpu(&self) -> &ProgramData {
        match &self.inner {
            DeviceProgramInner::Real(data) => data,
            #[cfg(feature = "mock")]
            DeviceProgramInner::Mock { .. } => {
                panic!("Attempted to get program resources from mock program")
            }
        }
    }

    /// Check if this is a mock.
    #[cfg(feature = "mock")]
    pub fn is_mock(&self) -> bool {
        matches!(self.inner, DeviceProgramInner::Mock { .. })
    }

    /// Get the mock id (for test assertions).
    #[cfg(feature = "mock")]
    pub fn mock_id(&self) -> Option<usize> {
        match &self.inner {
            DeviceProgramInner::Mock { id } => Some(*id),
            _ => None,
        }
    }
}
