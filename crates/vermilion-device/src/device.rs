//! Trait abstracting the GPU driver surface the renderer consumes.
//!
//! The renderer never talks to `wgpu` directly; everything goes through
//! [`RenderDevice`], which has a real backend (in `vermilion-render`) and a
//! mock backend (this crate, `mock` feature) that records operations.

use glam::Mat4;
use vermilion_core::Color;

use crate::handles::{DeviceBuffer, DeviceProgram, DeviceTexture};

/// What a buffer binds as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// Usage hint for a buffer's upload pattern.
///
/// Advisory only: backends may map all hints to the same allocation strategy
/// (the wgpu backend does), but the hint is recorded so callers can express
/// whether data is immutable, occasionally updated, or re-uploaded per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    Static,
    Dynamic,
    Stream,
}

/// Descriptor for creating a device buffer.
#[derive(Debug, Clone)]
pub struct BufferDescriptor<'a> {
    pub label: Option<&'a str>,
    /// Capacity in bytes.
    pub size: u64,
    pub kind: BufferKind,
    pub usage: BufferUsage,
}

/// Texture sampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Texture addressing outside the `0..1` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapMode {
    Clamp,
    Repeat,
}

/// Sampling options attached to a texture at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureOptions {
    pub filter: FilterMode,
    pub wrap: WrapMode,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            filter: FilterMode::Linear,
            wrap: WrapMode::Clamp,
        }
    }
}

/// Descriptor for creating a 2D RGBA texture.
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    pub label: Option<&'a str>,
    pub width: u32,
    pub height: u32,
    pub options: TextureOptions,
}

/// Per-attribute format within a vertex stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Float32,
    Float32x2,
    Float32x3,
    Float32x4,
    Sint32,
    Uint32,
}

impl VertexFormat {
    /// Size of one attribute of this format in bytes.
    pub fn size(&self) -> u64 {
        match self {
            VertexFormat::Float32 | VertexFormat::Sint32 | VertexFormat::Uint32 => 4,
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 => 16,
        }
    }

    /// The equivalent wgpu vertex format.
    pub fn to_wgpu(self) -> wgpu::VertexFormat {
        match self {
            VertexFormat::Float32 => wgpu::VertexFormat::Float32,
            VertexFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
            VertexFormat::Float32x3 => wgpu::VertexFormat::Float32x3,
            VertexFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
            VertexFormat::Sint32 => wgpu::VertexFormat::Sint32,
            VertexFormat::Uint32 => wgpu::VertexFormat::Uint32,
        }
    }
}

/// One attribute within a vertex stream.
#[derive(Debug, Clone, Copy)]
pub struct VertexAttribute {
    /// Shader attribute location.
    pub location: u32,
    pub format: VertexFormat,
    /// Byte offset within the stream's stride.
    pub offset: u64,
}

/// One vertex buffer's layout as the pipeline sees it.
#[derive(Debug, Clone)]
pub struct VertexStream {
    pub stride: u64,
    /// Advance per instance instead of per vertex.
    pub per_instance: bool,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexStream {
    /// The attributes converted to wgpu form, for pipeline construction.
    pub fn wgpu_attributes(&self) -> Vec<wgpu::VertexAttribute> {
        self.attributes
            .iter()
            .map(|attr| wgpu::VertexAttribute {
                format: attr.format.to_wgpu(),
                offset: attr.offset,
                shader_location: attr.location,
            })
            .collect()
    }
}

/// Primitive topology of a draw submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    Triangles,
    Lines,
}

impl Topology {
    pub fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
            Topology::Lines => wgpu::PrimitiveTopology::LineList,
        }
    }
}

/// Descriptor for compiling and linking one shader program.
///
/// A program is one WGSL source with a `vs_main`/`fs_main` pair, a fixed set
/// of vertex streams, and a single `mat4x4<f32>` uniform at group 0 binding 0
/// (the view-projection matrix). Backends build one pipeline per requested
/// topology, since topology is baked into modern pipelines.
#[derive(Debug, Clone)]
pub struct ProgramDescriptor<'a> {
    pub label: Option<&'a str>,
    /// WGSL source.
    pub source: &'a str,
    /// Vertex streams in bind-slot order.
    pub streams: &'a [VertexStream],
    /// Topologies this program may be drawn with.
    pub topologies: &'a [Topology],
    /// Whether the program samples a texture at group 1.
    pub samples_texture: bool,
}

/// A non-indexed draw submission.
#[derive(Clone, Copy)]
pub struct DrawCall<'a> {
    pub program: &'a DeviceProgram,
    pub topology: Topology,
    /// Vertex buffers in bind-slot order, matching the program's streams.
    pub vertex_buffers: &'a [&'a DeviceBuffer],
    pub vertex_count: u32,
    pub view_projection: Mat4,
}

/// An indexed, instanced draw submission.
#[derive(Clone, Copy)]
pub struct InstancedDrawCall<'a> {
    pub program: &'a DeviceProgram,
    pub topology: Topology,
    /// Vertex buffers in bind-slot order, matching the program's streams.
    pub vertex_buffers: &'a [&'a DeviceBuffer],
    pub index_buffer: &'a DeviceBuffer,
    pub index_count: u32,
    pub instance_count: u32,
    pub texture: &'a DeviceTexture,
    pub view_projection: Mat4,
}

/// Trait abstracting GPU resource creation and draw submission.
///
/// Methods take `&self` and return owned handle wrappers, so multiple
/// components can share one device via `Arc` and mock implementations can
/// record calls through interior mutability. The trait is object-safe.
///
/// All submission methods (`begin_frame`, `draw`, `draw_instanced`,
/// `end_frame`) must be called from the thread that owns the device context;
/// nothing in this surface is safe for concurrent submission.
pub trait RenderDevice: Send + Sync {
    /// Whether the underlying device context is live.
    ///
    /// A `false` return is the recoverable initialization-failure condition:
    /// callers stay inert and may retry later.
    fn acquire(&self) -> bool;

    /// Apply the viewport for subsequent frames.
    fn set_viewport(&self, width: u32, height: u32);

    /// Create a buffer of the descriptor's byte capacity.
    fn create_buffer(&self, desc: &BufferDescriptor<'_>) -> DeviceBuffer;

    /// Write `data` into `buffer` at `offset` bytes.
    ///
    /// Writes past the buffer's capacity are a caller error; capacity growth
    /// is handled above this surface by recreating the buffer.
    fn write_buffer(&self, buffer: &DeviceBuffer, offset: u64, data: &[u8]);

    /// Create a 2D RGBA texture. The returned handle carries a stable
    /// identity id used for sprite grouping.
    fn create_texture(&self, desc: &TextureDescriptor<'_>) -> DeviceTexture;

    /// Upload raw RGBA8 pixels covering the whole texture.
    fn write_texture(&self, texture: &DeviceTexture, data: &[u8]);

    /// Compile and link a program. `None` signals a compile/link failure.
    fn create_program(&self, desc: &ProgramDescriptor<'_>) -> Option<DeviceProgram>;

    /// Start a frame: clear the target to `clear_color`.
    fn begin_frame(&self, clear_color: Color);

    /// Submit one non-indexed draw.
    fn draw(&self, call: &DrawCall<'_>);

    /// Submit one indexed, instanced draw.
    fn draw_instanced(&self, call: &InstancedDrawCall<'_>);

    /// Finish the frame and hand the recorded work to the driver.
    fn end_frame(&self);
}
