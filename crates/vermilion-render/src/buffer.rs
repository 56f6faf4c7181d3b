//! Typed GPU buffer resources and attribute layouts.
//!
//! A [`VertexBuffer`] owns a device buffer handle plus a [`BufferLayout`]
//! describing how its bytes map to shader attributes. Writing more data than
//! the buffer's capacity reallocates the device buffer (the handle is
//! regenerated), so batch flushes never have to care about fitting.

use std::sync::Arc;

use vermilion_device::{
    BufferDescriptor, BufferKind, BufferUsage, DeviceBuffer, RenderDevice, VertexAttribute,
    VertexFormat, VertexStream,
};

use crate::pool::{PoolToken, ResourceKind, ResourcePool};

/// Primitive type of a buffer element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Float,
    Int,
    Bool,
}

impl ElementKind {
    /// Size of one component in bytes. All kinds are 32-bit on the wire.
    pub fn component_size(&self) -> u64 {
        4
    }
}

/// One attribute within a buffer layout.
#[derive(Debug, Clone)]
pub struct BufferElement {
    pub name: String,
    pub kind: ElementKind,
    /// Number of components (1-4).
    pub count: u32,
    pub normalized: bool,
    /// Advance per instance instead of per vertex.
    pub per_instance: bool,
}

impl BufferElement {
    pub fn new(name: impl Into<String>, kind: ElementKind, count: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            count,
            normalized: false,
            per_instance: false,
        }
    }

    /// Mark the element as a per-instance attribute.
    pub fn per_instance(mut self) -> Self {
        self.per_instance = true;
        self
    }

    /// Size of the element in bytes.
    pub fn size(&self) -> u64 {
        self.kind.component_size() * self.count as u64
    }

    fn format(&self) -> VertexFormat {
        match (self.kind, self.count) {
            (ElementKind::Float, 1) => VertexFormat::Float32,
            (ElementKind::Float, 2) => VertexFormat::Float32x2,
            (ElementKind::Float, 3) => VertexFormat::Float32x3,
            (ElementKind::Float, 4) => VertexFormat::Float32x4,
            (ElementKind::Int, _) => VertexFormat::Sint32,
            (ElementKind::Bool, _) => VertexFormat::Uint32,
            (ElementKind::Float, count) => {
                tracing::warn!("Unsupported float component count {}", count);
                VertexFormat::Float32x4
            }
        }
    }
}

/// Ordered attribute layout of one vertex buffer.
///
/// The stride is recomputed on every [`push`](BufferLayout::push). Once the
/// owning buffer has uploaded data, the layout must not change stride; this
/// is a caller contract, not checked at runtime.
#[derive(Debug, Clone, Default)]
pub struct BufferLayout {
    elements: Vec<BufferElement>,
    /// First shader attribute location this buffer binds at. Non-zero for
    /// auxiliary streams bound after the primary vertex buffer.
    pub starting_index: u32,
    stride: u64,
}

impl BufferLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element and recompute the stride.
    pub fn push(&mut self, element: BufferElement) {
        self.stride += element.size();
        self.elements.push(element);
    }

    /// Current stride in bytes.
    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// The elements in declaration order.
    pub fn elements(&self) -> &[BufferElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Convert to the device-level stream description.
    ///
    /// Elements get consecutive attribute locations starting at
    /// `starting_index`; the stream steps per instance when its elements are
    /// marked per-instance (mixed flags within one buffer are not supported
    /// and resolve to the first element's flag).
    pub fn to_stream(&self) -> VertexStream {
        let per_instance = self
            .elements
            .first()
            .map(|element| element.per_instance)
            .unwrap_or(false);
        if self
            .elements
            .iter()
            .any(|element| element.per_instance != per_instance)
        {
            tracing::warn!("Mixed per-instance flags within one buffer layout");
        }

        let mut offset = 0;
        let attributes = self
            .elements
            .iter()
            .enumerate()
            .map(|(index, element)| {
                let attribute = VertexAttribute {
                    location: self.starting_index + index as u32,
                    format: element.format(),
                    offset,
                };
                offset += element.size();
                attribute
            })
            .collect();

        VertexStream {
            stride: self.stride,
            per_instance,
            attributes,
        }
    }
}

/// A GPU vertex buffer with fixed capacity and an attribute layout.
pub struct VertexBuffer {
    label: String,
    buffer: DeviceBuffer,
    capacity: u64,
    usage: BufferUsage,
    pub layout: BufferLayout,
    _token: PoolToken,
}

impl VertexBuffer {
    /// Create a vertex buffer of `capacity` bytes.
    pub fn new(
        device: &dyn RenderDevice,
        pool: &Arc<ResourcePool>,
        label: impl Into<String>,
        capacity: u64,
        usage: BufferUsage,
    ) -> Self {
        let label = label.into();
        let buffer = device.create_buffer(&BufferDescriptor {
            label: Some(&label),
            size: capacity,
            kind: BufferKind::Vertex,
            usage,
        });

        Self {
            label,
            buffer,
            capacity,
            usage,
            layout: BufferLayout::new(),
            _token: pool.register(ResourceKind::VertexBuffer),
        }
    }

    /// Upload `data` from offset zero, growing the buffer if needed.
    ///
    /// Growth reallocates the device buffer: the handle is regenerated, so
    /// anything caching the old handle must re-fetch it after this call.
    pub fn write(&mut self, device: &dyn RenderDevice, data: &[u8]) {
        if data.len() as u64 > self.capacity {
            tracing::trace!(
                "Growing vertex buffer '{}' from {} to {} bytes",
                self.label,
                self.capacity,
                data.len()
            );
            self.capacity = data.len() as u64;
            self.buffer = device.create_buffer(&BufferDescriptor {
                label: Some(&self.label),
                size: self.capacity,
                kind: BufferKind::Vertex,
                usage: self.usage,
            });
        }
        device.write_buffer(&self.buffer, 0, data);
    }

    /// The current device handle.
    pub fn handle(&self) -> &DeviceBuffer {
        &self.buffer
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// The usage hint the buffer was created with.
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }
}

/// A GPU index buffer (32-bit indices).
pub struct IndexBuffer {
    label: String,
    buffer: DeviceBuffer,
    capacity: u64,
    usage: BufferUsage,
    _token: PoolToken,
}

impl IndexBuffer {
    /// Create an index buffer of `capacity` bytes.
    pub fn new(
        device: &dyn RenderDevice,
        pool: &Arc<ResourcePool>,
        label: impl Into<String>,
        capacity: u64,
        usage: BufferUsage,
    ) -> Self {
        let label = label.into();
        let buffer = device.create_buffer(&BufferDescriptor {
            label: Some(&label),
            size: capacity,
            kind: BufferKind::Index,
            usage,
        });

        Self {
            label,
            buffer,
            capacity,
            usage,
            _token: pool.register(ResourceKind::IndexBuffer),
        }
    }

    /// Upload indices from offset zero, growing the buffer if needed.
    pub fn write(&mut self, device: &dyn RenderDevice, indices: &[u32]) {
        let data: &[u8] = bytemuck::cast_slice(indices);
        if data.len() as u64 > self.capacity {
            tracing::trace!(
                "Growing index buffer '{}' from {} to {} bytes",
                self.label,
                self.capacity,
                data.len()
            );
            self.capacity = data.len() as u64;
            self.buffer = device.create_buffer(&BufferDescriptor {
                label: Some(&self.label),
                size: self.capacity,
                kind: BufferKind::Index,
                usage: self.usage,
            });
        }
        device.write_buffer(&self.buffer, 0, data);
    }

    /// The current device handle.
    pub fn handle(&self) -> &DeviceBuffer {
        &self.buffer
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vermilion_device::MockDevice;

    fn position_color_layout() -> BufferLayout {
        let mut layout = BufferLayout::new();
        layout.push(BufferElement::new("position", ElementKind::Float, 3));
        layout.push(BufferElement::new("color", ElementKind::Float, 4));
        layout
    }

    #[test]
    fn test_stride_recomputed_on_push() {
        let mut layout = BufferLayout::new();
        assert_eq!(layout.stride(), 0);
        layout.push(BufferElement::new("position", ElementKind::Float, 3));
        assert_eq!(layout.stride(), 12);
        layout.push(BufferElement::new("color", ElementKind::Float, 4));
        assert_eq!(layout.stride(), 28);
    }

    #[test]
    fn test_stream_locations_start_at_index() {
        let mut layout = BufferLayout::new();
        layout.push(
            BufferElement::new("crop", ElementKind::Float, 4).per_instance(),
        );
        layout.starting_index = 2;

        let stream = layout.to_stream();
        assert!(stream.per_instance);
        assert_eq!(stream.stride, 16);
        assert_eq!(stream.attributes.len(), 1);
        assert_eq!(stream.attributes[0].location, 2);
    }

    #[test]
    fn test_stream_offsets_accumulate() {
        let stream = position_color_layout().to_stream();
        assert_eq!(stream.attributes[0].offset, 0);
        assert_eq!(stream.attributes[1].offset, 12);
        assert!(!stream.per_instance);
    }

    #[test]
    fn test_write_within_capacity_keeps_handle() {
        let device = MockDevice::new();
        let pool = ResourcePool::new();
        let mut buffer =
            VertexBuffer::new(&device, &pool, "verts", 64, BufferUsage::Stream);
        let id = buffer.handle().mock_id();

        buffer.write(&device, &[0u8; 64]);
        assert_eq!(buffer.handle().mock_id(), id);
        assert_eq!(device.count_buffer_creates(), 1);
    }

    #[test]
    fn test_write_over_capacity_regenerates_handle() {
        let device = MockDevice::new();
        let pool = ResourcePool::new();
        let mut buffer =
            VertexBuffer::new(&device, &pool, "verts", 64, BufferUsage::Stream);
        let id = buffer.handle().mock_id();

        buffer.write(&device, &[0u8; 128]);
        assert_ne!(buffer.handle().mock_id(), id);
        assert_eq!(buffer.capacity(), 128);
        assert_eq!(device.count_buffer_creates(), 2);
    }

    #[test]
    fn test_buffers_register_with_pool() {
        let device = MockDevice::new();
        let pool = ResourcePool::new();
        let vertex = VertexBuffer::new(&device, &pool, "v", 16, BufferUsage::Static);
        let index = IndexBuffer::new(&device, &pool, "i", 16, BufferUsage::Static);
        assert_eq!(pool.count(ResourceKind::VertexBuffer), 1);
        assert_eq!(pool.count(ResourceKind::IndexBuffer), 1);

        drop(vertex);
        drop(index);
        assert!(pool.is_empty());
    }
}
