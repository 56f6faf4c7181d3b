//! Named bundles of buffers describing one drawable unit.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::buffer::{IndexBuffer, VertexBuffer};
use crate::pool::{PoolToken, ResourceKind, ResourcePool};

/// Name of the primary vertex buffer in a [`Renderable`].
pub const MAIN_BUFFER: &str = "main";

/// A drawable unit: named vertex buffers plus at most one index buffer.
///
/// Buffers keep their insertion order, which is also their bind-slot order at
/// draw time, so the order of `add_vertex_buffer` calls must match the
/// program's stream order. Lookups by name return `None` on a miss; callers
/// holding a name contract (the sprite path's `"cropsBuffer"`,
/// `"colorsBuffer"`, `"transformsBuffer"`) treat that as a configuration
/// error fatal to the draw in question.
pub struct Renderable {
    vertex_buffers: IndexMap<String, VertexBuffer>,
    index_buffer: Option<IndexBuffer>,
    _token: PoolToken,
}

impl Renderable {
    /// Create an empty renderable.
    pub fn new(pool: &Arc<ResourcePool>) -> Self {
        Self {
            vertex_buffers: IndexMap::new(),
            index_buffer: None,
            _token: pool.register(ResourceKind::Renderable),
        }
    }

    /// Add a vertex buffer under `name`, replacing any previous buffer with
    /// that name. Returns a mutable reference for layout setup.
    pub fn add_vertex_buffer(
        &mut self,
        name: impl Into<String>,
        buffer: VertexBuffer,
    ) -> &mut VertexBuffer {
        use indexmap::map::Entry;

        match self.vertex_buffers.entry(name.into()) {
            Entry::Occupied(mut entry) => {
                entry.insert(buffer);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(buffer),
        }
    }

    /// Set the index buffer.
    pub fn set_index_buffer(&mut self, buffer: IndexBuffer) {
        self.index_buffer = Some(buffer);
    }

    /// Look up a vertex buffer by name.
    pub fn find_vertex_buffer(&self, name: &str) -> Option<&VertexBuffer> {
        self.vertex_buffers.get(name)
    }

    /// Look up a vertex buffer by name, mutably.
    pub fn find_vertex_buffer_mut(&mut self, name: &str) -> Option<&mut VertexBuffer> {
        self.vertex_buffers.get_mut(name)
    }

    /// The index buffer, if any.
    pub fn index_buffer(&self) -> Option<&IndexBuffer> {
        self.index_buffer.as_ref()
    }

    /// Vertex buffers in bind-slot (insertion) order.
    pub fn vertex_buffers(&self) -> impl Iterator<Item = &VertexBuffer> {
        self.vertex_buffers.values()
    }

    /// Number of vertex buffers.
    pub fn vertex_buffer_count(&self) -> usize {
        self.vertex_buffers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{BufferElement, ElementKind};
    use vermilion_device::{BufferUsage, MockDevice};

    #[test]
    fn test_lookup_by_name() {
        let device = MockDevice::new();
        let pool = ResourcePool::new();
        let mut renderable = Renderable::new(&pool);

        let buffer = VertexBuffer::new(&device, &pool, MAIN_BUFFER, 64, BufferUsage::Stream);
        let main = renderable.add_vertex_buffer(MAIN_BUFFER, buffer);
        main.layout
            .push(BufferElement::new("position", ElementKind::Float, 3));

        assert!(renderable.find_vertex_buffer(MAIN_BUFFER).is_some());
        assert!(renderable.find_vertex_buffer("cropsBuffer").is_none());
    }

    #[test]
    fn test_slot_order_is_insertion_order() {
        let device = MockDevice::new();
        let pool = ResourcePool::new();
        let mut renderable = Renderable::new(&pool);

        for name in ["main", "cropsBuffer", "colorsBuffer", "transformsBuffer"] {
            let buffer = VertexBuffer::new(&device, &pool, name, 16, BufferUsage::Stream);
            renderable.add_vertex_buffer(name, buffer);
        }

        let ids: Vec<_> = renderable
            .vertex_buffers()
            .map(|buffer| buffer.handle().mock_id())
            .collect();
        assert_eq!(ids, vec![Some(0), Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_registers_with_pool() {
        let pool = ResourcePool::new();
        let renderable = Renderable::new(&pool);
        assert_eq!(pool.count(ResourceKind::Renderable), 1);
        drop(renderable);
        assert!(pool.is_empty());
    }
}
