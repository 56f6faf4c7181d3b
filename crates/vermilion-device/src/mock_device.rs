//! Mock implementation of [`RenderDevice`] for testing.
//!
//! Records every operation without touching a GPU, so batch grouping, draw
//! counts, and upload sizes can be asserted in plain unit tests.

use parking_lot::Mutex;
use vermilion_core::Color;

use crate::device::{
    BufferDescriptor, BufferKind, BufferUsage, DrawCall, InstancedDrawCall, ProgramDescriptor,
    RenderDevice, TextureDescriptor, Topology,
};
use crate::handles::{DeviceBuffer, DeviceProgram, DeviceTexture};

/// Records a device operation for verification in tests.
#[derive(Debug, Clone)]
pub enum DeviceCall {
    CreateBuffer {
        id: usize,
        size: u64,
        kind: BufferKind,
        usage: BufferUsage,
    },
    WriteBuffer {
        buffer_id: usize,
        offset: u64,
        size: usize,
    },
    CreateTexture {
        id: u64,
        width: u32,
        height: u32,
    },
    WriteTexture {
        texture_id: u64,
        size: usize,
    },
    CreateProgram {
        label: Option<String>,
    },
    SetViewport {
        width: u32,
        height: u32,
    },
    BeginFrame {
        clear_color: Color,
    },
    Draw {
        topology: Topology,
        vertex_count: u32,
    },
    DrawInstanced {
        topology: Topology,
        index_count: u32,
        instance_count: u32,
        texture_id: u64,
    },
    EndFrame,
}

/// Mock implementation of [`RenderDevice`].
///
/// Methods take `&self` but record into internal state, so the call log uses
/// `parking_lot::Mutex` for interior mutability (`Mutex` rather than
/// `RefCell` because the trait requires `Send + Sync`).
///
/// # Example
///
/// ```rust
/// use vermilion_device::{MockDevice, RenderDevice};
///
/// let mock = MockDevice::new();
/// assert!(mock.acquire());
/// mock.set_viewport(640, 480);
/// assert_eq!(mock.call_count(), 1);
///
/// let dead = MockDevice::unavailable();
/// assert!(!dead.acquire());
/// ```
pub struct MockDevice {
    calls: Mutex<Vec<DeviceCall>>,
    next_buffer_id: Mutex<usize>,
    next_texture_id: Mutex<u64>,
    next_program_id: Mutex<usize>,
    available: Mutex<bool>,
    fail_programs: Mutex<bool>,
}

impl MockDevice {
    /// Create a mock device whose context is live.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_buffer_id: Mutex::new(0),
            next_texture_id: Mutex::new(0),
            next_program_id: Mutex::new(0),
            available: Mutex::new(true),
            fail_programs: Mutex::new(false),
        }
    }

    /// Create a mock device that fails acquisition, simulating a lost or
    /// missing GPU context.
    pub fn unavailable() -> Self {
        let mock = Self::new();
        *mock.available.lock() = false;
        mock
    }

    /// Toggle context liveness, e.g. to test recovery after a failed init.
    pub fn set_available(&self, available: bool) {
        *self.available.lock() = available;
    }

    /// Make `create_program` return `None`, simulating link failures.
    pub fn fail_program_creation(&self, fail: bool) {
        *self.fail_programs.lock() = fail;
    }

    /// Snapshot of every recorded call, in order.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.lock().clone()
    }

    /// Total number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Clear recorded calls (useful between test steps).
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Count buffer creations.
    pub fn count_buffer_creates(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, DeviceCall::CreateBuffer { .. }))
            .count()
    }

    /// Count buffer writes.
    pub fn count_buffer_writes(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, DeviceCall::WriteBuffer { .. }))
            .count()
    }

    /// Count program creations.
    pub fn count_program_creates(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, DeviceCall::CreateProgram { .. }))
            .count()
    }

    /// Count draw submissions of both kinds.
    pub fn count_draw_calls(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    DeviceCall::Draw { .. } | DeviceCall::DrawInstanced { .. }
                )
            })
            .count()
    }

    /// All non-instanced draws as `(topology, vertex_count)`, in order.
    pub fn draws(&self) -> Vec<(Topology, u32)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                DeviceCall::Draw {
                    topology,
                    vertex_count,
                } => Some((*topology, *vertex_count)),
                _ => None,
            })
            .collect()
    }

    /// All instanced draws as `(texture_id, instance_count)`, in order.
    pub fn instanced_draws(&self) -> Vec<(u64, u32)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                DeviceCall::DrawInstanced {
                    texture_id,
                    instance_count,
                    ..
                } => Some((*texture_id, *instance_count)),
                _ => None,
            })
            .collect()
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderDevice for MockDevice {
    fn acquire(&self) -> bool {
        *self.available.lock()
    }

    fn set_viewport(&self, width: u32, height: u32) {
        self.calls
            .lock()
            .push(DeviceCall::SetViewport { width, height });
    }

    fn create_buffer(&self, desc: &BufferDescriptor<'_>) -> DeviceBuffer {
        let mut next = self.next_buffer_id.lock();
        let id = *next;
        *next += 1;

        self.calls.lock().push(DeviceCall::CreateBuffer {
            id,
            size: desc.size,
            kind: desc.kind,
            usage: desc.usage,
        });

        DeviceBuffer::mock(id, desc.size)
    }

    fn write_buffer(&self, buffer: &DeviceBuffer, offset: u64, data: &[u8]) {
        if let Some(buffer_id) = buffer.mock_id() {
            self.calls.lock().push(DeviceCall::WriteBuffer {
                buffer_id,
                offset,
                size: data.len(),
            });
        }
    }

    fn create_texture(&self, desc: &TextureDescriptor<'_>) -> DeviceTexture {
        let mut next = self.next_texture_id.lock();
        let id = *next;
        *next += 1;

        self.calls.lock().push(DeviceCall::CreateTexture {
            id,
            width: desc.width,
            height: desc.height,
        });

        DeviceTexture::mock(id, desc.width, desc.height)
    }

    fn write_texture(&self, texture: &DeviceTexture, data: &[u8]) {
        self.calls.lock().push(DeviceCall::WriteTexture {
            texture_id: texture.id(),
            size: data.len(),
        });
    }

    fn create_program(&self, desc: &ProgramDescriptor<'_>) -> Option<DeviceProgram> {
        if *self.fail_programs.lock() {
            return None;
        }

        let mut next = self.next_program_id.lock();
        let id = *next;
        *next += 1;

        self.calls.lock().push(DeviceCall::CreateProgram {
            label: desc.label.map(|label| label.to_string()),
        });

        Some(DeviceProgram::mock(id))
    }

    fn begin_frame(&self, clear_color: Color) {
        self.calls
            .lock()
            .push(DeviceCall::BeginFrame { clear_color });
    }

    fn draw(&self, call: &DrawCall<'_>) {
        self.calls.lock().push(DeviceCall::Draw {
            topology: call.topology,
            vertex_count: call.vertex_count,
        });
    }

    fn draw_instanced(&self, call: &InstancedDrawCall<'_>) {
        self.calls.lock().push(DeviceCall::DrawInstanced {
            topology: call.topology,
            index_count: call.index_count,
            instance_count: call.instance_count,
            texture_id: call.texture.id(),
        });
    }

    fn end_frame(&self) {
        self.calls.lock().push(DeviceCall::EndFrame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_buffer_lifecycle() {
        let mock = MockDevice::new();
        let buffer = mock.create_buffer(&BufferDescriptor {
            label: Some("verts"),
            size: 256,
            kind: BufferKind::Vertex,
            usage: BufferUsage::Stream,
        });
        mock.write_buffer(&buffer, 0, &[0u8; 64]);

        assert_eq!(mock.count_buffer_creates(), 1);
        assert_eq!(mock.count_buffer_writes(), 1);
        assert_eq!(buffer.mock_id(), Some(0));
        assert_eq!(buffer.size(), 256);
    }

    #[test]
    fn test_texture_ids_are_distinct() {
        let mock = MockDevice::new();
        let desc = TextureDescriptor {
            label: None,
            width: 4,
            height: 4,
            options: Default::default(),
        };
        let first = mock.create_texture(&desc);
        let second = mock.create_texture(&desc);
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_unavailable_device() {
        let mock = MockDevice::unavailable();
        assert!(!mock.acquire());
        mock.set_available(true);
        assert!(mock.acquire());
    }

    #[test]
    fn test_program_failure_toggle() {
        let mock = MockDevice::new();
        mock.fail_program_creation(true);
        let desc = ProgramDescriptor {
            label: Some("poly"),
            source: "",
            streams: &[],
            topologies: &[Topology::Triangles],
            samples_texture: false,
        };
        assert!(mock.create_program(&desc).is_none());
        mock.fail_program_creation(false);
        assert!(mock.create_program(&desc).is_some());
    }
}
