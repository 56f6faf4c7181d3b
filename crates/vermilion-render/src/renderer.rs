//! The batched 2D immediate-mode renderer.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use vermilion_core::{Color, TextureRect};
use vermilion_device::{
    BufferUsage, DeviceProgram, DrawCall, InstancedDrawCall, ProgramDescriptor, RenderDevice,
    Topology, VertexStream,
};

use crate::buffer::{BufferElement, ElementKind, IndexBuffer, VertexBuffer};
use crate::polygon_batch::{PolygonBatch, VERTEX_FLOATS};
use crate::pool::ResourcePool;
use crate::renderable::{MAIN_BUFFER, Renderable};
use crate::shaders::{ShaderLibrary, names};
use crate::sprite_batch::SpriteBatch;
use crate::texture::Texture;

/// Name of the per-instance crop rectangle stream.
pub const CROPS_BUFFER: &str = "cropsBuffer";
/// Name of the per-instance tint color stream.
pub const COLORS_BUFFER: &str = "colorsBuffer";
/// Name of the per-instance transform stream.
pub const TRANSFORMS_BUFFER: &str = "transformsBuffer";

/// Triangle fan resolution of [`Renderer2D::draw_circle`].
const CIRCLE_SEGMENTS: u32 = 20;

/// Quad corner indices shared by every sprite instance.
const SPRITE_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// Configuration for [`Renderer2D`].
#[derive(Debug, Clone)]
pub struct RendererSettings {
    /// Vertices per polygon draw submission.
    pub polygon_batch_capacity: usize,
    /// Instances per sprite draw submission.
    pub sprite_batch_capacity: usize,
    /// Side length of the quad drawn by [`Renderer2D::draw_point`], in world
    /// units.
    pub point_size: f32,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            polygon_batch_capacity: 2000,
            sprite_batch_capacity: 2000,
            point_size: 1.0,
        }
    }
}

/// How shape-drawing calls are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStyle {
    /// Solid triangles.
    Fill,
    /// Outline line segments.
    Stroke,
}

/// Batched 2D renderer.
///
/// Accumulates per-frame drawing calls into batches and drains them with a
/// single [`flush`](Renderer2D::flush) per frame. The flush order is fixed:
/// sprites, then filled polygons, then stroked polygons. Sprites therefore
/// always render beneath polygons flushed the same frame regardless of call
/// order; this is the renderer's layering contract, not an accident of
/// implementation.
///
/// All calls must happen on the thread owning the graphics device, strictly
/// between [`begin`](Renderer2D::begin) and [`flush`](Renderer2D::flush).
pub struct Renderer2D {
    device: Arc<dyn RenderDevice>,
    pool: Arc<ResourcePool>,
    settings: RendererSettings,
    width: u32,
    height: u32,
    initialized: bool,
    clear_color: Color,
    style: DrawStyle,
    shader_library: ShaderLibrary,
    // Batches
    fill_batch: PolygonBatch,
    sprite_batch: SpriteBatch,
    stroke_batch: PolygonBatch,
    // Matrices
    projection: Mat4,
    view: Mat4,
    view_projection: Mat4,
    // Renderables
    polygon_renderable: Option<Renderable>,
    sprite_renderable: Option<Renderable>,
    // Programs
    color_program: Option<DeviceProgram>,
    polygon_program: Option<DeviceProgram>,
    sprite_program: Option<DeviceProgram>,
}

impl Renderer2D {
    /// Create a renderer over `device` with the given viewport size.
    ///
    /// GPU resources are not touched until the first
    /// [`begin`](Renderer2D::begin) (or an explicit
    /// [`init`](Renderer2D::init)).
    pub fn new(device: Arc<dyn RenderDevice>, width: u32, height: u32) -> Self {
        Self::with_settings(device, width, height, RendererSettings::default())
    }

    /// Create a renderer with custom batch capacities.
    pub fn with_settings(
        device: Arc<dyn RenderDevice>,
        width: u32,
        height: u32,
        settings: RendererSettings,
    ) -> Self {
        Self {
            device,
            pool: ResourcePool::new(),
            width,
            height,
            initialized: false,
            clear_color: Color::BLACK,
            style: DrawStyle::Fill,
            shader_library: ShaderLibrary::new(),
            fill_batch: PolygonBatch::new(settings.polygon_batch_capacity),
            sprite_batch: SpriteBatch::new(settings.sprite_batch_capacity),
            stroke_batch: PolygonBatch::new(settings.polygon_batch_capacity),
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
            polygon_renderable: None,
            sprite_renderable: None,
            color_program: None,
            polygon_program: None,
            sprite_program: None,
            settings,
        }
    }

    /// Build the shared renderables and shader programs.
    ///
    /// One-way `Uninitialized -> Initialized`; re-entrant calls are no-ops.
    /// When the device context cannot be acquired (or a program fails to
    /// build) the renderer stays uninitialized and every draw call is a
    /// no-op until a later `init` succeeds - query with
    /// [`is_initialized`](Renderer2D::is_initialized).
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }

        if !self.device.acquire() {
            tracing::warn!("Graphics context unavailable, renderer stays inert");
            return;
        }

        // Polygon batch target: one streaming buffer refilled per flush.
        let mut polygon_renderable = Renderable::new(&self.pool);
        let polygon_streams = {
            let mut buffer = VertexBuffer::new(
                self.device.as_ref(),
                &self.pool,
                "polygon vertices",
                (VERTEX_FLOATS * self.settings.polygon_batch_capacity * 4) as u64,
                BufferUsage::Stream,
            );
            buffer
                .layout
                .push(BufferElement::new("position", ElementKind::Float, 3));
            buffer
                .layout
                .push(BufferElement::new("color", ElementKind::Float, 4));
            let streams = vec![buffer.layout.to_stream()];
            polygon_renderable.add_vertex_buffer(MAIN_BUFFER, buffer);
            streams
        };

        // Sprite batch target: a static unit quad plus three per-instance
        // streams refilled per flush.
        let mut sprite_renderable = Renderable::new(&self.pool);
        let sprite_streams = self.build_sprite_renderable(&mut sprite_renderable);

        let Some(polygon_program) = self.create_program(
            names::POLYGON_BATCH,
            &polygon_streams,
            &[Topology::Triangles, Topology::Lines],
            false,
        ) else {
            return;
        };
        let Some(sprite_program) =
            self.create_program(names::SPRITE_BATCH, &sprite_streams, &[Topology::Triangles], true)
        else {
            return;
        };
        let Some(color_program) =
            self.create_program(names::COLOR, &polygon_streams, &[Topology::Triangles], false)
        else {
            return;
        };

        self.polygon_renderable = Some(polygon_renderable);
        self.sprite_renderable = Some(sprite_renderable);
        self.polygon_program = Some(polygon_program);
        self.sprite_program = Some(sprite_program);
        self.color_program = Some(color_program);
        self.initialized = true;
    }

    fn build_sprite_renderable(&self, renderable: &mut Renderable) -> Vec<VertexStream> {
        let device = self.device.as_ref();
        let capacity = self.settings.sprite_batch_capacity;
        let mut streams = Vec::with_capacity(4);

        // Unit quad: position xyz + texture coords uv per corner. The first
        // pixel in memory is the texture's top-left, hence the flipped v.
        let vertices: [f32; 20] = [
            1.0, -1.0, 0.0, 1.0, 1.0, //
            1.0, 1.0, 0.0, 1.0, 0.0, //
            -1.0, 1.0, 0.0, 0.0, 0.0, //
            -1.0, -1.0, 0.0, 0.0, 1.0,
        ];
        let mut quad = VertexBuffer::new(
            device,
            &self.pool,
            "sprite quad",
            std::mem::size_of_val(&vertices) as u64,
            BufferUsage::Static,
        );
        quad.layout
            .push(BufferElement::new("position", ElementKind::Float, 3));
        quad.layout
            .push(BufferElement::new("coords", ElementKind::Float, 2));
        quad.write(device, bytemuck::cast_slice(&vertices));
        streams.push(quad.layout.to_stream());
        renderable.add_vertex_buffer(MAIN_BUFFER, quad);

        let mut indices = IndexBuffer::new(
            device,
            &self.pool,
            "sprite indices",
            std::mem::size_of_val(&SPRITE_INDICES) as u64,
            BufferUsage::Static,
        );
        indices.write(device, &SPRITE_INDICES);
        renderable.set_index_buffer(indices);

        let mut crops = VertexBuffer::new(
            device,
            &self.pool,
            CROPS_BUFFER,
            (4 * capacity * 4) as u64,
            BufferUsage::Stream,
        );
        crops
            .layout
            .push(BufferElement::new("crop", ElementKind::Float, 4).per_instance());
        crops.layout.starting_index = 2;
        streams.push(crops.layout.to_stream());
        renderable.add_vertex_buffer(CROPS_BUFFER, crops);

        let mut colors = VertexBuffer::new(
            device,
            &self.pool,
            COLORS_BUFFER,
            (4 * capacity * 4) as u64,
            BufferUsage::Stream,
        );
        colors
            .layout
            .push(BufferElement::new("color", ElementKind::Float, 4).per_instance());
        colors.layout.starting_index = 3;
        streams.push(colors.layout.to_stream());
        renderable.add_vertex_buffer(COLORS_BUFFER, colors);

        let mut transforms = VertexBuffer::new(
            device,
            &self.pool,
            TRANSFORMS_BUFFER,
            (16 * capacity * 4) as u64,
            BufferUsage::Stream,
        );
        for _ in 0..4 {
            transforms
                .layout
                .push(BufferElement::new("transform", ElementKind::Float, 4).per_instance());
        }
        transforms.layout.starting_index = 4;
        streams.push(transforms.layout.to_stream());
        renderable.add_vertex_buffer(TRANSFORMS_BUFFER, transforms);

        streams
    }

    fn create_program(
        &self,
        name: &str,
        streams: &[VertexStream],
        topologies: &[Topology],
        samples_texture: bool,
    ) -> Option<DeviceProgram> {
        let Some(source) = self.shader_library.get(name) else {
            tracing::warn!("Shader program '{}' is not registered", name);
            return None;
        };
        let program = self.device.create_program(&ProgramDescriptor {
            label: Some(name),
            source,
            streams,
            topologies,
            samples_texture,
        });
        if program.is_none() {
            tracing::warn!("Failed to build shader program '{}'", name);
        }
        program
    }

    /// Whether initialization has succeeded.
    ///
    /// The liveness query for the recoverable context-unavailable condition:
    /// `false` after a `begin` means the device could not be acquired and
    /// every draw is currently a no-op.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Start a frame: ensure initialization and apply the viewport.
    pub fn begin(&mut self) {
        self.init();

        if !self.initialized {
            return;
        }

        self.device.set_viewport(self.width, self.height);
    }

    /// Drain every batch into draw submissions.
    ///
    /// Clears the target to the current clear color, then flushes the sprite
    /// batch, the fill polygon batch, and the stroke polygon batch, in that
    /// fixed order. Returns the total number of draw submissions issued, for
    /// instrumentation.
    pub fn flush(&mut self) -> usize {
        if !self.initialized {
            return 0;
        }

        let device = Arc::clone(&self.device);
        let view_projection = self.view_projection;
        let mut draw_calls = 0;

        device.begin_frame(self.clear_color);

        if let (Some(renderable), Some(program)) = (
            self.sprite_renderable.as_mut(),
            self.sprite_program.as_ref(),
        ) {
            self.sprite_batch.flush(|texture, transforms, crops, colors| {
                let uploads: [(&str, &[f32]); 3] = [
                    (CROPS_BUFFER, crops),
                    (COLORS_BUFFER, colors),
                    (TRANSFORMS_BUFFER, transforms),
                ];
                for (name, data) in uploads {
                    let Some(buffer) = renderable.find_vertex_buffer_mut(name) else {
                        tracing::warn!("Sprite renderable lacks '{}', skipping draw", name);
                        return;
                    };
                    buffer.write(device.as_ref(), bytemuck::cast_slice(data));
                }
                let Some(index_buffer) = renderable.index_buffer() else {
                    tracing::warn!("Sprite renderable lacks an index buffer, skipping draw");
                    return;
                };

                let buffers: Vec<_> = renderable
                    .vertex_buffers()
                    .map(|buffer| buffer.handle())
                    .collect();
                device.draw_instanced(&InstancedDrawCall {
                    program,
                    topology: Topology::Triangles,
                    vertex_buffers: &buffers,
                    index_buffer: index_buffer.handle(),
                    index_count: SPRITE_INDICES.len() as u32,
                    instance_count: (colors.len() / 4) as u32,
                    texture,
                    view_projection,
                });
                draw_calls += 1;
            });
        }

        if let (Some(renderable), Some(program)) = (
            self.polygon_renderable.as_mut(),
            self.polygon_program.as_ref(),
        ) {
            self.fill_batch.flush(|data| {
                draw_calls += Self::draw_polygon_data(
                    device.as_ref(),
                    renderable,
                    program,
                    Topology::Triangles,
                    view_projection,
                    data,
                );
            });
            self.stroke_batch.flush(|data| {
                draw_calls += Self::draw_polygon_data(
                    device.as_ref(),
                    renderable,
                    program,
                    Topology::Lines,
                    view_projection,
                    data,
                );
            });
        }

        device.end_frame();

        draw_calls
    }

    fn draw_polygon_data(
        device: &dyn RenderDevice,
        renderable: &mut Renderable,
        program: &DeviceProgram,
        topology: Topology,
        view_projection: Mat4,
        data: &[f32],
    ) -> usize {
        let Some(buffer) = renderable.find_vertex_buffer_mut(MAIN_BUFFER) else {
            tracing::warn!("Polygon renderable lacks '{}', skipping draw", MAIN_BUFFER);
            return 0;
        };
        buffer.write(device, bytemuck::cast_slice(data));
        device.draw(&DrawCall {
            program,
            topology,
            vertex_buffers: &[buffer.handle()],
            vertex_count: (data.len() / VERTEX_FLOATS) as u32,
            view_projection,
        });
        1
    }

    /// Set the color the target is cleared to at flush.
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Resize the viewport applied at the next `begin`.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Set the projection matrix and recompute the view-projection product.
    pub fn set_projection_matrix(&mut self, matrix: Mat4) {
        self.projection = matrix;
        self.view_projection = self.projection * self.view;
    }

    /// Set the view matrix and recompute the view-projection product.
    pub fn set_view_matrix(&mut self, matrix: Mat4) {
        self.view = matrix;
        self.view_projection = self.projection * self.view;
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.view_projection
    }

    /// Select which polygon batch subsequent shape calls feed.
    pub fn set_style(&mut self, style: DrawStyle) {
        self.style = style;
    }

    pub fn style(&self) -> DrawStyle {
        self.style
    }

    /// The renderer's settings.
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    /// The shader sources the renderer compiles at init.
    ///
    /// Overriding a built-in source only has an effect before the first
    /// successful `init`.
    pub fn shader_library_mut(&mut self) -> &mut ShaderLibrary {
        &mut self.shader_library
    }

    /// Look up one of the renderer's built programs by shader name, e.g. the
    /// flat color program for direct (unbatched) draws against the device.
    /// `None` until initialization succeeds.
    pub fn find_program(&self, name: &str) -> Option<&DeviceProgram> {
        match name {
            names::COLOR => self.color_program.as_ref(),
            names::POLYGON_BATCH => self.polygon_program.as_ref(),
            names::SPRITE_BATCH => self.sprite_program.as_ref(),
            _ => None,
        }
    }

    /// The resource pool tracking this renderer's GPU resources.
    pub fn pool(&self) -> &Arc<ResourcePool> {
        &self.pool
    }

    /// Draw a circle of `radius` around `position`.
    ///
    /// Fill style batches 20 triangle wedges (60 vertices); stroke style
    /// batches the 20 rim segments (40 vertices).
    pub fn draw_circle(&mut self, position: Vec3, radius: f32, color: Color) {
        if !self.initialized {
            return;
        }

        let delta = 2.0 * std::f32::consts::PI / CIRCLE_SEGMENTS as f32;
        let rim = |angle: f32| {
            position + Vec3::new(radius * angle.sin(), radius * angle.cos(), 0.0)
        };

        for i in 0..CIRCLE_SEGMENTS {
            let angle = i as f32 * delta;
            let next_angle = (i + 1) as f32 * delta;

            if self.style == DrawStyle::Fill {
                self.fill_batch.reserve(3);
                self.fill_batch.batch(position, color);
                self.fill_batch.batch(rim(angle), color);
                self.fill_batch.batch(rim(next_angle), color);
            } else {
                self.stroke_batch.reserve(2);
                self.stroke_batch.batch(rim(angle), color);
                self.stroke_batch.batch(rim(next_angle), color);
            }
        }
    }

    /// Draw a line segment. Lines always render through the stroke batch.
    pub fn draw_line(&mut self, from: Vec3, to: Vec3, color: Color) {
        if !self.initialized {
            return;
        }

        self.stroke_batch.reserve(2);
        self.stroke_batch.batch(from, color);
        self.stroke_batch.batch(to, color);
    }

    /// Draw a point as a small filled quad of `settings.point_size` side
    /// length. Points are always filled, regardless of the active style.
    pub fn draw_point(&mut self, position: Vec3, color: Color) {
        if !self.initialized {
            return;
        }

        let half = self.settings.point_size / 2.0;
        self.fill_batch.reserve(6);
        self.fill_batch
            .batch(position + Vec3::new(half, half, 0.0), color);
        self.fill_batch
            .batch(position + Vec3::new(-half, half, 0.0), color);
        self.fill_batch
            .batch(position + Vec3::new(-half, -half, 0.0), color);
        self.fill_batch
            .batch(position + Vec3::new(-half, -half, 0.0), color);
        self.fill_batch
            .batch(position + Vec3::new(half, -half, 0.0), color);
        self.fill_batch
            .batch(position + Vec3::new(half, half, 0.0), color);
    }

    /// Draw an arbitrary polygon from pre-ordered points.
    ///
    /// The caller supplies triangle-list order in fill style and
    /// line-list order in stroke style. Point counts beyond the polygon
    /// batch capacity are a caller error and draw nothing.
    pub fn draw_polygon(&mut self, points: &[(Vec3, Color)]) {
        if !self.initialized {
            return;
        }

        let batch = match self.style {
            DrawStyle::Fill => &mut self.fill_batch,
            DrawStyle::Stroke => &mut self.stroke_batch,
        };
        if !batch.reserve(points.len()) {
            return;
        }
        for (position, color) in points {
            batch.batch(*position, *color);
        }
    }

    /// Draw a rectangle of `width` x `height` centered on `position`.
    ///
    /// Fill style batches two triangles (6 vertices); stroke style batches
    /// the four perimeter segments (8 vertices).
    pub fn draw_rect(&mut self, position: Vec3, width: f32, height: f32, color: Color) {
        if !self.initialized {
            return;
        }

        let w = width / 2.0;
        let h = height / 2.0;

        if self.style == DrawStyle::Fill {
            self.fill_batch.reserve(6);
            self.fill_batch
                .batch(position + Vec3::new(w, h, 0.0), color);
            self.fill_batch
                .batch(position + Vec3::new(-w, h, 0.0), color);
            self.fill_batch
                .batch(position + Vec3::new(-w, -h, 0.0), color);
            self.fill_batch
                .batch(position + Vec3::new(-w, -h, 0.0), color);
            self.fill_batch
                .batch(position + Vec3::new(w, -h, 0.0), color);
            self.fill_batch
                .batch(position + Vec3::new(w, h, 0.0), color);
        } else {
            self.stroke_batch.reserve(8);
            self.stroke_batch
                .batch(position + Vec3::new(w, h, 0.0), color);
            self.stroke_batch
                .batch(position + Vec3::new(-w, h, 0.0), color);
            self.stroke_batch
                .batch(position + Vec3::new(-w, h, 0.0), color);
            self.stroke_batch
                .batch(position + Vec3::new(-w, -h, 0.0), color);
            self.stroke_batch
                .batch(position + Vec3::new(-w, -h, 0.0), color);
            self.stroke_batch
                .batch(position + Vec3::new(w, -h, 0.0), color);
            self.stroke_batch
                .batch(position + Vec3::new(w, -h, 0.0), color);
            self.stroke_batch
                .batch(position + Vec3::new(w, h, 0.0), color);
        }
    }

    /// Draw a textured sprite with an explicit transform.
    pub fn draw_texture(
        &mut self,
        texture: &Texture,
        transform: Mat4,
        crop: TextureRect,
        color: Color,
    ) {
        if !self.initialized {
            return;
        }

        self.sprite_batch
            .batch(texture.handle(), transform, crop, color);
    }

    /// Draw a sprite at `position`.
    pub fn draw_texture_at(
        &mut self,
        texture: &Texture,
        position: Vec3,
        crop: TextureRect,
        color: Color,
    ) {
        self.draw_texture(texture, Mat4::from_translation(position), crop, color);
    }

    /// Draw a sprite at `position`, rotated by `rotation` radians about Z.
    pub fn draw_texture_rotated(
        &mut self,
        texture: &Texture,
        position: Vec3,
        rotation: f32,
        crop: TextureRect,
        color: Color,
    ) {
        self.draw_texture(
            texture,
            Mat4::from_translation(position) * Mat4::from_rotation_z(rotation),
            crop,
            color,
        );
    }

    /// Draw a sprite at `position`, scaled by `scale`.
    pub fn draw_texture_scaled(
        &mut self,
        texture: &Texture,
        position: Vec3,
        scale: Vec3,
        crop: TextureRect,
        color: Color,
    ) {
        self.draw_texture(
            texture,
            Mat4::from_scale(scale) * Mat4::from_translation(position),
            crop,
            color,
        );
    }

    /// Draw a sprite at `position` with rotation and scale.
    ///
    /// The composition order `scale * rotation_z * translation` is part of
    /// the API contract; it determines on-screen placement and is pinned by
    /// tests.
    pub fn draw_texture_transformed(
        &mut self,
        texture: &Texture,
        position: Vec3,
        rotation: f32,
        scale: Vec3,
        crop: TextureRect,
        color: Color,
    ) {
        self.draw_texture(
            texture,
            Mat4::from_scale(scale)
                * Mat4::from_rotation_z(rotation)
                * Mat4::from_translation(position),
            crop,
            color,
        );
    }
}

impl Drop for Renderer2D {
    fn drop(&mut self) {
        // Renderables and programs drop with the renderer; the pool sweep
        // releases anything still tracked (e.g. user textures).
        self.pool.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_transform_composition_order() {
        // scale * rotation_z * translation, applied to the unit quad corner
        // (1, 0): translate to (2, 0), rotate 90 degrees to (0, 2), scale by
        // (2, 1) leaves (0, 2).
        let matrix = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0))
            * Mat4::from_rotation_z(FRAC_PI_2)
            * Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let corner = matrix.transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!((corner.x - 0.0).abs() < 1e-5);
        assert!((corner.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_view_projection_updates_on_either_setter() {
        use vermilion_device::MockDevice;

        let device = Arc::new(MockDevice::new());
        let mut renderer = Renderer2D::new(device, 800, 600);

        let projection = Mat4::orthographic_rh(-4.0, 4.0, -3.0, 3.0, -1.0, 1.0);
        let view = Mat4::from_translation(Vec3::new(1.0, 2.0, 0.0));

        renderer.set_projection_matrix(projection);
        renderer.set_view_matrix(view);
        assert!(renderer
            .view_projection_matrix()
            .abs_diff_eq(projection * view, 1e-6));

        // Opposite order must agree.
        renderer.set_view_matrix(Mat4::IDENTITY);
        renderer.set_projection_matrix(Mat4::IDENTITY);
        renderer.set_view_matrix(view);
        renderer.set_projection_matrix(projection);
        assert!(renderer
            .view_projection_matrix()
            .abs_diff_eq(projection * view, 1e-6));
    }

    #[test]
    fn test_matrices_default_to_identity() {
        use vermilion_device::MockDevice;

        let renderer = Renderer2D::new(Arc::new(MockDevice::new()), 10, 10);
        assert_eq!(renderer.projection_matrix(), Mat4::IDENTITY);
        assert_eq!(renderer.view_matrix(), Mat4::IDENTITY);
        assert_eq!(renderer.view_projection_matrix(), Mat4::IDENTITY);
    }
}
