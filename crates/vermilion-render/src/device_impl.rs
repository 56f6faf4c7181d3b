//! wgpu implementation of the [`RenderDevice`] capability surface.
//!
//! Frames are recorded into a single render pass against an offscreen
//! [`RenderTarget`]: `begin_frame` opens the pass with the clear color,
//! `draw`/`draw_instanced` encode into it, `end_frame` submits. The pass is
//! detached from the encoder's lifetime (`forget_lifetime`) so both can live
//! in the device between trait calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::HashMap;
use parking_lot::{Mutex, MutexGuard};
use vermilion_core::Color;
use vermilion_device::{
    BufferDescriptor, BufferKind, DeviceBuffer, DeviceProgram, DeviceTexture, DrawCall,
    FilterMode, InstancedDrawCall, ProgramData, ProgramDescriptor, RenderDevice,
    TextureDescriptor, TextureOptions, WrapMode,
};

use crate::context::{GraphicsContext, RenderTarget};

struct FrameState {
    encoder: wgpu::CommandEncoder,
    pass: wgpu::RenderPass<'static>,
}

/// The real GPU backend.
pub struct WgpuDevice {
    context: Arc<GraphicsContext>,
    target: Mutex<RenderTarget>,
    frame: Mutex<Option<FrameState>>,
    samplers: Mutex<HashMap<TextureOptions, Arc<wgpu::Sampler>>>,
    texture_samplers: Mutex<HashMap<u64, Arc<wgpu::Sampler>>>,
    texture_bind_groups: Mutex<HashMap<u64, Arc<wgpu::BindGroup>>>,
    next_texture_id: AtomicU64,
}

impl WgpuDevice {
    /// Create a device rendering into a fresh offscreen target of the given
    /// pixel size.
    pub fn new(context: Arc<GraphicsContext>, width: u32, height: u32) -> Self {
        let target = RenderTarget::new(&context, width, height);
        Self {
            context,
            target: Mutex::new(target),
            frame: Mutex::new(None),
            samplers: Mutex::new(HashMap::default()),
            texture_samplers: Mutex::new(HashMap::default()),
            texture_bind_groups: Mutex::new(HashMap::default()),
            next_texture_id: AtomicU64::new(0),
        }
    }

    /// The graphics context driving this device.
    pub fn context(&self) -> &Arc<GraphicsContext> {
        &self.context
    }

    /// The offscreen target frames are rendered into.
    pub fn target(&self) -> MutexGuard<'_, RenderTarget> {
        self.target.lock()
    }

    fn sampler(&self, options: TextureOptions) -> Arc<wgpu::Sampler> {
        let mut samplers = self.samplers.lock();
        if let Some(sampler) = samplers.get(&options) {
            return Arc::clone(sampler);
        }

        let filter = match options.filter {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Linear => wgpu::FilterMode::Linear,
        };
        let address_mode = match options.wrap {
            WrapMode::Clamp => wgpu::AddressMode::ClampToEdge,
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
        };
        let sampler = Arc::new(self.context.device().create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Texture Sampler"),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: filter,
            min_filter: filter,
            ..Default::default()
        }));
        samplers.insert(options, Arc::clone(&sampler));
        sampler
    }

    fn texture_bind_group(
        &self,
        texture: &DeviceTexture,
        layout: &wgpu::BindGroupLayout,
    ) -> Arc<wgpu::BindGroup> {
        let mut cache = self.texture_bind_groups.lock();
        if let Some(bind_group) = cache.get(&texture.id()) {
            return Arc::clone(bind_group);
        }

        let sampler = self
            .texture_samplers
            .lock()
            .get(&texture.id())
            .cloned()
            .unwrap_or_else(|| self.sampler(TextureOptions::default()));

        let bind_group = Arc::new(self.context.device().create_bind_group(
            &wgpu::BindGroupDescriptor {
                label: Some("Texture Bind Group"),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(texture.view()),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                ],
            },
        ));
        cache.insert(texture.id(), Arc::clone(&bind_group));
        bind_group
    }

    fn to_wgpu_color(color: Color) -> wgpu::Color {
        wgpu::Color {
            r: color.r as f64,
            g: color.g as f64,
            b: color.b as f64,
            a: color.a as f64,
        }
    }
}

impl RenderDevice for WgpuDevice {
    fn acquire(&self) -> bool {
        // Device creation already succeeded; the context stays live for the
        // process lifetime.
        true
    }

    fn set_viewport(&self, width: u32, height: u32) {
        let mut target = self.target.lock();
        if target.width() != width || target.height() != height {
            tracing::trace!("Resizing render target to {}x{}", width, height);
            *target = RenderTarget::with_format(&self.context, width, height, target.format());
        }
    }

    fn create_buffer(&self, desc: &BufferDescriptor<'_>) -> DeviceBuffer {
        let usage = match desc.kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            BufferKind::Index => wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        };
        let buffer = self.context.device().create_buffer(&wgpu::BufferDescriptor {
            label: desc.label,
            size: desc.size,
            usage,
            mapped_at_creation: false,
        });
        DeviceBuffer::from_wgpu(buffer)
    }

    fn write_buffer(&self, buffer: &DeviceBuffer, offset: u64, data: &[u8]) {
        self.context.queue().write_buffer(buffer.as_wgpu(), offset, data);
    }

    fn create_texture(&self, desc: &TextureDescriptor<'_>) -> DeviceTexture {
        let texture = self.context.device().create_texture(&wgpu::TextureDescriptor {
            label: desc.label,
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let id = self.next_texture_id.fetch_add(1, Ordering::Relaxed);
        self.texture_samplers
            .lock()
            .insert(id, self.sampler(desc.options));
        DeviceTexture::from_wgpu(id, texture, view)
    }

    fn write_texture(&self, texture: &DeviceTexture, data: &[u8]) {
        let width = texture.width();
        let height = texture.height();
        self.context.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: texture.as_wgpu(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn create_program(&self, desc: &ProgramDescriptor<'_>) -> Option<DeviceProgram> {
        let device = self.context.device();

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: desc.label,
            source: wgpu::ShaderSource::Wgsl(desc.source.into()),
        });

        // The single mat4 uniform every program declares at group 0.
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: desc.label,
            size: std::mem::size_of::<[f32; 16]>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Program Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Program Uniform Bind Group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let texture_layout = if desc.samples_texture {
            Some(
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Program Texture Layout"),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                }),
            )
        } else {
            None
        };

        let mut layouts: Vec<&wgpu::BindGroupLayout> = vec![&uniform_layout];
        if let Some(layout) = texture_layout.as_ref() {
            layouts.push(layout);
        }
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: desc.label,
            bind_group_layouts: &layouts,
            push_constant_ranges: &[],
        });

        let attribute_sets: Vec<Vec<wgpu::VertexAttribute>> = desc
            .streams
            .iter()
            .map(|stream| stream.wgpu_attributes())
            .collect();
        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = desc
            .streams
            .iter()
            .zip(&attribute_sets)
            .map(|(stream, attributes)| wgpu::VertexBufferLayout {
                array_stride: stream.stride,
                step_mode: if stream.per_instance {
                    wgpu::VertexStepMode::Instance
                } else {
                    wgpu::VertexStepMode::Vertex
                },
                attributes,
            })
            .collect();

        let target_format = self.target.lock().format();
        let pipelines = desc
            .topologies
            .iter()
            .map(|&topology| {
                let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: desc.label,
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &module,
                        entry_point: Some("vs_main"),
                        buffers: &buffers,
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &module,
                        entry_point: Some("fs_main"),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: target_format,
                            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: topology.to_wgpu(),
                        cull_mode: None,
                        ..Default::default()
                    },
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                    cache: None,
                });
                (topology, pipeline)
            })
            .collect();

        Some(DeviceProgram::from_wgpu(ProgramData {
            pipelines,
            uniform_buffer,
            uniform_bind_group,
            texture_layout,
        }))
    }

    fn begin_frame(&self, clear_color: Color) {
        let target = self.target.lock();
        let mut encoder =
            self.context
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                });
        let pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(Self::to_wgpu_color(clear_color)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            })
            .forget_lifetime();

        let mut frame = self.frame.lock();
        if frame.is_some() {
            tracing::warn!("begin_frame called with a frame already in flight");
        }
        *frame = Some(FrameState { encoder, pass });
    }

    fn draw(&self, call: &DrawCall<'_>) {
        let mut frame = self.frame.lock();
        let Some(frame) = frame.as_mut() else {
            tracing::warn!("draw outside begin_frame/end_frame, ignored");
            return;
        };
        let data = call.program.as_wgpu();
        let Some(pipeline) = data.pipeline_for(call.topology) else {
            tracing::warn!("Program has no pipeline for {:?}", call.topology);
            return;
        };

        // Every draw in a frame carries the same view-projection, so the
        // staged uniform write cannot race the pass it belongs to.
        self.context.queue().write_buffer(
            &data.uniform_buffer,
            0,
            bytemuck::cast_slice(&call.view_projection.to_cols_array()),
        );

        frame.pass.set_pipeline(pipeline);
        frame.pass.set_bind_group(0, &data.uniform_bind_group, &[]);
        for (slot, buffer) in call.vertex_buffers.iter().enumerate() {
            frame
                .pass
                .set_vertex_buffer(slot as u32, buffer.as_wgpu().slice(..));
        }
        frame.pass.draw(0..call.vertex_count, 0..1);
    }

    fn draw_instanced(&self, call: &InstancedDrawCall<'_>) {
        let data = call.program.as_wgpu();
        let Some(texture_layout) = data.texture_layout.as_ref() else {
            tracing::warn!("Instanced draw with a program that does not sample textures");
            return;
        };
        let bind_group = self.texture_bind_group(call.texture, texture_layout);

        let mut frame = self.frame.lock();
        let Some(frame) = frame.as_mut() else {
            tracing::warn!("draw_instanced outside begin_frame/end_frame, ignored");
            return;
        };
        let Some(pipeline) = data.pipeline_for(call.topology) else {
            tracing::warn!("Program has no pipeline for {:?}", call.topology);
            return;
        };

        self.context.queue().write_buffer(
            &data.uniform_buffer,
            0,
            bytemuck::cast_slice(&call.view_projection.to_cols_array()),
        );

        frame.pass.set_pipeline(pipeline);
        frame.pass.set_bind_group(0, &data.uniform_bind_group, &[]);
        frame.pass.set_bind_group(1, bind_group.as_ref(), &[]);
        for (slot, buffer) in call.vertex_buffers.iter().enumerate() {
            frame
                .pass
                .set_vertex_buffer(slot as u32, buffer.as_wgpu().slice(..));
        }
        frame
            .pass
            .set_index_buffer(call.index_buffer.as_wgpu().slice(..), wgpu::IndexFormat::Uint32);
        frame
            .pass
            .draw_indexed(0..call.index_count, 0, 0..call.instance_count);
    }

    fn end_frame(&self) {
        let Some(FrameState { encoder, pass }) = self.frame.lock().take() else {
            tracing::warn!("end_frame without begin_frame, ignored");
            return;
        };
        drop(pass);
        self.context.queue().submit(std::iter::once(encoder.finish()));
    }
}
