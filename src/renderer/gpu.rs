// renderer/gpu.rs
use std::{mem, num::NonZeroU64, path::Path, sync::Arc};

use wgpu::util::DeviceExt;
use winit::{dpi::PhysicalSize, window::Window};

use super::{
    depth::{RenderTargets, DEPTH_FORMAT},
    error::{GpuError, TextureError},
    shader,
    uniforms::{CameraUniform, ObjectData},
    FrameContext, ShaderUniforms, Texture, Vertex,
};
use crate::asset::{Assets, Handle, ModelData, VertexArray, VertexBuffer, VertexUploader};
use crate::settings::RenderSettings;

const INITIAL_OBJECTS_CAPACITY: u32 = 256;

pub struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    targets: RenderTargets,

    pipeline: wgpu::RenderPipeline,
    camera_buf: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,

    objects_buf: wgpu::Buffer,
    objects_capacity: u32,
    objects_bind_group: wgpu::BindGroup,
    objects_bind_layout: wgpu::BindGroupLayout,
    objects_scratch: Vec<ObjectData>,

    texture_layout: wgpu::BindGroupLayout,
    assets: Assets,
    default_texture: Handle<Texture>,
}

impl Gpu {
    pub async fn new(window: Arc<Window>, settings: &RenderSettings) -> Result<Self, GpuError> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await?;
        device.on_uncaptured_error(Arc::new(|err| log::error!("Unhandled wgpu error: {err}")));

        let surface_caps = surface.get_capabilities(&adapter);
        let fallback_format = surface_caps
            .formats
            .first()
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(fallback_format);

        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: settings.present_mode(&surface_caps.present_modes),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let targets = RenderTargets::new(&device, size, format, settings.sample_count);

        let camera_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("CameraBuffer"),
            contents: bytemuck::bytes_of(&ShaderUniforms::new().camera()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("CameraBindLayout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(mem::size_of::<CameraUniform>() as u64),
                },
                count: None,
            }],
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("CameraBindGroup"),
            layout: &camera_bind_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buf.as_entire_binding(),
            }],
        });

        let objects_bind_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("ObjectsBindLayout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let objects_capacity = INITIAL_OBJECTS_CAPACITY;
        let (objects_buf, objects_bind_group) =
            Self::create_objects_buffer(&device, &objects_bind_layout, objects_capacity);

        let texture_layout = Texture::bind_group_layout(&device);

        let source = shader::load_source(settings.shader_path.as_deref());
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("PipelineLayout"),
            bind_group_layouts: &[&camera_bind_layout, &objects_bind_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let (format, samples) = (config.format, targets.sample_count);
        let pipeline =
            match Self::build_pipeline(&device, &pipeline_layout, &source, format, samples).await {
                Ok(pipeline) => pipeline,
                Err(err) => {
                    log::error!("Shader pipeline failed:\n{err}");
                    let builtin = shader::fallback_for(&source).ok_or(GpuError::Pipeline(err))?;
                    log::warn!("Using the built-in shader instead");
                    Self::build_pipeline(&device, &pipeline_layout, builtin, format, samples).await?
                }
            };

        let mut assets = Assets::new();
        let default_texture = assets
            .textures
            .insert(Texture::white(&device, &queue, &texture_layout));

        Ok(Self {
            surface,
            device,
            queue,
            config,
            targets,
            pipeline,
            camera_buf,
            camera_bind_group,
            objects_buf,
            objects_capacity,
            objects_bind_group,
            objects_bind_layout,
            objects_scratch: Vec::with_capacity(INITIAL_OBJECTS_CAPACITY as usize),
            texture_layout,
            assets,
            default_texture,
        })
    }

    /// Compile `source` and link it into the cube pipeline, capturing validation errors.
    async fn build_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        source: &str,
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Result<wgpu::RenderPipeline, wgpu::Error> {
        let module = shader::compile(device, "CubeShader", source).await?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Pipeline"),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                front_face: wgpu::FrontFace::Ccw,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
                strip_index_format: None,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        });

        match device.pop_error_scope().await {
            Some(err) => Err(err),
            None => Ok(pipeline),
        }
    }

    fn create_objects_buffer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        capacity: u32,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let size = (capacity as usize * mem::size_of::<ObjectData>()) as wgpu::BufferAddress;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ObjectsBuffer"),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ObjectsBindGroup"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        (buffer, bind_group)
    }

    pub fn default_texture(&self) -> Handle<Texture> {
        self.default_texture
    }

    pub fn load_texture(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<Handle<Texture>, TextureError> {
        let texture = Texture::from_path(&self.device, &self.queue, &self.texture_layout, path)?;
        Ok(self.assets.textures.insert(texture))
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.reconfigure();
    }

    /// Reapply the surface configuration, e.g. after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
        let size = PhysicalSize::new(self.config.width, self.config.height);
        self.targets = RenderTargets::new(
            &self.device,
            size,
            self.config.format,
            self.targets.sample_count,
        );
    }

    /// Upload the frame's uniforms and replay its draw calls.
    pub fn render(&mut self, frame_ctx: &FrameContext) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let draws = frame_ctx.draws();

        self.queue.write_buffer(
            &self.camera_buf,
            0,
            bytemuck::bytes_of(&frame_ctx.uniforms().camera()),
        );

        self.objects_scratch.clear();
        self.objects_scratch
            .extend(draws.iter().map(|draw| ObjectData::from(draw.model)));

        let required = self.objects_scratch.len() as u32;
        if required > self.objects_capacity {
            let new_capacity = required.max(self.objects_capacity * 2);
            log::info!(
                "Growing objects buffer: {} -> {}",
                self.objects_capacity,
                new_capacity
            );
            let (buffer, bind_group) =
                Self::create_objects_buffer(&self.device, &self.objects_bind_layout, new_capacity);
            self.objects_buf = buffer;
            self.objects_bind_group = bind_group;
            self.objects_capacity = new_capacity;
        }

        if !self.objects_scratch.is_empty() {
            self.queue.write_buffer(
                &self.objects_buf,
                0,
                bytemuck::cast_slice(&self.objects_scratch),
            );
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        {
            let (color_view, resolve_target, store) = match &self.targets.msaa_view {
                Some(msaa) => (msaa, Some(&view), wgpu::StoreOp::Discard),
                None => (&view, None, wgpu::StoreOp::Store),
            };

            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("MainPass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.05,
                            g: 0.07,
                            b: 0.10,
                            a: 1.0,
                        }),
                        store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.camera_bind_group, &[]);
            rpass.set_bind_group(1, &self.objects_bind_group, &[]);

            let expected_stride = Vertex::layout().array_stride;

            for (instance, draw) in draws.iter().enumerate() {
                let instance = instance as u32;

                let Some(layout) = self.assets.vertex_arrays.get(draw.vertex_array) else {
                    log::warn!("Skipping draw with invalid vertex array {:?}", draw.vertex_array);
                    continue;
                };
                if layout.array_stride != expected_stride {
                    log::warn!(
                        "Skipping draw: vertex stride {} does not match pipeline stride {}",
                        layout.array_stride,
                        expected_stride
                    );
                    continue;
                }
                let Some(vertices) = self.assets.vertex_buffers.get(draw.vertex_buffer) else {
                    log::warn!("Skipping draw with invalid vertex buffer {:?}", draw.vertex_buffer);
                    continue;
                };
                let texture = self
                    .assets
                    .textures
                    .get(draw.texture)
                    .or_else(|| self.assets.textures.get(self.default_texture));
                let Some(texture) = texture else {
                    continue;
                };

                let count = draw.vertex_count.min(vertices.vertex_count());
                rpass.set_bind_group(2, &texture.bind_group, &[]);
                rpass.set_vertex_buffer(0, vertices.buffer().slice(..));
                rpass.draw(0..count, instance..instance + 1);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

impl VertexUploader for Gpu {
    fn upload_vertices(&mut self, label: &str, vertices: &[Vertex]) -> ModelData {
        let vertex_array = self.assets.vertex_arrays.insert(VertexArray::for_vertex());
        let vertex_buffer = self
            .assets
            .vertex_buffers
            .insert(VertexBuffer::from_vertices(&self.device, label, vertices));
        log::debug!(
            "Uploaded {label}: {} vertices ({:?}, {:?})",
            vertices.len(),
            vertex_array,
            vertex_buffer
        );
        ModelData::new(vertex_array, vertex_buffer)
    }
}
