//! wgpu backend for the render loop.
//!
//! Each frame renders a depth-only shadow pass from the sun, then either the
//! six reflection probe faces or the main camera view. The probe cube and
//! every uploaded image carry a full mip chain, refilled by a blit pass after
//! each write. Meshes are uploaded lazily per [`GeometryId`] and destroyed
//! when the scene releases them.

mod mipmap;
mod shader;
mod targets;

use std::collections::HashMap;

use bytemuck::bytes_of;
use log::{info, warn};
use wgpu::util::DeviceExt;

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::geometry::{Geometry, GeometryId, Vertex};
use crate::render_loop::{Frame, FrameSink};
use crate::scene::{DrawItem, EnvironmentTextures, ReflectionProbe};
use crate::texture::{TextureId, TextureProvider, WrapMode};

use mipmap::MipGenerator;
use shader::{FrameUniform, ObjectUniform, ShadowUniform, LIT_SHADER, SHADOW_SHADER};
use targets::{
    placeholder_cube, sampler, CubeTarget, DepthTarget, GpuTexture, MeshBuffers, PlaceholderCube,
    ShadowMap, CAPTURE_FORMAT, DEPTH_FORMAT,
};

/// GPU renderer drawing the configurator scene into a window or canvas.
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth: DepthTarget,
    frame_layout: wgpu::BindGroupLayout,
    object_layout: wgpu::BindGroupLayout,
    shadow_layout: wgpu::BindGroupLayout,
    main_pipeline: wgpu::RenderPipeline,
    capture_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    shadow_map: ShadowMap,
    reflection: CubeTarget,
    placeholder_env: PlaceholderCube,
    env_sampler: wgpu::Sampler,
    repeat_sampler: wgpu::Sampler,
    clamp_sampler: wgpu::Sampler,
    white: GpuTexture,
    mips: MipGenerator,
    textures: HashMap<TextureId, GpuTexture>,
    meshes: HashMap<GeometryId, MeshBuffers>,
    clear_color: wgpu::Color,
}

impl Renderer {
    /// Creates a renderer for a native window.
    #[cfg(not(target_arch = "wasm32"))]
    pub async fn for_window(
        window: std::sync::Arc<winit::window::Window>,
        settings: &RenderConfig,
    ) -> Result<Self, RenderError> {
        let size = window.inner_size();
        Self::new(window, size.width, size.height, settings).await
    }

    /// Creates a renderer drawing into an HTML canvas.
    #[cfg(target_arch = "wasm32")]
    pub async fn for_canvas(
        canvas: web_sys::HtmlCanvasElement,
        settings: &RenderConfig,
    ) -> Result<Self, RenderError> {
        let (width, height) = (canvas.width(), canvas.height());
        Self::new(wgpu::SurfaceTarget::Canvas(canvas), width, height, settings).await
    }

    async fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        settings: &RenderConfig,
    ) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::unavailable("surface", "drawing area is empty"));
        }

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: backends(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(target)
            .map_err(|err| RenderError::unavailable("surface", err))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| RenderError::unavailable("adapter", "no compatible GPU adapter"))?;
        info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("configurator-device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: limits(&adapter),
                },
                None,
            )
            .await
            .map_err(|err| RenderError::unavailable("device", err))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::unavailable("surface", "no supported surface format"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let frame_layout = frame_layout(&device);
        let object_layout = object_layout(&device);
        let shadow_layout = uniform_layout::<ShadowUniform>(&device, "shadow-bind-layout");

        let lit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lit-shader"),
            source: wgpu::ShaderSource::Wgsl(LIT_SHADER.into()),
        });
        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow-shader"),
            source: wgpu::ShaderSource::Wgsl(SHADOW_SHADER.into()),
        });

        let lit_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lit-pipeline-layout"),
            bind_group_layouts: &[&frame_layout, &object_layout],
            push_constant_ranges: &[],
        });
        let main_pipeline =
            lit_pipeline(&device, &lit_layout, &lit_shader, format, "main-pipeline");
        let capture_pipeline = lit_pipeline(
            &device,
            &lit_layout,
            &lit_shader,
            CAPTURE_FORMAT,
            "capture-pipeline",
        );
        let shadow_pipeline =
            shadow_pipeline(&device, &shadow_layout, &object_layout, &shadow_shader);

        let mips = MipGenerator::new(&device);
        let white = GpuTexture::white(&device, &queue, &mips);
        let [r, g, b] = settings.clear_color;
        Ok(Self {
            depth: DepthTarget::create(&device, width, height, "depth-texture"),
            shadow_map: ShadowMap::create(&device, settings.shadow_map_size),
            reflection: CubeTarget::create(&device, settings.reflection_resolution),
            placeholder_env: placeholder_cube(&device, &queue),
            env_sampler: sampler(&device, WrapMode::ClampToEdge, "env-sampler"),
            repeat_sampler: sampler(&device, WrapMode::Repeat, "repeat-sampler"),
            clamp_sampler: sampler(&device, WrapMode::ClampToEdge, "clamp-sampler"),
            white,
            mips,
            textures: HashMap::new(),
            meshes: HashMap::new(),
            clear_color: wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: 1.0,
            },
            surface,
            device,
            queue,
            config,
            frame_layout,
            object_layout,
            shadow_layout,
            main_pipeline,
            capture_pipeline,
            shadow_pipeline,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Number of geometries that currently own GPU buffers.
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    fn configure_surface(&mut self) {
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthTarget::create(
            &self.device,
            self.config.width,
            self.config.height,
            "depth-texture",
        );
    }

    fn sync_textures(&mut self, provider: &TextureProvider, handles: &EnvironmentTextures) {
        for id in [handles.wood, handles.tile, handles.wall] {
            if self.textures.contains_key(&id) {
                continue;
            }
            let Some(image) = provider.image(id) else {
                continue;
            };
            let wrap = provider.wrap(id).unwrap_or(WrapMode::Repeat);
            let label = provider.path(id).unwrap_or("texture");
            self.textures.insert(
                id,
                GpuTexture::upload(&self.device, &self.queue, &self.mips, image, wrap, label),
            );
        }
    }

    fn ensure_mesh(&mut self, geometry: &Geometry) {
        self.meshes
            .entry(geometry.id())
            .or_insert_with(|| MeshBuffers::from_geometry(&self.device, geometry));
    }

    /// Uploads meshes and builds one object bind group per draw item.
    fn prepare_objects(
        &mut self,
        frame: &Frame<'_>,
        items: &[DrawItem<'_>],
    ) -> Vec<wgpu::BindGroup> {
        let handles = *frame.scene.textures();
        self.sync_textures(frame.textures, &handles);
        for item in items {
            self.ensure_mesh(item.geometry);
        }

        items
            .iter()
            .map(|item| {
                let texture = item
                    .material
                    .texture
                    .and_then(|role| self.textures.get(&handles.get(role)));
                let uniform = ObjectUniform::new(item, texture.is_some());
                let buffer = self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("object-uniform"),
                        contents: bytes_of(&uniform),
                        usage: wgpu::BufferUsages::UNIFORM,
                    });
                let texture = texture.unwrap_or(&self.white);
                let sampler = match texture.wrap {
                    WrapMode::Repeat => &self.repeat_sampler,
                    WrapMode::ClampToEdge => &self.clamp_sampler,
                };
                self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("object-bind-group"),
                    layout: &self.object_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&texture.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(sampler),
                        },
                    ],
                })
            })
            .collect()
    }

    fn frame_bind_group(
        &self,
        uniform: &FrameUniform,
        env: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("frame-uniform"),
                contents: bytes_of(uniform),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame-bind-group"),
            layout: &self.frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&self.shadow_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.shadow_map.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(env),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&self.env_sampler),
                },
            ],
        })
    }

    fn encode_shadow_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        frame: &Frame<'_>,
        items: &[DrawItem<'_>],
        objects: &[wgpu::BindGroup],
    ) {
        let sun = frame.scene.sun();
        let uniform = ShadowUniform {
            view_proj: sun.view_proj().to_cols_array_2d(),
        };
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("shadow-uniform"),
                contents: bytes_of(&uniform),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let light_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow-bind-group"),
            layout: &self.shadow_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("shadow-pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.shadow_map.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        if !sun.cast_shadow {
            return;
        }
        pass.set_pipeline(&self.shadow_pipeline);
        pass.set_bind_group(0, &light_group, &[]);
        for (item, group) in items.iter().zip(objects) {
            if !item.cast_shadow {
                continue;
            }
            self.draw_item(&mut pass, item, group);
        }
    }

    fn encode_lit_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: LitTarget<'_>,
        items: &[DrawItem<'_>],
        objects: &[wgpu::BindGroup],
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(target.label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(target.pipeline);
        pass.set_bind_group(0, target.frame, &[]);
        for (item, group) in items.iter().zip(objects) {
            self.draw_item(&mut pass, item, group);
        }
    }

    fn draw_item<'pass>(
        &'pass self,
        pass: &mut wgpu::RenderPass<'pass>,
        item: &DrawItem<'_>,
        group: &'pass wgpu::BindGroup,
    ) {
        let Some(mesh) = self.meshes.get(&item.geometry.id()) else {
            return;
        };
        pass.set_vertex_buffer(0, mesh.vertex.slice(..));
        pass.set_index_buffer(mesh.index.slice(..), wgpu::IndexFormat::Uint32);
        pass.set_bind_group(1, group, &[]);
        pass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}

struct LitTarget<'a> {
    label: &'a str,
    color: &'a wgpu::TextureView,
    depth: &'a wgpu::TextureView,
    pipeline: &'a wgpu::RenderPipeline,
    frame: &'a wgpu::BindGroup,
}

impl FrameSink for Renderer {
    fn capture_reflection(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        let items = frame.scene.draw_list();
        let objects = self.prepare_objects(frame, &items);
        let probe: &ReflectionProbe = frame.scene.probe();
        let face_groups: Vec<wgpu::BindGroup> = (0..ReflectionProbe::FACE_COUNT)
            .map(|face| {
                let view_proj = probe.face_view_proj(face);
                let uniform = FrameUniform::new(frame.scene, view_proj, probe.position);
                self.frame_bind_group(&uniform, &self.placeholder_env.view)
            })
            .collect();

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("capture-encoder"),
            });
        self.encode_shadow_pass(&mut encoder, frame, &items, &objects);
        for (face, group) in self.reflection.faces.iter().zip(&face_groups) {
            self.encode_lit_pass(
                &mut encoder,
                LitTarget {
                    label: "capture-pass",
                    color: face,
                    depth: &self.reflection.depth.view,
                    pipeline: &self.capture_pipeline,
                    frame: group,
                },
                &items,
                &objects,
            );
        }
        self.mips.generate(&self.device, &mut encoder, &self.reflection.texture);
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn draw(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.configure_surface();
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(err) => {
                warn!("skipping frame: {err:?}");
                return Ok(());
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let items = frame.scene.draw_list();
        let objects = self.prepare_objects(frame, &items);
        let uniform = FrameUniform::for_camera(frame.scene, frame.camera);
        let frame_group = self.frame_bind_group(&uniform, &self.reflection.cube);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("renderer-encoder"),
            });
        self.encode_shadow_pass(&mut encoder, frame, &items, &objects);
        self.encode_lit_pass(
            &mut encoder,
            LitTarget {
                label: "main-pass",
                color: &view,
                depth: &self.depth.view,
                pipeline: &self.main_pipeline,
                frame: &frame_group,
            },
            &items,
            &objects,
        );
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.configure_surface();
    }

    fn release(&mut self, geometries: &[GeometryId]) {
        for id in geometries {
            if let Some(mesh) = self.meshes.remove(id) {
                mesh.destroy();
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn backends() -> wgpu::Backends {
    wgpu::Backends::PRIMARY
}

#[cfg(target_arch = "wasm32")]
fn backends() -> wgpu::Backends {
    wgpu::Backends::GL
}

#[cfg(not(target_arch = "wasm32"))]
fn limits(_adapter: &wgpu::Adapter) -> wgpu::Limits {
    wgpu::Limits::default()
}

#[cfg(target_arch = "wasm32")]
fn limits(adapter: &wgpu::Adapter) -> wgpu::Limits {
    wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits())
}

fn uniform_layout<T>(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[uniform_entry::<T>(0)],
    })
}

fn uniform_entry<T>(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
        },
        count: None,
    }
}

fn texture_entry(
    binding: u32,
    sample_type: wgpu::TextureSampleType,
    view_dimension: wgpu::TextureViewDimension,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type,
            view_dimension,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32, kind: wgpu::SamplerBindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(kind),
        count: None,
    }
}

fn frame_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let color = wgpu::TextureSampleType::Float { filterable: true };
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("frame-bind-layout"),
        entries: &[
            uniform_entry::<FrameUniform>(0),
            texture_entry(
                1,
                wgpu::TextureSampleType::Depth,
                wgpu::TextureViewDimension::D2,
            ),
            sampler_entry(2, wgpu::SamplerBindingType::Comparison),
            texture_entry(3, color, wgpu::TextureViewDimension::Cube),
            sampler_entry(4, wgpu::SamplerBindingType::Filtering),
        ],
    })
}

fn object_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("object-bind-layout"),
        entries: &[
            uniform_entry::<ObjectUniform>(0),
            texture_entry(
                1,
                wgpu::TextureSampleType::Float { filterable: true },
                wgpu::TextureViewDimension::D2,
            ),
            sampler_entry(2, wgpu::SamplerBindingType::Filtering),
        ],
    })
}

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

fn lit_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[vertex_layout()],
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        multiview: None,
    })
}

fn shadow_pipeline(
    device: &wgpu::Device,
    light_layout: &wgpu::BindGroupLayout,
    object_layout: &wgpu::BindGroupLayout,
    shader: &wgpu::ShaderModule,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("shadow-pipeline-layout"),
        bind_group_layouts: &[light_layout, object_layout],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("shadow-pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_shadow",
            buffers: &[vertex_layout()],
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: Default::default(),
            bias: wgpu::DepthBiasState {
                constant: 2,
                slope_scale: 2.0,
                clamp: 0.0,
            },
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: None,
        multiview: None,
    })
}
