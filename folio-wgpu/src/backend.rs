use std::collections::HashMap;

use folio_gpu_shared::geometry::{MeshKind, MeshVertex};
use folio_gpu_shared::gpu_types::{
    FrameData, InstanceRaw, ParticleVertex, SceneUniforms, VERTICES_PER_PARTICLE,
};
use folio_gpu_shared::math::physical_size;
use folio_gpu_shared::shaders::{MESH_WGSL, PARTICLES_WGSL};
use wgpu::util::DeviceExt;

use crate::error::RenderError;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;
const MIN_INSTANCE_CAPACITY: usize = 16;
const MSAA_SAMPLES: u32 = 4;

const MESH_VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 7] = wgpu::vertex_attr_array![
    2 => Float32x4, 3 => Float32x4, 4 => Float32x4, 5 => Float32x4,
    6 => Float32x4, 7 => Float32x4, 8 => Float32x4
];
const PARTICLE_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Float32x4];

/// Construction-time settings taken from the render profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererOptions {
    pub antialias: bool,
    /// Already clamped device pixel ratio.
    pub pixel_ratio: f64,
    /// Fixed number of particles the billboard buffer is sized for.
    pub particle_capacity: usize,
}

/// GPU mesh with its own growable instance buffer.
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    instance_count: u32,
}

impl GpuMesh {
    fn destroy(self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        self.instance_buffer.destroy();
    }
}

/// Depth and (optional) multisampled colour attachments sized to the surface.
struct FrameTargets {
    depth: wgpu::Texture,
    depth_view: wgpu::TextureView,
    msaa: Option<(wgpu::Texture, wgpu::TextureView)>,
}

impl FrameTargets {
    fn destroy(self) {
        self.depth.destroy();
        if let Some((texture, _)) = self.msaa {
            texture.destroy();
        }
    }
}

/// Everything that exists only while the renderer is live.
struct GpuState {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    view_format: wgpu::TextureFormat,
    sample_count: u32,
    targets: FrameTargets,

    uniform_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    mesh_pipeline: wgpu::RenderPipeline,
    particle_pipeline: wgpu::RenderPipeline,

    meshes: HashMap<MeshKind, GpuMesh>,
    particle_buffer: wgpu::Buffer,
    particle_vertex_capacity: usize,
    particle_vertex_count: u32,
}

/// Renders the background scene into a canvas (or any wgpu surface target).
pub struct SceneRenderer {
    state: Option<GpuState>,
    pixel_ratio: f64,
}

impl SceneRenderer {
    /// Create the surface, device, pipelines and upload every scene mesh.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        css_width: u32,
        css_height: u32,
        options: RendererOptions,
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(target)
            .map_err(|e| RenderError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Folio Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .map_err(|e| RenderError::Device(e.to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| RenderError::Surface("surface reports no formats".into()))?;
        let view_format = surface_format.add_srgb_suffix();
        let alpha_mode = if caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };

        let msaa_supported = adapter
            .get_texture_format_features(view_format)
            .flags
            .sample_count_supported(MSAA_SAMPLES);
        let sample_count = choose_sample_count(options.antialias, msaa_supported);

        let (width, height) = physical_size(css_width, css_height, options.pixel_ratio);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: if view_format != surface_format {
                vec![view_format]
            } else {
                vec![]
            },
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&scene_bind_group_layout],
            push_constant_ranges: &[],
        });

        let mesh_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            PipelineSpec {
                label: "Mesh Pipeline",
                source: MESH_WGSL,
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<MeshVertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &MESH_VERTEX_ATTRIBUTES,
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceRaw>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &INSTANCE_ATTRIBUTES,
                    },
                ],
                blend: wgpu::BlendState::REPLACE,
                depth_write: true,
                format: view_format,
                sample_count,
            },
        );

        let particle_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            PipelineSpec {
                label: "Particle Pipeline",
                source: PARTICLES_WGSL,
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<ParticleVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &PARTICLE_ATTRIBUTES,
                }],
                blend: wgpu::BlendState::ALPHA_BLENDING,
                depth_write: false,
                format: view_format,
                sample_count,
            },
        );

        let meshes: HashMap<MeshKind, GpuMesh> = MeshKind::ALL
            .into_iter()
            .map(|kind| (kind, upload_mesh(&device, kind)))
            .collect();

        let particle_vertex_capacity = options.particle_capacity.max(1) * VERTICES_PER_PARTICLE;
        let particle_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Billboards"),
            size: (particle_vertex_capacity * std::mem::size_of::<ParticleVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let targets = create_targets(&device, &surface_config, view_format, sample_count);

        let info = adapter.get_info();
        log::info!(
            "Scene renderer initialized: {} ({}), {}x{}, {}x MSAA, {} meshes",
            info.name,
            info.backend.to_str(),
            width,
            height,
            sample_count,
            meshes.len(),
        );

        Ok(Self {
            state: Some(GpuState {
                device,
                queue,
                surface,
                surface_config,
                view_format,
                sample_count,
                targets,
                uniform_buffer,
                scene_bind_group,
                mesh_pipeline,
                particle_pipeline,
                meshes,
                particle_buffer,
                particle_vertex_capacity,
                particle_vertex_count: 0,
            }),
            pixel_ratio: options.pixel_ratio,
        })
    }

    /// Resize the surface to a new CSS viewport and recreate size-dependent targets.
    pub fn resize(&mut self, css_width: u32, css_height: u32) {
        if css_width == 0 || css_height == 0 {
            return;
        }
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let (width, height) = physical_size(css_width, css_height, self.pixel_ratio);
        state.surface_config.width = width;
        state.surface_config.height = height;
        state.reconfigure();
        log::debug!("Surface resized to {width}x{height}");
    }

    /// Draw one frame.
    pub fn render(&mut self, frame: &FrameData<'_>) -> Result<(), RenderError> {
        let state = self.state.as_mut().ok_or(RenderError::Released)?;

        let output = match state.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                state.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => return Ok(()),
            Err(e) => return Err(RenderError::Frame(e.to_string())),
        };

        state.upload_frame(frame);

        let view = output.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(state.view_format),
            ..Default::default()
        });
        let (color_view, resolve_target) = match &state.targets.msaa {
            Some((_, msaa_view)) => (msaa_view, Some(&view)),
            None => (&view, None),
        };

        let mut encoder = state
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &state.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &state.scene_bind_group, &[]);

            pass.set_pipeline(&state.mesh_pipeline);
            for batch in frame.batches {
                let Some(mesh) = state.meshes.get(&batch.kind) else {
                    continue;
                };
                if mesh.instance_count == 0 {
                    continue;
                }
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, mesh.instance_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..mesh.instance_count);
            }

            if state.particle_vertex_count > 0 {
                pass.set_pipeline(&state.particle_pipeline);
                pass.set_vertex_buffer(0, state.particle_buffer.slice(..));
                pass.draw(0..state.particle_vertex_count, 0..1);
            }
        }

        state.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Destroy every buffer and texture and drop the device. Safe to call twice.
    pub fn release(&mut self) {
        let Some(mut state) = self.state.take() else {
            return;
        };
        let mesh_count = state.meshes.len();
        for (_, mesh) in state.meshes.drain() {
            mesh.destroy();
        }
        state.particle_buffer.destroy();
        state.uniform_buffer.destroy();
        state.targets.destroy();
        log::info!("Scene renderer released ({mesh_count} meshes)");
    }
}

impl Drop for SceneRenderer {
    fn drop(&mut self) {
        self.release();
    }
}

impl GpuState {
    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.surface_config);
        let targets = create_targets(
            &self.device,
            &self.surface_config,
            self.view_format,
            self.sample_count,
        );
        std::mem::replace(&mut self.targets, targets).destroy();
    }

    /// Write uniforms, instance data and particle billboards for this frame.
    fn upload_frame(&mut self, frame: &FrameData<'_>) {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&frame.uniforms));

        for mesh in self.meshes.values_mut() {
            mesh.instance_count = 0;
        }

        for batch in frame.batches {
            let Some(mesh) = self.meshes.get_mut(&batch.kind) else {
                continue;
            };
            if batch.instances.len() > mesh.instance_capacity {
                let capacity = instance_capacity_for(batch.instances.len());
                let old = std::mem::replace(
                    &mut mesh.instance_buffer,
                    create_instance_buffer(&self.device, batch.kind, capacity),
                );
                old.destroy();
                mesh.instance_capacity = capacity;
            }
            self.queue.write_buffer(
                &mesh.instance_buffer,
                0,
                bytemuck::cast_slice(&batch.instances),
            );
            mesh.instance_count = batch.instances.len() as u32;
        }

        let particle_count = frame.particles.len().min(self.particle_vertex_capacity);
        let particles = &frame.particles[..particle_count];
        if !particles.is_empty() {
            self.queue
                .write_buffer(&self.particle_buffer, 0, bytemuck::cast_slice(particles));
        }
        self.particle_vertex_count = particles.len() as u32;
    }
}

/// MSAA only when the profile asks for it and the format supports it.
fn choose_sample_count(antialias: bool, msaa_supported: bool) -> u32 {
    if antialias && msaa_supported {
        MSAA_SAMPLES
    } else {
        1
    }
}

/// Instance buffers grow in powers of two to avoid reallocating every frame.
fn instance_capacity_for(count: usize) -> usize {
    count.max(MIN_INSTANCE_CAPACITY).next_power_of_two()
}

fn upload_mesh(device: &wgpu::Device, kind: MeshKind) -> GpuMesh {
    let data = kind.build();

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(kind.label()),
        contents: bytemuck::cast_slice(&data.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(kind.label()),
        contents: bytemuck::cast_slice(&data.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    GpuMesh {
        vertex_buffer,
        index_buffer,
        index_count: data.indices.len() as u32,
        instance_buffer: create_instance_buffer(device, kind, MIN_INSTANCE_CAPACITY),
        instance_capacity: MIN_INSTANCE_CAPACITY,
        instance_count: 0,
    }
}

fn create_instance_buffer(device: &wgpu::Device, kind: MeshKind, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(kind.label()),
        size: (capacity * std::mem::size_of::<InstanceRaw>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_targets(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    view_format: wgpu::TextureFormat,
    sample_count: u32,
) -> FrameTargets {
    let size = wgpu::Extent3d {
        width: config.width,
        height: config.height,
        depth_or_array_layers: 1,
    };

    let depth = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Target"),
        size,
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

    let msaa = (sample_count > 1).then(|| {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("MSAA Color Target"),
            size,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: view_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    });

    FrameTargets {
        depth,
        depth_view,
        msaa,
    }
}

struct PipelineSpec<'a> {
    label: &'a str,
    source: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    blend: wgpu::BlendState,
    depth_write: bool,
    format: wgpu::TextureFormat,
    sample_count: u32,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    spec: PipelineSpec<'_>,
) -> wgpu::RenderPipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(spec.label),
        source: wgpu::ShaderSource::Wgsl(spec.source.into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: spec.buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: spec.format,
                blend: Some(spec.blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: spec.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: spec.sample_count,
            ..Default::default()
        },
        multiview: None,
        cache: None,
    })
}
