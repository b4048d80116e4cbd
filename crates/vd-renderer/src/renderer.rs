//! wgpu renderer for the primitive scene
//!
//! Draws every visual as an instance of one of four unit meshes, plus the
//! floor slab and grid lines, into a color target with a depth buffer.

use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::config::RendererConfig;
use crate::grid::{floor_slab, grid_vertices};
use crate::light::LightUniform;
use crate::primitive::{InstanceBatches, PrimitiveKind};
use crate::scene::Scene;
use crate::vertex::{LineVertex, MeshVertex, PrimitiveInstance};

/// Depth buffer format
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const INITIAL_INSTANCE_CAPACITY: usize = 64;

/// GPU buffers of one unit mesh
struct MeshBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Flatten per-kind batches into one instance list and the range each kind
/// occupies in it
pub fn pack_batches(batches: &InstanceBatches) -> (Vec<PrimitiveInstance>, [Range<u32>; 4]) {
    let mut instances = Vec::with_capacity(batches.iter().map(Vec::len).sum());
    let mut ranges: [Range<u32>; 4] = Default::default();
    for kind in PrimitiveKind::ALL {
        let start = instances.len() as u32;
        instances.extend_from_slice(&batches[kind.index()]);
        ranges[kind.index()] = start..instances.len() as u32;
    }
    (instances, ranges)
}

/// Scene renderer
pub struct SceneRenderer {
    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    #[allow(dead_code)] // Held for GPU resource lifetime
    light_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    meshes: Vec<MeshBuffers>,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    ranges: [Range<u32>; 4],

    grid_buffer: Option<wgpu::Buffer>,
    grid_vertex_count: u32,
    floor: Option<PrimitiveInstance>,

    #[allow(dead_code)] // Held for GPU resource lifetime
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,

    clear_color: wgpu::Color,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
}

impl SceneRenderer {
    /// Creates a renderer drawing into targets of `format`
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        config: &RendererConfig,
    ) -> Self {
        let camera = crate::Camera::new(&config.camera, width as f32 / height.max(1) as f32);
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera.uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let light_uniform = LightUniform::new(&config.lighting, &config.fog);
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[light_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Primitive Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/primitive.wgsl").into()),
        });
        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Line Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/line.wgsl").into()),
        });

        let mesh_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &mesh_shader,
            format,
            &[MeshVertex::layout(), PrimitiveInstance::layout()],
            wgpu::PrimitiveTopology::TriangleList,
            "Primitive Pipeline",
        );
        let line_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &line_shader,
            format,
            &[LineVertex::layout()],
            wgpu::PrimitiveTopology::LineList,
            "Line Pipeline",
        );

        let meshes = PrimitiveKind::ALL
            .iter()
            .map(|kind| {
                let mesh = kind.mesh();
                MeshBuffers {
                    vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Primitive Vertex Buffer"),
                        contents: bytemuck::cast_slice(&mesh.vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    }),
                    index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Primitive Index Buffer"),
                        contents: bytemuck::cast_slice(&mesh.indices),
                        usage: wgpu::BufferUsages::INDEX,
                    }),
                    index_count: mesh.indices.len() as u32,
                }
            })
            .collect();

        let grid = grid_vertices(&config.floor);
        let grid_buffer = (!grid.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Grid Vertex Buffer"),
                contents: bytemuck::cast_slice(&grid),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });

        let (depth_texture, depth_view) = create_depth_texture(device, width, height);
        let [r, g, b, a] = config.background_color;

        tracing::info!("Scene renderer created for {:?} at {}x{}", format, width, height);

        Self {
            mesh_pipeline,
            line_pipeline,
            camera_buffer,
            light_buffer,
            bind_group,
            meshes,
            instance_buffer: create_instance_buffer(device, INITIAL_INSTANCE_CAPACITY),
            instance_capacity: INITIAL_INSTANCE_CAPACITY,
            ranges: Default::default(),
            grid_buffer,
            grid_vertex_count: grid.len() as u32,
            floor: floor_slab(&config.floor),
            depth_texture,
            depth_view,
            clear_color: wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: a as f64,
            },
            format,
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Color target format
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Current target size
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Recreate the depth buffer for a new target size
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == (self.width, self.height) {
            return;
        }
        let (texture, view) = create_depth_texture(device, width, height);
        self.depth_texture = texture;
        self.depth_view = view;
        self.width = width;
        self.height = height;
    }

    /// Upload the camera and this frame's primitive instances
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &Scene) {
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[scene.camera().uniform()]),
        );

        let mut batches = scene.instances();
        if let Some(floor) = self.floor {
            batches[PrimitiveKind::Cuboid.index()].push(floor);
        }
        let (instances, ranges) = pack_batches(&batches);

        if instances.len() > self.instance_capacity {
            self.instance_capacity = instances.len().next_power_of_two();
            self.instance_buffer = create_instance_buffer(device, self.instance_capacity);
            tracing::debug!("Grew instance buffer to {}", self.instance_capacity);
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }
        self.ranges = ranges;
    }

    /// Record the scene pass into `view`
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(0, &self.bind_group, &[]);

        render_pass.set_pipeline(&self.mesh_pipeline);
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        for kind in PrimitiveKind::ALL {
            let range = self.ranges[kind.index()].clone();
            if range.is_empty() {
                continue;
            }
            let mesh = &self.meshes[kind.index()];
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.index_count, 0, range);
        }

        if let Some(grid) = &self.grid_buffer {
            render_pass.set_pipeline(&self.line_pipeline);
            render_pass.set_vertex_buffer(0, grid.slice(..));
            render_pass.draw(0..self.grid_vertex_count, 0..1);
        }
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    buffers: &[wgpu::VertexBufferLayout<'_>],
    topology: wgpu::PrimitiveTopology,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Primitive Instance Buffer"),
        size: (capacity * std::mem::size_of::<PrimitiveInstance>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
