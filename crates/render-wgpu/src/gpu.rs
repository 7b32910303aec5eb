use crate::camera::OrbitCamera;
use crate::mesh::{Vertex, build_mesh};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use std::collections::BTreeMap;
use std::ops::Range;
use wgpu::util::DeviceExt;
use village_scene::{LightKind, Scene, ShapeHandle};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct Uniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    ambient: [f32; 4],
    sun_dir: [f32; 4],
    sun_color: [f32; 4],
    /// xyz position, w range (0 for unbounded).
    point_pos: [f32; 4],
    /// rgb radiance, w set when a point light is present.
    point_color: [f32; 4],
    /// rgb color, w set when fog is on.
    fog_color: [f32; 4],
    fog_range: [f32; 4],
}

impl Uniforms {
    /// Gather camera, lights and fog from the scene.
    ///
    /// Ambient lights add up; the first directional and first point light
    /// reached are shaded, any others are skipped.
    pub(crate) fn gather(scene: &Scene, view_proj: Mat4, eye: Vec3) -> Self {
        let mut uniforms = Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: eye.extend(1.0).to_array(),
            ..Self::zeroed()
        };
        let mut sun_set = false;
        let mut point_set = false;
        for (_, light, world) in scene.lights() {
            let [r, g, b] = light.radiance();
            match light.kind {
                LightKind::Ambient => {
                    uniforms.ambient[0] += r;
                    uniforms.ambient[1] += g;
                    uniforms.ambient[2] += b;
                }
                LightKind::Directional { target, .. } if !sun_set => {
                    let dir = (world.position - target).normalize_or(Vec3::Y);
                    uniforms.sun_dir = dir.extend(0.0).to_array();
                    uniforms.sun_color = [r, g, b, 1.0];
                    sun_set = true;
                }
                LightKind::Point { distance } if !point_set => {
                    uniforms.point_pos = world.position.extend(distance).to_array();
                    uniforms.point_color = [r, g, b, 1.0];
                    point_set = true;
                }
                _ => tracing::trace!(kind = light.kind_name(), "extra light skipped"),
            }
        }
        if let Some(fog) = scene.fog {
            let [r, g, b] = fog.color.to_linear();
            uniforms.fog_color = [r, g, b, 1.0];
            uniforms.fog_range = [fog.near, fog.far, 0.0, 0.0];
        }
        uniforms
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
    emissive: [f32; 4],
}

/// Instances sharing one shape, stored contiguously.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Batch {
    pub shape: ShapeHandle,
    pub instances: Range<u32>,
}

/// Flatten every drawable into per-shape batches.
pub(crate) fn build_batches(scene: &Scene) -> (Vec<Batch>, Vec<InstanceData>) {
    let mut grouped: BTreeMap<ShapeHandle, Vec<InstanceData>> = BTreeMap::new();
    scene.visit_drawables(|d| {
        let cols = d.world.to_matrix().to_cols_array_2d();
        let [r, g, b] = d.paint.color.to_linear();
        let [er, eg, eb] = d.paint.emitted();
        grouped.entry(d.mesh.shape).or_default().push(InstanceData {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color: [r, g, b, 1.0],
            emissive: [er, eg, eb, 0.0],
        });
    });

    let mut batches = Vec::with_capacity(grouped.len());
    let mut instances = Vec::new();
    for (shape, group) in grouped {
        let start = instances.len() as u32;
        instances.extend(group);
        batches.push(Batch {
            shape,
            instances: start..instances.len() as u32,
        });
    }
    (batches, instances)
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// wgpu-based scene renderer.
pub struct WgpuRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    meshes: BTreeMap<ShapeHandle, GpuMesh>,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                            7 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // planes and discs must show from both sides
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let max_instances = 10_000u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            meshes: BTreeMap::new(),
            instance_buffer,
            max_instances,
            depth_texture,
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Upload meshes for any catalog shapes not seen yet.
    pub fn prepare(&mut self, device: &wgpu::Device, scene: &Scene) {
        for (handle, shape) in scene.catalog().shapes() {
            if self.meshes.contains_key(handle) {
                continue;
            }
            let mesh = build_mesh(shape);
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("shape_vertex_buffer"),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("shape_index_buffer"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            self.meshes.insert(
                *handle,
                GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: mesh.indices.len() as u32,
                },
            );
            tracing::debug!(handle = handle.0, kind = shape.kind(), "uploaded mesh");
        }
    }

    /// Drop every uploaded mesh, e.g. after the scene is torn down.
    pub fn release_meshes(&mut self) {
        self.meshes.clear();
    }

    /// Render one frame of the scene from the camera.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &OrbitCamera,
        scene: &Scene,
    ) {
        let uniforms = Uniforms::gather(scene, camera.view_projection(), camera.eye());
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let (batches, mut instances) = build_batches(scene);
        if instances.len() > self.max_instances as usize {
            tracing::warn!(
                count = instances.len(),
                max = self.max_instances,
                "instance overflow, truncating"
            );
            instances.truncate(self.max_instances as usize);
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let [r, g, b] = scene.background.to_linear();
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            let stride = std::mem::size_of::<InstanceData>() as u64;
            let limit = instances.len() as u32;
            for batch in &batches {
                let Some(mesh) = self.meshes.get(&batch.shape) else {
                    continue;
                };
                let end = batch.instances.end.min(limit);
                if batch.instances.start >= end {
                    continue;
                }
                let count = end - batch.instances.start;
                let offset = batch.instances.start as u64 * stride;
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, self.instance_buffer.slice(offset..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..count);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use village_props::{VillageConfig, build_village};

    fn village() -> village_props::Village {
        build_village(&VillageConfig::default()).unwrap()
    }

    #[test]
    fn uniform_layout_is_vec4_aligned() {
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<InstanceData>(), 96);
    }

    #[test]
    fn batches_cover_every_drawable() {
        let v = village();
        let mut drawables = 0;
        v.scene.visit_drawables(|_| drawables += 1);
        let (batches, instances) = build_batches(&v.scene);
        assert_eq!(instances.len(), drawables);
        let covered: u32 = batches.iter().map(|b| b.instances.len() as u32).sum();
        assert_eq!(covered as usize, drawables);
        // contiguous and in handle order
        for pair in batches.windows(2) {
            assert_eq!(pair[0].instances.end, pair[1].instances.start);
            assert!(pair[0].shape < pair[1].shape);
        }
    }

    #[test]
    fn cobbles_batch_into_one_draw() {
        let v = village();
        let (batches, _) = build_batches(&v.scene);
        let cobble = batches
            .iter()
            .find(|b| b.shape == v.handles.templates.cobble.shape)
            .unwrap();
        assert_eq!(cobble.instances.len(), v.cobble_count);
    }

    #[test]
    fn uniforms_pick_up_lights_and_fog() {
        let v = village();
        let u = Uniforms::gather(&v.scene, Mat4::IDENTITY, Vec3::ZERO);
        assert!((u.ambient[0] - 0.45).abs() < 1e-6);
        let sun_dir = Vec3::new(u.sun_dir[0], u.sun_dir[1], u.sun_dir[2]);
        assert!(sun_dir.abs_diff_eq(Vec3::new(5.0, 10.0, 2.0).normalize(), 1e-5));
        let point = Vec3::new(u.point_pos[0], u.point_pos[1], u.point_pos[2]);
        assert!(point.abs_diff_eq(Vec3::new(-4.0, 2.05, -1.0), 1e-6));
        assert_eq!(u.point_pos[3], 6.0);
        assert_eq!(u.point_color[3], 1.0);
        assert_eq!(u.fog_color[3], 1.0);
        assert_eq!(&u.fog_range[..2], &[8.0, 25.0]);
    }

    #[test]
    fn fog_flag_clears_without_fog() {
        let mut v = village();
        v.scene.fog = None;
        let u = Uniforms::gather(&v.scene, Mat4::IDENTITY, Vec3::ZERO);
        assert_eq!(u.fog_color[3], 0.0);
    }

    #[test]
    fn emissive_paints_reach_instances() {
        let v = village();
        let (_, instances) = build_batches(&v.scene);
        let glowing = instances.iter().filter(|i| i.emissive[0] > 0.0).count();
        // three windows and the lantern
        assert_eq!(glowing, 4);
    }
}
