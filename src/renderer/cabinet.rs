//! Two-camera WebGPU renderer
//!
//! Pass 1 draws the world layer into an offscreen arena texture through the
//! monitor camera. Pass 2 clears the surface, draws the cabinet layer in
//! screen pixels, then blits the arena texture into the monitor viewport.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::scene::DisplayList;
use super::vertex::{Vertex, colors};
use crate::compositor::{Compositor, Rect};
use crate::consts::WORLD_SIZE;

/// Offscreen arena texture resolution (one texel per world unit)
const WORLD_TEXTURE_SIZE: u32 = WORLD_SIZE as u32;

/// Maps a layer's coordinate space (origin top-left, y down) to clip space.
/// Must match `Projection` in shape.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct Projection {
    scale: [f32; 2],
    offset: [f32; 2],
}

impl Projection {
    fn for_size(width: f32, height: f32) -> Self {
        Self {
            scale: [2.0 / width, -2.0 / height],
            offset: [-1.0, 1.0],
        }
    }
}

fn physical_viewport(rect: Rect, pixel_ratio: f32, surface: (f32, f32)) -> Option<Rect> {
    let (w, h) = surface;
    let x = (rect.x * pixel_ratio).clamp(0.0, w);
    let y = (rect.y * pixel_ratio).clamp(0.0, h);
    let width = (rect.width * pixel_ratio).min(w - x);
    let height = (rect.height * pixel_ratio).min(h - y);
    (width >= 1.0 && height >= 1.0).then(|| Rect::new(x, y, width, height))
}

fn to_wgpu_color(c: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: c[0] as f64,
        g: c[1] as f64,
        b: c[2] as f64,
        a: c[3] as f64,
    }
}

pub struct CabinetRenderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,

    shape_pipeline: wgpu::RenderPipeline,
    blit_pipeline: wgpu::RenderPipeline,

    world_projection: wgpu::BindGroup,
    cabinet_projection_buffer: wgpu::Buffer,
    cabinet_projection: wgpu::BindGroup,

    world_view: wgpu::TextureView,
    blit_bind_group: wgpu::BindGroup,

    /// Physical surface size in pixels
    pub size: (u32, u32),
    /// Physical pixels per compositor (CSS) pixel
    pub pixel_ratio: f32,
}

impl CabinetRenderer {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        pixel_ratio: f32,
    ) -> Result<Self, wgpu::RequestDeviceError> {
        let pixel_ratio = if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 };
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("cabinet-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);
        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // === Shapes ===

        let shape_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shape_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shape.wgsl").into()),
        });

        let projection_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("projection_bind_group_layout"),
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

        let world_projection_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("world_projection"),
            contents: bytemuck::bytes_of(&Projection::for_size(WORLD_SIZE, WORLD_SIZE)),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let cabinet_projection_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cabinet_projection"),
            contents: bytemuck::bytes_of(&Projection::for_size(
                config.width as f32 / pixel_ratio,
                config.height as f32 / pixel_ratio,
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let world_projection = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("world_projection_bind_group"),
            layout: &projection_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: world_projection_buffer.as_entire_binding(),
            }],
        });
        let cabinet_projection = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cabinet_projection_bind_group"),
            layout: &projection_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: cabinet_projection_buffer.as_entire_binding(),
            }],
        });

        let shape_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shape_pipeline_layout"),
            bind_group_layouts: &[&projection_layout],
            immediate_size: 0,
        });

        let shape_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shape_pipeline"),
            layout: Some(&shape_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shape_shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shape_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        // === Offscreen arena ===

        let world_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("world_texture"),
            size: wgpu::Extent3d {
                width: WORLD_TEXTURE_SIZE,
                height: WORLD_TEXTURE_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let world_view = world_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let world_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("world_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // === Blit ===

        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("blit.wgsl").into()),
        });

        let blit_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit_bind_group_layout"),
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
        });

        let blit_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit_bind_group"),
            layout: &blit_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&world_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&world_sampler),
                },
            ],
        });

        let blit_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit_pipeline_layout"),
            bind_group_layouts: &[&blit_layout],
            immediate_size: 0,
        });

        let blit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blit_pipeline"),
            layout: Some(&blit_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &blit_shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &blit_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            size: (config.width, config.height),
            pixel_ratio,
            config,
            shape_pipeline,
            blit_pipeline,
            world_projection,
            cabinet_projection_buffer,
            cabinet_projection,
            world_view,
            blit_bind_group,
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32, pixel_ratio: f32) {
        if new_width > 0 && new_height > 0 {
            if pixel_ratio > 0.0 {
                self.pixel_ratio = pixel_ratio;
            }
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
            self.queue.write_buffer(
                &self.cabinet_projection_buffer,
                0,
                bytemuck::bytes_of(&Projection::for_size(
                    new_width as f32 / self.pixel_ratio,
                    new_height as f32 / self.pixel_ratio,
                )),
            );
        }
    }

    /// Reconfigure after a lost or outdated surface
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn vertex_buffer(&self, label: &str, vertices: &[Vertex]) -> Option<wgpu::Buffer> {
        if vertices.is_empty() {
            return None;
        }
        Some(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }))
    }

    /// Monitor rect in physical pixels, clamped to the current surface
    fn monitor_viewport(&self, compositor: &Compositor) -> Option<Rect> {
        physical_viewport(
            compositor.monitor_camera().viewport,
            self.pixel_ratio,
            (self.size.0 as f32, self.size.1 as f32),
        )
    }

    /// Draw one frame of the display list
    pub fn render(&mut self, list: &DisplayList, compositor: &Compositor) -> Result<(), wgpu::SurfaceError> {
        let world_vertices = list.vertices_for(compositor.monitor_camera());
        let cabinet_vertices = list.vertices_for(compositor.cabinet_camera());
        let world_buffer = self.vertex_buffer("world_vertices", &world_vertices);
        let cabinet_buffer = self.vertex_buffer("cabinet_vertices", &cabinet_vertices);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("cabinet_encoder"),
            });

        // Pass 1: arena through the monitor camera
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("world_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.world_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(to_wgpu_color(colors::ARENA)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(buffer) = &world_buffer {
                pass.set_pipeline(&self.shape_pipeline);
                pass.set_bind_group(0, &self.world_projection, &[]);
                pass.set_vertex_buffer(0, buffer.slice(..));
                pass.draw(0..world_vertices.len() as u32, 0..1);
            }
        }

        // Pass 2: cabinet, then the monitor inset
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("cabinet_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(to_wgpu_color(colors::CABINET)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(buffer) = &cabinet_buffer {
                pass.set_pipeline(&self.shape_pipeline);
                pass.set_bind_group(0, &self.cabinet_projection, &[]);
                pass.set_vertex_buffer(0, buffer.slice(..));
                pass.draw(0..cabinet_vertices.len() as u32, 0..1);
            }

            if let Some(rect) = self.monitor_viewport(compositor) {
                pass.set_viewport(rect.x, rect.y, rect.width, rect.height, 0.0, 1.0);
                pass.set_pipeline(&self.blit_pipeline);
                pass.set_bind_group(0, &self.blit_bind_group, &[]);
                pass.draw(0..3, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_maps_corners() {
        let p = Projection::for_size(800.0, 600.0);
        let clip = |x: f32, y: f32| (x * p.scale[0] + p.offset[0], y * p.scale[1] + p.offset[1]);
        assert_eq!(clip(0.0, 0.0), (-1.0, 1.0));
        assert_eq!(clip(800.0, 600.0), (1.0, -1.0));
        assert_eq!(clip(400.0, 300.0), (0.0, 0.0));
    }

    #[test]
    fn test_physical_viewport_scales_and_clamps() {
        let rect = Rect::new(115.0, 15.0, 570.0, 570.0);
        let scaled = physical_viewport(rect, 2.0, (1600.0, 1200.0)).unwrap();
        assert_eq!(scaled, Rect::new(230.0, 30.0, 1140.0, 1140.0));

        // Surface lagging behind a resize
        let clamped = physical_viewport(rect, 1.0, (400.0, 300.0)).unwrap();
        assert_eq!(clamped, Rect::new(115.0, 15.0, 285.0, 285.0));

        assert!(physical_viewport(rect, 1.0, (100.0, 100.0)).is_none());
    }

    #[test]
    fn test_projection_layout_is_16_bytes() {
        assert_eq!(std::mem::size_of::<Projection>(), 16);
    }
}
