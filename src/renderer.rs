// Renderer: wgpu plumbing and the interactive event loop

use winit::{
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::WindowBuilder,
};
use wgpu::{Adapter, Instance, RenderPipeline};
use std::sync::Arc;
use glam::Mat4;

use crate::camera::OrbitCamera;
use crate::input::action_for_key;
use crate::input::InteractionState;
use crate::math::deg_to_rad;
use crate::mesh::{MeshTopology, Vertex};
use crate::scene::Scene;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub struct Renderer {
    instance: Instance,
    adapter: Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    window: Arc<winit::window::Window>,
    surface_format: wgpu::TextureFormat,
    fill_pipeline: RenderPipeline,
    wire_pipeline: RenderPipeline,
    line_pipeline: RenderPipeline,
    depth_view: wgpu::TextureView,
    nodes: Vec<GpuNode>,
    scene: Scene,
    state: InteractionState,
    camera: OrbitCamera,
}

/// GPU-side counterpart of one scene node, built once at startup.
struct GpuNode {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

// Uniform buffer structure, one per node
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    mvp: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    color: [f32; 4],
    params: [f32; 4],
}

impl Uniforms {
    fn new(mvp: Mat4, model: Mat4, color: [f32; 4], unlit: bool) -> Self {
        Self {
            mvp: mvp.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            color,
            params: [if unlit { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

impl Renderer {
    pub async fn new(event_loop: &EventLoop<()>) -> Self {
        // Create window with Arc for shared ownership
        let window = Arc::new(WindowBuilder::new()
            .with_title("Goalkeeper-3D")
            .build(event_loop)
            .unwrap());

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone()).expect("Failed to create surface");

        let adapter = instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }).await.unwrap();

        // POLYGON_MODE_LINE backs the wireframe toggle.
        let (device, queue) = adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Renderer Device"),
                required_features: wgpu::Features::POLYGON_MODE_LINE,
                required_limits: wgpu::Limits::default(),
            },
            None, // Trace path
        ).await.unwrap();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps.formats.iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let size = window.inner_size();
        surface.configure(&device, &wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        });

        let shader_code = include_str!("shader.wgsl");
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_code.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniform Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let make_pipeline = |label: &str,
                             topology: wgpu::PrimitiveTopology,
                             polygon_mode: wgpu::PolygonMode| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader_module,
                    entry_point: "vs_main",
                    buffers: &[Vertex::LAYOUT],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader_module,
                    entry_point: "fs_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    // Side nets are double-sided, so nothing gets culled.
                    cull_mode: None,
                    unclipped_depth: false,
                    polygon_mode,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
            })
        };

        let fill_pipeline = make_pipeline(
            "Fill Pipeline",
            wgpu::PrimitiveTopology::TriangleList,
            wgpu::PolygonMode::Fill,
        );
        let wire_pipeline = make_pipeline(
            "Wireframe Pipeline",
            wgpu::PrimitiveTopology::TriangleList,
            wgpu::PolygonMode::Line,
        );
        let line_pipeline = make_pipeline(
            "Line Pipeline",
            wgpu::PrimitiveTopology::LineList,
            wgpu::PolygonMode::Fill,
        );

        let depth_view = create_depth_view(&device, size.width, size.height);

        let scene = Scene::build();
        let nodes = scene
            .nodes_with_models()
            .map(|(node, _)| {
                use wgpu::util::DeviceExt;
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(node.name),
                    contents: bytemuck::cast_slice(&node.mesh.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(node.name),
                    contents: bytemuck::cast_slice(&node.mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(node.name),
                    contents: bytemuck::cast_slice(&[Uniforms::new(
                        Mat4::IDENTITY,
                        Mat4::IDENTITY,
                        node.material.color,
                        node.material.unlit,
                    )]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(node.name),
                    layout: &bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: uniform_buffer.as_entire_binding(),
                        },
                    ],
                });
                GpuNode {
                    vertex_buffer,
                    index_buffer,
                    index_count: node.mesh.indices.len() as u32,
                    uniform_buffer,
                    bind_group,
                }
            })
            .collect();

        log::info!("scene uploaded: {} nodes", scene.nodes_with_models().count());

        Self {
            instance,
            adapter,
            device,
            queue,
            surface,
            window,
            surface_format,
            fill_pipeline,
            wire_pipeline,
            line_pipeline,
            depth_view,
            nodes,
            scene,
            state: InteractionState::default(),
            camera: OrbitCamera::new(),
        }
    }

    pub fn run(mut self, event_loop: EventLoop<()>) {
        let _ = event_loop.run(move |event, target| {
            target.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent {
                    window_id,
                    event: WindowEvent::CloseRequested,
                } if window_id == self.window.id() => {
                    target.exit();
                }
                Event::WindowEvent {
                    event: WindowEvent::Resized(physical_size),
                    window_id,
                } if window_id == self.window.id() => {
                    self.resize(physical_size);
                }
                Event::AboutToWait => {
                    self.window.request_redraw();
                }
                Event::WindowEvent {
                    event: WindowEvent::RedrawRequested,
                    window_id,
                } if window_id == self.window.id() => {
                    self.update_and_render();
                }
                Event::WindowEvent {
                    event: WindowEvent::KeyboardInput { event, .. },
                    window_id,
                } if window_id == self.window.id() => {
                    self.handle_keyboard_input(event);
                }
                Event::WindowEvent {
                    event: WindowEvent::MouseInput { state, button, .. },
                    window_id,
                } if window_id == self.window.id() => {
                    self.camera.handle_mouse_button(button, state);
                }
                Event::WindowEvent {
                    event: WindowEvent::CursorMoved { position, .. },
                    window_id,
                } if window_id == self.window.id() => {
                    self.camera.handle_cursor_moved(position);
                }
                Event::WindowEvent {
                    event: WindowEvent::MouseWheel { delta, .. },
                    window_id,
                } if window_id == self.window.id() => {
                    self.camera.handle_scroll(delta);
                }
                _ => {}
            }
        });
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        let surface_caps = self.surface.get_capabilities(&self.adapter);

        self.surface.configure(&self.device, &wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: self.surface_format,
            width: new_size.width,
            height: new_size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        });

        self.depth_view = create_depth_view(&self.device, new_size.width, new_size.height);
    }

    fn handle_keyboard_input(&mut self, event: KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        if let PhysicalKey::Code(keycode) = event.physical_key {
            if let Some(action) = action_for_key(keycode) {
                self.state.apply_action(action, &mut self.scene);
            }
        }
    }

    fn update_and_render(&mut self) {
        // Orbit enablement is synced before anything else this frame.
        self.camera.set_enabled(self.state.orbit_enabled);

        // Wireframe propagation and ball spin.
        self.state.advance_frame(&mut self.scene);

        let size = self.window.inner_size();
        let aspect_ratio = size.width as f32 / size.height as f32;
        let projection = Mat4::perspective_rh(deg_to_rad(75.0), aspect_ratio, 0.1, 1000.0);
        let view = self.camera.view_matrix();
        let view_projection = projection * view;

        for ((node, model), gpu) in self.scene.nodes_with_models().zip(self.nodes.iter()) {
            let uniforms = Uniforms::new(
                view_projection * model,
                model,
                node.material.color,
                node.material.unlit,
            );
            self.queue.write_buffer(&gpu.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
        }

        self.render();
    }

    fn render(&mut self) {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(_) => {
                log::warn!("surface lost, reconfiguring");
                self.resize(self.window.inner_size());
                return;
            }
        };

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let [r, g, b, _] = self.scene.background;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
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
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            for ((node, _), gpu) in self.scene.nodes_with_models().zip(self.nodes.iter()) {
                let pipeline = match node.mesh.topology {
                    MeshTopology::Lines => &self.line_pipeline,
                    MeshTopology::Triangles if node.material.wireframe => &self.wire_pipeline,
                    MeshTopology::Triangles => &self.fill_pipeline,
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &gpu.bind_group, &[]);
                render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                render_pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..gpu.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
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
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
