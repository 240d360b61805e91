//! Draws a scene graph: sky first, then every visual with the body pipeline.

use std::num::NonZeroU64;

use glam::Vec3;
use orrery_scene::{MeshHandle, SceneGraph, SceneResources, TextureHandle};

use crate::background::BackgroundPass;
use crate::buffer::MeshBuffer;
use crate::camera::Camera;
use crate::depth::DepthBuffer;
use crate::gpu::{RenderContext, SurfaceError};
use crate::pipeline::{BodyPipeline, FrameUniform, ObjectUniform, object_stride};
use crate::texture::TextureStore;

const MIN_OBJECT_CAPACITY: u64 = 64;

/// Everything besides the graph that one frame needs.
#[derive(Clone, Debug)]
pub struct FrameView {
    pub camera: Camera,
    pub sun_position: Vec3,
    pub ambient: f32,
    pub emission: f32,
    pub background: Option<TextureHandle>,
}

struct Draw {
    mesh: MeshHandle,
    texture: Option<TextureHandle>,
}

pub struct SceneRenderer {
    textures: TextureStore,
    bodies: BodyPipeline,
    background: BackgroundPass,
    depth: DepthBuffer,
    meshes: Vec<MeshBuffer>,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    object_capacity: u64,
    object_stride: u64,
    staging: Vec<u8>,
    draws: Vec<Draw>,
}

impl SceneRenderer {
    pub fn new(ctx: &RenderContext) -> Self {
        let device = &ctx.device;
        let textures = TextureStore::new(device, &ctx.queue);
        let bodies = BodyPipeline::new(device, ctx.surface_format, textures.layout());
        let background = BackgroundPass::new(device, ctx.surface_format, textures.layout());
        let (width, height) = ctx.size();
        let depth = DepthBuffer::new(device, width, height);

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame-uniform"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame-bind-group"),
            layout: &bodies.frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let stride = object_stride(device.limits().min_uniform_buffer_offset_alignment);
        let (object_buffer, object_bind_group) =
            create_object_buffer(device, &bodies.object_layout, stride, MIN_OBJECT_CAPACITY);

        Self {
            textures,
            bodies,
            background,
            depth,
            meshes: Vec::new(),
            frame_buffer,
            frame_bind_group,
            object_buffer,
            object_bind_group,
            object_capacity: MIN_OBJECT_CAPACITY,
            object_stride: stride,
            staging: Vec::new(),
            draws: Vec::new(),
        }
    }

    pub fn resize(&mut self, ctx: &RenderContext) {
        let (width, height) = ctx.size();
        self.depth.resize(&ctx.device, width, height);
    }

    /// Upload meshes and textures added since the last sync.
    pub fn sync(&mut self, ctx: &RenderContext, resources: &SceneResources) {
        let meshes = resources.meshes();
        if self.meshes.len() < meshes.len() {
            let first = self.meshes.len();
            for (i, mesh) in meshes.iter().enumerate().skip(first) {
                self.meshes
                    .push(MeshBuffer::upload(&ctx.device, &format!("mesh-{i}"), mesh));
            }
            log::debug!("Uploaded {} meshes", meshes.len() - first);
        }
        self.textures.sync(&ctx.device, &ctx.queue, resources);
    }

    pub fn render(
        &mut self,
        ctx: &RenderContext,
        graph: &SceneGraph,
        resources: &SceneResources,
        view: &FrameView,
    ) -> Result<(), SurfaceError> {
        self.sync(ctx, resources);
        self.prepare_objects(ctx, graph);

        let frame = FrameUniform::new(
            view.camera.view_projection_matrix(),
            view.camera.position,
            view.sun_position,
            view.ambient,
            view.emission,
        );
        ctx.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));
        self.background
            .update(&ctx.queue, view.camera.inverse_rotation_projection());

        let output = ctx.get_current_texture()?;
        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("orrery-frame"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("orrery-main-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(self.depth.attachment()),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(sky) = view.background.and_then(|h| self.textures.get(h)) {
                self.background.draw(&mut pass, &sky.bind_group);
            }

            pass.set_pipeline(&self.bodies.pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for (i, draw) in self.draws.iter().enumerate() {
                let Some(mesh) = self.meshes.get(draw.mesh.0 as usize) else {
                    continue;
                };
                let offset = (i as u64 * self.object_stride) as u32;
                pass.set_bind_group(1, &self.object_bind_group, &[offset]);
                let texture = self.textures.get_or_fallback(draw.texture);
                pass.set_bind_group(2, &texture.bind_group, &[]);
                mesh.bind(&mut pass);
                mesh.draw(&mut pass);
            }
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Walk the graph into `draws` and write all object uniforms.
    fn prepare_objects(&mut self, ctx: &RenderContext, graph: &SceneGraph) {
        self.draws.clear();
        self.staging.clear();
        let stride = self.object_stride as usize;
        let textures = &self.textures;
        let draws = &mut self.draws;
        let staging = &mut self.staging;

        graph.visit_visuals(|world, visual| {
            let texture = visual.material.texture().filter(|h| textures.get(*h).is_some());
            let uniform = ObjectUniform::new(world, visual, texture.is_some());
            let start = staging.len();
            staging.extend_from_slice(bytemuck::bytes_of(&uniform));
            staging.resize(start + stride, 0);
            draws.push(Draw {
                mesh: visual.mesh,
                texture,
            });
        });

        let needed = self.draws.len() as u64;
        if needed > self.object_capacity {
            let capacity = needed.next_power_of_two().max(MIN_OBJECT_CAPACITY);
            let (buffer, bind_group) = create_object_buffer(
                &ctx.device,
                &self.bodies.object_layout,
                self.object_stride,
                capacity,
            );
            self.object_buffer = buffer;
            self.object_bind_group = bind_group;
            self.object_capacity = capacity;
            log::debug!("Object buffer grown to {capacity} entries");
        }
        if !self.staging.is_empty() {
            ctx.queue.write_buffer(&self.object_buffer, 0, &self.staging);
        }
    }
}

fn create_object_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    capacity: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("object-uniforms"),
        size: stride * capacity,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("object-bind-group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(std::mem::size_of::<ObjectUniform>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}
