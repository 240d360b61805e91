//! The shared body pipeline.
//!
//! Bind groups: 0 = per-frame uniform, 1 = per-object uniform addressed
//! with a dynamic offset, 2 = base-color texture and sampler.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};
use orrery_scene::Visual;

use crate::buffer::vertex_layout;
use crate::depth::DepthBuffer;

/// Camera and light, written once per frame.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub sun_pos: [f32; 4],
    /// x = ambient term, y = emission multiplier.
    pub light: [f32; 4],
}

impl FrameUniform {
    pub fn new(view_proj: Mat4, camera_pos: Vec3, sun_pos: Vec3, ambient: f32, emission: f32) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: camera_pos.extend(1.0).to_array(),
            sun_pos: sun_pos.extend(1.0).to_array(),
            light: [ambient, emission, 0.0, 0.0],
        }
    }
}

/// One drawn node.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of the model matrix's upper 3x3, padded to 4x4.
    pub normal: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    /// x = sample the texture, y = emissive.
    pub flags: [f32; 4],
}

static_assertions::assert_eq_size!(FrameUniform, [u8; 112]);
static_assertions::assert_eq_size!(ObjectUniform, [u8; 160]);

impl ObjectUniform {
    /// `textured` says whether the visual's texture is actually bound.
    pub fn new(model: Mat4, visual: &Visual, textured: bool) -> Self {
        let normal = Mat4::from_mat3(Mat3::from_mat4(model).inverse().transpose());
        let [r, g, b] = visual.material.base_color().0;
        Self {
            model: model.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
            base_color: [r, g, b, 1.0],
            flags: [
                if textured { 1.0 } else { 0.0 },
                if visual.emissive { 1.0 } else { 0.0 },
                0.0,
                0.0,
            ],
        }
    }
}

/// Distance between consecutive objects in the object buffer.
pub fn object_stride(min_uniform_alignment: u32) -> u64 {
    let size = std::mem::size_of::<ObjectUniform>() as u64;
    let align = u64::from(min_uniform_alignment.max(1));
    size.div_ceil(align) * align
}

pub struct BodyPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub frame_layout: wgpu::BindGroupLayout,
    pub object_layout: wgpu::BindGroupLayout,
}

impl BodyPipeline {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        texture_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("body-shader"),
            source: wgpu::ShaderSource::Wgsl(BODY_SHADER_SOURCE.into()),
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame-bind-group-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<FrameUniform>() as u64),
                },
                count: None,
            }],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object-bind-group-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<ObjectUniform>() as u64),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("body-pipeline-layout"),
            bind_group_layouts: &[&frame_layout, &object_layout, texture_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("body-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Loaded models do not promise consistent winding.
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthBuffer::FORMAT,
                depth_write_enabled: true,
                depth_compare: DepthBuffer::COMPARE_FUNCTION,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            frame_layout,
            object_layout,
        }
    }
}

pub const BODY_SHADER_SOURCE: &str = r#"
struct FrameUniform {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    sun_pos: vec4<f32>,
    light: vec4<f32>,
};

struct ObjectUniform {
    model: mat4x4<f32>,
    normal: mat4x4<f32>,
    base_color: vec4<f32>,
    flags: vec4<f32>,
};

@group(0) @binding(0) var<uniform> frame: FrameUniform;
@group(1) @binding(0) var<uniform> object: ObjectUniform;
@group(2) @binding(0) var t_base: texture_2d<f32>;
@group(2) @binding(1) var s_base: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let world = object.model * vec4<f32>(in.position, 1.0);
    var out: VertexOutput;
    out.clip_position = frame.view_proj * world;
    out.world_pos = world.xyz;
    out.normal = (object.normal * vec4<f32>(in.normal, 0.0)).xyz;
    // Mesh UVs put v = 1 on the top row of the image.
    out.uv = vec2<f32>(in.uv.x, 1.0 - in.uv.y);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let tex = textureSample(t_base, s_base, in.uv).rgb;
    let base = select(object.base_color.rgb, tex, object.flags.x > 0.5);

    if (object.flags.y > 0.5) {
        return vec4<f32>(base * frame.light.y, 1.0);
    }

    let n = normalize(in.normal);
    let l = normalize(frame.sun_pos.xyz - in.world_pos);
    let diffuse = max(dot(n, l), 0.0);
    return vec4<f32>(base * (frame.light.x + diffuse), 1.0);
}
"#;
