//! GPU copies of scene textures with ready-to-bind bind groups.

use orrery_scene::{SceneResources, TextureData, TextureHandle, TextureSlot};

/// Color textures are stored as sRGB so sampling returns linear values.
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// A texture with its view and bind group (group layout: texture, sampler).
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
    pub dimensions: (u32, u32),
}

/// Mirrors the texture slots of [`SceneResources`] on the GPU.
///
/// Slots that are pending or failed resolve to a 1x1 white texture, so a
/// draw always has something to bind.
pub struct TextureStore {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    fallback: GpuTexture,
    slots: Vec<Option<GpuTexture>>,
    synced_revision: Option<u64>,
}

impl TextureStore {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture-bind-group-layout"),
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

        // Repeat across the longitude seam, clamp at the poles.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sampler-linear"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let white = TextureData::solid(1, 1, [255; 4]);
        let fallback = upload(device, queue, &layout, &sampler, "fallback-white", &white);

        Self {
            layout,
            sampler,
            fallback,
            slots: Vec::new(),
            synced_revision: None,
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Upload every texture that became ready since the last call.
    /// Returns the number of uploads.
    pub fn sync(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        resources: &SceneResources,
    ) -> usize {
        if self.synced_revision == Some(resources.revision()) {
            return 0;
        }
        self.synced_revision = Some(resources.revision());

        let slots = resources.textures();
        if self.slots.len() < slots.len() {
            self.slots.resize_with(slots.len(), || None);
        }

        let mut uploaded = 0;
        for (i, slot) in slots.iter().enumerate() {
            let TextureSlot::Ready(data) = slot else {
                continue;
            };
            if self.slots[i].is_some() {
                continue;
            }
            if !data.is_consistent() || data.width == 0 || data.height == 0 {
                log::warn!(
                    "Skipping texture {i}: {} bytes for {}x{}",
                    data.rgba.len(),
                    data.width,
                    data.height
                );
                continue;
            }
            let label = format!("texture-{i}");
            self.slots[i] = Some(upload(device, queue, &self.layout, &self.sampler, &label, data));
            uploaded += 1;
        }
        uploaded
    }

    /// The uploaded texture, if ready.
    pub fn get(&self, handle: TextureHandle) -> Option<&GpuTexture> {
        self.slots.get(handle.0 as usize)?.as_ref()
    }

    /// The uploaded texture, or the white fallback.
    pub fn get_or_fallback(&self, handle: Option<TextureHandle>) -> &GpuTexture {
        handle
            .and_then(|h| self.get(h))
            .unwrap_or(&self.fallback)
    }
}

fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    label: &str,
    data: &TextureData,
) -> GpuTexture {
    let size = wgpu::Extent3d {
        width: data.width,
        height: data.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &data.rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * data.width),
            rows_per_image: None,
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label}-bind-group")),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    log::info!("Uploaded texture '{label}' ({}x{})", data.width, data.height);
    GpuTexture {
        texture,
        view,
        bind_group,
        dimensions: (data.width, data.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::tests::create_test_device;

    #[test]
    fn test_sync_uploads_ready_slots_once() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let mut store = TextureStore::new(&device, &queue);
        let mut resources = SceneResources::new();
        let ready = resources.add_texture(TextureData::solid(4, 4, [0, 128, 255, 255]));
        let pending = resources.reserve_texture();

        assert_eq!(store.sync(&device, &queue, &resources), 1);
        assert_eq!(store.sync(&device, &queue, &resources), 0, "nothing changed");
        assert_eq!(store.get(ready).map(|t| t.dimensions), Some((4, 4)));
        assert!(store.get(pending).is_none());
        assert_eq!(store.get_or_fallback(Some(pending)).dimensions, (1, 1));

        resources.fulfil_texture(pending, TextureData::solid(2, 2, [1; 4]));
        assert_eq!(store.sync(&device, &queue, &resources), 1);
    }
}
