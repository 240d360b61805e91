//! GPU-independent storage for meshes and textures referenced by the graph.

use std::sync::Arc;

use orrery_mesh::Mesh;

/// Index of a mesh in [`SceneResources`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// Index of a texture slot in [`SceneResources`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Identifies one outstanding model load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelHandle(pub u32);

/// Decoded RGBA8 pixels, row-major, top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureData {
    /// A `width` x `height` texture filled with one color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let texels = (width * height) as usize;
        Self {
            width,
            height,
            rgba: rgba.repeat(texels),
        }
    }

    /// True when the pixel buffer matches the dimensions.
    pub fn is_consistent(&self) -> bool {
        self.rgba.len() == (self.width as usize) * (self.height as usize) * 4
    }
}

/// Lifecycle of a texture handed out before its pixels exist.
#[derive(Clone, Debug)]
pub enum TextureSlot {
    Pending,
    Ready(Arc<TextureData>),
    Failed,
}

/// Append-only mesh store plus texture slots.
///
/// `revision` increases on every change so a renderer can skip its sync pass
/// when nothing happened since the last frame.
#[derive(Debug, Default)]
pub struct SceneResources {
    meshes: Vec<Arc<Mesh>>,
    textures: Vec<TextureSlot>,
    revision: u64,
}

impl SceneResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        let handle = MeshHandle(self.meshes.len() as u32);
        self.meshes.push(Arc::new(mesh));
        self.revision += 1;
        handle
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&Arc<Mesh>> {
        self.meshes.get(handle.0 as usize)
    }

    /// All meshes in handle order.
    pub fn meshes(&self) -> &[Arc<Mesh>] {
        &self.meshes
    }

    /// Allocate a slot that a later load will fill.
    pub fn reserve_texture(&mut self) -> TextureHandle {
        let handle = TextureHandle(self.textures.len() as u32);
        self.textures.push(TextureSlot::Pending);
        self.revision += 1;
        handle
    }

    /// Store already-decoded pixels in a fresh slot.
    pub fn add_texture(&mut self, data: TextureData) -> TextureHandle {
        let handle = self.reserve_texture();
        self.fulfil_texture(handle, data);
        handle
    }

    /// Mark `handle` ready. Unknown handles are ignored.
    pub fn fulfil_texture(&mut self, handle: TextureHandle, data: TextureData) {
        if let Some(slot) = self.textures.get_mut(handle.0 as usize) {
            *slot = TextureSlot::Ready(Arc::new(data));
            self.revision += 1;
        }
    }

    pub fn fail_texture(&mut self, handle: TextureHandle) {
        if let Some(slot) = self.textures.get_mut(handle.0 as usize) {
            *slot = TextureSlot::Failed;
            self.revision += 1;
        }
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&TextureSlot> {
        self.textures.get(handle.0 as usize)
    }

    /// All texture slots in handle order.
    pub fn textures(&self) -> &[TextureSlot] {
        &self.textures
    }

    /// Ready texture pixels, if any.
    pub fn ready_texture(&self, handle: TextureHandle) -> Option<&Arc<TextureData>> {
        match self.texture(handle)? {
            TextureSlot::Ready(data) => Some(data),
            TextureSlot::Pending | TextureSlot::Failed => None,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn pending_textures(&self) -> usize {
        self.textures
            .iter()
            .filter(|slot| matches!(slot, TextureSlot::Pending))
            .count()
    }
}
