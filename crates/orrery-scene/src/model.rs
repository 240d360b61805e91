//! Decoded 3D models.
//!
//! A Wavefront OBJ file is flattened to one primitive per object/group, each
//! carrying the diffuse color and texture of its `.mtl` material.

use std::collections::HashMap;
use std::path::Path;

use glam::Vec3;
use orrery_mesh::Mesh;
use tracing::warn;

use crate::assets::AssetError;
use crate::material::Color;
use crate::resources::TextureData;

#[derive(Clone, Debug)]
pub struct ModelPrimitive {
    pub mesh: Mesh,
    /// Diffuse texture, when the material names one that decodes.
    pub texture: Option<TextureData>,
    pub base_color: Color,
}

#[derive(Clone, Debug, Default)]
pub struct ModelData {
    pub primitives: Vec<ModelPrimitive>,
}

impl ModelData {
    pub fn vertex_count(&self) -> usize {
        self.primitives.iter().map(|p| p.mesh.vertex_count()).sum()
    }
}

/// Import an OBJ file. Materials and their textures are resolved next to it;
/// a missing `.mtl` or texture only costs the primitive its color.
pub(crate) fn import_obj(path: &Path) -> Result<ModelData, AssetError> {
    let (models, materials) =
        tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|source| AssetError::Model {
            path: path.to_path_buf(),
            source,
        })?;
    let materials = materials.unwrap_or_else(|e| {
        warn!("{}: materials unavailable: {e}", path.display());
        Vec::new()
    });

    let base_dir = path.parent().unwrap_or(Path::new(""));
    let mut textures: HashMap<String, Option<TextureData>> = HashMap::new();
    let mut model = ModelData::default();

    for object in &models {
        let Some(mesh) = convert_mesh(&object.mesh) else {
            continue;
        };
        let material = object.mesh.material_id.and_then(|id| materials.get(id));
        let base_color = material
            .and_then(|m| m.diffuse)
            .map_or(Color::WHITE, Color);
        let texture = material
            .and_then(|m| m.diffuse_texture.as_deref())
            .and_then(|name| {
                textures
                    .entry(name.to_string())
                    .or_insert_with(|| load_texture(&base_dir.join(name)))
                    .clone()
            });

        model.primitives.push(ModelPrimitive {
            mesh,
            texture,
            base_color,
        });
    }

    if model.primitives.is_empty() {
        return Err(AssetError::EmptyModel {
            path: path.to_path_buf(),
        });
    }
    Ok(model)
}

fn convert_mesh(mesh: &tobj::Mesh) -> Option<Mesh> {
    let positions: Vec<Vec3> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| Vec3::new(p[0], p[1], p[2]))
        .collect();
    if positions.is_empty() || mesh.indices.is_empty() {
        return None;
    }

    let normals = if mesh.normals.len() == mesh.positions.len() {
        mesh.normals
            .chunks_exact(3)
            .map(|n| Vec3::new(n[0], n[1], n[2]).try_normalize().unwrap_or(Vec3::Y))
            .collect()
    } else {
        smooth_normals(&positions, &mesh.indices)
    };
    let uvs = if mesh.texcoords.len() / 2 == positions.len() {
        mesh.texcoords.chunks_exact(2).map(|t| [t[0], t[1]]).collect()
    } else {
        vec![[0.0, 0.0]; positions.len()]
    };

    let converted = Mesh {
        positions,
        normals,
        uvs,
        indices: mesh.indices.clone(),
    };
    converted.validate().ok()?;
    Some(converted)
}

fn load_texture(path: &Path) -> Option<TextureData> {
    match image::open(path) {
        Ok(image) => {
            let image = image.to_rgba8();
            Some(TextureData {
                width: image.width(),
                height: image.height(),
                rgba: image.into_raw(),
            })
        }
        Err(e) => {
            warn!("model texture {}: {e}", path.display());
            None
        }
    }
}

/// Area-weighted vertex normals for meshes that ship without them.
fn smooth_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}
