//! Body materials: one flat-colored and one textured variant, both drawn by
//! the same shader with a flag selecting the texture path.

use crate::resources::TextureHandle;

/// Linear RGB color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color(pub [f32; 3]);

impl Color {
    pub const WHITE: Color = Color([1.0, 1.0, 1.0]);

    /// From a `0xRRGGBB` literal.
    pub const fn from_hex(hex: u32) -> Self {
        Color([
            ((hex >> 16) & 0xff) as f32 / 255.0,
            ((hex >> 8) & 0xff) as f32 / 255.0,
            (hex & 0xff) as f32 / 255.0,
        ])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Material {
    Flat { color: Color },
    /// Sampled from `texture`; `fallback` is drawn until the texture is ready
    /// and for good if it fails to load.
    Textured {
        texture: TextureHandle,
        fallback: Color,
    },
}

impl Material {
    /// Textured when a texture was requested, flat otherwise. The color
    /// defaults to white in both cases.
    pub fn resolve(texture: Option<TextureHandle>, color: Option<Color>) -> Self {
        let color = color.unwrap_or_default();
        match texture {
            Some(texture) => Material::Textured {
                texture,
                fallback: color,
            },
            None => Material::Flat { color },
        }
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        match *self {
            Material::Textured { texture, .. } => Some(texture),
            Material::Flat { .. } => None,
        }
    }

    /// The color used whenever no texture is sampled.
    pub fn base_color(&self) -> Color {
        match *self {
            Material::Flat { color } => color,
            Material::Textured { fallback, .. } => fallback,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::Flat {
            color: Color::WHITE,
        }
    }
}
