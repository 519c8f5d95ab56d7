use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Named texture slots. Materials refer to a role rather than a loaded
/// texture so that parts can be generated before any image has resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureRole {
    Wood,
    Tile,
    Wall,
}

/// Phong style surface description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Vec3,
    pub texture: Option<TextureRole>,
    /// Texture coordinate scale. Only meaningful with a texture.
    pub uv_repeat: Vec2,
    /// Multiplies the lit color by the dynamic reflection capture.
    pub env_map: bool,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            texture: None,
            uv_repeat: Vec2::ONE,
            env_map: false,
            shininess: 30.0,
        }
    }
}

impl Material {
    pub fn flat(hex: u32) -> Self {
        Self {
            color: color_from_hex(hex),
            ..Self::default()
        }
    }

    pub fn textured(role: TextureRole, uv_repeat: Vec2) -> Self {
        Self {
            texture: Some(role),
            uv_repeat,
            ..Self::default()
        }
    }

    pub fn reflective() -> Self {
        Self {
            env_map: true,
            ..Self::default()
        }
    }
}

/// Converts a `0xRRGGBB` literal into a linear 0..1 color triple.
pub fn color_from_hex(hex: u32) -> Vec3 {
    let r = ((hex >> 16) & 0xff) as f32;
    let g = ((hex >> 8) & 0xff) as f32;
    let b = (hex & 0xff) as f32;
    Vec3::new(r / 255.0, g / 255.0, b / 255.0)
}
