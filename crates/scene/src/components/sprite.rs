use foundation::math::Vec3;

use crate::entity::TextureId;

/// A camera-facing textured quad with a fixed world-space size.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub position: Vec3,
    pub width: f64,
    pub height: f64,
    pub texture: Option<TextureId>,
    pub depth_test: bool,
    pub depth_write: bool,
}

impl Sprite {
    pub fn new(position: Vec3, width: f64, height: f64) -> Self {
        Self {
            position,
            width,
            height,
            texture: None,
            depth_test: false,
            depth_write: false,
        }
    }

    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }
}
