use foundation::color::Rgba;

use super::Blending;

/// Which faces of a closed surface are drawn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Back,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMaterial {
    pub color: Rgba,
    /// Texture URL resolved by the host; `None` draws flat color.
    pub texture_url: Option<String>,
    pub blending: Blending,
    pub side: Side,
    pub transparent: bool,
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self {
            color: Rgba::WHITE,
            texture_url: None,
            blending: Blending::Normal,
            side: Side::Front,
            transparent: false,
        }
    }
}

/// A UV sphere centered at the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    pub radius: f64,
    pub width_segments: u32,
    pub height_segments: u32,
    pub material: SurfaceMaterial,
}

impl Sphere {
    pub fn new(radius: f64, material: SurfaceMaterial) -> Self {
        Self {
            radius,
            width_segments: 64,
            height_segments: 64,
            material,
        }
    }
}
