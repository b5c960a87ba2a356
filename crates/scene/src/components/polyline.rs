use foundation::color::Rgba;
use foundation::math::Vec3;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Blending {
    #[default]
    Normal,
    Additive,
}

/// Line material. `width_px` is in screen pixels and needs the viewport size
/// at draw time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LineStyle {
    pub color: Rgba,
    pub opacity: f32,
    pub width_px: f32,
    pub blending: Blending,
    pub depth_test: bool,
    pub depth_write: bool,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Rgba::WHITE,
            opacity: 1.0,
            width_px: 1.0,
            blending: Blending::Normal,
            depth_test: true,
            depth_write: true,
        }
    }
}

impl LineStyle {
    /// Color with opacity folded into alpha.
    pub fn effective_color(&self) -> Rgba {
        self.color.with_alpha(self.color.a * self.opacity)
    }

    /// Thin lines (at most one pixel) draw as native GL lines.
    pub fn is_hairline(&self) -> bool {
        self.width_px <= 1.0
    }
}

/// An open polyline in world space. Rings arrive closed (first == last).
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Vec3>,
    pub style: LineStyle,
}

impl Polyline {
    pub fn new(points: Vec<Vec3>, style: LineStyle) -> Self {
        Self { points, style }
    }

    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }
}
