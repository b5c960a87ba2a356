use foundation::math::Vec3;
use scene::picking::Ray;

/// Drawable surface size in physical pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Viewport {
    pub width_px: u32,
    pub height_px: u32,
}

impl Viewport {
    pub fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px: width_px.max(1),
            height_px: height_px.max(1),
        }
    }

    pub fn aspect(&self) -> f64 {
        self.width_px as f64 / self.height_px as f64
    }

    /// Pixel (origin top-left) to normalized device coordinates in [-1, 1]
    /// with +y up.
    pub fn pixel_to_ndc(&self, x_px: f64, y_px: f64) -> (f64, f64) {
        (
            (x_px / self.width_px as f64) * 2.0 - 1.0,
            1.0 - (y_px / self.height_px as f64) * 2.0,
        )
    }

    pub fn ndc_to_pixel(&self, ndc_x: f64, ndc_y: f64) -> (f64, f64) {
        (
            (ndc_x + 1.0) * 0.5 * self.width_px as f64,
            (1.0 - ndc_y) * 0.5 * self.height_px as f64,
        )
    }
}

/// Orthonormal camera frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraBasis {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_rad: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Camera3D {
    pub fn look_at(position: Vec3, target: Vec3, fov_y_rad: f64, near: f64, far: f64) -> Self {
        Self {
            position,
            target,
            up: Vec3::Y,
            fov_y_rad,
            aspect: 1.0,
            near,
            far,
        }
    }

    pub fn set_aspect(&mut self, aspect: f64) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// `None` when position and target coincide or `up` is parallel to the
    /// view direction.
    pub fn basis(&self) -> Option<CameraBasis> {
        let forward = (self.target - self.position).normalized()?;
        let right = forward.cross(self.up).normalized()?;
        let up = right.cross(forward);
        Some(CameraBasis { forward, right, up })
    }

    pub fn distance_to_target(&self) -> f64 {
        (self.position - self.target).length()
    }

    /// World ray through the NDC point.
    pub fn ray_from_ndc(&self, ndc_x: f64, ndc_y: f64) -> Option<Ray> {
        let b = self.basis()?;
        let t = (self.fov_y_rad * 0.5).tan();
        let dir = b.forward + b.right.scale(ndc_x * t * self.aspect) + b.up.scale(ndc_y * t);
        Some(Ray::new(self.position, dir.normalized()?))
    }

    /// `[x, y, depth]` in NDC, depth in [-1, 1] between near and far. `None`
    /// for points behind the camera.
    pub fn project_to_ndc(&self, p: Vec3) -> Option<[f64; 3]> {
        let b = self.basis()?;
        let rel = p - self.position;
        let z = rel.dot(b.forward);
        if z <= 0.0 {
            return None;
        }
        let t = (self.fov_y_rad * 0.5).tan();
        let x = rel.dot(b.right) / (z * t * self.aspect);
        let y = rel.dot(b.up) / (z * t);
        let (n, f) = (self.near, self.far);
        let depth = (f + n) / (f - n) - (2.0 * f * n) / ((f - n) * z);
        Some([x, y, depth])
    }
}

#[cfg(test)]
mod tests {
    use super::{Camera3D, Viewport};
    use foundation::math::Vec3;

    fn cam() -> Camera3D {
        Camera3D::look_at(
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::ZERO,
            60f64.to_radians(),
            0.1,
            10.0,
        )
    }

    #[test]
    fn center_ray_points_at_target() {
        let ray = cam().ray_from_ndc(0.0, 0.0).expect("ray");
        assert!((ray.dir - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn project_inverts_ray() {
        let mut c = cam();
        c.set_aspect(16.0 / 9.0);
        let ray = c.ray_from_ndc(0.3, -0.4).expect("ray");
        let p = ray.at(2.5);
        let ndc = c.project_to_ndc(p).expect("in front");
        assert!((ndc[0] - 0.3).abs() < 1e-9);
        assert!((ndc[1] + 0.4).abs() < 1e-9);
        assert!(ndc[2] > -1.0 && ndc[2] < 1.0);
    }

    #[test]
    fn behind_camera_is_none() {
        assert!(cam().project_to_ndc(Vec3::new(5.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn pixel_ndc_mapping() {
        let vp = Viewport::new(800, 600);
        assert_eq!(vp.pixel_to_ndc(400.0, 300.0), (0.0, 0.0));
        assert_eq!(vp.pixel_to_ndc(0.0, 0.0), (-1.0, 1.0));
        assert_eq!(vp.ndc_to_pixel(1.0, -1.0), (800.0, 600.0));
    }

    #[test]
    fn zero_sized_viewport_is_clamped() {
        let vp = Viewport::new(0, 0);
        assert_eq!(vp.aspect(), 1.0);
    }
}
