use std::f64::consts::PI;

use foundation::math::Vec3;

use crate::camera::Camera3D;

const POLAR_EPS: f64 = 1e-6;
const SETTLE_EPS: f64 = 1e-6;

/// Camera position around `target` as (azimuth, polar, distance). Azimuth is
/// measured around +Y from +Z; polar from +Y.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Spherical {
    pub azimuth: f64,
    pub polar: f64,
    pub distance: f64,
}

impl Spherical {
    pub fn from_offset(offset: Vec3) -> Self {
        let distance = offset.length();
        if distance <= 0.0 {
            return Self {
                azimuth: 0.0,
                polar: PI * 0.5,
                distance: 0.0,
            };
        }
        Self {
            azimuth: offset.x.atan2(offset.z),
            polar: (offset.y / distance).clamp(-1.0, 1.0).acos(),
            distance,
        }
    }

    pub fn to_offset(self) -> Vec3 {
        let s = self.polar.sin();
        Vec3::new(
            self.distance * s * self.azimuth.sin(),
            self.distance * self.polar.cos(),
            self.distance * s * self.azimuth.cos(),
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitSettings {
    pub min_distance: f64,
    pub max_distance: f64,
    pub enable_damping: bool,
    pub damping_factor: f64,
    pub rotate_speed: f64,
    pub zoom_speed: f64,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            min_distance: 1.5,
            max_distance: 3.0,
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
        }
    }
}

/// Orbit camera controller with damped rotation and clamped dolly.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub settings: OrbitSettings,
    pub target: Vec3,
    delta_azimuth: f64,
    delta_polar: f64,
    dolly_scale: f64,
}

impl OrbitControls {
    pub fn new(settings: OrbitSettings) -> Self {
        Self {
            settings,
            target: Vec3::ZERO,
            delta_azimuth: 0.0,
            delta_polar: 0.0,
            dolly_scale: 1.0,
        }
    }

    /// Pointer drag in pixels. A drag across the full viewport height turns
    /// the globe once.
    pub fn rotate(&mut self, dx_px: f64, dy_px: f64, viewport_height_px: f64) {
        if viewport_height_px <= 0.0 {
            return;
        }
        let k = 2.0 * PI * self.settings.rotate_speed / viewport_height_px;
        self.delta_azimuth -= dx_px * k;
        self.delta_polar -= dy_px * k;
    }

    /// Wheel input; positive `steps` zoom in.
    pub fn zoom(&mut self, steps: f64) {
        let per_step = 0.95f64.powf(self.settings.zoom_speed);
        self.dolly_scale *= per_step.powf(steps);
    }

    /// Pending rotation still decaying under damping.
    pub fn is_settling(&self) -> bool {
        self.delta_azimuth.abs() > SETTLE_EPS || self.delta_polar.abs() > SETTLE_EPS
    }

    /// Applies pending input to `camera`. Returns true when the camera moved.
    pub fn update(&mut self, camera: &mut Camera3D) -> bool {
        let before = camera.position;
        let mut s = Spherical::from_offset(camera.position - self.target);

        let step = if self.settings.enable_damping {
            self.settings.damping_factor
        } else {
            1.0
        };
        s.azimuth += self.delta_azimuth * step;
        s.polar += self.delta_polar * step;
        s.polar = s.polar.clamp(POLAR_EPS, PI - POLAR_EPS);
        s.distance = (s.distance * self.dolly_scale)
            .clamp(self.settings.min_distance, self.settings.max_distance);

        if self.settings.enable_damping {
            self.delta_azimuth *= 1.0 - self.settings.damping_factor;
            self.delta_polar *= 1.0 - self.settings.damping_factor;
            if !self.is_settling() {
                self.delta_azimuth = 0.0;
                self.delta_polar = 0.0;
            }
        } else {
            self.delta_azimuth = 0.0;
            self.delta_polar = 0.0;
        }
        self.dolly_scale = 1.0;

        camera.position = self.target + s.to_offset();
        camera.target = self.target;
        (camera.position - before).length() > SETTLE_EPS
    }

    /// Places the camera at `spherical`, dropping pending input.
    pub fn jump_to(&mut self, camera: &mut Camera3D, mut spherical: Spherical) {
        spherical.polar = spherical.polar.clamp(POLAR_EPS, PI - POLAR_EPS);
        spherical.distance = spherical
            .distance
            .clamp(self.settings.min_distance, self.settings.max_distance);
        self.delta_azimuth = 0.0;
        self.delta_polar = 0.0;
        self.dolly_scale = 1.0;
        camera.position = self.target + spherical.to_offset();
        camera.target = self.target;
    }

    pub fn spherical(&self, camera: &Camera3D) -> Spherical {
        Spherical::from_offset(camera.position - self.target)
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(OrbitSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::{OrbitControls, OrbitSettings, Spherical};
    use crate::camera::Camera3D;
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
    fn first_update_clamps_distance() {
        let mut c = cam();
        let mut controls = OrbitControls::default();
        assert!(controls.update(&mut c));
        assert!((c.distance_to_target() - 3.0).abs() < 1e-9);
        assert!(!controls.update(&mut c));
    }

    #[test]
    fn zoom_respects_min_distance() {
        let mut c = cam();
        let mut controls = OrbitControls::default();
        controls.zoom(200.0);
        controls.update(&mut c);
        assert!((c.distance_to_target() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn damped_rotation_settles() {
        let mut c = cam();
        let mut controls = OrbitControls::default();
        controls.update(&mut c);
        controls.rotate(100.0, 0.0, 600.0);
        assert!(controls.update(&mut c));
        assert!(controls.is_settling());
        for _ in 0..1000 {
            controls.update(&mut c);
        }
        assert!(!controls.is_settling());
        assert!(!controls.update(&mut c));
    }

    #[test]
    fn undamped_rotation_applies_at_once() {
        let mut c = cam();
        let mut controls = OrbitControls::new(OrbitSettings {
            enable_damping: false,
            ..OrbitSettings::default()
        });
        controls.update(&mut c);
        let before = controls.spherical(&c).azimuth;
        controls.rotate(-150.0, 0.0, 600.0);
        controls.update(&mut c);
        let after = controls.spherical(&c).azimuth;
        assert!((after - before - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
        assert!(!controls.is_settling());
    }

    #[test]
    fn spherical_round_trip() {
        let s = Spherical {
            azimuth: 0.7,
            polar: 1.1,
            distance: 2.2,
        };
        let back = Spherical::from_offset(s.to_offset());
        assert!((back.azimuth - s.azimuth).abs() < 1e-12);
        assert!((back.polar - s.polar).abs() < 1e-12);
        assert!((back.distance - s.distance).abs() < 1e-12);
    }
}
