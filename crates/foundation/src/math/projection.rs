//! Geographic <-> unit-sphere projection.
//!
//! A coordinate is placed the way a two-axis gimbal places its payload: a
//! radial point `(0, 0, r)` is tilted by the latitude about +X, then swung by
//! the longitude about the polar +Y axis. The engine-wide offsets are a fixed
//! mounting of that gimbal: the longitude offset adds to the swing, the
//! latitude offset tilts the whole globe about +X. Both stages are rigid
//! rotations, so [`unproject`] undoes [`project`] exactly for any offsets.
//!
//! Raster cells, boundaries and labels must all go through the same
//! [`Projection`] or they drift apart on screen.

use serde::{Deserialize, Serialize};

use super::geo::{GeoCoordinate, normalize_lon_deg};
use super::vec::Vec3;

/// Net latitude alignment between external geographic data and the globe
/// texture, in degrees.
pub const ENGINE_LAT_OFFSET_DEG: f64 = -0.7;

/// Longitude alignment, in degrees.
pub const ENGINE_LON_OFFSET_DEG: f64 = 0.0;

/// Radius used for outlines: a hair above the globe surface.
pub const SURFACE_RADIUS: f64 = 1.01;

/// Angular offsets applied by every consumer of the projection (radians).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionOffsets {
    pub lon_offset: f64,
    pub lat_offset: f64,
}

impl ProjectionOffsets {
    pub const ZERO: ProjectionOffsets = ProjectionOffsets {
        lon_offset: 0.0,
        lat_offset: 0.0,
    };

    pub fn from_degrees(lon_offset_deg: f64, lat_offset_deg: f64) -> Self {
        Self {
            lon_offset: lon_offset_deg.to_radians(),
            lat_offset: lat_offset_deg.to_radians(),
        }
    }

    /// The tuned engine constants.
    pub fn engine() -> Self {
        Self::from_degrees(ENGINE_LON_OFFSET_DEG, ENGINE_LAT_OFFSET_DEG)
    }
}

impl Default for ProjectionOffsets {
    fn default() -> Self {
        Self::engine()
    }
}

/// A position on (or slightly above) the unit sphere.
///
/// Always derived from a [`GeoCoordinate`] plus offsets; never edited in place.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpherePoint(Vec3);

impl SpherePoint {
    pub fn position(self) -> Vec3 {
        self.0
    }

    pub fn radius(self) -> f64 {
        self.0.length()
    }

    /// Same direction, pushed to `radius`.
    pub fn at_radius(self, radius: f64) -> SpherePoint {
        match self.0.normalized() {
            Some(n) => SpherePoint(n.scale(radius)),
            None => self,
        }
    }

    /// Wraps a raw position, e.g. a ray hit on the globe.
    pub fn from_position(position: Vec3) -> SpherePoint {
        SpherePoint(position)
    }
}

/// Projects `coord` onto the unit sphere.
pub fn project(coord: GeoCoordinate, offsets: ProjectionOffsets) -> SpherePoint {
    project_at(coord, offsets, 1.0)
}

/// Projects `coord` onto a sphere of `radius`.
pub fn project_at(coord: GeoCoordinate, offsets: ProjectionOffsets, radius: f64) -> SpherePoint {
    let lat = coord.lat.to_radians();
    let lon = normalize_lon_deg(coord.lon).to_radians();

    let p = Vec3::new(0.0, 0.0, radius)
        .rotate_x(-lat)
        .rotate_y(lon + offsets.lon_offset)
        .rotate_x(-offsets.lat_offset);
    SpherePoint(p)
}

/// Recovers the geographic coordinate of a sphere position (any radius).
///
/// The zero vector maps to `(0, 0)`. At the poles the longitude is whatever
/// `atan2` yields for the residual direction.
pub fn unproject(point: SpherePoint, offsets: ProjectionOffsets) -> GeoCoordinate {
    let v = point.0.rotate_x(offsets.lat_offset);
    let r = v.length();
    if !(r > 0.0) || !r.is_finite() {
        return GeoCoordinate::new(0.0, 0.0);
    }

    // atan2 keeps full precision near the poles where acos(y / r) does not.
    let lat = v.y.atan2(v.x.hypot(v.z)).to_degrees();
    let lon = v.x.atan2(v.z).to_degrees() - offsets.lon_offset.to_degrees();
    GeoCoordinate::new(lat, normalize_lon_deg(lon))
}

/// Engine projection: offsets plus the default placement radius.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projection {
    pub offsets: ProjectionOffsets,
    pub radius: f64,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            offsets: ProjectionOffsets::engine(),
            radius: SURFACE_RADIUS,
        }
    }
}

impl Projection {
    pub fn new(offsets: ProjectionOffsets) -> Self {
        Self {
            offsets,
            ..Self::default()
        }
    }

    pub fn project(&self, coord: GeoCoordinate) -> SpherePoint {
        project_at(coord, self.offsets, self.radius)
    }

    pub fn project_at(&self, coord: GeoCoordinate, radius: f64) -> SpherePoint {
        project_at(coord, self.offsets, radius)
    }

    pub fn unproject(&self, point: SpherePoint) -> GeoCoordinate {
        unproject(point, self.offsets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn lon_diff(a: f64, b: f64) -> f64 {
        normalize_lon_deg(a - b).abs()
    }

    fn assert_round_trip(coord: GeoCoordinate, offsets: ProjectionOffsets) {
        let back = unproject(project(coord, offsets), offsets);
        assert_close(back.lat, coord.lat, 1e-9);
        if coord.lat.abs() < 90.0 - 1e-6 {
            assert!(
                lon_diff(back.lon, coord.lon) < 1e-7,
                "lon {} -> {} with {offsets:?}",
                coord.lon,
                back.lon
            );
        }
    }

    #[test]
    fn equator_prime_meridian_faces_plus_z() {
        let p = project(GeoCoordinate::new(0.0, 0.0), ProjectionOffsets::ZERO).position();
        assert_close(p.x, 0.0, 1e-12);
        assert_close(p.y, 0.0, 1e-12);
        assert_close(p.z, 1.0, 1e-12);
    }

    #[test]
    fn north_is_up_and_east_is_plus_x() {
        let n = project(GeoCoordinate::new(90.0, 0.0), ProjectionOffsets::ZERO).position();
        assert_close(n.y, 1.0, 1e-12);
        let e = project(GeoCoordinate::new(0.0, 90.0), ProjectionOffsets::ZERO).position();
        assert_close(e.x, 1.0, 1e-12);
    }

    #[test]
    fn radius_is_respected() {
        let p = project_at(GeoCoordinate::new(12.0, 34.0), ProjectionOffsets::engine(), 1.02);
        assert_close(p.radius(), 1.02, 1e-12);
        assert_close(p.at_radius(1.5).radius(), 1.5, 1e-12);
    }

    #[test]
    fn round_trip_across_domain_and_offsets() {
        let offsets = [
            ProjectionOffsets::ZERO,
            ProjectionOffsets::engine(),
            ProjectionOffsets {
                lon_offset: PI * 0.5,
                lat_offset: PI * -0.135,
            },
            ProjectionOffsets::from_degrees(-170.0, 60.0),
        ];
        for off in offsets {
            let mut lat = -90.0;
            while lat <= 90.0 {
                let mut lon = -179.5;
                while lon <= 180.0 {
                    assert_round_trip(GeoCoordinate::new(lat, lon), off);
                    lon += 12.5;
                }
                lat += 7.5;
            }
        }
    }

    #[test]
    fn antimeridian_round_trips_to_plus_180() {
        for off in [ProjectionOffsets::ZERO, ProjectionOffsets::engine()] {
            let back = unproject(project(GeoCoordinate::new(10.0, 180.0), off), off);
            assert!(lon_diff(back.lon, 180.0) < 1e-9);
            assert!(back.lon > -180.0 && back.lon <= 180.0);

            let west = unproject(project(GeoCoordinate::new(10.0, -179.999), off), off);
            assert!(lon_diff(west.lon, -179.999) < 1e-7);
        }
    }

    #[test]
    fn seam_longitudes_project_to_same_point() {
        let off = ProjectionOffsets::engine();
        let a = project(GeoCoordinate::new(5.0, 180.0), off).position();
        let b = project(GeoCoordinate { lat: 5.0, lon: -180.0 }, off).position();
        assert!((a - b).length() < 1e-12);
    }

    #[test]
    fn unproject_ignores_radius() {
        let off = ProjectionOffsets::engine();
        let c = GeoCoordinate::new(-33.0, 151.0);
        let back = unproject(project_at(c, off, 1.07), off);
        assert_close(back.lat, c.lat, 1e-9);
        assert_close(back.lon, c.lon, 1e-9);
    }

    #[test]
    fn zero_vector_unprojects_to_origin() {
        let c = unproject(SpherePoint::from_position(Vec3::ZERO), ProjectionOffsets::engine());
        assert_eq!(c, GeoCoordinate::new(0.0, 0.0));
    }
}
