use serde::{Deserialize, Serialize};

/// Normalizes a longitude in degrees into `(-180, 180]`.
///
/// Non-finite input is returned unchanged.
pub fn normalize_lon_deg(lon: f64) -> f64 {
    if !lon.is_finite() {
        return lon;
    }
    let r = lon.rem_euclid(360.0);
    if r > 180.0 { r - 360.0 } else { r }
}

/// Geographic coordinate in degrees.
///
/// `lat` is clamped to `[-90, 90]` and `lon` normalized to `(-180, 180]` on
/// construction.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCoordinate")]
pub struct GeoCoordinate {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
}

impl From<RawCoordinate> for GeoCoordinate {
    fn from(raw: RawCoordinate) -> Self {
        GeoCoordinate::new(raw.lat, raw.lon)
    }
}

impl GeoCoordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat: lat.clamp(-90.0, 90.0),
            lon: normalize_lon_deg(lon),
        }
    }

    /// GeoJSON position order.
    pub fn from_lon_lat(lon: f64, lat: f64) -> Self {
        Self::new(lat, lon)
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}
