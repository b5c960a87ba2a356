use std::path::Path;

use formats::FeatureAliases;
use foundation::math::{ENGINE_LAT_OFFSET_DEG, ENGINE_LON_OFFSET_DEG, ProjectionOffsets};
use layers::interaction::RouteTable;
use layers::raster::DEFAULT_CELL_BUDGET;
use serde::{Deserialize, Serialize};

/// One raster dataset shown as a selectable layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub key: String,
    pub name: String,
    pub url: String,
    /// Ramp colors, low to high, evenly spaced. Two entries for the classic
    /// two-color ramp.
    pub ramp: Vec<String>,
    #[serde(default = "default_cell_budget")]
    pub cell_budget: usize,
}

/// A selectable country: outline source plus label anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryConfig {
    pub name: String,
    pub code: String,
    pub boundary_url: String,
    pub label_lat: f64,
    pub label_lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub lon_offset_deg: f64,
    pub lat_offset_deg: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            lon_offset_deg: ENGINE_LON_OFFSET_DEG,
            lat_offset_deg: ENGINE_LAT_OFFSET_DEG,
        }
    }
}

impl ProjectionConfig {
    pub fn offsets(&self) -> ProjectionOffsets {
        ProjectionOffsets::from_degrees(self.lon_offset_deg, self.lat_offset_deg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub distance: f64,
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub damping: bool,
    /// Orbit distance a fly-to settles at.
    pub focus_distance: f64,
    pub focus_duration_s: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 4.0,
            fov_deg: 60.0,
            near: 0.1,
            far: 10.0,
            min_distance: 1.5,
            max_distance: 3.0,
            damping: true,
            focus_distance: 2.2,
            focus_duration_s: 1.0,
        }
    }
}

/// Viewer setup. Every field has a default, so `{}` is a complete config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Base URL (`http(s)://…`) or directory that relative urls resolve
    /// against.
    pub data_root: String,
    pub globe_texture_url: String,
    pub global_boundaries_url: String,
    pub datasets: Vec<DatasetConfig>,
    pub countries: Vec<CountryConfig>,
    pub projection: ProjectionConfig,
    pub camera: CameraConfig,
    pub aliases: FeatureAliases,
    pub routes: RouteTable,
    pub viewport: [u32; 2],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_root: ".".to_string(),
            globe_texture_url: "/assets/world_white.png".to_string(),
            global_boundaries_url: "/data/globalboundaries_simplified.geojson".to_string(),
            datasets: vec![
                dataset("tree", "Tree Cover in 2000", "/data/forestclipped.asc", ["#F7FBEA", "#CBEAA6"]),
                dataset("gdpasc", "GDP 2000 (ASC)", "/data/2000GDPresample.asc", ["#D9BFD6", "#3A0D3E"]),
            ],
            countries: vec![
                country("Brazil", "BRA", "/data/Brazil.geojson", -10.0, -52.0),
                country("Poland", "POL", "/data/Poland.geojson", 52.0, 19.0),
                country("South Korea", "KOR", "/data/SouthKorea.geojson", 36.0, 128.0),
            ],
            projection: ProjectionConfig::default(),
            camera: CameraConfig::default(),
            aliases: FeatureAliases::default(),
            routes: RouteTable::default(),
            viewport: [1280, 720],
        }
    }
}

impl ViewerConfig {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Ok(Self::from_json(&text)?)
    }
}

fn default_cell_budget() -> usize {
    DEFAULT_CELL_BUDGET
}

fn dataset(key: &str, name: &str, url: &str, ramp: [&str; 2]) -> DatasetConfig {
    DatasetConfig {
        key: key.to_string(),
        name: name.to_string(),
        url: url.to_string(),
        ramp: ramp.iter().map(|c| c.to_string()).collect(),
        cell_budget: DEFAULT_CELL_BUDGET,
    }
}

fn country(name: &str, code: &str, url: &str, lat: f64, lon: f64) -> CountryConfig {
    CountryConfig {
        name: name.to_string(),
        code: code.to_string(),
        boundary_url: url.to_string(),
        label_lat: lat,
        label_lon: lon,
    }
}
