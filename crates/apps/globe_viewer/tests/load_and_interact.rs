use std::fs;
use std::path::Path;

use foundation::time::Time;
use globe_viewer::config::{CountryConfig, DatasetConfig};
use globe_viewer::{
    load_all, DataSource, GlobeViewer, LoadError, LoadOutcome, RecordingNavigator, ViewerConfig,
};
use layers::layer_set::LayerStatus;
use pretty_assertions::assert_eq;

const GRID_4X4: &str = "ncols 4\nnrows 4\nxllcorner 0\nyllcorner 0\ncellsize 1\nNODATA_value -9999\n\
1 2 3 -9999\n1 2 3 -9999\n1 2 3 -9999\n1 2 3 -9999\n";

const POLAND: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    { "type": "Feature", "properties": { "NAME": "Poland" },
      "geometry": { "type": "Polygon", "coordinates": [[[14,50],[24,50],[24,54],[14,54],[14,50]]] } },
    { "type": "Feature", "properties": { "NAME": "Capital" },
      "geometry": { "type": "Point", "coordinates": [21,52] } }
  ]
}"#;

const WORLD: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    { "type": "Feature", "properties": { "ADMIN": "A" },
      "geometry": { "type": "MultiPolygon", "coordinates": [[[[0,0],[5,0],[5,5],[0,0]]], [[[10,10],[12,10],[12,12],[10,10]]]] } }
  ]
}"#;

fn write(dir: &Path, rel: &str, text: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(path, text).expect("write fixture");
}

fn config(root: &Path) -> ViewerConfig {
    ViewerConfig {
        data_root: root.to_string_lossy().into_owned(),
        global_boundaries_url: "/data/world.geojson".into(),
        datasets: vec![
            DatasetConfig {
                key: "tree".into(),
                name: "Tree Cover in 2000".into(),
                url: "/data/tree.asc".into(),
                ramp: vec!["#F7FBEA".into(), "#CBEAA6".into()],
                cell_budget: 150_000,
            },
            DatasetConfig {
                key: "gdpasc".into(),
                name: "GDP 2000 (ASC)".into(),
                url: "/data/gdp.asc".into(),
                ramp: vec!["#D9BFD6".into(), "#3A0D3E".into()],
                cell_budget: 150_000,
            },
        ],
        countries: vec![
            CountryConfig {
                name: "Poland".into(),
                code: "POL".into(),
                boundary_url: "/data/Poland.geojson".into(),
                label_lat: 52.0,
                label_lon: 19.0,
            },
            CountryConfig {
                name: "Brazil".into(),
                code: "BRA".into(),
                boundary_url: "/data/missing.geojson".into(),
                label_lat: -10.0,
                label_lon: -52.0,
            },
        ],
        ..ViewerConfig::default()
    }
}

async fn loaded_viewer(root: &Path) -> GlobeViewer {
    let config = config(root);
    let source = DataSource::from_root(&config.data_root);
    let mut viewer = GlobeViewer::new(config.clone());
    for outcome in load_all(&config, &source).await {
        viewer.apply_outcome(outcome);
    }
    viewer
}

fn fixtures() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "data/tree.asc", GRID_4X4);
    write(dir.path(), "data/gdp.asc", "ncols 4\nnrows four\n");
    write(dir.path(), "data/Poland.geojson", POLAND);
    write(dir.path(), "data/world.geojson", WORLD);
    dir
}

#[tokio::test]
async fn load_all_reports_every_dataset() {
    let dir = fixtures();
    let config = config(dir.path());
    let source = DataSource::from_root(&config.data_root);
    let outcomes = load_all(&config, &source).await;
    assert_eq!(outcomes.len(), 5);

    let mut tree_cells = None;
    let mut gdp_failed = false;
    let mut brazil_missing = false;
    for outcome in &outcomes {
        match outcome {
            LoadOutcome::Raster { key, result: Ok(grid) } if key == "tree" => {
                tree_cells = Some(grid.valid_cell_count());
                assert_eq!((grid.min, grid.max), (1.0, 3.0));
            }
            LoadOutcome::Raster { key, result: Err(LoadError::Format(_)) } if key == "gdpasc" => {
                gdp_failed = true;
            }
            LoadOutcome::Country { code, result: Err(LoadError::Fetch(_)) } if code == "BRA" => {
                brazil_missing = true;
            }
            _ => {}
        }
    }
    assert_eq!(tree_cells, Some(12));
    assert!(gdp_failed);
    assert!(brazil_missing);
}

#[tokio::test]
async fn failures_stay_isolated() {
    let dir = fixtures();
    let viewer = loaded_viewer(dir.path()).await;

    assert_eq!(
        viewer.rasters().status("tree"),
        Some(&LayerStatus::Ready { cells: 12 })
    );
    assert!(matches!(
        viewer.rasters().status("gdpasc"),
        Some(LayerStatus::Failed { .. })
    ));
    let mut sources: Vec<&str> = viewer.messages().iter().map(|m| m.source.as_str()).collect();
    sources.sort();
    assert_eq!(sources, vec!["BRA", "gdpasc"]);

    // The Point feature is filtered; the polygon yields soft, crisp and glow lines.
    let outlines = viewer.boundaries().lines_for("POL").len();
    assert_eq!(outlines, 3);
    assert_eq!(viewer.countries().name("POL"), Some("Poland"));

    let global = viewer.boundaries().groups().global_boundaries;
    assert_eq!(viewer.world().lines_in(global).count(), 2);
}

#[tokio::test]
async fn end_to_end_mesh_skips_nodata_column() {
    let dir = fixtures();
    let viewer = loaded_viewer(dir.path()).await;
    let mesh_id = viewer.rasters().mesh("tree").expect("mesh");
    let mesh = viewer.world().mesh(mesh_id).expect("live mesh");
    assert_eq!(mesh.cell_count(), 12);
    assert!(!mesh.contains_cell(0, 3));
    assert!(mesh.contains_cell(0, 2));
}

#[tokio::test]
async fn hover_click_and_scheduler_collapse() {
    let dir = fixtures();
    let mut viewer = loaded_viewer(dir.path()).await;

    let mut t = 0.0;
    while viewer.frame(Time(t)).is_some() {
        t += 1.0 / 60.0;
    }
    viewer.focus_country("POL", Time(t));
    while viewer.frame(Time(t)).is_some() {
        t += 1.0 / 60.0;
    }
    let paints = viewer.scheduler().paint_count();

    let (x, y) = viewer.label_screen_position("POL").expect("visible");
    viewer.pointer_move(x, y);
    viewer.resize(1024, 768);
    assert!(viewer.frame(Time(t + 1.0)).is_some());
    assert!(viewer.frame(Time(t + 2.0)).is_none());
    assert_eq!(viewer.scheduler().paint_count(), paints + 1);

    let mut nav = RecordingNavigator::default();
    let (x, y) = viewer.label_screen_position("POL").expect("visible");
    assert_eq!(
        viewer.click(x, y, &mut nav).as_deref(),
        Some("../countries/poland.html")
    );
}
