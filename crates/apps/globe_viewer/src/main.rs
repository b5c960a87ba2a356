use std::path::PathBuf;

use clap::Parser;
use foundation::time::Time;
use globe_viewer::{load_all, DataSource, GlobeViewer, Navigator, ViewerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Headless globe session: loads every dataset, optionally switches layer or
/// flies to a country, and drives the paint loop for a number of display
/// refreshes.
#[derive(Parser, Debug)]
#[command(name = "globe_viewer")]
struct Args {
    /// JSON viewer config; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides `data_root` (http(s) base or directory).
    #[arg(long)]
    data_root: Option<String>,
    /// Raster layer key to show after loading.
    #[arg(long)]
    select: Option<String>,
    /// Country code to fly to after loading.
    #[arg(long)]
    focus: Option<String>,
    /// Display refreshes to simulate at 60 Hz.
    #[arg(long, default_value_t = 120)]
    frames: u32,
}

struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&mut self, destination: &str) {
        info!(destination, "navigation requested");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path).await?,
        None => ViewerConfig::default(),
    };
    if let Some(root) = args.data_root {
        config.data_root = root;
    }

    let source = DataSource::from_root(&config.data_root);
    let mut viewer = GlobeViewer::new(config.clone());
    for outcome in load_all(&config, &source).await {
        viewer.apply_outcome(outcome);
    }

    if let Some(key) = &args.select {
        viewer.select_layer(key);
    }
    if let Some(code) = &args.focus {
        viewer.focus_country(code, Time(0.0));
    }

    let mut painted = 0u32;
    let mut draws = 0usize;
    for i in 0..args.frames {
        let now = Time(f64::from(i) / 60.0);
        if let Some(frame) = viewer.frame(now) {
            painted += 1;
            draws = frame.len();
        }
    }

    if let Some(code) = &args.focus {
        if let Some((x, y)) = viewer.label_screen_position(code) {
            viewer.pointer_move(x, y);
            viewer.click(x, y, &mut LogNavigator);
        }
    }

    for entry in viewer.layer_list() {
        info!(
            key = %entry.key,
            name = %entry.name,
            active = entry.active,
            status = ?entry.status,
            "layer"
        );
    }
    for message in viewer.messages() {
        info!(source = %message.source, text = %message.text, "load problem");
    }
    info!(
        refreshes = args.frames,
        painted,
        draws,
        textures = viewer.textures().live_count(),
        "session finished"
    );
    Ok(())
}
