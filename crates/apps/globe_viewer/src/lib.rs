pub mod config;
pub mod countries;
pub mod fetch;
pub mod loader;
pub mod viewer;

pub use config::ViewerConfig;
pub use fetch::{DataSource, FetchError};
pub use loader::{load_all, LoadError, LoadOutcome};
pub use viewer::{GlobeViewer, Navigator, RecordingNavigator, StatusMessage};
