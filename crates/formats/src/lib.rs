pub mod asc;
pub mod error;
pub mod geojson;

pub use asc::*;
pub use error::*;
pub use geojson::*;
