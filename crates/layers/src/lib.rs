pub mod boundary;
pub mod error;
pub mod interaction;
pub mod labels;
pub mod layer_set;
pub mod ramp;
pub mod raster;
pub mod symbology;

pub use error::*;
