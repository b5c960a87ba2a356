pub mod group;
pub mod mesh;
pub mod polyline;
pub mod shape;
pub mod sprite;

pub use group::*;
pub use mesh::*;
pub use polyline::*;
pub use shape::*;
pub use sprite::*;
