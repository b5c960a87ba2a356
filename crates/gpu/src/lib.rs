pub mod camera;
pub mod controls;
pub mod renderer;
pub mod textures;

pub use camera::*;
pub use controls::*;
pub use renderer::*;
pub use textures::*;
