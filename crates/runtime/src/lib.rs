pub mod frame;
pub mod render_scheduler;
pub mod tween;

pub use frame::*;
pub use render_scheduler::*;
pub use tween::*;
