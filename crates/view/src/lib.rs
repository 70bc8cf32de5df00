pub mod camera;
pub mod event;
pub mod map_view;
pub mod mode;
pub mod selection;
pub mod viewport;

pub use camera::*;
pub use event::*;
pub use map_view::*;
pub use mode::*;
pub use selection::*;
pub use viewport::*;
