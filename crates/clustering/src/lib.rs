pub mod clusterer;
pub mod index;
pub mod projector;

pub use clusterer::*;
pub use index::*;
pub use projector::*;
