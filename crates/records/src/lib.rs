pub mod filter;
pub mod load;
pub mod record;
pub mod sample;
pub mod summary;

pub use filter::*;
pub use load::*;
pub use record::*;
pub use summary::*;
