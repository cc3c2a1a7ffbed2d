pub mod attachment;
pub mod config;
pub mod draft;
pub mod field;
pub mod task;

pub use config::*;
pub use draft::*;
pub use field::*;
pub use task::*;
