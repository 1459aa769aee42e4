pub mod config;
pub mod engine;
pub mod error;
mod pipeline;
pub mod segment;
pub mod state;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use segment::*;
pub use state::*;
