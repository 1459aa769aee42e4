pub mod backend;
pub mod download;
pub mod error;
pub mod result;

pub use backend::*;
pub use download::*;
pub use error::*;
pub use result::*;
