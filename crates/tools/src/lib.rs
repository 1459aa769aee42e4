pub mod report;
pub mod route_file;
pub mod simulated;

pub use report::*;
pub use route_file::*;
pub use simulated::*;
