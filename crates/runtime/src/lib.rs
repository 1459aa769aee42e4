pub mod cancel;
pub mod job;
pub mod worker;

pub use cancel::*;
pub use job::*;
pub use worker::*;
