pub mod layer;
pub mod line;
pub mod stack;
pub mod surface;
pub mod symbology;

pub use layer::*;
pub use line::*;
pub use stack::*;
pub use surface::*;
pub use symbology::*;
