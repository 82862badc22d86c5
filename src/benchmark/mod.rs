pub mod cantilever_beam;
pub mod cube;
pub mod reference;
pub use cantilever_beam::*;
pub use cube::*;
pub use reference::*;
