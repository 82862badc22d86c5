pub mod basis_handler;
pub mod basis_tree;
pub mod generator;
pub mod global_basis;
pub mod module_cache;
pub use basis_handler::*;
pub use basis_tree::*;
pub use generator::*;
pub use global_basis::*;
pub use module_cache::*;
