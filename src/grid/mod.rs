pub mod grid_view;
pub mod iga_grid;
pub mod structured_grid;
pub use grid_view::{GridView, ScalarLayout};
pub use iga_grid::*;
pub use structured_grid::*;
