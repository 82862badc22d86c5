pub mod figure;
pub mod load_displacement;
pub mod plot_options;
pub use figure::{Figure, Marker, Series};
pub use load_displacement::*;
pub use plot_options::*;
