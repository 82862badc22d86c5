#![allow(clippy::needless_range_loop)]

mod basis;
mod benchmark;
mod curve;
mod grid;
mod knot;
mod misc;
mod patch;
mod plot;

pub mod prelude {
    pub use crate::basis::*;
    pub use crate::benchmark::*;
    pub use crate::curve::*;
    pub use crate::grid::*;
    pub use crate::knot::*;
    pub use crate::misc::{Binomial, FloatingPoint, ParametricDirection};
    pub use crate::patch::*;
    pub use crate::plot::*;
}
