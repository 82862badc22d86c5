pub mod nurbs_curve;
pub use nurbs_curve::*;
