pub mod control_point;
pub mod nurbs_patch_data;
pub use control_point::*;
pub use nurbs_patch_data::*;
