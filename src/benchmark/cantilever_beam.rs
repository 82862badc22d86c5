use crate::{
    grid::IgaGrid,
    misc::{FloatingPoint, ParametricDirection},
    patch::{ControlPoint, ControlPointNet, NurbsPatchData},
};

/// Biquadratic isogeometric grid of a cantilever beam of the given length and height.
///
/// The beam starts as a bilinear 2×2 patch over `[0, length] × [0, height]`,
/// is degree elevated once in each direction and then refined `refinement`
/// times along its length. A zero length or height is rejected by the grid.
///
/// # Example
/// ```
/// use isobench::prelude::*;
///
/// let grid = cantilever_beam(10.0, 1.0, 3).unwrap();
/// assert_eq!(grid.element_count_in_direction(ParametricDirection::U), 8);
/// assert_eq!(grid.element_count_in_direction(ParametricDirection::V), 1);
/// ```
pub fn cantilever_beam<T: FloatingPoint>(
    length: T,
    height: T,
    refinement: usize,
) -> anyhow::Result<IgaGrid<T>> {
    let patch = bilinear_beam_patch(length, height)?
        .try_degree_elevate(ParametricDirection::U, 1)?
        .try_degree_elevate(ParametricDirection::V, 1)?;

    let mut grid = IgaGrid::try_new(patch)?;
    grid.global_refine_in_direction(ParametricDirection::U, refinement)?;
    log::debug!(
        "cantilever beam {} x {}: {} element(s)",
        length,
        height,
        grid.element_count_in_direction(ParametricDirection::U)
    );
    Ok(grid)
}

/// The unelevated beam: four corner control points with unit weights
pub fn bilinear_beam_patch<T: FloatingPoint>(
    length: T,
    height: T,
) -> anyhow::Result<NurbsPatchData<T>> {
    let zero = T::zero();
    let net = ControlPointNet::try_new(vec![
        vec![
            ControlPoint::unweighted(zero, zero, zero),
            ControlPoint::unweighted(zero, height, zero),
        ],
        vec![
            ControlPoint::unweighted(length, zero, zero),
            ControlPoint::unweighted(length, height, zero),
        ],
    ])?;
    let knots = vec![zero, zero, T::one(), T::one()];
    NurbsPatchData::try_new([knots.clone(), knots], net, [1, 1])
}
