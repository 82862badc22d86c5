use crate::misc::{floating_point::scalar, FloatingPoint};

/// Number of load steps in the reference table
pub const REFERENCE_STEPS: usize = 20;

/// Absolute horizontal tip displacement (x-direction) of the cantilever benchmark,
/// Sze, Liu & Lo (2004), Table 2a
pub const HORIZONTAL_DISPLACEMENT: [f64; REFERENCE_STEPS] = [
    0.026, 0.103, 0.224, 0.381, 0.563, 0.763, 0.971, 1.184, 1.396, 1.604, 1.807, 2.002, 2.19,
    2.37, 2.541, 2.705, 2.861, 3.01, 3.151, 3.286,
];

/// Absolute vertical tip displacement (z-direction) of the cantilever benchmark,
/// Sze, Liu & Lo (2004), Table 2a
pub const VERTICAL_DISPLACEMENT: [f64; REFERENCE_STEPS] = [
    0.663, 1.309, 1.922, 2.493, 3.015, 3.488, 3.912, 4.292, 4.631, 4.933, 5.202, 5.444, 5.660,
    5.855, 6.031, 6.190, 6.335, 6.467, 6.588, 6.698,
];

/// Load factors with the horizontal and vertical displacements reached at each of them
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceCurves<T> {
    pub load_factors: Vec<T>,
    pub horizontal: Vec<T>,
    pub vertical: Vec<T>,
}

impl<T> ReferenceCurves<T> {
    pub fn len(&self) -> usize {
        self.load_factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.load_factors.is_empty()
    }
}

/// Reference curves of the cantilever beam under an end load.
///
/// The table is given at twenty equal load steps of `0.05 * p_max`;
/// the load factors are normalized by the reference load `p0`.
///
/// # Example
/// ```
/// use isobench::prelude::*;
///
/// let reference = cantilever_beam_reference(1.0, 4.0);
/// assert_eq!(reference.len(), 20);
/// assert_eq!(reference.vertical[19], 6.698);
/// ```
pub fn cantilever_beam_reference<T: FloatingPoint>(p0: T, p_max: T) -> ReferenceCurves<T> {
    let load_factors = (1..=REFERENCE_STEPS)
        .map(|step| scalar::<T>(0.05 * step as f64) * p_max / p0)
        .collect();
    ReferenceCurves {
        load_factors,
        horizontal: HORIZONTAL_DISPLACEMENT.iter().map(|u| scalar(*u)).collect(),
        vertical: VERTICAL_DISPLACEMENT.iter().map(|w| scalar(*w)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn twenty_steps_each() {
        let reference = cantilever_beam_reference(2.0, 4.0);
        assert_eq!(reference.load_factors.len(), REFERENCE_STEPS);
        assert_eq!(reference.horizontal.len(), REFERENCE_STEPS);
        assert_eq!(reference.vertical.len(), REFERENCE_STEPS);
    }

    #[test]
    fn load_factors_are_scaled() {
        let reference = cantilever_beam_reference(2.0, 4.0);
        assert_relative_eq!(reference.load_factors[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(reference.load_factors[19], 2.0, epsilon = 1e-12);
        reference
            .load_factors
            .windows(2)
            .for_each(|w| assert_relative_eq!(w[1] - w[0], 0.1, epsilon = 1e-12));
    }

    #[test]
    fn table_values() {
        let reference = cantilever_beam_reference(1.0_f64, 1.0);
        assert_eq!(reference.horizontal[0], 0.026);
        assert_eq!(reference.horizontal[12], 2.19);
        assert_eq!(reference.horizontal[19], 3.286);
        assert_eq!(reference.vertical[0], 0.663);
        assert_eq!(reference.vertical[12], 5.660);
        assert_eq!(reference.vertical[19], 6.698);
        // displacements grow monotonically with the load
        assert!(reference.horizontal.windows(2).all(|w| w[0] < w[1]));
        assert!(reference.vertical.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn single_precision() {
        let reference = cantilever_beam_reference(1.0_f32, 1.0);
        assert_relative_eq!(reference.vertical[5], 3.488_f32);
    }
}
