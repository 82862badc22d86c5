use crate::{grid::StructuredGrid, misc::FloatingPoint};

/// Structured hexahedral grid of the cube `[-half_width, half_width]^3`
/// with `elements` elements along every axis.
///
/// # Example
/// ```
/// use isobench::prelude::*;
///
/// let grid = cube(0.5, 4).unwrap();
/// assert_eq!(grid.elements_per_axis(), [4, 4, 4]);
/// ```
pub fn cube<T: FloatingPoint>(half_width: T, elements: usize) -> anyhow::Result<StructuredGrid<T, 3>> {
    StructuredGrid::try_new([-half_width; 3], [half_width; 3], [elements; 3])
}

#[cfg(test)]
mod tests {
    use super::cube;

    #[test]
    fn same_element_count_on_every_axis() {
        for elements in 1..5 {
            let grid = cube(2.0, elements).unwrap();
            let [x, y, z] = grid.elements_per_axis();
            assert!(x == elements && y == elements && z == elements);
            assert_eq!(grid.element_count(), elements.pow(3));
            assert_eq!(grid.element_size(), [4.0 / elements as f64; 3]);
        }
    }

    #[test]
    fn centered_at_the_origin() {
        let grid = cube(1.5, 3).unwrap();
        assert_eq!(grid.lower_left(), &[-1.5; 3]);
        assert_eq!(grid.upper_right(), &[1.5; 3]);
    }

    #[test]
    fn zero_elements_or_width_is_rejected() {
        assert!(cube(1.0, 0).is_err());
        assert!(cube(0.0, 2).is_err());
    }
}
