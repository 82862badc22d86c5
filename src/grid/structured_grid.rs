use nalgebra::Point;

use crate::{knot::refinement_factor, misc::FloatingPoint};

use super::grid_view::{unflatten, GridView};

/// Axis-aligned grid of equally sized boxes in `DIM` dimensions
#[derive(Clone, Debug, PartialEq)]
pub struct StructuredGrid<T: FloatingPoint, const DIM: usize> {
    lower_left: [T; DIM],
    upper_right: [T; DIM],
    elements: [usize; DIM],
}

impl<T: FloatingPoint, const DIM: usize> StructuredGrid<T, DIM> {
    /// Create a structured grid
    /// # Failures
    /// - an axis has no elements
    /// - a lower bound is not below its upper bound
    /// - the vertex count does not fit in `usize`
    ///
    /// # Example
    /// ```
    /// use isobench::prelude::*;
    ///
    /// let grid = StructuredGrid::try_new([0., 0.], [2., 1.], [4, 2]).unwrap();
    /// assert_eq!(grid.element_count(), 8);
    /// assert_eq!(grid.vertex_count(), 15);
    /// ```
    pub fn try_new(
        lower_left: [T; DIM],
        upper_right: [T; DIM],
        elements: [usize; DIM],
    ) -> anyhow::Result<Self> {
        for axis in 0..DIM {
            anyhow::ensure!(
                elements[axis] > 0,
                "Axis {} of a structured grid needs at least one element",
                axis
            );
            anyhow::ensure!(
                lower_left[axis] < upper_right[axis],
                "Axis {} has an empty extent: [{}, {}]",
                axis,
                lower_left[axis],
                upper_right[axis]
            );
        }
        ensure_addressable(&elements)?;
        Ok(Self {
            lower_left,
            upper_right,
            elements,
        })
    }

    pub fn lower_left(&self) -> &[T; DIM] {
        &self.lower_left
    }

    pub fn upper_right(&self) -> &[T; DIM] {
        &self.upper_right
    }

    pub fn elements_per_axis(&self) -> [usize; DIM] {
        self.elements
    }

    pub fn element_count(&self) -> usize {
        self.elements.iter().product()
    }

    pub fn vertex_count(&self) -> usize {
        self.elements.iter().map(|e| e + 1).product()
    }

    /// Edge lengths of a single element
    pub fn element_size(&self) -> [T; DIM] {
        std::array::from_fn(|axis| {
            (self.upper_right[axis] - self.lower_left[axis])
                / T::from_usize(self.elements[axis]).unwrap_or_else(T::one)
        })
    }

    /// Coordinates of the vertex with the given multi-index
    pub fn vertex(&self, index: [usize; DIM]) -> Option<Point<T, DIM>> {
        if index.iter().zip(self.elements.iter()).any(|(i, e)| i > e) {
            return None;
        }
        let size = self.element_size();
        let coords: [T; DIM] = std::array::from_fn(|axis| {
            self.lower_left[axis] + size[axis] * T::from_usize(index[axis]).unwrap_or_else(T::zero)
        });
        Some(Point::from(coords))
    }

    /// Multi-indices of all elements, the first axis running fastest
    pub fn elements(&self) -> impl Iterator<Item = [usize; DIM]> + '_ {
        (0..self.element_count()).map(|flat| {
            let index = unflatten(flat, &self.elements);
            std::array::from_fn(|axis| index[axis])
        })
    }

    /// Double the element count on every axis `levels` times.
    /// The grid is left unchanged when the refined grid would be too large to index.
    pub fn global_refine(&mut self, levels: usize) -> anyhow::Result<()> {
        let factor = refinement_factor(levels)?;
        let mut elements = self.elements;
        for e in elements.iter_mut() {
            let count = *e;
            *e = count.checked_mul(factor).ok_or_else(|| {
                anyhow::anyhow!("Refining {} elements by {} levels overflows", count, levels)
            })?;
        }
        ensure_addressable(&elements)?;
        self.elements = elements;
        log::debug!("refined structured grid to {:?} elements", self.elements);
        Ok(())
    }
}

fn ensure_addressable<const DIM: usize>(elements: &[usize; DIM]) -> anyhow::Result<()> {
    elements
        .iter()
        .try_fold(1usize, |count, e| {
            e.checked_add(1).and_then(|n| count.checked_mul(n))
        })
        .map(|_| ())
        .ok_or_else(|| anyhow::anyhow!("Grid of {:?} elements has too many vertices", elements))
}

impl<T: FloatingPoint, const DIM: usize> GridView for StructuredGrid<T, DIM> {
    fn type_name(&self) -> String {
        format!("StructuredGrid<{}, {}>", std::any::type_name::<T>(), DIM)
    }

    fn dependencies(&self) -> Vec<String> {
        vec!["grid::structured_grid".to_string()]
    }

    fn elements_per_axis(&self) -> Vec<usize> {
        self.elements.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    use super::StructuredGrid;
    use crate::grid::GridView;

    #[test]
    fn empty_axis_is_rejected() {
        assert!(StructuredGrid::try_new([0., 0.], [1., 1.], [0, 2]).is_err());
        assert!(StructuredGrid::try_new([0., 1.], [1., 1.], [2, 2]).is_err());
    }

    #[test]
    fn vertices_span_the_box() {
        let grid = StructuredGrid::try_new([-1., 0.], [1., 3.], [4, 3]).unwrap();
        assert_relative_eq!(grid.vertex([0, 0]).unwrap(), Point2::new(-1., 0.));
        assert_relative_eq!(grid.vertex([4, 3]).unwrap(), Point2::new(1., 3.));
        assert_relative_eq!(grid.vertex([1, 2]).unwrap(), Point2::new(-0.5, 2.));
        assert!(grid.vertex([5, 0]).is_none());
    }

    #[test]
    fn elements_and_refinement() {
        let mut grid = StructuredGrid::try_new([0., 0.], [1., 1.], [2, 1]).unwrap();
        let elements: Vec<_> = grid.elements().collect();
        assert_eq!(elements, vec![[0, 0], [1, 0]]);
        grid.global_refine(1).unwrap();
        assert_eq!(grid.elements_per_axis(), [4, 2]);
        assert_eq!(grid.lagrange_layout(1).unwrap().size, 15);
    }

    #[test]
    fn oversized_refinement_leaves_the_grid_alone() {
        let mut grid = StructuredGrid::try_new([0.; 3], [1.; 3], [2; 3]).unwrap();
        assert!(grid.global_refine(63).is_err());
        assert!(grid.global_refine(usize::MAX).is_err());
        // within the level bound, but 2^24 * 2 elements per axis overflow the vertex count
        assert!(grid.global_refine(24).is_err());
        assert_eq!(grid.elements_per_axis(), [2; 3]);

        assert!(StructuredGrid::try_new([0.; 2], [1.; 2], [usize::MAX, 1]).is_err());
    }
}
