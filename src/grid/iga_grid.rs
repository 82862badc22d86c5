use itertools::iproduct;

use crate::{
    misc::{FloatingPoint, ParametricDirection},
    patch::NurbsPatchData,
};

use super::{GridView, ScalarLayout};

/// An element of an isogeometric grid: a non-empty box in the parameter space of the patch
#[derive(Clone, Debug, PartialEq)]
pub struct IgaElement<T> {
    /// `(u, v)` position of the element in the grid
    pub index: [usize; 2],
    pub u_span: (T, T),
    pub v_span: (T, T),
}

/// Isogeometric grid on a single NURBS patch.
/// The elements are the non-empty knot spans of the patch.
#[derive(Clone, Debug)]
pub struct IgaGrid<T: FloatingPoint> {
    patch: NurbsPatchData<T>,
}

impl<T: FloatingPoint> IgaGrid<T> {
    /// Create a grid from a patch
    /// # Failures
    /// - a knot vector of the patch is not clamped
    /// - the patch collapses to a point or a line in one of its directions
    pub fn try_new(patch: NurbsPatchData<T>) -> anyhow::Result<Self> {
        for direction in ParametricDirection::ALL {
            anyhow::ensure!(
                patch.knots(direction).is_clamped(patch.degree(direction)),
                "Knot vector in direction {:?} must be clamped",
                direction
            );
        }

        let (u0, u1) = patch.knot_domain(ParametricDirection::U);
        let (v0, v1) = patch.knot_domain(ParametricDirection::V);
        let corner = |u: T, v: T| {
            patch
                .point_at(u, v)
                .ok_or_else(|| anyhow::anyhow!("Patch has a vanishing weight at ({}, {})", u, v))
        };
        let origin = corner(u0, v0)?;
        let u_extent = (corner(u1, v0)? - origin).norm();
        let v_extent = (corner(u0, v1)? - origin).norm();
        anyhow::ensure!(
            u_extent > T::default_epsilon() && v_extent > T::default_epsilon(),
            "Patch geometry is degenerate: extents {} along u and {} along v",
            u_extent,
            v_extent
        );

        Ok(Self { patch })
    }

    pub fn patch(&self) -> &NurbsPatchData<T> {
        &self.patch
    }

    pub fn into_patch(self) -> NurbsPatchData<T> {
        self.patch
    }

    pub fn element_count_in_direction(&self, direction: ParametricDirection) -> usize {
        self.patch.knots(direction).distinct_spans().len()
    }

    /// Elements in lexicographic order, `u` running fastest
    pub fn elements(&self) -> Vec<IgaElement<T>> {
        let u_spans = self.patch.knots(ParametricDirection::U).distinct_spans();
        let v_spans = self.patch.knots(ParametricDirection::V).distinct_spans();
        iproduct!(v_spans.iter().enumerate(), u_spans.iter().enumerate())
            .map(|((j, v_span), (i, u_span))| IgaElement {
                index: [i, j],
                u_span: *u_span,
                v_span: *v_span,
            })
            .collect()
    }

    /// Bisect every element `levels` times along the direction.
    /// Zero levels leave the grid unchanged.
    pub fn global_refine_in_direction(
        &mut self,
        direction: ParametricDirection,
        levels: usize,
    ) -> anyhow::Result<()> {
        if levels == 0 {
            return Ok(());
        }
        let knots = self.patch.knots(direction).uniform_refinement(levels)?;
        self.patch = self.patch.try_insert_knots(direction, &knots)?;
        log::debug!(
            "refined {:?} by {} level(s): {} element(s) along the direction",
            direction,
            levels,
            self.element_count_in_direction(direction)
        );
        Ok(())
    }

    /// Bisect every element `levels` times along both directions
    pub fn global_refine(&mut self, levels: usize) -> anyhow::Result<()> {
        for direction in ParametricDirection::ALL {
            self.global_refine_in_direction(direction, levels)?;
        }
        Ok(())
    }
}

impl<T: FloatingPoint> GridView for IgaGrid<T> {
    fn type_name(&self) -> String {
        format!("IgaGrid<{}>", std::any::type_name::<T>())
    }

    fn dependencies(&self) -> Vec<String> {
        vec!["grid::iga_grid".to_string(), "patch::nurbs_patch_data".to_string()]
    }

    fn elements_per_axis(&self) -> Vec<usize> {
        ParametricDirection::ALL
            .iter()
            .map(|d| self.element_count_in_direction(*d))
            .collect()
    }

    /// Control points that support each element, `u` running fastest in both the
    /// element-local and the global numbering
    fn nurbs_layout(&self) -> anyhow::Result<ScalarLayout> {
        let patch = &self.patch;
        let [n_u, n_v] = ParametricDirection::ALL.map(|d| patch.control_point_count(d));
        let [p, q] = ParametricDirection::ALL.map(|d| patch.degree(d));
        let u_knots = patch.knots(ParametricDirection::U);
        let v_knots = patch.knots(ParametricDirection::V);
        let two = T::one() + T::one();

        let element_indices = self
            .elements()
            .iter()
            .map(|element| {
                let u_mid = (element.u_span.0 + element.u_span.1) / two;
                let v_mid = (element.v_span.0 + element.v_span.1) / two;
                let su = u_knots.find_knot_span_index(n_u - 1, p, u_mid);
                let sv = v_knots.find_knot_span_index(n_v - 1, q, v_mid);
                iproduct!(0..=q, 0..=p)
                    .map(|(lv, lu)| (sv - q + lv) * n_u + (su - p + lu))
                    .collect()
            })
            .collect();

        Ok(ScalarLayout {
            size: n_u * n_v,
            element_indices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::IgaGrid;
    use crate::grid::GridView;
    use crate::misc::ParametricDirection;
    use crate::patch::{ControlPoint, ControlPointNet, NurbsPatchData};

    fn unit_square(height: f64) -> NurbsPatchData<f64> {
        let net = ControlPointNet::try_new(vec![
            vec![
                ControlPoint::unweighted(0., 0., 0.),
                ControlPoint::unweighted(0., height, 0.),
            ],
            vec![
                ControlPoint::unweighted(1., 0., 0.),
                ControlPoint::unweighted(1., height, 0.),
            ],
        ])
        .unwrap();
        NurbsPatchData::try_new([vec![0., 0., 1., 1.], vec![0., 0., 1., 1.]], net, [1, 1])
            .unwrap()
    }

    #[test]
    fn degenerate_patch_is_rejected() {
        assert!(IgaGrid::try_new(unit_square(0.)).is_err());
        assert!(IgaGrid::try_new(unit_square(1.)).is_ok());
    }

    #[test]
    fn refine_in_one_direction() {
        let mut grid = IgaGrid::try_new(unit_square(1.)).unwrap();
        grid.global_refine_in_direction(ParametricDirection::V, 2)
            .unwrap();
        assert_eq!(grid.elements_per_axis(), vec![1, 4]);
        grid.global_refine_in_direction(ParametricDirection::V, 0)
            .unwrap();
        assert_eq!(grid.element_count(), 4);
        grid.global_refine(1).unwrap();
        assert_eq!(grid.elements_per_axis(), vec![2, 8]);

        assert!(grid.global_refine_in_direction(ParametricDirection::U, 64).is_err());
        assert_eq!(grid.elements_per_axis(), vec![2, 8]);
    }

    #[test]
    fn elements_run_u_fastest() {
        let mut grid = IgaGrid::try_new(unit_square(1.)).unwrap();
        grid.global_refine(1).unwrap();
        let elements = grid.elements();
        assert_eq!(elements.len(), 4);
        assert_eq!(elements[1].index, [1, 0]);
        assert_eq!(elements[1].u_span, (0.5, 1.));
        assert_eq!(elements[2].v_span, (0.5, 1.));
    }

    #[test]
    fn bilinear_nurbs_layout_matches_lagrange() {
        let mut grid = IgaGrid::try_new(unit_square(1.)).unwrap();
        grid.global_refine(1).unwrap();
        let nurbs = grid.nurbs_layout().unwrap();
        assert_eq!(nurbs.size, 9);
        assert_eq!(nurbs, grid.lagrange_layout(1).unwrap());
    }
}
