use nalgebra::{Point3, Point4};

use crate::{
    curve::nurbs_curve::{dehomogenize, NurbsCurve3D},
    misc::{FloatingPoint, ParametricDirection},
    prelude::KnotVector,
};

use super::{ControlPoint, ControlPointNet};

/// Tensor-product NURBS patch description:
/// a control point net, one knot vector and one degree per parametric direction.
///
/// For each direction the knot vector holds exactly `# of control points + degree + 1` knots.
/// Operations that change the representation return a new patch and leave `self` untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct NurbsPatchData<T: FloatingPoint> {
    /// control points with homogeneous coordinates, indexed as `[u][v]`
    control_points: Vec<Vec<Point4<T>>>,
    knots: [KnotVector<T>; 2],
    degree: [usize; 2],
}

impl<T: FloatingPoint> NurbsPatchData<T> {
    /// Create a new patch
    /// # Failures
    /// - a knot vector does not match the control point count and degree of its direction
    /// - a knot vector is decreasing somewhere
    /// - a weight is not positive
    ///
    /// # Example
    /// ```
    /// use isobench::prelude::*;
    ///
    /// let net = ControlPointNet::try_new(vec![
    ///     vec![ControlPoint::unweighted(0., 0., 0.), ControlPoint::unweighted(0., 1., 0.)],
    ///     vec![ControlPoint::unweighted(2., 0., 0.), ControlPoint::unweighted(2., 1., 0.)],
    /// ])
    /// .unwrap();
    /// let patch = NurbsPatchData::try_new([vec![0., 0., 1., 1.], vec![0., 0., 1., 1.]], net, [1, 1]);
    /// assert!(patch.is_ok());
    /// ```
    pub fn try_new(
        knots: [Vec<T>; 2],
        net: ControlPointNet<T>,
        degree: [usize; 2],
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            net.iter().all(|cp| cp.weight > T::zero()),
            "Control point weights must be positive"
        );
        let [u_knots, v_knots] = knots;
        Self::try_from_homogeneous(
            net.homogeneous(),
            [KnotVector::new(u_knots), KnotVector::new(v_knots)],
            degree,
        )
    }

    fn try_from_homogeneous(
        control_points: Vec<Vec<Point4<T>>>,
        knots: [KnotVector<T>; 2],
        degree: [usize; 2],
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            !control_points.is_empty() && !control_points[0].is_empty(),
            "Patch has no control points"
        );
        let counts = [control_points.len(), control_points[0].len()];
        for direction in ParametricDirection::ALL {
            let d = direction.index();
            anyhow::ensure!(
                counts[d] > degree[d],
                "Too few control points in direction {:?}: {} for degree {}",
                direction,
                counts[d],
                degree[d]
            );
            anyhow::ensure!(
                knots[d].len() == counts[d] + degree[d] + 1,
                "Invalid number of knots in direction {:?}, got {}, expected {}",
                direction,
                knots[d].len(),
                counts[d] + degree[d] + 1
            );
            anyhow::ensure!(
                knots[d].is_non_decreasing(),
                "Knots in direction {:?} must be non-decreasing",
                direction
            );
        }

        Ok(Self {
            control_points,
            knots,
            degree,
        })
    }

    pub fn degree(&self, direction: ParametricDirection) -> usize {
        self.degree[direction.index()]
    }

    pub fn knots(&self, direction: ParametricDirection) -> &KnotVector<T> {
        &self.knots[direction.index()]
    }

    /// Number of control points along the direction
    pub fn control_point_count(&self, direction: ParametricDirection) -> usize {
        match direction {
            ParametricDirection::U => self.control_points.len(),
            ParametricDirection::V => self.control_points[0].len(),
        }
    }

    /// Homogeneous control points, indexed as `[u][v]`
    pub fn control_points(&self) -> &Vec<Vec<Point4<T>>> {
        &self.control_points
    }

    /// Dehomogenized control point net
    pub fn control_point_net(&self) -> anyhow::Result<ControlPointNet<T>> {
        let rows = self
            .control_points
            .iter()
            .map(|row| {
                row.iter()
                    .map(|p| {
                        ControlPoint::from_homogeneous(p)
                            .ok_or_else(|| anyhow::anyhow!("Control point with zero weight"))
                    })
                    .collect::<anyhow::Result<Vec<_>>>()
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        ControlPointNet::try_new(rows)
    }

    /// Get the parametric domain of the direction
    pub fn knot_domain(&self, direction: ParametricDirection) -> (T, T) {
        let d = direction.index();
        self.knots[d].domain(self.degree[d])
    }

    /// Evaluate the patch at the given u, v parameters to get a point.
    /// Returns `None` when the evaluated weight vanishes.
    pub fn point_at(&self, u: T, v: T) -> Option<Point3<T>> {
        dehomogenize(&self.point(u, v))
    }

    /// Evaluate the patch at the given u, v parameters to get a homogeneous point
    fn point(&self, u: T, v: T) -> Point4<T> {
        let [u_degree, v_degree] = self.degree;
        let [u_knots, v_knots] = &self.knots;
        let n = u_knots.len() - u_degree - 2;
        let m = v_knots.len() - v_degree - 2;

        let knot_span_index_u = u_knots.find_knot_span_index(n, u_degree, u);
        let knot_span_index_v = v_knots.find_knot_span_index(m, v_degree, v);
        let u_basis_vals = u_knots.basis_functions(knot_span_index_u, u, u_degree);
        let v_basis_vals = v_knots.basis_functions(knot_span_index_v, v, v_degree);
        let uind = knot_span_index_u - u_degree;

        let mut position = Point4::<T>::origin();
        for l in 0..=v_degree {
            let mut temp = Point4::<T>::origin();
            let vind = knot_span_index_v - v_degree + l;

            // sample u isoline
            for k in 0..=u_degree {
                temp.coords += self.control_points[uind + k][vind].coords * u_basis_vals[k];
            }

            // add point from u isoline
            position.coords += temp.coords * v_basis_vals[l];
        }

        position
    }

    /// Raise the degree in the given direction by `elevation`, keeping the geometry.
    /// Returns a new patch; `self` is left unchanged.
    ///
    /// # Example
    /// ```
    /// use isobench::prelude::*;
    ///
    /// let net = ControlPointNet::try_new(vec![
    ///     vec![ControlPoint::unweighted(0., 0., 0.), ControlPoint::unweighted(0., 1., 0.)],
    ///     vec![ControlPoint::unweighted(2., 0., 0.), ControlPoint::unweighted(2., 1., 0.)],
    /// ])
    /// .unwrap();
    /// let bilinear =
    ///     NurbsPatchData::try_new([vec![0., 0., 1., 1.], vec![0., 0., 1., 1.]], net, [1, 1]).unwrap();
    /// let elevated = bilinear.try_degree_elevate(ParametricDirection::U, 1).unwrap();
    /// assert_eq!(elevated.degree(ParametricDirection::U), 2);
    /// assert_eq!(bilinear.degree(ParametricDirection::U), 1);
    /// ```
    pub fn try_degree_elevate(
        &self,
        direction: ParametricDirection,
        elevation: usize,
    ) -> anyhow::Result<Self> {
        let target = self.degree(direction) + elevation;
        self.try_map_isocurves(direction, |curve| curve.try_elevate_degree(target))
    }

    /// Insert knots in the given direction, keeping the geometry.
    /// Returns a new patch; `self` is left unchanged.
    pub fn try_insert_knots(
        &self,
        direction: ParametricDirection,
        knots: &[T],
    ) -> anyhow::Result<Self> {
        if knots.is_empty() {
            return Ok(self.clone());
        }
        self.try_map_isocurves(direction, |mut curve| {
            curve.try_refine_knot(knots.to_vec())?;
            Ok(curve)
        })
    }

    /// Run a curve algorithm on every control point line running along `direction`
    /// and reassemble the resulting lines into a new patch
    fn try_map_isocurves<F>(&self, direction: ParametricDirection, f: F) -> anyhow::Result<Self>
    where
        F: Fn(NurbsCurve3D<T>) -> anyhow::Result<NurbsCurve3D<T>>,
    {
        let d = direction.index();
        let lines = match direction {
            ParametricDirection::U => transpose_control_points(&self.control_points),
            ParametricDirection::V => self.control_points.clone(),
        };

        let mut knots = None;
        let mut degree = self.degree[d];
        let mut mapped = Vec::with_capacity(lines.len());
        for line in lines {
            let curve = NurbsCurve3D::try_new(self.degree[d], line, self.knots[d].to_vec())?;
            let curve = f(curve)?;
            degree = curve.degree();
            let (points, line_knots) = curve.into_parts();
            knots = Some(line_knots);
            mapped.push(points);
        }

        let control_points = match direction {
            ParametricDirection::U => transpose_control_points(&mapped),
            ParametricDirection::V => mapped,
        };

        let mut next_knots = self.knots.clone();
        let mut next_degree = self.degree;
        if let Some(knots) = knots {
            next_knots[d] = knots;
        }
        next_degree[d] = degree;

        Self::try_from_homogeneous(control_points, next_knots, next_degree)
    }
}

/// Transpose control points
fn transpose_control_points<T: FloatingPoint>(points: &[Vec<Point4<T>>]) -> Vec<Vec<Point4<T>>> {
    let mut transposed = vec![vec![]; points.first().map_or(0, |row| row.len())];
    points.iter().for_each(|row| {
        row.iter().enumerate().for_each(|(j, p)| {
            transposed[j].push(*p);
        })
    });
    transposed
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::NurbsPatchData;
    use crate::misc::ParametricDirection;
    use crate::patch::{ControlPoint, ControlPointNet};

    fn quarter_annulus() -> NurbsPatchData<f64> {
        // rational in u: quarter circles of radius 1 and 2
        let w = std::f64::consts::FRAC_1_SQRT_2;
        let net = ControlPointNet::try_new(vec![
            vec![
                ControlPoint::unweighted(1., 0., 0.),
                ControlPoint::unweighted(2., 0., 0.),
            ],
            vec![
                ControlPoint::new(nalgebra::Point3::new(1., 1., 0.), w),
                ControlPoint::new(nalgebra::Point3::new(2., 2., 0.), w),
            ],
            vec![
                ControlPoint::unweighted(0., 1., 0.),
                ControlPoint::unweighted(0., 2., 0.),
            ],
        ])
        .unwrap();
        NurbsPatchData::try_new(
            [vec![0., 0., 0., 1., 1., 1.], vec![0., 0., 1., 1.]],
            net,
            [2, 1],
        )
        .unwrap()
    }

    fn assert_same_geometry(a: &NurbsPatchData<f64>, b: &NurbsPatchData<f64>) {
        for i in 0..=6 {
            for j in 0..=6 {
                let (u, v) = (i as f64 / 6., j as f64 / 6.);
                assert_relative_eq!(
                    a.point_at(u, v).unwrap(),
                    b.point_at(u, v).unwrap(),
                    epsilon = 1e-10
                );
            }
        }
    }

    #[test]
    fn inconsistent_knots_are_rejected() {
        let net = quarter_annulus().control_point_net().unwrap();
        let patch = NurbsPatchData::try_new(
            [vec![0., 0., 1., 1.], vec![0., 0., 1., 1.]],
            net,
            [2, 1],
        );
        assert!(patch.is_err());
    }

    #[test]
    fn annulus_radius() {
        let patch = quarter_annulus();
        let p = patch.point_at(0.3, 1.).unwrap();
        assert_relative_eq!(p.coords.norm(), 2., epsilon = 1e-10);
    }

    #[test]
    fn elevation_in_each_direction() {
        let patch = quarter_annulus();
        let u = patch.try_degree_elevate(ParametricDirection::U, 1).unwrap();
        assert_eq!(u.degree(ParametricDirection::U), 3);
        assert_eq!(u.control_point_count(ParametricDirection::U), 4);
        assert_eq!(u.control_point_count(ParametricDirection::V), 2);
        assert_same_geometry(&patch, &u);

        let uv = u.try_degree_elevate(ParametricDirection::V, 2).unwrap();
        assert_eq!(uv.degree(ParametricDirection::V), 3);
        assert_eq!(uv.control_point_count(ParametricDirection::V), 4);
        assert_eq!(uv.knots(ParametricDirection::V).len(), 8);
        assert_same_geometry(&patch, &uv);

        // the source patch is untouched
        assert_eq!(patch.degree(ParametricDirection::U), 2);
    }

    #[test]
    fn every_line_is_elevated() {
        let patch = quarter_annulus();
        // three lines along v, two lines along u
        let v = patch.try_degree_elevate(ParametricDirection::V, 1).unwrap();
        assert_eq!(v.degree(ParametricDirection::V), 2);
        assert!(v.control_points().iter().all(|line| line.len() == 3));
        let u = v.try_degree_elevate(ParametricDirection::U, 1).unwrap();
        assert_eq!(u.control_points().len(), 4);
        assert_same_geometry(&patch, &u);
    }

    #[test]
    fn knot_insertion_keeps_geometry() {
        let patch = quarter_annulus();
        let refined = patch
            .try_insert_knots(ParametricDirection::V, &[0.25, 0.5, 0.75])
            .unwrap();
        assert_eq!(refined.control_point_count(ParametricDirection::V), 5);
        assert_same_geometry(&patch, &refined);
    }
}
