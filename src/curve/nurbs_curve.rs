use nalgebra::allocator::Allocator;
use nalgebra::{Const, DefaultAllocator, DimName, DimNameDiff, DimNameSub, OPoint, U1};

use crate::misc::binomial::Binomial;
use crate::misc::FloatingPoint;
use crate::prelude::KnotVector;

/// NURBS curve representation
/// By generics, it can be used for 2D or 3D curves with f32 or f64 scalar types.
/// Patches hand their control point rows to this type to run the one-dimensional
/// degree elevation and knot refinement algorithms.
#[derive(Clone, Debug)]
pub struct NurbsCurve<T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
{
    /// control points with homogeneous coordinates
    /// the last element of the vector is the `weight`
    control_points: Vec<OPoint<T, D>>,
    degree: usize,
    /// knot vector for the NURBS curve
    /// the length of the knot vector is equal to the `# of control points + degree + 1`
    knots: KnotVector<T>,
}

/// 2D NURBS curve alias
pub type NurbsCurve2D<T> = NurbsCurve<T, Const<3>>;

/// 3D NURBS curve alias
pub type NurbsCurve3D<T> = NurbsCurve<T, Const<4>>;

impl<T: FloatingPoint, D: DimName> NurbsCurve<T, D>
where
    DefaultAllocator: Allocator<D>,
{
    /// Create a new NURBS curve
    /// # Failures
    /// - if the number of control points is less than the degree
    /// - the number of knots is not equal to the number of control points + the degree + 1
    ///
    /// # Example
    /// ```
    /// use isobench::prelude::*;
    /// use nalgebra::Point3;
    ///
    /// let control_points: Vec<Point3<f64>> = vec![
    ///     Point3::new(0., 0., 1.),
    ///     Point3::new(1., 2., 1.),
    ///     Point3::new(2., 0., 1.),
    /// ];
    /// let nurbs = NurbsCurve2D::try_new(2, control_points, vec![0., 0., 0., 1., 1., 1.]);
    /// assert!(nurbs.is_ok());
    /// ```
    pub fn try_new(
        degree: usize,
        control_points: Vec<OPoint<T, D>>,
        knots: Vec<T>,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            control_points.len() > degree,
            "Too few control points for curve"
        );
        anyhow::ensure!(
            knots.len() == control_points.len() + degree + 1,
            "Invalid number of knots, got {}, expected {}",
            knots.len(),
            control_points.len() + degree + 1
        );

        let knots = KnotVector::new(knots);
        anyhow::ensure!(knots.is_non_decreasing(), "Knots must be non-decreasing");

        Ok(Self {
            degree,
            control_points,
            knots,
        })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn knots(&self) -> &KnotVector<T> {
        &self.knots
    }

    pub fn control_points(&self) -> &Vec<OPoint<T, D>> {
        &self.control_points
    }

    /// Split the curve into its homogeneous control points and knots
    pub fn into_parts(self) -> (Vec<OPoint<T, D>>, KnotVector<T>) {
        (self.control_points, self.knots)
    }

    pub fn knots_domain(&self) -> (T, T) {
        self.knots.domain(self.degree)
    }

    /// Check if the curve is clamped
    pub fn is_clamped(&self) -> bool {
        self.knots.is_clamped(self.degree)
    }

    /// Evaluate the curve at a given parameter to get a dehomogenized point.
    /// Returns `None` when the evaluated weight vanishes.
    pub fn point_at(&self, t: T) -> Option<OPoint<T, DimNameDiff<D, U1>>>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        dehomogenize(&self.point(t))
    }

    /// Evaluate the curve at a given parameter to get a homogeneous point
    pub(crate) fn point(&self, t: T) -> OPoint<T, D> {
        let n = self.knots.len() - self.degree - 2;
        let knot_span_index = self.knots.find_knot_span_index(n, self.degree, t);
        let basis = self.knots.basis_functions(knot_span_index, t, self.degree);
        let mut position = OPoint::<T, D>::origin();
        for i in 0..=self.degree {
            position.coords +=
                &self.control_points[knot_span_index - self.degree + i].coords * basis[i];
        }
        position
    }

    /// Try to elevate the degree of the curve without changing its shape.
    /// A target degree that does not exceed the current one returns a clone.
    ///
    /// # Example
    /// ```
    /// use isobench::prelude::*;
    /// use nalgebra::Point3;
    ///
    /// let line = NurbsCurve2D::try_new(
    ///     1,
    ///     vec![Point3::new(0., 0., 1.), Point3::new(2., 0., 1.)],
    ///     vec![0., 0., 1., 1.],
    /// )
    /// .unwrap();
    /// let elevated = line.try_elevate_degree(2).unwrap();
    /// assert_eq!(elevated.degree(), 2);
    /// assert_eq!(elevated.control_points().len(), 3);
    /// assert_eq!(elevated.knots().to_vec(), vec![0., 0., 0., 1., 1., 1.]);
    /// ```
    pub fn try_elevate_degree(&self, target_degree: usize) -> anyhow::Result<Self> {
        if target_degree <= self.degree {
            return Ok(self.clone());
        }
        anyhow::ensure!(
            self.is_clamped(),
            "Curve must be clamped to elevate its degree"
        );

        let p = self.degree;
        let n = self.knots.len() - p - 2;
        let knots = &self.knots;
        let control_points = &self.control_points;
        let t = target_degree - p;

        let m = n + p + 1;
        let ph = target_degree;
        let ph2 = ph / 2;

        // upper bound of the resulting control points: every interior knot may gain `t` copies
        let capacity = control_points.len() * (t + 1) + ph + 1;
        let mut bezalfs = vec![vec![T::zero(); p + 1]; ph + 1];
        let mut bpts = vec![OPoint::origin(); p + 1];
        let mut e_bpts = vec![OPoint::origin(); ph + 1];
        let mut next_bpts = vec![OPoint::origin(); p.max(1)];
        let mut q_w = vec![OPoint::origin(); capacity];
        let mut u_h = vec![T::zero(); capacity + ph + 1];

        // degree elevation coefficients
        bezalfs[0][0] = T::one();
        bezalfs[ph][p] = T::one();

        let mut binom = Binomial::new();

        for i in 1..=ph2 {
            let inv = T::one() / binom.get(ph, i);
            let mpi = p.min(i);
            for j in i.saturating_sub(t)..=mpi {
                bezalfs[i][j] = inv * binom.get(p, j) * binom.get(t, i - j);
            }
        }

        for i in (ph2 + 1)..ph {
            let mpi = p.min(i);
            for j in i.saturating_sub(t)..=mpi {
                bezalfs[i][j] = bezalfs[ph - i][p - j];
            }
        }

        let mut kind = ph + 1;
        let mut r: isize = -1;
        let mut a = p;
        let mut b = p + 1;
        let mut cind = 1;
        let mut ua = knots[0];
        q_w[0] = control_points[0].clone();
        for i in 0..=ph {
            u_h[i] = ua;
        }

        bpts.clone_from_slice(&control_points[..(p + 1)]);

        while b < m {
            let i = b;
            while b < m && knots[b] == knots[b + 1] {
                b += 1;
            }
            let mul = b - i + 1;
            let ub = knots[b];
            let oldr = r;
            r = p as isize - mul as isize;

            let lbz = if oldr > 0 {
                ((oldr + 2) / 2) as usize
            } else {
                1
            };
            let rbz = if r > 0 {
                ph - ((r + 1) / 2) as usize
            } else {
                ph
            };

            // insert knot u(b) r times
            if r > 0 {
                let numer = ub - ua;
                let mut alfs = vec![T::zero(); p];
                let mut k = p;
                while k > mul {
                    alfs[k - mul - 1] = numer / (knots[a + k] - ua);
                    k -= 1;
                }
                for j in 1..=(r as usize) {
                    let save = (r as usize) - j;
                    let s = mul + j;
                    let mut k = p;
                    while k >= s {
                        bpts[k] = bpts[k].lerp(&bpts[k - 1], T::one() - alfs[k - s]);
                        k -= 1;
                    }
                    next_bpts[save] = bpts[p].clone();
                }
            }

            // degree elevate the bezier segment
            for i in lbz..=ph {
                e_bpts[i] = OPoint::origin();
                let mpi = p.min(i);
                for j in i.saturating_sub(t)..=mpi {
                    e_bpts[i].coords += &bpts[j].coords * bezalfs[i][j];
                }
            }

            // remove knot u = u(a) oldr times
            if oldr > 1 {
                let mut first = kind - 2;
                let mut last = kind;
                let den = ub - ua;
                let bet = (ub - u_h[kind - 1]) / den;
                for tr in 1..oldr {
                    let mut i = first;
                    let mut j = last;
                    let mut kj = j - kind + 1;
                    let utr = tr as usize;
                    while (j as isize - i as isize) > tr {
                        if i < cind {
                            let alf = (ub - u_h[i]) / (ua - u_h[i]);
                            q_w[i] = q_w[i].lerp(&q_w[i - 1], T::one() - alf);
                        }
                        if j >= lbz {
                            if (j as isize) - tr <= (kind as isize - ph as isize + oldr) {
                                let gam = (ub - u_h[j - utr]) / den;
                                e_bpts[kj] = e_bpts[kj].lerp(&e_bpts[kj + 1], T::one() - gam);
                            }
                        } else {
                            e_bpts[kj] = e_bpts[kj].lerp(&e_bpts[kj + 1], T::one() - bet);
                        }
                        i += 1;
                        j -= 1;
                        kj -= 1;
                    }
                    first -= 1;
                    last += 1;
                }
            }

            if a != p {
                for _ in 0..(ph as isize - oldr) {
                    u_h[kind] = ua;
                    kind += 1;
                }
            }

            for j in lbz..=rbz {
                q_w[cind] = e_bpts[j].clone();
                cind += 1;
            }

            if b < m {
                let ur = r.max(0) as usize;
                bpts[..ur].clone_from_slice(&next_bpts[..ur]);
                for j in ur..=p {
                    bpts[j] = control_points[b - p + j].clone();
                }
                a = b;
                b += 1;
                ua = ub;
            } else {
                for i in 0..=ph {
                    u_h[kind + i] = ub;
                }
            }
        }

        q_w.truncate(cind);
        u_h.truncate(kind + ph + 1);

        Self::try_new(target_degree, q_w, u_h)
    }

    /// Try to refine the curve by inserting knots without changing its shape.
    /// The knots to insert must be sorted and lie inside the knot domain.
    pub fn try_refine_knot(&mut self, knots_to_insert: Vec<T>) -> anyhow::Result<()> {
        anyhow::ensure!(self.is_clamped(), "Curve must be clamped to refine knots");

        if knots_to_insert.is_empty() {
            return Ok(());
        }

        let (start, end) = self.knots_domain();
        anyhow::ensure!(
            knots_to_insert.iter().all(|k| *k >= start && *k <= end),
            "Knots to insert must lie in the domain [{}, {}]",
            start,
            end
        );
        anyhow::ensure!(
            KnotVector::new(knots_to_insert.clone()).is_non_decreasing(),
            "Knots to insert must be sorted"
        );

        let degree = self.degree;
        let control_points = &self.control_points;

        let n = control_points.len() - 1;
        let m = n + degree + 1;
        let r = knots_to_insert.len() - 1;
        let a = self
            .knots
            .find_knot_span_index(n, degree, knots_to_insert[0]);
        let b = self
            .knots
            .find_knot_span_index(n, degree, knots_to_insert[r])
            + 1;

        let mut control_points_post = vec![OPoint::<T, D>::origin(); n + r + 2];
        let mut knots_post = vec![T::zero(); m + r + 2];

        control_points_post[..((a - degree) + 1)]
            .clone_from_slice(&control_points[..((a - degree) + 1)]);
        for i in (b - 1)..=n {
            control_points_post[i + r + 1] = control_points[i].clone();
        }

        for i in 0..=a {
            knots_post[i] = self.knots[i];
        }
        for i in (b + degree)..=m {
            knots_post[i + r + 1] = self.knots[i];
        }

        let mut i = b + degree - 1;
        let mut k = b + degree + r;

        for j in (0..=r).rev() {
            while knots_to_insert[j] <= self.knots[i] && i > a {
                control_points_post[k - degree - 1] = control_points[i - degree - 1].clone();
                knots_post[k] = self.knots[i];
                k -= 1;
                i -= 1;
            }
            control_points_post[k - degree - 1] = control_points_post[k - degree].clone();
            for l in 1..=degree {
                let ind = k - degree + l;
                let alpha = knots_post[k + l] - knots_to_insert[j];
                if alpha.abs() < T::default_epsilon() {
                    control_points_post[ind - 1] = control_points_post[ind].clone();
                } else {
                    let denom = knots_post[k + l] - self.knots[i - degree + l];
                    let weight = if denom != T::zero() {
                        alpha / denom
                    } else {
                        T::zero()
                    };
                    control_points_post[ind - 1] = control_points_post[ind - 1]
                        .lerp(&control_points_post[ind], T::one() - weight);
                }
            }
            knots_post[k] = knots_to_insert[j];
            k -= 1;
        }

        self.knots = KnotVector::new(knots_post);
        self.control_points = control_points_post;

        Ok(())
    }
}

/// Dehomogenize a point
pub fn dehomogenize<T: FloatingPoint, D: DimName>(
    point: &OPoint<T, D>,
) -> Option<OPoint<T, DimNameDiff<D, U1>>>
where
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<D>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    let v = &point.coords;
    let idx = D::dim() - 1;
    let w = v[idx];
    if w != T::zero() {
        let coords =
            v.generic_view((0, 0), (<D as DimNameSub<U1>>::Output::name(), Const::<1>)) / w;
        Some(OPoint { coords })
    } else {
        None
    }
}
