use nalgebra::{Point3, Point4};

use crate::misc::FloatingPoint;

/// A control point of a NURBS patch: a position in space and its weight
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlPoint<T: FloatingPoint> {
    pub point: Point3<T>,
    pub weight: T,
}

impl<T: FloatingPoint> ControlPoint<T> {
    pub fn new(point: Point3<T>, weight: T) -> Self {
        Self { point, weight }
    }

    /// Control point with unit weight
    pub fn unweighted(x: T, y: T, z: T) -> Self {
        Self::new(Point3::new(x, y, z), T::one())
    }

    /// Homogeneous coordinates `(w x, w y, w z, w)`
    pub fn homogeneous(&self) -> Point4<T> {
        let w = self.weight;
        Point4::new(self.point.x * w, self.point.y * w, self.point.z * w, w)
    }

    /// Recover a control point from homogeneous coordinates.
    /// Returns `None` for a vanishing weight.
    pub fn from_homogeneous(p: &Point4<T>) -> Option<Self> {
        let w = p.w;
        if w == T::zero() {
            return None;
        }
        Some(Self::new(Point3::new(p.x / w, p.y / w, p.z / w), w))
    }
}

/// Rectangular net of control points, indexed as `[u][v]`
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        try_from = "Vec<Vec<ControlPoint<T>>>",
        into = "Vec<Vec<ControlPoint<T>>>",
        bound(
            serialize = "T: serde::Serialize",
            deserialize = "T: serde::Deserialize<'de>"
        )
    )
)]
pub struct ControlPointNet<T: FloatingPoint> {
    rows: Vec<Vec<ControlPoint<T>>>,
}

impl<T: FloatingPoint> ControlPointNet<T> {
    /// Create a net from rows of control points
    /// # Failures
    /// - the net is empty
    /// - the rows do not all have the same length
    ///
    /// # Example
    /// ```
    /// use isobench::prelude::*;
    ///
    /// let net = ControlPointNet::try_new(vec![
    ///     vec![ControlPoint::unweighted(0., 0., 0.), ControlPoint::unweighted(0., 1., 0.)],
    ///     vec![ControlPoint::unweighted(1., 0., 0.), ControlPoint::unweighted(1., 1., 0.)],
    /// ])
    /// .unwrap();
    /// assert_eq!(net.size(), (2, 2));
    /// ```
    pub fn try_new(rows: Vec<Vec<ControlPoint<T>>>) -> anyhow::Result<Self> {
        anyhow::ensure!(!rows.is_empty(), "Control point net is empty");
        let columns = rows[0].len();
        anyhow::ensure!(columns > 0, "Control point net has an empty row");
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns) {
            anyhow::bail!(
                "Control point net is not rectangular: row {} has {} points, expected {}",
                index,
                row.len(),
                columns
            );
        }
        Ok(Self { rows })
    }

    /// Number of control points in `(u, v)`
    pub fn size(&self) -> (usize, usize) {
        (self.rows.len(), self.rows[0].len())
    }

    pub fn get(&self, i: usize, j: usize) -> Option<&ControlPoint<T>> {
        self.rows.get(i).and_then(|row| row.get(j))
    }

    pub fn rows(&self) -> &Vec<Vec<ControlPoint<T>>> {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControlPoint<T>> {
        self.rows.iter().flatten()
    }

    /// Homogeneous coordinates of every control point, keeping the `[u][v]` layout
    pub(crate) fn homogeneous(&self) -> Vec<Vec<Point4<T>>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cp| cp.homogeneous()).collect())
            .collect()
    }
}

impl<T: FloatingPoint> TryFrom<Vec<Vec<ControlPoint<T>>>> for ControlPointNet<T> {
    type Error = anyhow::Error;

    fn try_from(rows: Vec<Vec<ControlPoint<T>>>) -> Result<Self, Self::Error> {
        Self::try_new(rows)
    }
}

impl<T: FloatingPoint> From<ControlPointNet<T>> for Vec<Vec<ControlPoint<T>>> {
    fn from(net: ControlPointNet<T>) -> Self {
        net.rows
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point4;

    use super::{ControlPoint, ControlPointNet};

    #[test]
    fn homogeneous_round_trip_keeps_weight() {
        let cp = ControlPoint::new(nalgebra::Point3::new(1., 2., 3.), 0.5);
        assert_eq!(cp.homogeneous(), Point4::new(0.5, 1., 1.5, 0.5));
        assert_eq!(ControlPoint::from_homogeneous(&cp.homogeneous()), Some(cp));
        assert!(ControlPoint::<f64>::from_homogeneous(&Point4::new(1., 1., 1., 0.)).is_none());
    }

    #[test]
    fn ragged_net_is_rejected() {
        let net = ControlPointNet::try_new(vec![
            vec![ControlPoint::unweighted(0., 0., 0.)],
            vec![
                ControlPoint::unweighted(1., 0., 0.),
                ControlPoint::unweighted(1., 1., 0.),
            ],
        ]);
        assert!(net.is_err());
        assert!(ControlPointNet::<f64>::try_new(vec![]).is_err());
    }
}
