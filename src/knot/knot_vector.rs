use std::ops::Index;

use nalgebra::RealField;

use crate::prelude::KnotMultiplicity;

/// Knot vector representation
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KnotVector<T>(Vec<T>);

impl<T: RealField + Copy> KnotVector<T> {
    pub fn new(knots: Vec<T>) -> Self {
        Self(knots)
    }

    /// Create an open (clamped) knot vector of a single element
    /// # Example
    /// ```
    /// use isobench::prelude::KnotVector;
    /// let knots: KnotVector<f64> = KnotVector::bezier(2);
    /// assert_eq!(knots.to_vec(), vec![0., 0., 0., 1., 1., 1.]);
    /// ```
    pub fn bezier(degree: usize) -> Self {
        let mut knots = vec![T::zero(); degree + 1];
        knots.extend(std::iter::repeat_n(T::one(), degree + 1));
        Self(knots)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.0.clone()
    }

    pub fn first(&self) -> T {
        self.0[0]
    }

    pub fn last(&self) -> T {
        self.0[self.0.len() - 1]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    /// Get the domain of the knot vector by degree
    pub fn domain(&self, degree: usize) -> (T, T) {
        (self.0[degree], self.0[self.0.len() - 1 - degree])
    }

    /// Check that no knot is smaller than its predecessor
    pub fn is_non_decreasing(&self) -> bool {
        self.0.windows(2).all(|w| w[0] <= w[1])
    }

    /// Get the multiplicity of each knot
    /// # Example
    /// ```
    /// use isobench::prelude::KnotVector;
    /// let knots = KnotVector::new(vec![0., 0., 0., 1., 2., 3., 3., 3.]);
    /// let knot_multiplicity = knots.multiplicity();
    /// assert_eq!(knot_multiplicity[0].multiplicity(), 3);
    /// assert_eq!(knot_multiplicity[1].multiplicity(), 1);
    /// assert_eq!(knot_multiplicity[2].multiplicity(), 1);
    /// assert_eq!(knot_multiplicity[3].multiplicity(), 3);
    /// ```
    pub fn multiplicity(&self) -> Vec<KnotMultiplicity<T>> {
        let mut mult = vec![];
        let Some(first) = self.0.first() else {
            return mult;
        };

        let mut current = KnotMultiplicity::new(*first, 0);
        self.0.iter().for_each(|knot| {
            if (*knot - *current.knot()).abs() > T::default_epsilon() {
                mult.push(current.clone());
                current = KnotMultiplicity::new(*knot, 0);
            }
            current.increment_multiplicity();
        });
        mult.push(current);

        mult
    }

    /// Check if the knot vector is clamped
    /// `clamped` means the first and last knots have a multiplicity greater than the degree
    /// e.g. [0, 0, 0, 1, 2, 3, 3, 3] with degree 2 is clamped
    pub fn is_clamped(&self, degree: usize) -> bool {
        let multiplicity = self.multiplicity();
        match (multiplicity.first(), multiplicity.last()) {
            (Some(start), Some(end)) => {
                start.multiplicity() > degree && end.multiplicity() > degree
            }
            _ => false,
        }
    }

    /// Non-empty knot intervals, i.e. the elements of the parametric axis
    /// # Example
    /// ```
    /// use isobench::prelude::KnotVector;
    /// let knots = KnotVector::new(vec![0., 0., 0., 0.5, 1., 1., 1.]);
    /// assert_eq!(knots.distinct_spans(), vec![(0., 0.5), (0.5, 1.)]);
    /// ```
    pub fn distinct_spans(&self) -> Vec<(T, T)> {
        self.multiplicity()
            .windows(2)
            .map(|w| (*w[0].knot(), *w[1].knot()))
            .collect()
    }

    /// Knots to insert for a uniform refinement.
    /// Every non-empty span is bisected `levels` times,
    /// so it ends up split into `2^levels` equal pieces.
    /// # Failures
    /// - `levels` exceeds [`MAX_REFINEMENT_LEVELS`]
    /// # Example
    /// ```
    /// use isobench::prelude::KnotVector;
    /// let knots = KnotVector::new(vec![0., 0., 1., 1.]);
    /// assert_eq!(knots.uniform_refinement(2).unwrap(), vec![0.25, 0.5, 0.75]);
    /// assert!(knots.uniform_refinement(0).unwrap().is_empty());
    /// assert!(knots.uniform_refinement(64).is_err());
    /// ```
    pub fn uniform_refinement(&self, levels: usize) -> anyhow::Result<Vec<T>> {
        let pieces = refinement_factor(levels)?;
        let denom = T::from_usize(pieces).unwrap_or_else(T::one);
        Ok(self
            .distinct_spans()
            .into_iter()
            .flat_map(|(a, b)| {
                (1..pieces).map(move |k| {
                    let ratio = T::from_usize(k).unwrap_or_else(T::zero) / denom;
                    a + (b - a) * ratio
                })
            })
            .collect())
    }

    /// Find the knot span index by binary search
    ///
    /// # Example
    /// ```
    /// use isobench::prelude::KnotVector;
    /// let knots = KnotVector::new(vec![0., 0., 0., 1., 2., 3., 3., 3.]);
    /// let idx = knots.find_knot_span_index(4, 2, 2.5);
    /// assert_eq!(idx, 4);
    /// ```
    pub fn find_knot_span_index(&self, n: usize, degree: usize, u: T) -> usize {
        if u > self[n + 1] - T::default_epsilon() {
            return n;
        }

        if u < self[degree] + T::default_epsilon() {
            return degree;
        }

        let mut low = degree;
        let mut high = n + 1;
        let mut mid = (low + high) / 2;
        while u < self[mid] || self[mid + 1] <= u {
            if u < self[mid] {
                high = mid;
            } else {
                low = mid;
            }
            let next = (low + high) / 2;
            if mid == next {
                break;
            }
            mid = next;
        }

        mid
    }

    /// Compute the non-vanishing basis functions
    pub fn basis_functions(&self, knot_span_index: usize, u: T, degree: usize) -> Vec<T> {
        let mut basis_functions = vec![T::zero(); degree + 1];
        let mut left = vec![T::zero(); degree + 1];
        let mut right = vec![T::zero(); degree + 1];

        basis_functions[0] = T::one();

        for j in 1..=degree {
            left[j] = u - self[knot_span_index + 1 - j];
            right[j] = self[knot_span_index + j] - u;
            let mut saved = T::zero();

            for r in 0..j {
                let temp = basis_functions[r] / (right[r + 1] + left[j - r]);
                basis_functions[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }

            basis_functions[j] = saved;
        }

        basis_functions
    }
}

/// Largest number of bisections a single uniform refinement may apply
pub const MAX_REFINEMENT_LEVELS: usize = 24;

/// Number of pieces each element is split into by `levels` bisections
pub(crate) fn refinement_factor(levels: usize) -> anyhow::Result<usize> {
    anyhow::ensure!(
        levels <= MAX_REFINEMENT_LEVELS,
        "Cannot refine {} times, at most {} levels are supported",
        levels,
        MAX_REFINEMENT_LEVELS
    );
    u32::try_from(levels)
        .ok()
        .and_then(|levels| 1usize.checked_shl(levels))
        .ok_or_else(|| anyhow::anyhow!("Refinement by {} levels overflows", levels))
}

impl<T> Index<usize> for KnotVector<T> {
    type Output = T;
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<T> FromIterator<T> for KnotVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
