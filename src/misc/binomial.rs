use std::collections::HashMap;

use nalgebra::RealField;

/// A memoized binomial coefficient calculator.
/// Degree elevation asks for the same handful of coefficients over and over,
/// so every computed value is kept in the memo map.
#[derive(Debug, Default)]
pub struct Binomial<T> {
    memo: HashMap<(usize, usize), T>,
}

impl<T: RealField + Copy> Binomial<T> {
    pub fn new() -> Self {
        Self {
            memo: HashMap::new(),
        }
    }

    /// Returns the binomial coefficient of `n` and `k` with memoization.
    pub fn get(&mut self, n: usize, k: usize) -> T {
        if k > n {
            return T::zero();
        }
        if k == 0 || k == n {
            return T::one();
        }

        let k = k.min(n - k);
        if let Some(memoized) = self.memo.get(&(n, k)) {
            return *memoized;
        }

        let r = self.get(n - 1, k) + self.get(n - 1, k - 1);
        self.memo.insert((n, k), r);
        r
    }
}

#[cfg(test)]
mod tests {
    use super::Binomial;

    #[test]
    fn pascal_row() {
        let mut binomial = Binomial::<f64>::new();
        let row: Vec<f64> = (0..=6).map(|k| binomial.get(5, k)).collect();
        assert_eq!(row, vec![1., 5., 10., 10., 5., 1., 0.]);
    }

    #[test]
    fn memoized_values_are_stable() {
        let mut binomial = Binomial::<f64>::new();
        let first = binomial.get(12, 5);
        let second = binomial.get(12, 7);
        assert_eq!(first, 792.);
        assert_eq!(first, second);
    }
}
