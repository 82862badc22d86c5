/// Degrees of freedom of a scalar basis on a grid:
/// the global size and, for every element, the global indices of its local shape functions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScalarLayout {
    pub size: usize,
    pub element_indices: Vec<Vec<usize>>,
}

/// What the basis loader needs to know about a grid.
///
/// Elements are enumerated lexicographically with the first axis running fastest.
pub trait GridView {
    /// Structural type name, used to key compiled basis modules
    fn type_name(&self) -> String;

    /// Modules a basis module for this grid depends on
    fn dependencies(&self) -> Vec<String>;

    /// Number of elements along each axis of the tensor-product grid
    fn elements_per_axis(&self) -> Vec<usize>;

    fn dimension(&self) -> usize {
        self.elements_per_axis().len()
    }

    fn element_count(&self) -> usize {
        self.elements_per_axis().iter().product()
    }

    /// Layout of the spline basis spanned by the grid's own control points
    fn nurbs_layout(&self) -> anyhow::Result<ScalarLayout> {
        anyhow::bail!(
            "{} carries no NURBS geometry, a NURBS basis needs an isogeometric grid",
            self.type_name()
        )
    }

    /// Layout of a continuous tensor-product Lagrange basis of the given order.
    /// Order 0 places one discontinuous degree of freedom in every element.
    fn lagrange_layout(&self, order: usize) -> anyhow::Result<ScalarLayout> {
        let counts = self.elements_per_axis();
        anyhow::ensure!(
            counts.iter().all(|c| *c > 0),
            "Grid {} has no elements",
            self.type_name()
        );
        let element_count: usize = counts.iter().product();

        if order == 0 {
            return Ok(ScalarLayout {
                size: element_count,
                element_indices: (0..element_count).map(|e| vec![e]).collect(),
            });
        }

        let nodes: Vec<usize> = counts.iter().map(|c| c * order + 1).collect();
        let size = nodes.iter().product();
        let local_shape = vec![order + 1; counts.len()];
        let local_count: usize = local_shape.iter().product();

        let element_indices = (0..element_count)
            .map(|e| {
                let element = unflatten(e, &counts);
                (0..local_count)
                    .map(|l| {
                        let local = unflatten(l, &local_shape);
                        let global: Vec<usize> = element
                            .iter()
                            .zip(local.iter())
                            .map(|(e, l)| e * order + l)
                            .collect();
                        flatten(&global, &nodes)
                    })
                    .collect()
            })
            .collect();

        Ok(ScalarLayout {
            size,
            element_indices,
        })
    }
}

/// Multi-index of a flat index, first axis fastest
pub(crate) fn unflatten(mut index: usize, shape: &[usize]) -> Vec<usize> {
    shape
        .iter()
        .map(|extent| {
            let i = index % extent;
            index /= extent;
            i
        })
        .collect()
}

/// Flat index of a multi-index, first axis fastest
pub(crate) fn flatten(index: &[usize], shape: &[usize]) -> usize {
    index
        .iter()
        .zip(shape.iter())
        .rev()
        .fold(0, |acc, (i, extent)| acc * extent + i)
}

#[cfg(test)]
mod tests {
    use super::{flatten, unflatten, GridView};

    struct Strip(usize);

    impl GridView for Strip {
        fn type_name(&self) -> String {
            "Strip".to_string()
        }

        fn dependencies(&self) -> Vec<String> {
            vec![]
        }

        fn elements_per_axis(&self) -> Vec<usize> {
            vec![self.0]
        }
    }

    #[test]
    fn flat_and_multi_indices_agree() {
        let shape = [3, 4, 2];
        for i in 0..24 {
            assert_eq!(flatten(&unflatten(i, &shape), &shape), i);
        }
        assert_eq!(unflatten(5, &shape), vec![2, 1, 0]);
    }

    #[test]
    fn quadratic_lagrange_on_a_strip_shares_end_nodes() {
        let layout = Strip(3).lagrange_layout(2).unwrap();
        assert_eq!(layout.size, 7);
        assert_eq!(layout.element_indices[0], vec![0, 1, 2]);
        assert_eq!(layout.element_indices[2], vec![4, 5, 6]);
    }

    #[test]
    fn strip_has_no_nurbs_basis() {
        assert!(Strip(2).nurbs_layout().is_err());
        assert_eq!(Strip(2).lagrange_layout(0).unwrap().size, 2);
    }
}
