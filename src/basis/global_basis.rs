use crate::grid::{GridView, ScalarLayout};

use super::BasisTree;

/// Global basis on a grid view: a flat numbering of the degrees of freedom of every leaf.
///
/// Children of power and composite nodes are numbered one after another,
/// so the degrees of freedom of the `c`-th child start at the summed size of the children before it.
#[derive(Clone, Debug)]
pub struct GlobalBasis {
    tree: BasisTree,
    grid_type_name: String,
    layout: ScalarLayout,
}

impl GlobalBasis {
    pub fn try_new<V: GridView>(grid_view: &V, tree: &BasisTree) -> anyhow::Result<Self> {
        let layout = build_layout(grid_view, tree)?;
        Ok(Self {
            tree: tree.clone(),
            grid_type_name: grid_view.type_name(),
            layout,
        })
    }

    pub fn tree(&self) -> &BasisTree {
        &self.tree
    }

    pub fn grid_type_name(&self) -> &str {
        &self.grid_type_name
    }

    /// Total number of degrees of freedom
    pub fn size(&self) -> usize {
        self.layout.size
    }

    pub fn element_count(&self) -> usize {
        self.layout.element_indices.len()
    }

    /// Global indices of the shape functions of an element, in tree order
    pub fn local_indices(&self, element: usize) -> Option<&[usize]> {
        self.layout.element_indices.get(element).map(|v| v.as_slice())
    }
}

fn build_layout<V: GridView>(grid_view: &V, tree: &BasisTree) -> anyhow::Result<ScalarLayout> {
    match tree {
        BasisTree::Nurbs => grid_view.nurbs_layout(),
        BasisTree::Lagrange { order } => grid_view.lagrange_layout(*order),
        BasisTree::Power { child, exponent } => {
            anyhow::ensure!(*exponent > 0, "Power node needs at least one child");
            let child = build_layout(grid_view, child)?;
            concatenate(std::iter::repeat_n(&child, *exponent))
        }
        BasisTree::Composite(children) => {
            anyhow::ensure!(
                !children.is_empty(),
                "Composite node needs at least one child"
            );
            let children = children
                .iter()
                .map(|c| build_layout(grid_view, c))
                .collect::<anyhow::Result<Vec<_>>>()?;
            concatenate(children.iter())
        }
    }
}

/// Number the children one after another
fn concatenate<'a>(children: impl Iterator<Item = &'a ScalarLayout>) -> anyhow::Result<ScalarLayout> {
    let mut size = 0;
    let mut element_indices: Vec<Vec<usize>> = vec![];
    for (c, child) in children.enumerate() {
        if c == 0 {
            element_indices = vec![vec![]; child.element_indices.len()];
        }
        anyhow::ensure!(
            child.element_indices.len() == element_indices.len(),
            "Children of a basis node live on different element sets"
        );
        element_indices
            .iter_mut()
            .zip(child.element_indices.iter())
            .for_each(|(indices, local)| indices.extend(local.iter().map(|i| i + size)));
        size += child.size;
    }
    Ok(ScalarLayout {
        size,
        element_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::GlobalBasis;
    use crate::basis::BasisTree;
    use crate::grid::StructuredGrid;

    #[test]
    fn power_basis_offsets_components() {
        let grid = StructuredGrid::try_new([0., 0.], [1., 1.], [1, 1]).unwrap();
        let basis = GlobalBasis::try_new(&grid, &BasisTree::power(BasisTree::lagrange(1), 2))
            .unwrap();
        assert_eq!(basis.size(), 8);
        assert_eq!(basis.local_indices(0).unwrap(), &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert!(basis.local_indices(1).is_none());
    }

    #[test]
    fn taylor_hood_on_a_strip() {
        let grid = StructuredGrid::try_new([0.], [1.], [2]).unwrap();
        let tree = BasisTree::composite(vec![
            BasisTree::lagrange(2),
            BasisTree::lagrange(1),
        ]);
        let basis = GlobalBasis::try_new(&grid, &tree).unwrap();
        assert_eq!(basis.size(), 5 + 3);
        assert_eq!(basis.local_indices(1).unwrap(), &[2, 3, 4, 6, 7]);
    }

    #[test]
    fn nurbs_needs_an_isogeometric_grid() {
        let grid = StructuredGrid::try_new([0., 0.], [1., 1.], [2, 2]).unwrap();
        assert!(GlobalBasis::try_new(&grid, &BasisTree::nurbs()).is_err());
        assert!(GlobalBasis::try_new(&grid, &BasisTree::composite(vec![])).is_err());
    }
}
