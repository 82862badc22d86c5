/// Abstract description of a finite element basis tree
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BasisTree {
    /// Spline basis spanned by the control points of an isogeometric grid
    Nurbs,
    /// Continuous tensor-product Lagrange basis
    Lagrange { order: usize },
    /// `exponent` copies of the same child, e.g. the components of a displacement field
    Power {
        child: Box<BasisTree>,
        exponent: usize,
    },
    /// Different children side by side, e.g. displacement and pressure
    Composite(Vec<BasisTree>),
}

impl BasisTree {
    pub fn nurbs() -> Self {
        BasisTree::Nurbs
    }

    pub fn lagrange(order: usize) -> Self {
        BasisTree::Lagrange { order }
    }

    /// Power node over `child`
    /// # Example
    /// ```
    /// use isobench::prelude::*;
    ///
    /// let displacement = BasisTree::power(BasisTree::nurbs(), 2);
    /// assert_eq!(displacement.leaf_count(), 2);
    /// ```
    pub fn power(child: BasisTree, exponent: usize) -> Self {
        BasisTree::Power {
            child: Box::new(child),
            exponent,
        }
    }

    pub fn composite(children: Vec<BasisTree>) -> Self {
        BasisTree::Composite(children)
    }

    /// Number of scalar leaves once power nodes are expanded
    pub fn leaf_count(&self) -> usize {
        match self {
            BasisTree::Nurbs | BasisTree::Lagrange { .. } => 1,
            BasisTree::Power { child, exponent } => child.leaf_count() * exponent,
            BasisTree::Composite(children) => children.iter().map(|c| c.leaf_count()).sum(),
        }
    }
}

/// Structural type name of the pre-basis described by `tree` on a grid view type.
/// Two trees get the same name exactly when they have the same shape.
///
/// # Example
/// ```
/// use isobench::prelude::*;
///
/// let name = pre_basis_type_name(&BasisTree::power(BasisTree::nurbs(), 2), "IgaGrid<f64>");
/// assert_eq!(name, "PowerPreBasis<NurbsPreBasis<IgaGrid<f64>>, 2>");
/// ```
pub fn pre_basis_type_name(tree: &BasisTree, grid_view_type_name: &str) -> String {
    match tree {
        BasisTree::Nurbs => format!("NurbsPreBasis<{}>", grid_view_type_name),
        BasisTree::Lagrange { order } => {
            format!("LagrangePreBasis<{}, {}>", grid_view_type_name, order)
        }
        BasisTree::Power { child, exponent } => format!(
            "PowerPreBasis<{}, {}>",
            pre_basis_type_name(child, grid_view_type_name),
            exponent
        ),
        BasisTree::Composite(children) => {
            let children: Vec<String> = children
                .iter()
                .map(|c| pre_basis_type_name(c, grid_view_type_name))
                .collect();
            format!("CompositePreBasis<{}>", children.join(", "))
        }
    }
}
