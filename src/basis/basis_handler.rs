use std::sync::{Arc, OnceLock};

use crate::grid::GridView;

use super::{
    pre_basis_type_name, BasisModule, BasisTree, GlobalBasis, InProcessGenerator, ModuleCache,
    ModuleGenerator, ModuleRequest,
};

/// A global basis together with the binding module it was loaded through
#[derive(Clone, Debug)]
pub struct BasisHandler {
    basis: GlobalBasis,
    module: Arc<BasisModule>,
}

impl BasisHandler {
    pub fn new(basis: GlobalBasis, module: Arc<BasisModule>) -> Self {
        Self { basis, module }
    }

    pub fn basis(&self) -> &GlobalBasis {
        &self.basis
    }

    pub fn module(&self) -> &Arc<BasisModule> {
        &self.module
    }

    pub fn type_name(&self) -> &str {
        &self.module.type_name
    }

    /// Total number of degrees of freedom
    pub fn size(&self) -> usize {
        self.basis.size()
    }

    pub fn local_indices(&self, element: usize) -> Option<&[usize]> {
        self.basis.local_indices(element)
    }
}

/// Loads basis handlers, building each distinct handler type only once
#[derive(Debug, Default)]
pub struct BasisLoader<G = InProcessGenerator> {
    cache: ModuleCache<G>,
}

impl<G: ModuleGenerator> BasisLoader<G> {
    pub fn new(generator: G) -> Self {
        Self {
            cache: ModuleCache::new(generator),
        }
    }

    pub fn cache(&self) -> &ModuleCache<G> {
        &self.cache
    }

    /// Load the handler of `tree` on `grid_view`.
    ///
    /// The handler type name is derived from the grid view type and the tree shape;
    /// its content hash keys the module cache, so a second call with the same grid view type
    /// and tree shape reuses the built module.
    ///
    /// # Example
    /// ```
    /// use isobench::prelude::*;
    ///
    /// let loader: BasisLoader = BasisLoader::default();
    /// let grid = cube(1.0, 2).unwrap();
    /// let handler = loader.global_basis(&grid, &BasisTree::power(BasisTree::lagrange(1), 3)).unwrap();
    /// assert_eq!(handler.size(), 3 * 27);
    /// assert_eq!(loader.cache().len(), 1);
    /// ```
    pub fn global_basis<V: GridView>(
        &self,
        grid_view: &V,
        tree: &BasisTree,
    ) -> anyhow::Result<BasisHandler> {
        let pre_basis = pre_basis_type_name(tree, &grid_view.type_name());
        let element_type = format!("BasisHandler<{}>", pre_basis);
        let mut dependencies = grid_view.dependencies();
        dependencies.push("basis::global_basis".to_string());
        dependencies.push("basis::basis_handler".to_string());

        let basis = GlobalBasis::try_new(grid_view, tree)?;
        let request = ModuleRequest::new(element_type, dependencies);
        let module = self.cache.load(&request)?;
        Ok(BasisHandler::new(basis, module))
    }
}

/// Load a basis handler through the process-wide loader
pub fn global_basis<V: GridView>(grid_view: &V, tree: &BasisTree) -> anyhow::Result<BasisHandler> {
    static LOADER: OnceLock<BasisLoader> = OnceLock::new();
    LOADER
        .get_or_init(BasisLoader::default)
        .global_basis(grid_view, tree)
}
