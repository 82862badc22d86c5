use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Prefix of every basis module name
pub const MODULE_PREFIX: &str = "Basis_";

/// Request to build the binding module of a basis handler type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleRequest {
    /// Full type signature of the handler, e.g. `BasisHandler<NurbsPreBasis<IgaGrid<f64>>>`
    pub type_name: String,
    /// Cache key derived from the content hash of `type_name`
    pub module_name: String,
    /// Modules the built module links against
    pub dependencies: Vec<String>,
}

impl ModuleRequest {
    /// Create a request whose module name is keyed by the hash of the type signature
    /// # Example
    /// ```
    /// use isobench::prelude::*;
    ///
    /// let a = ModuleRequest::new("BasisHandler<X>", vec![]);
    /// let b = ModuleRequest::new("BasisHandler<X>", vec!["grid".to_string()]);
    /// assert_eq!(a.module_name, b.module_name);
    /// assert!(a.module_name.starts_with("Basis_"));
    /// ```
    pub fn new(type_name: impl Into<String>, dependencies: Vec<String>) -> Self {
        let type_name = type_name.into();
        let module_name = format!("{}{}", MODULE_PREFIX, hash_it(&type_name));
        Self {
            type_name,
            module_name,
            dependencies,
        }
    }
}

/// Hex digest of a type signature
pub fn hash_it(signature: &str) -> String {
    let mut hasher = DefaultHasher::new();
    signature.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// A built basis binding module
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasisModule {
    pub module_name: String,
    pub type_name: String,
    pub dependencies: Vec<String>,
}

/// Builds binding modules. Building is the expensive step that the module cache avoids repeating.
pub trait ModuleGenerator {
    fn generate(&self, request: &ModuleRequest) -> anyhow::Result<BasisModule>;
}

/// Generator that resolves every request inside the running process
#[derive(Clone, Copy, Debug, Default)]
pub struct InProcessGenerator;

impl ModuleGenerator for InProcessGenerator {
    fn generate(&self, request: &ModuleRequest) -> anyhow::Result<BasisModule> {
        anyhow::ensure!(
            !request.type_name.is_empty(),
            "Cannot build a module without a type name"
        );
        anyhow::ensure!(
            request.module_name.starts_with(MODULE_PREFIX),
            "Module name {} does not start with {}",
            request.module_name,
            MODULE_PREFIX
        );
        log::info!(
            "building module {} for {}",
            request.module_name,
            request.type_name
        );
        Ok(BasisModule {
            module_name: request.module_name.clone(),
            type_name: request.type_name.clone(),
            dependencies: request.dependencies.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{hash_it, InProcessGenerator, ModuleGenerator, ModuleRequest};

    #[test]
    fn hash_depends_on_signature_only() {
        assert_eq!(hash_it("A<B>"), hash_it("A<B>"));
        assert_ne!(hash_it("A<B>"), hash_it("A<C>"));
        assert_eq!(hash_it("A<B>").len(), 16);
    }

    #[test]
    fn in_process_generator_rejects_foreign_names() {
        let mut request = ModuleRequest::new("BasisHandler<X>", vec![]);
        assert!(InProcessGenerator.generate(&request).is_ok());
        request.module_name = "Other_1".to_string();
        assert!(InProcessGenerator.generate(&request).is_err());
    }
}
