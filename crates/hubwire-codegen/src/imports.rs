//! Import resolution for generated signatures.
//!
//! Collects the use-paths an [`OperationSet`]'s stripped type names require.
//! The C# original imports whole namespaces; Rust imports types by path, so
//! the resolver unions the fully-qualified paths recorded on every parameter
//! and return type. Primitive and locally-named (single-segment) types carry
//! no path and contribute nothing.

use crate::model::{ImportSet, OperationSet};

/// Resolve the imports required by every parameter and return type in the
/// set. The result iterates sorted, so rendered import blocks are identical
/// regardless of the order types were encountered in.
pub fn resolve(set: &OperationSet) -> ImportSet {
    let mut imports = ImportSet::new();

    for operation in &set.operations {
        for param in &operation.params {
            for path in &param.ty.imports {
                imports.insert(path.clone());
            }
        }
        for path in &operation.ret.imports {
            imports.insert(path.clone());
        }
    }

    imports
}
