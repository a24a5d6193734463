//! Contract metadata extraction.
//!
//! Turns a contract trait declaration into an [`OperationSet`]: instance
//! methods in declaration order, each with its name, parameters, and return
//! type. Associated functions, consts, and types are not operations and are
//! skipped.
//!
//! The extractor makes no inference about asynchrony and performs no sorting
//! or deduplication: output order equals source declaration order, and call
//! shape is renderer policy. The one validation it does perform is operation
//! name uniqueness, because duplicate names would render colliding methods.

use quote::ToTokens;
use syn::{FnArg, GenericArgument, PathArguments, ReturnType, TraitItem, Type};

use crate::error::{CodegenError, CodegenResult};
use crate::model::{Operation, OperationSet, Parameter, TypeRef};

/// Extract the operations of a contract trait.
///
/// A trait with zero qualifying methods yields an empty set, which is valid
/// and renders to an operation-less role.
pub fn extract_operations(item: &syn::ItemTrait) -> CodegenResult<OperationSet> {
    let contract = item.ident.to_string();
    let mut operations = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for trait_item in &item.items {
        let TraitItem::Fn(method) = trait_item else { continue };

        // Only instance methods participate; associated functions have no
        // receiver and cannot be dispatched over a connection.
        if method.sig.receiver().is_none() {
            continue;
        }

        let name = method.sig.ident.to_string();
        if !seen.insert(name.clone()) {
            return Err(CodegenError::DuplicateOperation { contract, operation: name });
        }

        let mut params = Vec::new();
        for input in &method.sig.inputs {
            let FnArg::Typed(pat_type) = input else { continue };
            let param_name = match pat_type.pat.as_ref() {
                syn::Pat::Ident(ident) => ident.ident.to_string(),
                other => {
                    return Err(CodegenError::UnsupportedType {
                        contract,
                        ty: other.to_token_stream().to_string(),
                    });
                }
            };
            let ty = type_ref(&contract, &pat_type.ty)?;
            params.push(Parameter { name: param_name, ty });
        }

        let ret = match &method.sig.output {
            ReturnType::Default => TypeRef::unit(),
            ReturnType::Type(_, ty) => type_ref(&contract, ty)?,
        };

        operations.push(Operation { name, params, ret });
    }

    Ok(OperationSet { contract, operations })
}

/// Build a [`TypeRef`] from a syntactic type.
///
/// Path prefixes are stripped from the display form and recorded as import
/// paths; the stripping recurses through generic arguments, references,
/// slices, arrays, tuples, and parenthesized types. Anything else (impl
/// Trait, trait objects, function pointers) is rejected; those shapes
/// cannot cross a serialized connection.
fn type_ref(contract: &str, ty: &Type) -> CodegenResult<TypeRef> {
    let mut display = String::new();
    let mut imports = Vec::new();
    write_type(contract, ty, &mut display, &mut imports)?;
    Ok(TypeRef { display, imports })
}

fn write_type(
    contract: &str,
    ty: &Type,
    out: &mut String,
    imports: &mut Vec<String>,
) -> CodegenResult<()> {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => {
            write_path(contract, &type_path.path, out, imports)
        }
        Type::Reference(reference) => {
            out.push('&');
            if reference.mutability.is_some() {
                out.push_str("mut ");
            }
            write_type(contract, &reference.elem, out, imports)
        }
        Type::Slice(slice) => {
            out.push('[');
            write_type(contract, &slice.elem, out, imports)?;
            out.push(']');
            Ok(())
        }
        Type::Array(array) => {
            out.push('[');
            write_type(contract, &array.elem, out, imports)?;
            out.push_str("; ");
            out.push_str(&array.len.to_token_stream().to_string());
            out.push(']');
            Ok(())
        }
        Type::Tuple(tuple) => {
            out.push('(');
            for (i, elem) in tuple.elems.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_type(contract, elem, out, imports)?;
            }
            if tuple.elems.len() == 1 {
                out.push(',');
            }
            out.push(')');
            Ok(())
        }
        Type::Paren(paren) => write_type(contract, &paren.elem, out, imports),
        other => Err(CodegenError::UnsupportedType {
            contract: contract.to_string(),
            ty: other.to_token_stream().to_string(),
        }),
    }
}

fn write_path(
    contract: &str,
    path: &syn::Path,
    out: &mut String,
    imports: &mut Vec<String>,
) -> CodegenResult<()> {
    let Some(last) = path.segments.last() else {
        return Err(CodegenError::UnsupportedType {
            contract: contract.to_string(),
            ty: path.to_token_stream().to_string(),
        });
    };

    // Multi-segment paths get stripped to the final segment in the display
    // form; the full path (without generic arguments) becomes an import so
    // the stripped name resolves in the generated file.
    if path.segments.len() > 1 || path.leading_colon.is_some() {
        let mut qualified = String::new();
        if path.leading_colon.is_some() {
            qualified.push_str("::");
        }
        for (i, segment) in path.segments.iter().enumerate() {
            if i > 0 {
                qualified.push_str("::");
            }
            qualified.push_str(&segment.ident.to_string());
        }
        imports.push(qualified);
    }

    out.push_str(&last.ident.to_string());

    match &last.arguments {
        PathArguments::None => Ok(()),
        PathArguments::AngleBracketed(args) => {
            out.push('<');
            for (i, arg) in args.args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                match arg {
                    GenericArgument::Type(inner) => {
                        write_type(contract, inner, out, imports)?;
                    }
                    GenericArgument::Lifetime(lifetime) => {
                        out.push_str(&lifetime.to_token_stream().to_string());
                    }
                    other => {
                        out.push_str(&other.to_token_stream().to_string());
                    }
                }
            }
            out.push('>');
            Ok(())
        }
        PathArguments::Parenthesized(_) => Err(CodegenError::UnsupportedType {
            contract: contract.to_string(),
            ty: path.to_token_stream().to_string(),
        }),
    }
}
