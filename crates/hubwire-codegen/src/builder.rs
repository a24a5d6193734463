//! Proxy model construction.
//!
//! Combines the metadata read off an annotated declaration with the
//! operations extracted from its two contract traits. The builder is only
//! called once the driver has resolved both contracts: a declaration with
//! one marker is not applicable and never produces a partial model, because
//! the renderer needs both operation sets to synthesize all three roles.

use crate::error::CodegenResult;
use crate::extract::extract_operations;
use crate::imports::resolve;
use crate::model::{Accessibility, ProxyModel};

/// Metadata read off one annotated proxy declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyDeclaration {
    /// Name of the annotated unit struct.
    pub struct_name: String,

    /// Module path of the declaration, `None` at crate root.
    pub module_path: Option<String>,

    /// Visibility of the declaration.
    pub accessibility: Accessibility,

    /// Contract named by `#[hub_invoker(...)]`.
    pub hub_contract: String,

    /// Contract named by `#[hub_listener(...)]`.
    pub client_contract: String,
}

/// Build the [`ProxyModel`] for one declaration.
///
/// The returned model is fully independent of the syntax trees passed in;
/// nothing is re-queried after construction, which is what makes structural
/// equality usable as the incremental cache key.
pub fn build(
    decl: &ProxyDeclaration,
    hub: &syn::ItemTrait,
    client: &syn::ItemTrait,
) -> CodegenResult<ProxyModel> {
    let server_ops = extract_operations(hub)?;
    let client_ops = extract_operations(client)?;

    let mut imports = resolve(&server_ops);
    imports.extend(&resolve(&client_ops));

    Ok(ProxyModel {
        struct_name: decl.struct_name.clone(),
        module_path: decl.module_path.clone(),
        accessibility: decl.accessibility,
        imports,
        server_ops,
        client_ops,
    })
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::error::CodegenError;

    fn declaration() -> ProxyDeclaration {
        ProxyDeclaration {
            struct_name: "ChatProxy".to_string(),
            module_path: Some("chat".to_string()),
            accessibility: Accessibility::Public,
            hub_contract: "ChatHub".to_string(),
            client_contract: "ChatClient".to_string(),
        }
    }

    fn parse_trait(source: &str) -> syn::ItemTrait {
        syn::parse_str(source).unwrap()
    }

    #[test]
    fn build___combines_both_operation_sets() {
        let hub = parse_trait("trait ChatHub { async fn send_message(&self, message: String); }");
        let client =
            parse_trait("trait ChatClient { async fn receive_message(&self, message: String); }");

        let model = build(&declaration(), &hub, &client).unwrap();

        assert_eq!(model.struct_name, "ChatProxy");
        assert_eq!(model.server_ops.operations[0].name, "send_message");
        assert_eq!(model.client_ops.operations[0].name, "receive_message");
    }

    #[test]
    fn build___unions_imports_from_both_contracts() {
        let hub = parse_trait("trait ChatHub { async fn post(&self, m: chat::Outbound); }");
        let client = parse_trait("trait ChatClient { async fn on_post(&self, m: chat::Inbound); }");

        let model = build(&declaration(), &hub, &client).unwrap();

        assert_eq!(
            model.imports.iter().collect::<Vec<_>>(),
            vec!["chat::Inbound", "chat::Outbound"]
        );
    }

    #[test]
    fn build___duplicate_operation_in_contract___propagates_error() {
        let hub = parse_trait(
            "trait ChatHub { async fn ping(&self); async fn ping(&self, fast: bool); }",
        );
        let client = parse_trait("trait ChatClient {}");

        let err = build(&declaration(), &hub, &client).unwrap_err();

        assert!(matches!(err, CodegenError::DuplicateOperation { .. }));
    }

    #[test]
    fn build___same_sources_parsed_twice___yield_equal_models() {
        let hub_src = "trait ChatHub { async fn send_message(&self, message: String); }";
        let client_src = "trait ChatClient { async fn receive_message(&self, message: String); }";

        let first = build(
            &declaration(),
            &parse_trait(hub_src),
            &parse_trait(client_src),
        )
        .unwrap();
        let second = build(
            &declaration(),
            &parse_trait(hub_src),
            &parse_trait(client_src),
        )
        .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn build___empty_contracts___yield_operationless_model() {
        let model = build(
            &declaration(),
            &parse_trait("trait ChatHub {}"),
            &parse_trait("trait ChatClient {}"),
        )
        .unwrap();

        assert!(model.server_ops.is_empty());
        assert!(model.client_ops.is_empty());
        assert!(model.imports.is_empty());
    }
}
