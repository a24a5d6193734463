//! hubwire-macros - Marker attributes for proxy declarations
//!
//! This crate provides the annotation surface the hubwire generator scans
//! for:
//! - `#[hub_invoker(HubContract)]` - names the server-invokable contract
//! - `#[hub_listener(ClientContract)]` - names the notification contract
//! - `#[hub_sender(HubContract)]` - optional send-capability metadata
//!
//! The markers are generation directives, not code expanders: each one
//! validates its usage and then consumes the annotated declaration. Rust has
//! no partial types, so the proxy type itself is declared by the generated
//! `{Name}.g.rs` artifact and the marker struct exists only to be found by
//! the scanner.
//!
//! # Example
//!
//! ```ignore
//! use hubwire_macros::{hub_invoker, hub_listener};
//!
//! pub trait ChatHub {
//!     async fn send_message(&self, message: String);
//! }
//!
//! pub trait ChatClient {
//!     async fn receive_message(&self, message: String);
//! }
//!
//! #[hub_invoker(ChatHub)]
//! #[hub_listener(ChatClient)]
//! pub struct ChatProxy;
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote_spanned;
use syn::spanned::Spanned;

/// Marks a proxy declaration with its hub (server-invokable) contract.
#[proc_macro_attribute]
pub fn hub_invoker(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand_marker("hub_invoker", attr.into(), item.into()).into()
}

/// Marks a proxy declaration with its client-notification contract.
#[proc_macro_attribute]
pub fn hub_listener(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand_marker("hub_listener", attr.into(), item.into()).into()
}

/// Marks a proxy declaration as send-capable. Optional metadata; the
/// generator produces the same proxy shape with or without it.
#[proc_macro_attribute]
pub fn hub_sender(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand_marker("hub_sender", attr.into(), item.into()).into()
}

/// Shared expansion for all three markers: validate, then consume the
/// declaration. On error the original item is re-emitted alongside the
/// `compile_error!` so the failure doesn't cascade into missing-type errors.
fn expand_marker(marker: &str, attr: TokenStream2, item: TokenStream2) -> TokenStream2 {
    match validate_marker(marker, attr, item.clone()) {
        Ok(()) => TokenStream2::new(),
        Err(error) => {
            let mut out = error;
            out.extend(item);
            out
        }
    }
}

fn validate_marker(
    marker: &str,
    attr: TokenStream2,
    item: TokenStream2,
) -> Result<(), TokenStream2> {
    let attr_span = attr.span();
    if syn::parse2::<syn::Path>(attr).is_err() {
        let message = format!("#[{marker}(...)] expects a contract type, e.g. #[{marker}(ChatHub)]");
        return Err(quote_spanned! {attr_span=> compile_error!(#message); });
    }

    let item_span = item.span();
    match syn::parse2::<syn::Item>(item) {
        Ok(syn::Item::Struct(_)) => Ok(()),
        _ => {
            let message = format!("#[{marker}(...)] can only annotate a struct declaration");
            Err(quote_spanned! {item_span=> compile_error!(#message); })
        }
    }
}
