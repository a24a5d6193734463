//! # hubwire
//!
//! Strongly-typed real-time hub proxies, generated from contract traits.
//!
//! hubwire takes a pair of contract traits (the operations a client may
//! invoke on a server, and the notifications a server may push back) and
//! generates a proxy with three roles around one shared connection:
//! `send` (fire-and-forget), `invoke` (awaits acknowledgment), and `on`
//! (notification subscriptions).
//!
//! ## Declaring a proxy
//!
//! ```ignore
//! use hubwire::prelude::*;
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
//!
//! Running `hubwire generate` (or `hubwire_codegen::Generator` from a build
//! script) produces `ChatProxy.g.rs`; include it and use the proxy:
//!
//! ```ignore
//! let connection = std::sync::Arc::new(HubConnection::new(my_transport));
//! let proxy = ChatProxy::new(connection);
//!
//! let _sub = proxy.on.receive_message(|message: String| async move {
//!     println!("{message}");
//! });
//! proxy.send.send_message("hello".into(), CancelToken::new()).await?;
//! ```
//!
//! The wire identifier for every call and registration is the contract
//! method name verbatim; server and client agree by sharing the contract.
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports from:
//! - [`hubwire_client`] - connection surface the generated code wraps
//! - [`hubwire_macros`] - `#[hub_invoker]` / `#[hub_listener]` /
//!   `#[hub_sender]` marker attributes
//!
//! The generation pipeline itself lives in `hubwire-codegen` and the
//! `hubwire` command-line tool.

// Re-export connection types
pub use hubwire_client::{
    CancelToken, HandlerFuture, HubConnection, HubError, HubResult, HubTransport, RawHandler,
    Subscription, WireArgs, arity_mismatch, from_arg, invalid_payload, to_arg,
};

// Re-export marker attributes
pub use hubwire_macros::{hub_invoker, hub_listener, hub_sender};

// Re-export common dependencies that proxy consumers need
pub use async_trait::async_trait;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;

/// Prelude module for convenient imports.
///
/// Use `use hubwire::prelude::*;` to import commonly used types.
pub mod prelude {
    // Connection types
    pub use crate::{CancelToken, HubConnection, HubError, HubResult, HubTransport, Subscription};

    // Marker attributes
    pub use hubwire_macros::{hub_invoker, hub_listener, hub_sender};

    // Common deps
    pub use crate::async_trait;
    pub use serde::{Deserialize, Serialize};
}
