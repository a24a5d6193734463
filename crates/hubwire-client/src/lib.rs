//! hubwire-client - Connection surface for generated hub proxies
//!
//! This crate provides the types hubwire's generated code compiles against:
//! - [`HubConnection`] with the three primitives proxies use:
//!   fire-and-forget `send`, acknowledgment-awaiting `invoke`, and handler
//!   registration via `on`
//! - [`HubTransport`] for plugging in an actual wire protocol
//! - [`Subscription`] handles that unregister on drop
//! - [`CancelToken`] for cooperative cancellation of in-flight calls
//! - [`HubError`] for connection failures
//!
//! The crate deliberately implements no networking: transports, retry, and
//! backpressure policy belong to the host application.

mod cancel;
mod connection;
mod error;

pub use cancel::CancelToken;
pub use connection::{
    HandlerFuture, HubConnection, HubTransport, RawHandler, Subscription, WireArgs,
    arity_mismatch, from_arg, invalid_payload, to_arg,
};
pub use error::{HubError, HubResult};
