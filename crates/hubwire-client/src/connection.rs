//! The hub connection generated proxies wrap.
//!
//! [`HubConnection`] exposes the three primitives generated code depends
//! on: fire-and-forget [`send`](HubConnection::send), acknowledgment-awaiting
//! [`invoke`](HubConnection::invoke), and handler registration via
//! [`on`](HubConnection::on). The actual wire protocol lives behind the
//! [`HubTransport`] trait and is supplied by the host application; this
//! crate implements no networking, retry, or backpressure policy.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::error::HubError;

/// Positional wire arguments, one value per contract parameter.
pub type WireArgs = Vec<serde_json::Value>;

/// The pending completion a raw notification handler returns.
pub type HandlerFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A type-erased notification handler as stored in the registry. Generated
/// listener methods adapt typed handlers into this shape.
pub type RawHandler = Arc<dyn Fn(WireArgs) -> HandlerFuture + Send + Sync>;

type HandlerRegistry = Mutex<HashMap<String, Vec<(u64, RawHandler)>>>;

/// Delivery primitives a hub transport must provide.
///
/// `send` resolves once delivery has been initiated; `invoke` resolves once
/// the server has acknowledged completion. Server operations are treated as
/// void-returning, so neither carries a result value.
#[async_trait]
pub trait HubTransport: Send + Sync {
    async fn send(&self, method: &str, args: WireArgs) -> Result<(), HubError>;

    async fn invoke(&self, method: &str, args: WireArgs) -> Result<(), HubError>;
}

/// A connection to a hub, shared by every role of a generated proxy.
pub struct HubConnection {
    transport: Box<dyn HubTransport>,
    handlers: Arc<HandlerRegistry>,
    next_handler_id: AtomicU64,
}

impl HubConnection {
    /// Wrap a transport.
    pub fn new(transport: impl HubTransport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            handlers: Arc::new(Mutex::new(HashMap::new())),
            next_handler_id: AtomicU64::new(0),
        }
    }

    /// Fire-and-forget call: resolves when delivery has been initiated.
    ///
    /// A cancelled token short-circuits to [`HubError::Cancelled`] without
    /// touching the transport.
    pub async fn send(
        &self,
        method: &str,
        args: WireArgs,
        cancel: CancelToken,
    ) -> Result<(), HubError> {
        if cancel.is_cancelled() {
            return Err(HubError::Cancelled);
        }
        tokio::select! {
            result = self.transport.send(method, args) => result,
            () = cancel.cancelled() => Err(HubError::Cancelled),
        }
    }

    /// Acknowledgment-awaiting call: resolves when the server has completed
    /// the operation.
    pub async fn invoke(
        &self,
        method: &str,
        args: WireArgs,
        cancel: CancelToken,
    ) -> Result<(), HubError> {
        if cancel.is_cancelled() {
            return Err(HubError::Cancelled);
        }
        tokio::select! {
            result = self.transport.invoke(method, args) => result,
            () = cancel.cancelled() => Err(HubError::Cancelled),
        }
    }

    /// Register a raw handler for a notification method.
    ///
    /// The returned [`Subscription`] unregisters the handler when dropped.
    pub fn on(&self, method: &str, handler: RawHandler) -> Subscription {
        let id = self.next_handler_id.fetch_add(1, Ordering::Relaxed);
        self.handlers
            .lock()
            .entry(method.to_string())
            .or_default()
            .push((id, handler));
        debug!(method, id, "handler registered");

        Subscription {
            method: method.to_string(),
            id,
            registry: Arc::downgrade(&self.handlers),
        }
    }

    /// Deliver an inbound notification to every registered handler, in
    /// registration order. Called by transport glue; a method with no
    /// handlers is not an error.
    pub async fn dispatch(&self, method: &str, args: WireArgs) {
        let handlers: Vec<RawHandler> = {
            let registry = self.handlers.lock();
            registry
                .get(method)
                .map(|entries| entries.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default()
        };

        if handlers.is_empty() {
            debug!(method, "notification with no registered handler");
            return;
        }
        for handler in handlers {
            handler(args.clone()).await;
        }
    }

    /// Number of handlers currently registered for a method.
    pub fn handler_count(&self, method: &str) -> usize {
        self.handlers.lock().get(method).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for HubConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubConnection")
            .field("registered_methods", &self.handlers.lock().len())
            .finish_non_exhaustive()
    }
}

/// A registered notification handler.
///
/// Dropping the subscription (or calling [`dispose`](Subscription::dispose))
/// unregisters the handler. Outliving the connection is harmless: the
/// registry reference is weak.
pub struct Subscription {
    method: String,
    id: u64,
    registry: Weak<HandlerRegistry>,
}

impl Subscription {
    /// The method this subscription listens for.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Explicitly unregister. Equivalent to dropping.
    pub fn dispose(self) {}

    fn unregister(&self) {
        let Some(registry) = self.registry.upgrade() else { return };
        let mut map = registry.lock();
        if let Some(entries) = map.get_mut(&self.method) {
            entries.retain(|(id, _)| *id != self.id);
            if entries.is_empty() {
                map.remove(&self.method);
            }
        }
        debug!(method = %self.method, id = self.id, "handler unregistered");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unregister();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("method", &self.method)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Serialize one call argument to its wire value.
pub fn to_arg<T: Serialize>(value: &T) -> Result<serde_json::Value, HubError> {
    Ok(serde_json::to_value(value)?)
}

/// Deserialize one notification argument from its wire value.
pub fn from_arg<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, HubError> {
    Ok(serde_json::from_value(value)?)
}

/// Completion for a notification whose argument count did not match the
/// contract. Logs and resolves; a malformed notification must never take
/// down the dispatch loop.
pub fn arity_mismatch(method: &str, expected: usize, actual: usize) -> HandlerFuture {
    warn!(
        method,
        expected, actual, "notification argument count mismatch, handler not invoked"
    );
    Box::pin(std::future::ready(()))
}

/// Completion for a notification whose payload failed to deserialize.
/// Logs and resolves.
pub fn invalid_payload(method: &str, err: &HubError) -> HandlerFuture {
    warn!(
        method,
        error = %err,
        "notification payload failed to deserialize, handler not invoked"
    );
    Box::pin(std::future::ready(()))
}

#[cfg(test)]
#[path = "connection/connection_tests.rs"]
mod connection_tests;
