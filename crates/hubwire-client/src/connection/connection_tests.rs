#![allow(non_snake_case)]
#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde_json::json;

use super::*;

/// Transport that records every call.
#[derive(Default)]
struct RecordingTransport {
    calls: Mutex<Vec<(String, String, WireArgs)>>,
}

#[async_trait]
impl HubTransport for RecordingTransport {
    async fn send(&self, method: &str, args: WireArgs) -> Result<(), HubError> {
        self.calls
            .lock()
            .push(("send".to_string(), method.to_string(), args));
        Ok(())
    }

    async fn invoke(&self, method: &str, args: WireArgs) -> Result<(), HubError> {
        self.calls
            .lock()
            .push(("invoke".to_string(), method.to_string(), args));
        Ok(())
    }
}

/// Transport that never completes; used to exercise cancellation.
struct StalledTransport;

#[async_trait]
impl HubTransport for StalledTransport {
    async fn send(&self, _method: &str, _args: WireArgs) -> Result<(), HubError> {
        std::future::pending().await
    }

    async fn invoke(&self, _method: &str, _args: WireArgs) -> Result<(), HubError> {
        std::future::pending().await
    }
}

fn recording_connection() -> (Arc<RecordingTransport>, HubConnection) {
    let transport = Arc::new(RecordingTransport::default());
    let connection = HubConnection::new(SharedTransport(Arc::clone(&transport)));
    (transport, connection)
}

/// Adapter so tests can keep a handle on the transport after handing it to
/// the connection.
struct SharedTransport(Arc<RecordingTransport>);

#[async_trait]
impl HubTransport for SharedTransport {
    async fn send(&self, method: &str, args: WireArgs) -> Result<(), HubError> {
        self.0.send(method, args).await
    }

    async fn invoke(&self, method: &str, args: WireArgs) -> Result<(), HubError> {
        self.0.invoke(method, args).await
    }
}

#[tokio::test]
async fn send___passes_method_and_args_to_transport() {
    let (transport, connection) = recording_connection();

    connection
        .send(
            "send_message",
            vec![json!("hello")],
            CancelToken::new(),
        )
        .await
        .unwrap();

    let calls = transport.calls.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "send");
    assert_eq!(calls[0].1, "send_message");
    assert_eq!(calls[0].2, vec![json!("hello")]);
}

#[tokio::test]
async fn invoke___uses_invoke_primitive() {
    let (transport, connection) = recording_connection();

    connection
        .invoke("send_message", vec![json!("hello")], CancelToken::new())
        .await
        .unwrap();

    assert_eq!(transport.calls.lock()[0].0, "invoke");
}

#[tokio::test]
async fn send___cancelled_token___short_circuits_without_touching_transport() {
    let (transport, connection) = recording_connection();
    let cancel = CancelToken::new();
    cancel.cancel();

    let result = connection.send("send_message", vec![], cancel).await;

    assert!(matches!(result, Err(HubError::Cancelled)));
    assert!(transport.calls.lock().is_empty());
}

#[tokio::test]
async fn send___cancel_during_stalled_transport___resolves_cancelled() {
    let connection = Arc::new(HubConnection::new(StalledTransport));
    let cancel = CancelToken::new();

    let task = {
        let connection = Arc::clone(&connection);
        let cancel = cancel.clone();
        tokio::spawn(async move { connection.send("slow", vec![], cancel).await })
    };

    tokio::task::yield_now().await;
    cancel.cancel();

    let result = task.await.unwrap();
    assert!(matches!(result, Err(HubError::Cancelled)));
}

#[tokio::test]
async fn invoke___cancel_during_stalled_transport___resolves_cancelled() {
    let connection = HubConnection::new(StalledTransport);
    let cancel = CancelToken::new();
    cancel.cancel();

    let result = connection.invoke("slow", vec![], cancel).await;

    assert!(matches!(result, Err(HubError::Cancelled)));
}

#[tokio::test]
async fn dispatch___runs_registered_handler_with_args() {
    let (_, connection) = recording_connection();
    let received: Arc<Mutex<Vec<WireArgs>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&received);
    let _subscription = connection.on(
        "receive_message",
        Arc::new(move |args| {
            sink.lock().push(args);
            Box::pin(std::future::ready(()))
        }),
    );

    connection
        .dispatch("receive_message", vec![json!("hello")])
        .await;

    assert_eq!(*received.lock(), vec![vec![json!("hello")]]);
}

#[tokio::test]
async fn dispatch___runs_handlers_in_registration_order() {
    let (_, connection) = recording_connection();
    let order: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));

    let first = Arc::clone(&order);
    let _a = connection.on(
        "ping",
        Arc::new(move |_| {
            first.lock().push(1);
            Box::pin(std::future::ready(()))
        }),
    );
    let second = Arc::clone(&order);
    let _b = connection.on(
        "ping",
        Arc::new(move |_| {
            second.lock().push(2);
            Box::pin(std::future::ready(()))
        }),
    );

    connection.dispatch("ping", vec![]).await;

    assert_eq!(*order.lock(), vec![1, 2]);
}

#[tokio::test]
async fn dispatch___unknown_method___is_a_no_op() {
    let (_, connection) = recording_connection();

    connection.dispatch("nobody_listens", vec![json!(1)]).await;
}

#[tokio::test]
async fn subscription___drop___unregisters_handler() {
    let (_, connection) = recording_connection();
    let invocations = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&invocations);
    let subscription = connection.on(
        "ping",
        Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(std::future::ready(()))
        }),
    );
    assert_eq!(connection.handler_count("ping"), 1);

    drop(subscription);

    assert_eq!(connection.handler_count("ping"), 0);
    connection.dispatch("ping", vec![]).await;
    assert_eq!(invocations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn subscription___dispose___unregisters_handler() {
    let (_, connection) = recording_connection();

    let subscription = connection.on("ping", Arc::new(|_| Box::pin(std::future::ready(()))));
    subscription.dispose();

    assert_eq!(connection.handler_count("ping"), 0);
}

#[test]
fn subscription___drop_after_connection___is_harmless() {
    let (_, connection) = recording_connection();
    let subscription = connection.on("ping", Arc::new(|_| Box::pin(std::future::ready(()))));

    drop(connection);
    drop(subscription);
}

#[test]
fn subscription___reports_its_method() {
    let (_, connection) = recording_connection();

    let subscription = connection.on("ping", Arc::new(|_| Box::pin(std::future::ready(()))));

    assert_eq!(subscription.method(), "ping");
}

#[test]
fn to_arg___serializes_value() {
    assert_eq!(to_arg(&"hello").unwrap(), json!("hello"));
    assert_eq!(to_arg(&42u32).unwrap(), json!(42));
}

#[test]
fn from_arg___round_trips_value() {
    let value: String = from_arg(json!("hello")).unwrap();

    assert_eq!(value, "hello");
}

#[test]
fn from_arg___wrong_shape___is_serialization_error() {
    let result: Result<u32, HubError> = from_arg(json!("not a number"));

    assert!(matches!(result, Err(HubError::Serialization(_))));
}

#[tokio::test]
async fn arity_mismatch___completes_without_panicking() {
    arity_mismatch("ping", 0, 3).await;
}

#[tokio::test]
async fn invalid_payload___completes_without_panicking() {
    let err = HubError::Transport("bad payload".to_string());

    invalid_payload("ping", &err).await;
}
