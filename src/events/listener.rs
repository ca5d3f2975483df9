use futures::FutureExt;
use rust_socketio::asynchronous::{Client, ClientBuilder};
use rust_socketio::Payload;
use tokio::sync::broadcast;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::{AdminError, AdminResult};
use crate::events::event::{NewOrderEvent, NEW_ORDER_EVENT};

/// First reconnect delay
const INITIAL_RECONNECT_DELAY_MS: u64 = 1000;
/// Max reconnect delay
const MAX_RECONNECT_DELAY_MS: u64 = 5000;
const CHANNEL_CAPACITY: usize = 64;

/// Long-lived subscription to the backend's order feed. Every `new-order`
/// event is fanned out to all [`subscribe`](OrderFeed::subscribe)rs.
pub struct OrderFeed {
    url: String,
    cookie: Option<String>,
    tx: broadcast::Sender<NewOrderEvent>,
    shutdown: CancellationToken,
}

impl OrderFeed {
    pub fn new(url: impl Into<String>, cookie: Option<String>, shutdown: CancellationToken) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        OrderFeed {
            url: url.into(),
            cookie,
            tx,
            shutdown,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NewOrderEvent> {
        self.tx.subscribe()
    }

    /// Connects and listens until the shutdown token fires. The first
    /// connect is retried here; once connected the client reconnects on its
    /// own with the same backoff.
    pub async fn run(self) {
        tracing::info!("Order feed started: {}", self.url);
        let mut reconnect_delay = Duration::from_millis(INITIAL_RECONNECT_DELAY_MS);

        let client = loop {
            if self.shutdown.is_cancelled() {
                tracing::info!("Order feed stopped");
                return;
            }

            let attempt = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Order feed stopped");
                    return;
                }
                attempt = self.connect() => attempt,
            };
            match attempt {
                Ok(client) => break client,
                Err(e) => tracing::warn!(
                    delay_ms = reconnect_delay.as_millis() as u64,
                    "Order feed connect failed: {}",
                    e
                ),
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Order feed stopped");
                    return;
                }
                _ = tokio::time::sleep(reconnect_delay) => {},
            }
            reconnect_delay =
                (reconnect_delay * 2).min(Duration::from_millis(MAX_RECONNECT_DELAY_MS));
        };

        tracing::info!("Order feed connected");
        self.shutdown.cancelled().await;
        if let Err(e) = client.disconnect().await {
            tracing::debug!("Order feed disconnect: {}", e);
        }
        tracing::info!("Order feed stopped");
    }

    async fn connect(&self) -> AdminResult<Client> {
        let tx = self.tx.clone();
        let mut builder = ClientBuilder::new(self.url.as_str())
            .reconnect(true)
            .reconnect_on_disconnect(true)
            .reconnect_delay(INITIAL_RECONNECT_DELAY_MS, MAX_RECONNECT_DELAY_MS)
            .on(NEW_ORDER_EVENT, move |payload: Payload, _: Client| {
                publish(&tx, &payload);
                async {}.boxed()
            })
            .on("error", |payload: Payload, _: Client| {
                async move { tracing::warn!("Order feed error: {:?}", payload) }.boxed()
            });
        if let Some(cookie) = self.cookie.as_deref() {
            builder = builder.opening_header("Cookie", cookie.to_string());
        }

        builder
            .connect()
            .await
            .map_err(|e| AdminError::Socket(e.to_string()))
    }
}

/// Fans one `new-order` emit out to subscribers. Returns whether it carried
/// an order.
pub(crate) fn publish(tx: &broadcast::Sender<NewOrderEvent>, payload: &Payload) -> bool {
    match NewOrderEvent::from_payload(payload) {
        Some(event) => {
            tracing::info!("{}", event.headline());
            // No subscribers is not an error.
            let _ = tx.send(event);
            true
        }
        None => false,
    }
}
