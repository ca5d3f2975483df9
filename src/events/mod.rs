//! Live new-order notifications over the backend's socket.io endpoint.

pub mod event;
pub mod listener;

pub use event::{NewOrderEvent, NEW_ORDER_EVENT};
pub use listener::OrderFeed;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::api::OrderApi;
use crate::error::AdminResult;
use crate::services::OrderBoard;

/// Re-reads `board` after every new-order event until `shutdown` fires or
/// the feed goes away. `on_event` sees each event with the refresh result.
pub async fn refresh_on_new_orders<A, F>(
    board: &OrderBoard<A>,
    mut events: broadcast::Receiver<NewOrderEvent>,
    shutdown: CancellationToken,
    mut on_event: F,
) where
    A: OrderApi + ?Sized,
    F: FnMut(&NewOrderEvent, AdminResult<usize>),
{
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            received = events.recv() => match received {
                Ok(event) => {
                    let result = board.refresh().await;
                    on_event(&event, result);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Missed {} new-order events, refreshing once", n);
                    if let Err(e) = board.refresh().await {
                        tracing::error!("Refresh after missed events failed: {}", e);
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}
