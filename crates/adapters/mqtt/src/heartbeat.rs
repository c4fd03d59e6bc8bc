//! Heartbeat — a periodic ping that keeps the broker link visibly alive.

use std::time::Duration;

use irrigo_app::ports::NotificationSink;

pub const HEARTBEAT_PAYLOAD: &str = "ping";

/// Publish [`HEARTBEAT_PAYLOAD`] on `topic` forever, waiting `interval`
/// after a successful ping and `error_retry` after a refused one.
pub async fn heartbeat_loop<N: NotificationSink>(
    sink: N,
    topic: String,
    interval: Duration,
    error_retry: Duration,
) {
    loop {
        match sink.publish(&topic, HEARTBEAT_PAYLOAD.to_string()).await {
            Ok(()) => tokio::time::sleep(interval).await,
            Err(err) => {
                tracing::warn!(%topic, error = %err, "unable to send heartbeat");
                tokio::time::sleep(error_retry).await;
            }
        }
    }
}
