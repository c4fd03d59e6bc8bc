//! Inbound bridge — drives the rumqttc event loop and feeds the router.

use std::time::Duration;

use irrigo_app::CommandRouter;
use irrigo_app::ports::{IrrigationHardware, NotificationSink, ProgramStore};
use rumqttc::{AsyncClient, Event, EventLoop, Outgoing, Packet, QoS};

/// Poll `eventloop` forever.
///
/// On every `ConnAck` the router's topics are subscribed again, since the
/// session is clean. Inbound publishes are handled one at a time, in arrival
/// order. A connection error is logged and polling resumes after
/// `reconnect_delay`, which makes rumqttc reconnect.
///
/// The event loop is borrowed so the caller can drop this future to stop
/// inbound handling and still [`disconnect`] cleanly afterwards.
pub async fn run_bridge<S, H, N>(
    eventloop: &mut EventLoop,
    client: AsyncClient,
    router: &CommandRouter<S, H, N>,
    reconnect_delay: Duration,
) where
    S: ProgramStore + Clone + Send + Sync,
    H: IrrigationHardware,
    N: NotificationSink + Clone + Send + Sync,
{
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                tracing::info!("connected to MQTT broker");
                subscribe(&client, &router.subscriptions());
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let topic = String::from_utf8_lossy(publish.topic.as_ref()).into_owned();
                tracing::debug!(%topic, bytes = publish.payload.len(), "message received");
                router.handle(&topic, &publish.payload).await;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::error!(error = %err, "MQTT connection error, reconnecting");
                tokio::time::sleep(reconnect_delay).await;
            }
        }
    }
}

/// Send a DISCONNECT and drive `eventloop` until it has gone out, the
/// connection fails, or `timeout` elapses.
pub async fn disconnect(client: &AsyncClient, eventloop: &mut EventLoop, timeout: Duration) {
    if let Err(err) = client.try_disconnect() {
        tracing::warn!(error = %err, "unable to queue MQTT disconnect");
        return;
    }
    let flush = async {
        loop {
            match eventloop.poll().await {
                Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                    tracing::info!("disconnected from MQTT broker");
                    break;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::debug!(error = %err, "MQTT connection closed during disconnect");
                    break;
                }
            }
        }
    };
    if tokio::time::timeout(timeout, flush).await.is_err() {
        tracing::warn!("MQTT disconnect timed out");
    }
}

/// Queue a subscription per topic without waiting: this runs on the task
/// that drains the request queue.
fn subscribe(client: &AsyncClient, topics: &[&str]) {
    for topic in topics {
        match client.try_subscribe(*topic, QoS::AtLeastOnce) {
            Ok(()) => tracing::info!(topic, "subscribed"),
            Err(err) => tracing::error!(topic, error = %err, "unable to subscribe"),
        }
    }
}
