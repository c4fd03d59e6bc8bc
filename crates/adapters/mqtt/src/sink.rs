//! [`NotificationSink`] over a rumqttc client.

use std::future::Future;

use irrigo_app::ports::NotificationSink;
use irrigo_domain::error::IrrigoError;
use rumqttc::{AsyncClient, QoS};

use crate::error::MqttError;

/// Publishes notifications through the client's request queue.
///
/// Publishing never waits: when the queue is full or the event loop is
/// gone, the message is refused with a transport error.
#[derive(Clone)]
pub struct MqttNotificationSink {
    client: AsyncClient,
}

impl MqttNotificationSink {
    #[must_use]
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }
}

impl NotificationSink for MqttNotificationSink {
    fn publish(
        &self,
        topic: &str,
        payload: String,
    ) -> impl Future<Output = Result<(), IrrigoError>> + Send {
        let result = self
            .client
            .try_publish(topic, QoS::AtLeastOnce, false, payload)
            .map_err(|err| MqttError::Client(err).into());
        if let Err(err) = &result {
            tracing::debug!(topic, error = %err, "MQTT publish refused");
        }
        async move { result }
    }
}
