//! MQTT adapter error types.

use irrigo_domain::error::IrrigoError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client refused a request (queue full or event loop gone).
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),
}

impl From<MqttError> for IrrigoError {
    fn from(err: MqttError) -> Self {
        Self::Transport(Box::new(err))
    }
}
