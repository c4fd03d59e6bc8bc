//! MQTT connection configuration.

use std::time::Duration;

use rumqttc::{AsyncClient, EventLoop, MqttOptions};
use serde::Deserialize;

/// Outgoing requests buffered between the client handles and the event loop.
const REQUEST_CAPACITY: usize = 64;

/// Configuration for the MQTT connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// MQTT broker hostname or IP address.
    pub broker_host: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Optional broker credentials; both must be set to be used.
    pub username: Option<String>,
    pub password: Option<String>,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// Pause before reconnecting after a connection error, in seconds.
    pub reconnect_delay_secs: u64,
    /// Pause between two heartbeat pings, in seconds.
    pub heartbeat_interval_secs: u64,
    /// Topic the heartbeat ping is published on.
    pub heartbeat_topic: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "irrigo".to_string(),
            username: None,
            password: None,
            keep_alive_secs: 30,
            reconnect_delay_secs: 1,
            heartbeat_interval_secs: 10,
            heartbeat_topic: "api/ping".to_string(),
        }
    }
}

impl MqttConfig {
    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    /// rumqttc options for this configuration.
    #[must_use]
    pub fn options(&self) -> MqttOptions {
        let mut options =
            MqttOptions::new(self.client_id.clone(), self.broker_host.clone(), self.broker_port);
        options.set_keep_alive(Duration::from_secs(u64::from(self.keep_alive_secs)));
        options.set_clean_session(true);
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            options.set_credentials(username.clone(), password.clone());
        }
        options
    }

    /// Create the client handle and its event loop. Nothing connects until
    /// the event loop is polled.
    #[must_use]
    pub fn connect(&self) -> (AsyncClient, EventLoop) {
        tracing::debug!(
            host = %self.broker_host,
            port = self.broker_port,
            client_id = %self.client_id,
            "creating MQTT client"
        );
        AsyncClient::new(self.options(), REQUEST_CAPACITY)
    }
}
