//! # irrigo-adapter-mqtt
//!
//! MQTT transport for irrigo, built on [rumqttc](https://docs.rs/rumqttc).
//!
//! ## Responsibilities
//! - [`MqttNotificationSink`]: the `NotificationSink` port over a rumqttc client
//! - [`run_bridge`]: drive the connection, (re)subscribe on every connect and
//!   hand inbound messages to the `CommandRouter`; [`disconnect`] on shutdown
//! - [`heartbeat_loop`]: periodic keep-alive ping on its own topic
//!
//! ## Dependency rule
//! Depends on `irrigo-app` (port traits, router) and `irrigo-domain` only.

mod bridge;
mod config;
mod error;
mod heartbeat;
mod sink;

pub use bridge::{disconnect, run_bridge};
pub use config::MqttConfig;
pub use error::MqttError;
pub use heartbeat::{HEARTBEAT_PAYLOAD, heartbeat_loop};
pub use sink::MqttNotificationSink;
