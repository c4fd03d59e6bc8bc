//! Status reporter — builds and publishes [`StatusSnapshot`]s.

use std::time::Duration;

use irrigo_domain::error::IrrigoError;
use irrigo_domain::status::{Notice, StatusSnapshot};

use crate::actuator::ZoneActuator;
use crate::ports::{IrrigationHardware, NotificationSink, ProgramStore};

/// Default pause between two status emissions.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Default back-off after a failed emission.
pub const DEFAULT_ERROR_RETRY: Duration = Duration::from_secs(2);

/// Sent on the status topic in place of a snapshot that could not be built.
pub const STATUS_UNAVAILABLE: &str = "Unable to read irrigation status!";

/// Publishes the controller status on a fixed cadence and on demand.
pub struct StatusReporter<S, H, N> {
    store: S,
    actuator: ZoneActuator<H>,
    sink: N,
    topic: String,
    interval: Duration,
    error_retry: Duration,
}

impl<S, H, N> StatusReporter<S, H, N>
where
    S: ProgramStore + Send + Sync,
    H: IrrigationHardware,
    N: NotificationSink + Send + Sync,
{
    pub fn new(store: S, actuator: ZoneActuator<H>, sink: N, topic: impl Into<String>) -> Self {
        Self {
            store,
            actuator,
            sink,
            topic: topic.into(),
            interval: DEFAULT_INTERVAL,
            error_retry: DEFAULT_ERROR_RETRY,
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn with_error_retry(mut self, error_retry: Duration) -> Self {
        self.error_retry = error_retry;
        self
    }

    /// Build a fresh snapshot: active zone, every stored program and the
    /// float switch readings.
    ///
    /// # Errors
    ///
    /// Returns the store error when the program list cannot be read.
    pub async fn snapshot(&self) -> Result<StatusSnapshot, IrrigoError> {
        let programs = self.store.list_all().await?;
        Ok(StatusSnapshot {
            active_zone: self.actuator.active_zone().await,
            programs,
            float_switches: self.actuator.float_switches(),
        })
    }

    /// Build and publish one snapshot. When the snapshot cannot be built,
    /// a [`STATUS_UNAVAILABLE`] notice is published in its place.
    ///
    /// # Errors
    ///
    /// Returns the store error when the snapshot could not be built, or the
    /// transport error when the sink refused the message.
    pub async fn publish_now(&self) -> Result<(), IrrigoError> {
        let snapshot = match self.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                let notice = encode(&Notice::new(STATUS_UNAVAILABLE));
                if let Err(publish_err) = self.sink.publish(&self.topic, notice).await {
                    tracing::warn!(error = %publish_err, "unable to publish status failure notice");
                }
                return Err(err);
            }
        };
        self.sink.publish(&self.topic, encode(&snapshot)).await
    }

    /// Publish forever, backing off after a failed emission.
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            topic = %self.topic,
            "status reporter started"
        );
        loop {
            match self.publish_now().await {
                Ok(()) => tokio::time::sleep(self.interval).await,
                Err(err) => {
                    tracing::error!(error = %err, "unable to publish irrigation status");
                    tokio::time::sleep(self.error_retry).await;
                }
            }
        }
    }
}

fn encode<T: serde::Serialize>(value: &T) -> String {
    // Snapshots and notices only hold strings, numbers and booleans.
    serde_json::to_string(value).unwrap_or_default()
}
