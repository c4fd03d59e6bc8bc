//! Notification sink port — outbound messages to subscribers.

use std::future::Future;
use std::sync::Arc;

use irrigo_domain::error::IrrigoError;

/// Hands a payload to the transport for delivery on `topic`.
///
/// Fire-and-forget: an `Ok` only means the transport accepted the message.
/// Callers log failures and never retry on the sink's behalf.
pub trait NotificationSink {
    fn publish(
        &self,
        topic: &str,
        payload: String,
    ) -> impl Future<Output = Result<(), IrrigoError>> + Send;
}

impl<T: NotificationSink + Send + Sync> NotificationSink for Arc<T> {
    fn publish(
        &self,
        topic: &str,
        payload: String,
    ) -> impl Future<Output = Result<(), IrrigoError>> + Send {
        (**self).publish(topic, payload)
    }
}
