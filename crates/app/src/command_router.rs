//! Command router — turns inbound bus messages into actuator and store calls.
//!
//! Two inbound topics:
//! - zone: `{"zone": "zone_3", "time": 120}` toggles a zone
//! - program: `{"action": ..., "id": ..., "program": {...}}` creates, edits
//!   or deletes a program
//!
//! Rejected program commands are answered with `{"data": "<reason>"}` on the
//! notification topic and change nothing. A successful mutation is answered
//! the same way and followed by a fresh status snapshot.

use irrigo_domain::command::{ProgramCommand, ZoneCommand};
use irrigo_domain::error::IrrigoError;
use irrigo_domain::id::ProgramId;
use irrigo_domain::status::Notice;
use serde_json::Value;

use crate::actuator::ZoneActuator;
use crate::ports::{IrrigationHardware, NotificationSink, ProgramStore};
use crate::status_reporter::StatusReporter;
use crate::topics::Topics;

pub const PROGRAM_CREATED: &str = "Program created successfully!";
pub const PROGRAM_UPDATED: &str = "Program updated successfully!";
pub const PROGRAM_DELETED: &str = "Program deleted successfully!";
pub const CREATE_FAILED: &str = "Unable to create program!";
pub const UPDATE_FAILED: &str = "Unable to update program!";
pub const DELETE_FAILED: &str = "Unable to delete program!";

/// Dispatches inbound messages by topic.
pub struct CommandRouter<S, H, N> {
    store: S,
    actuator: ZoneActuator<H>,
    sink: N,
    topics: Topics,
    reporter: StatusReporter<S, H, N>,
}

impl<S, H, N> CommandRouter<S, H, N>
where
    S: ProgramStore + Clone + Send + Sync,
    H: IrrigationHardware,
    N: NotificationSink + Clone + Send + Sync,
{
    pub fn new(store: S, actuator: ZoneActuator<H>, sink: N, topics: Topics) -> Self {
        let reporter = StatusReporter::new(
            store.clone(),
            actuator.clone(),
            sink.clone(),
            topics.status.clone(),
        );
        Self {
            store,
            actuator,
            sink,
            topics,
            reporter,
        }
    }

    /// Inbound topics this router handles.
    #[must_use]
    pub fn subscriptions(&self) -> [&str; 2] {
        [self.topics.zone.as_str(), self.topics.program.as_str()]
    }

    /// Handle one inbound message. Never fails: every problem is logged, and
    /// program command rejections are also reported on the notification topic.
    pub async fn handle(&self, topic: &str, payload: &[u8]) {
        if topic == self.topics.zone {
            self.handle_zone(payload).await;
        } else if topic == self.topics.program {
            self.handle_program(payload).await;
        } else {
            tracing::debug!(topic, "ignoring message on unhandled topic");
        }
    }

    async fn handle_zone(&self, payload: &[u8]) {
        let Some(value) = parse_json(&self.topics.zone, payload) else {
            return;
        };
        match ZoneCommand::from_json(&value) {
            Ok(command) => {
                tracing::info!(
                    zone = %command.zone,
                    duration_secs = ?command.duration_secs,
                    "zone toggle requested"
                );
                self.actuator
                    .toggle(command.zone, command.duration_secs)
                    .await;
            }
            Err(err) => tracing::warn!(error = %err, %value, "ignoring zone command"),
        }
    }

    async fn handle_program(&self, payload: &[u8]) {
        let Some(value) = parse_json(&self.topics.program, payload) else {
            return;
        };
        let command = match ProgramCommand::from_json(&value) {
            Ok(command) => command,
            Err(err) => {
                tracing::warn!(error = %err, "rejected program command");
                self.notify(&err.to_string()).await;
                return;
            }
        };

        let (result, done, failed) = match command {
            ProgramCommand::Create(program) => (
                self.store.insert(program).await.map(|program| program.id),
                PROGRAM_CREATED,
                CREATE_FAILED,
            ),
            ProgramCommand::Edit { id, patch } => (
                self.store.update(id, patch).await.map(|program| program.id),
                PROGRAM_UPDATED,
                UPDATE_FAILED,
            ),
            ProgramCommand::Delete { id } => (
                self.store.delete(id).await.map(|()| id),
                PROGRAM_DELETED,
                DELETE_FAILED,
            ),
        };

        self.finish(result, done, failed).await;
    }

    async fn finish(&self, result: Result<ProgramId, IrrigoError>, done: &str, failed: &str) {
        match result {
            Ok(id) => {
                tracing::info!(program_id = %id, "{done}");
                self.notify(done).await;
                if let Err(err) = self.reporter.publish_now().await {
                    tracing::warn!(error = %err, "unable to publish status after program change");
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "{failed}");
                self.notify(failed).await;
            }
        }
    }

    async fn notify(&self, message: &str) {
        let payload = serde_json::to_string(&Notice::new(message)).unwrap_or_default();
        if let Err(err) = self.sink.publish(&self.topics.notification, payload).await {
            tracing::warn!(error = %err, notice = message, "unable to publish notification");
        }
    }
}

fn parse_json(topic: &str, payload: &[u8]) -> Option<Value> {
    match serde_json::from_slice(payload) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(topic, error = %err, "ignoring malformed message");
            None
        }
    }
}
