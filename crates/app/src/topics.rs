//! Topic names used for inbound commands and outbound notifications.

use serde::Deserialize;

/// Message-bus topics the controller listens and speaks on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Topics {
    /// Inbound manual zone toggles.
    pub zone: String,
    /// Inbound program create/edit/delete requests.
    pub program: String,
    /// Outbound user-facing notices (`{"data": "..."}`).
    pub notification: String,
    /// Outbound status snapshots.
    pub status: String,
}

impl Default for Topics {
    fn default() -> Self {
        Self {
            zone: "api/irrigation/zone".to_string(),
            program: "api/irrigation/program".to_string(),
            notification: "api/notification/irrigation".to_string(),
            status: "api/notification/irrigation/status".to_string(),
        }
    }
}
