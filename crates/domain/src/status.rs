//! Status snapshot and user-facing notices published to subscribers.

use serde::{Deserialize, Serialize};

use crate::program::Program;
use crate::zone::ZoneId;

/// Readings of the three float switches in the supply tank.
///
/// Status only; they never feed back into actuation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatSwitches {
    pub float_switch_1: bool,
    pub float_switch_2: bool,
    pub float_switch_3: bool,
}

/// Everything a dashboard needs to render the controller, built fresh for
/// each emission and discarded after sending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub active_zone: Option<ZoneId>,
    pub programs: Vec<Program>,
    pub float_switches: FloatSwitches,
}

/// A short human-readable message, sent as `{"data": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub data: String,
}

impl Notice {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            data: message.into(),
        }
    }
}
