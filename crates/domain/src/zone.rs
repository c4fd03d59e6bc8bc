//! Zone — one independently controllable irrigation output line.
//!
//! The zone set is fixed by the wiring of the controller board: eight zone
//! outputs sharing one upstream main valve.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Identifier of one of the eight zone outputs (`zone_1` … `zone_8`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ZoneId {
    Zone1,
    Zone2,
    Zone3,
    Zone4,
    Zone5,
    Zone6,
    Zone7,
    Zone8,
}

impl ZoneId {
    /// Every zone, in output order.
    pub const ALL: [Self; 8] = [
        Self::Zone1,
        Self::Zone2,
        Self::Zone3,
        Self::Zone4,
        Self::Zone5,
        Self::Zone6,
        Self::Zone7,
        Self::Zone8,
    ];

    /// One-based output number as printed on the board.
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::Zone1 => 1,
            Self::Zone2 => 2,
            Self::Zone3 => 3,
            Self::Zone4 => 4,
            Self::Zone5 => 5,
            Self::Zone6 => 6,
            Self::Zone7 => 7,
            Self::Zone8 => 8,
        }
    }

    /// Look a zone up by its one-based output number.
    #[must_use]
    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|zone| zone.number() == number)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone_{}", self.number())
    }
}

impl FromStr for ZoneId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("zone_")
            .filter(|digits| digits.len() == 1)
            .and_then(|digits| digits.parse::<u8>().ok())
            .and_then(Self::from_number)
            .ok_or(ValidationError::InvalidZone)
    }
}

impl TryFrom<String> for ZoneId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ZoneId> for String {
    fn from(zone: ZoneId) -> Self {
        zone.to_string()
    }
}
