//! Typed identifier newtypes backed by store row ids.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unique identifier for a [`Program`](crate::program::Program).
///
/// Assigned by the program store on insert and stable for the lifetime of
/// the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramId(i64);

impl ProgramId {
    /// Wrap an existing row id.
    #[must_use]
    pub fn from_row(row: i64) -> Self {
        Self(row)
    }

    /// Access the inner row id.
    #[must_use]
    pub fn as_row(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ProgramId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}
