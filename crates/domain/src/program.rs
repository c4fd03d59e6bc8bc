//! Program — a persisted schedule rule that opens one zone on given weekdays
//! at a given minute for a bounded duration.

use serde::{Deserialize, Serialize};

use crate::error::{IrrigoError, ValidationError};
use crate::id::ProgramId;
use crate::schedule::{TimeOfDay, WeekdaySet};
use crate::zone::ZoneId;

/// Longest run a program may request, in seconds.
pub const MAX_DURATION_SECS: u32 = 3600;

/// A stored program, as read back from the program store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    #[serde(flatten)]
    pub definition: NewProgram,
}

impl Program {
    /// Apply the fields present in `patch`, leaving the others untouched.
    pub fn apply(&mut self, patch: &ProgramPatch) {
        let def = &mut self.definition;
        if let Some(name) = &patch.name {
            def.name.clone_from(name);
        }
        if let Some(zone) = patch.zone {
            def.zone = zone;
        }
        if let Some(days) = &patch.active_days {
            def.active_days.clone_from(days);
        }
        if let Some(start) = patch.start_time {
            def.start_time = start;
        }
        if let Some(duration) = patch.duration_secs {
            def.duration_secs = duration;
        }
        if let Some(active) = patch.is_active {
            def.is_active = active;
        }
        if let Some(running) = patch.is_running {
            def.is_running = running;
        }
    }

    /// Local seconds-since-midnight at which the run is due to end.
    #[must_use]
    pub fn end_seconds(&self) -> u32 {
        self.definition.start_time.seconds_from_midnight() + self.definition.duration_secs
    }
}

/// Every field of a program except its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProgram {
    pub name: String,
    pub zone: ZoneId,
    #[serde(rename = "active_day")]
    pub active_days: WeekdaySet,
    pub start_time: TimeOfDay,
    #[serde(rename = "duration")]
    pub duration_secs: u32,
    pub is_active: bool,
    pub is_running: bool,
}

impl NewProgram {
    /// Create a builder for constructing a [`NewProgram`].
    #[must_use]
    pub fn builder() -> NewProgramBuilder {
        NewProgramBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`IrrigoError::Validation`] when:
    /// - `name` is empty ([`ValidationError::InvalidName`])
    /// - `duration_secs` exceeds [`MAX_DURATION_SECS`] ([`ValidationError::InvalidDuration`])
    pub fn validate(&self) -> Result<(), IrrigoError> {
        if self.name.is_empty() {
            return Err(ValidationError::InvalidName.into());
        }
        if self.duration_secs > MAX_DURATION_SECS {
            return Err(ValidationError::InvalidDuration.into());
        }
        Ok(())
    }

    /// Attach the id the store assigned on insert.
    #[must_use]
    pub fn with_id(self, id: ProgramId) -> Program {
        Program {
            id,
            definition: self,
        }
    }
}

/// Step-by-step builder for [`NewProgram`].
#[derive(Debug, Default)]
pub struct NewProgramBuilder {
    name: Option<String>,
    zone: Option<ZoneId>,
    active_days: Option<WeekdaySet>,
    start_time: Option<TimeOfDay>,
    duration_secs: u32,
    is_active: Option<bool>,
    is_running: bool,
}

impl NewProgramBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn zone(mut self, zone: ZoneId) -> Self {
        self.zone = Some(zone);
        self
    }

    #[must_use]
    pub fn active_days(mut self, days: WeekdaySet) -> Self {
        self.active_days = Some(days);
        self
    }

    #[must_use]
    pub fn start_time(mut self, start: TimeOfDay) -> Self {
        self.start_time = Some(start);
        self
    }

    #[must_use]
    pub fn duration_secs(mut self, secs: u32) -> Self {
        self.duration_secs = secs;
        self
    }

    #[must_use]
    pub fn is_active(mut self, active: bool) -> Self {
        self.is_active = Some(active);
        self
    }

    #[must_use]
    pub fn is_running(mut self, running: bool) -> Self {
        self.is_running = running;
        self
    }

    /// Consume the builder, validate, and return a [`NewProgram`].
    ///
    /// Unset fields default to an active program on `zone_1`, every day,
    /// starting at midnight.
    ///
    /// # Errors
    ///
    /// Returns [`IrrigoError::Validation`] if `name` is missing or empty, or
    /// the duration is out of range.
    pub fn build(self) -> Result<NewProgram, IrrigoError> {
        let every_day = WeekdaySet::from_days(0..=6)?;
        let program = NewProgram {
            name: self.name.unwrap_or_default(),
            zone: self.zone.unwrap_or(ZoneId::Zone1),
            active_days: self.active_days.unwrap_or(every_day),
            start_time: self.start_time.unwrap_or(TimeOfDay::new(0, 0)?),
            duration_secs: self.duration_secs,
            is_active: self.is_active.unwrap_or(true),
            is_running: self.is_running,
        };
        program.validate()?;
        Ok(program)
    }
}

/// A partial update: only the fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramPatch {
    pub name: Option<String>,
    pub zone: Option<ZoneId>,
    pub active_days: Option<WeekdaySet>,
    pub start_time: Option<TimeOfDay>,
    pub duration_secs: Option<u32>,
    pub is_active: Option<bool>,
    pub is_running: Option<bool>,
}

impl ProgramPatch {
    /// A patch that only flips the running flag.
    #[must_use]
    pub fn running(is_running: bool) -> Self {
        Self {
            is_running: Some(is_running),
            ..Self::default()
        }
    }

    /// Whether the patch would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
