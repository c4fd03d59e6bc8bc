//! Virtual board — in-memory outputs with a transition journal.

use std::collections::{BTreeSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use irrigo_app::ports::IrrigationHardware;
use irrigo_domain::status::FloatSwitches;
use irrigo_domain::zone::ZoneId;

/// One output write, in the order it reached the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEvent {
    MainValve(bool),
    Zone(ZoneId, bool),
}

/// Selects one of the three tank float switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatSwitch {
    One,
    Two,
    Three,
}

/// Journal entries kept before the oldest are dropped.
pub const JOURNAL_CAPACITY: usize = 1024;

#[derive(Debug, Default)]
struct Outputs {
    main_valve: bool,
    zones: BTreeSet<ZoneId>,
    journal: VecDeque<OutputEvent>,
}

impl Outputs {
    fn record(&mut self, event: OutputEvent) {
        if self.journal.len() == JOURNAL_CAPACITY {
            self.journal.pop_front();
        }
        self.journal.push_back(event);
    }
}

/// A simulated controller board: eight zone outputs, the main valve and
/// three float switches.
///
/// Writes that do not change an output are still journaled, so the journal
/// mirrors exactly what the actuator asked for. Only the last
/// [`JOURNAL_CAPACITY`] writes are kept.
#[derive(Debug, Default)]
pub struct VirtualBoard {
    outputs: Mutex<Outputs>,
    switches: Mutex<FloatSwitches>,
}

impl VirtualBoard {
    /// Whether the main valve is energized.
    #[must_use]
    pub fn main_valve(&self) -> bool {
        self.lock_outputs().main_valve
    }

    /// Zones currently energized, in zone order.
    #[must_use]
    pub fn energized_zones(&self) -> Vec<ZoneId> {
        self.lock_outputs().zones.iter().copied().collect()
    }

    /// Journaled output writes, oldest first.
    #[must_use]
    pub fn journal(&self) -> Vec<OutputEvent> {
        self.lock_outputs().journal.iter().copied().collect()
    }

    /// Return the journal and start a fresh one.
    pub fn drain_journal(&self) -> Vec<OutputEvent> {
        self.lock_outputs().journal.drain(..).collect()
    }

    /// Set one float switch reading.
    pub fn set_float_switch(&self, switch: FloatSwitch, closed: bool) {
        let mut switches = self
            .switches
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match switch {
            FloatSwitch::One => switches.float_switch_1 = closed,
            FloatSwitch::Two => switches.float_switch_2 = closed,
            FloatSwitch::Three => switches.float_switch_3 = closed,
        }
        tracing::debug!(?switch, closed, "float switch changed");
    }

    fn lock_outputs(&self) -> MutexGuard<'_, Outputs> {
        self.outputs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IrrigationHardware for VirtualBoard {
    fn set_main_valve(&self, on: bool) {
        let mut outputs = self.lock_outputs();
        outputs.main_valve = on;
        outputs.record(OutputEvent::MainValve(on));
        tracing::debug!(on, "main valve");
    }

    fn set_zone(&self, zone: ZoneId, on: bool) {
        let mut outputs = self.lock_outputs();
        if on {
            outputs.zones.insert(zone);
        } else {
            outputs.zones.remove(&zone);
        }
        outputs.record(OutputEvent::Zone(zone, on));
        tracing::debug!(%zone, on, "zone output");
    }

    fn float_switches(&self) -> FloatSwitches {
        self.switches
            .lock()
            .map_or_else(|poisoned| *poisoned.into_inner(), |g| *g)
    }
}
