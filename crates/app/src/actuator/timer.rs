//! Auto-deactivation timer — the single delayed "close this zone" slot.
//!
//! ```text
//! Idle ──start──▶ Running ──wake-up──▶ Expired
//!                    │
//!                    └──cancel───────▶ Cancelled
//! ```
//!
//! The timer itself never touches hardware. It only decides, under the
//! actuator's lock, whether a wake-up is still the live one. Cancel and
//! expiry both go through that lock, so exactly one of them wins.

use irrigo_domain::zone::ZoneId;
use tokio::task::JoinHandle;

/// Observable phase of the auto-deactivation slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    /// No timer has been started yet.
    Idle,
    /// A wake-up is scheduled that will close `zone`.
    Running { zone: ZoneId },
    /// The last timer fired and closed its zone.
    Expired,
    /// The last timer was cancelled before firing; its zone was left open.
    Cancelled,
}

/// Identifies one started timer. A wake-up carrying a ticket that is no
/// longer the running one is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTicket {
    generation: u64,
    zone: ZoneId,
}

impl TimerTicket {
    #[must_use]
    pub fn zone(self) -> ZoneId {
        self.zone
    }
}

#[derive(Debug)]
pub(crate) struct AutoOffTimer {
    phase: TimerPhase,
    generation: u64,
    wake: Option<JoinHandle<()>>,
}

impl Default for AutoOffTimer {
    fn default() -> Self {
        Self {
            phase: TimerPhase::Idle,
            generation: 0,
            wake: None,
        }
    }
}

impl AutoOffTimer {
    pub(crate) fn phase(&self) -> TimerPhase {
        self.phase
    }

    /// Zone of the running timer, if any.
    pub(crate) fn running_zone(&self) -> Option<ZoneId> {
        match self.phase {
            TimerPhase::Running { zone } => Some(zone),
            _ => None,
        }
    }

    /// Start a timer for `zone`. `schedule` receives the new ticket and
    /// returns the task that will deliver the wake-up.
    ///
    /// A timer that is still running is cancelled first, so the slot never
    /// holds two.
    pub(crate) fn start(
        &mut self,
        zone: ZoneId,
        schedule: impl FnOnce(TimerTicket) -> JoinHandle<()>,
    ) -> TimerTicket {
        self.cancel();
        self.generation = self.generation.wrapping_add(1);
        let ticket = TimerTicket {
            generation: self.generation,
            zone,
        };
        self.wake = Some(schedule(ticket));
        self.phase = TimerPhase::Running { zone };
        ticket
    }

    /// Cancel the running timer. Returns `false` (and does nothing) when no
    /// timer is running.
    pub(crate) fn cancel(&mut self) -> bool {
        if !matches!(self.phase, TimerPhase::Running { .. }) {
            return false;
        }
        if let Some(wake) = self.wake.take() {
            wake.abort();
        }
        self.phase = TimerPhase::Cancelled;
        true
    }

    /// Resolve a wake-up. Returns `true` only when `ticket` belongs to the
    /// running timer, which then becomes [`TimerPhase::Expired`].
    pub(crate) fn expire(&mut self, ticket: TimerTicket) -> bool {
        let live = matches!(self.phase, TimerPhase::Running { .. })
            && self.generation == ticket.generation;
        if live {
            // Called from inside the wake-up task; dropping the handle detaches it.
            self.wake = None;
            self.phase = TimerPhase::Expired;
        }
        live
    }
}
