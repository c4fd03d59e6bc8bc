//! Zone actuator — at most one zone open, always behind the main valve.
//!
//! Every operation runs as one critical section on the actuator's lock,
//! including the settle delays between valve and zone writes. A command, a
//! scheduler tick and a timer wake-up therefore never interleave their
//! output writes.
//!
//! Output ordering:
//! - open: main valve on, settle, zone on
//! - close: zone off, settle, main valve off

mod timer;

use std::sync::Arc;
use std::time::Duration;

use irrigo_domain::status::FloatSwitches;
use irrigo_domain::zone::ZoneId;
use tokio::sync::{Mutex, MutexGuard};

use crate::ports::IrrigationHardware;

pub use timer::{TimerPhase, TimerTicket};
use timer::AutoOffTimer;

/// Pause between a main valve write and a zone write.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Default)]
struct ActuatorState {
    active_zone: Option<ZoneId>,
    timer: AutoOffTimer,
}

struct Shared<H> {
    hardware: H,
    settle_delay: Duration,
    state: Mutex<ActuatorState>,
}

/// Owns the zone outputs and the main valve.
///
/// Cheap to clone; all clones drive the same hardware and share one lock.
pub struct ZoneActuator<H> {
    shared: Arc<Shared<H>>,
}

impl<H> Clone for ZoneActuator<H> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<H: IrrigationHardware> ZoneActuator<H> {
    /// Wrap `hardware`. Nothing is written until the first operation; call
    /// [`deactivate_all`](Self::deactivate_all) to reach a known state.
    #[must_use]
    pub fn new(hardware: H, settle_delay: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                hardware,
                settle_delay,
                state: Mutex::new(ActuatorState::default()),
            }),
        }
    }

    #[must_use]
    pub fn hardware(&self) -> &H {
        &self.shared.hardware
    }

    /// Current float switch readings, straight from the board.
    #[must_use]
    pub fn float_switches(&self) -> FloatSwitches {
        self.shared.hardware.float_switches()
    }

    /// The zone currently energized, if any.
    pub async fn active_zone(&self) -> Option<ZoneId> {
        self.shared.state.lock().await.active_zone
    }

    pub async fn timer_phase(&self) -> TimerPhase {
        self.shared.state.lock().await.timer.phase()
    }

    /// Open `zone`. With a positive `duration_secs`, also start the
    /// auto-deactivation timer for it.
    ///
    /// A different open zone is closed first. Activating the zone that is
    /// already open writes nothing.
    pub async fn activate(&self, zone: ZoneId, duration_secs: Option<i64>) {
        let mut state = self.lock().await;
        self.activate_locked(&mut state, zone, duration_secs).await;
    }

    /// Close `zone` if it is the active one; otherwise do nothing.
    pub async fn deactivate(&self, zone: ZoneId) {
        let mut state = self.lock().await;
        self.deactivate_locked(&mut state, zone).await;
    }

    /// Cancel any timer, drive every zone off, then release the main valve.
    pub async fn deactivate_all(&self) {
        let mut state = self.lock().await;
        state.timer.cancel();
        for zone in ZoneId::ALL {
            self.shared.hardware.set_zone(zone, false);
        }
        tokio::time::sleep(self.shared.settle_delay).await;
        self.shared.hardware.set_main_valve(false);
        state.active_zone = None;
        tracing::info!("all zones off");
    }

    /// User-facing switch: a pending timer is always cancelled first, then
    /// `zone` is closed if it was open, otherwise opened (closing any other
    /// zone before).
    pub async fn toggle(&self, zone: ZoneId, duration_secs: Option<i64>) {
        let mut state = self.lock().await;
        if state.timer.cancel() {
            tracing::debug!(%zone, "toggle cancelled pending auto-off timer");
        }
        let active_zone = state.active_zone;
        match active_zone {
            Some(active) if active == zone => {
                self.close(&mut state, zone).await;
            }
            Some(active) => {
                self.close(&mut state, active).await;
                self.activate_locked(&mut state, zone, duration_secs).await;
            }
            None => {
                self.activate_locked(&mut state, zone, duration_secs).await;
            }
        }
    }

    /// Cancel the pending auto-deactivation, leaving its zone open.
    ///
    /// Returns `false` when no timer was running.
    pub async fn cancel_timer(&self) -> bool {
        let cancelled = self.lock().await.timer.cancel();
        if cancelled {
            tracing::info!("auto-off timer cancelled");
        }
        cancelled
    }

    async fn lock(&self) -> MutexGuard<'_, ActuatorState> {
        self.shared.state.lock().await
    }

    async fn activate_locked(
        &self,
        state: &mut ActuatorState,
        zone: ZoneId,
        duration_secs: Option<i64>,
    ) {
        let Some(secs) = duration_secs.filter(|secs| *secs > 0) else {
            self.open(state, zone).await;
            return;
        };

        if let Some(previous) = state.timer.running_zone() {
            tracing::warn!(%previous, %zone, "auto-off timer superseded by a new one");
        }
        self.open(state, zone).await;

        let run_for = Duration::from_secs(secs.unsigned_abs());
        let actuator = self.clone();
        state.timer.start(zone, move |ticket| {
            tokio::spawn(async move {
                tokio::time::sleep(run_for).await;
                actuator.expire(ticket).await;
            })
        });
        tracing::info!(%zone, duration_secs = secs, "auto-off timer started");
    }

    async fn deactivate_locked(&self, state: &mut ActuatorState, zone: ZoneId) {
        if state.active_zone == Some(zone) {
            self.close(state, zone).await;
        } else {
            tracing::debug!(%zone, "zone not active, nothing to close");
        }
    }

    /// Deliver a timer wake-up. Stale tickets are dropped.
    async fn expire(&self, ticket: TimerTicket) {
        let mut state = self.lock().await;
        if state.timer.expire(ticket) {
            tracing::info!(zone = %ticket.zone(), "auto-off timer expired");
            self.deactivate_locked(&mut state, ticket.zone()).await;
        } else {
            tracing::debug!(zone = %ticket.zone(), "stale auto-off wake-up ignored");
        }
    }

    async fn open(&self, state: &mut ActuatorState, zone: ZoneId) {
        match state.active_zone {
            Some(active) if active == zone => {
                tracing::debug!(%zone, "zone already open");
                return;
            }
            Some(active) => {
                tracing::info!(%active, %zone, "closing open zone before opening another");
                if state.timer.running_zone() == Some(active) {
                    state.timer.cancel();
                }
                self.close(state, active).await;
            }
            None => {}
        }
        self.shared.hardware.set_main_valve(true);
        tokio::time::sleep(self.shared.settle_delay).await;
        self.shared.hardware.set_zone(zone, true);
        state.active_zone = Some(zone);
        tracing::info!(%zone, "zone on");
    }

    async fn close(&self, state: &mut ActuatorState, zone: ZoneId) {
        self.shared.hardware.set_zone(zone, false);
        tokio::time::sleep(self.shared.settle_delay).await;
        self.shared.hardware.set_main_valve(false);
        state.active_zone = None;
        tracing::info!(%zone, "zone off");
    }
}
