//! Program scheduler — periodically decides which stored programs start or stop.
//!
//! Each cycle fetches the full program list and evaluates every program on
//! its own: a failure while handling one program is logged and the cycle
//! moves on to the next.
//!
//! Per program, in order:
//! 1. **stop** (running programs only) once the run is past its end, or the
//!    start minute is over and its zone is no longer the open one. Stopping
//!    only clears the persisted flag; closing the zone is the auto-off
//!    timer's job.
//! 2. **start** (active, not running) on a listed weekday at exactly the
//!    start minute: close whatever is open, open the zone with a timer for
//!    the program's duration, then persist the flag.
//!
//! Start matching is minute equality, so a minute skipped by an overrunning
//! cycle is not caught up.

use std::time::Duration;

use irrigo_domain::error::IrrigoError;
use irrigo_domain::id::ProgramId;
use irrigo_domain::program::{Program, ProgramPatch};
use irrigo_domain::schedule::TimeOfDay;
use irrigo_domain::time::{LocalDateTime, seconds_since_midnight};
use tokio::time::MissedTickBehavior;

use crate::actuator::ZoneActuator;
use crate::ports::{Clock, IrrigationHardware, ProgramStore};

/// Default pause between two evaluation cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Default back-off after a cycle could not read the program list.
pub const DEFAULT_ERROR_RETRY: Duration = Duration::from_secs(2);

/// What one evaluation cycle did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub started: Vec<ProgramId>,
    pub stopped: Vec<ProgramId>,
    pub failed: Vec<ProgramId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Started,
    Stopped,
}

/// Evaluates stored programs against the clock and drives the actuator.
pub struct ProgramScheduler<S, H, C> {
    store: S,
    actuator: ZoneActuator<H>,
    clock: C,
    interval: Duration,
    error_retry: Duration,
}

impl<S, H, C> ProgramScheduler<S, H, C>
where
    S: ProgramStore + Send + Sync,
    H: IrrigationHardware,
    C: Clock,
{
    pub fn new(store: S, actuator: ZoneActuator<H>, clock: C) -> Self {
        Self {
            store,
            actuator,
            clock,
            interval: DEFAULT_INTERVAL,
            error_retry: DEFAULT_ERROR_RETRY,
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn with_error_retry(mut self, error_retry: Duration) -> Self {
        self.error_retry = error_retry;
        self
    }

    /// Run one evaluation cycle as of `now`.
    ///
    /// # Errors
    ///
    /// Returns the store error when the program list cannot be read. Errors
    /// on a single program are reported in [`CycleReport::failed`] instead.
    pub async fn evaluate(&self, now: LocalDateTime) -> Result<CycleReport, IrrigoError> {
        let programs = self.store.list_all().await?;
        let mut report = CycleReport::default();

        for program in &programs {
            match self.evaluate_program(program, now).await {
                Ok(Some(Decision::Started)) => report.started.push(program.id),
                Ok(Some(Decision::Stopped)) => report.stopped.push(program.id),
                Ok(None) => {}
                Err(err) => {
                    tracing::error!(
                        program_id = %program.id,
                        error = %err,
                        "failed to evaluate program, skipping"
                    );
                    report.failed.push(program.id);
                }
            }
        }

        Ok(report)
    }

    /// Evaluate forever, one cycle per interval.
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "program scheduler started"
        );
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.evaluate(self.clock.now()).await {
                Ok(report) => {
                    if !report.started.is_empty() || !report.stopped.is_empty() {
                        tracing::debug!(?report, "scheduler cycle done");
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "unable to read programs");
                    tokio::time::sleep(self.error_retry).await;
                }
            }
        }
    }

    async fn evaluate_program(
        &self,
        program: &Program,
        now: LocalDateTime,
    ) -> Result<Option<Decision>, IrrigoError> {
        let def = &program.definition;
        let minute = TimeOfDay::of(now);

        if def.is_running {
            if self.should_stop(program, now, minute).await {
                self.store
                    .update(program.id, ProgramPatch::running(false))
                    .await?;
                tracing::info!(program_id = %program.id, name = %def.name, "program stopped");
                return Ok(Some(Decision::Stopped));
            }
            return Ok(None);
        }

        let due = def.is_active && def.active_days.includes(now) && minute == def.start_time;
        if !due {
            return Ok(None);
        }

        if self.actuator.active_zone().await.is_some() {
            self.actuator.deactivate_all().await;
        }
        self.actuator
            .activate(def.zone, Some(i64::from(def.duration_secs)))
            .await;
        self.store
            .update(program.id, ProgramPatch::running(true))
            .await?;
        tracing::info!(
            program_id = %program.id,
            name = %def.name,
            zone = %def.zone,
            duration_secs = def.duration_secs,
            "program started"
        );
        Ok(Some(Decision::Started))
    }

    async fn should_stop(&self, program: &Program, now: LocalDateTime, minute: TimeOfDay) -> bool {
        let def = &program.definition;
        let overran = def.duration_secs > 0 && seconds_since_midnight(now) >= program.end_seconds();
        if overran {
            return true;
        }
        minute != def.start_time && self.actuator.active_zone().await != Some(def.zone)
    }
}
