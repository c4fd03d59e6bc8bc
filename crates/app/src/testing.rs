//! In-memory port implementations shared by the use-case tests.

use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use irrigo_domain::error::{IrrigoError, NotFoundError};
use irrigo_domain::id::ProgramId;
use irrigo_domain::program::{NewProgram, Program, ProgramPatch};
use irrigo_domain::status::FloatSwitches;
use irrigo_domain::time::LocalDateTime;
use irrigo_domain::zone::ZoneId;

use crate::ports::{Clock, IrrigationHardware, NotificationSink, ProgramStore};

// ── Program store ──────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct InMemoryProgramStore {
    programs: Mutex<BTreeMap<i64, Program>>,
    next_id: Mutex<i64>,
    broken: Mutex<HashSet<ProgramId>>,
    unavailable: AtomicBool,
}

fn unavailable() -> IrrigoError {
    IrrigoError::Storage("store unavailable".into())
}

impl InMemoryProgramStore {
    pub(crate) fn with(programs: Vec<NewProgram>) -> Self {
        let store = Self::default();
        for program in programs {
            store.insert_now(program);
        }
        store
    }

    fn insert_now(&self, program: NewProgram) -> Program {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let program = program.with_id(ProgramId::from_row(*next_id));
        self.programs
            .lock()
            .unwrap()
            .insert(*next_id, program.clone());
        program
    }

    pub(crate) fn snapshot(&self) -> Vec<Program> {
        self.programs.lock().unwrap().values().cloned().collect()
    }

    pub(crate) fn program(&self, id: i64) -> Program {
        self.programs.lock().unwrap()[&id].clone()
    }

    /// Make every update of `id` fail.
    pub(crate) fn break_program(&self, id: i64) {
        self.broken.lock().unwrap().insert(ProgramId::from_row(id));
    }

    /// Make every call fail.
    pub(crate) fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), IrrigoError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

fn not_found(id: ProgramId) -> IrrigoError {
    NotFoundError {
        entity: "Program",
        id: id.to_string(),
    }
    .into()
}

impl ProgramStore for InMemoryProgramStore {
    fn list_all(&self) -> impl Future<Output = Result<Vec<Program>, IrrigoError>> + Send {
        let result = self.check().map(|()| self.snapshot());
        async { result }
    }

    fn get(
        &self,
        id: ProgramId,
    ) -> impl Future<Output = Result<Option<Program>, IrrigoError>> + Send {
        let result = self
            .check()
            .map(|()| self.programs.lock().unwrap().get(&id.as_row()).cloned());
        async { result }
    }

    fn insert(
        &self,
        program: NewProgram,
    ) -> impl Future<Output = Result<Program, IrrigoError>> + Send {
        let result = self.check().map(|()| self.insert_now(program));
        async { result }
    }

    fn update(
        &self,
        id: ProgramId,
        patch: ProgramPatch,
    ) -> impl Future<Output = Result<Program, IrrigoError>> + Send {
        let result = self.check().and_then(|()| {
            if self.broken.lock().unwrap().contains(&id) {
                return Err(unavailable());
            }
            let mut programs = self.programs.lock().unwrap();
            let program = programs.get_mut(&id.as_row()).ok_or_else(|| not_found(id))?;
            program.apply(&patch);
            Ok(program.clone())
        });
        async { result }
    }

    fn delete(&self, id: ProgramId) -> impl Future<Output = Result<(), IrrigoError>> + Send {
        let result = self.check().and_then(|()| {
            self.programs
                .lock()
                .unwrap()
                .remove(&id.as_row())
                .map(|_| ())
                .ok_or_else(|| not_found(id))
        });
        async { result }
    }
}

// ── Notification sink ──────────────────────────────────────────

#[derive(Default)]
pub(crate) struct RecordingSink {
    published: Mutex<Vec<(String, String)>>,
    refusing: AtomicBool,
}

impl RecordingSink {
    pub(crate) fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }

    /// Payloads sent on `topic`, parsed as JSON.
    pub(crate) fn on(&self, topic: &str) -> Vec<serde_json::Value> {
        self.published()
            .into_iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, payload)| serde_json::from_str(&payload).unwrap())
            .collect()
    }

    pub(crate) fn set_refusing(&self, refusing: bool) {
        self.refusing.store(refusing, Ordering::SeqCst);
    }
}

impl NotificationSink for RecordingSink {
    fn publish(
        &self,
        topic: &str,
        payload: String,
    ) -> impl Future<Output = Result<(), IrrigoError>> + Send {
        let result = if self.refusing.load(Ordering::SeqCst) {
            Err(IrrigoError::Transport("link down".into()))
        } else {
            self.published
                .lock()
                .unwrap()
                .push((topic.to_string(), payload));
            Ok(())
        };
        async { result }
    }
}

// ── Hardware ───────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct FakeBoard {
    zones: Mutex<BTreeMap<ZoneId, bool>>,
    valve: AtomicBool,
    switches: Mutex<FloatSwitches>,
}

impl FakeBoard {
    pub(crate) fn energized(&self) -> Vec<ZoneId> {
        self.zones
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, on)| **on)
            .map(|(zone, _)| *zone)
            .collect()
    }

    pub(crate) fn valve(&self) -> bool {
        self.valve.load(Ordering::SeqCst)
    }

    pub(crate) fn set_switches(&self, switches: FloatSwitches) {
        *self.switches.lock().unwrap() = switches;
    }
}

impl IrrigationHardware for FakeBoard {
    fn set_main_valve(&self, on: bool) {
        self.valve.store(on, Ordering::SeqCst);
    }

    fn set_zone(&self, zone: ZoneId, on: bool) {
        self.zones.lock().unwrap().insert(zone, on);
    }

    fn float_switches(&self) -> FloatSwitches {
        *self.switches.lock().unwrap()
    }
}

// ── Clock ──────────────────────────────────────────────────────

pub(crate) struct ManualClock {
    now: Mutex<LocalDateTime>,
}

impl ManualClock {
    pub(crate) fn at(now: LocalDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub(crate) fn set(&self, now: LocalDateTime) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> LocalDateTime {
        *self.now.lock().unwrap()
    }
}

/// 2024-06-04 (a Tuesday, weekday 1) at the given wall-clock time.
pub(crate) fn tuesday(hour: u32, minute: u32, second: u32) -> LocalDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 4)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}
