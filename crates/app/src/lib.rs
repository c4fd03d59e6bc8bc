//! # irrigo-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ProgramStore` — CRUD for programs, partial updates
//!   - `NotificationSink` — fire-and-forget publishing of payloads
//!   - `IrrigationHardware` — zone outputs, main valve, float switches
//!   - `Clock` — local wall-clock time
//! - Provide the core use-cases:
//!   - `ZoneActuator` — one-zone-at-a-time actuation with valve sequencing
//!     and the auto-deactivation timer
//!   - `ProgramScheduler` — periodic evaluation of stored programs
//!   - `StatusReporter` — periodic and on-demand status snapshots
//!   - `CommandRouter` — inbound zone and program commands
//!
//! ## Dependency rule
//! Depends on `irrigo-domain` only (plus `tokio` for tasks, locks and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod actuator;
pub mod command_router;
pub mod ports;
pub mod scheduler;
pub mod status_reporter;
pub mod topics;

#[cfg(test)]
mod testing;

pub use actuator::ZoneActuator;
pub use command_router::CommandRouter;
pub use scheduler::ProgramScheduler;
pub use status_reporter::StatusReporter;
pub use topics::Topics;
