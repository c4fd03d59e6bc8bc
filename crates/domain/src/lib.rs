//! # irrigo-domain
//!
//! Pure domain model for the irrigo irrigation controller.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, local time
//! - Define **Zones** (the fixed set of irrigation output lines)
//! - Define **Schedules** (`TimeOfDay`, `WeekdaySet`) parsed once from their
//!   wire formats
//! - Define **Programs** (persisted schedule rules) and partial updates
//! - Define **Commands** (manual zone toggles, program CRUD) with validation
//! - Define the **Status snapshot** emitted to subscribers
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod command;
pub mod program;
pub mod schedule;
pub mod status;
pub mod zone;
