//! # irrigo-adapter-virtual
//!
//! Simulated controller board implementing
//! [`IrrigationHardware`](irrigo_app::ports::IrrigationHardware).
//!
//! | Output / input | Count | Behaviour |
//! |----------------|-------|-----------|
//! | Zone solenoid | 8 | on/off, every transition journaled |
//! | Main valve | 1 | on/off, every transition journaled |
//! | Float switch | 3 | settable from tests or a demo driver |
//!
//! A GPIO-backed board is a drop-in replacement implementing the same port.
//!
//! ## Dependency rule
//!
//! Depends on `irrigo-app` (port traits) and `irrigo-domain` only.

mod board;

pub use board::{FloatSwitch, JOURNAL_CAPACITY, OutputEvent, VirtualBoard};
