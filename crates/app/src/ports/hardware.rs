//! Hardware port — the controller board's outputs and inputs.

use std::sync::Arc;

use irrigo_domain::status::FloatSwitches;
use irrigo_domain::zone::ZoneId;

/// Digital outputs for the zone solenoids and main valve, plus the float
/// switch inputs.
///
/// Output writes are assumed to always succeed; there is no valve feedback.
/// Sequencing (which output when) is the actuator's job, not the board's.
pub trait IrrigationHardware: Send + Sync + 'static {
    /// Energize or release the shared main valve.
    fn set_main_valve(&self, on: bool);

    /// Energize or release one zone solenoid.
    fn set_zone(&self, zone: ZoneId, on: bool);

    /// Current float switch readings.
    fn float_switches(&self) -> FloatSwitches;
}

impl<T: IrrigationHardware> IrrigationHardware for Arc<T> {
    fn set_main_valve(&self, on: bool) {
        (**self).set_main_valve(on);
    }

    fn set_zone(&self, zone: ZoneId, on: bool) {
        (**self).set_zone(zone, on);
    }

    fn float_switches(&self) -> FloatSwitches {
        (**self).float_switches()
    }
}
