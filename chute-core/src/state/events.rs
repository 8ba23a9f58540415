//! Inputs and outputs of the deployment state machine

use heapless::Vec;

use crate::event_log::{AccelSample, LogEvent};

/// Upper bound on effects produced by a single transition
pub const MAX_EFFECTS: usize = 4;

/// Effects requested by a transition, in execution order
pub type Effects = Vec<Effect, MAX_EFFECTS>;

/// Result of the periodic sensor check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorHealth {
    /// Interrupt configuration reads back as programmed
    Healthy,
    /// Register mismatch or unreadable sensor
    Faulted,
}

/// Events that drive the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Safety gate accepted the arming press
    Arm,
    /// Accelerometer raised its free-fall interrupt
    FreeFall { sample: AccelSample },
    /// Periodic flight-loop poll
    Tick {
        health: SensorHealth,
        sample: AccelSample,
    },
}

/// Side effects the caller must carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Drive the servo to the latched angle
    CloseLatch,
    /// Drive the servo to the release angle
    ReleaseLatch,
    /// (Re)start the locator beacon
    StartAlarm,
    /// Append a record to the flight log
    Record(LogEvent),
    /// Flash the sensor-fault pattern
    FaultBlink,
    /// Feed the watchdog
    RenewWatchdog,
}
