//! State shared between tasks
//!
//! The deployment state machine and the safety gate are lock-free, so the
//! button and free-fall tasks touch them directly. The accelerometer sits
//! behind an async mutex because the flight loop and the free-fall task
//! both talk to it over the same bus.

use defmt::*;
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Instant;

use chute_core::event_log::LogEvent;
use chute_core::safety::SafetyGate;
use chute_core::state::{DeploymentStateMachine, Effect, Effects};
use chute_core::telemetry::SampleCell;
use chute_drivers::Adxl345;

use crate::channels::{LatchCommand, ALARM_START, LATCH_CMD, LOG_CHANNEL};
use crate::config::FLIGHT_CONFIG;

pub type Sensor = Adxl345<I2c<'static, I2C0, Async>>;

/// Accelerometer shared by the flight loop and the free-fall task
pub type SharedSensor = Mutex<CriticalSectionRawMutex, Sensor>;

pub static MACHINE: DeploymentStateMachine = DeploymentStateMachine::new();

pub static GATE: SafetyGate = SafetyGate::new(&FLIGHT_CONFIG.timing);

/// Last sample read successfully from the accelerometer
pub static LAST_SAMPLE: SampleCell = SampleCell::new();

/// Microseconds since boot
pub fn now_us() -> u64 {
    Instant::now().as_micros()
}

/// Queue a record for the logger task
pub fn queue_record(event: LogEvent) {
    if LOG_CHANNEL.try_send(event).is_err() {
        warn!("Log channel full, dropping {} record", event.kind.label());
    }
}

/// Effects only the flight loop can carry out
#[derive(Debug, Default, Clone, Copy)]
pub struct Deferred {
    pub fault_blink: bool,
    pub renew_watchdog: bool,
}

/// Hand each effect to the task that owns its hardware
pub fn route(effects: &Effects) -> Deferred {
    let mut deferred = Deferred::default();
    for effect in effects {
        match *effect {
            Effect::CloseLatch => LATCH_CMD.signal(LatchCommand::Close),
            Effect::ReleaseLatch => LATCH_CMD.signal(LatchCommand::Release),
            Effect::StartAlarm => ALARM_START.signal(()),
            Effect::Record(event) => queue_record(event),
            Effect::FaultBlink => deferred.fault_blink = true,
            Effect::RenewWatchdog => deferred.renew_watchdog = true,
        }
    }
    deferred
}
