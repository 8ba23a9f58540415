//! Board-agnostic flight logic for the parachute ejection unit
//!
//! Everything that decides *what* the unit does lives here, with no
//! dependency on a particular chip:
//!
//! - Checksummed flight records and the append-only event log
//! - Deployment state machine (Locked → Armed → Ejected)
//! - Arm/lock safety gate and the guarded manual reboot
//! - Locator alarm timer
//! - Watchdog supervision and boot classification
//! - Sensor health polling
//! - Flight configuration and status LED patterns

#![no_std]
#![deny(unsafe_code)]

pub mod alarm;
pub mod config;
pub mod event_log;
pub mod safety;
pub mod signal;
pub mod state;
pub mod telemetry;
pub mod traits;
pub mod watchdog;

#[cfg(test)]
pub(crate) mod testing;
