//! RP2040-specific HAL for the ejection firmware
//!
//! Implements the shared `chute-hal` traits on embassy-rp peripherals:
//!
//! - On-board QSPI flash as a [`chute_hal::PhysicalFlash`], plus the log
//!   partition layout
//! - Hardware watchdog
//! - GPIO outputs for the status LED and beacon
//! - PWM slice setup for the latch servo

#![no_std]

pub mod flash;
pub mod gpio;
pub mod pwm;
pub mod watchdog;

pub use flash::{log_store, RpFlash, RpLogStore};
pub use gpio::RpOutput;
pub use watchdog::RpWatchdog;
