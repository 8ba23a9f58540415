//! Hardware driver implementations
//!
//! Concrete implementations of the traits defined in chute-core:
//!
//! - ADXL345 accelerometer (async I2C, free-fall interrupt)
//! - PWM hobby servo for the parachute latch

#![no_std]
#![deny(unsafe_code)]

pub mod sensor;
pub mod servo;

pub use sensor::Adxl345;
pub use servo::PwmServo;
