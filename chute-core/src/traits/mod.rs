//! Hardware abstraction traits
//!
//! These traits define the interface between the flight logic and the
//! sensor and actuator drivers.

pub mod accelerometer;
pub mod servo;

pub use accelerometer::{Accelerometer, SensorError};
pub use servo::Servo;
