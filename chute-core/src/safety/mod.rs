//! Safety interlocks
//!
//! Keeps the latch closed until the operator arms the unit, and guards the
//! post-flight reboot.

pub mod arming;
pub mod gate;

pub use arming::wait_for_arm;
pub use gate::{ButtonAction, SafetyGate};
