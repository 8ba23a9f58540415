//! Locator beacon

pub mod deadline;
pub mod timer;

pub use deadline::Deadline;
pub use timer::{AlarmPhase, AlarmTimer, CallbackScheduler};
