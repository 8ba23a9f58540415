//! Watchdog supervision

pub mod supervisor;

pub use supervisor::{BootKind, WatchdogSupervisor};
