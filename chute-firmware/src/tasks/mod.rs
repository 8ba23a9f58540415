//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod alarm;
pub mod button;
pub mod freefall;
pub mod latch;
pub mod logger;

pub use alarm::alarm_task;
pub use button::button_task;
pub use freefall::freefall_task;
pub use latch::latch_task;
pub use logger::{logger_task, FlightLog};
