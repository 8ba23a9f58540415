//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use chute_core::event_log::LogEvent;

/// Channel capacity for pending flight records
const LOG_CHANNEL_SIZE: usize = 8;

/// Latch servo commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum LatchCommand {
    /// Drive to the latched angle
    Close,
    /// Drive to the release angle
    Release,
}

/// Records waiting to be appended to flash
///
/// Producers use `try_send`; a full channel drops the record.
pub static LOG_CHANNEL: Channel<CriticalSectionRawMutex, LogEvent, LOG_CHANNEL_SIZE> =
    Channel::new();

/// Latch servo command (latest wins)
pub static LATCH_CMD: Signal<CriticalSectionRawMutex, LatchCommand> = Signal::new();

/// Start the locator beacon; it then sounds until power-off
pub static ALARM_START: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Button asked for a post-flight reboot
pub static REBOOT_REQUEST: Signal<CriticalSectionRawMutex, ()> = Signal::new();
