//! Flight log writer
//!
//! Sole owner of the flash log after boot. Every record is synced before
//! the next one is taken off the channel.

use defmt::*;

use chute_core::event_log::EventLog;
use chute_hal_rp2040::RpLogStore;

use crate::channels::LOG_CHANNEL;

/// Log handle, or `None` when persistent logging is unavailable this boot
pub type FlightLog = Option<EventLog<RpLogStore>>;

#[embassy_executor::task]
pub async fn logger_task(mut log: FlightLog) {
    info!("Logger task started");

    loop {
        let event = LOG_CHANNEL.receive().await;

        let Some(log) = log.as_mut() else {
            debug!("No flight log, discarding {} record", event.kind.label());
            continue;
        };

        match log.append(&event).await {
            Ok(_) => debug!("Logged {} at {} us", event.kind.label(), event.timestamp_us),
            Err(e) => warn!("Failed to log {} record: {}", event.kind.label(), e),
        }
    }
}
