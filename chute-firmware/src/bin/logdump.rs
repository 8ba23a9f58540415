//! Flight log dump
//!
//! Companion binary flashed after recovery. Mounts the log read-only,
//! prints every record over RTT and blinks the LED when done. Output format:
//!
//! ```text
//! start <bytes>
//! <16 hex bytes>
//! ...
//! end
//! ```
//!
//! Each hex line is followed by its decoded fields, so the dump reads
//! without any host-side tooling.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_time::{Delay, Timer};
use {defmt_rtt as _, panic_probe as _};

use chute_core::event_log::{DumpSummary, EventLog, LogReader};
use chute_core::signal::BlinkPattern;
use chute_hal::{OutputPin, LOG_FILE_NAME};
use chute_hal_rp2040::{log_store, RpLogStore, RpOutput};

#[path = "../config.rs"]
#[allow(dead_code)]
mod config;

use config::FLIGHT_CONFIG;

/// Power-on pause before the dump starts, so a console can attach
const DUMP_SETTLE_MS: u64 = 5000;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    let mut led = RpOutput::new(Output::new(p.PIN_25, Level::Low));

    // Give the host console time to attach
    Timer::after_millis(DUMP_SETTLE_MS).await;
    led.set_level(true);

    match EventLog::open(log_store(p.FLASH)).await {
        Ok(mut log) => {
            let size = log.size();
            info!("start {}", size);
            match log.read_all().await {
                Ok(mut reader) => {
                    let summary = dump(&mut reader).await;
                    info!("end");
                    info!(
                        "{}: {} records, {} bad checksums, {} undecodable",
                        LOG_FILE_NAME, summary.records, summary.bad_checksums, summary.undecodable
                    );
                    if !summary.accounts_for(size) {
                        warn!(
                            "Read back {} of {} bytes, log tail is missing or torn",
                            summary.bytes(),
                            size
                        );
                    }
                }
                Err(e) => error!("Cannot read flight log: {}", e),
            }
            if let Err(e) = log.close().await {
                warn!("Close failed: {}", e);
            }
        }
        Err(e) => error!("Flight log mount failed: {}", e),
    }

    led.set_level(false);
    BlinkPattern::dump_complete(&FLIGHT_CONFIG.blink)
        .play(&mut led, &mut Delay)
        .await;

    loop {
        Timer::after_secs(1).await;
    }
}

async fn dump(reader: &mut LogReader<'_, RpLogStore>) -> DumpSummary {
    let mut summary = DumpSummary::default();

    while let Some(raw) = reader.next().await {
        let raw = match raw {
            Ok(raw) => raw,
            Err(e) => {
                error!("read error: {}", e);
                break;
            }
        };
        info!("{:02X}", raw);

        match summary.tally(&raw) {
            Ok((event, ok)) => {
                let [x, y, z] = event.accel.to_ms2();
                info!(
                    "  {} t={} us accel=({}, {}, {}) m/s2 checksum {}",
                    event.kind.label(),
                    event.timestamp_us,
                    x,
                    y,
                    z,
                    if ok { "ok" } else { "MISMATCH" }
                );
            }
            Err(e) => warn!("  undecodable record: {}", e),
        }
    }

    summary
}
