//! Free-fall interrupt handling
//!
//! Waits on the accelerometer's INT1 line. Reading INT_SOURCE clears the
//! latched interrupt, so the line drops again before the next wait.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{with_timeout, Duration, Timer};

use chute_core::state::Event;
use chute_core::traits::Accelerometer;
use chute_drivers::sensor::adxl345::INT_FREE_FALL;

use crate::config::{POLL_TIMEOUT_MS, SENSOR_RETRY_MS};
use crate::shared::{now_us, route, SharedSensor, LAST_SAMPLE, MACHINE};

#[embassy_executor::task]
pub async fn freefall_task(mut int1: Input<'static>, sensor: &'static SharedSensor) {
    info!("Free-fall task started");

    loop {
        int1.wait_for_high().await;

        let reads = async {
            let mut sensor = sensor.lock().await;
            let source = sensor.interrupt_source().await;
            let sample = sensor.read_sample().await;
            (source, sample)
        };
        let Ok((source, sample)) = with_timeout(Duration::from_millis(POLL_TIMEOUT_MS), reads).await
        else {
            warn!("Accelerometer read timed out");
            Timer::after_millis(SENSOR_RETRY_MS).await;
            continue;
        };

        let source = match source {
            Ok(source) => source,
            Err(e) => {
                warn!("INT_SOURCE read failed: {}", e);
                Timer::after_millis(SENSOR_RETRY_MS).await;
                continue;
            }
        };
        if source & INT_FREE_FALL == 0 {
            continue;
        }

        let sample = match sample {
            Ok(sample) => {
                LAST_SAMPLE.store(sample);
                sample
            }
            Err(_) => LAST_SAMPLE.load(),
        };

        let before = MACHINE.state();
        let effects = MACHINE.dispatch(Event::FreeFall { sample }, now_us());
        info!("Free-fall in {} -> {}", before, MACHINE.state());
        route(&effects);
    }
}
