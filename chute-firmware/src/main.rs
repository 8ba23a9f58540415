//! Chute - Parachute Ejection Firmware
//!
//! Main firmware binary for RP2040-based model rocket flight computers.
//! Holds the latch closed until armed, releases it on free-fall, sounds a
//! locator beacon and records the flight to on-board flash.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c, InterruptHandler as I2cInterruptHandler};
use embassy_rp::peripherals::I2C0;
use embassy_rp::pwm::Pwm;
use embassy_sync::mutex::Mutex;
use embassy_time::{with_timeout, Delay, Duration, Ticker, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use chute_core::event_log::EventLog;
use chute_core::safety::wait_for_arm;
use chute_core::signal::BlinkPattern;
use chute_core::state::{Event, SensorHealth};
use chute_core::telemetry;
use chute_core::watchdog::WatchdogSupervisor;
use chute_drivers::servo::frame_timing;
use chute_drivers::{Adxl345, PwmServo};
use chute_hal::{OutputPin, LOG_FILE_NAME};
use chute_hal_rp2040::{log_store, pwm, RpOutput, RpWatchdog};

use crate::channels::REBOOT_REQUEST;
use crate::config::{FLIGHT_CONFIG, POLL_TIMEOUT_MS};
use crate::shared::{now_us, route, SharedSensor, LAST_SAMPLE, MACHINE};
use crate::tasks::FlightLog;

mod channels;
mod config;
mod shared;
mod tasks;

bind_interrupts!(struct Irqs {
    I2C0_IRQ => I2cInterruptHandler<I2C0>;
});

/// ADXL345 bus speed
const I2C_FREQUENCY_HZ: u32 = 400_000;

/// Accelerometer shared with the free-fall task (must live forever)
static SENSOR: StaticCell<SharedSensor> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    let config = &FLIGHT_CONFIG;

    let mut led = RpOutput::new(Output::new(p.PIN_25, Level::Low));
    let mut delay = Delay;

    // Classify the boot before anything can feed or restart the watchdog
    let mut supervisor = WatchdogSupervisor::new(RpWatchdog::new(p.WATCHDOG), &config.timing);
    let boot = supervisor.boot_kind();

    supervisor
        .startup_pattern(&config.blink)
        .play(&mut led, &mut delay)
        .await;

    let settle_ms = supervisor.settle_delay_ms(&config.timing);
    if settle_ms > 0 {
        Timer::after_millis(settle_ms as u64).await;
    }
    info!("Chute firmware starting ({})", boot);

    // Beacon and button
    let piezo = RpOutput::new(Output::new(p.PIN_7, Level::Low));
    let button = Input::new(p.PIN_6, Pull::Down);

    // Accelerometer on I2C0, free-fall on INT1
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQUENCY_HZ;
    let i2c = I2c::new_async(p.I2C0, p.PIN_21, p.PIN_20, Irqs, i2c_config);
    let int1 = Input::new(p.PIN_19, Pull::None);

    let mut accel = Adxl345::new(i2c);
    match accel.init(&config.free_fall).await {
        Ok(()) => info!(
            "ADXL345 ready: free-fall below {} mg for {} ms",
            config.free_fall.threshold_mg, config.free_fall.duration_ms
        ),
        // The flight loop keeps reporting the fault
        Err(e) => error!("ADXL345 setup failed: {}", e),
    }
    let sensor: &'static SharedSensor = SENSOR.init(Mutex::new(accel));

    // Latch servo on PWM slice 1, channel A
    let (divider, top) = frame_timing(embassy_rp::clocks::clk_sys_freq());
    let slice = Pwm::new_output_a(p.PWM_SLICE1, p.PIN_2, pwm::frame_config(divider, top));
    let (servo_out, _) = slice.split();
    let servo = PwmServo::new(unwrap!(servo_out));
    info!("Servo PWM: divider {}, top {}", divider, top);

    // Flight log
    let log: FlightLog = match EventLog::open_or_create(log_store(p.FLASH)).await {
        Ok(mut log) => {
            if log.was_reformatted() {
                warn!("No valid flight log found, partition formatted");
            }
            match supervisor.write_boot_record(&mut log, now_us()).await {
                Ok(_) => info!("Flight log '{}': {} bytes", LOG_FILE_NAME, log.size()),
                Err(e) => warn!("Failed to write boot record: {}", e),
            }
            Some(log)
        }
        Err(e) => {
            error!("Flight log unavailable, flying without it: {}", e);
            None
        }
    };

    spawner.spawn(tasks::logger_task(log)).unwrap();
    spawner.spawn(tasks::latch_task(servo, config.servo)).unwrap();
    spawner.spawn(tasks::alarm_task(piezo, config.alarm)).unwrap();
    spawner.spawn(tasks::button_task(button)).unwrap();
    spawner.spawn(tasks::freefall_task(int1, sensor)).unwrap();
    info!("All tasks spawned");

    supervisor.arm();
    info!("Watchdog armed ({} ms), waiting for arming press", config.timing.watchdog_ms);

    let beats = wait_for_arm(
        &shared::GATE,
        &mut led,
        &mut supervisor,
        &mut delay,
        config.timing.heartbeat_ms,
    )
    .await;
    info!("Armed after {} heartbeats", beats);

    let mut ticker = Ticker::every(Duration::from_millis(config.timing.tick_ms as u64));
    loop {
        if let Either::Second(()) = select(ticker.next(), REBOOT_REQUEST.wait()).await {
            break;
        }
        led.toggle();

        // Bus contention counts against the same deadline as the reads
        let poll = async {
            let mut sensor = sensor.lock().await;
            telemetry::poll(&mut *sensor, &LAST_SAMPLE).await
        };
        let timeout = Duration::from_millis(POLL_TIMEOUT_MS);
        let (health, sample) = match with_timeout(timeout, poll).await {
            Ok(result) => result,
            Err(_) => (SensorHealth::Faulted, LAST_SAMPLE.load()),
        };

        let effects = MACHINE.dispatch(Event::Tick { health, sample }, now_us());
        let deferred = route(&effects);

        if deferred.fault_blink {
            warn!("Accelerometer connection error");
            BlinkPattern::sensor_fault(&config.blink)
                .play(&mut led, &mut delay)
                .await;
        }
        if deferred.renew_watchdog {
            supervisor.renew();
        }
    }

    warn!("Rebooting in {} ms", config.timing.reboot_timeout_ms);
    supervisor.request_reboot();
    loop {
        cortex_m::asm::nop();
    }
}
