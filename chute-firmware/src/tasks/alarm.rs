//! Locator beacon task
//!
//! Drives the alarm timer from an embassy deadline: the timer asks for one
//! callback at a time and this task fires it when the deadline passes.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Instant, Timer};

use chute_core::alarm::{AlarmTimer, CallbackScheduler, Deadline};
use chute_core::config::AlarmTiming;
use chute_hal_rp2040::RpOutput;

use crate::channels::ALARM_START;

/// Single pending deadline
#[derive(Default)]
pub struct DeadlineSlot {
    deadline: Deadline,
}

impl CallbackScheduler for DeadlineSlot {
    fn arm(&mut self, delay_ms: u32) {
        self.deadline.arm(Instant::now().as_micros(), delay_ms);
    }

    fn cancel(&mut self) {
        self.deadline.cancel();
    }
}

impl DeadlineSlot {
    async fn elapsed(&self) {
        match self.deadline.at_us() {
            Some(at) => Timer::at(Instant::from_micros(at)).await,
            None => core::future::pending().await,
        }
    }
}

#[embassy_executor::task]
pub async fn alarm_task(piezo: RpOutput<'static>, timing: AlarmTiming) {
    info!("Alarm task started");

    let mut alarm = AlarmTimer::new(piezo, DeadlineSlot::default(), timing);

    loop {
        let woke = select(ALARM_START.wait(), alarm.scheduler().elapsed()).await;
        match woke {
            // Only the first ejection starts the cycle
            Either::First(()) if !alarm.is_active() => {
                info!("Locator beacon on");
                alarm.start();
            }
            Either::First(()) => {}
            Either::Second(()) => alarm.on_fire(),
        }
    }
}
