//! Hardware watchdog

use embassy_rp::peripherals::WATCHDOG;
use embassy_rp::watchdog::Watchdog;
use embassy_rp::Peri;
use embassy_time::Duration;

use chute_hal::ResetCause;

pub struct RpWatchdog {
    inner: Watchdog,
    cause: ResetCause,
}

impl RpWatchdog {
    /// Take the watchdog and latch the cause of the last reset
    pub fn new(watchdog: Peri<'static, WATCHDOG>) -> Self {
        let mut inner = Watchdog::new(watchdog);
        let cause = match inner.reset_reason() {
            Some(_) => ResetCause::Watchdog,
            None => ResetCause::PowerOn,
        };
        // Hold the countdown while a debugger halts the core
        inner.pause_on_debug(true);
        Self { inner, cause }
    }
}

impl chute_hal::Watchdog for RpWatchdog {
    fn start(&mut self, timeout_ms: u32) {
        self.inner.start(Duration::from_millis(timeout_ms as u64));
    }

    fn feed(&mut self) {
        self.inner.feed();
    }

    fn reset_cause(&self) -> ResetCause {
        self.cause
    }
}
