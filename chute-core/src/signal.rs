//! Status LED patterns
//!
//! The LED is the only operator display on the unit: a burst of blinks at
//! boot tells a cold start from a watchdog recovery, a shorter burst flags a
//! sensor fault mid-flight.

use chute_hal::OutputPin;
use embedded_hal_async::delay::DelayNs;

use crate::config::BlinkConfig;

/// A burst of equal blinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlinkPattern {
    pub count: u8,
    pub on_ms: u32,
    pub off_ms: u32,
}

impl BlinkPattern {
    pub const fn new(count: u8, blink: &BlinkConfig) -> Self {
        Self {
            count,
            on_ms: blink.on_ms,
            off_ms: blink.off_ms,
        }
    }

    pub const fn cold_boot(blink: &BlinkConfig) -> Self {
        Self::new(blink.cold_boot, blink)
    }

    pub const fn watchdog_reboot(blink: &BlinkConfig) -> Self {
        Self::new(blink.watchdog_reboot, blink)
    }

    pub const fn sensor_fault(blink: &BlinkConfig) -> Self {
        Self::new(blink.sensor_fault, blink)
    }

    pub const fn dump_complete(blink: &BlinkConfig) -> Self {
        Self::new(blink.dump_complete, blink)
    }

    /// Total time the pattern takes to play
    pub const fn duration_ms(&self) -> u32 {
        self.count as u32 * (self.on_ms + self.off_ms)
    }

    /// Play the pattern, leaving the LED off
    pub async fn play<P: OutputPin, D: DelayNs>(&self, led: &mut P, delay: &mut D) {
        for _ in 0..self.count {
            led.set_level(true);
            delay.delay_ms(self.on_ms).await;
            led.set_level(false);
            delay.delay_ms(self.off_ms).await;
        }
    }
}
