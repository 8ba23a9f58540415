//! Liveness contract with the platform watchdog
//!
//! Once armed, the flight loop must call [`WatchdogSupervisor::renew`] at
//! least once per timeout window. A deliberate reboot restarts the countdown
//! with a short timeout and stops renewing.

use chute_hal::{LogStore, ResetCause, Watchdog};

use crate::config::{BlinkConfig, TimingConfig};
use crate::event_log::{EventLog, LogError, LogEvent, LogKind};
use crate::signal::BlinkPattern;

/// How this boot started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootKind {
    /// Power-on or external reset
    Cold,
    /// Previous run let the watchdog expire
    WatchdogReset,
}

impl BootKind {
    /// Kind of the first record written this boot
    pub fn record_kind(self) -> LogKind {
        match self {
            BootKind::Cold => LogKind::Boot,
            BootKind::WatchdogReset => LogKind::WatchdogReboot,
        }
    }
}

pub struct WatchdogSupervisor<W: Watchdog> {
    watchdog: W,
    boot: BootKind,
    timeout_ms: u32,
    reboot_timeout_ms: u32,
    armed: bool,
    rebooting: bool,
}

impl<W: Watchdog> WatchdogSupervisor<W> {
    /// Wrap the watchdog and classify the current boot
    pub fn new(watchdog: W, timing: &TimingConfig) -> Self {
        let boot = match watchdog.reset_cause() {
            ResetCause::Watchdog => BootKind::WatchdogReset,
            ResetCause::PowerOn => BootKind::Cold,
        };
        Self {
            watchdog,
            boot,
            timeout_ms: timing.watchdog_ms,
            reboot_timeout_ms: timing.reboot_timeout_ms,
            armed: false,
            rebooting: false,
        }
    }

    pub fn boot_kind(&self) -> BootKind {
        self.boot
    }

    pub fn was_reset_by_watchdog(&self) -> bool {
        self.boot == BootKind::WatchdogReset
    }

    /// Startup LED pattern for this boot
    pub fn startup_pattern(&self, blink: &BlinkConfig) -> BlinkPattern {
        match self.boot {
            BootKind::Cold => BlinkPattern::cold_boot(blink),
            BootKind::WatchdogReset => BlinkPattern::watchdog_reboot(blink),
        }
    }

    /// Pause before logging starts, so a debug probe can attach
    ///
    /// Zero after a watchdog reset: recovering fast matters more mid-flight.
    pub fn settle_delay_ms(&self, timing: &TimingConfig) -> u32 {
        match self.boot {
            BootKind::Cold => timing.console_settle_ms,
            BootKind::WatchdogReset => 0,
        }
    }

    /// Append this boot's first record
    ///
    /// [`LogKind::WatchdogReboot`] after a watchdog reset, [`LogKind::Boot`]
    /// otherwise.
    pub async fn write_boot_record<S: LogStore>(
        &self,
        log: &mut EventLog<S>,
        now_us: u64,
    ) -> Result<LogEvent, LogError> {
        let record = LogEvent::marker(now_us, self.boot.record_kind());
        log.append(&record).await?;
        Ok(record)
    }

    /// Start the countdown with the normal timeout
    pub fn arm(&mut self) {
        if self.rebooting {
            return;
        }
        self.watchdog.start(self.timeout_ms);
        self.armed = true;
    }

    /// Feed the watchdog; no-op while a reboot is pending
    pub fn renew(&mut self) {
        if self.rebooting {
            return;
        }
        self.watchdog.feed();
    }

    /// Arm the short timeout and never feed again
    pub fn request_reboot(&mut self) {
        self.watchdog.start(self.reboot_timeout_ms);
        self.armed = true;
        self.rebooting = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn is_rebooting(&self) -> bool {
        self.rebooting
    }
}
