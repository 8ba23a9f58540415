//! Flight configuration
//!
//! Every tunable of the ejection unit. The firmware bakes one instance in at
//! build time from `flight.toml`; anything the file leaves out falls back to
//! [`FlightConfig::DEFAULT`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// ADXL345 free-fall threshold resolution
pub const FREE_FALL_MG_PER_LSB: u32 = 625; // ×10 (62.5 mg)

/// ADXL345 free-fall time resolution
pub const FREE_FALL_MS_PER_LSB: u32 = 5;

/// Servo travel limit
pub const MAX_SERVO_ANGLE: u8 = 180;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Servo angle above 180°
    AngleOutOfRange(u8),
    /// Free-fall threshold does not fit the 8-bit register
    ThresholdOutOfRange(u16),
    /// Free-fall duration does not fit the 8-bit register
    DurationOutOfRange(u16),
    /// A period the watchdog must outlast is not shorter than its timeout
    WatchdogTooShort,
    /// A timing value that must be non-zero is zero
    ZeroDuration,
}

/// Latch servo positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct ServoConfig {
    /// Latched (pre-flight) angle
    pub start_angle: u8,
    /// Released angle
    pub end_angle: u8,
}

impl Default for ServoConfig {
    fn default() -> Self {
        FlightConfig::DEFAULT.servo
    }
}

/// Accelerometer free-fall detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct FreeFallConfig {
    /// All axes must read below this magnitude (mg)
    pub threshold_mg: u16,
    /// ...for at least this long (ms)
    pub duration_ms: u16,
}

impl FreeFallConfig {
    /// THRESH_FF register value
    pub fn threshold_register(&self) -> u8 {
        (self.threshold_mg as u32 * 10 / FREE_FALL_MG_PER_LSB) as u8
    }

    /// TIME_FF register value
    pub fn duration_register(&self) -> u8 {
        (self.duration_ms as u32 / FREE_FALL_MS_PER_LSB) as u8
    }
}

impl Default for FreeFallConfig {
    fn default() -> Self {
        FlightConfig::DEFAULT.free_fall
    }
}

/// Loop periods and timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct TimingConfig {
    /// Flight loop period
    pub tick_ms: u32,
    /// LED toggle period while waiting to arm
    pub heartbeat_ms: u32,
    /// Watchdog timeout during normal operation
    pub watchdog_ms: u32,
    /// Watchdog timeout for a deliberate reboot
    pub reboot_timeout_ms: u32,
    /// Minimum time after ejection before the button reboots
    pub reboot_guard_ms: u32,
    /// Cold-boot pause for the debug probe to attach
    pub console_settle_ms: u32,
    /// Minimum spacing between accepted button edges
    pub debounce_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        FlightConfig::DEFAULT.timing
    }
}

/// Locator beacon cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct AlarmTiming {
    pub first_on_ms: u32,
    pub on_ms: u32,
    pub off_ms: u32,
}

impl Default for AlarmTiming {
    fn default() -> Self {
        FlightConfig::DEFAULT.alarm
    }
}

/// Status LED blink counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct BlinkConfig {
    pub cold_boot: u8,
    pub watchdog_reboot: u8,
    pub sensor_fault: u8,
    pub dump_complete: u8,
    pub on_ms: u32,
    pub off_ms: u32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        FlightConfig::DEFAULT.blink
    }
}

/// Complete flight configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct FlightConfig {
    pub servo: ServoConfig,
    pub free_fall: FreeFallConfig,
    pub timing: TimingConfig,
    pub alarm: AlarmTiming,
    pub blink: BlinkConfig,
}

impl FlightConfig {
    pub const DEFAULT: Self = Self {
        servo: ServoConfig {
            start_angle: 90,
            end_angle: 180,
        },
        free_fall: FreeFallConfig {
            threshold_mg: 600,
            duration_ms: 200,
        },
        timing: TimingConfig {
            tick_ms: 300,
            heartbeat_ms: 1000,
            watchdog_ms: 1500,
            reboot_timeout_ms: 100,
            reboot_guard_ms: 20_000,
            console_settle_ms: 2000,
            debounce_ms: 50,
        },
        alarm: AlarmTiming {
            first_on_ms: 1500,
            on_ms: 1000,
            off_ms: 300,
        },
        blink: BlinkConfig {
            cold_boot: 8,
            watchdog_reboot: 2,
            sensor_fault: 4,
            dump_complete: 20,
            on_ms: 100,
            off_ms: 50,
        },
    };

    /// Check every value against hardware and timing limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        for angle in [self.servo.start_angle, self.servo.end_angle] {
            if angle > MAX_SERVO_ANGLE {
                return Err(ConfigError::AngleOutOfRange(angle));
            }
        }

        let ff = &self.free_fall;
        if ff.threshold_mg as u32 * 10 > u8::MAX as u32 * FREE_FALL_MG_PER_LSB {
            return Err(ConfigError::ThresholdOutOfRange(ff.threshold_mg));
        }
        if ff.duration_ms as u32 > u8::MAX as u32 * FREE_FALL_MS_PER_LSB {
            return Err(ConfigError::DurationOutOfRange(ff.duration_ms));
        }

        let t = &self.timing;
        let a = &self.alarm;
        let nonzero = [
            t.tick_ms,
            t.heartbeat_ms,
            t.watchdog_ms,
            t.reboot_timeout_ms,
            a.first_on_ms,
            a.on_ms,
            a.off_ms,
            self.blink.on_ms,
        ];
        if nonzero.contains(&0) || ff.duration_ms == 0 {
            return Err(ConfigError::ZeroDuration);
        }

        // Both loops feed the watchdog once per iteration
        if t.tick_ms >= t.watchdog_ms || t.heartbeat_ms >= t.watchdog_ms {
            return Err(ConfigError::WatchdogTooShort);
        }
        if t.reboot_timeout_ms >= t.watchdog_ms {
            return Err(ConfigError::WatchdogTooShort);
        }

        Ok(())
    }
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(FlightConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_free_fall_register_values() {
        let ff = FlightConfig::DEFAULT.free_fall;
        // 600 mg / 62.5 mg, 200 ms / 5 ms
        assert_eq!(ff.threshold_register(), 9);
        assert_eq!(ff.duration_register(), 40);
    }

    #[test]
    fn test_rejects_angle_past_travel() {
        let mut cfg = FlightConfig::DEFAULT;
        cfg.servo.end_angle = 200;
        assert_eq!(cfg.validate(), Err(ConfigError::AngleOutOfRange(200)));
    }

    #[test]
    fn test_rejects_register_overflow() {
        let mut cfg = FlightConfig::DEFAULT;
        cfg.free_fall.threshold_mg = 16_000;
        assert_eq!(cfg.validate(), Err(ConfigError::ThresholdOutOfRange(16_000)));

        let mut cfg = FlightConfig::DEFAULT;
        cfg.free_fall.duration_ms = 1280;
        assert_eq!(cfg.validate(), Err(ConfigError::DurationOutOfRange(1280)));
    }

    #[test]
    fn test_rejects_tick_slower_than_watchdog() {
        let mut cfg = FlightConfig::DEFAULT;
        cfg.timing.tick_ms = 1500;
        assert_eq!(cfg.validate(), Err(ConfigError::WatchdogTooShort));
    }

    #[test]
    fn test_rejects_zero_alarm_phase() {
        let mut cfg = FlightConfig::DEFAULT;
        cfg.alarm.off_ms = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroDuration));
    }
}
