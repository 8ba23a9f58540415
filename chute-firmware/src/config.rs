//! Firmware constants and the baked-in flight configuration
//!
//! `FLIGHT_CONFIG` is generated by build.rs from flight.toml, which it has
//! already validated.

include!(concat!(env!("OUT_DIR"), "/flight_config.rs"));

/// Upper bound on one tick's sensor poll
pub const POLL_TIMEOUT_MS: u64 = 50;

/// Back-off after a failed interrupt-source read
pub const SENSOR_RETRY_MS: u64 = 10;
