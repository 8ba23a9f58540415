//! PWM slice setup

use embassy_rp::pwm::Config;
use fixed::types::U12F4;

/// Slice configuration for an integer clock divider and counter top
pub fn frame_config(divider: u32, top: u16) -> Config {
    let mut config = Config::default();
    config.divider = U12F4::from_num(divider.min(255));
    config.top = top;
    config.compare_a = 0;
    config.compare_b = 0;
    config
}
