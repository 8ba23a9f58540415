//! Latch servo task
//!
//! Sole owner of the servo PWM output.

use defmt::*;
use embassy_rp::pwm::PwmOutput;

use chute_core::config::ServoConfig;
use chute_core::traits::Servo;
use chute_drivers::PwmServo;

use crate::channels::{LatchCommand, LATCH_CMD};

#[embassy_executor::task]
pub async fn latch_task(mut servo: PwmServo<PwmOutput<'static>>, config: ServoConfig) {
    info!("Latch task started");

    loop {
        let angle = match LATCH_CMD.wait().await {
            LatchCommand::Close => config.start_angle,
            LatchCommand::Release => config.end_angle,
        };
        // Release can be re-sent on later free-falls; the angle is the same
        if servo.angle() != Some(angle) {
            info!("Latch servo -> {} deg", angle);
        }
        servo.set_angle(angle);
    }
}
