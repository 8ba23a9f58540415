//! Hobby servo on a 50 Hz PWM channel
//!
//! 700 µs drives the horn to 0°, 2700 µs to 180°, linear in between.

use embedded_hal::pwm::SetDutyCycle;

use chute_core::config::MAX_SERVO_ANGLE;
use chute_core::traits::Servo;

/// Pulse width at 0°
pub const MIN_PULSE_US: u32 = 700;

/// Pulse width at 180°
pub const MAX_PULSE_US: u32 = 2700;

/// Servo frame rate
pub const FRAME_HZ: u32 = 50;

/// Servo frame period
pub const FRAME_US: u32 = 1_000_000 / FRAME_HZ;

/// Smallest PWM clock divider tried
const BASE_DIVIDER: u32 = 64;

/// Largest integer divider the RP2040 slice supports
const MAX_DIVIDER: u32 = 256;

/// Pulse width for `degrees`, clamped to the servo's travel
pub const fn pulse_width_us(degrees: u8) -> u32 {
    let degrees = if degrees > MAX_SERVO_ANGLE {
        MAX_SERVO_ANGLE
    } else {
        degrees
    };
    MIN_PULSE_US + degrees as u32 * (MAX_PULSE_US - MIN_PULSE_US) / MAX_SERVO_ANGLE as u32
}

/// Duty value for a pulse, given the counter's full-scale value
pub const fn duty_for_pulse(pulse_us: u32, max_duty: u16) -> u16 {
    (pulse_us as u64 * max_duty as u64 / FRAME_US as u64) as u16
}

/// Integer clock divider and counter top for a 50 Hz frame
///
/// Starts at /64 and steps by 64 until the top fits in 16 bits.
pub const fn frame_timing(clock_hz: u32) -> (u32, u16) {
    let mut divider = BASE_DIVIDER;
    while clock_hz / divider / FRAME_HZ > u16::MAX as u32 && divider < MAX_DIVIDER {
        divider += BASE_DIVIDER;
    }
    let top = clock_hz / divider / FRAME_HZ;
    let top = if top > u16::MAX as u32 {
        u16::MAX
    } else {
        top as u16
    };
    (divider, top)
}

/// Servo driven by any duty-cycle PWM output
pub struct PwmServo<P> {
    pwm: P,
    angle: Option<u8>,
}

impl<P: SetDutyCycle> PwmServo<P> {
    pub fn new(pwm: P) -> Self {
        Self { pwm, angle: None }
    }

    /// Last commanded angle
    pub fn angle(&self) -> Option<u8> {
        self.angle
    }

    pub fn into_inner(self) -> P {
        self.pwm
    }
}

impl<P: SetDutyCycle> Servo for PwmServo<P> {
    fn set_angle(&mut self, degrees: u8) {
        let degrees = degrees.min(MAX_SERVO_ANGLE);
        let duty = duty_for_pulse(pulse_width_us(degrees), self.pwm.max_duty_cycle());
        // duty never exceeds max_duty_cycle()
        let _ = self.pwm.set_duty_cycle(duty);
        self.angle = Some(degrees);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::pwm::ErrorType;

    struct MockPwm {
        max: u16,
        duty: u16,
    }

    impl ErrorType for MockPwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            self.max
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            Ok(())
        }
    }

    #[test]
    fn test_pulse_width_endpoints() {
        assert_eq!(pulse_width_us(0), 700);
        assert_eq!(pulse_width_us(90), 1700);
        assert_eq!(pulse_width_us(180), 2700);
        assert_eq!(pulse_width_us(255), 2700);
    }

    #[test]
    fn test_frame_timing_at_125mhz() {
        let (divider, top) = frame_timing(125_000_000);
        assert_eq!(divider, 64);
        assert_eq!(top, 39_062);
    }

    #[test]
    fn test_frame_timing_steps_divider() {
        // 250 MHz overflows at /64
        let (divider, top) = frame_timing(250_000_000);
        assert_eq!(divider, 128);
        assert_eq!(top, 39_062);
    }

    #[test]
    fn test_set_angle_duty() {
        let mut servo = PwmServo::new(MockPwm {
            max: 39_062,
            duty: 0,
        });
        servo.set_angle(180);
        // 2700 / 20000 of the frame
        assert_eq!(servo.into_inner().duty, 5273);
    }

    #[test]
    fn test_set_angle_clamps() {
        let mut servo = PwmServo::new(MockPwm { max: 20_000, duty: 0 });
        servo.set_angle(200);
        assert_eq!(servo.angle(), Some(180));
        assert_eq!(servo.into_inner().duty, 2700);
    }
}
