//! Latch actuator trait

/// Positional servo
pub trait Servo {
    /// Drive to `degrees`, clamped to 0..=180
    fn set_angle(&mut self, degrees: u8);
}
