//! GPIO outputs

use embassy_rp::gpio::{Level, Output};

use chute_hal::OutputPin;

/// Push-pull output behind the shared pin trait
pub struct RpOutput<'d>(Output<'d>);

impl<'d> RpOutput<'d> {
    pub fn new(output: Output<'d>) -> Self {
        Self(output)
    }
}

impl OutputPin for RpOutput<'_> {
    fn set_level(&mut self, high: bool) {
        self.0.set_level(if high { Level::High } else { Level::Low });
    }

    fn level(&self) -> bool {
        self.0.is_set_high()
    }

    fn toggle(&mut self) {
        self.0.toggle();
    }
}
