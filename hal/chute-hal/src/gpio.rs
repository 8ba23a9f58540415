//! Digital outputs driven by the application core
//!
//! The status LED and the piezo beacon are the only outputs the core
//! touches directly. Both are modelled as a latched level so the core can
//! toggle them without reading the pad back.

/// Push-pull output whose level is owned by the caller
pub trait OutputPin {
    /// Drive the output high (`true`) or low (`false`)
    fn set_level(&mut self, high: bool);

    /// Level most recently written with [`set_level`](Self::set_level)
    fn level(&self) -> bool;

    /// Invert the current level
    fn toggle(&mut self) {
        let next = !self.level();
        self.set_level(next);
    }
}

impl<T: OutputPin + ?Sized> OutputPin for &mut T {
    fn set_level(&mut self, high: bool) {
        (**self).set_level(high);
    }

    fn level(&self) -> bool {
        (**self).level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Latch(bool);

    impl OutputPin for Latch {
        fn set_level(&mut self, high: bool) {
            self.0 = high;
        }

        fn level(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_toggle_inverts_level() {
        let mut pin = Latch(false);
        pin.toggle();
        assert!(pin.level());
        pin.toggle();
        assert!(!pin.level());
    }

    fn raise<P: OutputPin>(mut pin: P) {
        pin.set_level(true);
    }

    #[test]
    fn test_mut_ref_forwards() {
        let mut pin = Latch(false);
        raise(&mut pin);
        assert!(pin.level());
    }
}
