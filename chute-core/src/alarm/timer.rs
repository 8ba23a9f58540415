//! Two-phase alarm timer
//!
//! A long first tone, then short silences and tones until stopped:
//!
//! ```text
//! start ─► [on first_on_ms] ─► [off off_ms] ─► [on on_ms] ─┐
//!                                  ▲                       │
//!                                  └───────────────────────┘
//! ```
//!
//! The timer owns no clock. It asks a [`CallbackScheduler`] for a single
//! pending callback and expects [`AlarmTimer::on_fire`] when it elapses.

use portable_atomic::{AtomicBool, Ordering};

use chute_hal::OutputPin;

use crate::config::AlarmTiming;

/// One-shot callback source
///
/// At most one callback is pending; arming again replaces it.
pub trait CallbackScheduler {
    /// Schedule a callback `delay_ms` from now
    fn arm(&mut self, delay_ms: u32);

    /// Drop the pending callback, if any
    fn cancel(&mut self);
}

/// Where the beacon is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmPhase {
    Idle,
    FirstTone,
    Silent,
    Tone,
}

pub struct AlarmTimer<P: OutputPin, S: CallbackScheduler> {
    output: P,
    scheduler: S,
    timing: AlarmTiming,
    phase: AlarmPhase,
    active: AtomicBool,
}

impl<P: OutputPin, S: CallbackScheduler> AlarmTimer<P, S> {
    pub fn new(mut output: P, scheduler: S, timing: AlarmTiming) -> Self {
        output.set_level(false);
        Self {
            output,
            scheduler,
            timing,
            phase: AlarmPhase::Idle,
            active: AtomicBool::new(false),
        }
    }

    /// Begin the cycle from the first tone
    ///
    /// Restarts cleanly when already sounding.
    pub fn start(&mut self) {
        self.scheduler.cancel();
        self.output.set_level(true);
        self.phase = AlarmPhase::FirstTone;
        self.active.store(true, Ordering::Release);
        self.scheduler.arm(self.timing.first_on_ms);
    }

    /// Advance to the next phase when the scheduled callback elapses
    pub fn on_fire(&mut self) {
        let (level, next, delay) = match self.phase {
            // Late callback after stop()
            AlarmPhase::Idle => return,
            AlarmPhase::FirstTone | AlarmPhase::Tone => {
                (false, AlarmPhase::Silent, self.timing.off_ms)
            }
            AlarmPhase::Silent => (true, AlarmPhase::Tone, self.timing.on_ms),
        };
        self.output.set_level(level);
        self.phase = next;
        self.scheduler.arm(delay);
    }

    /// Cancel the pending callback and silence the output
    pub fn stop(&mut self) {
        self.scheduler.cancel();
        self.output.set_level(false);
        self.phase = AlarmPhase::Idle;
        self.active.store(false, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn phase(&self) -> AlarmPhase {
        self.phase
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn output(&self) -> &P {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlightConfig;
    use crate::testing::MockPin;
    use heapless::Vec;

    #[derive(Default)]
    struct MockScheduler {
        pending: Option<u32>,
        armed: Vec<u32, 16>,
        cancels: u32,
    }

    impl CallbackScheduler for MockScheduler {
        fn arm(&mut self, delay_ms: u32) {
            self.pending = Some(delay_ms);
            let _ = self.armed.push(delay_ms);
        }

        fn cancel(&mut self) {
            self.pending = None;
            self.cancels += 1;
        }
    }

    fn alarm() -> AlarmTimer<MockPin, MockScheduler> {
        AlarmTimer::new(
            MockPin::default(),
            MockScheduler::default(),
            FlightConfig::DEFAULT.alarm,
        )
    }

    #[test]
    fn test_first_phase_is_long_tone() {
        let mut alarm = alarm();
        assert!(!alarm.is_active());

        alarm.start();
        assert!(alarm.is_active());
        assert!(alarm.output().level());
        assert_eq!(alarm.phase(), AlarmPhase::FirstTone);
        assert_eq!(alarm.scheduler().pending, Some(1500));
    }

    #[test]
    fn test_cycle_alternates_off_and_on() {
        let mut alarm = alarm();
        alarm.start();
        for _ in 0..4 {
            alarm.on_fire();
        }

        assert_eq!(alarm.scheduler().armed.as_slice(), &[1500, 300, 1000, 300, 1000]);
        assert_eq!(alarm.phase(), AlarmPhase::Tone);
        assert!(alarm.output().level());
        assert_eq!(alarm.output().rising_edges, 3);
    }

    #[test]
    fn test_stop_cancels_and_silences() {
        let mut alarm = alarm();
        alarm.start();
        alarm.on_fire();
        alarm.on_fire();
        alarm.stop();

        assert!(!alarm.is_active());
        assert!(!alarm.output().level());
        assert_eq!(alarm.scheduler().pending, None);

        // A callback already in flight does nothing
        alarm.on_fire();
        assert_eq!(alarm.phase(), AlarmPhase::Idle);
        assert!(!alarm.output().level());
        assert_eq!(alarm.scheduler().pending, None);
    }

    #[test]
    fn test_restart_rearms_from_first_phase() {
        let mut alarm = alarm();
        alarm.start();
        alarm.on_fire();
        alarm.on_fire();
        alarm.on_fire();
        assert_eq!(alarm.phase(), AlarmPhase::Silent);

        alarm.start();
        assert_eq!(alarm.phase(), AlarmPhase::FirstTone);
        assert!(alarm.output().level());
        assert_eq!(alarm.scheduler().pending, Some(1500));
        assert_eq!(alarm.scheduler().cancels, 2);
    }
}
