//! State machine definition
//!
//! Latch, alarm and logging behaviour is a function of the current state and
//! an event. Nothing here touches hardware.

use super::events::{Effect, Effects, Event, SensorHealth};
use crate::event_log::{LogEvent, LogKind};

/// Deployment states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DeploymentState {
    /// Power-on; the arming button has not been pressed
    Locked = 0,
    /// Waiting for free-fall
    Armed = 1,
    /// Latch released; terminal
    Ejected = 2,
}

impl DeploymentState {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Inverse of [`as_u8`](Self::as_u8); unknown values read as `Locked`
    pub const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => DeploymentState::Armed,
            2 => DeploymentState::Ejected,
            _ => DeploymentState::Locked,
        }
    }

    /// Check if free-fall may release the latch
    pub fn ejection_allowed(&self) -> bool {
        matches!(self, DeploymentState::Armed)
    }

    /// Process an event and return the next state plus its effects
    ///
    /// `now_us` timestamps any record the transition produces.
    pub fn transition(self, event: Event, now_us: u64) -> (Self, Effects) {
        use DeploymentState::*;

        let mut effects = Effects::new();
        // Capacity covers the longest arm below
        let mut emit = |e: Effect| {
            let _ = effects.push(e);
        };

        let next = match (self, event) {
            (Locked, Event::Arm) => {
                emit(Effect::CloseLatch);
                Armed
            }

            (Armed, Event::FreeFall { sample }) => {
                emit(Effect::ReleaseLatch);
                emit(Effect::StartAlarm);
                emit(Effect::Record(LogEvent::new(
                    now_us,
                    LogKind::PeakAcceleration,
                    sample,
                )));
                Ejected
            }
            (Ejected, Event::FreeFall { .. }) => {
                emit(Effect::ReleaseLatch);
                Ejected
            }

            (Armed | Ejected, Event::Tick { health, sample }) => {
                match health {
                    SensorHealth::Healthy => {
                        emit(Effect::Record(LogEvent::new(now_us, LogKind::Regular, sample)));
                    }
                    SensorHealth::Faulted => {
                        emit(Effect::Record(LogEvent::new(
                            now_us,
                            LogKind::SensorConnectionError,
                            sample,
                        )));
                        emit(Effect::FaultBlink);
                    }
                }
                emit(Effect::RenewWatchdog);
                self
            }
            (Locked, Event::Tick { .. }) => {
                emit(Effect::RenewWatchdog);
                Locked
            }

            // Locked free-fall, repeated arming
            _ => self,
        };

        (next, effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::AccelSample;
    use proptest::prelude::*;

    const SAMPLE: AccelSample = AccelSample::new(12, -40, 3);

    fn free_fall() -> Event {
        Event::FreeFall { sample: SAMPLE }
    }

    fn tick(health: SensorHealth) -> Event {
        Event::Tick {
            health,
            sample: SAMPLE,
        }
    }

    fn any_event() -> impl Strategy<Value = Event> {
        prop_oneof![
            Just(Event::Arm),
            Just(free_fall()),
            Just(tick(SensorHealth::Healthy)),
            Just(tick(SensorHealth::Faulted)),
        ]
    }

    #[test]
    fn test_arm_from_locked() {
        let (next, effects) = DeploymentState::Locked.transition(Event::Arm, 0);
        assert_eq!(next, DeploymentState::Armed);
        assert_eq!(effects.as_slice(), &[Effect::CloseLatch]);
    }

    #[test]
    fn test_locked_ignores_free_fall() {
        let (next, effects) = DeploymentState::Locked.transition(free_fall(), 10);
        assert_eq!(next, DeploymentState::Locked);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_free_fall_ejects_once() {
        let (next, effects) = DeploymentState::Armed.transition(free_fall(), 77);
        assert_eq!(next, DeploymentState::Ejected);
        assert_eq!(
            effects.as_slice(),
            &[
                Effect::ReleaseLatch,
                Effect::StartAlarm,
                Effect::Record(LogEvent::new(77, LogKind::PeakAcceleration, SAMPLE)),
            ]
        );
    }

    #[test]
    fn test_repeat_free_fall_only_releases_latch() {
        let (next, effects) = DeploymentState::Ejected.transition(free_fall(), 99);
        assert_eq!(next, DeploymentState::Ejected);
        assert_eq!(effects.as_slice(), &[Effect::ReleaseLatch]);
    }

    #[test]
    fn test_healthy_tick_records_regular() {
        let (next, effects) = DeploymentState::Armed.transition(tick(SensorHealth::Healthy), 5);
        assert_eq!(next, DeploymentState::Armed);
        assert_eq!(
            effects.as_slice(),
            &[
                Effect::Record(LogEvent::new(5, LogKind::Regular, SAMPLE)),
                Effect::RenewWatchdog,
            ]
        );
    }

    #[test]
    fn test_faulted_tick_records_error_and_blinks() {
        let (_, effects) = DeploymentState::Ejected.transition(tick(SensorHealth::Faulted), 5);
        assert_eq!(
            effects.as_slice(),
            &[
                Effect::Record(LogEvent::new(5, LogKind::SensorConnectionError, SAMPLE)),
                Effect::FaultBlink,
                Effect::RenewWatchdog,
            ]
        );
    }

    #[test]
    fn test_raw_round_trip() {
        for state in [
            DeploymentState::Locked,
            DeploymentState::Armed,
            DeploymentState::Ejected,
        ] {
            assert_eq!(DeploymentState::from_u8(state.as_u8()), state);
        }
    }

    proptest! {
        #[test]
        fn test_state_never_moves_backwards(events in proptest::collection::vec(any_event(), 0..32)) {
            let mut state = DeploymentState::Locked;
            let mut peaks = 0;
            let mut alarms = 0;

            for (i, event) in events.into_iter().enumerate() {
                let (next, effects) = state.transition(event, i as u64);
                prop_assert!(next.as_u8() >= state.as_u8());
                for effect in &effects {
                    match effect {
                        Effect::StartAlarm => alarms += 1,
                        Effect::Record(r) if r.kind == LogKind::PeakAcceleration => peaks += 1,
                        _ => {}
                    }
                }
                state = next;
            }

            prop_assert!(peaks <= 1);
            prop_assert_eq!(peaks, alarms);
        }

        #[test]
        fn test_no_ejection_without_arming(events in proptest::collection::vec(
            prop_oneof![Just(free_fall()), Just(tick(SensorHealth::Healthy))], 0..16)
        ) {
            let mut state = DeploymentState::Locked;
            for event in events {
                let (next, effects) = state.transition(event, 0);
                prop_assert_eq!(next, DeploymentState::Locked);
                prop_assert!(!effects.contains(&Effect::ReleaseLatch));
                state = next;
            }
        }
    }
}
