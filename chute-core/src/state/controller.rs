//! Shared deployment state
//!
//! The free-fall task, the button task and the flight loop all dispatch into
//! one `DeploymentStateMachine`. State changes go through compare-exchange so
//! exactly one dispatcher wins the Armed → Ejected edge.

use portable_atomic::{AtomicU64, AtomicU8, Ordering};

use super::events::{Effects, Event};
use super::machine::DeploymentState;

/// Sentinel for "not ejected yet"
const NOT_EJECTED: u64 = u64::MAX;

/// Atomic wrapper around [`DeploymentState::transition`]
pub struct DeploymentStateMachine {
    state: AtomicU8,
    ejected_at_us: AtomicU64,
}

impl Default for DeploymentStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl DeploymentStateMachine {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(DeploymentState::Locked.as_u8()),
            ejected_at_us: AtomicU64::new(NOT_EJECTED),
        }
    }

    pub fn state(&self) -> DeploymentState {
        DeploymentState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Time of the winning free-fall, if any
    pub fn ejected_at_us(&self) -> Option<u64> {
        match self.ejected_at_us.load(Ordering::Acquire) {
            NOT_EJECTED => None,
            at => Some(at),
        }
    }

    /// Apply `event` and return the effects the caller must perform
    ///
    /// Only the dispatcher whose compare-exchange commits a state change
    /// receives that transition's effects.
    pub fn dispatch(&self, event: Event, now_us: u64) -> Effects {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let state = DeploymentState::from_u8(current);
            let (next, effects) = state.transition(event, now_us);
            if next == state {
                return effects;
            }

            match self.state.compare_exchange(
                current,
                next.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    if next == DeploymentState::Ejected {
                        self.ejected_at_us.store(now_us, Ordering::Release);
                    }
                    return effects;
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Shorthand for dispatching [`Event::Arm`]
    pub fn arm(&self, now_us: u64) -> Effects {
        self.dispatch(Event::Arm, now_us)
    }
}
