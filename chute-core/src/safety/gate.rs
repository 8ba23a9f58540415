//! Arm/lock safety gate
//!
//! The unit boots locked: free-fall cannot release the latch until the
//! button is pressed once. After ejection the same button becomes a manual
//! reboot, guarded so a press during recovery handling right after landing
//! does not wipe the alarm.

use portable_atomic::{AtomicBool, AtomicU64, Ordering};

use crate::config::TimingConfig;
use crate::state::{DeploymentState, DeploymentStateMachine, Effects};

const NO_EDGE: u64 = u64::MAX;

/// What the button handler should do with an accepted press
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonAction {
    /// The gate was opened and the machine armed; route the arming effects
    Unlock(Effects),
    /// Guard time elapsed after ejection; reboot through the watchdog
    Reboot,
    /// Bounce, or a press with no meaning in the current state
    Ignore,
}

pub struct SafetyGate {
    locked: AtomicBool,
    last_edge_us: AtomicU64,
    debounce_us: u64,
    reboot_guard_us: u64,
}

impl SafetyGate {
    pub const fn new(timing: &TimingConfig) -> Self {
        Self {
            locked: AtomicBool::new(true),
            last_edge_us: AtomicU64::new(NO_EDGE),
            debounce_us: timing.debounce_ms as u64 * 1000,
            reboot_guard_us: timing.reboot_guard_ms as u64 * 1000,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Handle a rising edge on the button line
    pub fn on_press(&self, now_us: u64, machine: &DeploymentStateMachine) -> ButtonAction {
        let last = self.last_edge_us.load(Ordering::Acquire);
        if last != NO_EDGE && now_us.saturating_sub(last) < self.debounce_us {
            return ButtonAction::Ignore;
        }
        self.last_edge_us.store(now_us, Ordering::Release);

        if self.locked.swap(false, Ordering::AcqRel) {
            return ButtonAction::Unlock(machine.arm(now_us));
        }

        if machine.state() != DeploymentState::Ejected {
            return ButtonAction::Ignore;
        }
        match machine.ejected_at_us() {
            Some(at) if now_us.saturating_sub(at) > self.reboot_guard_us => ButtonAction::Reboot,
            _ => ButtonAction::Ignore,
        }
    }
}
