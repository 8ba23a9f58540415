//! Deadline bookkeeping for clock-backed schedulers

/// Absolute time of the one pending callback
///
/// Each deadline is measured from the one before it, so a callback that
/// runs a little late does not push the rest of the cycle back.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at_us: Option<u64>,
}

impl Deadline {
    pub const fn new() -> Self {
        Self { at_us: None }
    }

    /// Schedule `delay_ms` after the last deadline
    ///
    /// Falls back to `now_us` when nothing was scheduled, or when the
    /// chained deadline would already be in the past.
    pub fn arm(&mut self, now_us: u64, delay_ms: u32) {
        let delay_us = delay_ms as u64 * 1000;
        let at = match self.at_us {
            Some(last) if last + delay_us >= now_us => last + delay_us,
            _ => now_us + delay_us,
        };
        self.at_us = Some(at);
    }

    pub fn cancel(&mut self) {
        self.at_us = None;
    }

    pub fn at_us(&self) -> Option<u64> {
        self.at_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: u64 = 1000;

    #[test]
    fn test_first_arm_counts_from_now() {
        let mut deadline = Deadline::new();
        deadline.arm(7 * MS, 1500);
        assert_eq!(deadline.at_us(), Some(1507 * MS));
    }

    #[test]
    fn test_late_callback_does_not_drift() {
        let mut deadline = Deadline::new();
        deadline.arm(0, 1500);
        // Fired 20 ms late, rearmed for the silence
        deadline.arm(1520 * MS, 300);
        assert_eq!(deadline.at_us(), Some(1800 * MS));
        deadline.arm(1803 * MS, 1000);
        assert_eq!(deadline.at_us(), Some(2800 * MS));
    }

    #[test]
    fn test_cancel_restarts_from_now() {
        let mut deadline = Deadline::new();
        deadline.arm(0, 1500);
        deadline.cancel();
        assert_eq!(deadline.at_us(), None);
        deadline.arm(5000 * MS, 1500);
        assert_eq!(deadline.at_us(), Some(6500 * MS));
    }

    #[test]
    fn test_far_behind_resyncs_to_now() {
        let mut deadline = Deadline::new();
        deadline.arm(0, 300);
        deadline.arm(10_000 * MS, 300);
        assert_eq!(deadline.at_us(), Some(10_300 * MS));
    }
}
