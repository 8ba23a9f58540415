//! Hardware watchdog contract

/// Why the chip came out of its most recent reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetCause {
    /// Power-on, brown-out or debugger reset
    PowerOn,
    /// The watchdog counted down to zero (or was forced)
    Watchdog,
}

/// Platform watchdog timer
///
/// Once started the watchdog resets the chip unless [`feed`](Self::feed) is
/// called before the timeout elapses.
pub trait Watchdog {
    /// Start, or restart, the countdown with a new timeout
    fn start(&mut self, timeout_ms: u32);

    /// Reload the countdown
    fn feed(&mut self);

    /// Cause of the reset that started this boot
    fn reset_cause(&self) -> ResetCause;
}
