//! Pre-flight wait loop

use chute_hal::{OutputPin, Watchdog};
use embedded_hal_async::delay::DelayNs;

use super::gate::SafetyGate;
use crate::watchdog::WatchdogSupervisor;

/// Block until the gate unlocks
///
/// Toggles the heartbeat LED and renews the watchdog once per
/// `heartbeat_ms`. Returns the number of heartbeats shown.
pub async fn wait_for_arm<P, W, D>(
    gate: &SafetyGate,
    led: &mut P,
    supervisor: &mut WatchdogSupervisor<W>,
    delay: &mut D,
    heartbeat_ms: u32,
) -> u32
where
    P: OutputPin,
    W: Watchdog,
    D: DelayNs,
{
    let mut beats = 0;
    while gate.is_locked() {
        led.toggle();
        supervisor.renew();
        beats += 1;
        delay.delay_ms(heartbeat_ms).await;
    }
    led.set_level(false);
    beats
}
