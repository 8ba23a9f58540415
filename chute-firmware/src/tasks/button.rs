//! Arm/reboot button
//!
//! The first accepted press arms the unit. After ejection, once the reboot
//! guard has elapsed, a press reboots it through the watchdog.

use defmt::*;
use embassy_rp::gpio::Input;

use chute_core::safety::ButtonAction;

use crate::channels::REBOOT_REQUEST;
use crate::shared::{now_us, route, GATE, MACHINE};

#[embassy_executor::task]
pub async fn button_task(mut button: Input<'static>) {
    info!("Button task started");

    loop {
        button.wait_for_rising_edge().await;

        match GATE.on_press(now_us(), &MACHINE) {
            ButtonAction::Unlock(effects) => {
                info!("Safety gate unlocked, unit armed");
                let _ = route(&effects);
            }
            ButtonAction::Reboot => {
                warn!("Reboot requested from button");
                REBOOT_REQUEST.signal(());
            }
            ButtonAction::Ignore => debug!("Button press ignored in {}", MACHINE.state()),
        }
    }
}
